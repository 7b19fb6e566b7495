//! Wire types for the source catalog API.
//!
//! Only the fields the pipeline actually reads are deserialized; the
//! catalog sends far more breed metadata than we keep.

use serde::Deserialize;

/// One image record as returned by the catalog search endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CatalogImage {
    /// Catalog-side id of the asset.
    pub id: String,
    /// Download URL for the image bytes.
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// Breed metadata; the temperament text feeds tag extraction.
    #[serde(default)]
    pub breeds: Vec<CatalogBreed>,
}

/// Breed metadata attached to a catalog image.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CatalogBreed {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Comma-separated descriptor tokens, e.g. "Active, Playful, Curious".
    #[serde(default)]
    pub temperament: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub life_span: Option<String>,
    #[serde(default)]
    pub wikipedia_url: Option<String>,
}
