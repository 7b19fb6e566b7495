//! Syntactic validators for the read-path inputs.
//!
//! Each validator reports field-level messages; failures never reach the
//! store or the cache.

use crate::error::{CatpixError, FieldError, Result};

/// Validate a record id string: a syntactically positive integer.
pub fn validate_id(id: &str) -> Result<i64> {
    if id.trim().is_empty() {
        return Err(CatpixError::validation("id", "ID cannot be empty"));
    }
    match id.parse::<i64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(CatpixError::validation(
            "id",
            "ID must be a valid positive integer",
        )),
    }
}

/// Validate a (page, pageSize) pair. Both fields are checked and every
/// failing field gets its own message.
pub fn validate_pagination(page: &str, page_size: &str) -> Result<(u32, u32)> {
    let mut errors = Vec::new();

    let page_value = parse_positive(page);
    if page_value.is_none() {
        errors.push(FieldError::new("page", "Page must be a positive integer"));
    }
    let size_value = parse_positive(page_size);
    if size_value.is_none() {
        errors.push(FieldError::new(
            "pageSize",
            "Page size must be a positive integer",
        ));
    }

    match (page_value, size_value) {
        (Some(page), Some(size)) => Ok((page, size)),
        _ => Err(CatpixError::Validation(errors)),
    }
}

/// Validate a tag name: non-empty and alphabetic characters only.
pub fn validate_tag(tag: &str) -> Result<()> {
    if tag.is_empty() {
        return Err(CatpixError::validation("tag", "Tag name cannot be empty"));
    }
    if !tag.chars().all(char::is_alphabetic) {
        return Err(CatpixError::validation(
            "tag",
            "Tag name must only contain alphabetic characters",
        ));
    }
    Ok(())
}

fn parse_positive(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ids_parse() {
        assert_eq!(validate_id("1").unwrap(), 1);
        assert_eq!(validate_id("420").unwrap(), 420);
    }

    #[test]
    fn test_invalid_ids_fail_validation() {
        for bad in ["0", "-1", "abc", "", "1.5", " "] {
            let err = validate_id(bad).unwrap_err();
            assert!(err.is_validation(), "{:?} should fail validation", bad);
        }
    }

    #[test]
    fn test_pagination_accepts_positive_pairs() {
        assert_eq!(validate_pagination("1", "10").unwrap(), (1, 10));
        assert_eq!(validate_pagination("3", "5").unwrap(), (3, 5));
    }

    #[test]
    fn test_pagination_reports_each_bad_field() {
        let err = validate_pagination("0", "abc").unwrap_err();
        match err {
            CatpixError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, ["page", "pageSize"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_pagination_rejects_single_bad_field() {
        assert!(validate_pagination("-2", "10").is_err());
        assert!(validate_pagination("1", "0").is_err());
    }

    #[test]
    fn test_tag_names() {
        assert!(validate_tag("Playful").is_ok());
        assert!(validate_tag("calm").is_ok());
        assert!(validate_tag("42").is_err());
        assert!(validate_tag("").is_err());
        assert!(validate_tag("semi colon").is_err());
    }
}
