//! Input checks applied at the CLI and HTTP boundaries before the store is touched.

use crate::entity::ProductUpdate;
use crate::error::{Result, TaarifaError};

/// Minimum length, in characters, of a product name or description.
pub const MIN_FIELD_LENGTH: usize = 5;

/// Validate the fields of a new product.
pub fn validate_new_product(name: Option<&str>, description: Option<&str>) -> Result<()> {
    let (name, description) = match (name, description) {
        (Some(n), Some(d)) if !n.is_empty() && !d.is_empty() => (n, d),
        _ => {
            return Err(TaarifaError::Validation(
                "Name and description are required".to_string(),
            ))
        }
    };

    if too_short(name) || too_short(description) {
        return Err(TaarifaError::Validation(format!(
            "Name and description must be at least {} characters long",
            MIN_FIELD_LENGTH
        )));
    }

    Ok(())
}

/// Validate an update payload. Absent fields are left alone; present ones
/// must satisfy the same length rule as on creation.
pub fn validate_update(update: &ProductUpdate) -> Result<()> {
    if update.is_empty() {
        return Err(TaarifaError::Validation(
            "Nothing to update: provide a name or a description".to_string(),
        ));
    }

    for (field, value) in [("Name", &update.name), ("Description", &update.description)] {
        if let Some(value) = value {
            if too_short(value) {
                return Err(TaarifaError::Validation(format!(
                    "{} must be at least {} characters long",
                    field, MIN_FIELD_LENGTH
                )));
            }
        }
    }

    Ok(())
}

fn too_short(value: &str) -> bool {
    value.chars().count() < MIN_FIELD_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_valid_fields() {
        assert!(validate_new_product(Some("Widget Pro"), Some("A very good widget")).is_ok());
        assert!(validate_new_product(Some("12345"), Some("abcde")).is_ok());
    }

    #[test]
    fn test_rejects_short_fields() {
        let err = validate_new_product(Some("ab"), Some("cd")).unwrap_err();
        assert!(matches!(err, TaarifaError::Validation(_)));
        assert!(err.to_string().contains("at least 5 characters"));

        assert!(validate_new_product(Some("Widget Pro"), Some("cd")).is_err());
    }

    #[test]
    fn test_rejects_missing_fields() {
        let err = validate_new_product(None, Some("A very good widget")).unwrap_err();
        assert!(err.to_string().contains("required"));

        let err = validate_new_product(Some("Widget Pro"), Some("")).unwrap_err();
        assert!(err.to_string().contains("required"));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // Four characters, eight bytes.
        assert!(validate_new_product(Some("ñañá"), Some("A very good widget")).is_err());
        assert!(validate_new_product(Some("ñañáñ"), Some("A very good widget")).is_ok());
    }

    #[test]
    fn test_update_rules() {
        assert!(validate_update(&ProductUpdate::default()).is_err());
        assert!(validate_update(&ProductUpdate {
            name: Some("abc".to_string()),
            description: None,
        })
        .is_err());
        assert!(validate_update(&ProductUpdate {
            name: None,
            description: Some("A better widget".to_string()),
        })
        .is_ok());
    }
}
