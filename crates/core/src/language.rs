//! Farmer language validation against the fixed language set.

use crate::error::{CoreError, CoreResult};

/// Languages a farmer record may declare.
pub const LANGUAGES: &[&str] = &[
    "English",
    "French",
    "Pidgin English",
    "Fulfulde",
    "Ewondo",
    "Duala",
    "Bamileke",
    "Other",
];

/// Validate an optional language, returning the canonical spelling.
///
/// `None` and blank strings are accepted as "not declared".
pub fn validate_language(raw: Option<&str>) -> CoreResult<Option<String>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let canonical = LANGUAGES
        .iter()
        .find(|l| l.eq_ignore_ascii_case(trimmed))
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid language. Valid languages: {}",
                LANGUAGES.join(", ")
            ))
        })?;

    Ok(Some((*canonical).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_accepted() {
        assert_eq!(validate_language(None).unwrap(), None);
    }

    #[test]
    fn blank_is_accepted_as_none() {
        assert_eq!(validate_language(Some("  ")).unwrap(), None);
    }

    #[test]
    fn known_language_is_canonicalized() {
        assert_eq!(
            validate_language(Some("french")).unwrap(),
            Some("French".to_string())
        );
    }

    #[test]
    fn multi_word_language_matches() {
        assert_eq!(
            validate_language(Some("pidgin english")).unwrap(),
            Some("Pidgin English".to_string())
        );
    }

    #[test]
    fn unknown_language_lists_valid_set() {
        let err = validate_language(Some("Klingon")).unwrap_err();
        assert!(err.to_string().contains("Valid languages"));
    }
}
