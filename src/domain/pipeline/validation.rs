//! Pipeline validation utilities

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::DomainError;

/// Maximum length for slot keys
pub const MAX_SLOT_KEY_LENGTH: usize = 100;

/// Maximum length for model names
pub const MAX_MODEL_NAME_LENGTH: usize = 100;

/// Slot keys: alphanumeric plus `-`, `_`, `.` and `:` (tenant-style namespacing)
static SLOT_KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.:-]*$").unwrap());

/// Model names double as file stems, so no path separators are allowed
static MODEL_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_-]*$").unwrap());

/// ISO-639-1 language codes
static LANGUAGE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]{2}$").unwrap());

/// Pipeline validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineValidationError {
    /// Slot key is empty
    EmptySlotKey,
    /// Slot key exceeds maximum length
    SlotKeyTooLong { length: usize, max: usize },
    /// Slot key contains invalid characters
    InvalidSlotKeyFormat { key: String },
    /// Model name is empty
    EmptyModel,
    /// Model name exceeds maximum length
    ModelTooLong { length: usize, max: usize },
    /// Model name contains invalid characters
    InvalidModelFormat { model: String },
    /// Language is not a two-letter lowercase code
    InvalidLanguage { language: String },
    /// Entity type filter contains an empty or no-entity tag
    InvalidEntityType { tag: String },
}

impl fmt::Display for PipelineValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySlotKey => write!(f, "Slot key cannot be empty"),
            Self::SlotKeyTooLong { length, max } => {
                write!(f, "Slot key too long: {} characters (max {})", length, max)
            }
            Self::InvalidSlotKeyFormat { key } => write!(
                f,
                "Invalid slot key format '{}': must start alphanumeric and contain only \
                 alphanumerics, '-', '_', '.' or ':'",
                key
            ),
            Self::EmptyModel => write!(f, "Model name cannot be empty"),
            Self::ModelTooLong { length, max } => {
                write!(f, "Model name too long: {} characters (max {})", length, max)
            }
            Self::InvalidModelFormat { model } => write!(
                f,
                "Invalid model name '{}': must start alphanumeric and contain only \
                 alphanumerics, '-' or '_'",
                model
            ),
            Self::InvalidLanguage { language } => write!(
                f,
                "Invalid language '{}': expected a two-letter lowercase ISO-639-1 code",
                language
            ),
            Self::InvalidEntityType { tag } => {
                write!(f, "Invalid entity type '{}': must be a non-empty entity tag", tag)
            }
        }
    }
}

impl std::error::Error for PipelineValidationError {}

impl From<PipelineValidationError> for DomainError {
    fn from(err: PipelineValidationError) -> Self {
        DomainError::invalid_input(err.to_string())
    }
}

/// Validates a slot key
pub fn validate_slot_key(key: &str) -> Result<(), PipelineValidationError> {
    if key.is_empty() {
        return Err(PipelineValidationError::EmptySlotKey);
    }

    if key.len() > MAX_SLOT_KEY_LENGTH {
        return Err(PipelineValidationError::SlotKeyTooLong {
            length: key.len(),
            max: MAX_SLOT_KEY_LENGTH,
        });
    }

    if !SLOT_KEY_PATTERN.is_match(key) {
        return Err(PipelineValidationError::InvalidSlotKeyFormat {
            key: key.to_string(),
        });
    }

    Ok(())
}

/// Validates a model name
pub fn validate_model_name(model: &str) -> Result<(), PipelineValidationError> {
    if model.is_empty() {
        return Err(PipelineValidationError::EmptyModel);
    }

    if model.len() > MAX_MODEL_NAME_LENGTH {
        return Err(PipelineValidationError::ModelTooLong {
            length: model.len(),
            max: MAX_MODEL_NAME_LENGTH,
        });
    }

    if !MODEL_NAME_PATTERN.is_match(model) {
        return Err(PipelineValidationError::InvalidModelFormat {
            model: model.to_string(),
        });
    }

    Ok(())
}

/// Validates a language code
pub fn validate_language(language: &str) -> Result<(), PipelineValidationError> {
    if !LANGUAGE_PATTERN.is_match(language) {
        return Err(PipelineValidationError::InvalidLanguage {
            language: language.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slot_keys() {
        assert!(validate_slot_key("a").is_ok());
        assert!(validate_slot_key("collective-42").is_ok());
        assert!(validate_slot_key("tenant:acme.eu_west").is_ok());
    }

    #[test]
    fn test_invalid_slot_keys() {
        assert_eq!(
            validate_slot_key(""),
            Err(PipelineValidationError::EmptySlotKey)
        );
        assert!(matches!(
            validate_slot_key("-leading"),
            Err(PipelineValidationError::InvalidSlotKeyFormat { .. })
        ));
        assert!(matches!(
            validate_slot_key("has space"),
            Err(PipelineValidationError::InvalidSlotKeyFormat { .. })
        ));
        assert!(matches!(
            validate_slot_key(&"k".repeat(MAX_SLOT_KEY_LENGTH + 1)),
            Err(PipelineValidationError::SlotKeyTooLong { .. })
        ));
    }

    #[test]
    fn test_model_names_reject_paths() {
        assert!(validate_model_name("ner-base_v2").is_ok());
        assert!(matches!(
            validate_model_name("../etc/passwd"),
            Err(PipelineValidationError::InvalidModelFormat { .. })
        ));
        assert!(matches!(
            validate_model_name("dir/model"),
            Err(PipelineValidationError::InvalidModelFormat { .. })
        ));
        assert_eq!(validate_model_name(""), Err(PipelineValidationError::EmptyModel));
    }

    #[test]
    fn test_languages() {
        assert!(validate_language("en").is_ok());
        assert!(validate_language("de").is_ok());
        assert!(validate_language("EN").is_err());
        assert!(validate_language("eng").is_err());
        assert!(validate_language("").is_err());
    }

    #[test]
    fn test_converts_to_invalid_input() {
        let err: DomainError = PipelineValidationError::EmptySlotKey.into();
        assert_eq!(err.to_string(), "Invalid input: Slot key cannot be empty");
    }
}
