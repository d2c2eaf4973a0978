use std::sync::Arc;

use thiserror::Error;

use crate::domain::pipeline::{PipelineSettings, SlotKey};

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Failed to build pipeline for slot '{slot_key}' (model '{}', language '{}'): {cause}", .settings.model(), .settings.language())]
    BuildFailure {
        slot_key: SlotKey,
        settings: Box<PipelineSettings>,
        #[source]
        cause: Arc<DomainError>,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Annotation error: {message}")]
    Annotation { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn build_failure(
        slot_key: SlotKey,
        settings: PipelineSettings,
        cause: impl Into<Arc<DomainError>>,
    ) -> Self {
        Self::BuildFailure {
            slot_key,
            settings: Box::new(settings),
            cause: cause.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn annotation(message: impl Into<String>) -> Self {
        Self::Annotation {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error came out of a pipeline builder
    pub fn is_build_failure(&self) -> bool {
        matches!(self, Self::BuildFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_error() {
        let error = DomainError::invalid_input("Text exceeds 10 characters");
        assert_eq!(error.to_string(), "Invalid input: Text exceeds 10 characters");
    }

    #[test]
    fn test_build_failure_carries_slot_and_settings() {
        let slot = SlotKey::new("collective-1").unwrap();
        let settings = PipelineSettings::new("ner-base", "en");
        let error = DomainError::build_failure(
            slot.clone(),
            settings.clone(),
            DomainError::not_found("Gazetteer file 'ner-base.en.json' not found"),
        );

        assert!(error.is_build_failure());
        assert_eq!(
            error.to_string(),
            "Failed to build pipeline for slot 'collective-1' (model 'ner-base', language 'en'): \
             Not found: Gazetteer file 'ner-base.en.json' not found"
        );

        match error {
            DomainError::BuildFailure {
                slot_key,
                settings: failed,
                ..
            } => {
                assert_eq!(slot_key, slot);
                assert_eq!(*failed, settings);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_build_failure_exposes_source() {
        use std::error::Error;

        let error = DomainError::build_failure(
            SlotKey::new("a").unwrap(),
            PipelineSettings::new("m", "en"),
            DomainError::configuration("corrupt"),
        );

        let source = error.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Configuration error: corrupt"));
    }
}
