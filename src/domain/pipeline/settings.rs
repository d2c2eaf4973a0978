//! Pipeline settings - the configuration a pipeline is built from

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::validation::{validate_language, validate_model_name, PipelineValidationError};
use crate::domain::classification::is_entity_tag;

/// Immutable description of how a pipeline must be configured.
///
/// Two settings values are equal when every field is equal. Sorted collections keep
/// equality independent of the order in which entity types or options were added.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Model (or gazetteer) name
    model: String,

    /// ISO-639-1 language code
    language: String,

    /// Whether entity matching is case sensitive
    #[serde(default)]
    case_sensitive: bool,

    /// Tags to keep; empty keeps every tag the model knows
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    entity_types: BTreeSet<String>,

    /// Extra feature flags understood by specific builders
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    options: BTreeMap<String, String>,
}

impl PipelineSettings {
    pub fn new(model: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            language: language.into(),
            case_sensitive: false,
            entity_types: BTreeSet::new(),
            options: BTreeMap::new(),
        }
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_entity_type(mut self, tag: impl Into<String>) -> Self {
        self.entity_types.insert(tag.into());
        self
    }

    pub fn with_entity_types<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entity_types.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn entity_types(&self) -> &BTreeSet<String> {
        &self.entity_types
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Returns true if `tag` passes the entity type filter
    pub fn keeps_tag(&self, tag: &str) -> bool {
        self.entity_types.is_empty() || self.entity_types.contains(tag)
    }

    /// Checks that the settings describe a buildable pipeline
    pub fn validate(&self) -> Result<(), PipelineValidationError> {
        validate_model_name(&self.model)?;
        validate_language(&self.language)?;

        if let Some(tag) = self.entity_types.iter().find(|t| !is_entity_tag(t)) {
            return Err(PipelineValidationError::InvalidEntityType { tag: tag.clone() });
        }

        Ok(())
    }
}
