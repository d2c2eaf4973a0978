//! Slot key - the logical place a pipeline occupies in the cache

use serde::{Deserialize, Serialize};

use super::validation::{validate_slot_key, PipelineValidationError};

/// Slot identifier, typically one per tenant or collective
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotKey(String);

impl SlotKey {
    /// Create a new SlotKey after validation
    pub fn new(key: impl Into<String>) -> Result<Self, PipelineValidationError> {
        let key = key.into();
        validate_slot_key(&key)?;
        Ok(Self(key))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SlotKey {
    type Error = PipelineValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SlotKey> for String {
    fn from(key: SlotKey) -> Self {
        key.0
    }
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
