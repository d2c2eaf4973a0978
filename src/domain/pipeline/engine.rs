//! Pipeline trait - a built, immutable annotation engine

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// One token of raw pipeline output.
///
/// Offsets are character offsets into the annotated text; `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedToken {
    pub text: String,
    pub tag: String,
    pub begin: usize,
    pub end: usize,
}

impl AnnotatedToken {
    pub fn new(text: impl Into<String>, tag: impl Into<String>, begin: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            tag: tag.into(),
            begin,
            end,
        }
    }
}

/// Trait for classification pipelines.
///
/// A pipeline is immutable once built and serves any number of concurrent
/// `annotate` calls without further locking.
pub trait Pipeline: Send + Sync + Debug {
    /// Annotate `text`, producing one tagged token per word in text order
    fn annotate(&self, text: &str) -> Result<Vec<AnnotatedToken>, DomainError>;
}
