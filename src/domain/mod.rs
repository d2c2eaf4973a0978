//! Domain layer - Core business logic and entities

pub mod classification;
pub mod error;
pub mod pipeline;

pub use classification::{classify, extract_labels, is_entity_tag, Label, NO_ENTITY_TAG};
pub use error::DomainError;
pub use pipeline::{
    AnnotatedToken, Pipeline, PipelineBuilder, PipelineSettings, PipelineValidationError,
    SlotKey,
};
