//! Pipeline domain - settings, slot keys and the builder/pipeline seams

mod builder;
mod engine;
mod settings;
mod slot;
mod validation;

pub use builder::PipelineBuilder;
pub use engine::{AnnotatedToken, Pipeline};
pub use settings::PipelineSettings;
pub use slot::SlotKey;
pub use validation::{
    validate_language, validate_model_name, validate_slot_key, PipelineValidationError,
    MAX_MODEL_NAME_LENGTH, MAX_SLOT_KEY_LENGTH,
};

#[cfg(test)]
pub use builder::{mock, MockPipelineBuilder};
