//! Classification domain - labels and the classify operation

mod classifier;
mod label;

pub use classifier::classify;
pub use label::{extract_labels, is_entity_tag, Label, NO_ENTITY_TAG};
