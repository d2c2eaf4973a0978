//! Classification over a built pipeline

use super::label::{extract_labels, Label};
use crate::domain::pipeline::Pipeline;
use crate::domain::DomainError;

/// Run `pipeline` over `text` and collapse its token stream into labels.
///
/// Pure function of its inputs; safe to call concurrently on one pipeline.
pub fn classify(pipeline: &dyn Pipeline, text: &str) -> Result<Vec<Label>, DomainError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let tokens = pipeline.annotate(text)?;
    extract_labels(text, &tokens)
}
