//! Labels - tagged spans collapsed from per-token pipeline output

use serde::{Deserialize, Serialize};

use crate::domain::pipeline::AnnotatedToken;
use crate::domain::DomainError;

/// Tag pipelines emit for tokens outside any entity
pub const NO_ENTITY_TAG: &str = "O";

/// Returns true unless `tag` is empty or the no-entity tag
pub fn is_entity_tag(tag: &str) -> bool {
    !tag.is_empty() && tag != NO_ENTITY_TAG
}

/// A tagged span of the source text.
///
/// `begin` is the first token's begin offset and `end` the last token's end offset,
/// both in characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    pub tag: String,
    pub begin: usize,
    pub end: usize,
}

impl Label {
    pub fn new(text: impl Into<String>, tag: impl Into<String>, begin: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            tag: tag.into(),
            begin,
            end,
        }
    }
}

/// Open run of consecutive tokens sharing a tag
struct Run<'a> {
    tag: &'a str,
    begin: usize,
    end: usize,
}

/// Char offset to byte offset table for slicing the source text
struct CharIndex<'a> {
    text: &'a str,
    byte_offsets: Vec<usize>,
}

impl<'a> CharIndex<'a> {
    fn new(text: &'a str) -> Self {
        let byte_offsets = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();

        Self { text, byte_offsets }
    }

    fn char_len(&self) -> usize {
        self.byte_offsets.len() - 1
    }

    fn slice(&self, begin: usize, end: usize) -> &'a str {
        &self.text[self.byte_offsets[begin]..self.byte_offsets[end]]
    }
}

/// Collapse a token stream into labels.
///
/// Each maximal run of consecutive tokens with the same entity tag becomes one label
/// whose text is sliced from `text` between the run's outer offsets. No-entity tokens
/// end any open run. Tokens must be ordered and lie within `text`.
pub fn extract_labels(text: &str, tokens: &[AnnotatedToken]) -> Result<Vec<Label>, DomainError> {
    let index = CharIndex::new(text);
    let mut labels = Vec::new();
    let mut open: Option<Run<'_>> = None;
    let mut previous_end = 0;

    for token in tokens {
        if token.begin > token.end || token.end > index.char_len() {
            return Err(DomainError::annotation(format!(
                "Token '{}' has offsets {}..{} outside text of {} characters",
                token.text,
                token.begin,
                token.end,
                index.char_len()
            )));
        }

        if token.begin < previous_end {
            return Err(DomainError::annotation(format!(
                "Token '{}' at {} overlaps the previous token ending at {}",
                token.text, token.begin, previous_end
            )));
        }
        previous_end = token.end;

        if !is_entity_tag(&token.tag) {
            if let Some(run) = open.take() {
                labels.push(close_run(&index, run));
            }
            continue;
        }

        if let Some(run) = open.as_mut() {
            if run.tag == token.tag {
                run.end = token.end;
                continue;
            }
        }

        if let Some(run) = open.take() {
            labels.push(close_run(&index, run));
        }
        open = Some(Run {
            tag: &token.tag,
            begin: token.begin,
            end: token.end,
        });
    }

    if let Some(run) = open {
        labels.push(close_run(&index, run));
    }

    Ok(labels)
}

fn close_run(index: &CharIndex<'_>, run: Run<'_>) -> Label {
    Label::new(index.slice(run.begin, run.end), run.tag, run.begin, run.end)
}
