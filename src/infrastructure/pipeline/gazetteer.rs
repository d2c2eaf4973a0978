//! Gazetteer pipeline - dictionary-based entity tagging

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::tokenizer::tokenize;
use crate::domain::{is_entity_tag, AnnotatedToken, DomainError, Pipeline, PipelineSettings, NO_ENTITY_TAG};

/// Entity phrases grouped by tag, e.g. `{"LOC": ["Paris", "New York"]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gazetteer {
    entries: BTreeMap<String, Vec<String>>,
}

impl Gazetteer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add phrases for `tag`
    pub fn with_entries<I, S>(mut self, tag: impl Into<String>, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .entry(tag.into())
            .or_default()
            .extend(phrases.into_iter().map(Into::into));
        self
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }
}

/// Option naming the shortest phrase, in characters, the pipeline keeps
pub const MIN_PHRASE_CHARS_OPTION: &str = "min_phrase_chars";

/// Pipeline tagging words that belong to a known phrase.
///
/// Phrases are matched greedily, longest first, on word boundaries. A phrase listed
/// under several tags keeps the first tag in alphabetical order. Phrases shorter than
/// the `min_phrase_chars` option are skipped.
#[derive(Debug)]
pub struct GazetteerPipeline {
    phrases: HashMap<Vec<String>, String>,
    longest: usize,
    case_sensitive: bool,
}

impl GazetteerPipeline {
    /// Compile `gazetteer` for the tags, casing and options `settings` ask for
    pub fn compile(
        gazetteer: &Gazetteer,
        settings: &PipelineSettings,
    ) -> Result<Self, DomainError> {
        let min_chars = Self::min_phrase_chars(settings)?;
        let mut pipeline = Self {
            phrases: HashMap::new(),
            longest: 0,
            case_sensitive: settings.is_case_sensitive(),
        };

        let kept = gazetteer
            .entries
            .iter()
            .filter(|(tag, _)| is_entity_tag(tag) && settings.keeps_tag(tag));

        for (tag, phrases) in kept {
            for phrase in phrases.iter().filter(|p| p.chars().count() >= min_chars) {
                let words: Vec<String> = tokenize(phrase)
                    .iter()
                    .map(|word| pipeline.normalize(word.text))
                    .collect();

                if words.is_empty() {
                    continue;
                }

                pipeline.longest = pipeline.longest.max(words.len());
                pipeline.phrases.entry(words).or_insert_with(|| tag.clone());
            }
        }

        Ok(pipeline)
    }

    fn min_phrase_chars(settings: &PipelineSettings) -> Result<usize, DomainError> {
        match settings.option(MIN_PHRASE_CHARS_OPTION) {
            None => Ok(0),
            Some(value) => value.parse().map_err(|_| {
                DomainError::configuration(format!(
                    "Option '{}' must be a non-negative integer, got '{}'",
                    MIN_PHRASE_CHARS_OPTION, value
                ))
            }),
        }
    }

    /// Number of distinct phrases the pipeline recognizes
    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }

    fn normalize(&self, word: &str) -> String {
        if self.case_sensitive {
            word.to_string()
        } else {
            word.to_lowercase()
        }
    }
}

impl Pipeline for GazetteerPipeline {
    fn annotate(&self, text: &str) -> Result<Vec<AnnotatedToken>, DomainError> {
        let words = tokenize(text);
        let normalized: Vec<String> = words.iter().map(|w| self.normalize(w.text)).collect();
        let mut tags: Vec<Option<&str>> = vec![None; words.len()];

        let mut i = 0;
        while i < words.len() {
            let max_len = self.longest.min(words.len() - i);
            let matched = (1..=max_len).rev().find_map(|len| {
                self.phrases
                    .get(&normalized[i..i + len])
                    .map(|tag| (len, tag.as_str()))
            });

            match matched {
                Some((len, tag)) => {
                    tags[i..i + len].fill(Some(tag));
                    i += len;
                }
                None => i += 1,
            }
        }

        Ok(words
            .iter()
            .zip(tags)
            .map(|(word, tag)| {
                AnnotatedToken::new(
                    word.text,
                    tag.unwrap_or(NO_ENTITY_TAG),
                    word.begin,
                    word.end,
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{classify, Label};

    fn world() -> Gazetteer {
        Gazetteer::new()
            .with_entries("LOC", ["Paris", "France", "New York", "New York City"])
            .with_entries("PER", ["Ada Lovelace"])
            .with_entries("ORG", ["UNESCO"])
    }

    #[test]
    fn test_annotate_tags_known_words() {
        let pipeline = GazetteerPipeline::compile(&world(), &PipelineSettings::new("world", "en"))
            .unwrap();

        let tokens = pipeline.annotate("Paris is the capital of France").unwrap();

        let tags: Vec<&str> = tokens.iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(tags, vec!["LOC", "O", "O", "O", "O", "LOC"]);
        assert_eq!(tokens[5], AnnotatedToken::new("France", "LOC", 24, 30));
    }

    #[test]
    fn test_longest_phrase_wins() {
        let pipeline = GazetteerPipeline::compile(&world(), &PipelineSettings::new("world", "en"))
            .unwrap();

        let labels = classify(&pipeline, "She moved to New York City in May").unwrap();

        assert_eq!(labels, vec![Label::new("New York City", "LOC", 13, 26)]);
    }

    #[test]
    fn test_case_insensitive_by_default() {
        let pipeline = GazetteerPipeline::compile(&world(), &PipelineSettings::new("world", "en"))
            .unwrap();

        let labels = classify(&pipeline, "unesco met ada lovelace").unwrap();

        assert_eq!(
            labels,
            vec![
                Label::new("unesco", "ORG", 0, 6),
                Label::new("ada lovelace", "PER", 11, 23),
            ]
        );
    }

    #[test]
    fn test_case_sensitive_settings() {
        let settings = PipelineSettings::new("world", "en").with_case_sensitive(true);
        let pipeline = GazetteerPipeline::compile(&world(), &settings).unwrap();

        assert!(classify(&pipeline, "paris").unwrap().is_empty());
        assert_eq!(classify(&pipeline, "Paris").unwrap().len(), 1);
    }

    #[test]
    fn test_entity_type_filter() {
        let settings = PipelineSettings::new("world", "en").with_entity_type("PER");
        let pipeline = GazetteerPipeline::compile(&world(), &settings).unwrap();

        let labels = classify(&pipeline, "Ada Lovelace visited Paris").unwrap();

        assert_eq!(labels, vec![Label::new("Ada Lovelace", "PER", 0, 12)]);
    }

    #[test]
    fn test_no_entity_tag_entries_are_ignored() {
        let gazetteer = Gazetteer::new().with_entries("O", ["the"]).with_entries("", ["a"]);
        let pipeline = GazetteerPipeline::compile(&gazetteer, &PipelineSettings::new("m", "en"))
            .unwrap();

        assert_eq!(pipeline.phrase_count(), 0);
    }

    #[test]
    fn test_min_phrase_chars_option() {
        let gazetteer = Gazetteer::new().with_entries("ORG", ["UN", "UNESCO"]);
        let settings =
            PipelineSettings::new("world", "en").with_option(MIN_PHRASE_CHARS_OPTION, "3");
        let pipeline = GazetteerPipeline::compile(&gazetteer, &settings).unwrap();

        let labels = classify(&pipeline, "UN and UNESCO").unwrap();

        assert_eq!(pipeline.phrase_count(), 1);
        assert_eq!(labels, vec![Label::new("UNESCO", "ORG", 7, 13)]);
    }

    #[test]
    fn test_invalid_min_phrase_chars_option() {
        let settings =
            PipelineSettings::new("world", "en").with_option(MIN_PHRASE_CHARS_OPTION, "many");

        let result = GazetteerPipeline::compile(&world(), &settings);

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_gazetteer_json_shape() {
        let gazetteer: Gazetteer =
            serde_json::from_str(r#"{"LOC": ["Paris"], "PER": []}"#).unwrap();

        assert_eq!(gazetteer.tags().collect::<Vec<_>>(), vec!["LOC", "PER"]);
        assert!(!gazetteer.is_empty());
        assert!(Gazetteer::new().with_entries("LOC", Vec::<String>::new()).is_empty());
    }
}
