//! Word tokenizer with character offsets

use unicode_segmentation::UnicodeSegmentation;

/// A word of the source text; offsets are in characters, `end` exclusive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordToken<'a> {
    pub text: &'a str,
    pub begin: usize,
    pub end: usize,
}

/// Split `text` into Unicode words, skipping whitespace and punctuation
pub fn tokenize(text: &str) -> Vec<WordToken<'_>> {
    let mut tokens = Vec::new();
    let mut byte_pos = 0;
    let mut char_pos = 0;

    for (byte_idx, word) in text.unicode_word_indices() {
        char_pos += text[byte_pos..byte_idx].chars().count();
        let len = word.chars().count();

        tokens.push(WordToken {
            text: word,
            begin: char_pos,
            end: char_pos + len,
        });

        char_pos += len;
        byte_pos = byte_idx + word.len();
    }

    tokens
}
