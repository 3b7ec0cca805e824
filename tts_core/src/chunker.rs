//! Word-bounded text chunking.
//!
//! Long input is split into segments small enough for a single synthesis
//! call. Splitting is purely by whitespace: sentence and punctuation
//! boundaries are not considered.

/// Words per synthesis call unless configured otherwise.
pub const DEFAULT_MAX_WORDS_PER_CHUNK: usize = 800;

/// A contiguous run of input words, rejoined with single spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    pub text: String,
    pub word_count: usize,
}

impl TextSegment {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Number of whitespace-delimited words in `text`.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Split `text` into segments of at most `max_words` words each.
///
/// Whitespace-only input yields no segments. A `max_words` of zero is
/// treated as one.
pub fn chunk_text(text: &str, max_words: usize) -> Vec<TextSegment> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(max_words.max(1))
        .map(|chunk| TextSegment {
            text: chunk.join(" "),
            word_count: chunk.len(),
        })
        .collect()
}
