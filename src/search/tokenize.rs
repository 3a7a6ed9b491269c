//! Query splitting, normalization and stemming.
//!
//! The index builder and the query side must agree on what a word is, or no
//! term ever matches. A word is a maximal run of letters, digits, `_` and
//! emoji-presentation characters; everything else (whitespace, ASCII
//! punctuation, symbols) separates words. Runs are never cut inside a code
//! point, so CJK phrases such as `中国` and emoji such as `😁😁` stay whole.

use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::sync::LazyLock;

static WORD_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\p{Letter}\p{Number}_\p{Emoji_Presentation}]+")
        .expect("word separator pattern is valid")
});

/// Returns true for characters that belong inside a word.
pub fn is_word_char(c: char) -> bool {
    !WORD_SEPARATOR.is_match(c.encode_utf8(&mut [0; 4]))
}

/// Splits a query string into words, preserving original case.
///
/// ```
/// use sphinx_search::search::split_query;
///
/// assert_eq!(split_query("   Hello    World   "), ["Hello", "World"]);
/// assert_eq!(split_query("Pin-Code"), ["Pin", "Code"]);
/// ```
pub fn split_query(query: &str) -> Vec<&str> {
    WORD_SEPARATOR
        .split(query)
        .filter(|word| !word.is_empty())
        .collect()
}

/// Splits text into lowercase words. Used identically for indexed text and queries.
pub fn tokenize(text: &str) -> Vec<String> {
    split_query(text)
        .into_iter()
        .map(str::to_lowercase)
        .collect()
}

/// Stemmer bound to the language the index was built with.
pub struct Tokenizer {
    stemmer: Stemmer,
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer").finish_non_exhaustive()
    }
}

impl Tokenizer {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            stemmer: Stemmer::create(algorithm),
        }
    }

    /// Stems an already lowercased word.
    pub fn stem(&self, word: &str) -> String {
        self.stemmer.stem(word).into_owned()
    }
}
