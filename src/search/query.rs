//! Query parsing: turns a raw query string into required, excluded,
//! highlight and object-name terms.

use super::tokenize::{Tokenizer, is_word_char, split_query};
use crate::config::SearchConfig;

/// A parsed search query. Derived per search invocation and discarded after.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Trimmed original query, used for title and index-entry matching.
    pub raw: String,
    /// Stemmed lowercase terms that every result must contain.
    pub terms: Vec<String>,
    /// Stemmed lowercase terms that no term-search result may contain.
    pub excluded: Vec<String>,
    /// Unstemmed lowercase words, used to locate the match in a summary.
    pub highlight: Vec<String>,
    /// Lowercase words matched against object names.
    pub object_terms: Vec<String>,
    /// Verbatim lowercase symbol such as `c++` or `os.path.join`, matched
    /// against full object names even though splitting would mangle it.
    pub object_name: Option<String>,
}

impl Query {
    /// True when the query can never produce a result.
    ///
    /// A query whose words are all stopwords has no `terms` but is not empty:
    /// titles, index entries and objects are still matched against `raw` and
    /// `object_terms`.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
            && self.object_terms.is_empty()
            && self.object_name.is_none()
            && self.raw.is_empty()
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Parses a raw query. Never fails: blank input yields an empty [`Query`].
///
/// Words prefixed with `-` are excluded terms. Stopwords and purely numeric
/// words are ignored for term search but still take part in object search.
pub fn parse_query(raw: &str, config: &SearchConfig) -> Query {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Query::default();
    }

    let tokenizer = Tokenizer::new(config.language.algorithm());
    let mut query = Query {
        raw: trimmed.to_string(),
        ..Query::default()
    };

    for word in trimmed.split_whitespace() {
        let (negated, word) = match word.strip_prefix('-') {
            Some(rest) if !rest.is_empty() => (true, rest),
            _ => (false, word),
        };

        for token in split_query(word) {
            let lower = token.to_lowercase();
            if negated {
                push_unique(&mut query.excluded, tokenizer.stem(&lower));
                continue;
            }

            push_unique(&mut query.object_terms, lower.clone());

            if config.is_stopword(&lower) || lower.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            push_unique(&mut query.terms, tokenizer.stem(&lower));
            push_unique(&mut query.highlight, lower);
        }
    }

    let lower = trimmed.to_lowercase();
    if !lower.contains(char::is_whitespace)
        && !lower.starts_with('-')
        && lower.chars().any(|c| !is_word_char(c))
        && lower.chars().any(is_word_char)
    {
        query.object_name = Some(lower);
    }

    tracing::debug!(
        "Parsed query '{}': terms={:?} excluded={:?} object_name={:?}",
        query.raw,
        query.terms,
        query.excluded,
        query.object_name
    );

    query
}
