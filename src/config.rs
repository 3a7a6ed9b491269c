//! Engine configuration: scoring weights, stopwords, stemming language,
//! summary window and HTML layout of the documentation build.

use crate::error::ConfigError;
use rust_stemmers::Algorithm;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// English stopwords ignored when parsing queries.
pub const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "near", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there",
    "these", "they", "this", "to", "was", "will", "with",
];

/// Top-level configuration. Every field has a default, so an empty TOML
/// file is a valid configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Stemming language, must match the language the index was built with.
    pub language: Language,
    /// Query words ignored for full-text term search.
    pub stopwords: Vec<String>,
    pub scorer: Scorer,
    pub summary: SummaryConfig,
    /// How document names map onto HTML files of the build.
    pub builder: BuilderKind,
    pub file_suffix: String,
    /// Number of fetched HTML documents kept in memory.
    pub html_cache_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            stopwords: ENGLISH_STOPWORDS.iter().map(|s| (*s).to_string()).collect(),
            scorer: Scorer::default(),
            summary: SummaryConfig::default(),
            builder: BuilderKind::default(),
            file_suffix: ".html".to_string(),
            html_cache_size: 64,
        }
    }
}

impl SearchConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.iter().any(|s| s == word)
    }
}

/// Stemmer languages supported by `rust-stemmers`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Arabic,
    Danish,
    Dutch,
    #[default]
    English,
    Finnish,
    French,
    German,
    Greek,
    Hungarian,
    Italian,
    Norwegian,
    Portuguese,
    Romanian,
    Russian,
    Spanish,
    Swedish,
    Tamil,
    Turkish,
}

impl Language {
    pub const fn algorithm(self) -> Algorithm {
        match self {
            Self::Arabic => Algorithm::Arabic,
            Self::Danish => Algorithm::Danish,
            Self::Dutch => Algorithm::Dutch,
            Self::English => Algorithm::English,
            Self::Finnish => Algorithm::Finnish,
            Self::French => Algorithm::French,
            Self::German => Algorithm::German,
            Self::Greek => Algorithm::Greek,
            Self::Hungarian => Algorithm::Hungarian,
            Self::Italian => Algorithm::Italian,
            Self::Norwegian => Algorithm::Norwegian,
            Self::Portuguese => Algorithm::Portuguese,
            Self::Romanian => Algorithm::Romanian,
            Self::Russian => Algorithm::Russian,
            Self::Spanish => Algorithm::Spanish,
            Self::Swedish => Algorithm::Swedish,
            Self::Tamil => Algorithm::Tamil,
            Self::Turkish => Algorithm::Turkish,
        }
    }
}

/// Integer relevance weights.
///
/// Object scores are floored at [`Scorer::term_ceiling`], and section titles
/// score at least 50, so neither ranks below a term-pass match with the
/// default weights.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Scorer {
    /// Object whose full name or last dotted component equals the query term.
    pub obj_name_match: i32,
    /// Object whose last dotted component contains the query term.
    pub obj_partial_match: i32,
    /// Extra score per object priority, keyed by the priority in the index.
    #[serde(deserialize_with = "priority_table")]
    pub obj_prio: BTreeMap<i32, i32>,
    pub obj_prio_default: i32,
    /// Term found in a document title.
    pub title: i32,
    /// Query word is a substring of a title term.
    pub partial_title: i32,
    /// Term found in a document body.
    pub term: i32,
    /// Query word is a substring of a body term.
    pub partial_term: i32,
}

impl Default for Scorer {
    fn default() -> Self {
        Self {
            obj_name_match: 11,
            obj_partial_match: 6,
            obj_prio: BTreeMap::from([(0, 15), (1, 5), (2, -5)]),
            obj_prio_default: 0,
            title: 15,
            partial_title: 7,
            term: 5,
            partial_term: 2,
        }
    }
}

impl Scorer {
    pub fn object_priority(&self, priority: i32) -> i32 {
        self.obj_prio
            .get(&priority)
            .copied()
            .unwrap_or(self.obj_prio_default)
    }

    /// Highest weight the term pass can give a single document.
    pub fn term_ceiling(&self) -> i32 {
        self.title
            .max(self.partial_title)
            .max(self.term)
            .max(self.partial_term)
    }

    /// Name score plus priority bonus, never below [`Self::term_ceiling`].
    pub fn object_score(&self, name_score: i32, priority: i32) -> i32 {
        (name_score + self.object_priority(priority)).max(self.term_ceiling())
    }
}

/// TOML table keys are always strings; priorities are integers.
fn priority_table<'de, D>(deserializer: D) -> Result<BTreeMap<i32, i32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = BTreeMap::<String, i32>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, weight)| {
            key.trim()
                .parse::<i32>()
                .map(|prio| (prio, weight))
                .map_err(|_| serde::de::Error::custom(format!("invalid object priority '{key}'")))
        })
        .collect()
}

/// Window used to cut a preview out of a document's text.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Characters kept before the matched keyword.
    pub context: usize,
    /// Total characters in the preview window.
    pub length: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            context: 120,
            length: 240,
        }
    }
}

/// Output layout of the documentation build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuilderKind {
    /// `docname` + suffix, e.g. `guide/intro.html`.
    #[default]
    Html,
    /// One directory per document, e.g. `guide/intro/index.html`.
    DirHtml,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = SearchConfig::from_toml("").unwrap();
        check!(config.language == Language::English);
        check!(config.scorer.title == 15);
        check!(config.summary.length == 240);
        check!(config.is_stopword("the"));
        check!(!config.is_stopword("sphinx"));
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let config = SearchConfig::from_toml(
            r#"
            language = "german"
            builder = "dirhtml"
            stopwords = ["der", "die"]

            [scorer]
            term = 3

            [scorer.obj_prio]
            0 = 20
            "#,
        )
        .unwrap();
        check!(config.language == Language::German);
        check!(config.builder == BuilderKind::DirHtml);
        check!(config.is_stopword("die"));
        check!(!config.is_stopword("the"));
        check!(config.scorer.term == 3);
        check!(config.scorer.title == 15);
        check!(config.scorer.object_priority(0) == 20);
        check!(config.scorer.object_priority(7) == 0);
    }

    #[rstest]
    #[case(11, 0, 26)]
    #[case(11, 1, 16)]
    #[case(6, 2, 15)]
    #[case(0, 2, 15)]
    #[case(6, 9, 15)]
    fn object_score_is_floored_at_term_ceiling(
        #[case] name_score: i32,
        #[case] priority: i32,
        #[case] expected: i32,
    ) {
        let scorer = Scorer::default();
        check!(scorer.term_ceiling() == 15);
        check!(scorer.object_score(name_score, priority) == expected);
    }

    #[test]
    fn unknown_language_is_rejected() {
        check!(SearchConfig::from_toml(r#"language = "klingon""#).is_err());
    }
}
