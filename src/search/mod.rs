//! Full-text search over a documentation build's search index.
//!
//! This module provides tokenization, the in-memory index model, query
//! parsing, scoring and the search session that ties them together.

// Module declarations
pub(crate) mod engine;
pub(crate) mod index;
pub(crate) mod query;
pub(crate) mod scoring;
pub(crate) mod tokenize;

// Public re-exports (used via lib.rs)
pub use engine::{MatchSource, SearchResult, SearchSession};
pub use index::{
    DocId, INDEX_FILE_NAME, Index, IndexEntryLocation, IndexState, ObjectEntry, ObjectRef,
    ObjectType, TitleLocation, load_index_file, load_index_str, strip_js_wrapper,
};
pub use query::{Query, parse_query};
pub use scoring::{containment_score, object_literal_score, object_name_score};
pub use tokenize::{Tokenizer, is_word_char, split_query, tokenize};
