//! Client-side search for Sphinx-generated documentation.
//!
//! Loads a build's `searchindex.js`, answers queries against it with the
//! same ranking rules as the browser search page, and builds text previews
//! from the rendered HTML. The `sphinx-search-mcp` binary exposes this over
//! MCP on stdio.

pub mod config;
pub mod error;
pub mod search;
pub mod server;
pub mod snippet;
pub mod state;
pub mod tools;
pub mod tracing;

pub use config::SearchConfig;
pub use error::{ConfigError, FetchError, IndexError, Result};
pub use search::{
    Index, IndexState, MatchSource, Query, SearchResult, SearchSession, load_index_file,
    load_index_str, parse_query, split_query,
};
pub use snippet::{DocumentSource, FsDocumentSource, Previewer, html_to_text, make_summary};
