//! Index loading handler.

use crate::state::{LoadedIndex, SearchState};
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LoadIndexRequest {
    /// Path to a Sphinx build directory or its searchindex.js file
    pub path: String,
}

/// Load the index at `path`, replacing any previously loaded one.
pub async fn handle_load_index(state: &SearchState, path: &Path) -> anyhow::Result<String> {
    let canonical = tokio::fs::canonicalize(path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to resolve path '{}': {}", path.display(), e))?;

    let previous = state.loaded().await.map(|loaded| loaded.index_path);
    let loaded = state.load(&canonical).await?;

    Ok(format_response(&canonical, loaded.as_ref(), previous.as_deref()))
}

/// Format a user-friendly summary of the loaded index.
pub fn format_response(path: &Path, loaded: Option<&LoadedIndex>, previous: Option<&Path>) -> String {
    let Some(loaded) = loaded else {
        return format!(
            "Search index at {} contains no documents. Searches will return no results.\n",
            path.display()
        );
    };

    let index = &loaded.index;
    let mut response = format!("Search index loaded: {}\n", loaded.index_path.display());
    if let Some(previous) = previous.filter(|p| *p != loaded.index_path) {
        let _ = writeln!(response, "Replaced: {}", previous.display());
    }
    response.push('\n');

    let _ = writeln!(response, "Documents: {}", index.document_count());
    let _ = writeln!(response, "Objects: {}", index.object_count());
    let _ = writeln!(response, "Terms: {}", index.terms().count());
    if let Some(version) = index.env_version().get("sphinx") {
        let _ = writeln!(response, "Sphinx environment version: {}", version);
    }

    let preview: Vec<&str> = index.docnames().iter().take(10).map(String::as_str).collect();
    if !preview.is_empty() {
        let _ = writeln!(response, "\nDocuments ({}):", index.document_count());
        for docname in preview {
            let _ = writeln!(response, "  - {}", docname);
        }
        if index.document_count() > 10 {
            let _ = writeln!(response, "  ... and {} more", index.document_count() - 10);
        }
    }

    response
}

/// Resolve a user-supplied path, expanding a leading `~`.
pub fn resolve_path(path: &str) -> PathBuf {
    PathBuf::from(crate::server::expand_tilde(path).as_ref())
}
