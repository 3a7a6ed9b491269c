//! Shared server state: the loaded index and the previewer for its build.

use crate::config::SearchConfig;
use crate::error::Result;
use crate::search::{INDEX_FILE_NAME, Index, IndexState, SearchSession, load_index_file};
use crate::snippet::{FsDocumentSource, Previewer};
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A loaded index together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedIndex {
    pub index: Arc<Index>,
    /// The `searchindex.js` file that was read.
    pub index_path: PathBuf,
    /// Build output directory holding the rendered pages.
    pub build_dir: PathBuf,
    pub previewer: Arc<Previewer<FsDocumentSource>>,
}

/// Central state shared by all tool calls.
///
/// Searches take a snapshot of the loaded index, so a concurrent
/// `load_index` never changes results mid-query.
#[derive(Debug)]
pub struct SearchState {
    config: Arc<SearchConfig>,
    loaded: RwLock<Option<LoadedIndex>>,
}

impl SearchState {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config: Arc::new(config),
            loaded: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &Arc<SearchConfig> {
        &self.config
    }

    /// The currently loaded index, if any.
    pub async fn loaded(&self) -> Option<LoadedIndex> {
        self.loaded.read().await.clone()
    }

    pub async fn index_state(&self) -> IndexState {
        self.loaded
            .read()
            .await
            .as_ref()
            .map_or(IndexState::NotLoaded, |loaded| {
                IndexState::Loaded(loaded.index.clone())
            })
    }

    /// A search session over the current index, or `None` before one is loaded.
    pub async fn session(&self) -> Option<SearchSession> {
        SearchSession::from_state(&self.index_state().await, self.config.clone())
    }

    /// Loads `searchindex.js` from `path` (the file itself or the build
    /// directory containing it) and replaces the current index.
    ///
    /// A payload that is not a populated index (`1` or `{}`) is accepted but
    /// leaves the state unloaded.
    pub async fn load(&self, path: &Path) -> Result<Option<LoadedIndex>> {
        let index_path = if path.is_dir() {
            path.join(INDEX_FILE_NAME)
        } else {
            path.to_path_buf()
        };

        let state = load_index_file(&index_path)
            .await
            .with_context(|| format!("Failed to load search index from {}", index_path.display()))?;

        let loaded = state.index().map(|index| {
            let build_dir = index_path
                .parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            let source = FsDocumentSource::from_config(&build_dir, &self.config);
            LoadedIndex {
                index: index.clone(),
                index_path: index_path.clone(),
                build_dir,
                previewer: Arc::new(Previewer::new(source, &self.config)),
            }
        });

        match &loaded {
            Some(loaded) => tracing::info!(
                "Loaded search index {} ({} documents, {} objects)",
                loaded.index_path.display(),
                loaded.index.document_count(),
                loaded.index.object_count()
            ),
            None => tracing::warn!(
                "Search index {} holds no data; searches will return nothing",
                index_path.display()
            ),
        }

        *self.loaded.write().await = loaded.clone();
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};

    const INDEX: &str = r#"Search.setIndex({"docnames":["index"],"filenames":["index.rst"],"titles":["Home"],"terms":{"sphinx":0},"titleterms":{"home":0}})"#;

    #[tokio::test]
    async fn test_load_from_build_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(INDEX_FILE_NAME), INDEX).unwrap();

        let state = SearchState::new(SearchConfig::default());
        check!(state.session().await.is_none());

        let_assert!(Ok(Some(loaded)) = state.load(dir.path()).await);
        check!(loaded.build_dir == dir.path());
        check!(loaded.index.document_count() == 1);

        let_assert!(Some(session) = state.session().await);
        check!(session.search("sphinx").len() == 1);
    }

    #[tokio::test]
    async fn test_empty_payload_unloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(INDEX_FILE_NAME);
        std::fs::write(&path, INDEX).unwrap();

        let state = SearchState::new(SearchConfig::default());
        let_assert!(Ok(Some(_)) = state.load(&path).await);

        std::fs::write(&path, "Search.setIndex(1)").unwrap();
        let_assert!(Ok(None) = state.load(&path).await);
        check!(!state.index_state().await.is_loaded());
    }

    #[tokio::test]
    async fn test_missing_file_keeps_previous_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(INDEX_FILE_NAME), INDEX).unwrap();

        let state = SearchState::new(SearchConfig::default());
        let_assert!(Ok(Some(_)) = state.load(dir.path()).await);
        check!(state.load(&dir.path().join("nope.js")).await.is_err());
        check!(state.index_state().await.is_loaded());
    }
}
