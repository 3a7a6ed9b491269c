//! Shared test fixtures and utilities for integration tests.
//!
//! # Available Fixtures
//!
//! - `cpp_index`: one page documenting a C++ class, with `objects` and index entries
//! - `multiterm_index`: two pages, one of them titled "Main Page"
//! - `build_dir`: a temporary build directory holding the multiterm index and
//!   its rendered pages, for tests that fetch HTML
//!
//! Fixture files live under `tests/fixtures/<name>/`.

#![allow(dead_code)] // Helpers used across different integration test crates

use rstest::fixture;
use sphinx_search::search::INDEX_FILE_NAME;
use sphinx_search::{IndexState, SearchConfig, SearchSession, load_index_str};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Returns the directory holding test fixtures.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Reads `tests/fixtures/<name>`.
pub fn read_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

/// Loads `tests/fixtures/<name>/searchindex.js` into a session with default config.
pub fn session_for(name: &str) -> SearchSession {
    let text = read_fixture(&format!("{name}/{INDEX_FILE_NAME}"));
    let state = load_index_str(&text).expect("fixture index should parse");
    let IndexState::Loaded(index) = state else {
        panic!("fixture index {name} holds no documents");
    };
    SearchSession::new(index, Arc::new(SearchConfig::default()))
}

#[fixture]
pub fn cpp_index() -> SearchSession {
    session_for("cpp")
}

#[fixture]
pub fn multiterm_index() -> SearchSession {
    session_for("multiterm")
}

/// A temporary Sphinx `html` build: the multiterm index plus rendered pages.
pub struct BuildDir {
    _temp: TempDir,
    root: PathBuf,
}

impl BuildDir {
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Writes a file relative to the build root, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directory");
        }
        std::fs::write(&path, content).expect("Failed to write file");
    }
}

pub const MAIN_PAGE: &str = r##"<html><body>
<div class="sphinxsidebar">Navigation</div>
<div class="body" role="main">
  <section id="main-page">
    <h1>Main Page<a class="headerlink" href="#main-page">¶</a></h1>
    <p>Welcome to the main page. This document has content.</p>
  </section>
</div>
</body></html>"##;

pub const RELEVANCE_PAGE: &str = r##"<html><body>
<div class="body" role="main">
  <section id="relevance">
    <h1>Relevance<a class="headerlink" href="#relevance">¶</a></h1>
    <p>This document has main content about relevance.</p>
  </section>
</div>
</body></html>"##;

#[fixture]
pub fn build_dir() -> BuildDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let root = temp.path().to_path_buf();
    let dir = BuildDir { _temp: temp, root };

    dir.write(INDEX_FILE_NAME, &read_fixture("multiterm/searchindex.js"));
    dir.write("index.html", MAIN_PAGE);
    dir.write("relevance.html", RELEVANCE_PAGE);
    dir
}
