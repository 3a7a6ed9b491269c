mod common;

use assert2::{check, let_assert};
use common::{BuildDir, build_dir};
use rstest::rstest;
use sphinx_search::SearchConfig;
use sphinx_search::state::SearchState;
use sphinx_search::tools::load_index::handle_load_index;
use sphinx_search::tools::search::{SearchRequest, handle_search};

fn request(query: &str) -> SearchRequest {
    SearchRequest {
        query: query.to_string(),
        limit: Some(10),
        summaries: Some(true),
    }
}

/// Test: searching before any index is loaded explains what to do.
#[tokio::test(flavor = "multi_thread")]
async fn search_without_index_fails() {
    let state = SearchState::new(SearchConfig::default());
    let_assert!(Err(message) = handle_search(&state, request("main")).await);
    check!(message.contains("load_index"));
}

/// Test: load_index reports what was loaded.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn load_index_reports_documents(build_dir: BuildDir) {
    let state = SearchState::new(SearchConfig::default());
    let result = handle_load_index(&state, build_dir.path()).await;
    let_assert!(Ok(output) = result);

    check!(output.contains("Search index loaded"), "{}", output);
    check!(output.contains("Documents: 2"));
    check!(output.contains("  - relevance"));
    check!(output.contains("Sphinx environment version: 61"));
}

#[tokio::test(flavor = "multi_thread")]
async fn load_index_missing_path_fails() {
    let state = SearchState::new(SearchConfig::default());
    let dir = tempfile::tempdir().unwrap();
    let result = handle_load_index(&state, &dir.path().join("missing")).await;
    check!(result.is_err());
}

/// Test: results carry previews cut from the rendered pages.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn search_includes_previews(build_dir: BuildDir) {
    let state = SearchState::new(SearchConfig::default());
    let_assert!(Ok(_) = handle_load_index(&state, build_dir.path()).await);

    let_assert!(Ok(output) = handle_search(&state, request("main page")).await);
    check!(output.contains("1. Main Page (index#main-page) - score: 100 [title]"), "{}", output);
    check!(output.contains("2. Main Page (index) - score: 15 [text]"), "{}", output);
    check!(output.contains("Welcome to the main page."));
    // the sidebar sits outside the main region
    check!(!output.contains("Navigation"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn search_respects_limit_and_summaries(build_dir: BuildDir) {
    let state = SearchState::new(SearchConfig::default());
    let_assert!(Ok(_) = handle_load_index(&state, build_dir.path()).await);

    let request = SearchRequest {
        query: "content".to_string(),
        limit: Some(1),
        summaries: Some(false),
    };
    let_assert!(Ok(output) = handle_search(&state, request).await);
    check!(output.contains("(1 of 2)"));
    check!(output.contains("1. Main Page (index) - score: 5 [text]"));
    check!(!output.contains("2."));
    check!(!output.contains("Welcome"));
}

/// Test: a page missing from the build only loses its own preview.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn search_survives_missing_page(build_dir: BuildDir) {
    std::fs::remove_file(build_dir.path().join("index.html")).unwrap();

    let state = SearchState::new(SearchConfig::default());
    let_assert!(Ok(_) = handle_load_index(&state, build_dir.path()).await);

    let_assert!(Ok(output) = handle_search(&state, request("content")).await);
    check!(output.contains("1. Main Page (index) - score: 5 [text]"));
    check!(output.contains("2. Relevance (relevance) - score: 5 [text]"));
    check!(output.contains("This document has main content about relevance."));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn search_no_results_gives_tips(build_dir: BuildDir) {
    let state = SearchState::new(SearchConfig::default());
    let_assert!(Ok(_) = handle_load_index(&state, build_dir.path()).await);

    let_assert!(Ok(output) = handle_search(&state, request("nonexistent -page")).await);
    check!(output.contains("No results found for 'nonexistent -page'"));
    check!(output.contains("Excluded words"));
}
