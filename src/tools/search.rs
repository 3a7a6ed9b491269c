//! Search handler: ranked hits with optional previews.

use crate::search::{MatchSource, SearchResult, SearchSession};
use crate::state::SearchState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Search query: words, `-word` to exclude, or a symbol like `os.path.join`
    pub query: String,
    /// Maximum number of results to return (default: 10)
    #[serde(default = "default_limit")]
    pub limit: Option<usize>,
    /// Include a text preview around the match for each result (default: true)
    #[serde(default = "default_summaries")]
    pub summaries: Option<bool>,
}

#[allow(clippy::unnecessary_wraps)]
const fn default_limit() -> Option<usize> {
    Some(10)
}

#[allow(clippy::unnecessary_wraps)]
const fn default_summaries() -> Option<bool> {
    Some(true)
}

/// Execute a search against the loaded index.
pub async fn handle_search(state: &SearchState, request: SearchRequest) -> Result<String, String> {
    let Some(loaded) = state.loaded().await else {
        return Err("No search index loaded.\n\n\
             Use load_index with the path to a Sphinx build directory \
             (the one containing searchindex.js)."
            .to_string());
    };

    let session = SearchSession::new(loaded.index.clone(), state.config().clone());
    let query = session.parse_query(&request.query);
    let mut results = session.perform_search(&query);

    if results.is_empty() {
        let mut msg = format!("No results found for '{}'.\n\n", request.query);
        msg.push_str("Search tips:\n");
        msg.push_str("• Every word must appear in a page; try fewer words\n");
        msg.push_str("• Common words like 'the' or 'and' are ignored\n");
        msg.push_str("• Search uses stemming: 'configuring' matches 'configure'\n");
        if !query.excluded.is_empty() {
            msg.push_str("• Excluded words (prefixed with '-') remove pages containing them\n");
        }
        return Ok(msg);
    }

    let total = results.len();
    results.truncate(request.limit.unwrap_or(10));

    let previews = if request.summaries.unwrap_or(true) {
        loaded.previewer.previews(&results, &query.highlight).await
    } else {
        vec![None; results.len()]
    };

    Ok(format_search_results(&results, &previews, &request.query, total))
}

const fn source_label(source: MatchSource) -> &'static str {
    match source {
        MatchSource::Title => "title",
        MatchSource::IndexEntry => "index entry",
        MatchSource::Object => "object",
        MatchSource::Term => "text",
    }
}

/// Format search results into a readable string output.
fn format_search_results(
    results: &[SearchResult],
    previews: &[Option<String>],
    query: &str,
    total: usize,
) -> String {
    let mut output = format!("Search results for '{}' ({} of {}):\n\n", query, results.len(), total);

    for (idx, (result, preview)) in results.iter().zip(previews).enumerate() {
        let _ = writeln!(
            output,
            "{}. {} ({}{}) - score: {} [{}]",
            idx + 1,
            html_escape::decode_html_entities(&result.title),
            result.docname,
            result.fragment(),
            result.score,
            source_label(result.source)
        );
        if let Some(description) = &result.description {
            let _ = writeln!(output, "   {}", description);
        }
        if let Some(preview) = preview {
            let _ = writeln!(output, "   {}", preview);
        }
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    fn hit(title: &str, anchor: Option<&str>, score: i32) -> SearchResult {
        SearchResult {
            doc: 0,
            docname: "index".to_string(),
            title: title.to_string(),
            anchor: anchor.map(ToString::to_string),
            description: None,
            score,
            filename: "index.rst".to_string(),
            source: MatchSource::Title,
        }
    }

    #[test]
    fn test_titles_are_entity_decoded() {
        let results = [hit("&lt;no title&gt;", None, 5)];
        let output = format_search_results(&results, &[None], "C++", 1);
        check!(output.contains("1. <no title> (index) - score: 5 [title]"));
    }

    #[test]
    fn test_fragment_and_preview() {
        let results = [hit("Main Page", Some("main-page"), 100)];
        let output = format_search_results(&results, &[Some("Welcome".to_string())], "main page", 3);
        check!(output.starts_with("Search results for 'main page' (1 of 3):"));
        check!(output.contains("(index#main-page) - score: 100"));
        check!(output.contains("   Welcome\n"));
    }
}
