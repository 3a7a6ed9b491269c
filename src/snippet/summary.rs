//! Context window around a matched keyword.

use crate::config::SummaryConfig;

const ELLIPSIS: &str = "...";

/// Lowercases one character at a time so char offsets line up with the source.
fn fold_case(text: &str) -> String {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

/// Builds a summary of `text` around the last keyword (in `keywords` order)
/// that occurs in it.
///
/// Whitespace is collapsed first. The window is `config.length` characters
/// long and starts `config.context` characters before the keyword, or at the
/// start of the text when no keyword matches. `...` marks text cut off on
/// either side. Returns `None` for text with no visible characters.
pub fn make_summary(text: &str, keywords: &[String], config: &SummaryConfig) -> Option<String> {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return None;
    }

    let folded = fold_case(&text);
    let position = keywords
        .iter()
        .map(|keyword| fold_case(keyword))
        .filter(|keyword| !keyword.is_empty())
        .filter_map(|keyword| folded.find(&keyword))
        .next_back()
        .map_or(0, |byte| folded[..byte].chars().count());

    let chars: Vec<char> = text.chars().collect();
    let start = position.saturating_sub(config.context);
    let end = start.saturating_add(config.length).min(chars.len());

    let window: String = chars[start..end].iter().collect();
    let mut summary = String::with_capacity(window.len() + 2 * ELLIPSIS.len());
    if start > 0 {
        summary.push_str(ELLIPSIS);
    }
    summary.push_str(window.trim());
    if end < chars.len() {
        summary.push_str(ELLIPSIS);
    }

    Some(summary)
}
