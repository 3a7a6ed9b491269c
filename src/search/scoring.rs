//! Relevance scoring and result ordering.
//!
//! Weights come from [`Scorer`]; the defaults rank exact object names and
//! title hits above plain body-term hits.

use super::index::DocId;
use crate::config::Scorer;
use std::cmp::Ordering;

/// Score for a query contained in a section title or index entry.
///
/// Returns `round(100 * query_len / text_len)` when the lowercased `text`
/// contains `query_lower` and the query covers at least half of the text,
/// `None` otherwise. Lengths are counted in characters.
pub fn containment_score(text: &str, query_lower: &str) -> Option<i32> {
    if query_lower.is_empty() {
        return None;
    }

    let text_lower = text.to_lowercase();
    let text_lower = text_lower.trim();
    let query_len = query_lower.chars().count();
    let text_len = text_lower.chars().count();

    if text_len == 0 || query_len * 2 < text_len || !text_lower.contains(query_lower) {
        return None;
    }

    Some((100.0 * query_len as f64 / text_len as f64).round() as i32)
}

/// Name-match component of an object score, before priority is added.
///
/// - `obj_name_match`: the full name or its last dotted part equals the term
/// - `obj_partial_match`: the last dotted part contains the term
/// - 0: the term only occurs in the container prefix
/// - `None`: the full name does not contain the term at all
pub fn object_name_score(full_name_lower: &str, term: &str, scorer: &Scorer) -> Option<i32> {
    if !full_name_lower.contains(term) {
        return None;
    }

    let last = full_name_lower.rsplit('.').next().unwrap_or(full_name_lower);
    if full_name_lower == term || last == term {
        Some(scorer.obj_name_match)
    } else if last.contains(term) {
        Some(scorer.obj_partial_match)
    } else {
        Some(0)
    }
}

/// Score for an object-name literal such as `os.path.join`: exact full or
/// short name, or a full name starting with the literal.
pub fn object_literal_score(
    full_name_lower: &str,
    short_name_lower: &str,
    literal: &str,
    scorer: &Scorer,
) -> Option<i32> {
    if full_name_lower == literal || short_name_lower == literal {
        Some(scorer.obj_name_match)
    } else if full_name_lower.starts_with(literal) {
        Some(scorer.obj_partial_match)
    } else {
        None
    }
}

/// Orders by score descending, then by position in `docnames`.
///
/// Used with a stable sort, so equal entries keep the order in which the
/// match passes produced them.
pub(crate) fn rank_order(a: (i32, DocId), b: (i32, DocId)) -> Ordering {
    b.0.cmp(&a.0).then(a.1.cmp(&b.1))
}
