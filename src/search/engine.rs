//! Search session: runs a parsed query against a loaded index.
//!
//! A search is made of independent match passes (section titles, index
//! entries, objects, object-name literal, full-text terms). Their results are
//! concatenated without deduplication: one document can legitimately appear
//! once per pass that matched it.

use super::index::{DocId, Index, IndexState, ObjectRef, full_name};
use super::query::{Query, parse_query};
use super::scoring::{containment_score, object_literal_score, object_name_score, rank_order};
use crate::config::SearchConfig;
use ahash::AHashMap;
use std::sync::Arc;

/// Which match pass produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Title,
    IndexEntry,
    Object,
    Term,
}

/// One ranked search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub doc: DocId,
    pub docname: String,
    /// Display title; section hits read `Document > Section`.
    pub title: String,
    /// Fragment identifier within the document, without the leading `#`.
    pub anchor: Option<String>,
    /// Object type and location, for object hits.
    pub description: Option<String>,
    pub score: i32,
    pub filename: String,
    pub source: MatchSource,
}

impl SearchResult {
    /// Anchor in URL form: `#fragment`, or empty for the document top.
    pub fn fragment(&self) -> String {
        self.anchor
            .as_deref()
            .map_or_else(String::new, |anchor| format!("#{anchor}"))
    }
}

/// A loaded index paired with the configuration used to query it.
///
/// Read-only: any number of searches may run against one session.
#[derive(Debug, Clone)]
pub struct SearchSession {
    index: Arc<Index>,
    config: Arc<SearchConfig>,
}

#[derive(Debug, Default)]
struct DocMatch {
    words: usize,
    score: i32,
}

impl SearchSession {
    pub const fn new(index: Arc<Index>, config: Arc<SearchConfig>) -> Self {
        Self { index, config }
    }

    /// Builds a session if the index has been loaded.
    pub fn from_state(state: &IndexState, config: Arc<SearchConfig>) -> Option<Self> {
        state.index().map(|index| Self::new(index.clone(), config))
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn parse_query(&self, raw: &str) -> Query {
        parse_query(raw, &self.config)
    }

    /// Parses and runs a query.
    pub fn search(&self, raw: &str) -> Vec<SearchResult> {
        self.perform_search(&self.parse_query(raw))
    }

    /// Runs every match pass and returns results by score descending, ties
    /// in `docnames` order. Non-main index entries rank after everything else.
    pub fn perform_search(&self, query: &Query) -> Vec<SearchResult> {
        if query.is_empty() {
            return vec![];
        }

        let start = std::time::Instant::now();
        let query_lower = query.raw.to_lowercase();

        let mut results = self.title_results(&query_lower);
        let (main_entries, mut secondary) = self.index_entry_results(&query_lower);
        results.extend(main_entries);
        for term in &query.object_terms {
            results.extend(self.object_results(term, &query.object_terms));
        }
        if let Some(literal) = &query.object_name {
            results.extend(self.object_literal_results(literal));
        }
        results.extend(self.term_results(query));

        results.sort_by(|a, b| rank_order((a.score, a.doc), (b.score, b.doc)));
        secondary.sort_by(|a, b| rank_order((a.score, a.doc), (b.score, b.doc)));
        results.append(&mut secondary);

        tracing::debug!(
            "Search '{}' produced {} results in {:?}",
            query.raw,
            results.len(),
            start.elapsed()
        );

        results
    }

    fn result(&self, doc: DocId, source: MatchSource) -> SearchResult {
        SearchResult {
            doc,
            docname: self.index.docname(doc).to_string(),
            title: self.index.title(doc).to_string(),
            anchor: None,
            description: None,
            score: 0,
            filename: self.index.filename(doc).to_string(),
            source,
        }
    }

    /// Section titles containing the whole query.
    fn title_results(&self, query_lower: &str) -> Vec<SearchResult> {
        let mut results = vec![];
        for (title, locations) in self.index.all_titles() {
            let Some(score) = containment_score(title, query_lower) else {
                continue;
            };
            for location in locations {
                let doc_title = self.index.title(location.doc);
                let mut result = self.result(location.doc, MatchSource::Title);
                result.title = if doc_title == title {
                    title.to_string()
                } else {
                    format!("{doc_title} > {title}")
                };
                result.anchor.clone_from(&location.anchor);
                result.score = score;
                results.push(result);
            }
        }
        results
    }

    /// Explicit index entries containing the whole query, split into main
    /// entries and secondary cross-references.
    fn index_entry_results(&self, query_lower: &str) -> (Vec<SearchResult>, Vec<SearchResult>) {
        let mut main = vec![];
        let mut secondary = vec![];
        for (entry, locations) in self.index.index_entries() {
            let Some(score) = containment_score(entry, query_lower) else {
                continue;
            };
            for location in locations {
                let mut result = self.result(location.doc, MatchSource::IndexEntry);
                result.anchor.clone_from(&location.anchor);
                result.score = score;
                if location.is_main {
                    main.push(result);
                } else {
                    secondary.push(result);
                }
            }
        }
        (main, secondary)
    }

    fn object_result(&self, object: ObjectRef<'_>, full: String, score: i32) -> SearchResult {
        let entry = object.entry;
        let object_type = self.index.object_type(entry.type_index);
        let label = object_type.map_or("", |t| t.label.as_str());

        let anchor = match entry.anchor.as_str() {
            "" => full.clone(),
            "-" => format!("{}-{}", object_type.map_or("", |t| t.name.as_str()), full),
            anchor => anchor.to_string(),
        };

        let mut result = self.result(entry.doc, MatchSource::Object);
        result.description = Some(format!("{}, in {}", label, self.index.title(entry.doc)));
        result.title = full;
        result.anchor = Some(anchor);
        result.score = self.config.scorer.object_score(score, entry.priority);
        result
    }

    /// Objects whose full name contains `term`. With several object terms,
    /// the remaining ones must appear in the object's prefix, name, type
    /// label or document title.
    fn object_results(&self, term: &str, all_terms: &[String]) -> Vec<SearchResult> {
        let scorer = &self.config.scorer;
        let mut results = vec![];

        for object in self.index.objects() {
            let full = object.full_name();
            let Some(score) = object_name_score(&full.to_lowercase(), term, scorer) else {
                continue;
            };

            if all_terms.len() > 1 {
                let label = self
                    .index
                    .object_type(object.entry.type_index)
                    .map_or("", |t| t.label.as_str());
                let haystack = format!(
                    "{} {} {} {}",
                    object.prefix,
                    object.entry.name,
                    label,
                    self.index.title(object.entry.doc)
                )
                .to_lowercase();
                if all_terms
                    .iter()
                    .filter(|other| other.as_str() != term)
                    .any(|other| !haystack.contains(other.as_str()))
                {
                    continue;
                }
            }

            results.push(self.object_result(object, full, score));
        }

        results
    }

    /// Objects named exactly by a symbol literal, or whose full name starts with it.
    fn object_literal_results(&self, literal: &str) -> Vec<SearchResult> {
        let scorer = &self.config.scorer;
        let mut results = vec![];

        // Exact short-name hits come straight from the name table
        let short = literal.rsplit('.').next().unwrap_or(literal);
        let mut exact: Vec<ObjectRef<'_>> = self
            .index
            .objects_named(short)
            .into_iter()
            .filter(|object| {
                let name = object.entry.name.to_lowercase();
                name == literal || full_name(object.prefix, &name) == literal
            })
            .collect();

        for object in self.index.objects() {
            if exact.contains(&object) {
                continue;
            }
            let full = object.full_name().to_lowercase();
            match object_literal_score(&full, &object.entry.name.to_lowercase(), literal, scorer) {
                Some(score) if score == scorer.obj_name_match => exact.push(object),
                Some(score) => results.push(self.object_result(object, object.full_name(), score)),
                None => {}
            }
        }

        let mut exact_results: Vec<SearchResult> = exact
            .into_iter()
            .map(|object| self.object_result(object, object.full_name(), scorer.obj_name_match))
            .collect();
        exact_results.append(&mut results);
        exact_results
    }

    /// Full-text pass: documents containing every required term (exactly or,
    /// for words longer than two characters without an exact key, as a
    /// substring of an indexed term) and none of the excluded terms.
    fn term_results(&self, query: &Query) -> Vec<SearchResult> {
        if query.terms.is_empty() {
            return vec![];
        }

        let scorer = &self.config.scorer;
        let index = &self.index;
        let mut matches: AHashMap<DocId, DocMatch> = AHashMap::new();

        for word in &query.terms {
            let mut records: Vec<(&[DocId], i32)> = vec![];
            if let Some(docs) = index.term_postings(word) {
                records.push((docs, scorer.term));
            }
            if let Some(docs) = index.title_postings(word) {
                records.push((docs, scorer.title));
            }

            if word.chars().count() > 2 {
                if index.term_postings(word).is_none() {
                    records.extend(
                        index
                            .terms()
                            .filter(|(term, _)| term.contains(word.as_str()))
                            .map(|(_, docs)| (docs, scorer.partial_term)),
                    );
                }
                if index.title_postings(word).is_none() {
                    records.extend(
                        index
                            .title_terms()
                            .filter(|(term, _)| term.contains(word.as_str()))
                            .map(|(_, docs)| (docs, scorer.partial_title)),
                    );
                }
            }

            // Strict AND: a required word with no postings empties the result
            if records.is_empty() {
                tracing::debug!("Required term '{}' not in index", word);
                return vec![];
            }

            let mut word_scores: AHashMap<DocId, i32> = AHashMap::new();
            for (docs, score) in records {
                for doc in docs {
                    let best = word_scores.entry(*doc).or_insert(score);
                    *best = (*best).max(score);
                }
            }
            for (doc, score) in word_scores {
                let entry = matches.entry(doc).or_default();
                entry.words += 1;
                entry.score = entry.score.max(score);
            }
        }

        let excluded = |doc: DocId| {
            query.excluded.iter().any(|term| {
                index.term_postings(term).is_some_and(|docs| docs.contains(&doc))
                    || index.title_postings(term).is_some_and(|docs| docs.contains(&doc))
            })
        };

        let mut docs: Vec<(DocId, i32)> = matches
            .into_iter()
            .filter(|(doc, m)| m.words == query.terms.len() && !excluded(*doc))
            .map(|(doc, m)| (doc, m.score))
            .collect();
        docs.sort_unstable_by_key(|(doc, _)| *doc);

        docs.into_iter()
            .map(|(doc, score)| {
                let mut result = self.result(doc, MatchSource::Term);
                result.score = score;
                result
            })
            .collect()
    }
}
