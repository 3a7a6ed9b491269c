//! In-memory model of a serialized documentation search index.
//!
//! The documentation build writes `searchindex.js`, a `Search.setIndex({...})`
//! call wrapping a JSON record. Field shapes vary between builds (a posting
//! list may be a bare integer, an empty index may be `{}`), so loading is
//! lenient: malformed records are dropped with a warning and never abort the
//! load. Every document id kept in the model is valid for `docnames`.

use crate::error::IndexError;
use ahash::AHashMap;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Position of a document in `docnames`.
pub type DocId = usize;

/// File name of the serialized index inside a build directory.
pub const INDEX_FILE_NAME: &str = "searchindex.js";

/// Loading state of the page-level search session.
#[derive(Debug, Clone, Default)]
pub enum IndexState {
    #[default]
    NotLoaded,
    Loaded(Arc<Index>),
}

impl IndexState {
    /// Interprets a decoded index payload. Payloads that are not a record
    /// with `docnames` (e.g. `1` or `{}`) mean no index is available yet.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) if map.get("docnames").is_some_and(Value::is_array) => {
                Self::Loaded(Arc::new(Index::from_record(&map)))
            }
            other => {
                tracing::debug!("Search index payload has no documents: {}", shape(&other));
                Self::NotLoaded
            }
        }
    }

    pub fn index(&self) -> Option<&Arc<Index>> {
        match self {
            Self::Loaded(index) => Some(index),
            Self::NotLoaded => None,
        }
    }

    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// A documentation object (function, class, ...) cross-referenced by the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub doc: DocId,
    /// Key into [`Index::object_type`].
    pub type_index: usize,
    pub priority: i32,
    /// `""` means "use the full name", `"-"` means "type label + full name".
    pub anchor: String,
    pub name: String,
}

/// Display names of an object type, from `objnames`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectType {
    pub domain: String,
    pub name: String,
    pub label: String,
}

/// A section title occurrence, from `alltitles`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleLocation {
    pub doc: DocId,
    pub anchor: Option<String>,
}

/// An explicit index directive entry, from `indexentries`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntryLocation {
    pub doc: DocId,
    pub anchor: Option<String>,
    pub is_main: bool,
}

/// Reference to one object: its container prefix and position in that container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectRef<'a> {
    pub prefix: &'a str,
    pub entry: &'a ObjectEntry,
}

impl ObjectRef<'_> {
    /// Dotted full name, e.g. `os.path.join`.
    pub fn full_name(&self) -> String {
        full_name(self.prefix, &self.entry.name)
    }
}

pub(crate) fn full_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Immutable search index snapshot for one documentation build.
#[derive(Debug, Default)]
pub struct Index {
    docnames: Vec<String>,
    titles: Vec<String>,
    filenames: Vec<String>,
    terms: AHashMap<String, Vec<DocId>>,
    title_terms: AHashMap<String, Vec<DocId>>,
    /// Container name → objects, ordered by container name
    objects: BTreeMap<String, Vec<ObjectEntry>>,
    /// Lowercased short name → (container, position) of every object with that name
    object_names: AHashMap<String, Vec<(String, usize)>>,
    object_types: BTreeMap<usize, ObjectType>,
    all_titles: BTreeMap<String, Vec<TitleLocation>>,
    index_entries: BTreeMap<String, Vec<IndexEntryLocation>>,
    env_version: BTreeMap<String, Value>,
}

impl Index {
    fn from_record(record: &serde_json::Map<String, Value>) -> Self {
        let docnames = string_list(record.get("docnames"));
        let doc_count = docnames.len();
        let valid = |doc: &DocId| *doc < doc_count;

        let mut titles = string_list(record.get("titles"));
        titles.resize(doc_count, String::new());
        let mut filenames = string_list(record.get("filenames"));
        filenames.resize(doc_count, String::new());

        let terms = postings_map(record.get("terms"), doc_count, "terms");
        let title_terms = postings_map(record.get("titleterms"), doc_count, "titleterms");

        let mut objects: BTreeMap<String, Vec<ObjectEntry>> = BTreeMap::new();
        let mut skipped = 0usize;
        if let Some(Value::Object(containers)) = record.get("objects") {
            for (prefix, entries) in containers {
                let parsed: Vec<ObjectEntry> = match entries {
                    Value::Array(list) => list.iter().filter_map(object_entry).collect(),
                    // Older builds key objects by name inside each container
                    Value::Object(named) => named
                        .iter()
                        .filter_map(|(name, fields)| named_object_entry(name, fields))
                        .collect(),
                    _ => vec![],
                };
                let total = match entries {
                    Value::Array(list) => list.len(),
                    Value::Object(named) => named.len(),
                    _ => 1,
                };
                let kept: Vec<ObjectEntry> =
                    parsed.into_iter().filter(|e| valid(&e.doc)).collect();
                skipped += total - kept.len();
                if !kept.is_empty() {
                    objects.insert(prefix.clone(), kept);
                }
            }
        }
        if skipped > 0 {
            tracing::warn!("Skipped {} malformed object records in search index", skipped);
        }

        let mut object_names: AHashMap<String, Vec<(String, usize)>> = AHashMap::new();
        for (prefix, entries) in &objects {
            for (position, entry) in entries.iter().enumerate() {
                object_names
                    .entry(entry.name.to_lowercase())
                    .or_default()
                    .push((prefix.clone(), position));
            }
        }

        let object_types = keyed_records(record.get("objnames"))
            .filter_map(|(key, value)| {
                let parts = string_list(Some(value));
                match parts.as_slice() {
                    [domain, name, label, ..] => Some((
                        key,
                        ObjectType {
                            domain: domain.clone(),
                            name: name.clone(),
                            label: label.clone(),
                        },
                    )),
                    _ => None,
                }
            })
            .collect();

        let all_titles = locations_map(record.get("alltitles"), |fields| {
            let doc = as_doc(fields.first()?)?;
            let anchor = fields.get(1).and_then(anchor_string);
            valid(&doc).then_some(TitleLocation { doc, anchor })
        });

        let index_entries = locations_map(record.get("indexentries"), |fields| {
            let doc = as_doc(fields.first()?)?;
            let anchor = fields.get(1).and_then(anchor_string);
            let is_main = fields.get(2).and_then(Value::as_bool).unwrap_or(true);
            valid(&doc).then_some(IndexEntryLocation {
                doc,
                anchor,
                is_main,
            })
        });

        let env_version = match record.get("envversion") {
            Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            _ => BTreeMap::new(),
        };

        let index = Self {
            docnames,
            titles,
            filenames,
            terms,
            title_terms,
            objects,
            object_names,
            object_types,
            all_titles,
            index_entries,
            env_version,
        };

        tracing::debug!(
            "Decoded search index: {} documents, {} terms, {} title terms, {} objects",
            index.document_count(),
            index.terms.len(),
            index.title_terms.len(),
            index.object_count()
        );

        index
    }

    pub fn document_count(&self) -> usize {
        self.docnames.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.values().map(Vec::len).sum()
    }

    pub fn docnames(&self) -> &[String] {
        &self.docnames
    }

    pub fn docname(&self, doc: DocId) -> &str {
        self.docnames.get(doc).map_or("", String::as_str)
    }

    pub fn title(&self, doc: DocId) -> &str {
        self.titles.get(doc).map_or("", String::as_str)
    }

    pub fn filename(&self, doc: DocId) -> &str {
        self.filenames.get(doc).map_or("", String::as_str)
    }

    /// Documents whose body contains the term.
    pub fn term_postings(&self, term: &str) -> Option<&[DocId]> {
        self.terms.get(term).map(Vec::as_slice)
    }

    /// Documents whose title contains the term.
    pub fn title_postings(&self, term: &str) -> Option<&[DocId]> {
        self.title_terms.get(term).map(Vec::as_slice)
    }

    /// Body terms in sorted order, for partial (substring) matching.
    pub fn terms(&self) -> impl Iterator<Item = (&str, &[DocId])> {
        sorted_postings(&self.terms)
    }

    /// Title terms in sorted order, for partial (substring) matching.
    pub fn title_terms(&self) -> impl Iterator<Item = (&str, &[DocId])> {
        sorted_postings(&self.title_terms)
    }

    /// All objects, ordered by container name then index order.
    pub fn objects(&self) -> impl Iterator<Item = ObjectRef<'_>> {
        self.objects.iter().flat_map(|(prefix, entries)| {
            entries.iter().map(move |entry| ObjectRef {
                prefix: prefix.as_str(),
                entry,
            })
        })
    }

    /// Objects whose short (undotted) name equals `name`, case-insensitively.
    pub fn objects_named(&self, name: &str) -> Vec<ObjectRef<'_>> {
        self.object_names
            .get(&name.to_lowercase())
            .into_iter()
            .flatten()
            .filter_map(|(prefix, position)| {
                let (prefix, entries) = self.objects.get_key_value(prefix)?;
                Some(ObjectRef {
                    prefix: prefix.as_str(),
                    entry: entries.get(*position)?,
                })
            })
            .collect()
    }

    pub fn object_type(&self, type_index: usize) -> Option<&ObjectType> {
        self.object_types.get(&type_index)
    }

    pub fn all_titles(&self) -> impl Iterator<Item = (&str, &[TitleLocation])> {
        self.all_titles
            .iter()
            .map(|(title, locations)| (title.as_str(), locations.as_slice()))
    }

    pub fn index_entries(&self) -> impl Iterator<Item = (&str, &[IndexEntryLocation])> {
        self.index_entries
            .iter()
            .map(|(entry, locations)| (entry.as_str(), locations.as_slice()))
    }

    /// Component versions of the tool that produced the index. Informational only.
    pub fn env_version(&self) -> &BTreeMap<String, Value> {
        &self.env_version
    }
}

/// Removes the `Search.setIndex(...)` wrapper, if present.
pub fn strip_js_wrapper(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("Search.setIndex(")
        .and_then(|rest| {
            let rest = rest.trim_end();
            let rest = rest.strip_suffix(';').unwrap_or(rest).trim_end();
            rest.strip_suffix(')')
        })
        .unwrap_or(trimmed)
}

/// Decodes index text: bare JSON or the `searchindex.js` format.
pub fn load_index_str(text: &str) -> Result<IndexState, IndexError> {
    let value: Value = serde_json::from_str(strip_js_wrapper(text))?;
    Ok(IndexState::from_value(value))
}

/// Reads an index file. A directory is taken to be a build output directory
/// containing [`INDEX_FILE_NAME`].
pub async fn load_index_file(path: &Path) -> Result<IndexState, IndexError> {
    let path = if tokio::fs::metadata(path)
        .await
        .is_ok_and(|meta| meta.is_dir())
    {
        path.join(INDEX_FILE_NAME)
    } else {
        path.to_path_buf()
    };

    let text = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| IndexError::Io {
            path: path.clone(),
            source,
        })?;

    tracing::debug!("Read search index from {} ({} bytes)", path.display(), text.len());
    load_index_str(&text)
}

fn shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "record without docnames",
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().unwrap_or_default().to_string())
            .collect(),
        _ => vec![],
    }
}

fn as_doc(value: &Value) -> Option<DocId> {
    value.as_u64().and_then(|n| usize::try_from(n).ok())
}

fn anchor_string(value: &Value) -> Option<String> {
    value.as_str().filter(|s| !s.is_empty()).map(str::to_string)
}

/// Decodes a posting value: a single document id or a list of them.
fn postings(value: &Value, doc_count: usize) -> Vec<DocId> {
    let mut docs: Vec<DocId> = match value {
        Value::Array(items) => items.iter().filter_map(as_doc).collect(),
        other => as_doc(other).into_iter().collect(),
    };
    docs.retain(|doc| *doc < doc_count);
    docs.sort_unstable();
    docs.dedup();
    docs
}

fn postings_map(value: Option<&Value>, doc_count: usize, field: &str) -> AHashMap<String, Vec<DocId>> {
    let Some(Value::Object(map)) = value else {
        return AHashMap::new();
    };

    let mut dropped = 0usize;
    let result: AHashMap<String, Vec<DocId>> = map
        .iter()
        .filter_map(|(term, value)| {
            let docs = postings(value, doc_count);
            if docs.is_empty() {
                dropped += 1;
                None
            } else {
                Some((term.clone(), docs))
            }
        })
        .collect();

    if dropped > 0 {
        tracing::warn!("Dropped {} {} entries with no valid documents", dropped, field);
    }
    result
}

fn sorted_postings(map: &AHashMap<String, Vec<DocId>>) -> impl Iterator<Item = (&str, &[DocId])> {
    let mut entries: Vec<_> = map
        .iter()
        .map(|(term, docs)| (term.as_str(), docs.as_slice()))
        .collect();
    entries.sort_unstable_by_key(|(term, _)| *term);
    entries.into_iter()
}

/// `[doc, type, priority, anchor, name]`
fn object_entry(value: &Value) -> Option<ObjectEntry> {
    let fields = value.as_array()?;
    let [doc, type_index, priority, anchor, name, ..] = fields.as_slice() else {
        return None;
    };
    Some(ObjectEntry {
        doc: as_doc(doc)?,
        type_index: as_doc(type_index)?,
        priority: i32::try_from(priority.as_i64()?).ok()?,
        anchor: anchor.as_str()?.to_string(),
        name: name.as_str()?.to_string(),
    })
}

/// `name: [doc, type, priority, anchor]`
fn named_object_entry(name: &str, value: &Value) -> Option<ObjectEntry> {
    let fields = value.as_array()?;
    let [doc, type_index, priority, anchor, ..] = fields.as_slice() else {
        return None;
    };
    Some(ObjectEntry {
        doc: as_doc(doc)?,
        type_index: as_doc(type_index)?,
        priority: i32::try_from(priority.as_i64()?).ok()?,
        anchor: anchor.as_str()?.to_string(),
        name: name.to_string(),
    })
}

/// Records keyed by stringified integers, e.g. `objnames`.
fn keyed_records(value: Option<&Value>) -> impl Iterator<Item = (usize, &Value)> {
    value
        .and_then(Value::as_object)
        .into_iter()
        .flatten()
        .filter_map(|(key, value)| key.parse::<usize>().ok().map(|key| (key, value)))
}

fn locations_map<T>(
    value: Option<&Value>,
    parse: impl Fn(&[Value]) -> Option<T>,
) -> BTreeMap<String, Vec<T>> {
    let Some(Value::Object(map)) = value else {
        return BTreeMap::new();
    };

    map.iter()
        .filter_map(|(key, locations)| {
            let parsed: Vec<T> = locations
                .as_array()?
                .iter()
                .filter_map(|location| parse(location.as_array()?))
                .collect();
            (!parsed.is_empty()).then(|| (key.clone(), parsed))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;
    use serde_json::json;

    fn loaded(value: Value) -> Arc<Index> {
        let_assert!(IndexState::Loaded(index) = IndexState::from_value(value));
        index
    }

    #[rstest]
    #[case(json!(1))]
    #[case(json!({}))]
    #[case(json!(null))]
    #[case(json!({"terms": {"a": 0}}))]
    fn test_not_loaded_shapes(#[case] value: Value) {
        check!(!IndexState::from_value(value).is_loaded());
    }

    #[test]
    fn test_single_and_multiple_postings() {
        let index = loaded(json!({
            "docnames": ["a", "b", "c"],
            "terms": {"one": 1, "many": [2, 0, 2], "none": []},
            "titleterms": {"head": [0]},
        }));
        check!(index.term_postings("one") == Some(&[1][..]));
        check!(index.term_postings("many") == Some(&[0, 2][..]));
        check!(index.term_postings("none").is_none());
        check!(index.title_postings("head") == Some(&[0][..]));
    }

    #[test]
    fn test_invalid_doc_ids_are_dropped() {
        let index = loaded(json!({
            "docnames": ["a"],
            "terms": {"ok": [0, 5], "bad": 9},
            "objects": {"": [[0, 0, 1, "", "Good"], [3, 0, 1, "", "Bad"], "junk"]},
            "alltitles": {"T": [[0, null], [4, "x"]]},
        }));
        check!(index.term_postings("ok") == Some(&[0][..]));
        check!(index.term_postings("bad").is_none());
        check!(index.object_count() == 1);
        let titles: Vec<_> = index.all_titles().collect();
        check!(titles.len() == 1);
        check!(titles[0].1 == [TitleLocation { doc: 0, anchor: None }]);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let index = loaded(json!({"docnames": ["index"]}));
        check!(index.document_count() == 1);
        check!(index.title(0).is_empty());
        check!(index.filename(0).is_empty());
        check!(index.title(7).is_empty());
        check!(index.objects().next().is_none());
    }

    #[test]
    fn test_object_tables() {
        let index = loaded(json!({
            "docnames": ["index", "api"],
            "objects": {
                "os.path": [[1, 0, 1, "-", "join"]],
                "": [[0, 1, 0, "", "Sphinx"]],
            },
            "objnames": {"0": ["py", "function", "Python function"], "1": ["cpp", "class", "C++ class"]},
            "objtypes": {"0": "py:function", "1": "cpp:class"},
        }));

        let names: Vec<String> = index.objects().map(|o| o.full_name()).collect();
        check!(names == ["Sphinx", "os.path.join"]);

        let joins = index.objects_named("JOIN");
        check!(joins.len() == 1);
        check!(joins[0].prefix == "os.path");
        check!(index.object_type(1).map(|t| t.label.as_str()) == Some("C++ class"));
    }

    #[test]
    fn test_legacy_named_objects() {
        let index = loaded(json!({
            "docnames": ["index"],
            "objects": {"mod": {"func": [0, 0, 1, "mod.func"]}},
        }));
        let names: Vec<String> = index.objects().map(|o| o.full_name()).collect();
        check!(names == ["mod.func"]);
    }

    #[test]
    fn test_index_entries_main_flag() {
        let index = loaded(json!({
            "docnames": ["index"],
            "indexentries": {"sphinx (c++ class)": [[0, "_CPPv46Sphinx", false]], "other": [[0, ""]]},
        }));
        let entries: BTreeMap<&str, &[IndexEntryLocation]> = index.index_entries().collect();
        check!(!entries["sphinx (c++ class)"][0].is_main);
        check!(entries["other"][0].is_main);
        check!(entries["other"][0].anchor.is_none());
    }

    #[rstest]
    #[case("Search.setIndex({\"docnames\": []})", "{\"docnames\": []}")]
    #[case("  Search.setIndex({\"a\": 1});\n", "{\"a\": 1}")]
    #[case("{\"a\": 1}", "{\"a\": 1}")]
    fn test_strip_js_wrapper(#[case] input: &str, #[case] expected: &str) {
        check!(strip_js_wrapper(input) == expected);
    }

    #[test]
    fn test_load_index_str_rejects_garbage() {
        check!(load_index_str("Search.setIndex(not json)").is_err());
    }

    #[test]
    fn test_env_version_kept() {
        let index = loaded(json!({"docnames": [], "envversion": {"sphinx": 61}}));
        check!(index.env_version()["sphinx"] == json!(61));
    }
}
