//! Per-result previews: fetch, extract, summarize.

use super::html::{HtmlParser, ScraperParser, html_to_text_with};
use super::source::DocumentSource;
use super::summary::make_summary;
use crate::config::{SearchConfig, SummaryConfig};
use crate::error::FetchError;
use crate::search::SearchResult;
use futures::future::join_all;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell, RwLock};

type InFlightPage = Arc<OnceCell<Arc<str>>>;

/// Builds result previews from rendered documents.
///
/// Fetched HTML is kept in an LRU cache keyed by docname. Callers that miss
/// the cache for the same page while it is being fetched wait on that fetch,
/// so results pointing at different anchors of one page fetch it once. A
/// failed fetch only affects its own result, which gets no preview.
pub struct Previewer<S, P = ScraperParser> {
    source: S,
    parser: P,
    summary: SummaryConfig,
    cache: RwLock<LruCache<String, Arc<str>>>,
    in_flight: Mutex<HashMap<String, InFlightPage>>,
}

impl<S, P> std::fmt::Debug for Previewer<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Previewer")
            .field("summary", &self.summary)
            .field("cache_capacity", &self.cache.try_read().map(|c| c.cap()).ok())
            .finish_non_exhaustive()
    }
}

impl<S: DocumentSource> Previewer<S> {
    pub fn new(source: S, config: &SearchConfig) -> Self {
        Self::with_parser(source, ScraperParser, config)
    }
}

impl<S: DocumentSource, P: HtmlParser + Sync> Previewer<S, P> {
    pub fn with_parser(source: S, parser: P, config: &SearchConfig) -> Self {
        let capacity = NonZeroUsize::new(config.html_cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            source,
            parser,
            summary: config.summary.clone(),
            cache: RwLock::new(LruCache::new(capacity)),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    async fn html(&self, docname: &str) -> Result<Arc<str>, FetchError> {
        {
            let mut cache = self.cache.write().await;
            if let Some(html) = cache.get(docname) {
                tracing::debug!("Cache hit for '{}'", docname);
                return Ok(html.clone());
            }
        }

        let page = {
            let mut in_flight = self.in_flight.lock().await;
            // A fetch may have finished between the cache miss and this lock
            if let Some(html) = self.cache.write().await.get(docname) {
                return Ok(html.clone());
            }
            in_flight.entry(docname.to_string()).or_default().clone()
        };

        let result = page
            .get_or_try_init(|| async {
                tracing::debug!("Fetching '{}'", docname);
                self.source.fetch(docname).await.map(Arc::<str>::from)
            })
            .await
            .cloned();

        if let Ok(html) = &result {
            self.cache
                .write()
                .await
                .put(docname.to_string(), html.clone());
        }
        self.in_flight.lock().await.remove(docname);
        result
    }

    /// Preview for one result, or `None` if its document could not be
    /// fetched or has no text.
    pub async fn preview(&self, result: &SearchResult, keywords: &[String]) -> Option<String> {
        match self.html(&result.docname).await {
            Ok(html) => {
                let text = html_to_text_with(&self.parser, &html, result.anchor.as_deref());
                make_summary(&text, keywords, &self.summary)
            }
            Err(e) => {
                tracing::warn!("No preview for '{}': {}", result.docname, e);
                None
            }
        }
    }

    /// Previews for all results, fetched concurrently. The output lines up
    /// with `results`.
    pub async fn previews(&self, results: &[SearchResult], keywords: &[String]) -> Vec<Option<String>> {
        join_all(results.iter().map(|result| self.preview(result, keywords))).await
    }

    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }
}
