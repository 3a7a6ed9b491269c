//! Where rendered document HTML comes from.

use crate::config::{BuilderKind, SearchConfig};
use crate::error::FetchError;
use std::future::Future;
use std::path::PathBuf;

/// Supplies the rendered HTML of a document by docname.
///
/// Implementations must be cheap to call concurrently; the previewer fetches
/// one document per search result at the same time.
pub trait DocumentSource: Send + Sync {
    fn fetch(&self, docname: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Reads documents from a build output directory on disk.
#[derive(Debug, Clone)]
pub struct FsDocumentSource {
    root: PathBuf,
    builder: BuilderKind,
    file_suffix: String,
}

impl FsDocumentSource {
    pub fn new(root: impl Into<PathBuf>, builder: BuilderKind, file_suffix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            builder,
            file_suffix: file_suffix.into(),
        }
    }

    /// Source for `root` laid out according to `config.builder`.
    pub fn from_config(root: impl Into<PathBuf>, config: &SearchConfig) -> Self {
        Self::new(root, config.builder, config.file_suffix.clone())
    }

    /// File holding the rendered page for `docname`.
    ///
    /// `html` builds write `<docname><suffix>`. `dirhtml` builds write
    /// `<docname>/index.html`, except that `index` and `*/index` pages keep
    /// their own directory.
    pub fn path_for(&self, docname: &str) -> PathBuf {
        match self.builder {
            BuilderKind::Html => self.root.join(format!("{docname}{}", self.file_suffix)),
            BuilderKind::DirHtml => {
                let dir = if docname == "index" {
                    ""
                } else {
                    docname.strip_suffix("/index").unwrap_or(docname)
                };
                self.root.join(dir).join("index.html")
            }
        }
    }
}

impl DocumentSource for FsDocumentSource {
    async fn fetch(&self, docname: &str) -> Result<String, FetchError> {
        let path = self.path_for(docname);
        tracing::debug!("Fetching '{}' from {}", docname, path.display());

        tokio::fs::read_to_string(&path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound {
                    docname: docname.to_string(),
                    path,
                }
            } else {
                FetchError::Io {
                    docname: docname.to_string(),
                    source,
                }
            }
        })
    }
}
