//! Result previews: rendered HTML to plain text, cut down to a summary
//! around the query words.

pub(crate) mod html;
pub(crate) mod preview;
pub(crate) mod source;
pub(crate) mod summary;

pub use html::{Element, HtmlParser, Node, ScraperParser, html_to_text, html_to_text_with, text_content, tree_to_text};
pub use preview::Previewer;
pub use source::{DocumentSource, FsDocumentSource};
pub use summary::make_summary;
