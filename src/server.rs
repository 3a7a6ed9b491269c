//! MCP server exposing index loading and search as tools.

use crate::config::SearchConfig;
use crate::state::SearchState;
use crate::tools::load_index::{LoadIndexRequest, handle_load_index, resolve_path};
use crate::tools::search::{SearchRequest, handle_search};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::borrow::Cow;
use std::sync::Arc;

/// MCP server for Sphinx documentation search
#[derive(Clone)]
pub struct SearchServer {
    /// Shared search state (loaded index, previewer)
    state: Arc<SearchState>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for SearchServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchServer")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[tool_router]
impl SearchServer {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            state: Arc::new(SearchState::new(config)),
            tool_router: Self::tool_router(),
        }
    }

    pub const fn state(&self) -> &Arc<SearchState> {
        &self.state
    }

    #[tool(
        description = "Load a Sphinx search index. Accepts a documentation build directory (containing searchindex.js) or the searchindex.js file itself. Replaces any previously loaded index."
    )]
    async fn load_index(
        &self,
        Parameters(LoadIndexRequest { path }): Parameters<LoadIndexRequest>,
    ) -> std::result::Result<String, String> {
        handle_load_index(&self.state, &resolve_path(&path))
            .await
            .map_err(|e| format!("Failed to load index: {:#}", e))
    }

    #[tool(
        description = "Search the loaded Sphinx documentation. Matches section titles, index entries, API objects (functions, classes, ...) and page text. Prefix a word with '-' to exclude pages containing it. Returns ranked results with a text preview around the match.",
        input_schema = inline_schema_for_type::<SearchRequest>()
    )]
    async fn search(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_search(&self.state, request).await
    }
}

#[tool_handler]
impl ServerHandler for SearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "sphinx-search: full-text search over Sphinx-generated documentation. \
                 Use load_index with a build directory (e.g. _build/html) first, \
                 then search for words, phrases or object names like 'os.path.join'.",
            )
    }
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// - `~/foo` becomes `/home/user/foo`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}

/// Generate an inline JSON schema for MCP tools
///
/// Sets `inline_subschemas = true` so optional fields render as plain inputs
/// instead of `$ref` definitions in MCP clients.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();
    match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(object)) => Arc::new(object),
        other => {
            tracing::error!("Tool schema did not serialize to an object: {:?}", other);
            Arc::new(JsonObject::new())
        }
    }
}
