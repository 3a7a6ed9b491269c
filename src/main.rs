use anyhow::Context;
use rmcp::{ServiceExt, transport::stdio};
use sphinx_search::config::SearchConfig;
use sphinx_search::server::{SearchServer, expand_tilde};
use std::path::PathBuf;

/// Environment variable naming a TOML configuration file.
const CONFIG_ENV: &str = "SPHINX_SEARCH_CONFIG";

fn load_config() -> anyhow::Result<SearchConfig> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) if !path.trim().is_empty() => {
            let path = PathBuf::from(expand_tilde(path.trim()).as_ref());
            tracing::info!("Using configuration from {}", path.display());
            SearchConfig::load(&path).context("Failed to load configuration")
        }
        _ => Ok(SearchConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the MCP protocol
    sphinx_search::tracing::init();

    tracing::info!("Starting sphinx-search MCP server");

    let config = load_config()?;
    let server = SearchServer::new(config);

    // Optional build directory to load on startup
    if let Some(arg) = std::env::args().nth(1) {
        let path = PathBuf::from(expand_tilde(&arg).as_ref());
        if let Err(e) = server.state().load(&path).await {
            tracing::warn!("Could not load index from {}: {:#}", path.display(), e);
        }
    }

    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    service.waiting().await?;

    Ok(())
}
