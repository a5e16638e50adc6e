use std::sync::Arc;

use anyhow::{Context, Result};
use hotchunk_core::config::RuntimeConfig;
use hotchunk_core::id::ChunkId;
use hotchunk_core::loader::ChunkLoader;
use hotchunk_core::transport::CurlTransport;

/// Fetches one chunk through a fresh loader and lists what it delivered.
pub async fn run_fetch(cfg: &RuntimeConfig, chunk: &str) -> Result<()> {
    let id = ChunkId::parse(chunk);
    let loader = ChunkLoader::new(cfg.asset_paths(), Arc::new(CurlTransport::new()));

    let modules = loader
        .request(id.clone())
        .await
        .with_context(|| format!("fetch chunk {}", id))?;

    println!("chunk {} loaded, {} module(s) registered", id, modules.len());
    for module in modules.module_ids() {
        println!("  {}", module);
    }
    Ok(())
}
