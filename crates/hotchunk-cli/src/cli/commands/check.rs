use std::sync::Arc;

use anyhow::Result;
use hotchunk_core::config::RuntimeConfig;
use hotchunk_core::hot;
use hotchunk_core::transport::{ChunkTransport, CurlTransport};

/// One manifest check; reports whether a newer build is published.
pub async fn run_check(cfg: &RuntimeConfig) -> Result<()> {
    let transport: Arc<dyn ChunkTransport> = Arc::new(CurlTransport::new());
    let paths = cfg.asset_paths();

    match hot::check_manifest_with_timeout(transport, &paths, cfg.manifest_timeout()).await? {
        None => println!("build {} is up to date", cfg.build_hash),
        Some(manifest) => {
            println!(
                "update available: build {} -> {}",
                cfg.build_hash, manifest.hash
            );
            for chunk in manifest.updated_chunks() {
                println!("  chunk {}", chunk);
            }
        }
    }
    Ok(())
}
