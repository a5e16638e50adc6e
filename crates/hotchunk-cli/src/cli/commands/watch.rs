use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use hotchunk_core::config::RuntimeConfig;
use hotchunk_core::hot::{self, HotUpdateHub};
use hotchunk_core::modules::ModuleStore;
use hotchunk_core::retry::{classify_manifest_error, run_with_retry};
use hotchunk_core::transport::{ChunkTransport, CurlTransport};

/// Polls the manifest on an interval and applies every update it
/// announces. Transient manifest failures are retried with backoff;
/// terminal ones are logged and polling continues on the next tick.
pub async fn run_watch(cfg: &RuntimeConfig, interval_override: Option<u64>) -> Result<()> {
    let transport: Arc<dyn ChunkTransport> = Arc::new(CurlTransport::new());
    let store = ModuleStore::new();
    let hub = HotUpdateHub::new();
    let policy = cfg.retry_policy();
    let interval = interval_override
        .map(Duration::from_secs)
        .unwrap_or_else(|| cfg.poll_interval());

    let mut paths = cfg.asset_paths();
    tracing::info!(
        interval_secs = interval.as_secs(),
        hash = %paths.build_hash(),
        "watching for hot updates"
    );

    loop {
        let outcome = run_with_retry(&policy, classify_manifest_error, || {
            hot::check_manifest_with_timeout(
                Arc::clone(&transport),
                &paths,
                cfg.manifest_timeout(),
            )
        })
        .await;

        match outcome {
            Ok(None) => {
                tracing::debug!(hash = %paths.build_hash(), "no update published");
            }
            Ok(Some(manifest)) => {
                println!(
                    "update available: build {} -> {}",
                    paths.build_hash(),
                    manifest.hash
                );
                for chunk in manifest.updated_chunks() {
                    match hot::download_update(
                        Arc::clone(&transport),
                        &paths,
                        &store,
                        &hub,
                        &chunk,
                    )
                    .await
                    {
                        Ok(applied) => {
                            println!("  chunk {}: {} module(s) applied", chunk, applied.len());
                        }
                        Err(err) => {
                            tracing::warn!(chunk = %chunk, error = %err, "update download failed");
                        }
                    }
                }
                // Poll under the hash the manifest announced from now on.
                paths = paths.with_build_hash(manifest.hash);
            }
            Err(err) => {
                tracing::warn!(error = %err, "manifest check failed");
            }
        }

        tokio::time::sleep(interval).await;
    }
}
