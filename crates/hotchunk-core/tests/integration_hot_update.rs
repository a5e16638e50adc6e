//! Integration test: hot-update polling against the local test server.

mod common;

use std::sync::{Arc, Mutex};

use hotchunk_core::asset_path::AssetPaths;
use hotchunk_core::hot::{self, HotUpdateHub, ManifestError};
use hotchunk_core::id::{ChunkId, ModuleId};
use hotchunk_core::modules::{ModuleSource, ModuleStore};
use hotchunk_core::transport::{ChunkTransport, CurlTransport};

fn transport() -> Arc<dyn ChunkTransport> {
    Arc::new(CurlTransport::new())
}

#[tokio::test]
async fn missing_manifest_means_no_update() {
    let server = common::chunk_server::start();
    let paths = AssetPaths::new(server.url(), "current");
    let out = hot::check_manifest(transport(), &paths).await.unwrap();
    assert!(out.is_none());
    assert_eq!(server.hits("/current.hot-update.json"), 1);
}

#[tokio::test]
async fn published_update_is_downloaded_and_applied() {
    let server = common::chunk_server::start();
    server.route(
        "/current.hot-update.json",
        200,
        br#"{"h":"next","c":{"1":true}}"#,
    );
    server.route(
        "/1.current.hot-update.js",
        200,
        br#"{"id":1,"modules":{"10":"refreshed code"}}"#,
    );

    let paths = AssetPaths::new(server.url(), "current");
    let manifest = hot::check_manifest(transport(), &paths)
        .await
        .unwrap()
        .expect("update should be announced");
    assert_eq!(manifest.hash, "next");
    assert_eq!(manifest.updated_chunks(), vec![ChunkId::Index(1)]);

    let store = ModuleStore::new();
    store.insert(ModuleId::Index(10), ModuleSource::new("stale code"));

    let hub = HotUpdateHub::new();
    let observed = Arc::new(Mutex::new(Vec::new()));
    {
        let observed = Arc::clone(&observed);
        hub.add_listener(Arc::new(move |chunk, modules| {
            observed.lock().unwrap().push((chunk.clone(), modules.len()));
        }));
    }

    let applied = hot::download_update(
        transport(),
        &paths,
        &store,
        &hub,
        &ChunkId::Index(1),
    )
    .await
    .expect("update should apply");
    assert_eq!(applied, vec![ModuleId::Index(10)]);
    assert_eq!(
        store.get(&ModuleId::Index(10)).unwrap().source,
        "refreshed code"
    );
    assert_eq!(*observed.lock().unwrap(), vec![(ChunkId::Index(1), 1)]);

    // The next poll asks under the announced hash.
    let paths = paths.with_build_hash(manifest.hash);
    assert!(hot::check_manifest(transport(), &paths)
        .await
        .unwrap()
        .is_none());
    assert_eq!(server.hits("/next.hot-update.json"), 1);
}

#[tokio::test]
async fn malformed_manifest_is_a_parse_error() {
    let server = common::chunk_server::start();
    server.route("/current.hot-update.json", 200, b"not-json");
    let paths = AssetPaths::new(server.url(), "current");
    assert!(matches!(
        hot::check_manifest(transport(), &paths).await,
        Err(ManifestError::Parse { .. })
    ));
}

#[tokio::test]
async fn server_errors_fail_the_check() {
    let server = common::chunk_server::start();
    server.route("/current.hot-update.json", 500, b"");
    let paths = AssetPaths::new(server.url(), "current");
    match hot::check_manifest(transport(), &paths).await {
        Err(ManifestError::RequestFailed { status, .. }) => assert_eq!(status, 500),
        other => panic!("unexpected outcome: {:?}", other.map(|_| ())),
    }
}
