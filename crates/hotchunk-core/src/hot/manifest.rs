//! The hot-update manifest: wire format and response-status mapping.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::ManifestError;
use crate::id::ChunkId;
use crate::transport::HttpResponse;

/// A published update announcement: the hash of the newer build and the
/// chunks that changed. Short keys are the wire format.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateManifest {
    #[serde(rename = "h")]
    pub hash: String,
    #[serde(rename = "c", default)]
    pub chunks: BTreeMap<ChunkId, bool>,
}

impl UpdateManifest {
    /// Chunks flagged as updated, in key order.
    pub fn updated_chunks(&self) -> Vec<ChunkId> {
        self.chunks
            .iter()
            .filter(|(_, changed)| **changed)
            .map(|(id, _)| id.clone())
            .collect()
    }
}

/// Maps a completed manifest GET to its outcome. 404 means "no update
/// published", which is a normal answer, not a failure.
pub(crate) fn map_status(
    url: &str,
    response: &HttpResponse,
) -> Result<Option<UpdateManifest>, ManifestError> {
    match response.status {
        0 => Err(ManifestError::TimedOut {
            url: url.to_string(),
        }),
        404 => Ok(None),
        200 | 304 => serde_json::from_slice(&response.body)
            .map(Some)
            .map_err(|source| ManifestError::Parse {
                url: url.to_string(),
                source,
            }),
        status => Err(ManifestError::RequestFailed {
            url: url.to_string(),
            status,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u32, body: &[u8]) -> HttpResponse {
        HttpResponse {
            status,
            body: body.to_vec(),
        }
    }

    #[test]
    fn not_found_means_no_update() {
        let out = map_status("http://x/h.json", &response(404, b"ignored")).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn status_zero_is_a_timeout() {
        assert!(matches!(
            map_status("http://x/h.json", &response(0, b"")),
            Err(ManifestError::TimedOut { .. })
        ));
    }

    #[test]
    fn ok_body_parses() {
        let body = br#"{"h":"next","c":{"0":true,"1":false}}"#;
        let manifest = map_status("http://x/h.json", &response(200, body))
            .unwrap()
            .unwrap();
        assert_eq!(manifest.hash, "next");
        assert_eq!(manifest.updated_chunks(), vec![ChunkId::Index(0)]);
    }

    #[test]
    fn not_modified_also_parses() {
        let body = br#"{"h":"same","c":{}}"#;
        let manifest = map_status("http://x/h.json", &response(304, body))
            .unwrap()
            .unwrap();
        assert_eq!(manifest.hash, "same");
        assert!(manifest.updated_chunks().is_empty());
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        assert!(matches!(
            map_status("http://x/h.json", &response(200, b"not-json")),
            Err(ManifestError::Parse { .. })
        ));
    }

    #[test]
    fn other_statuses_fail_the_request() {
        match map_status("http://x/h.json", &response(500, b"")) {
            Err(ManifestError::RequestFailed { status, .. }) => assert_eq!(status, 500),
            other => panic!("unexpected outcome: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn missing_chunk_map_defaults_to_empty() {
        let body = br#"{"h":"next"}"#;
        let manifest = map_status("http://x/h.json", &response(200, body))
            .unwrap()
            .unwrap();
        assert!(manifest.chunks.is_empty());
    }
}
