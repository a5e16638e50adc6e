//! Map manifest-check failures onto retry error kinds.

use crate::hot::ManifestError;
use crate::retry::ErrorKind;
use crate::transport::TransportError;

/// Classifies a manifest failure for the polling loop. Parse errors and
/// missing networking are terminal; everything transient maps to a
/// retryable kind.
pub fn classify_manifest_error(error: &ManifestError) -> ErrorKind {
    match error {
        ManifestError::TimedOut { .. } => ErrorKind::Timeout,
        ManifestError::RequestFailed { status, .. } => classify_status(*status),
        ManifestError::Transport(e) => classify_transport(e),
        ManifestError::Unsupported
        | ManifestError::Parse { .. }
        | ManifestError::AssetPath(_) => ErrorKind::Other,
    }
}

fn classify_status(status: u32) -> ErrorKind {
    match status {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(status),
        _ => ErrorKind::Other,
    }
}

fn classify_transport(error: &TransportError) -> ErrorKind {
    match error {
        TransportError::Timeout => ErrorKind::Timeout,
        TransportError::Connect(_) => ErrorKind::Connection,
        TransportError::Unsupported | TransportError::Other(_) => ErrorKind::Other,
    }
}
