//! Network surface of the runtime: plain GET requests.
//!
//! The loader and the hot-update poller only ever GET three kinds of file
//! (chunk scripts, the update manifest, hot-update chunks), so the whole
//! surface is one blocking trait method. Call it through `spawn_blocking`
//! from async code. The trait boundary keeps curl out of the engine and
//! lets tests substitute scripted responses.

mod http;
#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use thiserror::Error;

pub use http::CurlTransport;

/// Status and body of a completed GET. A status of 0 means the transport
/// never heard back (the poller maps it to a timeout).
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

/// Transport-level failure, before any HTTP status is available.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("networking unavailable")]
    Unsupported,
    #[error("transport failure: {0}")]
    Other(String),
}

/// Blocking GET used for chunk files and hot-update assets.
pub trait ChunkTransport: Send + Sync {
    /// Fetches `url`. `timeout` bounds the whole request when given; chunk
    /// flights pass `None` and rely on the transport's own failure
    /// signalling.
    fn get(&self, url: &str, timeout: Option<Duration>) -> Result<HttpResponse, TransportError>;
}
