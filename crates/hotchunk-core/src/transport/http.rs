//! curl-backed transport.

use std::time::Duration;

use super::{ChunkTransport, HttpResponse, TransportError};

/// Production transport over libcurl. One `Easy` handle per request;
/// follows redirects.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    connect_timeout: Duration,
}

impl CurlTransport {
    pub fn new() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkTransport for CurlTransport {
    fn get(&self, url: &str, timeout: Option<Duration>) -> Result<HttpResponse, TransportError> {
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(classify)?;
        easy.get(true).map_err(classify)?;
        easy.follow_location(true).map_err(classify)?;
        easy.connect_timeout(self.connect_timeout).map_err(classify)?;
        if let Some(t) = timeout {
            easy.timeout(t).map_err(classify)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(classify)?;
            transfer.perform().map_err(classify)?;
        }

        let status = easy.response_code().map_err(classify)?;
        Ok(HttpResponse { status, body })
    }
}

fn classify(e: curl::Error) -> TransportError {
    if e.is_operation_timedout() {
        return TransportError::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return TransportError::Connect(e.to_string());
    }
    TransportError::Other(e.to_string())
}
