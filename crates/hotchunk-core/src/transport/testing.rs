//! Scripted in-memory transport for unit tests.

use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use super::{ChunkTransport, HttpResponse, TransportError};

pub(crate) enum FailureKind {
    Timeout,
    Unsupported,
    Connect,
}

enum Script {
    Respond { status: u32, body: Vec<u8> },
    Fail(FailureKind),
}

/// Transport scripted per URL, with a hit log and an optional gate the
/// test releases one token at a time to sequence flight completion.
pub(crate) struct ScriptedTransport {
    routes: Mutex<HashMap<String, Script>>,
    hits: Mutex<Vec<String>>,
    gate: Option<Mutex<mpsc::Receiver<()>>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            routes: Mutex::new(HashMap::new()),
            hits: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    pub(crate) fn gated(gate: mpsc::Receiver<()>) -> Arc<Self> {
        Arc::new(Self {
            routes: Mutex::new(HashMap::new()),
            hits: Mutex::new(Vec::new()),
            gate: Some(Mutex::new(gate)),
        })
    }

    pub(crate) fn respond(&self, url: &str, status: u32, body: &[u8]) {
        self.routes.lock().unwrap().insert(
            url.to_string(),
            Script::Respond {
                status,
                body: body.to_vec(),
            },
        );
    }

    pub(crate) fn fail_with(&self, url: &str, kind: FailureKind) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Script::Fail(kind));
    }

    pub(crate) fn hits(&self) -> usize {
        self.hits.lock().unwrap().len()
    }
}

impl ChunkTransport for ScriptedTransport {
    fn get(&self, url: &str, _timeout: Option<Duration>) -> Result<HttpResponse, TransportError> {
        self.hits.lock().unwrap().push(url.to_string());
        if let Some(gate) = &self.gate {
            gate.lock()
                .unwrap()
                .recv()
                .map_err(|_| TransportError::Other("gate closed".into()))?;
        }
        match self.routes.lock().unwrap().get(url) {
            Some(Script::Respond { status, body }) => Ok(HttpResponse {
                status: *status,
                body: body.clone(),
            }),
            Some(Script::Fail(kind)) => Err(match kind {
                FailureKind::Timeout => TransportError::Timeout,
                FailureKind::Unsupported => TransportError::Unsupported,
                FailureKind::Connect => TransportError::Connect("scripted".into()),
            }),
            None => Err(TransportError::Connect(format!("no route for {}", url))),
        }
    }
}
