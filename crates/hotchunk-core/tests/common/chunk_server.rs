//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a mutable route table (path -> status + body) and counts GETs
//! per path so tests can assert how many fetches actually happened.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

type Routes = Arc<Mutex<HashMap<String, (u32, Vec<u8>)>>>;
type Hits = Arc<Mutex<HashMap<String, u32>>>;

#[derive(Clone)]
pub struct ChunkServer {
    base_url: String,
    routes: Routes,
    hits: Hits,
}

/// Starts a server in a background thread with an empty route table.
/// The server runs until the process exits.
pub fn start() -> ChunkServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Routes = Arc::default();
    let hits: Hits = Arc::default();
    let server = ChunkServer {
        base_url: format!("http://127.0.0.1:{}/", port),
        routes: Arc::clone(&routes),
        hits: Arc::clone(&hits),
    };
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&hits);
            thread::spawn(move || handle(stream, &routes, &hits));
        }
    });
    server
}

impl ChunkServer {
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// Installs or replaces one route.
    pub fn route(&self, path: &str, status: u32, body: &[u8]) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.to_vec()));
    }

    /// GETs served for `path` so far.
    pub fn hits(&self, path: &str) -> u32 {
        *self.hits.lock().unwrap().get(path).unwrap_or(&0)
    }
}

fn handle(mut stream: std::net::TcpStream, routes: &Routes, hits: &Hits) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let Some(path) = parse_path(request) else {
        let _ = stream.write_all(b"HTTP/1.1 400 Bad Request\r\n\r\n");
        return;
    };

    *hits.lock().unwrap().entry(path.clone()).or_insert(0) += 1;

    let route = routes.lock().unwrap().get(&path).cloned();
    let (status, body) = route.unwrap_or((404, b"not found".to_vec()));
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason(status),
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(&body);
}

fn parse_path(request: &str) -> Option<String> {
    let first_line = request.lines().next()?;
    let mut parts = first_line.split_whitespace();
    let method = parts.next()?;
    if !method.eq_ignore_ascii_case("GET") {
        return None;
    }
    parts.next().map(str::to_string)
}

fn reason(status: u32) -> &'static str {
    match status {
        200 => "OK",
        304 => "Not Modified",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
