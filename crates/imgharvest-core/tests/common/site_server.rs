//! Minimal HTTP/1.1 server that serves a fixed site for integration tests.
//!
//! Each route maps a request path (query included) to a content type and a
//! body. HEAD answers with headers only, GET with the body, anything unknown
//! with 404. Every request is counted per method and path.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
struct Route {
    content_type: String,
    body: Vec<u8>,
}

type Counts = Arc<Mutex<HashMap<(String, String), usize>>>;

/// Builder for the routes a `SiteServer` answers.
#[derive(Debug, Clone, Default)]
pub struct Site {
    routes: HashMap<String, Route>,
}

impl Site {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn html(mut self, path: &str, body: &str) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                content_type: "text/html; charset=utf-8".to_string(),
                body: body.as_bytes().to_vec(),
            },
        );
        self
    }

    pub fn file(mut self, path: &str, content_type: &str, body: &[u8]) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                content_type: content_type.to_string(),
                body: body.to_vec(),
            },
        );
        self
    }

    /// Starts serving in a background thread. The server runs until the process exits.
    pub fn start(self) -> SiteServer {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let routes = Arc::new(self.routes);
        let counts: Counts = Arc::new(Mutex::new(HashMap::new()));
        let server_counts = Arc::clone(&counts);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                let counts = Arc::clone(&server_counts);
                thread::spawn(move || handle(stream, &routes, &counts));
            }
        });
        SiteServer {
            base: format!("http://127.0.0.1:{}", port),
            counts,
        }
    }
}

/// Handle to a running fixture site.
#[derive(Debug, Clone)]
pub struct SiteServer {
    base: String,
    counts: Counts,
}

impl SiteServer {
    /// Origin without trailing slash, e.g. "http://127.0.0.1:12345".
    pub fn origin(&self) -> &str {
        &self.base
    }

    /// Absolute URL for `path` (which starts with '/').
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Number of requests seen for `method` on `path`.
    pub fn count(&self, method: &str, path: &str) -> usize {
        let counts = self.counts.lock().unwrap();
        counts
            .get(&(method.to_string(), path.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Total requests seen for `method` on any path.
    pub fn total(&self, method: &str) -> usize {
        let counts = self.counts.lock().unwrap();
        counts
            .iter()
            .filter(|((m, _), _)| m == method)
            .map(|(_, n)| *n)
            .sum()
    }
}

fn handle(mut stream: TcpStream, routes: &HashMap<String, Route>, counts: &Counts) {
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
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("").to_ascii_uppercase();
    let path = parts.next().unwrap_or("/").to_string();

    *counts
        .lock()
        .unwrap()
        .entry((method.clone(), path.clone()))
        .or_insert(0) += 1;

    let Some(route) = routes.get(&path) else {
        let _ = stream.write_all(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        return;
    };

    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        route.content_type,
        route.body.len()
    );
    match method.as_str() {
        "HEAD" => {
            let _ = stream.write_all(head.as_bytes());
        }
        "GET" => {
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&route.body);
        }
        _ => {
            let _ = stream.write_all(
                b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
        }
    }
}
