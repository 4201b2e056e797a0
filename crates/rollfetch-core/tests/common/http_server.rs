//! Minimal HTTP/1.1 server for integration tests.
//!
//! Routes by path prefix:
//! - `/ok/...`: 200 with `OK_BODY_LEN` bytes
//! - `/missing/...`: 404
//! - `/redirect/<rest>`: 302 to `/ok/<rest>`
//! - `/slow/<ms>/...`: sleeps `ms` milliseconds, then 200
//!
//! Every response closes the connection, so the number of requests being
//! handled at once equals the client's concurrency.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub const OK_BODY_LEN: usize = 10_000;

#[derive(Debug, Default)]
struct Counters {
    active: AtomicUsize,
    peak: AtomicUsize,
    hits: AtomicUsize,
}

pub struct TestServer {
    base: String,
    counters: Arc<Counters>,
}

impl TestServer {
    /// Absolute URL for `path` (which starts with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Most requests handled at the same time so far.
    pub fn peak_concurrency(&self) -> usize {
        self.counters.peak.load(Ordering::SeqCst)
    }

    /// Requests received so far.
    pub fn hits(&self) -> usize {
        self.counters.hits.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let counters = Arc::new(Counters::default());
    let shared = Arc::clone(&counters);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let counters = Arc::clone(&shared);
            thread::spawn(move || handle(stream, &counters));
        }
    });
    TestServer {
        base: format!("http://127.0.0.1:{}", port),
        counters,
    }
}

/// A URL on a port with nothing listening: connections are refused.
pub fn unreachable_base() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn handle(mut stream: TcpStream, counters: &Counters) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]).into_owned();
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    counters.hits.fetch_add(1, Ordering::SeqCst);
    let now = counters.active.fetch_add(1, Ordering::SeqCst) + 1;
    counters.peak.fetch_max(now, Ordering::SeqCst);

    respond(&mut stream, &path);

    counters.active.fetch_sub(1, Ordering::SeqCst);
}

fn respond(stream: &mut TcpStream, path: &str) {
    if let Some(rest) = path.strip_prefix("/redirect/") {
        let head = format!(
            "HTTP/1.1 302 Found\r\nLocation: /ok/{}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            rest
        );
        let _ = stream.write_all(head.as_bytes());
        return;
    }
    if let Some(rest) = path.strip_prefix("/slow/") {
        let ms = rest
            .split('/')
            .next()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(100);
        thread::sleep(Duration::from_millis(ms));
        write_body(stream, "200 OK", b"slow");
        return;
    }
    if path.starts_with("/ok/") {
        let body: Vec<u8> = (b'a'..=b'z').cycle().take(OK_BODY_LEN).collect();
        write_body(stream, "200 OK", &body);
        return;
    }
    write_body(stream, "404 Not Found", b"not found");
}

fn write_body(stream: &mut TcpStream, status: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}
