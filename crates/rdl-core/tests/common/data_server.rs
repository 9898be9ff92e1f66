//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a scripted sequence of responses to GET requests: the n-th request
//! gets the n-th response, and the last response repeats once the script is
//! exhausted. Every request's header lines are recorded.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }
}

/// Handle to a running server. The server runs until the process exits.
pub struct DataServer {
    /// Base URL, e.g. "http://127.0.0.1:12345/".
    pub url: String,
    requests: Arc<Mutex<Vec<Vec<String>>>>,
}

impl DataServer {
    /// Number of requests served so far.
    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Request line of request `n` (0-based), e.g. `GET /x.json HTTP/1.1`.
    pub fn request_line(&self, n: usize) -> String {
        self.requests.lock().unwrap()[n][0].clone()
    }

    /// Values of every `Accept` header sent with request `n` (0-based), in order.
    pub fn accept_headers(&self, n: usize) -> Vec<String> {
        let requests = self.requests.lock().unwrap();
        requests[n]
            .iter()
            .filter_map(|line| line.split_once(':'))
            .filter(|(name, _)| name.trim().eq_ignore_ascii_case("accept"))
            .map(|(_, value)| value.trim().to_string())
            .collect()
    }
}

/// Starts a server in a background thread answering with `script`.
pub fn start(script: Vec<Reply>) -> DataServer {
    assert!(!script.is_empty(), "script needs at least one reply");
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let n = recorded.lock().unwrap().len();
            let reply = script.get(n).unwrap_or(&script[script.len() - 1]).clone();
            if let Some(lines) = read_request(&stream) {
                recorded.lock().unwrap().push(lines);
                respond(stream, &reply);
            }
        }
    });
    DataServer {
        url: format!("http://127.0.0.1:{}/", port),
        requests,
    }
}

/// A URL on localhost where nothing is listening.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

fn read_request(mut stream: &TcpStream) -> Option<Vec<String>> {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return None,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let head = String::from_utf8_lossy(&buf);
    Some(
        head.lines()
            .map(str::trim)
            .take_while(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn respond(mut stream: TcpStream, reply: &Reply) {
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        reply.status,
        reason(reply.status),
        reply.body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&reply.body);
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
