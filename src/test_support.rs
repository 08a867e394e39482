//! Loopback HTTP/1.1 server with scripted per-path replies.
//!
//! Every response carries `Connection: close`, so each request arrives on a
//! fresh connection and hit counts are exact. Unknown paths answer 404.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Reply {
    /// Status and JSON body
    Json(u16, String),
    /// Status and raw body
    Body(u16, Vec<u8>),
    /// Status and raw body, written in `pieces` parts with `gap` between them
    Trickle {
        body: Vec<u8>,
        pieces: usize,
        gap: Duration,
    },
    /// Read the request, then close without answering
    Hangup,
}

impl Reply {
    pub fn json(value: serde_json::Value) -> Self {
        Self::Json(200, value.to_string())
    }

    pub fn status(code: u16) -> Self {
        Self::Json(code, format!("{{\"error\":\"status {code}\"}}"))
    }
}

/// Replies are served in order; the last one repeats once the queue drains.
struct Route {
    queue: VecDeque<Reply>,
    last: Reply,
}

#[derive(Default)]
struct State {
    routes: HashMap<String, Route>,
    hits: HashMap<String, usize>,
}

pub struct MockServer {
    base_url: String,
    state: Arc<Mutex<State>>,
}

impl MockServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        let state = Arc::new(Mutex::new(State::default()));

        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&shared);
                thread::spawn(move || handle(stream, &state));
            }
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            state,
        }
    }

    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// Answer every request for `path` with `reply`
    pub fn route(&self, path: &str, reply: Reply) -> &Self {
        self.route_seq(path, vec![reply])
    }

    /// Answer successive requests for `path` with `replies`
    pub fn route_seq(&self, path: &str, replies: Vec<Reply>) -> &Self {
        let mut queue: VecDeque<Reply> = replies.into();
        let last = queue.back().cloned().expect("at least one reply");
        if queue.len() == 1 {
            queue.clear();
        }
        self.state
            .lock()
            .routes
            .insert(path.to_string(), Route { queue, last });
        self
    }

    /// Requests received for `path`, ignoring the query string
    pub fn hits(&self, path: &str) -> usize {
        self.state.lock().hits.get(path).copied().unwrap_or(0)
    }
}

/// Base URL of a port nothing listens on
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));

    let Some(path) = read_request_path(&mut stream) else {
        return;
    };

    let reply = {
        let mut state = state.lock();
        *state.hits.entry(path.clone()).or_default() += 1;
        match state.routes.get_mut(&path) {
            Some(route) => route.queue.pop_front().unwrap_or_else(|| route.last.clone()),
            None => Reply::status(404),
        }
    };

    let (status, content_type, body, pieces, gap) = match reply {
        Reply::Json(status, body) => {
            (status, "application/json", body.into_bytes(), 1, Duration::ZERO)
        }
        Reply::Body(status, body) => (status, "application/octet-stream", body, 1, Duration::ZERO),
        Reply::Trickle { body, pieces, gap } => {
            (200, "application/octet-stream", body, pieces.max(1), gap)
        }
        Reply::Hangup => {
            let _ = stream.shutdown(Shutdown::Both);
            return;
        }
    };

    let head = format!(
        "HTTP/1.1 {status} {}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        reason(status),
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.flush();

    let piece_len = body.len().div_ceil(pieces).max(1);
    for (idx, piece) in body.chunks(piece_len).enumerate() {
        if idx > 0 {
            thread::sleep(gap);
        }
        if stream.write_all(piece).and_then(|()| stream.flush()).is_err() {
            return;
        }
    }
}

/// Path of the request target, without query string
fn read_request_path(stream: &mut TcpStream) -> Option<String> {
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];

    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return None,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }

    let request = String::from_utf8_lossy(&request);
    let target = request.lines().next()?.split_whitespace().nth(1)?;
    Some(target.split('?').next().unwrap_or(target).to_string())
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
