//! In-process ADM stand-in used by the crate's tests.
//!
//! Accepts any number of connections, records every request, and answers
//! from a routing closure. Each response closes its connection.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::config::AdmConfig;

pub const TOKEN_PATH: &str = "/auth/O2/token";
pub const MESSAGES_PREFIX: &str = "/messaging/registrations/";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names are lower-cased.
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// The registration id of a message request.
    pub fn regid(&self) -> Option<&str> {
        self.path
            .strip_prefix(MESSAGES_PREFIX)?
            .strip_suffix("/messages")
    }
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub delay: Duration,
}

impl Reply {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn token(access_token: &str, expires_in: i64) -> Self {
        Self::json(
            200,
            format!(
                r#"{{"access_token":"{access_token}","expires_in":{expires_in},"scope":"messaging:push","token_type":"bearer"}}"#
            ),
        )
    }

    pub fn accepted(request_id: &str) -> Self {
        let mut reply = Self::json(200, r#"{"registrationID":"ignored"}"#);
        reply
            .headers
            .push(("x-amzn-RequestId".to_owned(), request_id.to_owned()));
        reply
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Router = dyn Fn(&RecordedRequest) -> Reply + Send + Sync;

pub struct MockAdm {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl MockAdm {
    pub async fn start(router: impl Fn(&RecordedRequest) -> Reply + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock server");
        let port = listener.local_addr().unwrap().port();
        let base_url = format!("http://127.0.0.1:{port}");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let router: Arc<Router> = Arc::new(router);

        let recorded = Arc::clone(&requests);
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = Arc::clone(&recorded);
                let router = Arc::clone(&router);
                tokio::spawn(serve(stream, recorded, router));
            }
        });

        Self {
            base_url,
            requests,
            handle,
        }
    }

    /// A server that issues `token` and accepts every message except those
    /// addressed to `failing` registrations, which get a 400.
    pub async fn gateway(token: &'static str, failing: &'static [&'static str]) -> Self {
        Self::start(move |req| {
            if req.path == TOKEN_PATH {
                return Reply::token(token, 3600);
            }
            match req.regid() {
                Some(regid) if failing.iter().any(|f| *f == regid) => {
                    Reply::json(400, r#"{"reason":"InvalidRegistrationId"}"#)
                }
                Some(regid) => Reply::accepted(&format!("req-{regid}")),
                None => Reply::json(404, "not found"),
            }
        })
        .await
    }

    pub fn config(&self) -> AdmConfig {
        AdmConfig::default()
            .with_token_url(format!("{}{TOKEN_PATH}", self.base_url))
            .with_service_url(format!("{}{MESSAGES_PREFIX}", self.base_url))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn token_requests(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.path == TOKEN_PATH)
            .count()
    }

    pub fn message_requests(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.path.starts_with(MESSAGES_PREFIX))
            .count()
    }
}

impl Drop for MockAdm {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(
    mut stream: TcpStream,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
    router: Arc<Router>,
) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };
    recorded.lock().unwrap().push(request.clone());
    let reply = (*router)(&request);
    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }

    let mut response = format!(
        "HTTP/1.1 {} MOCK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
        reply.status,
        reply.body.len()
    );
    for (name, value) in &reply.headers {
        response.push_str(&format!("{name}: {value}\r\n"));
    }
    response.push_str("\r\n");
    response.push_str(&reply.body);

    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

async fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_owned();
    let path = request_line.next()?.to_owned();
    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_owned()))
        .collect();

    let content_length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).into_owned();

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}
