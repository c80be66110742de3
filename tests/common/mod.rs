//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::{Json, Router};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use protocol_adapter::config::load_config;
use protocol_adapter::lifecycle::{self, Shutdown};

/// One POST received by the mock control plane.
#[derive(Debug, Clone)]
pub struct ControlPlaneCall {
    /// `http://host:port` of the mock itself, for building callback URLs.
    pub base: String,
    pub path: String,
    pub body: Value,
}

type Reply = Arc<dyn Fn(&ControlPlaneCall) -> (u16, Value) + Send + Sync>;

#[derive(Clone)]
struct ControlPlaneState {
    base: String,
    reply: Reply,
    calls: Arc<Mutex<Vec<ControlPlaneCall>>>,
}

/// A programmable control plane that records every POST it receives.
pub struct MockControlPlane {
    pub addr: SocketAddr,
    calls: Arc<Mutex<Vec<ControlPlaneCall>>>,
}

impl MockControlPlane {
    pub async fn start<F>(reply: F) -> Self
    where
        F: Fn(&ControlPlaneCall) -> (u16, Value) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = ControlPlaneState {
            base: format!("http://{addr}"),
            reply: Arc::new(reply),
            calls: calls.clone(),
        };
        let app = Router::new().fallback(handle_post).with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, calls }
    }

    /// Callback template pointing at this mock.
    pub fn template(&self) -> String {
        format!("http://{}/imposters/:port/_requests", self.addr)
    }

    pub fn calls(&self) -> Vec<ControlPlaneCall> {
        self.calls.lock().unwrap().clone()
    }
}

async fn handle_post(
    State(state): State<ControlPlaneState>,
    uri: Uri,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let call = ControlPlaneCall {
        base: state.base.clone(),
        path: uri.path().to_string(),
        body,
    };
    state.calls.lock().unwrap().push(call.clone());
    let (status, reply) = (state.reply)(&call);
    (StatusCode::from_u16(status).unwrap(), Json(reply))
}

/// Start a raw upstream that records each request and answers with `body`.
pub async fn start_upstream(body: &'static str) -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorded = seen.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let recorded = recorded.clone();
            tokio::spawn(async move {
                let request = read_http_request(&mut socket).await;
                recorded.lock().unwrap().push(request);
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nX-Upstream: yes\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, seen)
}

async fn read_http_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Start the adapter from a JSON config; returns its address and shutdown handle.
pub async fn start_adapter(config: Value) -> (SocketAddr, Shutdown) {
    let config = load_config(&config.to_string()).unwrap();
    let started = lifecycle::start(&config).await.unwrap();
    let addr = SocketAddr::from(([127, 0, 0, 1], started.metadata.port));

    let shutdown = Shutdown::new();
    tokio::spawn(started.server.run(started.listener, shutdown.subscribe()));

    (addr, shutdown)
}

/// Send raw bytes and read until the adapter closes the connection.
pub async fn send_raw(addr: SocketAddr, request: &str) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut buf = Vec::new();
    let read = tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buf)).await;
    assert!(read.is_ok(), "adapter did not close the connection");
    buf
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
