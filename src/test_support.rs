//! Local stand-in for the vendor APIs, used by the tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
};
use serde_json::Value;
use tokio::net::TcpListener;

use crate::config::UpstreamConfig;

#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub path: String,
    pub headers: HeaderMap,
    pub body: Value,
}

impl ReceivedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    reply: Value,
    delay: Arc<Mutex<Duration>>,
    received: Arc<Mutex<Vec<ReceivedRequest>>>,
}

pub struct MockUpstream {
    addr: SocketAddr,
    state: MockState,
}

impl MockUpstream {
    /// Serve `reply` with `status` for every request on a random local port.
    pub async fn start(status: StatusCode, reply: Value) -> Self {
        let state = MockState {
            status,
            reply,
            delay: Arc::new(Mutex::new(Duration::ZERO)),
            received: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .fallback(record_and_reply)
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockUpstream { addr, state }
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.state.delay.lock().unwrap() = delay;
        self
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Both vendors pointed at this mock.
    pub fn config(&self) -> UpstreamConfig {
        UpstreamConfig {
            openai_base_url: self.base_url(),
            anthropic_base_url: self.base_url(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.state.received.lock().unwrap().clone()
    }
}

async fn record_and_reply(
    State(state): State<MockState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state.received.lock().unwrap().push(ReceivedRequest {
        path: uri.path().to_string(),
        headers,
        body,
    });

    let delay = *state.delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    (state.status, Json(state.reply.clone()))
}

/// Base URL of a port nothing is listening on.
pub async fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
