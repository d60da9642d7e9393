use axum::{
    http::HeaderMap,
    routing::get,
    Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::fixtures::BackendFixture;
use crate::handlers::{get_execution, health_check, submit_execution};

/// Headers a client sent with one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedHeaders {
    pub api_key: Option<String>,
    pub api_version: Option<String>,
    pub content_type: Option<String>,
}

impl RecordedHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            api_key: get("x-api-key"),
            api_version: get("x-api-version"),
            content_type: get("content-type"),
        }
    }
}

pub struct MockState {
    pub fixture: BackendFixture,
    submissions: Mutex<Vec<Value>>,
    polls: Mutex<Vec<String>>,
    headers: Mutex<Vec<RecordedHeaders>>,
    poll_counts: Mutex<HashMap<String, usize>>,
}

impl MockState {
    fn new(fixture: BackendFixture) -> Self {
        Self {
            fixture,
            submissions: Mutex::new(Vec::new()),
            polls: Mutex::new(Vec::new()),
            headers: Mutex::new(Vec::new()),
            poll_counts: Mutex::new(HashMap::new()),
        }
    }

    pub fn record_submission(&self, payload: Value) {
        self.submissions.lock().unwrap().push(payload);
    }

    pub fn record_headers(&self, headers: RecordedHeaders) {
        self.headers.lock().unwrap().push(headers);
    }

    /// Record a status query and return how many queries `job_id` has seen
    pub fn record_poll(&self, job_id: &str) -> usize {
        self.polls.lock().unwrap().push(job_id.to_string());
        let mut counts = self.poll_counts.lock().unwrap();
        let count = counts.entry(job_id.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn reset_polls(&self, job_id: &str) {
        self.poll_counts.lock().unwrap().remove(job_id);
    }

    pub fn is_authorized(&self, headers: &RecordedHeaders) -> bool {
        match &self.fixture.api_key {
            Some(expected) => headers.api_key.as_deref() == Some(expected.as_str()),
            None => true,
        }
    }
}

pub struct MockServer {
    state: Arc<MockState>,
}

impl MockServer {
    pub fn new(fixture: BackendFixture) -> Self {
        Self {
            state: Arc::new(MockState::new(fixture)),
        }
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/execute", get(get_execution).post(submit_execution))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind an ephemeral local port and serve in the background
    pub async fn start(fixture: BackendFixture) -> RunningMockServer {
        let server = Self::new(fixture);
        let app = server.router();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap_or_else(|e| {
            panic!("Failed to bind mock backend to 127.0.0.1:0. Error: {}", e);
        });
        let addr = listener.local_addr().unwrap();
        tracing::info!("Mock Codaveri backend listening on {}", addr);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap_or_else(|e| {
                    tracing::error!("Mock backend error: {}", e);
                });
        });

        RunningMockServer {
            addr,
            shutdown_tx,
            state: server.state,
        }
    }

    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let addr: SocketAddr = addr.parse()?;
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Mock Codaveri backend listening on {}", addr);

        axum::serve(listener, self.router())
            .await
            .map_err(|e| anyhow::anyhow!("Mock backend error: {}", e))
    }
}

pub struct RunningMockServer {
    addr: SocketAddr,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
    state: Arc<MockState>,
}

impl RunningMockServer {
    pub fn address(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn submissions(&self) -> Vec<Value> {
        self.state.submissions.lock().unwrap().clone()
    }

    pub fn polls(&self) -> Vec<String> {
        self.state.polls.lock().unwrap().clone()
    }

    pub fn headers(&self) -> Vec<RecordedHeaders> {
        self.state.headers.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.submissions().len() + self.polls().len()
    }

    pub async fn shutdown(self) {
        if self.shutdown_tx.send(()).is_err() {
            tracing::warn!("Mock backend shutdown signal already sent or receiver dropped.");
        }
    }
}
