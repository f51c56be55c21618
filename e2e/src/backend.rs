//! Mock backend server that simulates the Gemini REST API
//!
//! Every POST is treated as a generateContent call. Tests pre-configure
//! responses via SharedBackendState before each request.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::types::{BackendState, MockResponse, ReceivedRequest, SharedBackendState};

/// Default fallback response when no response is queued
fn default_generate_response() -> MockResponse {
    MockResponse::json(
        r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Default response (no mock queued)"}]},"finishReason":"STOP"}],"usageMetadata":{"promptTokenCount":4,"candidatesTokenCount":5,"totalTokenCount":9}}"#,
    )
}

/// Handle POST /v1beta/models/{model}:generateContent - serves pre-configured mock responses
async fn handle_generate_content(
    State(state): State<SharedBackendState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let received = ReceivedRequest {
        path: uri.path().to_string(),
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        body: serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null),
    };

    // Pop the next configured response (or use default)
    let mock_response = {
        let mut state = state.lock().unwrap();
        state.received_requests.push(received);
        state.response_queue.pop_front().unwrap_or_else(default_generate_response)
    };

    if !mock_response.delay.is_zero() {
        tokio::time::sleep(mock_response.delay).await;
    }

    (
        StatusCode::from_u16(mock_response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        [("Content-Type", "application/json")],
        mock_response.body,
    )
        .into_response()
}

/// A running mock Gemini server
#[derive(Clone)]
pub struct MockGemini {
    pub addr: SocketAddr,
    pub state: SharedBackendState,
}

impl MockGemini {
    /// Base URL to put in the proxy's `provider.base_url`
    pub fn base_url(&self) -> String {
        format!("http://{}/v1beta", self.addr)
    }
}

/// Start the mock on an ephemeral local port
pub async fn start() -> anyhow::Result<MockGemini> {
    let state: SharedBackendState = std::sync::Arc::new(std::sync::Mutex::new(BackendState::default()));

    let app = Router::new()
        .route("/v1beta/models/:action", post(handle_generate_content))
        .with_state(state.clone());

    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind mock Gemini: {}", e))?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("mock Gemini stopped: {}", e);
        }
    });

    Ok(MockGemini { addr, state })
}

/// Forget queued replies and recorded requests
pub fn reset(state: &SharedBackendState) {
    let mut state = state.lock().unwrap();
    state.response_queue.clear();
    state.received_requests.clear();
}

/// Helper to configure the next generateContent response
pub fn queue_response(state: &SharedBackendState, response: MockResponse) {
    state.lock().unwrap().response_queue.push_back(response);
}

/// Helper to get all requests received since last clear
pub fn drain_requests(state: &SharedBackendState) -> Vec<ReceivedRequest> {
    let mut s = state.lock().unwrap();
    s.received_requests.drain(..).collect()
}
