//! In-memory HTTP client for tests and dry runs

use crate::client::HttpClient;
use crate::errors::HttpError;
use crate::types::{HttpMethod, HttpRequest, HttpResponse};
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;
use tracing::debug;

/// A scripted reply
#[derive(Debug, Clone, PartialEq)]
pub enum MockResponse {
    /// Reply with a status and raw body
    Status { status: u16, body: Vec<u8> },
    /// Fail the request as if the transport broke
    TransportError(String),
}

impl MockResponse {
    pub fn status(status: u16) -> Self {
        MockResponse::Status {
            status,
            body: Vec::new(),
        }
    }

    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        MockResponse::Status {
            status,
            body: body.to_string().into_bytes(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        MockResponse::Status {
            status,
            body: body.as_bytes().to_vec(),
        }
    }
}

/// HTTP client answering from scripted mocks and recording every request.
///
/// Mocks are keyed by `METHOD:path`. Each key holds a queue of replies
/// consumed in order; the last reply of a queue is repeated once the others
/// are used up. A request with no matching key falls back to the default
/// reply when one is set, and fails with [`HttpError::NoMockResponse`]
/// otherwise.
#[derive(Debug, Default)]
pub struct MockClient {
    mocks: Mutex<HashMap<String, VecDeque<MockResponse>>>,
    default_response: Option<MockResponse>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `response` to any request without a specific mock
    pub fn with_default(response: MockResponse) -> Self {
        Self {
            default_response: Some(response),
            ..Self::default()
        }
    }

    /// Queue a reply for `method` on `path`
    pub fn add_mock(&mut self, method: HttpMethod, path: &str, response: MockResponse) {
        let key = Self::key(method, path);
        debug!("Added HTTP mock for {}", key);
        self.mocks
            .get_mut()
            .entry(key)
            .or_default()
            .push_back(response);
    }

    /// Clear all mocks and recorded requests
    pub fn clear(&mut self) {
        self.mocks.get_mut().clear();
        self.requests.get_mut().clear();
    }

    /// Requests received so far, in order
    pub async fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of requests received so far
    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    fn key(method: HttpMethod, path: &str) -> String {
        format!("{}:{}", method.as_str(), path)
    }
}

#[async_trait::async_trait]
impl HttpClient for MockClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let key = Self::key(request.method, &request.path);
        self.requests.lock().await.push(request);

        let reply = {
            let mut mocks = self.mocks.lock().await;
            match mocks.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match reply.or_else(|| self.default_response.clone()) {
            Some(MockResponse::Status { status, body }) => Ok(HttpResponse::new(status, body)),
            Some(MockResponse::TransportError(message)) => Err(HttpError::Transport(message)),
            None => Err(HttpError::NoMockResponse(key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_queued_replies_then_repeat_last() {
        let mut client = MockClient::new();
        client.add_mock(HttpMethod::Get, "/boards/b1/cards", MockResponse::status(500));
        client.add_mock(
            HttpMethod::Get,
            "/boards/b1/cards",
            MockResponse::json(200, &json!([])),
        );

        let statuses: Vec<u16> = {
            let mut statuses = Vec::new();
            for _ in 0..3 {
                let response = client
                    .send(HttpRequest::get("Load Cards", "/boards/b1/cards"))
                    .await
                    .unwrap();
                statuses.push(response.status);
            }
            statuses
        };

        assert_eq!(statuses, vec![500, 200, 200]);
        assert_eq!(client.request_count().await, 3);
    }

    #[tokio::test]
    async fn test_unmatched_request() {
        let client = MockClient::new();
        let result = client.send(HttpRequest::get("Load Board", "/boards/b1")).await;
        assert!(matches!(result, Err(HttpError::NoMockResponse(ref key)) if key == "GET:/boards/b1"));

        let client = MockClient::with_default(MockResponse::status(204));
        let response = client
            .send(HttpRequest::get("Load Board", "/boards/b1"))
            .await
            .unwrap();
        assert_eq!(response.status, 204);
    }

    #[tokio::test]
    async fn test_transport_error_and_recording() {
        let mut client = MockClient::new();
        client.add_mock(
            HttpMethod::Post,
            "/boards/b1/ranks/r1/cards/c1/vote",
            MockResponse::TransportError("connection reset".to_string()),
        );

        let result = client
            .send(HttpRequest::post("Vote on a Card", "/boards/b1/ranks/r1/cards/c1/vote"))
            .await;
        assert!(matches!(result, Err(HttpError::Transport(_))));

        let requests = client.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].name, "Vote on a Card");

        client.clear();
        assert_eq!(client.request_count().await, 0);
    }
}
