//! In-memory `Transport` for tests.
//!
//! Responses are replayed in the order they were queued and every request is
//! recorded, so a test can assert exactly what reached the wire.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// A request as observed by `MockTransport`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub url: String,
    pub request: HttpRequest,
}

#[derive(Debug, Default)]
pub struct MockTransport {
    queue: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
    recorded: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: HttpResponse) -> &Self {
        self.lock_queue().push_back(Ok(response));
        self
    }

    pub fn push_json(&self, status: u16, body: serde_json::Value) -> &Self {
        self.push_response(HttpResponse::json(status, &body))
    }

    pub fn push_error(&self, error: ApiError) -> &Self {
        self.lock_queue().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<HttpResponse, ApiError>>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, url: &str, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                url: url.to_string(),
                request,
            });
        self.lock_queue()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::transport("no response queued")))
    }
}
