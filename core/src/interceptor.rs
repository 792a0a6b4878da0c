//! Request and response interceptors.
//!
//! # Design
//! An interceptor is a pair of optional hooks: a transform that receives the
//! current value and returns the one passed to the next interceptor, and an
//! error hook called for its side effects. Both hooks have no-op defaults, so
//! an implementation overrides only what it needs. Error hooks return `()`;
//! they observe a failure but can neither replace nor suppress it.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    async fn on_request(&self, request: HttpRequest) -> Result<HttpRequest, ApiError> {
        Ok(request)
    }

    async fn on_error(&self, _error: &ApiError) {}
}

#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    async fn on_response(&self, response: HttpResponse) -> Result<HttpResponse, ApiError> {
        Ok(response)
    }

    async fn on_error(&self, _error: &ApiError) {}
}

/// Logs every request, response and failure through `tracing`.
///
/// Registered on both chains by `ShopClient::from_config`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingInterceptor;

#[async_trait]
impl RequestInterceptor for LoggingInterceptor {
    async fn on_request(&self, request: HttpRequest) -> Result<HttpRequest, ApiError> {
        tracing::debug!(method = %request.method, path = %request.path, "http request");
        Ok(request)
    }

    async fn on_error(&self, error: &ApiError) {
        tracing::error!(%error, "http request error");
    }
}

#[async_trait]
impl ResponseInterceptor for LoggingInterceptor {
    async fn on_response(&self, response: HttpResponse) -> Result<HttpResponse, ApiError> {
        tracing::debug!(
            status = response.status,
            status_text = %response.status_text,
            request_id = response.header("x-request-id").unwrap_or("-"),
            "http response"
        );
        Ok(response)
    }

    async fn on_error(&self, error: &ApiError) {
        tracing::error!(%error, status = ?error.status(), "http response error");
    }
}

/// Sets a fixed header on every outgoing request, replacing any value the
/// request already carries under the same name.
#[derive(Debug, Clone)]
pub struct HeaderInterceptor {
    name: String,
    value: String,
}

impl HeaderInterceptor {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn bearer(token: &str) -> Self {
        Self::new("Authorization", format!("Bearer {token}"))
    }
}

#[async_trait]
impl RequestInterceptor for HeaderInterceptor {
    async fn on_request(&self, mut request: HttpRequest) -> Result<HttpRequest, ApiError> {
        request
            .headers
            .retain(|key, _| !key.eq_ignore_ascii_case(&self.name));
        request.headers.insert(self.name.clone(), self.value.clone());
        Ok(request)
    }
}
