//! The typed REST client and its interceptor pipeline.
//!
//! # Design
//! `ShopClient` owns a base URL, a `Transport` and two append-only interceptor
//! lists. Every call snapshots both lists, then runs one linear pipeline:
//!
//! 1. merge the default `Content-Type` beneath the caller's headers;
//! 2. run request interceptors in registration order;
//! 3. send through the transport;
//! 4. run response interceptors in registration order;
//! 5. turn a non-2xx status into `ApiError::Http`;
//! 6. decode the body into the caller's type.
//!
//! A failure anywhere in 2..=6 is reported to every response interceptor's
//! error hook, in order, before it is returned. A request interceptor's own
//! error hook additionally runs when that interceptor fails. There is no
//! retry, backoff or caching.

use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::interceptor::{LoggingInterceptor, RequestInterceptor, ResponseInterceptor};
use crate::resources::{Orders, Products};
use crate::transport::{ReqwestTransport, Transport};

type RequestChain = Vec<Arc<dyn RequestInterceptor>>;
type ResponseChain = Vec<Arc<dyn ResponseInterceptor>>;

pub struct ShopClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    request_interceptors: RwLock<RequestChain>,
    response_interceptors: RwLock<ResponseChain>,
}

impl ShopClient {
    /// Create a client with no interceptors. The base URL is not validated
    /// here; a malformed one fails on the first call as a transport error.
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            request_interceptors: RwLock::new(Vec::new()),
            response_interceptors: RwLock::new(Vec::new()),
        }
    }

    /// Network-backed client with request and response logging registered.
    pub fn from_config(config: &ClientConfig) -> Self {
        let client = Self::new(&config.base_url, Arc::new(ReqwestTransport::new()));
        client.add_request_interceptor(LoggingInterceptor);
        client.add_response_interceptor(LoggingInterceptor);
        client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn add_request_interceptor<I>(&self, interceptor: I)
    where
        I: RequestInterceptor + 'static,
    {
        self.request_interceptors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(interceptor));
    }

    pub fn add_response_interceptor<I>(&self, interceptor: I)
    where
        I: ResponseInterceptor + 'static,
    {
        self.response_interceptors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(interceptor));
    }

    pub fn products(&self) -> Products<'_> {
        Products::new(self)
    }

    pub fn orders(&self) -> Orders<'_> {
        Orders::new(self)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(HttpRequest::new(HttpMethod::Get, path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = HttpRequest::new(HttpMethod::Post, path).with_body(encode(body)?);
        self.send(request).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = HttpRequest::new(HttpMethod::Put, path).with_body(encode(body)?);
        self.send(request).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(HttpRequest::new(HttpMethod::Delete, path)).await
    }

    /// Run `request` through the full pipeline and decode the body as `T`.
    pub async fn send<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        let request_chain = self.request_chain();
        let response_chain = self.response_chain();

        tracing::debug!(method = %request.method, path = %request.path, "dispatching request");

        match self.execute(request, &request_chain, &response_chain).await {
            Ok(value) => Ok(value),
            Err(error) => {
                tracing::warn!(%error, status = ?error.status(), "request failed");
                for interceptor in &response_chain {
                    interceptor.on_error(&error).await;
                }
                Err(error)
            }
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        mut request: HttpRequest,
        request_chain: &[Arc<dyn RequestInterceptor>],
        response_chain: &[Arc<dyn ResponseInterceptor>],
    ) -> Result<T, ApiError> {
        request.apply_default_headers();

        for interceptor in request_chain {
            request = match interceptor.on_request(request).await {
                Ok(request) => request,
                Err(error) => {
                    interceptor.on_error(&error).await;
                    return Err(error);
                }
            };
        }

        let url = format!("{}{}", self.base_url, request.path);
        let mut response: HttpResponse = self.transport.send(&url, request).await?;

        for interceptor in response_chain {
            response = match interceptor.on_response(response).await {
                Ok(response) => response,
                Err(error) => {
                    interceptor.on_error(&error).await;
                    return Err(error);
                }
            };
        }

        if !response.is_success() {
            return Err(ApiError::http(response.status));
        }

        response.parse()
    }

    fn request_chain(&self) -> RequestChain {
        self.request_interceptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn response_chain(&self) -> ResponseChain {
        self.response_interceptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl std::fmt::Debug for ShopClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopClient")
            .field("base_url", &self.base_url)
            .field("request_interceptors", &self.request_chain().len())
            .field("response_interceptors", &self.response_chain().len())
            .finish_non_exhaustive()
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))
}
