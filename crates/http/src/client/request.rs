//! Request descriptions handed to the executor

use http::{HeaderMap, Method};

/// Body of an outgoing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Textual body, sent as JSON unless a content type is given
    Text(String),
    /// Raw bytes, sent without a default content type
    Bytes(Vec<u8>),
}

impl From<String> for RequestBody {
    fn from(body: String) -> Self {
        Self::Text(body)
    }
}

impl From<&str> for RequestBody {
    fn from(body: &str) -> Self {
        Self::Text(body.to_string())
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(body: Vec<u8>) -> Self {
        Self::Bytes(body)
    }
}

/// Caller supplied request options
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: impl Into<RequestBody>) -> Self {
        Self {
            method: Method::POST,
            body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, name: http::header::HeaderName, value: http::HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(RequestBody::Text(serde_json::to_string(value)?));
        Ok(self)
    }
}

/// One logical request, alive until it succeeds or fails for good
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub url: String,
    pub options: RequestOptions,
    pub retry_count: u32,
}

impl PendingRequest {
    pub fn new(url: impl Into<String>, options: RequestOptions) -> Self {
        Self {
            url: url.into(),
            options,
            retry_count: 0,
        }
    }
}
