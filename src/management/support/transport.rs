//! HTTP transport seam for management API calls
//!
//! Resources never talk to `reqwest` directly. They build an [`ApiRequest`] and hand it to a
//! [`Transport`], which makes swapping the wire for a recording fake in tests trivial.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::constants::{HTTP_CONNECT_TIMEOUT_SECS, HTTP_TIMEOUT_SECS};
use crate::error::{Error, Result};
use crate::types::Broker;

/// One management API request
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method
    pub method:   Method,
    /// Fully built URL
    pub url:      String,
    /// Basic auth user
    pub user:     String,
    /// Basic auth password
    pub password: String,
    /// JSON body, if any
    pub body:     Option<Value>,
}

impl ApiRequest {
    /// Bodyless request authenticated as the broker's user
    #[must_use]
    pub fn new(method: Method, url: String, broker: &Broker) -> Self {
        Self {
            method,
            url,
            user: broker.user.clone(),
            password: broker.password.clone(),
            body: None,
        }
    }

    /// Attach a JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Status, reason phrase and raw body of a management API response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Best effort: transports are not required to supply one
    pub reason: Option<String>,
    /// Raw body text
    pub body:   String,
}

impl ApiResponse {
    /// Response with the canonical reason phrase for `status`
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            reason: status.canonical_reason().map(String::from),
            body: body.into(),
        }
    }

    /// Decode the body as JSON, naming `url` on failure
    pub fn json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|source| Error::Decode {
            url: url.to_string(),
            source,
        })
    }
}

/// Issues a single request and waits for its response
///
/// Failures to obtain any response at all are reported as [`Error::Transport`]; status
/// classification is left to the response handler.
pub trait Transport: Send + Sync {
    /// Send `request` and return whatever response came back, success or not
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<ApiResponse>> + Send;
}

/// `reqwest` backed transport with basic auth and JSON bodies
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Transport over a fresh `reqwest` client
    #[must_use]
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method, &request.url)
            .basic_auth(&request.user, Some(&request.password));
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|source| Error::Transport {
            url: request.url.clone(),
            source,
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|source| Error::Transport {
            url: request.url.clone(),
            source,
        })?;

        debug!("{} answered {}", request.url, status);
        Ok(ApiResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_carries_broker_credentials() {
        let broker = Broker::new("fake-broker", "guest", "guest");
        let request = ApiRequest::new(
            Method::PUT,
            "https://fake-broker/api/queues/EA/test".to_string(),
            &broker,
        )
        .json(json!({"durable": true}));

        assert_eq!(request.user, "guest");
        assert_eq!(request.password, "guest");
        assert_eq!(request.body, Some(json!({"durable": true})));
    }

    #[test]
    fn test_response_reason_defaults_to_canonical() {
        let response = ApiResponse::new(StatusCode::NOT_FOUND, "");
        assert_eq!(response.reason.as_deref(), Some("Not Found"));

        let response = ApiResponse::new(StatusCode::from_u16(512).unwrap(), "");
        assert!(response.reason.is_none());
    }

    #[test]
    fn test_response_json_names_url_on_failure() {
        let response = ApiResponse::new(StatusCode::OK, "not json");
        let err = response.json::<Value>("https://fake-broker/api/vhosts").unwrap_err();
        assert!(matches!(err, Error::Decode { ref url, .. } if url == "https://fake-broker/api/vhosts"));
    }
}
