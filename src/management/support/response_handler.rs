//! Classification of management API responses
//!
//! Every resource funnels its responses through here so that status handling is decided in
//! exactly one place. Read calls have nothing to attach to a 400, write calls attach the
//! payload that was rejected.

use reqwest::StatusCode;
use serde_json::Value;
use tracing::warn;

use super::transport::ApiResponse;
use crate::constants::{MSG_NOT_FOUND, MSG_SERVER_ERROR};
use crate::error::{Error, Result};

/// Classify the response of a call that sent no body
pub fn handle_response(response: &ApiResponse, url: &str) -> Result<()> {
    classify(response, url, None)
}

/// Classify the response of a call that sent `body`
pub fn handle_response_with_body(response: &ApiResponse, url: &str, body: &Value) -> Result<()> {
    classify(response, url, Some(body))
}

fn classify(response: &ApiResponse, url: &str, body: Option<&Value>) -> Result<()> {
    if response.status.is_success() {
        return Ok(());
    }

    warn!("{url} returned {}", response.status);
    let url = url.to_string();
    Err(match response.status {
        StatusCode::NOT_FOUND => Error::NotFound {
            url,
            message: MSG_NOT_FOUND.to_string(),
        },
        StatusCode::UNAUTHORIZED => Error::Unauthorised { url },
        StatusCode::BAD_REQUEST => Error::BadRequest {
            url,
            body: body.cloned(),
        },
        StatusCode::INTERNAL_SERVER_ERROR => Error::ServerError {
            url,
            message: MSG_SERVER_ERROR.to_string(),
        },
        status => Error::UnexpectedStatus {
            status: status.as_u16(),
            reason: response.reason.clone(),
        },
    })
}
