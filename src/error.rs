//! Error taxonomy for provisioning operations

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

// Remote kinds come from the response handler, local kinds are raised before any request
/// Every failure a provisioning operation can surface
#[derive(Error, Debug)]
pub enum Error {
    /// Remote 404
    #[error("{message}: {url}")]
    NotFound {
        /// Request URL
        url:     String,
        /// Always "resource not found"
        message: String,
    },

    /// Remote 401
    #[error("unauthorised: {url}")]
    Unauthorised {
        /// Request URL
        url: String,
    },

    /// Remote 400, carrying the payload that was rejected
    #[error("bad request: {url}{}", display_body(.body))]
    BadRequest {
        /// Request URL
        url:  String,
        /// Body that was sent; `None` for calls without one
        body: Option<Value>,
    },

    /// Remote 500
    #[error("{message}: {url}")]
    ServerError {
        /// Request URL
        url:     String,
        /// Always "server exception"
        message: String,
    },

    /// Any other non-success status
    #[error("unexpected status {status}{}", display_reason(.reason))]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Reason phrase, when the transport supplied one
        reason: Option<String>,
    },

    /// Vhost create refused before any request
    #[error("vhost already exists: {vhost}")]
    VhostAlreadyExists {
        /// Vhost name
        vhost: String,
    },

    /// Vhost delete refused before any request
    #[error("vhost not found: {vhost}")]
    VhostNotFound {
        /// Vhost name
        vhost: String,
    },

    /// Template content or substitution failed
    #[error("{message}")]
    Template {
        /// "exception in template <name>"
        message: String,
    },

    /// Template, registry or config file is missing
    #[error("file not found: {}", .path.display())]
    FileNotFound {
        /// Resolved path
        path: PathBuf,
    },

    /// Name absent from the environments registry
    #[error("unknown environment: {name}")]
    UnknownEnvironment {
        /// Environment name
        name: String,
    },

    /// Name absent from the accounts registry
    #[error("unknown account: {name}")]
    UnknownAccount {
        /// Account name
        name: String,
    },

    /// Malformed or incomplete configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Broker host does not form a valid URL
    #[error("invalid broker host: {host}")]
    InvalidHost {
        /// Host as configured
        host: String,
    },

    /// `.` and `..` cannot be sent as URL path segments: URL normalisation removes them
    #[error("name `{name}` cannot be addressed through the management API")]
    UnaddressableName {
        /// Offending vhost or resource name
        name: String,
    },

    /// The request never produced a response
    #[error("request to {url} failed: {source}")]
    Transport {
        /// Request URL
        url:    String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the JSON the operation expects
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        /// Request URL
        url:    String,
        /// Underlying decode error
        #[source]
        source: serde_json::Error,
    },

    /// Local file operation failed for a reason other than absence
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        /// What was being attempted
        action: &'static str,
        /// File involved
        path:   PathBuf,
        /// Underlying io error
        #[source]
        source: std::io::Error,
    },

    /// History database failure
    #[error("history store error: {0}")]
    History(#[from] sqlx::Error),

    /// Publisher confirm came back negative
    #[error("broker refused message published to {exchange}")]
    Nacked {
        /// Exchange the message was published to
        exchange: String,
    },

    /// AMQP failure
    #[error("messaging error: {0}")]
    Messaging(#[from] lapin::Error),
}

impl Error {
    /// Map an io error on `path`, turning a missing file into `FileNotFound`
    #[must_use]
    pub fn from_io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::Io {
                action,
                path,
                source,
            }
        }
    }
}

#[allow(clippy::ref_option)]
fn display_body(body: &Option<Value>) -> String {
    body.as_ref()
        .map(|b| format!(" body={b}"))
        .unwrap_or_default()
}

#[allow(clippy::ref_option)]
fn display_reason(reason: &Option<String>) -> String {
    reason.as_ref().map(|r| format!(" {r}")).unwrap_or_default()
}
