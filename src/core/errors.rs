//! Custom error types for Smartling API operations

use thiserror::Error;

use crate::core::response::ResponseCode;

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// A required parameter was missing or invalid, detected before dispatch
    #[error("Invalid parameter: {name}")]
    InvalidParameter {
        name: String,
    },

    /// Authorization was requested but no access token is set
    #[error("Missing credential: access token is not set")]
    MissingCredential,

    /// No interpretable response was received
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A response arrived but its envelope or payload shape was invalid
    #[error("Malformed response: {message}")]
    MalformedResponse {
        message: String,
    },

    /// The server rejected the credentials (HTTP 401/403)
    #[error("Authentication failed: {}", .messages.join("; "))]
    Authentication {
        messages: Vec<String>,
    },

    /// The account's operations limit was exceeded
    #[error("Operations limit exceeded: {}", .messages.join("; "))]
    OperationsLimitExceeded {
        messages: Vec<String>,
    },

    /// HTTP 200 with a non-success envelope code
    #[error("API reported {code}: {}", .messages.join("; "))]
    ApiResponse {
        code: ResponseCode,
        messages: Vec<String>,
    },

    /// Any other non-success HTTP status
    #[error("HTTP {status}: {}", .messages.join("; "))]
    Http {
        status: u16,
        raw_body: String,
        messages: Vec<String>,
    },
}

impl ApiError {
    /// Server-provided diagnostic messages carried by this error, if any
    pub fn messages(&self) -> &[String] {
        match self {
            ApiError::Authentication { messages }
            | ApiError::OperationsLimitExceeded { messages }
            | ApiError::ApiResponse { messages, .. }
            | ApiError::Http { messages, .. } => messages,
            _ => &[],
        }
    }
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
