//! Error types for the RPC client.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

use crate::RpcResponse;

/// User-facing message for failures caused by an unreachable or faulty server.
pub const CONNECTIVITY_MESSAGE: &str =
    "Failed to connect to the server. Please check your internet connection and try again.";

/// A request that never produced an HTTP response.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    timed_out: bool,
}

impl TransportError {
    /// A connection-level failure (DNS, refused, reset, TLS).
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
        }
    }

    /// The request or connect deadline elapsed.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: true,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.timed_out
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            timed_out: err.is_timeout(),
            message: err.to_string(),
        }
    }
}

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The request never produced a response. Retryable.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with a 5xx status. Retryable.
    #[error("server error (status {status})")]
    ServerFault { status: StatusCode },

    /// The server rejected the request with a non-success, non-5xx status.
    #[error("invalid network response: {status}")]
    ClientRequest { status: StatusCode },

    /// The backend processed the request and reported `status: "error"`.
    #[error("{message}")]
    Application { message: String },

    /// A success status whose body is not a JSON object.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The payload could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure category, independent of the error's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    ServerFault,
    ClientRequest,
    Application,
    InvalidResponse,
    Encode,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Transport => "transport",
            ErrorKind::ServerFault => "server_fault",
            ErrorKind::ClientRequest => "client_request",
            ErrorKind::Application => "application",
            ErrorKind::InvalidResponse => "invalid_response",
            ErrorKind::Encode => "encode",
        };
        f.write_str(name)
    }
}

impl RpcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RpcError::Transport(_) => ErrorKind::Transport,
            RpcError::ServerFault { .. } => ErrorKind::ServerFault,
            RpcError::ClientRequest { .. } => ErrorKind::ClientRequest,
            RpcError::Application { .. } => ErrorKind::Application,
            RpcError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            RpcError::Encode(_) => ErrorKind::Encode,
        }
    }

    /// Check if a failure is transient and worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RpcError::Transport(_) | RpcError::ServerFault { .. })
    }

    /// Message suitable for showing to the person who triggered the call.
    ///
    /// Connectivity-class failures (the retryable ones) collapse to
    /// [`CONNECTIVITY_MESSAGE`]; everything else surfaces its own text.
    pub fn user_message(&self) -> String {
        if self.is_retryable() {
            CONNECTIVITY_MESSAGE.to_string()
        } else {
            format!("An error occurred: {}", self)
        }
    }
}

/// Classify the outcome of one HTTP attempt.
///
/// Statuses of 500 and above are retryable server faults. Any other
/// non-success status is terminal. A success status whose body reports
/// `status: "error"` is a terminal application error.
pub fn classify_response(status: StatusCode, body: &str) -> Result<RpcResponse, RpcError> {
    if status.is_server_error() {
        return Err(RpcError::ServerFault { status });
    }
    if !status.is_success() {
        return Err(RpcError::ClientRequest { status });
    }

    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| RpcError::InvalidResponse(format!("body is not JSON: {}", e)))?;
    if !value.is_object() {
        return Err(RpcError::InvalidResponse(
            "body is not a JSON object".to_string(),
        ));
    }

    if value.get("status").and_then(serde_json::Value::as_str) == Some("error") {
        let message = value
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("the server reported an error without a message")
            .to_string();
        return Err(RpcError::Application { message });
    }

    Ok(RpcResponse::new(value))
}
