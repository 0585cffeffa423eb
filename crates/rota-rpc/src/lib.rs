//! Resilient RPC client for the Rota schedule backend.
//!
//! Every backend operation is a single POST of `{action, payload}` to one
//! fixed endpoint. This crate wraps that call with bounded retry and
//! exponential backoff.
//!
//! ## Features
//!
//! - **Classification**: transport failures and 5xx responses are retried;
//!   4xx responses and application errors (`status: "error"`) are terminal
//! - **Backoff**: the delay before retry *i* is `initial_delay × 2^(i-1)`
//! - **Loading signal**: started before the first attempt and finished
//!   exactly once per call, even when the call future is dropped
//! - **Transport seam**: attempts go through the [`Transport`] trait, with
//!   [`HttpTransport`] as the reqwest-backed implementation

mod client;
mod config;
mod error;
mod observer;
mod retry;
mod transport;
mod types;

pub use client::RpcClient;
pub use config::ClientConfig;
pub use error::{CONNECTIVITY_MESSAGE, ErrorKind, RpcError, TransportError, classify_response};
pub use observer::{CallObserver, LoadingIndicator, Notice, NoticeLevel, TracingObserver};
pub use reqwest::StatusCode;
pub use retry::RetryPolicy;
pub use transport::{HttpTransport, RawResponse, Transport};
pub use types::{RpcRequest, RpcResponse};
