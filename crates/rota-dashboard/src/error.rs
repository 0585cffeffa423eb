//! Error types for dashboard operations.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur in dashboard operations.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// RPC error.
    #[error("RPC error: {0}")]
    Rpc(#[from] rota_rpc::RpcError),

    /// A week was requested that does not start on a Sunday.
    #[error("week must start on a Sunday, got {date} ({weekday})")]
    NotSunday {
        date: NaiveDate,
        weekday: chrono::Weekday,
    },

    /// The operation needs a logged-in user.
    #[error("not logged in")]
    NotLoggedIn,

    /// The logged-in user lacks the role the operation needs.
    #[error("{username} is not allowed to {operation}")]
    Forbidden {
        username: String,
        operation: &'static str,
    },

    /// A success response lacked a field the action promises.
    #[error("response to {action} is missing {field}")]
    MissingField {
        action: &'static str,
        field: &'static str,
    },

    /// A response field had an unexpected shape.
    #[error("failed to decode {field} of {action}: {source}")]
    Decode {
        action: &'static str,
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl DashboardError {
    /// Message suitable for showing to the person who triggered the operation.
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Rpc(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
