//! In-memory login session.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

/// What a logged-in user may do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Reviews schedules and manages users.
    Admin,
    /// Submits schedules for one department.
    #[default]
    #[serde(other)]
    Employee,
}

/// The authenticated identity, as returned by `userLogin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub username: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub department_id: String,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Holds the current session for the lifetime of the process.
///
/// Created empty; filled by login and cleared by logout. Nothing is written
/// to disk.
#[derive(Debug, Default)]
pub struct SessionStore {
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current session.
    pub async fn login(&self, session: Session) {
        info!(username = %session.username, role = ?session.role, "logged in");
        *self.current.write().await = Some(session);
    }

    /// Drop the current session, returning it if there was one.
    pub async fn logout(&self) -> Option<Session> {
        let previous = self.current.write().await.take();
        if let Some(ref session) = previous {
            info!(username = %session.username, "logged out");
        }
        previous
    }

    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    pub async fn is_logged_in(&self) -> bool {
        self.current.read().await.is_some()
    }
}
