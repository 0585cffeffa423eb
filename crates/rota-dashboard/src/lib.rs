//! Typed schedule dashboard operations for Rota.
//!
//! This crate provides:
//! - One method per backend action on [`DashboardApi`]
//! - An explicit login/logout [`SessionStore`] instead of ambient state
//! - Week arithmetic for Sunday-based schedule weeks
//! - Decoding of the backend's positional schedule and user rows

mod api;
mod error;
mod records;
mod session;
pub mod week;

pub use api::{AlertOutcome, DashboardApi, NewUser, ScheduleAction, UserUpdate};
pub use error::DashboardError;
pub use records::{
    DepartmentSummary, ReviewFilter, ScheduleCounts, ScheduleRecord, ScheduleSubmission, UserRecord,
};
pub use session::{Role, Session, SessionStore};
