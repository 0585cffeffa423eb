//! Typed wrappers for every backend action.

use std::sync::Arc;

use chrono::NaiveDate;
use rota_rpc::{RpcClient, RpcResponse};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::week::{ensure_week_start, format_date};
use crate::{
    DashboardError, DepartmentSummary, ReviewFilter, ScheduleCounts, ScheduleRecord,
    ScheduleSubmission, Session, SessionStore, UserRecord,
};

const GET_INITIAL_DATA: &str = "getInitialData";
const USER_LOGIN: &str = "userLogin";
const GET_PUBLIC_SCHEDULES: &str = "getPublicSchedules";
const SUBMIT_SCHEDULE: &str = "submitSchedule";
const GET_PREVIOUS_SCHEDULES: &str = "getPreviousSchedules";
const CHECK_IF_SCHEDULE_EXISTS: &str = "checkIfScheduleExists";
const GET_USERS: &str = "getUsers";
const ADD_USER: &str = "addUser";
const UPDATE_USER: &str = "updateUser";
const DELETE_USER: &str = "deleteUser";
const GET_SCHEDULE_COUNTS: &str = "getScheduleCounts";
const GET_PENDING_SCHEDULES: &str = "getPendingSchedules";
const GET_WEEKLY_SUMMARY: &str = "getWeeklySummary";
const SEND_TELEGRAM_ALERT: &str = "sendTelegramAlert";

/// Review decisions an admin can take on a submitted schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleAction {
    Approve,
    Reject,
    Delete,
}

impl ScheduleAction {
    pub fn action_name(self) -> &'static str {
        match self {
            ScheduleAction::Approve => "approveSchedule",
            ScheduleAction::Reject => "rejectSchedule",
            ScheduleAction::Delete => "deleteSchedule",
        }
    }
}

/// A user account to create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub password: String,
    pub department: String,
    /// Telegram chat id for reminders; empty when unknown.
    pub telegram_id: String,
}

/// Changes to an existing user account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub original_name: String,
    pub new_name: String,
    /// Empty keeps the current password.
    pub new_password: String,
    pub new_department: String,
    pub new_telegram_id: String,
}

/// Result of asking the backend to remind a department.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertOutcome {
    pub sent: bool,
    pub message: String,
}

/// Schedule dashboard operations over the RPC client.
///
/// Holds the login session; operations that act on behalf of a user read
/// it from here rather than taking identity arguments.
#[derive(Debug, Clone)]
pub struct DashboardApi {
    rpc: RpcClient,
    sessions: Arc<SessionStore>,
}

impl DashboardApi {
    pub fn new(rpc: RpcClient) -> Self {
        Self::with_sessions(rpc, Arc::new(SessionStore::new()))
    }

    pub fn with_sessions(rpc: RpcClient, sessions: Arc<SessionStore>) -> Self {
        Self { rpc, sessions }
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    async fn require_session(&self) -> Result<Session, DashboardError> {
        self.sessions
            .current()
            .await
            .ok_or(DashboardError::NotLoggedIn)
    }

    async fn require_admin(&self, operation: &'static str) -> Result<Session, DashboardError> {
        let session = self.require_session().await?;
        if !session.is_admin() {
            return Err(DashboardError::Forbidden {
                username: session.username,
                operation,
            });
        }
        Ok(session)
    }

    /// Department names for the public filter.
    pub async fn initial_data(&self) -> Result<Vec<String>, DashboardError> {
        let resp = self.rpc.call_empty(GET_INITIAL_DATA).await?;
        list_field(&resp, GET_INITIAL_DATA, "departments")
    }

    /// Authenticate and start a session.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, DashboardError> {
        #[derive(Serialize)]
        struct LoginRequest<'a> {
            username: &'a str,
            password: &'a str,
        }

        let resp = self
            .rpc
            .call(USER_LOGIN, &LoginRequest { username, password })
            .await?;
        let session: Session = resp.decode().map_err(|source| DashboardError::Decode {
            action: USER_LOGIN,
            field: "session",
            source,
        })?;

        self.sessions.login(session.clone()).await;
        Ok(session)
    }

    pub async fn logout(&self) -> Option<Session> {
        self.sessions.logout().await
    }

    /// Published schedules for one department. No department, no call.
    pub async fn public_schedules(
        &self,
        department: &str,
    ) -> Result<Vec<ScheduleRecord>, DashboardError> {
        if department.trim().is_empty() {
            return Ok(Vec::new());
        }
        let resp = self
            .rpc
            .call(GET_PUBLIC_SCHEDULES, &json!({ "department": department }))
            .await?;
        list_field(&resp, GET_PUBLIC_SCHEDULES, "data")
    }

    /// Submit a week of doctors for the logged-in user's department.
    ///
    /// Returns the backend's confirmation message.
    pub async fn submit_schedule(
        &self,
        week_start: NaiveDate,
        days: [Vec<String>; 7],
    ) -> Result<String, DashboardError> {
        let session = self.require_session().await?;
        let submission = ScheduleSubmission::new(&session, week_start, days)?;

        let resp = self.rpc.call(SUBMIT_SCHEDULE, &submission).await?;
        info!(
            department = %submission.department_id,
            week = %submission.week_start_date,
            "schedule submitted"
        );
        Ok(message(&resp))
    }

    /// Schedules previously submitted for the logged-in user's department.
    pub async fn previous_schedules(&self) -> Result<Vec<ScheduleRecord>, DashboardError> {
        let session = self.require_session().await?;
        let resp = self
            .rpc
            .call(
                GET_PREVIOUS_SCHEDULES,
                &json!({ "departmentId": session.department_id }),
            )
            .await?;
        list_field(&resp, GET_PREVIOUS_SCHEDULES, "data")
    }

    /// Whether the logged-in user already submitted the week starting `week_start`.
    pub async fn schedule_exists(&self, week_start: NaiveDate) -> Result<bool, DashboardError> {
        let session = self.require_session().await?;
        let week_start = ensure_week_start(week_start)?;

        let resp = self
            .rpc
            .call(
                CHECK_IF_SCHEDULE_EXISTS,
                &json!({ "date": format_date(week_start), "username": session.username }),
            )
            .await?;
        let exists: Option<bool> = optional_field(&resp, CHECK_IF_SCHEDULE_EXISTS, "exists")?;
        Ok(exists.unwrap_or(false))
    }

    pub async fn users(&self) -> Result<Vec<UserRecord>, DashboardError> {
        self.require_admin("list users").await?;
        let resp = self.rpc.call_empty(GET_USERS).await?;
        list_field(&resp, GET_USERS, "data")
    }

    pub async fn add_user(&self, user: &NewUser) -> Result<String, DashboardError> {
        self.require_admin("add users").await?;
        let resp = self.rpc.call(ADD_USER, user).await?;
        Ok(message(&resp))
    }

    pub async fn update_user(&self, update: &UserUpdate) -> Result<String, DashboardError> {
        self.require_admin("update users").await?;
        let resp = self.rpc.call(UPDATE_USER, update).await?;
        Ok(message(&resp))
    }

    pub async fn delete_user(&self, username: &str) -> Result<String, DashboardError> {
        self.require_admin("delete users").await?;
        let resp = self
            .rpc
            .call(DELETE_USER, &json!({ "username": username }))
            .await?;
        Ok(message(&resp))
    }

    pub async fn schedule_counts(&self) -> Result<ScheduleCounts, DashboardError> {
        self.require_admin("count schedules").await?;
        let resp = self.rpc.call_empty(GET_SCHEDULE_COUNTS).await?;
        required_field(&resp, GET_SCHEDULE_COUNTS, "data")
    }

    /// Schedules in the given review state.
    pub async fn pending_schedules(
        &self,
        filter: ReviewFilter,
    ) -> Result<Vec<ScheduleRecord>, DashboardError> {
        self.require_admin("review schedules").await?;
        let resp = self
            .rpc
            .call(GET_PENDING_SCHEDULES, &json!({ "status": filter.label() }))
            .await?;
        list_field(&resp, GET_PENDING_SCHEDULES, "data")
    }

    pub async fn schedule_action(
        &self,
        request_id: &str,
        action: ScheduleAction,
    ) -> Result<String, DashboardError> {
        self.require_admin("review schedules").await?;
        let resp = self
            .rpc
            .call(action.action_name(), &json!({ "requestId": request_id }))
            .await?;
        debug!(
            request_id,
            action = action.action_name(),
            "schedule action applied"
        );
        Ok(message(&resp))
    }

    /// Which departments submitted the week starting `week_start`.
    pub async fn weekly_summary(
        &self,
        week_start: NaiveDate,
    ) -> Result<Vec<DepartmentSummary>, DashboardError> {
        self.require_admin("view the weekly summary").await?;
        let resp = self
            .rpc
            .call(
                GET_WEEKLY_SUMMARY,
                &json!({ "date": format_date(week_start) }),
            )
            .await?;
        list_field(&resp, GET_WEEKLY_SUMMARY, "data")
    }

    /// Remind a department that its schedule for `week_start` is missing.
    pub async fn send_alert(
        &self,
        department_name: &str,
        week_start: NaiveDate,
    ) -> Result<AlertOutcome, DashboardError> {
        self.require_admin("send alerts").await?;
        let resp = self
            .rpc
            .call(
                SEND_TELEGRAM_ALERT,
                &json!({
                    "departmentName": department_name,
                    "weekStartDate": format_date(week_start),
                }),
            )
            .await?;
        Ok(AlertOutcome {
            sent: resp.status() == Some("success"),
            message: message(&resp),
        })
    }
}

fn message(resp: &RpcResponse) -> String {
    resp.message().unwrap_or_default().to_string()
}

fn optional_field<T: DeserializeOwned>(
    resp: &RpcResponse,
    action: &'static str,
    field: &'static str,
) -> Result<Option<T>, DashboardError> {
    match resp.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => resp
            .decode_field(field)
            .map(Some)
            .map_err(|source| DashboardError::Decode {
                action,
                field,
                source,
            }),
    }
}

fn required_field<T: DeserializeOwned>(
    resp: &RpcResponse,
    action: &'static str,
    field: &'static str,
) -> Result<T, DashboardError> {
    optional_field(resp, action, field)?
        .ok_or(DashboardError::MissingField { action, field })
}

/// List fields are treated as empty when the backend omits them.
fn list_field<T: DeserializeOwned>(
    resp: &RpcResponse,
    action: &'static str,
    field: &'static str,
) -> Result<Vec<T>, DashboardError> {
    Ok(optional_field(resp, action, field)?.unwrap_or_default())
}
