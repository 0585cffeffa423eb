//! Records exchanged with the schedule backend.
//!
//! Schedules and users come back as positional rows (spreadsheet columns),
//! so they are decoded from `Vec<Value>` rather than from objects.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::week::{ensure_week_start, parse_date};
use crate::{DashboardError, Session};

/// Render a spreadsheet cell as text. Empty cells and nulls are absent.
fn cell(row: &[Value], index: usize) -> Option<String> {
    match row.get(index)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Split a day cell into doctor names, one per line.
fn doctor_names(cell: Option<String>) -> Vec<String> {
    cell.map(|s| {
        s.lines()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Review state filters understood by `getPendingSchedules`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReviewFilter {
    /// Resubmitted after an edit and awaiting review.
    #[default]
    Modified,
    /// Awaiting first review.
    Pending,
    Approved,
    Rejected,
    All,
}

impl ReviewFilter {
    pub const ALL: [ReviewFilter; 5] = [
        ReviewFilter::Modified,
        ReviewFilter::Pending,
        ReviewFilter::Approved,
        ReviewFilter::Rejected,
        ReviewFilter::All,
    ];

    /// The status label the backend stores and filters on.
    pub fn label(self) -> &'static str {
        match self {
            ReviewFilter::Modified => "قيد المراجعة (تم التعديل)",
            ReviewFilter::Pending => "قيد المراجعة",
            ReviewFilter::Approved => "تمت الموافقة",
            ReviewFilter::Rejected => "تم الرفض",
            ReviewFilter::All => "الكل",
        }
    }

    /// Name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            ReviewFilter::Modified => "modified",
            ReviewFilter::Pending => "pending",
            ReviewFilter::Approved => "approved",
            ReviewFilter::Rejected => "rejected",
            ReviewFilter::All => "all",
        }
    }

    /// Match a backend status label. `All` is a filter, never a status.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .filter(|f| *f != ReviewFilter::All)
            .find(|f| f.label() == label)
    }
}

impl fmt::Display for ReviewFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReviewFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown review filter '{s}'"))
    }
}

/// One submitted weekly schedule.
///
/// Decoded from the row `[requestId, departmentId, startDate, sun, mon, tue,
/// wed, thu, fri, sat, submitter, status, submissionDate]`. Short rows leave
/// the trailing fields empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<Value>")]
pub struct ScheduleRecord {
    pub request_id: Option<String>,
    pub department_id: Option<String>,
    /// Week start as sent by the backend (a date or a timestamp).
    pub start_date: Option<String>,
    /// Doctors on duty, Sunday through Saturday.
    pub days: [Vec<String>; 7],
    pub submitter: Option<String>,
    pub status: Option<String>,
    pub submitted_at: Option<String>,
}

impl From<Vec<Value>> for ScheduleRecord {
    fn from(row: Vec<Value>) -> Self {
        Self {
            request_id: cell(&row, 0),
            department_id: cell(&row, 1),
            start_date: cell(&row, 2),
            days: std::array::from_fn(|day| doctor_names(cell(&row, 3 + day))),
            submitter: cell(&row, 10),
            status: cell(&row, 11),
            submitted_at: cell(&row, 12),
        }
    }
}

impl ScheduleRecord {
    pub fn status_label(&self) -> &str {
        self.status.as_deref().unwrap_or("unknown")
    }

    pub fn review_state(&self) -> Option<ReviewFilter> {
        self.status.as_deref().and_then(ReviewFilter::from_label)
    }

    /// Whether an admin may still approve or reject this schedule.
    pub fn is_awaiting_review(&self) -> bool {
        matches!(
            self.review_state(),
            Some(ReviewFilter::Pending | ReviewFilter::Modified)
        )
    }

    /// The week start as a local calendar date.
    pub fn week_start(&self) -> Option<NaiveDate> {
        let raw = self.start_date.as_deref()?;
        parse_date(raw).ok().or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Local).date_naive())
        })
    }
}

/// One user account. The password column is never kept.
///
/// Decoded from the row `[name, password, department, telegramId]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<Value>")]
pub struct UserRecord {
    pub name: String,
    pub department: Option<String>,
    pub telegram_id: Option<String>,
}

impl From<Vec<Value>> for UserRecord {
    fn from(row: Vec<Value>) -> Self {
        Self {
            name: cell(&row, 0).unwrap_or_default(),
            department: cell(&row, 2),
            telegram_id: cell(&row, 3),
        }
    }
}

/// Schedule totals per review state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScheduleCounts {
    pub modified: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub all: u64,
}

impl ScheduleCounts {
    pub fn count_for(&self, filter: ReviewFilter) -> u64 {
        match filter {
            ReviewFilter::Modified => self.modified,
            ReviewFilter::Pending => self.pending,
            ReviewFilter::Approved => self.approved,
            ReviewFilter::Rejected => self.rejected,
            ReviewFilter::All => self.all,
        }
    }
}

/// Whether a department has submitted its schedule for a week.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSummary {
    pub department_name: String,
    #[serde(default)]
    pub has_submitted: bool,
}

/// A new weekly schedule, as sent to `submitSchedule`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSubmission {
    pub employee_name: String,
    pub department_id: String,
    pub week_start_date: NaiveDate,
    /// Doctor names per day, newline-separated, Sunday through Saturday.
    pub daily_doctors: [String; 7],
}

impl ScheduleSubmission {
    /// Build a submission for the session's department.
    ///
    /// Names are trimmed and blank entries dropped. The week must start on a
    /// Sunday.
    pub fn new(
        session: &Session,
        week_start: NaiveDate,
        days: [Vec<String>; 7],
    ) -> Result<Self, DashboardError> {
        let week_start_date = ensure_week_start(week_start)?;
        let daily_doctors = days.map(|names| {
            names
                .iter()
                .map(|name| name.trim())
                .filter(|name| !name.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        });

        Ok(Self {
            employee_name: session.username.clone(),
            department_id: session.department_id.clone(),
            week_start_date,
            daily_doctors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn session() -> Session {
        Session {
            username: "amal".to_string(),
            role: Role::Employee,
            department_id: "ER".to_string(),
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_schedule_row_decodes() {
        let record: ScheduleRecord = serde_json::from_value(json!([
            "REQ-17",
            "ER",
            "2024-05-05",
            "Dr. Salma\nDr. Karim",
            "Dr. Salma",
            "",
            null,
            " Dr. Omar \n\n",
            "Dr. Lina",
            "Dr. Karim",
            "amal",
            "قيد المراجعة",
            "2024-05-01T09:30:00.000Z"
        ]))
        .unwrap();

        assert_eq!(record.request_id.as_deref(), Some("REQ-17"));
        assert_eq!(record.days[0], names(&["Dr. Salma", "Dr. Karim"]));
        assert_eq!(record.days[2], Vec::<String>::new());
        assert_eq!(record.days[3], Vec::<String>::new());
        assert_eq!(record.days[4], names(&["Dr. Omar"]));
        assert_eq!(record.submitter.as_deref(), Some("amal"));
        assert_eq!(record.review_state(), Some(ReviewFilter::Pending));
        assert!(record.is_awaiting_review());
        assert_eq!(record.week_start(), NaiveDate::from_ymd_opt(2024, 5, 5));
    }

    #[test]
    fn test_short_row_leaves_fields_empty() {
        let record: ScheduleRecord = serde_json::from_value(json!([42, "ICU"])).unwrap();
        assert_eq!(record.request_id.as_deref(), Some("42"));
        assert_eq!(record.status, None);
        assert_eq!(record.status_label(), "unknown");
        assert!(!record.is_awaiting_review());
        assert_eq!(record.week_start(), None);
    }

    #[test]
    fn test_schedule_row_must_be_array() {
        let result: Result<ScheduleRecord, _> = serde_json::from_value(json!({"id": 1}));
        assert!(result.is_err());
    }

    #[test]
    fn test_approved_schedule_not_awaiting_review() {
        let mut row = vec![json!(null); 13];
        row[11] = json!(ReviewFilter::Approved.label());
        let record = ScheduleRecord::from(row);
        assert_eq!(record.review_state(), Some(ReviewFilter::Approved));
        assert!(!record.is_awaiting_review());
    }

    #[test]
    fn test_user_row_drops_password() {
        let user: UserRecord =
            serde_json::from_value(json!(["amal", "s3cret", "ER", 123456789])).unwrap();
        assert_eq!(
            user,
            UserRecord {
                name: "amal".to_string(),
                department: Some("ER".to_string()),
                telegram_id: Some("123456789".to_string()),
            }
        );
    }

    #[test]
    fn test_user_row_without_telegram() {
        let user: UserRecord = serde_json::from_value(json!(["omar", "x", "ICU", ""])).unwrap();
        assert_eq!(user.telegram_id, None);
    }

    #[test]
    fn test_counts_decode_with_defaults() {
        let counts: ScheduleCounts =
            serde_json::from_value(json!({"pending": 4, "approved": 9, "all": 15})).unwrap();
        assert_eq!(counts.count_for(ReviewFilter::Pending), 4);
        assert_eq!(counts.count_for(ReviewFilter::Modified), 0);
        assert_eq!(counts.count_for(ReviewFilter::All), 15);
    }

    #[test]
    fn test_department_summary_decodes() {
        let summary: Vec<DepartmentSummary> = serde_json::from_value(json!([
            {"departmentName": "ER", "hasSubmitted": true},
            {"departmentName": "ICU", "hasSubmitted": false}
        ]))
        .unwrap();
        assert!(summary[0].has_submitted);
        assert_eq!(summary[1].department_name, "ICU");
    }

    #[test]
    fn test_review_filter_parsing() {
        assert_eq!("pending".parse::<ReviewFilter>(), Ok(ReviewFilter::Pending));
        assert_eq!("ALL".parse::<ReviewFilter>(), Ok(ReviewFilter::All));
        assert!("archived".parse::<ReviewFilter>().is_err());
        assert_eq!(ReviewFilter::from_label("الكل"), None);
        assert_eq!(ReviewFilter::default(), ReviewFilter::Modified);
    }

    #[test]
    fn test_submission_wire_format() {
        let days = [
            names(&["Dr. Salma", "  ", "Dr. Karim "]),
            names(&["Dr. Omar"]),
            vec![],
            names(&["Dr. Lina"]),
            vec![],
            vec![],
            names(&[""]),
        ];
        let week_start = NaiveDate::from_ymd_opt(2024, 5, 5).unwrap();
        let submission = ScheduleSubmission::new(&session(), week_start, days).unwrap();

        assert_eq!(
            serde_json::to_value(&submission).unwrap(),
            json!({
                "employeeName": "amal",
                "departmentId": "ER",
                "weekStartDate": "2024-05-05",
                "dailyDoctors": ["Dr. Salma\nDr. Karim", "Dr. Omar", "", "Dr. Lina", "", "", ""]
            })
        );
    }

    #[test]
    fn test_submission_requires_sunday() {
        let result = ScheduleSubmission::new(
            &session(),
            NaiveDate::from_ymd_opt(2024, 5, 7).unwrap(),
            Default::default(),
        );
        assert!(matches!(result, Err(DashboardError::NotSunday { .. })));
    }
}
