//! Plain-text output for dashboard results.

use chrono::NaiveDate;
use rota_dashboard::{
    DepartmentSummary, ReviewFilter, ScheduleCounts, ScheduleRecord, UserRecord, week,
};

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

/// One schedule: a header line, then one line per day. Pending and
/// modified schedules get a `*` after the status.
pub fn schedule(record: &ScheduleRecord) -> String {
    let start = record.week_start();
    let mut lines = vec![format!(
        "{}  {}  week of {}  [{}]{}",
        or_dash(record.request_id.as_deref()),
        or_dash(record.department_id.as_deref()),
        start.map(week::format_date).as_deref().unwrap_or("?"),
        record.status_label(),
        if record.is_awaiting_review() { " *" } else { "" },
    )];

    for (day, names) in record.days.iter().enumerate() {
        let date = start
            .and_then(|s| week::week_days(s).nth(day))
            .map(week::format_date)
            .unwrap_or_default();
        let doctors = if names.is_empty() {
            "-".to_string()
        } else {
            names.join(", ")
        };
        lines.push(format!("  {} {:<10} {}", DAY_NAMES[day], date, doctors));
    }

    if let Some(submitter) = &record.submitter {
        lines.push(format!("  submitted by {}", submitter));
    }
    lines.join("\n")
}

pub fn schedules(records: &[ScheduleRecord]) -> String {
    if records.is_empty() {
        return "No schedules.".to_string();
    }
    records
        .iter()
        .map(schedule)
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn users(users: &[UserRecord]) -> String {
    if users.is_empty() {
        return "No users.".to_string();
    }
    users
        .iter()
        .map(|u| {
            format!(
                "{}\t{}\t{}",
                u.name,
                or_dash(u.department.as_deref()),
                u.telegram_id.as_deref().unwrap_or("no telegram"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn counts(counts: &ScheduleCounts) -> String {
    ReviewFilter::ALL
        .into_iter()
        .map(|filter| format!("{:<9} {}", filter.name(), counts.count_for(filter)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Which departments submitted the week, missing ones last.
pub fn summary(week_start: NaiveDate, departments: &[DepartmentSummary]) -> String {
    let mut lines = vec![format!(
        "Week {} to {}",
        week::format_date(week_start),
        week::format_date(week::week_end(week_start)),
    )];

    let (submitted, missing): (Vec<_>, Vec<_>) = departments.iter().partition(|d| d.has_submitted);
    lines.extend(
        submitted
            .iter()
            .map(|d| format!("  submitted  {}", d.department_name)),
    );
    lines.extend(
        missing
            .iter()
            .map(|d| format!("  missing    {}", d.department_name)),
    );
    if departments.is_empty() {
        lines.push("  no departments".to_string());
    }
    lines.join("\n")
}
