use time::{format_description::FormatItem, macros::format_description};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    calendar::MonthScope,
    model::{parse_date, AttendanceRecord, AttendanceStatus},
    store::AttendanceStore,
    summary::{summarize, AttendanceSummary},
};
use crate::{error::AppError, report::Report};

const REPORT_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[weekday repr:short] [month repr:short] [day] [year]");

/// Validate the raw inputs, then upsert on (user, date).
///
/// Validation happens before the store is touched, so a bad status or date
/// never creates or modifies a record.
#[instrument(skip(store))]
pub async fn mark_attendance(
    store: &dyn AttendanceStore,
    user_id: Uuid,
    date: &str,
    status: &str,
) -> Result<AttendanceRecord, AppError> {
    let status: AttendanceStatus = status.parse()?;
    let date = parse_date(date)?;
    let record = store.upsert(user_id, date, status).await?;
    info!(%user_id, %date, %status, record_id = %record.id, "attendance marked");
    Ok(record)
}

/// All of a user's records in store order, optionally narrowed to one month.
#[instrument(skip(store))]
pub async fn list_attendance(
    store: &dyn AttendanceStore,
    user_id: Uuid,
    month: Option<MonthScope>,
) -> Result<Vec<AttendanceRecord>, AppError> {
    let mut records = store.list_by_user(user_id).await?;
    if let Some(month) = month {
        records.retain(|r| month.contains(r.date));
    }
    Ok(records)
}

#[instrument(skip(store))]
pub async fn attendance_summary(
    store: &dyn AttendanceStore,
    user_id: Uuid,
    month: Option<MonthScope>,
) -> Result<AttendanceSummary, AppError> {
    let records = list_attendance(store, user_id, month).await?;
    Ok(summarize(&records))
}

/// Records in chronological order; ties keep store order.
pub fn sort_for_report(mut records: Vec<AttendanceRecord>) -> Vec<AttendanceRecord> {
    records.sort_by_key(|r| r.date);
    records
}

pub fn report_line(index: usize, record: &AttendanceRecord) -> String {
    let date = record
        .date
        .format(REPORT_DATE_FORMAT)
        .unwrap_or_else(|_| record.date.to_string());
    format!("{}. Date: {} - Status: {}", index + 1, date, record.status)
}

pub fn build_report(title: &str, records: Vec<AttendanceRecord>) -> Report {
    let records = sort_for_report(records);
    let summary = summarize(&records);
    let mut lines: Vec<String> = records
        .iter()
        .enumerate()
        .map(|(i, r)| report_line(i, r))
        .collect();
    lines.push(format!(
        "Attendance: {:.2}% over {} working days",
        summary.attendance_percentage, summary.working_days
    ));
    Report {
        title: title.to_string(),
        lines,
    }
}
