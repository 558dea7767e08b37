use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, HeaderValue},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::{
    calendar::{month_grid, CalendarMonth, MonthScope},
    dto::{MarkRequest, MonthQuery},
    model::AttendanceRecord,
    services::{attendance_summary, build_report, list_attendance, mark_attendance},
    summary::AttendanceSummary,
};
use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    report::{report_filename, PDF_CONTENT_TYPE},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/attendance/mark", post(mark))
        .route("/attendance/report", get(report))
        .route("/attendance/:user", get(list))
        .route("/attendance/:user/summary", get(summary))
        .route("/attendance/:user/calendar", get(calendar))
}

fn bad_json(e: JsonRejection) -> AppError {
    AppError::Validation(e.body_text())
}

fn bad_path(e: PathRejection) -> AppError {
    AppError::Validation(e.body_text())
}

fn bad_query(e: QueryRejection) -> AppError {
    AppError::Validation(e.body_text())
}

#[instrument(skip(state, payload))]
pub async fn mark(
    State(state): State<AppState>,
    payload: Result<Json<MarkRequest>, JsonRejection>,
) -> Result<Json<AttendanceRecord>, AppError> {
    let Json(req) = payload.map_err(bad_json)?;
    let record =
        mark_attendance(state.attendance.as_ref(), req.user, &req.date, &req.status).await?;
    Ok(Json(record))
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    user: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<Vec<AttendanceRecord>>, AppError> {
    let Path(user_id) = user.map_err(bad_path)?;
    let Query(query) = query.map_err(bad_query)?;
    let records = list_attendance(state.attendance.as_ref(), user_id, query.scope()?).await?;
    Ok(Json(records))
}

#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    user: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<AttendanceSummary>, AppError> {
    let Path(user_id) = user.map_err(bad_path)?;
    let Query(query) = query.map_err(bad_query)?;
    let summary = attendance_summary(state.attendance.as_ref(), user_id, query.scope()?).await?;
    Ok(Json(summary))
}

#[instrument(skip(state))]
pub async fn calendar(
    State(state): State<AppState>,
    user: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<CalendarMonth>, AppError> {
    let Path(user_id) = user.map_err(bad_path)?;
    let Query(query) = query.map_err(bad_query)?;
    let scope = query.scope()?.unwrap_or_else(MonthScope::current);
    let records = list_attendance(state.attendance.as_ref(), user_id, None).await?;
    Ok(Json(month_grid(scope, &records)))
}

/// PDF of the caller's own records.
#[instrument(skip(state))]
pub async fn report(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<(HeaderMap, Bytes), AppError> {
    let records = list_attendance(state.attendance.as_ref(), user_id, None).await?;
    let count = records.len();
    let report = build_report(&state.config.report.title, records);

    let renderer = state.reports.clone();
    let pdf = tokio::task::spawn_blocking(move || renderer.render(&report))
        .await
        .map_err(|e| AppError::Report(e.into()))?
        .map_err(|e| {
            error!(error = %e, %user_id, "report rendering failed");
            AppError::Report(e)
        })?;

    let filename = report_filename(OffsetDateTime::now_utc());
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(PDF_CONTENT_TYPE));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
            .map_err(|e| AppError::Report(e.into()))?,
    );

    info!(%user_id, records = count, bytes = pdf.len(), "report generated");
    Ok((headers, pdf))
}
