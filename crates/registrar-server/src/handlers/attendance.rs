//! Handlers for `/attendance` endpoints.
//!
//! Writes require Admin or Teacher; reads require authentication.

use std::collections::BTreeMap;

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use registrar_core::{
  attendance::{AttendanceChanges, AttendanceRecord, NewAttendance, StatusCounts},
  report,
  store::RecordStore,
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::{AdminOrTeacher, Authorized, RequestContext},
  error::ApiError,
  extract::{Json, Path},
  handlers::{parse_date, require_student_and_course},
};

// ─── Writes ───────────────────────────────────────────────────────────────────

/// `POST /attendance`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: Authorized<AdminOrTeacher>,
  Json(body): Json<NewAttendance>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + 'static,
{
  require_student_and_course(state.store.as_ref(), body.student_id, body.course_id).await?;

  let record = AttendanceRecord::new(body, caller.identity_id(), Utc::now());
  let record = state.store.record_attendance(record).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(record)))
}

/// `PUT /attendance/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  caller: Authorized<AdminOrTeacher>,
  Path(id): Path<Uuid>,
  Json(body): Json<AttendanceChanges>,
) -> Result<Json<AttendanceRecord>, ApiError>
where
  S: RecordStore + 'static,
{
  let mut record = state
    .store
    .get_attendance(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("attendance record", id))?;

  record.apply(body, caller.identity_id(), Utc::now());
  let record = state.store.update_attendance(record).await.map_err(ApiError::store)?;
  Ok(Json(record))
}

/// `DELETE /attendance/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  _caller: Authorized<AdminOrTeacher>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + 'static,
{
  if state.store.delete_attendance(id).await.map_err(ApiError::store)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::not_found("attendance record", id))
  }
}

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /attendance/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
  Path(id): Path<Uuid>,
) -> Result<Json<AttendanceRecord>, ApiError>
where
  S: RecordStore + 'static,
{
  let record = state
    .store
    .get_attendance(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("attendance record", id))?;
  Ok(Json(record))
}

/// `GET /attendance`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError>
where
  S: RecordStore + 'static,
{
  let records = state.store.list_attendance().await.map_err(ApiError::store)?;
  Ok(Json(records))
}

/// `GET /attendance/student/{id}`
pub async fn by_student<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError>
where
  S: RecordStore + 'static,
{
  let records = state.store.attendance_by_student(id).await.map_err(ApiError::store)?;
  Ok(Json(records))
}

/// `GET /attendance/course/{id}`
pub async fn by_course<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError>
where
  S: RecordStore + 'static,
{
  let records = state.store.attendance_by_course(id).await.map_err(ApiError::store)?;
  Ok(Json(records))
}

/// `GET /attendance/date/{date}`
pub async fn by_date<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
  Path(date): Path<String>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError>
where
  S: RecordStore + 'static,
{
  let date = parse_date(&date)?;
  let records = state.store.attendance_on(date, None).await.map_err(ApiError::store)?;
  Ok(Json(records))
}

/// `GET /attendance/course/{id}/date/{date}`
pub async fn by_course_and_date<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
  Path((id, date)): Path<(Uuid, String)>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError>
where
  S: RecordStore + 'static,
{
  let date = parse_date(&date)?;
  let records = state
    .store
    .attendance_on(date, Some(id))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(records))
}

// ─── Reports ──────────────────────────────────────────────────────────────────

/// `GET /attendance/student/{id}/report`
pub async fn student_report<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
  Path(id): Path<Uuid>,
) -> Result<Json<StatusCounts>, ApiError>
where
  S: RecordStore + 'static,
{
  let counts = report::student_attendance(state.store.as_ref(), id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(counts))
}

/// `GET /attendance/course/{id}/report`
///
/// Keyed by student display name. Students sharing a name are disambiguated
/// by id.
pub async fn course_report<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
  Path(id): Path<Uuid>,
) -> Result<Json<BTreeMap<String, StatusCounts>>, ApiError>
where
  S: RecordStore + 'static,
{
  let cohort = report::course_attendance(state.store.as_ref(), id)
    .await
    .map_err(ApiError::store)?;

  let colliding = cohort.colliding_names();
  if !colliding.is_empty() {
    tracing::warn!(course = %id, names = ?colliding, "students share a display name");
  }
  Ok(Json(cohort.keyed_by_name()))
}
