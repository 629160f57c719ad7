//! Handlers for `/grades` endpoints.
//!
//! Writes require Admin or Teacher; reads require authentication. The letter
//! is derived from the score on every create and update, and the caller is
//! stamped as `created_by` / `updated_by`.

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use registrar_core::{
  grade::{GradeChanges, GradeDistribution, GradeRecord, NewGrade},
  report,
  store::RecordStore,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
  AppState,
  auth::{AdminOrTeacher, Authorized, RequestContext},
  error::ApiError,
  extract::{Json, Path},
  handlers::require_student_and_course,
};

fn check_score(score: f64) -> Result<(), ApiError> {
  if score.is_finite() {
    Ok(())
  } else {
    Err(ApiError::BadRequest("score must be a finite number".into()))
  }
}

// ─── Writes ───────────────────────────────────────────────────────────────────

/// `POST /grades`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: Authorized<AdminOrTeacher>,
  Json(body): Json<NewGrade>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + 'static,
{
  check_score(body.score)?;
  require_student_and_course(state.store.as_ref(), body.student_id, body.course_id).await?;

  let grade = GradeRecord::new(body, caller.identity_id(), Utc::now());
  let grade = state.store.record_grade(grade).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(grade)))
}

/// `PUT /grades/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  caller: Authorized<AdminOrTeacher>,
  Path(id): Path<Uuid>,
  Json(body): Json<GradeChanges>,
) -> Result<Json<GradeRecord>, ApiError>
where
  S: RecordStore + 'static,
{
  if let Some(score) = body.score {
    check_score(score)?;
  }

  let mut grade = state
    .store
    .get_grade(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("grade", id))?;

  grade.apply(body, caller.identity_id(), Utc::now());
  let grade = state.store.update_grade(grade).await.map_err(ApiError::store)?;
  Ok(Json(grade))
}

/// `DELETE /grades/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  _caller: Authorized<AdminOrTeacher>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + 'static,
{
  if state.store.delete_grade(id).await.map_err(ApiError::store)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::not_found("grade", id))
  }
}

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /grades/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
  Path(id): Path<Uuid>,
) -> Result<Json<GradeRecord>, ApiError>
where
  S: RecordStore + 'static,
{
  let grade = state
    .store
    .get_grade(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("grade", id))?;
  Ok(Json(grade))
}

/// `GET /grades`, oldest first.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
) -> Result<Json<Vec<GradeRecord>>, ApiError>
where
  S: RecordStore + 'static,
{
  let grades = state.store.list_grades().await.map_err(ApiError::store)?;
  Ok(Json(grades))
}

/// `GET /grades/student/{id}`
pub async fn by_student<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<GradeRecord>>, ApiError>
where
  S: RecordStore + 'static,
{
  let grades = state.store.grades_by_student(id).await.map_err(ApiError::store)?;
  Ok(Json(grades))
}

/// `GET /grades/course/{id}`
pub async fn by_course<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<GradeRecord>>, ApiError>
where
  S: RecordStore + 'static,
{
  let grades = state.store.grades_by_course(id).await.map_err(ApiError::store)?;
  Ok(Json(grades))
}

/// `GET /grades/term/{term}`
pub async fn by_term<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
  Path(term): Path<String>,
) -> Result<Json<Vec<GradeRecord>>, ApiError>
where
  S: RecordStore + 'static,
{
  let grades = state.store.grades_by_term(term).await.map_err(ApiError::store)?;
  Ok(Json(grades))
}

// ─── Reports ──────────────────────────────────────────────────────────────────

/// `GET /grades/student/{id}/gpa` → `{"gpa": <real>}`
pub async fn gpa<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
  Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError>
where
  S: RecordStore + 'static,
{
  let gpa = report::student_gpa(state.store.as_ref(), id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "gpa": gpa })))
}

/// `GET /grades/course/{id}/distribution`
pub async fn distribution<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
  Path(id): Path<Uuid>,
) -> Result<Json<GradeDistribution>, ApiError>
where
  S: RecordStore + 'static,
{
  let dist = report::course_distribution(state.store.as_ref(), id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(dist))
}
