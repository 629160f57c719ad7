//! Handlers for `/students` endpoints. Writes require Admin or Staff.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/students` | Ordered by last, first name |
//! | `POST`   | `/students` | |
//! | `GET`    | `/students/{id}` | |
//! | `PUT`    | `/students/{id}` | Partial update |
//! | `DELETE` | `/students/{id}` | 409 while grades or attendance exist |
//! | `GET`    | `/students/{id}/courses` | Ordered by course code |
//! | `POST`   | `/students/{id}/courses` | Body: `{"course_id":..}` |
//! | `DELETE` | `/students/{id}/courses/{course_id}` | Drop one enrolment |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use registrar_core::{
  roster::{Course, NewStudent, Student, StudentChanges},
  store::RecordStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  auth::{AdminOrStaff, Authorized, RequestContext},
  error::ApiError,
  extract::{Json, Path},
  handlers::require_student_and_course,
};

/// `GET /students`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
) -> Result<Json<Vec<Student>>, ApiError>
where
  S: RecordStore + 'static,
{
  let students = state.store.list_students().await.map_err(ApiError::store)?;
  Ok(Json(students))
}

/// `POST /students`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _caller: Authorized<AdminOrStaff>,
  Json(body): Json<NewStudent>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + 'static,
{
  if body.first_name.trim().is_empty() || body.last_name.trim().is_empty() {
    return Err(ApiError::BadRequest("first_name and last_name are required".into()));
  }
  let student = state
    .store
    .add_student(body.into_student(Utc::now()))
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(student)))
}

/// `GET /students/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
  Path(id): Path<Uuid>,
) -> Result<Json<Student>, ApiError>
where
  S: RecordStore + 'static,
{
  let student = state
    .store
    .get_student(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("student", id))?;
  Ok(Json(student))
}

/// `PUT /students/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  _caller: Authorized<AdminOrStaff>,
  Path(id): Path<Uuid>,
  Json(body): Json<StudentChanges>,
) -> Result<Json<Student>, ApiError>
where
  S: RecordStore + 'static,
{
  let mut student = state
    .store
    .get_student(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("student", id))?;
  student.apply(body);
  if student.first_name.trim().is_empty() || student.last_name.trim().is_empty() {
    return Err(ApiError::BadRequest("first_name and last_name must not be empty".into()));
  }
  let student = state.store.update_student(student).await.map_err(ApiError::store)?;
  Ok(Json(student))
}

/// `DELETE /students/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  caller: Authorized<AdminOrStaff>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + 'static,
{
  if !state.store.delete_student(id).await.map_err(ApiError::store)? {
    return Err(ApiError::not_found("student", id));
  }
  tracing::info!(student = %id, by = %caller.identity_id(), "student deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Enrolments ───────────────────────────────────────────────────────────────

/// `GET /students/{id}/courses`
pub async fn courses<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Course>>, ApiError>
where
  S: RecordStore + 'static,
{
  let courses = state.store.courses_for_student(id).await.map_err(ApiError::store)?;
  Ok(Json(courses))
}

#[derive(Debug, Deserialize)]
pub struct EnrollBody {
  pub course_id: Uuid,
}

/// `POST /students/{id}/courses`
pub async fn enroll<S>(
  State(state): State<AppState<S>>,
  _caller: Authorized<AdminOrStaff>,
  Path(student_id): Path<Uuid>,
  Json(body): Json<EnrollBody>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + 'static,
{
  require_student_and_course(state.store.as_ref(), student_id, body.course_id).await?;
  state
    .store
    .enroll(body.course_id, student_id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::CREATED)
}

/// `DELETE /students/{id}/courses/{course_id}`
pub async fn unenroll<S>(
  State(state): State<AppState<S>>,
  _caller: Authorized<AdminOrStaff>,
  Path((student_id, course_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + 'static,
{
  let dropped = state
    .store
    .drop_enrollment(course_id, student_id)
    .await
    .map_err(ApiError::store)?;
  if !dropped {
    return Err(ApiError::NotFound(format!(
      "student {student_id} is not enrolled in course {course_id}"
    )));
  }
  Ok(StatusCode::NO_CONTENT)
}
