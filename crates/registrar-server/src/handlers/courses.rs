//! Handlers for `/courses` endpoints, including course enrolment.
//!
//! | Method | Path | Access |
//! |--------|------|--------|
//! | `GET`  | `/courses` | Authenticated |
//! | `POST` | `/courses` | Admin, Staff |
//! | `GET`  | `/courses/{id}` | Authenticated |
//! | `PUT`  | `/courses/{id}` | Admin, Staff. Partial update |
//! | `DELETE` | `/courses/{id}` | Admin, Staff. 409 while grades or attendance exist |
//! | `GET`  | `/courses/{id}/students` | Authenticated; ordered by last, first name |
//! | `POST` | `/courses/{id}/students` | Admin, Staff. Body: `{"student_id":..}` |
//! | `GET`  | `/courses/{id}/teachers` | Authenticated; ordered by last, first name |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use registrar_core::{
  roster::{Course, CourseChanges, NewCourse, Student, Teacher},
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

/// `GET /courses`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
) -> Result<Json<Vec<Course>>, ApiError>
where
  S: RecordStore + 'static,
{
  let courses = state.store.list_courses().await.map_err(ApiError::store)?;
  Ok(Json(courses))
}

/// `POST /courses`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _caller: Authorized<AdminOrStaff>,
  Json(body): Json<NewCourse>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + 'static,
{
  if body.code.trim().is_empty() || body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("code and name are required".into()));
  }
  let course = state
    .store
    .add_course(body.into_course(Utc::now()))
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(course)))
}

/// `GET /courses/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
  Path(id): Path<Uuid>,
) -> Result<Json<Course>, ApiError>
where
  S: RecordStore + 'static,
{
  let course = state
    .store
    .get_course(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("course", id))?;
  Ok(Json(course))
}

/// `PUT /courses/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  _caller: Authorized<AdminOrStaff>,
  Path(id): Path<Uuid>,
  Json(body): Json<CourseChanges>,
) -> Result<Json<Course>, ApiError>
where
  S: RecordStore + 'static,
{
  let mut course = state
    .store
    .get_course(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("course", id))?;
  course.apply(body);
  if course.code.trim().is_empty() || course.name.trim().is_empty() {
    return Err(ApiError::BadRequest("code and name must not be empty".into()));
  }
  let course = state.store.update_course(course).await.map_err(ApiError::store)?;
  Ok(Json(course))
}

/// `DELETE /courses/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  caller: Authorized<AdminOrStaff>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + 'static,
{
  if !state.store.delete_course(id).await.map_err(ApiError::store)? {
    return Err(ApiError::not_found("course", id));
  }
  tracing::info!(course = %id, by = %caller.identity_id(), "course deleted");
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /courses/{id}/students`
pub async fn cohort<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Student>>, ApiError>
where
  S: RecordStore + 'static,
{
  let students = state.store.students_in_course(id).await.map_err(ApiError::store)?;
  Ok(Json(students))
}

#[derive(Debug, Deserialize)]
pub struct EnrollBody {
  pub student_id: Uuid,
}

/// `POST /courses/{id}/students`
pub async fn enroll<S>(
  State(state): State<AppState<S>>,
  _caller: Authorized<AdminOrStaff>,
  Path(course_id): Path<Uuid>,
  Json(body): Json<EnrollBody>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + 'static,
{
  require_student_and_course(state.store.as_ref(), body.student_id, course_id).await?;
  state
    .store
    .enroll(course_id, body.student_id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::CREATED)
}

/// `GET /courses/{id}/teachers`
pub async fn teachers<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Teacher>>, ApiError>
where
  S: RecordStore + 'static,
{
  let teachers = state.store.teachers_for_course(id).await.map_err(ApiError::store)?;
  Ok(Json(teachers))
}
