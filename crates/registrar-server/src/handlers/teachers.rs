//! Handlers for `/teachers` endpoints and teacher–course assignment.
//!
//! | Method   | Path | Access |
//! |----------|------|--------|
//! | `GET`    | `/teachers` | Authenticated |
//! | `POST`   | `/teachers` | Admin, Staff |
//! | `GET`    | `/teachers/{id}` | Authenticated |
//! | `PUT`    | `/teachers/{id}` | Admin, Staff |
//! | `DELETE` | `/teachers/{id}` | Admin, Staff |
//! | `GET`    | `/teachers/{id}/courses` | Authenticated; ordered by course code |
//! | `POST`   | `/teachers/{id}/courses` | Admin, Staff. Body: `{"course_id":..}` |
//! | `DELETE` | `/teachers/{id}/courses/{course_id}` | Admin, Staff |

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use registrar_core::{
  roster::{Course, NewTeacher, Teacher, TeacherChanges},
  store::RecordStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  auth::{AdminOrStaff, Authorized, RequestContext},
  error::ApiError,
  extract::{Json, Path},
};

fn check_names(teacher: &Teacher) -> Result<(), ApiError> {
  if teacher.first_name.trim().is_empty() || teacher.last_name.trim().is_empty() {
    return Err(ApiError::BadRequest("first_name and last_name are required".into()));
  }
  Ok(())
}

async fn require_teacher<S: RecordStore>(store: &S, id: Uuid) -> Result<Teacher, ApiError> {
  store
    .get_teacher(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("teacher", id))
}

// ─── Records ──────────────────────────────────────────────────────────────────

/// `GET /teachers`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
) -> Result<Json<Vec<Teacher>>, ApiError>
where
  S: RecordStore + 'static,
{
  let teachers = state.store.list_teachers().await.map_err(ApiError::store)?;
  Ok(Json(teachers))
}

/// `POST /teachers`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _caller: Authorized<AdminOrStaff>,
  Json(body): Json<NewTeacher>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + 'static,
{
  let teacher = body.into_teacher(Utc::now());
  check_names(&teacher)?;
  let teacher = state.store.add_teacher(teacher).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(teacher)))
}

/// `GET /teachers/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
  Path(id): Path<Uuid>,
) -> Result<Json<Teacher>, ApiError>
where
  S: RecordStore + 'static,
{
  Ok(Json(require_teacher(state.store.as_ref(), id).await?))
}

/// `PUT /teachers/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  _caller: Authorized<AdminOrStaff>,
  Path(id): Path<Uuid>,
  Json(body): Json<TeacherChanges>,
) -> Result<Json<Teacher>, ApiError>
where
  S: RecordStore + 'static,
{
  let mut teacher = require_teacher(state.store.as_ref(), id).await?;
  teacher.apply(body);
  check_names(&teacher)?;
  let teacher = state.store.update_teacher(teacher).await.map_err(ApiError::store)?;
  Ok(Json(teacher))
}

/// `DELETE /teachers/{id}`. Course assignments go with the teacher.
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  caller: Authorized<AdminOrStaff>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + 'static,
{
  if !state.store.delete_teacher(id).await.map_err(ApiError::store)? {
    return Err(ApiError::not_found("teacher", id));
  }
  tracing::info!(teacher = %id, by = %caller.identity_id(), "teacher deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Assignments ──────────────────────────────────────────────────────────────

/// `GET /teachers/{id}/courses`
pub async fn courses<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Course>>, ApiError>
where
  S: RecordStore + 'static,
{
  let courses = state.store.courses_for_teacher(id).await.map_err(ApiError::store)?;
  Ok(Json(courses))
}

#[derive(Debug, Deserialize)]
pub struct AssignBody {
  pub course_id: Uuid,
}

/// `POST /teachers/{id}/courses`
pub async fn assign<S>(
  State(state): State<AppState<S>>,
  _caller: Authorized<AdminOrStaff>,
  Path(teacher_id): Path<Uuid>,
  Json(body): Json<AssignBody>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + 'static,
{
  require_teacher(state.store.as_ref(), teacher_id).await?;
  state
    .store
    .get_course(body.course_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("course", body.course_id))?;
  state
    .store
    .assign_teacher(body.course_id, teacher_id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::CREATED)
}

/// `DELETE /teachers/{id}/courses/{course_id}`
pub async fn unassign<S>(
  State(state): State<AppState<S>>,
  _caller: Authorized<AdminOrStaff>,
  Path((teacher_id, course_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + 'static,
{
  let removed = state
    .store
    .unassign_teacher(course_id, teacher_id)
    .await
    .map_err(ApiError::store)?;
  if !removed {
    return Err(ApiError::NotFound(format!(
      "teacher {teacher_id} is not assigned to course {course_id}"
    )));
  }
  Ok(StatusCode::NO_CONTENT)
}
