//! Route handlers, one module per resource.

pub mod attendance;
pub mod courses;
pub mod grades;
pub mod health;
pub mod session;
pub mod students;
pub mod teachers;
pub mod users;

use chrono::NaiveDate;
use registrar_core::store::RecordStore;
use uuid::Uuid;

use crate::error::ApiError;

/// Parse a `YYYY-MM-DD` path segment.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .map_err(|_| ApiError::BadRequest("invalid date format, use YYYY-MM-DD".to_string()))
}

/// 404 unless both the student and the course exist.
pub(crate) async fn require_student_and_course<S: RecordStore>(
  store: &S,
  student_id: Uuid,
  course_id: Uuid,
) -> Result<(), ApiError> {
  store
    .get_student(student_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("student", student_id))?;
  store
    .get_course(course_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("course", course_id))?;
  Ok(())
}
