//! The `RecordStore` trait: the persistence collaborator.
//!
//! The trait is implemented by storage backends (e.g. `registrar-store-sqlite`).
//! The engines in [`crate::report`] and the HTTP layer depend on this
//! abstraction, not on any concrete backend. Every list read returns an
//! ordered, possibly empty sequence.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  attendance::AttendanceRecord,
  grade::GradeRecord,
  identity::Identity,
  roster::{Course, Student, Teacher},
};

/// Abstraction over a school-records backend.
///
/// Records are built and stamped by their constructors before they reach the
/// store; the store persists them as given. Store errors convert into
/// [`crate::Error`] so callers can tell `NotFound` and `Conflict` from
/// opaque storage failures.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  // ── Identities ────────────────────────────────────────────────────────

  /// Persist a new identity. Duplicate username or email is a conflict.
  fn create_identity(
    &self,
    identity: Identity,
  ) -> impl Future<Output = Result<Identity, Self::Error>> + Send + '_;

  fn get_identity(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + '_;

  fn find_identity_by_username(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + '_;

  fn find_identity_by_email(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + '_;

  fn list_identities(
    &self,
  ) -> impl Future<Output = Result<Vec<Identity>, Self::Error>> + Send + '_;

  /// Overwrite a stored identity. Returns `NotFound` if it does not exist.
  fn update_identity(
    &self,
    identity: Identity,
  ) -> impl Future<Output = Result<Identity, Self::Error>> + Send + '_;

  /// Returns `false` if nothing was deleted.
  fn delete_identity(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Roster ────────────────────────────────────────────────────────────

  fn add_student(
    &self,
    student: Student,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  fn get_student(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  fn list_students(
    &self,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  /// Overwrite a stored student. Returns `NotFound` if it does not exist.
  fn update_student(
    &self,
    student: Student,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  /// Removes the student and their enrolments. A student who still has grade
  /// or attendance records is a conflict. Returns `false` if nothing was
  /// deleted.
  fn delete_student(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn add_course(
    &self,
    course: Course,
  ) -> impl Future<Output = Result<Course, Self::Error>> + Send + '_;

  fn get_course(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Course>, Self::Error>> + Send + '_;

  fn list_courses(
    &self,
  ) -> impl Future<Output = Result<Vec<Course>, Self::Error>> + Send + '_;

  fn update_course(
    &self,
    course: Course,
  ) -> impl Future<Output = Result<Course, Self::Error>> + Send + '_;

  /// Removes the course with its enrolments and teacher assignments. Same
  /// conflict rule as [`RecordStore::delete_student`].
  fn delete_course(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Associate a student with a course. Enrolling twice is a conflict.
  fn enroll(
    &self,
    course_id: Uuid,
    student_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Returns `false` if the student was not enrolled.
  fn drop_enrollment(
    &self,
    course_id: Uuid,
    student_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// The cohort of a course, ordered by last then first name.
  fn students_in_course(
    &self,
    course_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  /// Courses a student is enrolled in, ordered by code.
  fn courses_for_student(
    &self,
    student_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Course>, Self::Error>> + Send + '_;

  // ── Teachers ──────────────────────────────────────────────────────────

  fn add_teacher(
    &self,
    teacher: Teacher,
  ) -> impl Future<Output = Result<Teacher, Self::Error>> + Send + '_;

  fn get_teacher(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Teacher>, Self::Error>> + Send + '_;

  fn list_teachers(
    &self,
  ) -> impl Future<Output = Result<Vec<Teacher>, Self::Error>> + Send + '_;

  fn update_teacher(
    &self,
    teacher: Teacher,
  ) -> impl Future<Output = Result<Teacher, Self::Error>> + Send + '_;

  /// Removes the teacher and their course assignments.
  fn delete_teacher(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Assign a teacher to a course. Assigning twice is a conflict.
  fn assign_teacher(
    &self,
    course_id: Uuid,
    teacher_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Returns `false` if the teacher was not assigned.
  fn unassign_teacher(
    &self,
    course_id: Uuid,
    teacher_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Teachers assigned to a course, ordered by last then first name.
  fn teachers_for_course(
    &self,
    course_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Teacher>, Self::Error>> + Send + '_;

  /// Courses a teacher is assigned to, ordered by code.
  fn courses_for_teacher(
    &self,
    teacher_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Course>, Self::Error>> + Send + '_;

  // ── Grades ────────────────────────────────────────────────────────────

  fn record_grade(
    &self,
    grade: GradeRecord,
  ) -> impl Future<Output = Result<GradeRecord, Self::Error>> + Send + '_;

  fn update_grade(
    &self,
    grade: GradeRecord,
  ) -> impl Future<Output = Result<GradeRecord, Self::Error>> + Send + '_;

  fn delete_grade(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn get_grade(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<GradeRecord>, Self::Error>> + Send + '_;

  /// Every grade record, oldest first.
  fn list_grades(
    &self,
  ) -> impl Future<Output = Result<Vec<GradeRecord>, Self::Error>> + Send + '_;

  fn grades_by_student(
    &self,
    student_id: Uuid,
  ) -> impl Future<Output = Result<Vec<GradeRecord>, Self::Error>> + Send + '_;

  fn grades_by_course(
    &self,
    course_id: Uuid,
  ) -> impl Future<Output = Result<Vec<GradeRecord>, Self::Error>> + Send + '_;

  fn grades_by_term(
    &self,
    term: String,
  ) -> impl Future<Output = Result<Vec<GradeRecord>, Self::Error>> + Send + '_;

  // ── Attendance ────────────────────────────────────────────────────────

  fn record_attendance(
    &self,
    record: AttendanceRecord,
  ) -> impl Future<Output = Result<AttendanceRecord, Self::Error>> + Send + '_;

  fn update_attendance(
    &self,
    record: AttendanceRecord,
  ) -> impl Future<Output = Result<AttendanceRecord, Self::Error>> + Send + '_;

  fn delete_attendance(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn get_attendance(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<AttendanceRecord>, Self::Error>> + Send + '_;

  /// Every attendance record, ordered by date.
  fn list_attendance(
    &self,
  ) -> impl Future<Output = Result<Vec<AttendanceRecord>, Self::Error>> + Send + '_;

  fn attendance_by_student(
    &self,
    student_id: Uuid,
  ) -> impl Future<Output = Result<Vec<AttendanceRecord>, Self::Error>> + Send + '_;

  fn attendance_by_course(
    &self,
    course_id: Uuid,
  ) -> impl Future<Output = Result<Vec<AttendanceRecord>, Self::Error>> + Send + '_;

  /// Records on `date`, optionally restricted to one course.
  fn attendance_on(
    &self,
    date: NaiveDate,
    course_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<AttendanceRecord>, Self::Error>> + Send + '_;
}
