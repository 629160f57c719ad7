//! [`SqliteStore`], the SQLite implementation of [`RecordStore`].

use std::path::Path;

use chrono::NaiveDate;
use registrar_core::{
  attendance::AttendanceRecord,
  grade::GradeRecord,
  identity::Identity,
  roster::{Course, Student, Teacher},
  store::RecordStore,
};
use rusqlite::{Row, params_from_iter, types::Value};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RawAttendance, RawCourse, RawGrade, RawIdentity, RawStudent, RawTeacher, encode_date, encode_dt,
    encode_opt_uuid, encode_uuid, opt_text, text,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A records store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests and throwaway runs.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a query and map every row with `map`.
  async fn select<R, F>(&self, sql: String, params: Vec<Value>, map: F) -> Result<Vec<R>>
  where
    R: Send + 'static,
    F: FnMut(&Row<'_>) -> rusqlite::Result<R> + Send + 'static,
  {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(params), map)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  /// Run a write, returning the number of affected rows. Constraint
  /// violations come back as [`Error::Duplicate`] or
  /// [`Error::MissingReference`].
  async fn execute(&self, sql: &'static str, params: Vec<Value>) -> Result<usize> {
    self
      .conn
      .call(move |conn| Ok(conn.execute(sql, params_from_iter(params))?))
      .await
      .map_err(Error::from_write)
  }

  async fn identities(&self, clause: &str, params: Vec<Value>) -> Result<Vec<Identity>> {
    let sql = format!("SELECT {} FROM identities {clause}", RawIdentity::COLUMNS);
    self
      .select(sql, params, RawIdentity::from_row)
      .await?
      .into_iter()
      .map(RawIdentity::into_identity)
      .collect()
  }

  async fn students(&self, clause: &str, params: Vec<Value>) -> Result<Vec<Student>> {
    let sql = format!("SELECT {} FROM students s {clause}", RawStudent::COLUMNS);
    self
      .select(sql, params, RawStudent::from_row)
      .await?
      .into_iter()
      .map(RawStudent::into_student)
      .collect()
  }

  async fn courses(&self, clause: &str, params: Vec<Value>) -> Result<Vec<Course>> {
    let sql = format!("SELECT {} FROM courses c {clause}", RawCourse::COLUMNS);
    self
      .select(sql, params, RawCourse::from_row)
      .await?
      .into_iter()
      .map(RawCourse::into_course)
      .collect()
  }

  async fn teachers(&self, clause: &str, params: Vec<Value>) -> Result<Vec<Teacher>> {
    let sql = format!("SELECT {} FROM teachers t {clause}", RawTeacher::COLUMNS);
    self
      .select(sql, params, RawTeacher::from_row)
      .await?
      .into_iter()
      .map(RawTeacher::into_teacher)
      .collect()
  }

  /// Delete one row by id. A foreign-key refusal means grade or attendance
  /// rows still point at it.
  async fn delete_referenced(
    &self,
    sql: &'static str,
    entity: &'static str,
    id: Uuid,
  ) -> Result<bool> {
    match self.execute(sql, vec![encode_uuid(id)]).await {
      Ok(changed) => Ok(changed > 0),
      Err(Error::MissingReference(_)) => Err(Error::StillReferenced { entity, id }),
      Err(e) => Err(e),
    }
  }

  async fn grades(&self, clause: &str, params: Vec<Value>) -> Result<Vec<GradeRecord>> {
    let sql = format!(
      "SELECT {} FROM grades {clause} ORDER BY created_at, grade_id",
      RawGrade::COLUMNS
    );
    self
      .select(sql, params, RawGrade::from_row)
      .await?
      .into_iter()
      .map(RawGrade::into_grade)
      .collect()
  }

  async fn attendance(&self, clause: &str, params: Vec<Value>) -> Result<Vec<AttendanceRecord>> {
    let sql = format!(
      "SELECT {} FROM attendance {clause} ORDER BY date, created_at, attendance_id",
      RawAttendance::COLUMNS
    );
    self
      .select(sql, params, RawAttendance::from_row)
      .await?
      .into_iter()
      .map(RawAttendance::into_record)
      .collect()
  }
}

fn identity_params(i: &Identity) -> Vec<Value> {
  vec![
    encode_uuid(i.identity_id),
    text(i.username.as_str()),
    text(i.email.as_str()),
    text(i.password_hash.as_str()),
    text(i.display_name.as_str()),
    text(i.role.as_str()),
    encode_dt(i.created_at),
    encode_dt(i.updated_at),
  ]
}

fn grade_params(g: &GradeRecord) -> Vec<Value> {
  vec![
    encode_uuid(g.grade_id),
    encode_uuid(g.student_id),
    encode_uuid(g.course_id),
    Value::Real(g.score()),
    text(g.letter().as_str()),
    text(g.term.as_str()),
    encode_opt_uuid(g.created_by),
    encode_opt_uuid(g.updated_by),
    encode_dt(g.created_at),
    encode_dt(g.updated_at),
  ]
}

fn attendance_params(a: &AttendanceRecord) -> Vec<Value> {
  vec![
    encode_uuid(a.attendance_id),
    encode_uuid(a.student_id),
    encode_uuid(a.course_id),
    encode_date(a.date),
    text(a.status.as_str()),
    opt_text(a.notes.clone()),
    encode_opt_uuid(a.created_by),
    encode_opt_uuid(a.updated_by),
    encode_dt(a.created_at),
    encode_dt(a.updated_at),
  ]
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  // ── Identities ────────────────────────────────────────────────────────────

  async fn create_identity(&self, identity: Identity) -> Result<Identity> {
    self
      .execute(
        "INSERT INTO identities (
           identity_id, username, email, password_hash,
           display_name, role, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        identity_params(&identity),
      )
      .await?;
    Ok(identity)
  }

  async fn get_identity(&self, id: Uuid) -> Result<Option<Identity>> {
    let mut found = self
      .identities("WHERE identity_id = ?1", vec![encode_uuid(id)])
      .await?;
    Ok(found.pop())
  }

  async fn find_identity_by_username(&self, username: String) -> Result<Option<Identity>> {
    let mut found = self.identities("WHERE username = ?1", vec![text(username)]).await?;
    Ok(found.pop())
  }

  async fn find_identity_by_email(&self, email: String) -> Result<Option<Identity>> {
    let mut found = self.identities("WHERE email = ?1", vec![text(email)]).await?;
    Ok(found.pop())
  }

  async fn list_identities(&self) -> Result<Vec<Identity>> {
    self.identities("ORDER BY username", Vec::new()).await
  }

  async fn update_identity(&self, identity: Identity) -> Result<Identity> {
    let changed = self
      .execute(
        "UPDATE identities SET
           username = ?2, email = ?3, password_hash = ?4,
           display_name = ?5, role = ?6, created_at = ?7, updated_at = ?8
         WHERE identity_id = ?1",
        identity_params(&identity),
      )
      .await?;
    if changed == 0 {
      return Err(Error::NotFound { entity: "user", id: identity.identity_id });
    }
    Ok(identity)
  }

  async fn delete_identity(&self, id: Uuid) -> Result<bool> {
    let changed = self
      .execute("DELETE FROM identities WHERE identity_id = ?1", vec![encode_uuid(id)])
      .await?;
    Ok(changed > 0)
  }

  // ── Roster ────────────────────────────────────────────────────────────────

  async fn add_student(&self, student: Student) -> Result<Student> {
    self
      .execute(
        "INSERT INTO students (
           student_id, first_name, last_name, email,
           grade_level, enrolled_on, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        vec![
          encode_uuid(student.student_id),
          text(student.first_name.as_str()),
          text(student.last_name.as_str()),
          text(student.email.as_str()),
          opt_text(student.grade_level.clone()),
          student.enrolled_on.map_or(Value::Null, encode_date),
          encode_dt(student.created_at),
        ],
      )
      .await?;
    Ok(student)
  }

  async fn get_student(&self, id: Uuid) -> Result<Option<Student>> {
    let mut found = self
      .students("WHERE s.student_id = ?1", vec![encode_uuid(id)])
      .await?;
    Ok(found.pop())
  }

  async fn list_students(&self) -> Result<Vec<Student>> {
    self
      .students("ORDER BY s.last_name, s.first_name, s.student_id", Vec::new())
      .await
  }

  async fn update_student(&self, student: Student) -> Result<Student> {
    let changed = self
      .execute(
        "UPDATE students SET
           first_name = ?2, last_name = ?3, email = ?4, grade_level = ?5, enrolled_on = ?6
         WHERE student_id = ?1",
        vec![
          encode_uuid(student.student_id),
          text(student.first_name.as_str()),
          text(student.last_name.as_str()),
          text(student.email.as_str()),
          opt_text(student.grade_level.clone()),
          student.enrolled_on.map_or(Value::Null, encode_date),
        ],
      )
      .await?;
    if changed == 0 {
      return Err(Error::NotFound { entity: "student", id: student.student_id });
    }
    Ok(student)
  }

  async fn delete_student(&self, id: Uuid) -> Result<bool> {
    self
      .delete_referenced("DELETE FROM students WHERE student_id = ?1", "student", id)
      .await
  }

  async fn add_course(&self, course: Course) -> Result<Course> {
    self
      .execute(
        "INSERT INTO courses (course_id, code, name, credits, department, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        vec![
          encode_uuid(course.course_id),
          text(course.code.as_str()),
          text(course.name.as_str()),
          Value::Integer(i64::from(course.credits)),
          opt_text(course.department.clone()),
          encode_dt(course.created_at),
        ],
      )
      .await?;
    Ok(course)
  }

  async fn get_course(&self, id: Uuid) -> Result<Option<Course>> {
    let mut found = self.courses("WHERE c.course_id = ?1", vec![encode_uuid(id)]).await?;
    Ok(found.pop())
  }

  async fn list_courses(&self) -> Result<Vec<Course>> {
    self.courses("ORDER BY c.code", Vec::new()).await
  }

  async fn update_course(&self, course: Course) -> Result<Course> {
    let changed = self
      .execute(
        "UPDATE courses SET code = ?2, name = ?3, credits = ?4, department = ?5
         WHERE course_id = ?1",
        vec![
          encode_uuid(course.course_id),
          text(course.code.as_str()),
          text(course.name.as_str()),
          Value::Integer(i64::from(course.credits)),
          opt_text(course.department.clone()),
        ],
      )
      .await?;
    if changed == 0 {
      return Err(Error::NotFound { entity: "course", id: course.course_id });
    }
    Ok(course)
  }

  async fn delete_course(&self, id: Uuid) -> Result<bool> {
    self
      .delete_referenced("DELETE FROM courses WHERE course_id = ?1", "course", id)
      .await
  }

  async fn enroll(&self, course_id: Uuid, student_id: Uuid) -> Result<()> {
    self
      .execute(
        "INSERT INTO enrollments (course_id, student_id) VALUES (?1, ?2)",
        vec![encode_uuid(course_id), encode_uuid(student_id)],
      )
      .await?;
    Ok(())
  }

  async fn students_in_course(&self, course_id: Uuid) -> Result<Vec<Student>> {
    self
      .students(
        "JOIN enrollments e ON e.student_id = s.student_id
         WHERE e.course_id = ?1
         ORDER BY s.last_name, s.first_name, s.student_id",
        vec![encode_uuid(course_id)],
      )
      .await
  }

  async fn drop_enrollment(&self, course_id: Uuid, student_id: Uuid) -> Result<bool> {
    let changed = self
      .execute(
        "DELETE FROM enrollments WHERE course_id = ?1 AND student_id = ?2",
        vec![encode_uuid(course_id), encode_uuid(student_id)],
      )
      .await?;
    Ok(changed > 0)
  }

  async fn courses_for_student(&self, student_id: Uuid) -> Result<Vec<Course>> {
    self
      .courses(
        "JOIN enrollments e ON e.course_id = c.course_id
         WHERE e.student_id = ?1
         ORDER BY c.code",
        vec![encode_uuid(student_id)],
      )
      .await
  }

  // ── Teachers ──────────────────────────────────────────────────────────────

  async fn add_teacher(&self, teacher: Teacher) -> Result<Teacher> {
    self
      .execute(
        "INSERT INTO teachers (
           teacher_id, first_name, last_name, email,
           specialization, phone, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        vec![
          encode_uuid(teacher.teacher_id),
          text(teacher.first_name.as_str()),
          text(teacher.last_name.as_str()),
          text(teacher.email.as_str()),
          opt_text(teacher.specialization.clone()),
          opt_text(teacher.phone.clone()),
          encode_dt(teacher.created_at),
        ],
      )
      .await?;
    Ok(teacher)
  }

  async fn get_teacher(&self, id: Uuid) -> Result<Option<Teacher>> {
    let mut found = self
      .teachers("WHERE t.teacher_id = ?1", vec![encode_uuid(id)])
      .await?;
    Ok(found.pop())
  }

  async fn list_teachers(&self) -> Result<Vec<Teacher>> {
    self
      .teachers("ORDER BY t.last_name, t.first_name, t.teacher_id", Vec::new())
      .await
  }

  async fn update_teacher(&self, teacher: Teacher) -> Result<Teacher> {
    let changed = self
      .execute(
        "UPDATE teachers SET
           first_name = ?2, last_name = ?3, email = ?4, specialization = ?5, phone = ?6
         WHERE teacher_id = ?1",
        vec![
          encode_uuid(teacher.teacher_id),
          text(teacher.first_name.as_str()),
          text(teacher.last_name.as_str()),
          text(teacher.email.as_str()),
          opt_text(teacher.specialization.clone()),
          opt_text(teacher.phone.clone()),
        ],
      )
      .await?;
    if changed == 0 {
      return Err(Error::NotFound { entity: "teacher", id: teacher.teacher_id });
    }
    Ok(teacher)
  }

  async fn delete_teacher(&self, id: Uuid) -> Result<bool> {
    let changed = self
      .execute("DELETE FROM teachers WHERE teacher_id = ?1", vec![encode_uuid(id)])
      .await?;
    Ok(changed > 0)
  }

  async fn assign_teacher(&self, course_id: Uuid, teacher_id: Uuid) -> Result<()> {
    self
      .execute(
        "INSERT INTO teacher_courses (course_id, teacher_id) VALUES (?1, ?2)",
        vec![encode_uuid(course_id), encode_uuid(teacher_id)],
      )
      .await?;
    Ok(())
  }

  async fn unassign_teacher(&self, course_id: Uuid, teacher_id: Uuid) -> Result<bool> {
    let changed = self
      .execute(
        "DELETE FROM teacher_courses WHERE course_id = ?1 AND teacher_id = ?2",
        vec![encode_uuid(course_id), encode_uuid(teacher_id)],
      )
      .await?;
    Ok(changed > 0)
  }

  async fn teachers_for_course(&self, course_id: Uuid) -> Result<Vec<Teacher>> {
    self
      .teachers(
        "JOIN teacher_courses tc ON tc.teacher_id = t.teacher_id
         WHERE tc.course_id = ?1
         ORDER BY t.last_name, t.first_name, t.teacher_id",
        vec![encode_uuid(course_id)],
      )
      .await
  }

  async fn courses_for_teacher(&self, teacher_id: Uuid) -> Result<Vec<Course>> {
    self
      .courses(
        "JOIN teacher_courses tc ON tc.course_id = c.course_id
         WHERE tc.teacher_id = ?1
         ORDER BY c.code",
        vec![encode_uuid(teacher_id)],
      )
      .await
  }

  // ── Grades ────────────────────────────────────────────────────────────────

  async fn record_grade(&self, grade: GradeRecord) -> Result<GradeRecord> {
    self
      .execute(
        "INSERT INTO grades (
           grade_id, student_id, course_id, score, letter, term,
           created_by, updated_by, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        grade_params(&grade),
      )
      .await?;
    Ok(grade)
  }

  async fn update_grade(&self, grade: GradeRecord) -> Result<GradeRecord> {
    let changed = self
      .execute(
        "UPDATE grades SET
           student_id = ?2, course_id = ?3, score = ?4, letter = ?5, term = ?6,
           created_by = ?7, updated_by = ?8, created_at = ?9, updated_at = ?10
         WHERE grade_id = ?1",
        grade_params(&grade),
      )
      .await?;
    if changed == 0 {
      return Err(Error::NotFound { entity: "grade", id: grade.grade_id });
    }
    Ok(grade)
  }

  async fn delete_grade(&self, id: Uuid) -> Result<bool> {
    let changed = self
      .execute("DELETE FROM grades WHERE grade_id = ?1", vec![encode_uuid(id)])
      .await?;
    Ok(changed > 0)
  }

  async fn get_grade(&self, id: Uuid) -> Result<Option<GradeRecord>> {
    let mut found = self.grades("WHERE grade_id = ?1", vec![encode_uuid(id)]).await?;
    Ok(found.pop())
  }

  async fn list_grades(&self) -> Result<Vec<GradeRecord>> {
    self.grades("", Vec::new()).await
  }

  async fn grades_by_student(&self, student_id: Uuid) -> Result<Vec<GradeRecord>> {
    self.grades("WHERE student_id = ?1", vec![encode_uuid(student_id)]).await
  }

  async fn grades_by_course(&self, course_id: Uuid) -> Result<Vec<GradeRecord>> {
    self.grades("WHERE course_id = ?1", vec![encode_uuid(course_id)]).await
  }

  async fn grades_by_term(&self, term: String) -> Result<Vec<GradeRecord>> {
    self.grades("WHERE term = ?1", vec![text(term)]).await
  }

  // ── Attendance ────────────────────────────────────────────────────────────

  async fn record_attendance(&self, record: AttendanceRecord) -> Result<AttendanceRecord> {
    self
      .execute(
        "INSERT INTO attendance (
           attendance_id, student_id, course_id, date, status, notes,
           created_by, updated_by, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        attendance_params(&record),
      )
      .await?;
    Ok(record)
  }

  async fn update_attendance(&self, record: AttendanceRecord) -> Result<AttendanceRecord> {
    let changed = self
      .execute(
        "UPDATE attendance SET
           student_id = ?2, course_id = ?3, date = ?4, status = ?5, notes = ?6,
           created_by = ?7, updated_by = ?8, created_at = ?9, updated_at = ?10
         WHERE attendance_id = ?1",
        attendance_params(&record),
      )
      .await?;
    if changed == 0 {
      return Err(Error::NotFound { entity: "attendance record", id: record.attendance_id });
    }
    Ok(record)
  }

  async fn delete_attendance(&self, id: Uuid) -> Result<bool> {
    let changed = self
      .execute("DELETE FROM attendance WHERE attendance_id = ?1", vec![encode_uuid(id)])
      .await?;
    Ok(changed > 0)
  }

  async fn get_attendance(&self, id: Uuid) -> Result<Option<AttendanceRecord>> {
    let mut found = self
      .attendance("WHERE attendance_id = ?1", vec![encode_uuid(id)])
      .await?;
    Ok(found.pop())
  }

  async fn list_attendance(&self) -> Result<Vec<AttendanceRecord>> {
    self.attendance("", Vec::new()).await
  }

  async fn attendance_by_student(&self, student_id: Uuid) -> Result<Vec<AttendanceRecord>> {
    self.attendance("WHERE student_id = ?1", vec![encode_uuid(student_id)]).await
  }

  async fn attendance_by_course(&self, course_id: Uuid) -> Result<Vec<AttendanceRecord>> {
    self.attendance("WHERE course_id = ?1", vec![encode_uuid(course_id)]).await
  }

  async fn attendance_on(
    &self,
    date: NaiveDate,
    course_id: Option<Uuid>,
  ) -> Result<Vec<AttendanceRecord>> {
    match course_id {
      Some(course_id) => {
        self
          .attendance(
            "WHERE date = ?1 AND course_id = ?2",
            vec![encode_date(date), encode_uuid(course_id)],
          )
          .await
      }
      None => self.attendance("WHERE date = ?1", vec![encode_date(date)]).await,
    }
  }
}
