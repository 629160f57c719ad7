//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, calendar dates are `YYYY-MM-DD`, and UUIDs
//! are hyphenated lowercase strings. Enumerations are stored by name.

use chrono::{DateTime, NaiveDate, Utc};
use registrar_core::{
  attendance::{AttendanceRecord, AttendanceStatus},
  grade::{GradeRecord, Letter},
  identity::{Identity, Role},
  roster::{Course, Student, Teacher},
};
use rusqlite::{Row, types::Value};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> Value { Value::Text(id.hyphenated().to_string()) }

pub fn encode_opt_uuid(id: Option<Uuid>) -> Value { id.map_or(Value::Null, encode_uuid) }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

pub fn encode_dt(dt: DateTime<Utc>) -> Value { Value::Text(dt.to_rfc3339()) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> Value { Value::Text(d.format("%Y-%m-%d").to_string()) }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

pub fn text(s: impl Into<String>) -> Value { Value::Text(s.into()) }

pub fn opt_text(s: Option<String>) -> Value { s.map_or(Value::Null, Value::Text) }

// ─── Closed sets ─────────────────────────────────────────────────────────────

fn decode_role(s: &str) -> Result<Role> {
  s.parse().map_err(|_| Error::Decode(format!("unknown role: {s:?}")))
}

fn decode_letter(s: &str) -> Result<Letter> {
  s.parse().map_err(|_| Error::Decode(format!("unknown letter grade: {s:?}")))
}

fn decode_status(s: &str) -> Result<AttendanceStatus> {
  AttendanceStatus::parse(s)
    .ok_or_else(|| Error::Decode(format!("unknown attendance status: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `identities` row.
pub struct RawIdentity {
  pub identity_id:   String,
  pub username:      String,
  pub email:         String,
  pub password_hash: String,
  pub display_name:  String,
  pub role:          String,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawIdentity {
  pub const COLUMNS: &'static str = "identity_id, username, email, password_hash, \
                                     display_name, role, created_at, updated_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawIdentity {
      identity_id:   row.get(0)?,
      username:      row.get(1)?,
      email:         row.get(2)?,
      password_hash: row.get(3)?,
      display_name:  row.get(4)?,
      role:          row.get(5)?,
      created_at:    row.get(6)?,
      updated_at:    row.get(7)?,
    })
  }

  pub fn into_identity(self) -> Result<Identity> {
    Ok(Identity {
      identity_id:   decode_uuid(&self.identity_id)?,
      username:      self.username,
      email:         self.email,
      password_hash: self.password_hash,
      display_name:  self.display_name,
      role:          decode_role(&self.role)?,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `students` row.
pub struct RawStudent {
  pub student_id:  String,
  pub first_name:  String,
  pub last_name:   String,
  pub email:       String,
  pub grade_level: Option<String>,
  pub enrolled_on: Option<String>,
  pub created_at:  String,
}

impl RawStudent {
  pub const COLUMNS: &'static str = "s.student_id, s.first_name, s.last_name, s.email, \
                                     s.grade_level, s.enrolled_on, s.created_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawStudent {
      student_id:  row.get(0)?,
      first_name:  row.get(1)?,
      last_name:   row.get(2)?,
      email:       row.get(3)?,
      grade_level: row.get(4)?,
      enrolled_on: row.get(5)?,
      created_at:  row.get(6)?,
    })
  }

  pub fn into_student(self) -> Result<Student> {
    Ok(Student {
      student_id:  decode_uuid(&self.student_id)?,
      first_name:  self.first_name,
      last_name:   self.last_name,
      email:       self.email,
      grade_level: self.grade_level,
      enrolled_on: self.enrolled_on.as_deref().map(decode_date).transpose()?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `teachers` row.
pub struct RawTeacher {
  pub teacher_id:     String,
  pub first_name:     String,
  pub last_name:      String,
  pub email:          String,
  pub specialization: Option<String>,
  pub phone:          Option<String>,
  pub created_at:     String,
}

impl RawTeacher {
  pub const COLUMNS: &'static str = "t.teacher_id, t.first_name, t.last_name, t.email, \
                                     t.specialization, t.phone, t.created_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawTeacher {
      teacher_id:     row.get(0)?,
      first_name:     row.get(1)?,
      last_name:      row.get(2)?,
      email:          row.get(3)?,
      specialization: row.get(4)?,
      phone:          row.get(5)?,
      created_at:     row.get(6)?,
    })
  }

  pub fn into_teacher(self) -> Result<Teacher> {
    Ok(Teacher {
      teacher_id:     decode_uuid(&self.teacher_id)?,
      first_name:     self.first_name,
      last_name:      self.last_name,
      email:          self.email,
      specialization: self.specialization,
      phone:          self.phone,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `courses` row.
pub struct RawCourse {
  pub course_id:  String,
  pub code:       String,
  pub name:       String,
  pub credits:    i64,
  pub department: Option<String>,
  pub created_at: String,
}

impl RawCourse {
  pub const COLUMNS: &'static str = "c.course_id, c.code, c.name, c.credits, c.department, \
                                     c.created_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawCourse {
      course_id:  row.get(0)?,
      code:       row.get(1)?,
      name:       row.get(2)?,
      credits:    row.get(3)?,
      department: row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_course(self) -> Result<Course> {
    Ok(Course {
      course_id:  decode_uuid(&self.course_id)?,
      code:       self.code,
      name:       self.name,
      credits:    u32::try_from(self.credits)
        .map_err(|_| Error::Decode(format!("credits out of range: {}", self.credits)))?,
      department: self.department,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `grades` row.
pub struct RawGrade {
  pub grade_id:   String,
  pub student_id: String,
  pub course_id:  String,
  pub score:      f64,
  pub letter:     String,
  pub term:       String,
  pub created_by: Option<String>,
  pub updated_by: Option<String>,
  pub created_at: String,
  pub updated_at: String,
}

impl RawGrade {
  pub const COLUMNS: &'static str = "grade_id, student_id, course_id, score, letter, term, \
                                     created_by, updated_by, created_at, updated_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawGrade {
      grade_id:   row.get(0)?,
      student_id: row.get(1)?,
      course_id:  row.get(2)?,
      score:      row.get(3)?,
      letter:     row.get(4)?,
      term:       row.get(5)?,
      created_by: row.get(6)?,
      updated_by: row.get(7)?,
      created_at: row.get(8)?,
      updated_at: row.get(9)?,
    })
  }

  pub fn into_grade(self) -> Result<GradeRecord> {
    Ok(GradeRecord::restore(
      decode_uuid(&self.grade_id)?,
      decode_uuid(&self.student_id)?,
      decode_uuid(&self.course_id)?,
      self.score,
      decode_letter(&self.letter)?,
      self.term,
      decode_opt_uuid(self.created_by)?,
      decode_opt_uuid(self.updated_by)?,
      decode_dt(&self.created_at)?,
      decode_dt(&self.updated_at)?,
    ))
  }
}

/// Raw values read directly from an `attendance` row.
pub struct RawAttendance {
  pub attendance_id: String,
  pub student_id:    String,
  pub course_id:     String,
  pub date:          String,
  pub status:        String,
  pub notes:         Option<String>,
  pub created_by:    Option<String>,
  pub updated_by:    Option<String>,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawAttendance {
  pub const COLUMNS: &'static str = "attendance_id, student_id, course_id, date, status, notes, \
                                     created_by, updated_by, created_at, updated_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawAttendance {
      attendance_id: row.get(0)?,
      student_id:    row.get(1)?,
      course_id:     row.get(2)?,
      date:          row.get(3)?,
      status:        row.get(4)?,
      notes:         row.get(5)?,
      created_by:    row.get(6)?,
      updated_by:    row.get(7)?,
      created_at:    row.get(8)?,
      updated_at:    row.get(9)?,
    })
  }

  pub fn into_record(self) -> Result<AttendanceRecord> {
    Ok(AttendanceRecord {
      attendance_id: decode_uuid(&self.attendance_id)?,
      student_id:    decode_uuid(&self.student_id)?,
      course_id:     decode_uuid(&self.course_id)?,
      date:          decode_date(&self.date)?,
      status:        decode_status(&self.status)?,
      notes:         self.notes,
      created_by:    decode_opt_uuid(self.created_by)?,
      updated_by:    decode_opt_uuid(self.updated_by)?,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}
