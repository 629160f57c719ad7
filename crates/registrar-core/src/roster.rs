//! Students, courses, teachers, and the relations between them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
  pub student_id:  Uuid,
  pub first_name:  String,
  pub last_name:   String,
  pub email:       String,
  pub grade_level: Option<String>,
  pub enrolled_on: Option<NaiveDate>,
  pub created_at:  DateTime<Utc>,
}

impl Student {
  /// The name shown on reports: first and last name joined by a space.
  pub fn display_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
  pub first_name:  String,
  pub last_name:   String,
  pub email:       String,
  pub grade_level: Option<String>,
  pub enrolled_on: Option<NaiveDate>,
}

impl NewStudent {
  pub fn into_student(self, now: DateTime<Utc>) -> Student {
    Student {
      student_id:  Uuid::new_v4(),
      first_name:  self.first_name,
      last_name:   self.last_name,
      email:       self.email,
      grade_level: self.grade_level,
      enrolled_on: self.enrolled_on,
      created_at:  now,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
  pub course_id:   Uuid,
  /// Unique catalogue code, e.g. `MATH-101`.
  pub code:        String,
  pub name:        String,
  pub credits:     u32,
  pub department:  Option<String>,
  pub created_at:  DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCourse {
  pub code:       String,
  pub name:       String,
  #[serde(default)]
  pub credits:    u32,
  pub department: Option<String>,
}

impl NewCourse {
  pub fn into_course(self, now: DateTime<Utc>) -> Course {
    Course {
      course_id:  Uuid::new_v4(),
      code:       self.code,
      name:       self.name,
      credits:    self.credits,
      department: self.department,
      created_at: now,
    }
  }
}

/// Partial update of a [`Student`]; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentChanges {
  pub first_name:  Option<String>,
  pub last_name:   Option<String>,
  pub email:       Option<String>,
  pub grade_level: Option<String>,
  pub enrolled_on: Option<NaiveDate>,
}

impl Student {
  pub fn apply(&mut self, changes: StudentChanges) {
    if let Some(v) = changes.first_name {
      self.first_name = v;
    }
    if let Some(v) = changes.last_name {
      self.last_name = v;
    }
    if let Some(v) = changes.email {
      self.email = v;
    }
    if changes.grade_level.is_some() {
      self.grade_level = changes.grade_level;
    }
    if changes.enrolled_on.is_some() {
      self.enrolled_on = changes.enrolled_on;
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseChanges {
  pub code:       Option<String>,
  pub name:       Option<String>,
  pub credits:    Option<u32>,
  pub department: Option<String>,
}

impl Course {
  pub fn apply(&mut self, changes: CourseChanges) {
    if let Some(v) = changes.code {
      self.code = v;
    }
    if let Some(v) = changes.name {
      self.name = v;
    }
    if let Some(v) = changes.credits {
      self.credits = v;
    }
    if changes.department.is_some() {
      self.department = changes.department;
    }
  }
}

// ─── Teachers ────────────────────────────────────────────────────────────────

/// A member of teaching staff. Teachers are roster records assigned to
/// courses; they are distinct from the `Teacher` role an identity may hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
  pub teacher_id:     Uuid,
  pub first_name:     String,
  pub last_name:      String,
  pub email:          String,
  pub specialization: Option<String>,
  pub phone:          Option<String>,
  pub created_at:     DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTeacher {
  pub first_name:     String,
  pub last_name:      String,
  pub email:          String,
  pub specialization: Option<String>,
  pub phone:          Option<String>,
}

impl NewTeacher {
  pub fn into_teacher(self, now: DateTime<Utc>) -> Teacher {
    Teacher {
      teacher_id:     Uuid::new_v4(),
      first_name:     self.first_name,
      last_name:      self.last_name,
      email:          self.email,
      specialization: self.specialization,
      phone:          self.phone,
      created_at:     now,
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeacherChanges {
  pub first_name:     Option<String>,
  pub last_name:      Option<String>,
  pub email:          Option<String>,
  pub specialization: Option<String>,
  pub phone:          Option<String>,
}

impl Teacher {
  pub fn apply(&mut self, changes: TeacherChanges) {
    if let Some(v) = changes.first_name {
      self.first_name = v;
    }
    if let Some(v) = changes.last_name {
      self.last_name = v;
    }
    if let Some(v) = changes.email {
      self.email = v;
    }
    if changes.specialization.is_some() {
      self.specialization = changes.specialization;
    }
    if changes.phone.is_some() {
      self.phone = changes.phone;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ada() -> Student {
    NewStudent {
      first_name:  "Ada".into(),
      last_name:   "Lovelace".into(),
      email:       "ada@school.test".into(),
      grade_level: Some("10".into()),
      enrolled_on: None,
    }
    .into_student(Utc::now())
  }

  #[test]
  fn student_changes_leave_unset_fields_alone() {
    let mut s = ada();
    let id = s.student_id;
    s.apply(StudentChanges { last_name: Some("King".into()), ..Default::default() });

    assert_eq!(s.student_id, id);
    assert_eq!(s.display_name(), "Ada King");
    assert_eq!(s.email, "ada@school.test");
    assert_eq!(s.grade_level.as_deref(), Some("10"));
  }

  #[test]
  fn course_changes_replace_given_fields() {
    let mut c = NewCourse {
      code:       "MATH101".into(),
      name:       "Algebra".into(),
      credits:    3,
      department: None,
    }
    .into_course(Utc::now());

    c.apply(CourseChanges {
      credits: Some(4),
      department: Some("Mathematics".into()),
      ..Default::default()
    });
    assert_eq!(c.code, "MATH101");
    assert_eq!(c.credits, 4);
    assert_eq!(c.department.as_deref(), Some("Mathematics"));
  }
}
