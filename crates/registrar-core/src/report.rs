//! Report queries: the grade and attendance engines applied to reads from a
//! [`RecordStore`].
//!
//! These never write. A store error is returned unchanged; an empty read set
//! is a valid report (zero GPA, all-zero counts).

use uuid::Uuid;

use crate::{
  attendance::{CourseAttendance, StatusCounts},
  grade::{GradeDistribution, gpa},
  store::RecordStore,
};

/// Mean grade points across every grade record of the student.
pub async fn student_gpa<S: RecordStore>(store: &S, student_id: Uuid) -> Result<f64, S::Error> {
  let grades = store.grades_by_student(student_id).await?;
  Ok(gpa(grades.iter().map(|g| g.letter())))
}

/// Letter histogram for a course, with all thirteen buckets present.
pub async fn course_distribution<S: RecordStore>(
  store: &S,
  course_id: Uuid,
) -> Result<GradeDistribution, S::Error> {
  let grades = store.grades_by_course(course_id).await?;
  Ok(GradeDistribution::tally(grades.iter().map(|g| g.letter())))
}

pub async fn student_attendance<S: RecordStore>(
  store: &S,
  student_id: Uuid,
) -> Result<StatusCounts, S::Error> {
  let records = store.attendance_by_student(student_id).await?;
  Ok(StatusCounts::tally(records.iter().map(|r| r.status)))
}

/// Attendance for each member of the course cohort, restricted to the course.
pub async fn course_attendance<S: RecordStore>(
  store: &S,
  course_id: Uuid,
) -> Result<CourseAttendance, S::Error> {
  let cohort = store.students_in_course(course_id).await?;
  let records = store.attendance_by_course(course_id).await?;
  Ok(CourseAttendance::build(&cohort, &records))
}

#[cfg(test)]
mod tests {
  use super::*;

  use chrono::{NaiveDate, Utc};
  use thiserror::Error;

  use crate::{
    attendance::{AttendanceRecord, AttendanceStatus, NewAttendance},
    grade::{GradeRecord, Letter, NewGrade},
    identity::Identity,
    roster::{Course, Student, Teacher},
  };

  #[derive(Debug, Error)]
  #[error("disk on fire")]
  struct Boom;

  impl From<Boom> for crate::Error {
    fn from(e: Boom) -> Self { crate::Error::Storage(Box::new(e)) }
  }

  // A fixed read set; writes are never exercised by the report queries.
  #[derive(Default)]
  struct Fixture {
    grades:     Vec<GradeRecord>,
    attendance: Vec<AttendanceRecord>,
    cohort:     Vec<Student>,
    broken:     bool,
  }

  impl Fixture {
    fn read<T: Clone>(&self, items: impl Iterator<Item = T>) -> Result<Vec<T>, Boom> {
      if self.broken { Err(Boom) } else { Ok(items.collect()) }
    }
  }

  impl RecordStore for Fixture {
    type Error = Boom;
    async fn create_identity(&self, _: Identity) -> Result<Identity, Boom> { unimplemented!() }
    async fn get_identity(&self, _: Uuid) -> Result<Option<Identity>, Boom> { unimplemented!() }
    async fn find_identity_by_username(&self, _: String) -> Result<Option<Identity>, Boom> { unimplemented!() }
    async fn find_identity_by_email(&self, _: String) -> Result<Option<Identity>, Boom> { unimplemented!() }
    async fn list_identities(&self) -> Result<Vec<Identity>, Boom> { unimplemented!() }
    async fn update_identity(&self, _: Identity) -> Result<Identity, Boom> { unimplemented!() }
    async fn delete_identity(&self, _: Uuid) -> Result<bool, Boom> { unimplemented!() }
    async fn add_student(&self, _: Student) -> Result<Student, Boom> { unimplemented!() }
    async fn get_student(&self, _: Uuid) -> Result<Option<Student>, Boom> { unimplemented!() }
    async fn list_students(&self) -> Result<Vec<Student>, Boom> { unimplemented!() }
    async fn add_course(&self, _: Course) -> Result<Course, Boom> { unimplemented!() }
    async fn get_course(&self, _: Uuid) -> Result<Option<Course>, Boom> { unimplemented!() }
    async fn list_courses(&self) -> Result<Vec<Course>, Boom> { unimplemented!() }
    async fn update_student(&self, _: Student) -> Result<Student, Boom> { unimplemented!() }
    async fn delete_student(&self, _: Uuid) -> Result<bool, Boom> { unimplemented!() }
    async fn update_course(&self, _: Course) -> Result<Course, Boom> { unimplemented!() }
    async fn delete_course(&self, _: Uuid) -> Result<bool, Boom> { unimplemented!() }
    async fn enroll(&self, _: Uuid, _: Uuid) -> Result<(), Boom> { unimplemented!() }
    async fn drop_enrollment(&self, _: Uuid, _: Uuid) -> Result<bool, Boom> { unimplemented!() }
    async fn courses_for_student(&self, _: Uuid) -> Result<Vec<Course>, Boom> { unimplemented!() }
    async fn add_teacher(&self, _: Teacher) -> Result<Teacher, Boom> { unimplemented!() }
    async fn get_teacher(&self, _: Uuid) -> Result<Option<Teacher>, Boom> { unimplemented!() }
    async fn list_teachers(&self) -> Result<Vec<Teacher>, Boom> { unimplemented!() }
    async fn update_teacher(&self, _: Teacher) -> Result<Teacher, Boom> { unimplemented!() }
    async fn delete_teacher(&self, _: Uuid) -> Result<bool, Boom> { unimplemented!() }
    async fn assign_teacher(&self, _: Uuid, _: Uuid) -> Result<(), Boom> { unimplemented!() }
    async fn unassign_teacher(&self, _: Uuid, _: Uuid) -> Result<bool, Boom> { unimplemented!() }
    async fn teachers_for_course(&self, _: Uuid) -> Result<Vec<Teacher>, Boom> { unimplemented!() }
    async fn courses_for_teacher(&self, _: Uuid) -> Result<Vec<Course>, Boom> { unimplemented!() }
    async fn students_in_course(&self, _: Uuid) -> Result<Vec<Student>, Boom> {
      self.read(self.cohort.iter().cloned())
    }
    async fn record_grade(&self, _: GradeRecord) -> Result<GradeRecord, Boom> { unimplemented!() }
    async fn update_grade(&self, _: GradeRecord) -> Result<GradeRecord, Boom> { unimplemented!() }
    async fn delete_grade(&self, _: Uuid) -> Result<bool, Boom> { unimplemented!() }
    async fn get_grade(&self, _: Uuid) -> Result<Option<GradeRecord>, Boom> { unimplemented!() }
    async fn list_grades(&self) -> Result<Vec<GradeRecord>, Boom> { unimplemented!() }
    async fn grades_by_student(&self, id: Uuid) -> Result<Vec<GradeRecord>, Boom> {
      self.read(self.grades.iter().filter(|g| g.student_id == id).cloned())
    }
    async fn grades_by_course(&self, id: Uuid) -> Result<Vec<GradeRecord>, Boom> {
      self.read(self.grades.iter().filter(|g| g.course_id == id).cloned())
    }
    async fn grades_by_term(&self, _: String) -> Result<Vec<GradeRecord>, Boom> { unimplemented!() }
    async fn record_attendance(&self, _: AttendanceRecord) -> Result<AttendanceRecord, Boom> { unimplemented!() }
    async fn update_attendance(&self, _: AttendanceRecord) -> Result<AttendanceRecord, Boom> { unimplemented!() }
    async fn delete_attendance(&self, _: Uuid) -> Result<bool, Boom> { unimplemented!() }
    async fn get_attendance(&self, _: Uuid) -> Result<Option<AttendanceRecord>, Boom> { unimplemented!() }
    async fn list_attendance(&self) -> Result<Vec<AttendanceRecord>, Boom> { unimplemented!() }
    async fn attendance_by_student(&self, id: Uuid) -> Result<Vec<AttendanceRecord>, Boom> {
      self.read(self.attendance.iter().filter(|a| a.student_id == id).cloned())
    }
    async fn attendance_by_course(&self, id: Uuid) -> Result<Vec<AttendanceRecord>, Boom> {
      self.read(self.attendance.iter().filter(|a| a.course_id == id).cloned())
    }
    async fn attendance_on(&self, _: NaiveDate, _: Option<Uuid>) -> Result<Vec<AttendanceRecord>, Boom> { unimplemented!() }
  }

  fn grade(student_id: Uuid, course_id: Uuid, score: f64) -> GradeRecord {
    GradeRecord::new(
      NewGrade { student_id, course_id, score, term: "Spring 2025".into() },
      Uuid::new_v4(),
      Utc::now(),
    )
  }

  fn mark(student_id: Uuid, course_id: Uuid, status: AttendanceStatus) -> AttendanceRecord {
    AttendanceRecord::new(
      NewAttendance {
        student_id,
        course_id,
        date: NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
        status,
        notes: None,
      },
      Uuid::new_v4(),
      Utc::now(),
    )
  }

  #[tokio::test]
  async fn gpa_with_no_grades_is_zero() {
    let store = Fixture::default();
    assert_eq!(student_gpa(&store, Uuid::new_v4()).await.unwrap(), 0.0);
  }

  #[tokio::test]
  async fn gpa_averages_only_that_students_grades() {
    let (me, other, course) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let store = Fixture {
      grades: vec![grade(me, course, 95.0), grade(me, course, 85.0), grade(other, course, 10.0)],
      ..Default::default()
    };
    assert_eq!(student_gpa(&store, me).await.unwrap(), 3.5);
  }

  #[tokio::test]
  async fn distribution_covers_course_records() {
    let course = Uuid::new_v4();
    let store = Fixture {
      grades: vec![
        grade(Uuid::new_v4(), course, 99.0),
        grade(Uuid::new_v4(), course, 99.5),
        grade(Uuid::new_v4(), course, 41.0),
        grade(Uuid::new_v4(), Uuid::new_v4(), 75.0),
      ],
      ..Default::default()
    };
    let dist = course_distribution(&store, course).await.unwrap();
    assert_eq!(dist.get(Letter::APlus), 2);
    assert_eq!(dist.get(Letter::F), 1);
    assert_eq!(dist.get(Letter::C), 0);
    assert_eq!(dist.total(), 3);
  }

  #[tokio::test]
  async fn student_report_counts_statuses() {
    use AttendanceStatus::*;
    let (me, course) = (Uuid::new_v4(), Uuid::new_v4());
    let store = Fixture {
      attendance: vec![
        mark(me, course, Present),
        mark(me, course, Present),
        mark(me, course, Absent),
        mark(me, course, Present),
      ],
      ..Default::default()
    };
    let counts = student_attendance(&store, me).await.unwrap();
    assert_eq!(counts, StatusCounts { present: 3, absent: 1, late: 0, excused: 0, total: 4 });
  }

  #[tokio::test]
  async fn storage_failure_propagates() {
    let store = Fixture { broken: true, ..Default::default() };
    assert!(matches!(student_gpa(&store, Uuid::new_v4()).await, Err(Boom)));
    assert!(matches!(course_distribution(&store, Uuid::new_v4()).await, Err(Boom)));
    assert!(matches!(student_attendance(&store, Uuid::new_v4()).await, Err(Boom)));
    assert!(matches!(course_attendance(&store, Uuid::new_v4()).await, Err(Boom)));
  }
}
