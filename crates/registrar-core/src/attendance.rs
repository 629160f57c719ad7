//! The attendance engine: per-event records and their status tallies.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roster::Student;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
  Present,
  Absent,
  Late,
  Excused,
}

impl AttendanceStatus {
  pub const ALL: [AttendanceStatus; 4] = [
    AttendanceStatus::Present,
    AttendanceStatus::Absent,
    AttendanceStatus::Late,
    AttendanceStatus::Excused,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      AttendanceStatus::Present => "present",
      AttendanceStatus::Absent => "absent",
      AttendanceStatus::Late => "late",
      AttendanceStatus::Excused => "excused",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|st| st.as_str() == s)
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// One student's attendance at one course meeting.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceRecord {
  pub attendance_id: Uuid,
  pub student_id:    Uuid,
  pub course_id:     Uuid,
  pub date:          NaiveDate,
  pub status:        AttendanceStatus,
  pub notes:         Option<String>,
  pub created_by:    Option<Uuid>,
  pub updated_by:    Option<Uuid>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAttendance {
  pub student_id: Uuid,
  pub course_id:  Uuid,
  pub date:       NaiveDate,
  pub status:     AttendanceStatus,
  pub notes:      Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceChanges {
  pub date:   Option<NaiveDate>,
  pub status: Option<AttendanceStatus>,
  pub notes:  Option<String>,
}

impl AttendanceRecord {
  pub fn new(input: NewAttendance, author: Uuid, now: DateTime<Utc>) -> Self {
    AttendanceRecord {
      attendance_id: Uuid::new_v4(),
      student_id:    input.student_id,
      course_id:     input.course_id,
      date:          input.date,
      status:        input.status,
      notes:         input.notes,
      created_by:    Some(author),
      updated_by:    None,
      created_at:    now,
      updated_at:    now,
    }
  }

  pub fn apply(&mut self, changes: AttendanceChanges, author: Uuid, now: DateTime<Utc>) {
    if let Some(date) = changes.date {
      self.date = date;
    }
    if let Some(status) = changes.status {
      self.status = status;
    }
    if changes.notes.is_some() {
      self.notes = changes.notes;
    }
    self.updated_by = Some(author);
    self.updated_at = now;
  }
}

// ─── Tallies ─────────────────────────────────────────────────────────────────

/// Per-status counts. `total` is always the sum of the other four.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
  pub present: u32,
  pub absent:  u32,
  pub late:    u32,
  pub excused: u32,
  pub total:   u32,
}

impl StatusCounts {
  pub fn tally<I>(statuses: I) -> Self
  where
    I: IntoIterator<Item = AttendanceStatus>,
  {
    let mut counts = Self::default();
    for status in statuses {
      counts.add(status);
    }
    counts
  }

  pub fn add(&mut self, status: AttendanceStatus) {
    match status {
      AttendanceStatus::Present => self.present += 1,
      AttendanceStatus::Absent => self.absent += 1,
      AttendanceStatus::Late => self.late += 1,
      AttendanceStatus::Excused => self.excused += 1,
    }
    self.total += 1;
  }
}

/// One cohort member's line in a course report.
#[derive(Debug, Clone, Serialize)]
pub struct StudentAttendance {
  pub student_id: Uuid,
  pub name:       String,
  #[serde(flatten)]
  pub counts:     StatusCounts,
}

/// Attendance for every student in a course's cohort, in cohort order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CourseAttendance {
  pub students: Vec<StudentAttendance>,
}

impl CourseAttendance {
  /// Zero-initialise a line for each student in `cohort`, then count the
  /// course's `records`. Records for students outside the cohort are not
  /// reported.
  pub fn build(cohort: &[Student], records: &[AttendanceRecord]) -> Self {
    let mut students: Vec<StudentAttendance> = cohort
      .iter()
      .map(|s| StudentAttendance {
        student_id: s.student_id,
        name:       s.display_name(),
        counts:     StatusCounts::default(),
      })
      .collect();

    let index: HashMap<Uuid, usize> = students
      .iter()
      .enumerate()
      .map(|(i, line)| (line.student_id, i))
      .collect();

    for record in records {
      if let Some(&i) = index.get(&record.student_id) {
        students[i].counts.add(record.status);
      }
    }

    CourseAttendance { students }
  }

  /// Names shared by more than one cohort member.
  pub fn colliding_names(&self) -> Vec<&str> {
    let mut seen: HashMap<&str, u32> = HashMap::new();
    for line in &self.students {
      *seen.entry(line.name.as_str()).or_default() += 1;
    }
    let mut names: Vec<&str> =
      seen.into_iter().filter(|(_, n)| *n > 1).map(|(name, _)| name).collect();
    names.sort_unstable();
    names
  }

  /// Key each line by display name. Names shared by several students get the
  /// student id appended, `"Ada Lovelace (<uuid>)"`, so no line is lost.
  pub fn keyed_by_name(&self) -> BTreeMap<String, StatusCounts> {
    let colliding = self.colliding_names();
    self
      .students
      .iter()
      .map(|line| {
        let key = if colliding.contains(&line.name.as_str()) {
          format!("{} ({})", line.name, line.student_id)
        } else {
          line.name.clone()
        };
        (key, line.counts)
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use AttendanceStatus::*;

  fn student(first: &str, last: &str) -> Student {
    Student {
      student_id:  Uuid::new_v4(),
      first_name:  first.into(),
      last_name:   last.into(),
      email:       format!("{first}.{last}@school.test").to_lowercase(),
      grade_level: None,
      enrolled_on: None,
      created_at:  Utc::now(),
    }
  }

  fn record(student_id: Uuid, course_id: Uuid, status: AttendanceStatus) -> AttendanceRecord {
    AttendanceRecord::new(
      NewAttendance {
        student_id,
        course_id,
        date: NaiveDate::from_ymd_opt(2024, 9, 2).unwrap(),
        status,
        notes: None,
      },
      Uuid::new_v4(),
      Utc::now(),
    )
  }

  #[test]
  fn empty_tally_is_all_zero() {
    assert_eq!(StatusCounts::tally([]), StatusCounts::default());
  }

  #[test]
  fn tally_counts_and_totals() {
    let counts = StatusCounts::tally([Present, Present, Absent, Present]);
    assert_eq!(counts, StatusCounts { present: 3, absent: 1, late: 0, excused: 0, total: 4 });
  }

  #[test]
  fn tally_json_has_all_five_keys() {
    let json = serde_json::to_value(StatusCounts::tally([Late])).unwrap();
    assert_eq!(
      json,
      serde_json::json!({ "present": 0, "absent": 0, "late": 1, "excused": 0, "total": 1 })
    );
  }

  #[test]
  fn course_report_zero_fills_cohort() {
    let course = Uuid::new_v4();
    let ada = student("Ada", "Lovelace");
    let alan = student("Alan", "Turing");
    let records = vec![
      record(ada.student_id, course, Present),
      record(ada.student_id, course, Excused),
      record(Uuid::new_v4(), course, Absent),
    ];

    let report = CourseAttendance::build(&[ada.clone(), alan.clone()], &records);
    assert_eq!(report.students.len(), 2);
    assert_eq!(report.students[0].counts.total, 2);
    assert_eq!(report.students[0].counts.excused, 1);
    assert_eq!(report.students[1].counts, StatusCounts::default());

    let keyed = report.keyed_by_name();
    assert_eq!(keyed["Ada Lovelace"].present, 1);
    assert_eq!(keyed["Alan Turing"].total, 0);
  }

  #[test]
  fn shared_names_are_disambiguated() {
    let a = student("Sam", "Lee");
    let b = student("Sam", "Lee");
    let c = student("Kim", "Park");
    let report = CourseAttendance::build(&[a.clone(), b.clone(), c], &[]);

    assert_eq!(report.colliding_names(), vec!["Sam Lee"]);
    let keyed = report.keyed_by_name();
    assert_eq!(keyed.len(), 3);
    assert!(keyed.contains_key(&format!("Sam Lee ({})", a.student_id)));
    assert!(keyed.contains_key(&format!("Sam Lee ({})", b.student_id)));
    assert!(keyed.contains_key("Kim Park"));
  }
}
