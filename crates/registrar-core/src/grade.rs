//! The grade engine: letter derivation, grade points, GPA, and per-course
//! letter distributions.
//!
//! Everything here is a pure function of its inputs. Reads through the store
//! are composed in [`crate::report`].

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};
use uuid::Uuid;

use crate::Error;

// ─── Letter ──────────────────────────────────────────────────────────────────

/// One of the thirteen letter grades, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Letter {
  #[serde(rename = "A+")]
  APlus,
  #[serde(rename = "A")]
  A,
  #[serde(rename = "A-")]
  AMinus,
  #[serde(rename = "B+")]
  BPlus,
  #[serde(rename = "B")]
  B,
  #[serde(rename = "B-")]
  BMinus,
  #[serde(rename = "C+")]
  CPlus,
  #[serde(rename = "C")]
  C,
  #[serde(rename = "C-")]
  CMinus,
  #[serde(rename = "D+")]
  DPlus,
  #[serde(rename = "D")]
  D,
  #[serde(rename = "D-")]
  DMinus,
  #[serde(rename = "F")]
  F,
}

/// Inclusive lower bounds, checked top-down. Anything below the last is `F`.
const BREAKPOINTS: [(f64, Letter); 12] = [
  (97.0, Letter::APlus),
  (93.0, Letter::A),
  (90.0, Letter::AMinus),
  (87.0, Letter::BPlus),
  (83.0, Letter::B),
  (80.0, Letter::BMinus),
  (77.0, Letter::CPlus),
  (73.0, Letter::C),
  (70.0, Letter::CMinus),
  (67.0, Letter::DPlus),
  (63.0, Letter::D),
  (60.0, Letter::DMinus),
];

impl Letter {
  pub const ALL: [Letter; 13] = [
    Letter::APlus,
    Letter::A,
    Letter::AMinus,
    Letter::BPlus,
    Letter::B,
    Letter::BMinus,
    Letter::CPlus,
    Letter::C,
    Letter::CMinus,
    Letter::DPlus,
    Letter::D,
    Letter::DMinus,
    Letter::F,
  ];

  /// Derive the letter for a numeric score. Total: `NaN` falls through to `F`.
  pub fn from_score(score: f64) -> Letter {
    BREAKPOINTS
      .iter()
      .find(|(floor, _)| score >= *floor)
      .map(|(_, letter)| *letter)
      .unwrap_or(Letter::F)
  }

  /// Grade-point value on the 4.0 scale.
  pub fn points(self) -> f64 {
    match self {
      Letter::APlus | Letter::A => 4.0,
      Letter::AMinus => 3.7,
      Letter::BPlus => 3.3,
      Letter::B => 3.0,
      Letter::BMinus => 2.7,
      Letter::CPlus => 2.3,
      Letter::C => 2.0,
      Letter::CMinus => 1.7,
      Letter::DPlus => 1.3,
      Letter::D => 1.0,
      Letter::DMinus => 0.7,
      Letter::F => 0.0,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Letter::APlus => "A+",
      Letter::A => "A",
      Letter::AMinus => "A-",
      Letter::BPlus => "B+",
      Letter::B => "B",
      Letter::BMinus => "B-",
      Letter::CPlus => "C+",
      Letter::C => "C",
      Letter::CMinus => "C-",
      Letter::DPlus => "D+",
      Letter::D => "D",
      Letter::DMinus => "D-",
      Letter::F => "F",
    }
  }

  fn index(self) -> usize { self as usize }
}

impl fmt::Display for Letter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Letter {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Letter::ALL
      .into_iter()
      .find(|l| l.as_str() == s)
      .ok_or_else(|| Error::Validation(format!("unknown letter grade: {s:?}")))
  }
}

// ─── GPA ─────────────────────────────────────────────────────────────────────

/// Arithmetic mean of grade points. Zero letters yields `0.0`.
pub fn gpa<I>(letters: I) -> f64
where
  I: IntoIterator<Item = Letter>,
{
  let (sum, count) = letters
    .into_iter()
    .fold((0.0, 0u32), |(sum, n), l| (sum + l.points(), n + 1));
  if count == 0 { 0.0 } else { sum / f64::from(count) }
}

// ─── Distribution ────────────────────────────────────────────────────────────

/// Count of records per letter. Every letter is always present, so the JSON
/// form is an object with exactly thirteen keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradeDistribution {
  counts: [u32; 13],
}

impl GradeDistribution {
  pub fn tally<I>(letters: I) -> Self
  where
    I: IntoIterator<Item = Letter>,
  {
    let mut dist = Self::default();
    for letter in letters {
      dist.counts[letter.index()] += 1;
    }
    dist
  }

  pub fn get(&self, letter: Letter) -> u32 { self.counts[letter.index()] }

  pub fn total(&self) -> u32 { self.counts.iter().sum() }

  pub fn iter(&self) -> impl Iterator<Item = (Letter, u32)> + '_ {
    Letter::ALL.into_iter().map(|l| (l, self.get(l)))
  }
}

impl Serialize for GradeDistribution {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(Letter::ALL.len()))?;
    for (letter, count) in self.iter() {
      map.serialize_entry(letter.as_str(), &count)?;
    }
    map.end()
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A student's score in a course for a term.
///
/// `letter` is always `Letter::from_score(score)` at the time the record was
/// built or rescored; neither field is writable on its own.
#[derive(Debug, Clone, Serialize)]
pub struct GradeRecord {
  pub grade_id:   Uuid,
  pub student_id: Uuid,
  pub course_id:  Uuid,
  score:          f64,
  letter:         Letter,
  pub term:       String,
  pub created_by: Option<Uuid>,
  pub updated_by: Option<Uuid>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGrade {
  pub student_id: Uuid,
  pub course_id:  Uuid,
  pub score:      f64,
  #[serde(default)]
  pub term:       String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GradeChanges {
  pub score: Option<f64>,
  pub term:  Option<String>,
}

impl GradeRecord {
  pub fn new(input: NewGrade, author: Uuid, now: DateTime<Utc>) -> Self {
    GradeRecord {
      grade_id:   Uuid::new_v4(),
      student_id: input.student_id,
      course_id:  input.course_id,
      score:      input.score,
      letter:     Letter::from_score(input.score),
      term:       input.term,
      created_by: Some(author),
      updated_by: None,
      created_at: now,
      updated_at: now,
    }
  }

  /// Rebuild a record read back from storage.
  #[allow(clippy::too_many_arguments)]
  pub fn restore(
    grade_id: Uuid,
    student_id: Uuid,
    course_id: Uuid,
    score: f64,
    letter: Letter,
    term: String,
    created_by: Option<Uuid>,
    updated_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
  ) -> Self {
    GradeRecord {
      grade_id,
      student_id,
      course_id,
      score,
      letter,
      term,
      created_by,
      updated_by,
      created_at,
      updated_at,
    }
  }

  /// Apply `changes`, re-derive the letter, and stamp the update.
  pub fn apply(&mut self, changes: GradeChanges, author: Uuid, now: DateTime<Utc>) {
    if let Some(score) = changes.score {
      self.score = score;
    }
    if let Some(term) = changes.term {
      self.term = term;
    }
    self.letter = Letter::from_score(self.score);
    self.updated_by = Some(author);
    self.updated_at = now;
  }

  pub fn score(&self) -> f64 { self.score }

  pub fn letter(&self) -> Letter { self.letter }
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  #[test]
  fn breakpoints_are_inclusive_lower_bounds() {
    assert_eq!(Letter::from_score(100.0), Letter::APlus);
    assert_eq!(Letter::from_score(97.0), Letter::APlus);
    assert_eq!(Letter::from_score(96.999), Letter::A);
    assert_eq!(Letter::from_score(93.0), Letter::A);
    assert_eq!(Letter::from_score(90.0), Letter::AMinus);
    assert_eq!(Letter::from_score(89.99), Letter::BPlus);
    assert_eq!(Letter::from_score(83.0), Letter::B);
    assert_eq!(Letter::from_score(80.0), Letter::BMinus);
    assert_eq!(Letter::from_score(77.0), Letter::CPlus);
    assert_eq!(Letter::from_score(73.0), Letter::C);
    assert_eq!(Letter::from_score(70.0), Letter::CMinus);
    assert_eq!(Letter::from_score(67.0), Letter::DPlus);
    assert_eq!(Letter::from_score(63.0), Letter::D);
    assert_eq!(Letter::from_score(60.0), Letter::DMinus);
    assert_eq!(Letter::from_score(59.999), Letter::F);
    assert_eq!(Letter::from_score(-5.0), Letter::F);
  }

  #[test]
  fn nan_score_is_f() {
    assert_eq!(Letter::from_score(f64::NAN), Letter::F);
  }

  #[test]
  fn letter_parses_its_own_display() {
    for l in Letter::ALL {
      assert_eq!(l.to_string().parse::<Letter>().unwrap(), l);
    }
    assert!("E".parse::<Letter>().is_err());
  }

  #[test]
  fn gpa_of_nothing_is_zero() {
    assert_eq!(gpa([]), 0.0);
  }

  #[test]
  fn gpa_is_mean_of_points() {
    assert_eq!(gpa([Letter::A, Letter::A]), 4.0);
    assert_eq!(gpa([Letter::A, Letter::B]), 3.5);
    assert_eq!(gpa([Letter::APlus, Letter::F]), 2.0);
  }

  #[test]
  fn empty_distribution_has_every_key() {
    let json = serde_json::to_value(GradeDistribution::tally([])).unwrap();
    let obj = json.as_object().unwrap();
    assert_eq!(obj.len(), 13);
    assert!(obj.values().all(|v| v == 0));
    assert!(obj.contains_key("A+") && obj.contains_key("D-"));
  }

  #[test]
  fn distribution_counts_each_letter() {
    let dist = GradeDistribution::tally([Letter::B, Letter::B, Letter::F]);
    assert_eq!(dist.get(Letter::B), 2);
    assert_eq!(dist.get(Letter::F), 1);
    assert_eq!(dist.get(Letter::A), 0);
    assert_eq!(dist.total(), 3);
  }

  #[test]
  fn apply_rederives_letter() {
    let author = Uuid::new_v4();
    let now = Utc::now();
    let mut g = GradeRecord::new(
      NewGrade {
        student_id: Uuid::new_v4(),
        course_id:  Uuid::new_v4(),
        score:      91.0,
        term:       "Fall 2024".into(),
      },
      author,
      now,
    );
    assert_eq!(g.letter(), Letter::AMinus);

    let editor = Uuid::new_v4();
    g.apply(GradeChanges { score: Some(58.0), term: None }, editor, now);
    assert_eq!(g.letter(), Letter::F);
    assert_eq!(g.term, "Fall 2024");
    assert_eq!(g.created_by, Some(author));
    assert_eq!(g.updated_by, Some(editor));
  }

  fn any_letter() -> impl Strategy<Value = Letter> {
    (0..Letter::ALL.len()).prop_map(|i| Letter::ALL[i])
  }

  proptest! {
    #![proptest_config(ProptestConfig {
      cases: 512,
      ..ProptestConfig::default()
    })]

    /// A higher score never earns fewer grade points.
    #[test]
    fn letter_is_monotone(a in -10.0f64..110.0, b in -10.0f64..110.0) {
      let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
      prop_assert!(Letter::from_score(hi).points() >= Letter::from_score(lo).points());
    }

    #[test]
    fn distribution_sums_to_input_len(
      letters in prop::collection::vec(any_letter(), 0..64)
    ) {
      let dist = GradeDistribution::tally(letters.iter().copied());
      prop_assert_eq!(dist.total() as usize, letters.len());
      prop_assert_eq!(dist.iter().count(), 13);
    }
  }
}
