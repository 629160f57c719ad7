//! SQL schema for the Registrar SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS identities (
    identity_id   TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,      -- argon2 PHC string
    display_name  TEXT NOT NULL,
    role          TEXT NOT NULL,      -- 'Admin' | 'Teacher' | 'Staff'
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS students (
    student_id  TEXT PRIMARY KEY,
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE,
    grade_level TEXT,
    enrolled_on TEXT,                 -- YYYY-MM-DD
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS courses (
    course_id  TEXT PRIMARY KEY,
    code       TEXT NOT NULL UNIQUE,
    name       TEXT NOT NULL,
    credits    INTEGER NOT NULL DEFAULT 0,
    department TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS teachers (
    teacher_id     TEXT PRIMARY KEY,
    first_name     TEXT NOT NULL,
    last_name      TEXT NOT NULL,
    email          TEXT NOT NULL UNIQUE,
    specialization TEXT,
    phone          TEXT,
    created_at     TEXT NOT NULL
);

-- Relations go with either endpoint; grades and attendance do not.
CREATE TABLE IF NOT EXISTS enrollments (
    course_id  TEXT NOT NULL REFERENCES courses(course_id) ON DELETE CASCADE,
    student_id TEXT NOT NULL REFERENCES students(student_id) ON DELETE CASCADE,
    PRIMARY KEY (course_id, student_id)
);

CREATE TABLE IF NOT EXISTS teacher_courses (
    course_id  TEXT NOT NULL REFERENCES courses(course_id) ON DELETE CASCADE,
    teacher_id TEXT NOT NULL REFERENCES teachers(teacher_id) ON DELETE CASCADE,
    PRIMARY KEY (course_id, teacher_id)
);

-- letter is derived from score before the row is written.
CREATE TABLE IF NOT EXISTS grades (
    grade_id   TEXT PRIMARY KEY,
    student_id TEXT NOT NULL REFERENCES students(student_id),
    course_id  TEXT NOT NULL REFERENCES courses(course_id),
    score      REAL NOT NULL,
    letter     TEXT NOT NULL,
    term       TEXT NOT NULL DEFAULT '',
    created_by TEXT,
    updated_by TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS attendance (
    attendance_id TEXT PRIMARY KEY,
    student_id    TEXT NOT NULL REFERENCES students(student_id),
    course_id     TEXT NOT NULL REFERENCES courses(course_id),
    date          TEXT NOT NULL,      -- YYYY-MM-DD
    status        TEXT NOT NULL,      -- 'present' | 'absent' | 'late' | 'excused'
    notes         TEXT,
    created_by    TEXT,
    updated_by    TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS grades_student_idx     ON grades(student_id);
CREATE INDEX IF NOT EXISTS grades_course_idx      ON grades(course_id);
CREATE INDEX IF NOT EXISTS grades_term_idx        ON grades(term);
CREATE INDEX IF NOT EXISTS attendance_student_idx ON attendance(student_id);
CREATE INDEX IF NOT EXISTS attendance_course_idx  ON attendance(course_id);
CREATE INDEX IF NOT EXISTS attendance_date_idx    ON attendance(date);

PRAGMA user_version = 1;
";
