//! HTTP layer for Registrar.
//!
//! Exposes an axum [`Router`] over any [`RecordStore`], with the access gate
//! applied per route through the extractors in [`auth`].
//!
//! | Prefix | Contents |
//! |--------|----------|
//! | `/api/health` | Liveness check (public) |
//! | `/api/v1/login`, `/api/v1/me` | Session |
//! | `/api/v1/users` | Identity administration |
//! | `/api/v1/students`, `/api/v1/courses`, `/api/v1/teachers` | Roster |
//! | `/api/v1/grades` | Grade records and grade reports |
//! | `/api/v1/attendance` | Attendance records and attendance reports |

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, post},
};
use registrar_auth::TokenIssuer;
use registrar_core::store::RecordStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{attendance, courses, grades, health, session, students, teachers, users};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `REGISTRAR_*` environment variables.
#[derive(Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// HMAC key for bearer credentials. Must be non-empty to serve.
  #[serde(default)]
  pub jwt_secret: String,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("registrar.db") }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: RecordStore> {
  pub store:  Arc<S>,
  pub tokens: Arc<TokenIssuer>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RecordStore + Clone + 'static,
{
  let api = Router::new()
    // Session
    .route("/login", post(session::login::<S>))
    .route("/me", get(session::me))
    // Identities
    .route("/users", get(users::list::<S>).post(users::create::<S>))
    .route(
      "/users/{id}",
      get(users::get_one::<S>)
        .put(users::update::<S>)
        .delete(users::delete_one::<S>),
    )
    // Roster
    .route("/students", get(students::list::<S>).post(students::create::<S>))
    .route(
      "/students/{id}",
      get(students::get_one::<S>)
        .put(students::update::<S>)
        .delete(students::delete_one::<S>),
    )
    .route(
      "/students/{id}/courses",
      get(students::courses::<S>).post(students::enroll::<S>),
    )
    .route("/students/{id}/courses/{course_id}", delete(students::unenroll::<S>))
    .route("/courses", get(courses::list::<S>).post(courses::create::<S>))
    .route(
      "/courses/{id}",
      get(courses::get_one::<S>)
        .put(courses::update::<S>)
        .delete(courses::delete_one::<S>),
    )
    .route(
      "/courses/{id}/students",
      get(courses::cohort::<S>).post(courses::enroll::<S>),
    )
    .route("/courses/{id}/teachers", get(courses::teachers::<S>))
    .route("/teachers", get(teachers::list::<S>).post(teachers::create::<S>))
    .route(
      "/teachers/{id}",
      get(teachers::get_one::<S>)
        .put(teachers::update::<S>)
        .delete(teachers::delete_one::<S>),
    )
    .route(
      "/teachers/{id}/courses",
      get(teachers::courses::<S>).post(teachers::assign::<S>),
    )
    .route("/teachers/{id}/courses/{course_id}", delete(teachers::unassign::<S>))
    // Grades
    .route("/grades", get(grades::list::<S>).post(grades::create::<S>))
    .route(
      "/grades/{id}",
      get(grades::get_one::<S>)
        .put(grades::update::<S>)
        .delete(grades::delete_one::<S>),
    )
    .route("/grades/student/{id}", get(grades::by_student::<S>))
    .route("/grades/student/{id}/gpa", get(grades::gpa::<S>))
    .route("/grades/course/{id}", get(grades::by_course::<S>))
    .route("/grades/course/{id}/distribution", get(grades::distribution::<S>))
    .route("/grades/term/{term}", get(grades::by_term::<S>))
    // Attendance
    .route("/attendance", get(attendance::list::<S>).post(attendance::create::<S>))
    .route(
      "/attendance/{id}",
      get(attendance::get_one::<S>)
        .put(attendance::update::<S>)
        .delete(attendance::delete_one::<S>),
    )
    .route("/attendance/student/{id}", get(attendance::by_student::<S>))
    .route("/attendance/student/{id}/report", get(attendance::student_report::<S>))
    .route("/attendance/course/{id}", get(attendance::by_course::<S>))
    .route("/attendance/course/{id}/report", get(attendance::course_report::<S>))
    .route(
      "/attendance/course/{id}/date/{date}",
      get(attendance::by_course_and_date::<S>),
    )
    .route("/attendance/date/{date}", get(attendance::by_date::<S>));

  Router::new()
    .route("/api/health", get(health::handler))
    .nest("/api/v1", api)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
