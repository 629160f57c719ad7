//! Error types for `registrar-core`.
//!
//! These are the failures a [`RecordStore`](crate::store::RecordStore)
//! collaborator may surface. Authentication failures live in
//! `registrar-auth`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: String },

  /// A uniqueness constraint was violated (duplicate username, email, ...).
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("invalid input: {0}")]
  Validation(String),

  #[error("storage failure: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
    Self::NotFound { entity, id: id.to_string() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
