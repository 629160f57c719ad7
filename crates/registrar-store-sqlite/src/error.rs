//! Error type for `registrar-store-sqlite`.

use rusqlite::ffi;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored column holds a value outside its closed set.
  #[error("undecodable column value: {0}")]
  Decode(String),

  /// A UNIQUE or PRIMARY KEY constraint rejected the write.
  #[error("already exists: {0}")]
  Duplicate(String),

  /// A FOREIGN KEY constraint rejected the write.
  #[error("referenced record does not exist: {0}")]
  MissingReference(String),

  /// A delete was refused because other rows still reference the record.
  #[error("{entity} {id} still has grade or attendance records")]
  StillReferenced { entity: &'static str, id: Uuid },

  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: Uuid },
}

impl Error {
  /// Sort a failed write into duplicate, dangling reference, or plain
  /// database error.
  pub(crate) fn from_write(e: tokio_rusqlite::Error) -> Self {
    if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(code, msg)) = &e {
      let msg = msg.clone().unwrap_or_else(|| code.to_string());
      match code.extended_code {
        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
          return Error::Duplicate(msg);
        }
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return Error::MissingReference(msg),
        _ => {}
      }
    }
    Error::Database(e)
  }
}

impl From<Error> for registrar_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Duplicate(msg) => registrar_core::Error::Conflict(msg),
      Error::MissingReference(msg) => registrar_core::Error::Validation(msg),
      e @ Error::StillReferenced { .. } => registrar_core::Error::Conflict(e.to_string()),
      Error::NotFound { entity, id } => registrar_core::Error::not_found(entity, id),
      other => registrar_core::Error::Storage(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
