//! Error type for `rota-store-sqlite`.

use rota_core::directory::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown faculty type in store: {0:?}")]
  UnknownRole(String),

  #[error("faculty not found: {0}")]
  FacultyNotFound(uuid::Uuid),

  #[error("employee id already in use: {0}")]
  DuplicateEmployee(String),

  /// The stored version moved on since the record was read.
  #[error("faculty {0} was modified concurrently")]
  Conflict(uuid::Uuid),
}

impl StoreError for Error {
  fn is_conflict(&self) -> bool { matches!(self, Self::Conflict(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
