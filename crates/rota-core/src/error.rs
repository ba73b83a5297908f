//! Error types for `rota-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::role::Role;

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("faculty not found: {0}")]
  FacultyNotFound(Uuid),

  #[error("faculty {faculty_id} has no cc assignment for slot {slot}")]
  AssignmentNotFound { faculty_id: Uuid, slot: String },

  #[error(
    "faculty department {faculty:?} does not match requested department \
     {requested:?}"
  )]
  DepartmentMismatch { faculty: String, requested: String },

  #[error("faculty {faculty_id} is {role} and cannot be a course coordinator")]
  RoleNotEligible { faculty_id: Uuid, role: Role },

  #[error("faculty {faculty_id} is {actual}, not {expected}")]
  RoleMismatch {
    faculty_id: Uuid,
    expected:   Role,
    actual:     Role,
  },

  #[error("concurrent modification: {0}")]
  Concurrency(String),

  #[error("persistence error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn persistence<E>(error: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Persistence(Box::new(error))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
