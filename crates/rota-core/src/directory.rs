//! The `FacultyDirectory` trait.
//!
//! A directory is pure lookup and persistence plumbing over faculty records:
//! it knows nothing of the one-coordinator-per-slot invariant, which lives in
//! [`crate::registry::SlotRegistry`]. Implemented by storage backends (e.g.
//! `rota-store-sqlite`) and by [`crate::memory::InMemoryDirectory`].

use std::future::Future;

use uuid::Uuid;

use crate::{
  department::DepartmentResolver,
  faculty::{Faculty, NewFaculty},
  role::Role,
};

/// Errors a directory can report. The registry retries writes that failed
/// because another writer got there first.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `true` when a save was rejected because the stored `version` moved on.
  fn is_conflict(&self) -> bool;
}

/// Abstraction over a faculty store backend.
///
/// Writes are optimistic: [`save`](Self::save) and
/// [`save_all`](Self::save_all) succeed only while each record's `version`
/// still matches the stored one, and return the records with their bumped
/// versions.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait FacultyDirectory: Send + Sync {
  type Error: StoreError;

  /// Persist a new faculty record.
  fn create(
    &self,
    input: NewFaculty,
  ) -> impl Future<Output = Result<Faculty, Self::Error>> + Send + '_;

  /// Retrieve a faculty record by id. Returns `None` if not found.
  fn find_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Faculty>, Self::Error>> + Send + '_;

  /// Every faculty whose own department loosely matches any of `variants`,
  /// optionally restricted to one role.
  fn find_candidates_for_slot_cleanup<'a>(
    &'a self,
    resolver: &'a DepartmentResolver,
    variants: &'a [String],
    role: Option<Role>,
  ) -> impl Future<Output = Result<Vec<Faculty>, Self::Error>> + Send + 'a;

  /// Every faculty holding at least one cc assignment.
  fn list_with_assignments(
    &self,
  ) -> impl Future<Output = Result<Vec<Faculty>, Self::Error>> + Send + '_;

  /// Write one record back.
  fn save(
    &self,
    faculty: Faculty,
  ) -> impl Future<Output = Result<Faculty, Self::Error>> + Send + '_;

  /// Write several records back atomically: either every version check
  /// passes and all are written, or nothing is.
  fn save_all(
    &self,
    faculties: Vec<Faculty>,
  ) -> impl Future<Output = Result<Vec<Faculty>, Self::Error>> + Send + '_;
}
