//! [`InMemoryDirectory`]: a [`FacultyDirectory`] held in process memory.

use std::{
  collections::HashMap,
  sync::{Mutex, MutexGuard, PoisonError},
};

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::{
  department::DepartmentResolver,
  directory::{FacultyDirectory, StoreError},
  faculty::{Faculty, NewFaculty},
  role::Role,
};

#[derive(Debug, Error)]
pub enum MemoryError {
  #[error("faculty not found: {0}")]
  NotFound(Uuid),

  #[error("employee id already in use: {0}")]
  DuplicateEmployee(String),

  #[error("faculty {0} was modified concurrently")]
  Conflict(Uuid),
}

impl StoreError for MemoryError {
  fn is_conflict(&self) -> bool { matches!(self, Self::Conflict(_)) }
}

/// Records keyed by id, listed in creation order.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
  records: Mutex<HashMap<Uuid, Faculty>>,
}

impl InMemoryDirectory {
  pub fn new() -> Self { Self::default() }

  fn records(&self) -> MutexGuard<'_, HashMap<Uuid, Faculty>> {
    self.records.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn sorted(&self, keep: impl Fn(&Faculty) -> bool) -> Vec<Faculty> {
    let mut out: Vec<Faculty> =
      self.records().values().filter(|f| keep(f)).cloned().collect();
    out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    out
  }
}

fn check_version(
  records: &HashMap<Uuid, Faculty>,
  faculty: &Faculty,
) -> Result<(), MemoryError> {
  match records.get(&faculty.id) {
    None => Err(MemoryError::NotFound(faculty.id)),
    Some(stored) if stored.version != faculty.version => {
      Err(MemoryError::Conflict(faculty.id))
    }
    Some(_) => Ok(()),
  }
}

fn bump(mut faculty: Faculty) -> Faculty {
  faculty.version += 1;
  faculty.updated_at = Utc::now();
  faculty
}

impl FacultyDirectory for InMemoryDirectory {
  type Error = MemoryError;

  async fn create(&self, input: NewFaculty) -> Result<Faculty, MemoryError> {
    let mut records = self.records();
    if records.values().any(|f| f.employee_id == input.employee_id) {
      return Err(MemoryError::DuplicateEmployee(input.employee_id));
    }
    let faculty = Faculty::from_new(input);
    records.insert(faculty.id, faculty.clone());
    Ok(faculty)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Faculty>, MemoryError> {
    Ok(self.records().get(&id).cloned())
  }

  async fn find_candidates_for_slot_cleanup<'a>(
    &'a self,
    resolver: &'a DepartmentResolver,
    variants: &'a [String],
    role: Option<Role>,
  ) -> Result<Vec<Faculty>, MemoryError> {
    Ok(self.sorted(|f| {
      role.is_none_or(|r| f.role == r)
        && variants.iter().any(|v| resolver.loosely_equal(&f.department, v))
    }))
  }

  async fn list_with_assignments(&self) -> Result<Vec<Faculty>, MemoryError> {
    Ok(self.sorted(|f| !f.cc_assignments.is_empty()))
  }

  async fn save(&self, faculty: Faculty) -> Result<Faculty, MemoryError> {
    let mut records = self.records();
    check_version(&records, &faculty)?;
    let saved = bump(faculty);
    records.insert(saved.id, saved.clone());
    Ok(saved)
  }

  async fn save_all(
    &self,
    faculties: Vec<Faculty>,
  ) -> Result<Vec<Faculty>, MemoryError> {
    let mut records = self.records();
    for faculty in &faculties {
      check_version(&records, faculty)?;
    }
    let saved: Vec<Faculty> = faculties.into_iter().map(bump).collect();
    for faculty in &saved {
      records.insert(faculty.id, faculty.clone());
    }
    Ok(saved)
  }
}
