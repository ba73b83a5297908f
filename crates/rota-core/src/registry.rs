//! [`SlotRegistry`]: assigns and removes course coordinators while keeping
//! at most one coordinator per slot.
//!
//! Slots are matched on exact (academic year, semester, section) and on
//! loose department equivalence. Assigning and removing within the same
//! (academic year, semester, section) is serialised through an async mutex,
//! and every multi-record write goes through [`FacultyDirectory::save_all`]
//! so an eviction and the new assignment land together or not at all.
//! Version conflicts re-run the whole operation a bounded number of times.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  department::DepartmentResolver,
  directory::{FacultyDirectory, StoreError},
  faculty::{Assignment, Faculty, Slot},
  locks::{SlotKey, SlotLocks},
  role::Role,
};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
  /// Attempts per operation before giving up on version conflicts.
  pub max_attempts:    u32,
  /// How long to wait for another operation on the same slot.
  pub lock_timeout_ms: u64,
}

impl Default for RegistryConfig {
  fn default() -> Self {
    Self {
      max_attempts:    3,
      lock_timeout_ms: 5_000,
    }
  }
}

impl RegistryConfig {
  pub fn lock_timeout(&self) -> Duration {
    Duration::from_millis(self.lock_timeout_ms)
  }
}

// ─── Results ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResult {
  pub faculty_id:    Uuid,
  pub name:          String,
  pub academic_year: String,
  pub semester:      String,
  pub section:       String,
  /// The coordinator's own department, as stored on the assignment.
  pub department:    String,
  #[serde(flatten)]
  pub role:          Role,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalResult {
  pub faculty_id: Uuid,
  #[serde(flatten)]
  pub role:       Role,
}

/// One row of [`SlotRegistry::list_assignments`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentSummary {
  pub faculty_id:    Uuid,
  pub name:          String,
  pub department:    String,
  pub academic_year: String,
  pub semester:      String,
  pub section:       String,
  pub assigned_at:   DateTime<Utc>,
}

// ─── Attempt outcome ─────────────────────────────────────────────────────────

/// Outcome of one attempt at an operation: retry on a version conflict,
/// otherwise fail for good.
enum Attempt {
  Retry(String),
  Fail(Error),
}

impl From<Error> for Attempt {
  fn from(e: Error) -> Self { Self::Fail(e) }
}

fn stored<E: StoreError>(e: E) -> Attempt {
  if e.is_conflict() {
    Attempt::Retry(e.to_string())
  } else {
    Attempt::Fail(Error::persistence(e))
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

pub struct SlotRegistry<D> {
  directory: Arc<D>,
  resolver:  Arc<DepartmentResolver>,
  config:    RegistryConfig,
  locks:     SlotLocks,
}

impl<D: FacultyDirectory> SlotRegistry<D> {
  pub fn new(
    directory: Arc<D>,
    resolver: Arc<DepartmentResolver>,
    config: RegistryConfig,
  ) -> Self {
    Self {
      directory,
      resolver,
      config,
      locks: SlotLocks::default(),
    }
  }

  pub fn directory(&self) -> &Arc<D> { &self.directory }

  pub fn resolver(&self) -> &DepartmentResolver { &self.resolver }

  /// Make `faculty_id` the coordinator of `slot`, evicting any previous
  /// coordinator and removing stray duplicate claims. With `promote`, the
  /// faculty's role becomes `cc`.
  pub async fn assign_cc(
    &self,
    faculty_id: Uuid,
    slot: &Slot,
    promote: bool,
  ) -> Result<AssignmentResult> {
    slot.validate()?;
    let resolved = self.resolver.normalize(&slot.department);
    let _guard = self.lock_slot(slot).await?;

    let mut attempt = 1;
    loop {
      match self
        .try_assign_cc(faculty_id, slot, &resolved, promote)
        .await
      {
        Err(Attempt::Retry(reason)) => {
          self.on_conflict("assign_cc", &mut attempt, reason)?
        }
        done => return done.map_err(|e| self.give_up("assign_cc", e)),
      }
    }
  }

  /// Remove `faculty_id`'s claim on `slot`. When it was the last one, the
  /// faculty is restored to `restore` (or `teaching`).
  pub async fn remove_cc(
    &self,
    faculty_id: Uuid,
    slot: &Slot,
    restore: Option<Role>,
  ) -> Result<RemovalResult> {
    slot.validate()?;
    let resolved = self.resolver.normalize(&slot.department);
    let _guard = self.lock_slot(slot).await?;

    let mut attempt = 1;
    loop {
      match self
        .try_remove_cc(faculty_id, slot, &resolved, restore)
        .await
      {
        Err(Attempt::Retry(reason)) => {
          self.on_conflict("remove_cc", &mut attempt, reason)?
        }
        done => return done.map_err(|e| self.give_up("remove_cc", e)),
      }
    }
  }

  /// Every assignment held by faculty whose own department loosely matches
  /// `department`. A blank or absent query lists everything.
  ///
  /// Unlocked: a concurrent assignment may or may not be visible yet.
  pub async fn list_assignments(
    &self,
    department: Option<&str>,
  ) -> Result<Vec<AssignmentSummary>> {
    let query = department.map(str::trim).filter(|q| !q.is_empty());
    let faculties = self
      .directory
      .list_with_assignments()
      .await
      .map_err(Error::persistence)?;

    Ok(
      faculties
        .into_iter()
        .filter(|f| {
          query.is_none_or(|q| self.resolver.loosely_equal(&f.department, q))
        })
        .flat_map(|f| {
          let Faculty {
            id,
            name,
            department,
            cc_assignments,
            ..
          } = f;
          cc_assignments.into_iter().map(move |a| AssignmentSummary {
            faculty_id:    id,
            name:          name.clone(),
            department:    department.clone(),
            academic_year: a.academic_year,
            semester:      a.semester,
            section:       a.section,
            assigned_at:   a.assigned_at,
          })
        })
        .collect(),
    )
  }

  /// `HOD` → `teaching`; fails with [`Error::RoleMismatch`] otherwise.
  pub async fn remove_hod_role(&self, faculty_id: Uuid) -> Result<Faculty> {
    self
      .step_down(faculty_id, "remove_hod_role", Faculty::remove_hod)
      .await
  }

  /// `principal` → `teaching`; fails with [`Error::RoleMismatch`] otherwise.
  pub async fn remove_principal_role(&self, faculty_id: Uuid) -> Result<Faculty> {
    self
      .step_down(faculty_id, "remove_principal_role", Faculty::remove_principal)
      .await
  }

  pub async fn get_faculty(&self, faculty_id: Uuid) -> Result<Faculty> {
    self
      .directory
      .find_by_id(faculty_id)
      .await
      .map_err(Error::persistence)?
      .ok_or(Error::FacultyNotFound(faculty_id))
  }

  // ── Attempts ────────────────────────────────────────────────────────────

  async fn try_assign_cc(
    &self,
    faculty_id: Uuid,
    slot: &Slot,
    resolved: &str,
    promote: bool,
  ) -> Result<AssignmentResult, Attempt> {
    let mut faculty = self.fetch(faculty_id).await?;

    // The request's department only locates the faculty; their own
    // department is what gets stored.
    if !self.resolver.loosely_equal(&faculty.department, &slot.department)
      && !self.resolver.loosely_equal(&faculty.department, resolved)
    {
      return Err(
        Error::DepartmentMismatch {
          faculty:   faculty.department,
          requested: slot.department.clone(),
        }
        .into(),
      );
    }
    if !faculty.role.can_coordinate() {
      return Err(
        Error::RoleNotEligible {
          faculty_id,
          role: faculty.role,
        }
        .into(),
      );
    }

    let variants = department_variants(slot, resolved, &faculty.department);
    let claims = |a: &Assignment| self.claims(a, slot, &variants);
    let mut touched: Vec<Faculty> = Vec::new();

    let holders = self
      .directory
      .find_candidates_for_slot_cleanup(&self.resolver, &variants, Some(Role::Cc))
      .await
      .map_err(stored)?;
    for mut holder in holders {
      if holder.id == faculty_id || !holder.holds(&claims) {
        continue;
      }
      holder.remove_assignments(&claims);
      holder.demote_from_cc();
      info!(evicted = %holder.id, incoming = %faculty_id, %slot, "evicting previous coordinator");
      touched.push(holder);
    }

    let candidates = self
      .directory
      .find_candidates_for_slot_cleanup(&self.resolver, &variants, None)
      .await
      .map_err(stored)?;
    for mut candidate in candidates {
      if candidate.id == faculty_id || touched.iter().any(|t| t.id == candidate.id)
      {
        continue;
      }
      let removed = candidate.remove_assignments(&claims);
      if removed > 0 {
        debug!(faculty = %candidate.id, removed, %slot, "removed stray assignments");
        touched.push(candidate);
      }
    }

    let replaced = faculty.remove_assignments(&claims);
    if replaced > 0 {
      debug!(faculty = %faculty_id, replaced, %slot, "replacing existing claim");
    }
    faculty
      .cc_assignments
      .push(Assignment::new(slot, faculty.department.clone()));
    if promote {
      faculty.promote_to_cc()?;
    }
    touched.push(faculty);

    let faculty = self
      .directory
      .save_all(touched)
      .await
      .map_err(stored)?
      .into_iter()
      .find(|f| f.id == faculty_id)
      .ok_or(Error::FacultyNotFound(faculty_id))?;

    info!(faculty = %faculty_id, %slot, role = %faculty.role, "assigned coordinator");
    Ok(AssignmentResult {
      faculty_id,
      name: faculty.name,
      academic_year: slot.academic_year.clone(),
      semester: slot.semester.clone(),
      section: slot.section.clone(),
      department: faculty.department,
      role: faculty.role,
    })
  }

  async fn try_remove_cc(
    &self,
    faculty_id: Uuid,
    slot: &Slot,
    resolved: &str,
    restore: Option<Role>,
  ) -> Result<RemovalResult, Attempt> {
    let mut faculty = self.fetch(faculty_id).await?;
    let variants = department_variants(slot, resolved, &faculty.department);

    // Every matching entry goes, in case duplicates predate dedup.
    let removed =
      faculty.remove_assignments(|a| self.claims(a, slot, &variants));
    if removed == 0 {
      return Err(
        Error::AssignmentNotFound {
          faculty_id,
          slot: slot.to_string(),
        }
        .into(),
      );
    }
    if faculty.cc_assignments.is_empty() {
      faculty.restore_after_last_assignment_removed(restore);
    }

    let faculty = self.directory.save(faculty).await.map_err(stored)?;
    info!(faculty = %faculty_id, %slot, removed, role = %faculty.role, "removed coordinator assignment");
    Ok(RemovalResult {
      faculty_id,
      role: faculty.role,
    })
  }

  async fn step_down(
    &self,
    faculty_id: Uuid,
    op: &'static str,
    transition: fn(&mut Faculty) -> Result<()>,
  ) -> Result<Faculty> {
    let mut attempt = 1;
    loop {
      match self.try_step_down(faculty_id, op, transition).await {
        Err(Attempt::Retry(reason)) => {
          self.on_conflict(op, &mut attempt, reason)?
        }
        done => return done.map_err(|e| self.give_up(op, e)),
      }
    }
  }

  async fn try_step_down(
    &self,
    faculty_id: Uuid,
    op: &'static str,
    transition: fn(&mut Faculty) -> Result<()>,
  ) -> Result<Faculty, Attempt> {
    let mut faculty = self.fetch(faculty_id).await?;
    transition(&mut faculty)?;
    let faculty = self.directory.save(faculty).await.map_err(stored)?;
    info!(faculty = %faculty_id, op, role = %faculty.role, "administrative role removed");
    Ok(faculty)
  }

  // ── Helpers ─────────────────────────────────────────────────────────────

  async fn fetch(&self, faculty_id: Uuid) -> Result<Faculty, Attempt> {
    self
      .directory
      .find_by_id(faculty_id)
      .await
      .map_err(stored)?
      .ok_or(Attempt::Fail(Error::FacultyNotFound(faculty_id)))
  }

  /// Whether `a` is a claim on `slot` under any of the department spellings.
  fn claims(&self, a: &Assignment, slot: &Slot, variants: &[String]) -> bool {
    a.same_period(slot)
      && variants
        .iter()
        .any(|v| self.resolver.loosely_equal(&a.department, v))
  }

  /// Every department shares the period's lock, so two spellings that match
  /// loosely can never run side by side.
  async fn lock_slot(&self, slot: &Slot) -> Result<OwnedMutexGuard<()>> {
    self
      .locks
      .acquire(slot_key(slot), self.config.lock_timeout())
      .await
  }

  /// Log a conflict and advance `attempt`, or fail once attempts run out.
  fn on_conflict(
    &self,
    op: &'static str,
    attempt: &mut u32,
    reason: String,
  ) -> Result<()> {
    let max = self.config.max_attempts.max(1);
    if *attempt >= max {
      warn!(op, attempts = max, %reason, "giving up after repeated conflicts");
      return Err(Error::Concurrency(format!(
        "{op} gave up after {max} conflicting attempts"
      )));
    }
    warn!(op, attempt = *attempt, %reason, "write conflict; retrying");
    *attempt += 1;
    Ok(())
  }

  fn give_up(&self, op: &'static str, attempt: Attempt) -> Error {
    match attempt {
      Attempt::Fail(e) => e,
      Attempt::Retry(reason) => {
        Error::Concurrency(format!("{op} conflicted: {reason}"))
      }
    }
  }
}

fn slot_key(slot: &Slot) -> SlotKey {
  SlotKey {
    academic_year: slot.academic_year.clone(),
    semester:      slot.semester.clone(),
    section:       slot.section.clone(),
  }
}

/// The requested spelling, its canonical form and the faculty's own
/// department, without repeats.
fn department_variants(slot: &Slot, resolved: &str, own: &str) -> Vec<String> {
  let mut variants: Vec<String> = Vec::with_capacity(3);
  for v in [slot.department.as_str(), resolved, own] {
    if !variants.iter().any(|seen| seen == v) {
      variants.push(v.to_owned());
    }
  }
  variants
}
