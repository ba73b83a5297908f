//! Integration tests for `SqliteDirectory` against an in-memory database.

use std::sync::Arc;

use rota_core::{
  department::DepartmentResolver,
  directory::{FacultyDirectory, StoreError as _},
  faculty::{Assignment, NewFaculty, Slot},
  registry::{RegistryConfig, SlotRegistry},
  role::Role,
};
use uuid::Uuid;

use crate::{Error, SqliteDirectory};

async fn store() -> SqliteDirectory {
  SqliteDirectory::open_in_memory()
    .await
    .expect("in-memory store")
}

fn electronics(employee_id: &str) -> NewFaculty {
  NewFaculty::teaching(employee_id, "Asha Rao", "Electronics Engineering")
}

// ─── Create / find ───────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_find_by_id() {
  let s = store().await;

  let created = s
    .create(electronics("E-1").with_role(Role::Hod))
    .await
    .unwrap();
  assert_eq!(created.version, 0);

  let fetched = s.find_by_id(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.id, created.id);
  assert_eq!(fetched.employee_id, "E-1");
  assert_eq!(fetched.department, "Electronics Engineering");
  assert_eq!(fetched.role, Role::Hod);
  assert!(fetched.cc_assignments.is_empty());
}

#[tokio::test]
async fn find_missing_returns_none() {
  let s = store().await;
  assert!(s.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_employee_id_rejected() {
  let s = store().await;
  s.create(electronics("E-1")).await.unwrap();
  let err = s.create(electronics("E-1")).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateEmployee(ref id) if id == "E-1"));
}

// ─── Save ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_roundtrips_assignments_and_bumps_version() {
  let s = store().await;
  let mut f = s.create(electronics("E-1")).await.unwrap();

  let slot = Slot::new("2025-2026", "5", "B", "eletronic enigneering");
  f.cc_assignments
    .push(Assignment::new(&slot, f.department.clone()));
  f.role = Role::Cc;

  let saved = s.save(f.clone()).await.unwrap();
  assert_eq!(saved.version, 1);

  let fetched = s.find_by_id(f.id).await.unwrap().unwrap();
  assert_eq!(fetched.version, 1);
  assert_eq!(fetched.role, Role::Cc);
  assert_eq!(fetched.cc_assignments, f.cc_assignments);
}

#[tokio::test]
async fn stale_save_is_a_conflict() {
  let s = store().await;
  let f = s.create(electronics("E-1")).await.unwrap();
  s.save(f.clone()).await.unwrap();

  let err = s.save(f).await.unwrap_err();
  assert!(err.is_conflict(), "{err}");
}

#[tokio::test]
async fn saving_unknown_faculty_is_not_found() {
  let s = store().await;
  let ghost = rota_core::faculty::Faculty::from_new(electronics("E-9"));
  let err = s.save(ghost).await.unwrap_err();
  assert!(matches!(err, Error::FacultyNotFound(_)));
  assert!(!err.is_conflict());
}

#[tokio::test]
async fn save_all_rolls_back_on_conflict() {
  let s = store().await;
  let a = s.create(electronics("E-1")).await.unwrap();
  let b = s.create(electronics("E-2")).await.unwrap();
  s.save(b.clone()).await.unwrap();

  let mut a_changed = a.clone();
  a_changed.role = Role::Cc;
  let err = s.save_all(vec![a_changed, b]).await.unwrap_err();
  assert!(err.is_conflict());

  let a_now = s.find_by_id(a.id).await.unwrap().unwrap();
  assert_eq!(a_now.role, Role::Teaching);
  assert_eq!(a_now.version, 0);
}

// ─── Queries ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn candidates_match_loosely_and_filter_by_role() {
  let s = store().await;
  let resolver = DepartmentResolver::default();
  s.create(electronics("E-1")).await.unwrap();
  s.create(
    NewFaculty::teaching("E-2", "B", "eletronics engg").with_role(Role::Cc),
  )
  .await
  .unwrap();
  s.create(NewFaculty::teaching("E-3", "C", "Civil Engineering"))
    .await
    .unwrap();

  let variants = vec!["eletronic enigneering".to_owned()];
  let all = s
    .find_candidates_for_slot_cleanup(&resolver, &variants, None)
    .await
    .unwrap();
  assert_eq!(all.len(), 2);

  let ccs = s
    .find_candidates_for_slot_cleanup(&resolver, &variants, Some(Role::Cc))
    .await
    .unwrap();
  assert_eq!(ccs.len(), 1);
  assert_eq!(ccs[0].employee_id, "E-2");
}

#[tokio::test]
async fn list_with_assignments_skips_empty_lists() {
  let s = store().await;
  let mut a = s.create(electronics("E-1")).await.unwrap();
  s.create(electronics("E-2")).await.unwrap();

  a.cc_assignments.push(Assignment::new(
    &Slot::new("2025-2026", "5", "B", "x"),
    a.department.clone(),
  ));
  s.save(a.clone()).await.unwrap();

  let listed = s.list_with_assignments().await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].id, a.id);
}

// ─── Through the registry ────────────────────────────────────────────────────

#[tokio::test]
async fn registry_eviction_persists_both_records() {
  let s = Arc::new(store().await);
  let registry = SlotRegistry::new(
    s.clone(),
    Arc::new(DepartmentResolver::default()),
    RegistryConfig::default(),
  );
  let a = s.create(electronics("E-1")).await.unwrap();
  let b = s.create(electronics("E-2")).await.unwrap();
  let slot = Slot::new("2025-2026", "5", "B", "eletronic enigneering");

  registry.assign_cc(a.id, &slot, true).await.unwrap();
  registry.assign_cc(b.id, &slot, true).await.unwrap();

  let a = s.find_by_id(a.id).await.unwrap().unwrap();
  let b = s.find_by_id(b.id).await.unwrap().unwrap();
  assert_eq!(a.role, Role::Teaching);
  assert!(a.cc_assignments.is_empty());
  assert_eq!(b.role, Role::Cc);
  assert_eq!(b.cc_assignments.len(), 1);

  let removed = registry.remove_cc(b.id, &slot, None).await.unwrap();
  assert_eq!(removed.role, Role::Teaching);
  assert!(s.list_with_assignments().await.unwrap().is_empty());
}
