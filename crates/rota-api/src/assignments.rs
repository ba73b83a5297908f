//! Handlers for `/cc-assignments` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/cc-assignments` | Optional `?department=`; loose match on the faculty's department |
//! | `POST` | `/cc-assignments` | Body: [`AssignBody`] |
//! | `POST` | `/cc-assignments/remove` | Body: [`RemoveBody`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
};
use rota_core::{
  directory::FacultyDirectory,
  faculty::Slot,
  registry::{
    AssignmentResult, AssignmentSummary, RemovalResult, SlotRegistry,
  },
  role::Role,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{Success, error::ApiError, success};

// ─── Request fields ──────────────────────────────────────────────────────────

/// A semester may be sent as `"5"` or `5`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TextOrNumber {
  Text(String),
  Number(serde_json::Number),
}

impl TextOrNumber {
  fn into_text(self) -> String {
    match self {
      Self::Text(s) => s,
      Self::Number(n) => n.to_string(),
    }
  }
}

fn faculty_id(raw: Option<&str>) -> Result<Uuid, ApiError> {
  let raw = raw
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .ok_or_else(|| ApiError::BadRequest("facultyId is required".into()))?;
  Uuid::parse_str(raw)
    .map_err(|_| ApiError::BadRequest(format!("invalid facultyId {raw:?}")))
}

/// Missing fields become blank; the registry reports them by name.
fn slot(
  academic_year: Option<String>,
  semester: Option<TextOrNumber>,
  section: Option<String>,
  department: Option<String>,
) -> Slot {
  Slot::new(
    academic_year.unwrap_or_default().trim(),
    semester.map(TextOrNumber::into_text).unwrap_or_default().trim(),
    section.unwrap_or_default().trim(),
    department.unwrap_or_default(),
  )
}

// ─── Assign ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignBody {
  pub faculty_id:    Option<String>,
  pub academic_year: Option<String>,
  pub semester:      Option<TextOrNumber>,
  pub section:       Option<String>,
  pub department:    Option<String>,
  /// Promote the faculty to `cc`. Defaults to `true`.
  pub update_type:   Option<bool>,
}

/// `POST /cc-assignments`
pub async fn assign<D>(
  State(registry): State<Arc<SlotRegistry<D>>>,
  body: Result<Json<AssignBody>, JsonRejection>,
) -> Result<Json<Success<AssignmentResult>>, ApiError>
where
  D: FacultyDirectory + 'static,
{
  let Json(body) = body?;
  let id = faculty_id(body.faculty_id.as_deref())?;
  let slot = slot(
    body.academic_year,
    body.semester,
    body.section,
    body.department,
  );

  let result = registry
    .assign_cc(id, &slot, body.update_type.unwrap_or(true))
    .await?;
  Ok(success(result))
}

// ─── Remove ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveBody {
  pub faculty_id:    Option<String>,
  pub academic_year: Option<String>,
  pub semester:      Option<TextOrNumber>,
  pub section:       Option<String>,
  pub department:    Option<String>,
  /// `type` to restore once the last assignment is gone; unknown or absent
  /// values restore `teaching`.
  pub restore_type:  Option<String>,
}

/// `POST /cc-assignments/remove`
pub async fn remove<D>(
  State(registry): State<Arc<SlotRegistry<D>>>,
  body: Result<Json<RemoveBody>, JsonRejection>,
) -> Result<Json<Success<RemovalResult>>, ApiError>
where
  D: FacultyDirectory + 'static,
{
  let Json(body) = body?;
  let id = faculty_id(body.faculty_id.as_deref())?;
  let slot = slot(
    body.academic_year,
    body.semester,
    body.section,
    body.department,
  );
  let restore = body.restore_type.as_deref().and_then(Role::from_type_label);

  let result = registry.remove_cc(id, &slot, restore).await?;
  Ok(success(result))
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub department: Option<String>,
}

/// `GET /cc-assignments[?department=<name>]`
pub async fn list<D>(
  State(registry): State<Arc<SlotRegistry<D>>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Success<Vec<AssignmentSummary>>>, ApiError>
where
  D: FacultyDirectory + 'static,
{
  let Query(params) = params?;
  let rows = registry
    .list_assignments(params.department.as_deref())
    .await?;
  Ok(success(rows))
}
