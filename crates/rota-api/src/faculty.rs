//! Handlers for `/faculty` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/faculty/{id}` | 404 if not found |
//! | `PATCH` | `/faculty/{id}/remove-hod` | 400 unless the faculty is HOD |
//! | `PATCH` | `/faculty/{id}/remove-principal` | 400 unless the faculty is principal |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::PathRejection},
};
use rota_core::{
  directory::FacultyDirectory, faculty::Faculty, registry::SlotRegistry,
};
use uuid::Uuid;

use crate::{Success, error::ApiError, success};

/// `GET /faculty/{id}`
pub async fn get_one<D>(
  State(registry): State<Arc<SlotRegistry<D>>>,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Success<Faculty>>, ApiError>
where
  D: FacultyDirectory + 'static,
{
  let Path(id) = id?;
  Ok(success(registry.get_faculty(id).await?))
}

/// `PATCH /faculty/{id}/remove-hod`
pub async fn remove_hod<D>(
  State(registry): State<Arc<SlotRegistry<D>>>,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Success<Faculty>>, ApiError>
where
  D: FacultyDirectory + 'static,
{
  let Path(id) = id?;
  Ok(success(registry.remove_hod_role(id).await?))
}

/// `PATCH /faculty/{id}/remove-principal`
pub async fn remove_principal<D>(
  State(registry): State<Arc<SlotRegistry<D>>>,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Success<Faculty>>, ApiError>
where
  D: FacultyDirectory + 'static,
{
  let Path(id) = id?;
  Ok(success(registry.remove_principal_role(id).await?))
}
