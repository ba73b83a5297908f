//! JSON REST API for Rota.
//!
//! Exposes an axum [`Router`] backed by a [`SlotRegistry`] over any
//! [`FacultyDirectory`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! Successful responses are wrapped as `{"success": true, "data": ...}`;
//! failures as `{"success": false, "message": "..."}`.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(rota_api::api_router(registry.clone()))
//! ```

pub mod assignments;
pub mod error;
pub mod faculty;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, patch, post},
};
use rota_core::{directory::FacultyDirectory, registry::SlotRegistry};
use serde::Serialize;

pub use error::ApiError;

/// The success envelope.
#[derive(Debug, Serialize)]
pub struct Success<T> {
  pub success: bool,
  pub data:    T,
}

pub(crate) fn success<T>(data: T) -> Json<Success<T>> {
  Json(Success {
    success: true,
    data,
  })
}

/// Build a fully-materialised API router for `registry`.
///
/// The returned `Router<()>` can be merged or nested into any parent router
/// regardless of its own state type.
pub fn api_router<D>(registry: Arc<SlotRegistry<D>>) -> Router<()>
where
  D: FacultyDirectory + 'static,
{
  Router::new()
    // Coordinator assignments
    .route(
      "/cc-assignments",
      get(assignments::list::<D>).post(assignments::assign::<D>),
    )
    .route("/cc-assignments/remove", post(assignments::remove::<D>))
    // Faculty roles
    .route("/faculty/{id}", get(faculty::get_one::<D>))
    .route("/faculty/{id}/remove-hod", patch(faculty::remove_hod::<D>))
    .route(
      "/faculty/{id}/remove-principal",
      patch(faculty::remove_principal::<D>),
    )
    .with_state(registry)
}

// ─── Integration tests ────────────────────────────────────────────────────────
