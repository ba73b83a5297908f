//! Core types and the slot assignment registry for Rota.
//!
//! A faculty member may own a course-coordinator slot, identified by
//! academic year, semester, section and department. This crate holds the
//! domain model, the department-name resolver, the role state machine, the
//! [`directory::FacultyDirectory`] abstraction and the
//! [`registry::SlotRegistry`] that keeps one coordinator per slot.
//!
//! It is deliberately free of HTTP and database dependencies.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod department;
pub mod directory;
pub mod error;
pub mod faculty;
pub mod memory;
pub mod registry;
pub mod role;

mod locks;

pub use error::{Error, Result};
