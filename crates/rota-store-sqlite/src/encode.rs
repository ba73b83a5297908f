//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings, roles by their `type` label and assignment lists as compact JSON.

use chrono::{DateTime, Utc};
use rota_core::{
  faculty::{Assignment, Faculty},
  role::Role,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ─────────────────────────────────────────────────────────────────────

pub fn encode_role(role: Role) -> &'static str { role.type_label() }

pub fn decode_role(s: &str) -> Result<Role> {
  Role::from_type_label(s).ok_or_else(|| Error::UnknownRole(s.to_owned()))
}

// ─── Assignments ──────────────────────────────────────────────────────────────

pub fn encode_assignments(assignments: &[Assignment]) -> Result<String> {
  Ok(serde_json::to_string(assignments)?)
}

pub fn decode_assignments(s: &str) -> Result<Vec<Assignment>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawFaculty::from_row`].
pub const FACULTY_COLUMNS: &str = "faculty_id, employee_id, name, department, \
                                   faculty_type, cc_assignments, version, \
                                   created_at, updated_at";

/// Raw values read directly from a `faculty` row.
pub struct RawFaculty {
  pub faculty_id:     String,
  pub employee_id:    String,
  pub name:           String,
  pub department:     String,
  pub faculty_type:   String,
  pub cc_assignments: String,
  pub version:        i64,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawFaculty {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      faculty_id:     row.get(0)?,
      employee_id:    row.get(1)?,
      name:           row.get(2)?,
      department:     row.get(3)?,
      faculty_type:   row.get(4)?,
      cc_assignments: row.get(5)?,
      version:        row.get(6)?,
      created_at:     row.get(7)?,
      updated_at:     row.get(8)?,
    })
  }

  pub fn into_faculty(self) -> Result<Faculty> {
    Ok(Faculty {
      id:             decode_uuid(&self.faculty_id)?,
      employee_id:    self.employee_id,
      name:           self.name,
      department:     self.department,
      role:           decode_role(&self.faculty_type)?,
      cc_assignments: decode_assignments(&self.cc_assignments)?,
      version:        self.version.max(0) as u64,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}

/// The mutable columns of a faculty row, encoded for an optimistic UPDATE.
pub struct EncodedUpdate {
  pub faculty_id:     String,
  pub name:           String,
  pub department:     String,
  pub faculty_type:   &'static str,
  pub cc_assignments: String,
  /// The version the caller read; the UPDATE only applies if it still holds.
  pub version:        i64,
  pub updated_at:     String,
}

impl EncodedUpdate {
  pub fn new(faculty: &Faculty, updated_at: DateTime<Utc>) -> Result<Self> {
    Ok(Self {
      faculty_id:     encode_uuid(faculty.id),
      name:           faculty.name.clone(),
      department:     faculty.department.clone(),
      faculty_type:   encode_role(faculty.role),
      cc_assignments: encode_assignments(&faculty.cc_assignments)?,
      version:        faculty.version as i64,
      updated_at:     encode_dt(updated_at),
    })
  }
}
