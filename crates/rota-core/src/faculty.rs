//! Faculty records and the course-coordinator assignments they own.
//!
//! An [`Assignment`] is a value object: it has no identity of its own and
//! lives only inside its owner's `cc_assignments` list.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, role::Role};

// ─── Slot ────────────────────────────────────────────────────────────────────

/// The claim a coordinator owns: (academic year, semester, section,
/// department). The department is free text; equivalence is decided by the
/// resolver's loose match, never by string equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
  pub academic_year: String,
  pub semester:      String,
  pub section:       String,
  pub department:    String,
}

impl Slot {
  pub fn new(
    academic_year: impl Into<String>,
    semester: impl Into<String>,
    section: impl Into<String>,
    department: impl Into<String>,
  ) -> Self {
    Self {
      academic_year: academic_year.into(),
      semester:      semester.into(),
      section:       section.into(),
      department:    department.into(),
    }
  }

  /// Reject blank fields; nothing downstream can match on them.
  pub fn validate(&self) -> Result<()> {
    let fields = [
      ("academicYear", &self.academic_year),
      ("semester", &self.semester),
      ("section", &self.section),
      ("department", &self.department),
    ];
    let missing: Vec<&str> = fields
      .iter()
      .filter(|(_, v)| v.trim().is_empty())
      .map(|(name, _)| *name)
      .collect();

    if missing.is_empty() {
      Ok(())
    } else {
      Err(Error::Validation(format!(
        "missing required fields: {}",
        missing.join(", ")
      )))
    }
  }
}

impl fmt::Display for Slot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}/{}/{}/{}",
      self.academic_year, self.semester, self.section, self.department
    )
  }
}

// ─── Assignment ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
  pub academic_year: String,
  pub semester:      String,
  pub section:       String,
  /// Copied from the owner's own department at assignment time.
  pub department:    String,
  pub assigned_at:   DateTime<Utc>,
}

impl Assignment {
  pub fn new(slot: &Slot, department: impl Into<String>) -> Self {
    Self {
      academic_year: slot.academic_year.clone(),
      semester:      slot.semester.clone(),
      section:       slot.section.clone(),
      department:    department.into(),
      assigned_at:   Utc::now(),
    }
  }

  /// Exact (academic year, semester, section) equality; department is
  /// compared separately.
  pub fn same_period(&self, slot: &Slot) -> bool {
    self.academic_year == slot.academic_year
      && self.semester == slot.semester
      && self.section == slot.section
  }
}

// ─── Faculty ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Faculty {
  pub id:             Uuid,
  pub employee_id:    String,
  pub name:           String,
  /// Free text, not a foreign key.
  pub department:     String,
  #[serde(flatten)]
  pub role:           Role,
  pub cc_assignments: Vec<Assignment>,
  /// Optimistic-concurrency counter; bumped by every successful save.
  #[serde(skip)]
  pub version:        u64,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

impl Faculty {
  /// Build a fresh, unsaved record from `input`.
  pub fn from_new(input: NewFaculty) -> Self {
    let now = Utc::now();
    Self {
      id:             Uuid::new_v4(),
      employee_id:    input.employee_id,
      name:           input.name,
      department:     input.department,
      role:           input.role,
      cc_assignments: Vec::new(),
      version:        0,
      created_at:     now,
      updated_at:     now,
    }
  }

  pub fn holds(&self, claims: impl Fn(&Assignment) -> bool) -> bool {
    self.cc_assignments.iter().any(claims)
  }

  /// Drop every assignment matching `claims`; returns how many were removed.
  pub fn remove_assignments(
    &mut self,
    claims: impl Fn(&Assignment) -> bool,
  ) -> usize {
    let before = self.cc_assignments.len();
    self.cc_assignments.retain(|a| !claims(a));
    before - self.cc_assignments.len()
  }
}

/// Input to [`crate::directory::FacultyDirectory::create`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFaculty {
  pub employee_id: String,
  pub name:        String,
  pub department:  String,
  #[serde(default)]
  pub role:        Role,
}

impl NewFaculty {
  /// A teaching faculty member in `department`.
  pub fn teaching(
    employee_id: impl Into<String>,
    name: impl Into<String>,
    department: impl Into<String>,
  ) -> Self {
    Self {
      employee_id: employee_id.into(),
      name:        name.into(),
      department:  department.into(),
      role:        Role::Teaching,
    }
  }

  pub fn with_role(mut self, role: Role) -> Self {
    self.role = role;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn validate_names_every_blank_field() {
    let slot = Slot::new("2025-2026", " ", "", "Civil");
    let err = slot.validate().unwrap_err();
    assert!(
      matches!(err, Error::Validation(ref m) if m.contains("semester") && m.contains("section")),
      "{err}"
    );
    assert!(Slot::new("2025-2026", "5", "B", "Civil").validate().is_ok());
  }

  #[test]
  fn faculty_json_shape() {
    let mut f = Faculty::from_new(NewFaculty::teaching(
      "E-7",
      "Asha Rao",
      "Electronics Engineering",
    ));
    f.cc_assignments.push(Assignment::new(
      &Slot::new("2025-2026", "5", "B", "ignored"),
      f.department.clone(),
    ));
    f.role = Role::Cc;

    let json = serde_json::to_value(&f).unwrap();
    assert_eq!(json["employeeId"], "E-7");
    assert_eq!(json["type"], "cc");
    assert_eq!(json["role"], "cc");
    assert!(json.get("version").is_none());
    assert_eq!(
      json["ccAssignments"][0]["department"],
      "Electronics Engineering"
    );
    assert_eq!(json["ccAssignments"][0]["academicYear"], "2025-2026");
  }

  #[test]
  fn remove_assignments_counts_removed() {
    let mut f = Faculty::from_new(NewFaculty::teaching("E-1", "A", "Civil"));
    let slot = Slot::new("2025-2026", "5", "B", "Civil");
    f.cc_assignments.push(Assignment::new(&slot, "Civil"));
    f.cc_assignments.push(Assignment::new(&slot, "Civil"));
    f.cc_assignments.push(Assignment::new(
      &Slot::new("2025-2026", "5", "A", "Civil"),
      "Civil",
    ));

    assert!(f.holds(|a| a.same_period(&slot)));
    assert_eq!(f.remove_assignments(|a| a.same_period(&slot)), 2);
    assert_eq!(f.cc_assignments.len(), 1);
    assert!(!f.holds(|a| a.same_period(&slot)));
  }
}
