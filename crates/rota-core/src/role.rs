//! The role state machine.
//!
//! A faculty member holds exactly one [`Role`]. The external representation
//! splits it into a `type` label and an optional `role` marker; both are
//! derived from the single variant so they can never disagree.
//!
//! | Role          | `type`         | `role`      |
//! |---------------|----------------|-------------|
//! | `Teaching`    | `teaching`     | `null`      |
//! | `NonTeaching` | `non-teaching` | `null`      |
//! | `Hod`         | `HOD`          | `hod`       |
//! | `Principal`   | `principal`    | `principal` |
//! | `Cc`          | `cc`           | `cc`        |

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result, faculty::Faculty};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Role {
  #[default]
  #[strum(to_string = "teaching")]
  Teaching,
  #[strum(
    to_string = "non-teaching",
    serialize = "non_teaching",
    serialize = "nonteaching"
  )]
  NonTeaching,
  #[strum(to_string = "HOD")]
  Hod,
  #[strum(to_string = "principal")]
  Principal,
  #[strum(to_string = "cc")]
  Cc,
}

impl Role {
  /// The `type` label, e.g. `"non-teaching"` or `"HOD"`.
  pub fn type_label(self) -> &'static str { self.into() }

  /// The secondary `role` marker; `None` for plain staff.
  pub fn role_label(self) -> Option<&'static str> {
    match self {
      Self::Teaching | Self::NonTeaching => None,
      Self::Hod => Some("hod"),
      Self::Principal => Some("principal"),
      Self::Cc => Some("cc"),
    }
  }

  /// Parse a `type` label. Unknown labels yield `None`.
  pub fn from_type_label(label: &str) -> Option<Self> {
    label.trim().parse().ok()
  }

  /// Only plain teaching staff and existing coordinators may coordinate.
  pub fn can_coordinate(self) -> bool {
    matches!(self, Self::Teaching | Self::Cc)
  }
}

#[derive(Serialize)]
struct RolePair {
  #[serde(rename = "type")]
  kind: &'static str,
  role: Option<&'static str>,
}

impl Serialize for Role {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    RolePair {
      kind: self.type_label(),
      role: self.role_label(),
    }
    .serialize(serializer)
  }
}

/// Deserialises from a bare `type` label, e.g. `"HOD"`.
impl<'de> Deserialize<'de> for Role {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let label = String::deserialize(deserializer)?;
    Self::from_type_label(&label)
      .ok_or_else(|| de::Error::custom(format!("unknown faculty type {label:?}")))
  }
}

// ─── Transitions ─────────────────────────────────────────────────────────────

impl Faculty {
  /// `teaching | cc` → `cc`. Administrative and non-teaching staff are
  /// rejected.
  pub fn promote_to_cc(&mut self) -> Result<()> {
    if !self.role.can_coordinate() {
      return Err(Error::RoleNotEligible {
        faculty_id: self.id,
        role:       self.role,
      });
    }
    self.role = Role::Cc;
    Ok(())
  }

  pub fn demote_from_cc(&mut self) { self.role = Role::Teaching; }

  pub fn remove_hod(&mut self) -> Result<()> {
    self.step_down(Role::Hod)
  }

  pub fn remove_principal(&mut self) -> Result<()> {
    self.step_down(Role::Principal)
  }

  /// Applied when the last cc assignment is removed. A coordinator cannot be
  /// restored into `cc`; anything not in the allowed set falls back to
  /// `teaching`.
  pub fn restore_after_last_assignment_removed(
    &mut self,
    requested: Option<Role>,
  ) {
    self.role = match requested {
      Some(
        role @ (Role::Teaching | Role::NonTeaching | Role::Hod | Role::Principal),
      ) => role,
      _ => Role::Teaching,
    };
  }

  fn step_down(&mut self, expected: Role) -> Result<()> {
    if self.role != expected {
      return Err(Error::RoleMismatch {
        faculty_id: self.id,
        expected,
        actual: self.role,
      });
    }
    self.role = Role::Teaching;
    Ok(())
  }
}
