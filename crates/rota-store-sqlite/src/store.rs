//! [`SqliteDirectory`]: the SQLite implementation of [`FacultyDirectory`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::debug;
use uuid::Uuid;

use rota_core::{
  department::DepartmentResolver,
  directory::FacultyDirectory,
  faculty::{Faculty, NewFaculty},
  role::Role,
};

use crate::{
  Error, Result,
  encode::{
    EncodedUpdate, FACULTY_COLUMNS, RawFaculty, decode_uuid, encode_assignments,
    encode_dt, encode_role, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A faculty directory backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteDirectory {
  conn: tokio_rusqlite::Connection,
}

/// Why a batch write was abandoned.
enum Rejected {
  Missing(String),
  Stale(String),
}

impl SqliteDirectory {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a `SELECT {FACULTY_COLUMNS} ...` with an optional single parameter.
  async fn query_faculty(
    &self,
    sql: String,
    param: Option<String>,
  ) -> Result<Vec<Faculty>> {
    let raws: Vec<RawFaculty> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = match param {
          Some(p) => stmt
            .query_map(rusqlite::params![p], RawFaculty::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
          None => stmt
            .query_map([], RawFaculty::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFaculty::into_faculty).collect()
  }
}

// ─── FacultyDirectory impl ───────────────────────────────────────────────────

impl FacultyDirectory for SqliteDirectory {
  type Error = Error;

  async fn create(&self, input: NewFaculty) -> Result<Faculty> {
    let faculty = Faculty::from_new(input);

    let id_str          = encode_uuid(faculty.id);
    let employee_id     = faculty.employee_id.clone();
    let name            = faculty.name.clone();
    let department      = faculty.department.clone();
    let type_str        = encode_role(faculty.role);
    let assignments_str = encode_assignments(&faculty.cc_assignments)?;
    let created_str     = encode_dt(faculty.created_at);
    let updated_str     = encode_dt(faculty.updated_at);

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO faculty (
             faculty_id, employee_id, name, department, faculty_type,
             cc_assignments, version, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8)",
          rusqlite::params![
            id_str,
            employee_id,
            name,
            department,
            type_str,
            assignments_str,
            created_str,
            updated_str,
          ],
        );
        match result {
          Ok(_) => Ok(true),
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
          {
            Ok(false)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::DuplicateEmployee(faculty.employee_id));
    }
    debug!(faculty = %faculty.id, employee_id = %faculty.employee_id, "created faculty");
    Ok(faculty)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Faculty>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawFaculty> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {FACULTY_COLUMNS} FROM faculty WHERE faculty_id = ?1"),
              rusqlite::params![id_str],
              RawFaculty::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFaculty::into_faculty).transpose()
  }

  async fn find_candidates_for_slot_cleanup<'a>(
    &'a self,
    resolver: &'a DepartmentResolver,
    variants: &'a [String],
    role: Option<Role>,
  ) -> Result<Vec<Faculty>> {
    // Loose department matching is not expressible in SQL; narrow by role
    // there and by department here.
    let (sql, param) = match role {
      Some(r) => (
        format!(
          "SELECT {FACULTY_COLUMNS} FROM faculty WHERE faculty_type = ?1
           ORDER BY created_at, faculty_id"
        ),
        Some(encode_role(r).to_owned()),
      ),
      None => (
        format!("SELECT {FACULTY_COLUMNS} FROM faculty ORDER BY created_at, faculty_id"),
        None,
      ),
    };

    let mut faculties = self.query_faculty(sql, param).await?;
    faculties.retain(|f| {
      variants
        .iter()
        .any(|v| resolver.loosely_equal(&f.department, v))
    });
    Ok(faculties)
  }

  async fn list_with_assignments(&self) -> Result<Vec<Faculty>> {
    let sql = format!(
      "SELECT {FACULTY_COLUMNS} FROM faculty WHERE cc_assignments != '[]'
       ORDER BY created_at, faculty_id"
    );
    let mut faculties = self.query_faculty(sql, None).await?;
    faculties.retain(|f| !f.cc_assignments.is_empty());
    Ok(faculties)
  }

  async fn save(&self, faculty: Faculty) -> Result<Faculty> {
    let id = faculty.id;
    self
      .save_all(vec![faculty])
      .await?
      .pop()
      .ok_or(Error::FacultyNotFound(id))
  }

  async fn save_all(&self, faculties: Vec<Faculty>) -> Result<Vec<Faculty>> {
    let now = Utc::now();
    let updates = faculties
      .iter()
      .map(|f| EncodedUpdate::new(f, now))
      .collect::<Result<Vec<_>>>()?;

    let rejected: Option<Rejected> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for u in &updates {
          let changed = tx.execute(
            "UPDATE faculty
             SET name = ?2, department = ?3, faculty_type = ?4,
                 cc_assignments = ?5, version = version + 1, updated_at = ?7
             WHERE faculty_id = ?1 AND version = ?6",
            rusqlite::params![
              u.faculty_id,
              u.name,
              u.department,
              u.faculty_type,
              u.cc_assignments,
              u.version,
              u.updated_at,
            ],
          )?;
          if changed == 0 {
            let exists = tx
              .query_row(
                "SELECT 1 FROM faculty WHERE faculty_id = ?1",
                rusqlite::params![u.faculty_id],
                |_| Ok(()),
              )
              .optional()?
              .is_some();
            // Dropping `tx` rolls back everything written so far.
            return Ok(Some(if exists {
              Rejected::Stale(u.faculty_id.clone())
            } else {
              Rejected::Missing(u.faculty_id.clone())
            }));
          }
        }
        tx.commit()?;
        Ok(None)
      })
      .await?;

    match rejected {
      Some(Rejected::Stale(id)) => {
        debug!(faculty = %id, batch = faculties.len(), "stale version; batch rolled back");
        Err(Error::Conflict(decode_uuid(&id)?))
      }
      Some(Rejected::Missing(id)) => {
        debug!(faculty = %id, batch = faculties.len(), "missing row; batch rolled back");
        Err(Error::FacultyNotFound(decode_uuid(&id)?))
      }
      None => Ok(
        faculties
          .into_iter()
          .map(|mut f| {
            f.version += 1;
            f.updated_at = now;
            f
          })
          .collect(),
      ),
    }
  }
}
