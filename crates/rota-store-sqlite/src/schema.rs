//! SQL schema for the Rota SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Assignments are owned by their faculty row and stored inline.
CREATE TABLE IF NOT EXISTS faculty (
    faculty_id      TEXT PRIMARY KEY,
    employee_id     TEXT NOT NULL UNIQUE,
    name            TEXT NOT NULL,
    department      TEXT NOT NULL,   -- free text, not a foreign key
    faculty_type    TEXT NOT NULL,   -- 'teaching' | 'non-teaching' | 'HOD' | 'principal' | 'cc'
    cc_assignments  TEXT NOT NULL DEFAULT '[]',  -- JSON array of Assignment
    version         INTEGER NOT NULL DEFAULT 0,  -- optimistic concurrency
    created_at      TEXT NOT NULL,   -- ISO 8601 UTC
    updated_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS faculty_type_idx ON faculty(faculty_type);

PRAGMA user_version = 1;
";
