//! SQL schema for the BingoMap SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Emails compare with the default BINARY collation, i.e. case-sensitively.
CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

-- state_code is stored verbatim; it is not constrained to the 27 known codes.
CREATE TABLE IF NOT EXISTS state_viewers (
    id          TEXT PRIMARY KEY,
    state_code  TEXT NOT NULL,
    viewer_name TEXT NOT NULL,
    created_at  TEXT NOT NULL   -- fixed-width RFC 3339 UTC; server-assigned
);

CREATE INDEX IF NOT EXISTS state_viewers_created_idx ON state_viewers(created_at);

PRAGMA user_version = 1;
";
