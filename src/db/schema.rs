//! SQL DDL for the station catalogue and user accounts.
//! SQLite-first design; dates are stored as ISO-8601 TEXT so range
//! predicates compare lexicographically.

/// SQLite schema with:
/// - `stations` keyed by the externally assigned `staid`
/// - `files` referencing `stations` (nullable), indexed on `(staid, date)`
/// - `users` with UNIQUE `email` and `user_name`
/// - booleans stored as INTEGER 0/1
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS stations (
    staid INTEGER PRIMARY KEY,
    staname TEXT NOT NULL,
    longstaname TEXT NULL,
    network TEXT NULL,
    agency TEXT NULL,
    country TEXT NULL,
    receiver TEXT NULL,
    recvers TEXT NULL,
    recnum TEXT NULL,
    antenna TEXT NULL,
    antnum TEXT NULL,
    deltan REAL NULL,
    deltae REAL NULL,
    deltah REAL NULL,
    startdate TEXT NULL, -- YYYY-MM-DD
    enddate TEXT NULL,
    sta_daterange TEXT NULL
);

CREATE INDEX IF NOT EXISTS idx_stations_staname ON stations(staname COLLATE NOCASE);

CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    staid INTEGER NULL REFERENCES stations(staid) ON DELETE SET NULL,
    filename TEXT NOT NULL,
    date TEXT NOT NULL, -- YYYY-MM-DD
    period TEXT NULL,
    filetype TEXT NULL,
    path TEXT NOT NULL,
    fullness REAL NULL
);

CREATE INDEX IF NOT EXISTS idx_files_staid_date ON files(staid, date);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    user_name TEXT NOT NULL UNIQUE,
    organization TEXT NULL,
    password_hash TEXT NOT NULL, -- Argon2id PHC string
    start_date TEXT NOT NULL, -- RFC3339
    last_login TEXT NULL,
    is_active INTEGER NOT NULL DEFAULT 0,
    is_staff INTEGER NOT NULL DEFAULT 0,
    is_superuser INTEGER NOT NULL DEFAULT 0
)
"#;
