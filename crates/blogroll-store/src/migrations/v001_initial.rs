//! v001 -- Initial schema creation.
//!
//! Creates the two record tables: `authors` and `blogposts`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Authors
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS authors (
    id         TEXT PRIMARY KEY NOT NULL,     -- UUID v4
    first_name TEXT NOT NULL,
    last_name  TEXT NOT NULL,
    user_name  TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL                  -- ISO-8601 / RFC-3339
);

-- ----------------------------------------------------------------
-- Blogposts
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS blogposts (
    id         TEXT PRIMARY KEY NOT NULL,     -- UUID v4
    title      TEXT NOT NULL,
    content    TEXT NOT NULL,
    author_id  TEXT NOT NULL,                 -- FK -> authors(id)
    created_at TEXT NOT NULL,

    FOREIGN KEY (author_id) REFERENCES authors(id)
);

CREATE INDEX IF NOT EXISTS idx_blogposts_author_id ON blogposts(author_id);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
