//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! migrations are run before any other operation.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::Connection;

use crate::error::{Result, StoreError};
use crate::migrations;

/// Wrapper around a [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the default application database.
    ///
    /// The database file is placed in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/blogroll/blogroll.db`
    /// - macOS:   `~/Library/Application Support/org.blogroll.blogroll/blogroll.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\blogroll\blogroll\data\blogroll.db`
    pub fn new() -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("org", "blogroll", "blogroll").ok_or(StoreError::NoDataDir)?;

        let data_dir = project_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        let db_path = data_dir.join("blogroll.db");

        Self::open_at(&db_path)
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        tracing::info!(path = %path.display(), "opening database");

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Self::prepare(conn)
    }

    /// Open a private in-memory database.  Everything is lost on close.
    pub fn open_in_memory() -> Result<Self> {
        tracing::info!("opening in-memory database");
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> Result<Self> {
        // Blogposts reference authors and comments reference blogposts.
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run_migrations(&conn)?;

        Ok(Self { conn })
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    ///
    /// Callers should prefer the typed CRUD helpers, but direct access is
    /// occasionally needed for transactions or ad-hoc queries.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn
            .path()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }

    /// Close the connection, reporting any error SQLite raises while
    /// finalizing it.
    pub fn close(self) -> Result<()> {
        let path = self.path();
        self.conn.close().map_err(|(_, e)| StoreError::Sqlite(e))?;
        tracing::info!(path = ?path, "database closed");
        Ok(())
    }
}
