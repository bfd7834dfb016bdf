//! CRUD operations for [`Author`] records.

use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{Author, AuthorUpdate, NewAuthor};

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new author and return the stored record.
    ///
    /// Fails with [`StoreError::Validation`] when a name field is empty and
    /// [`StoreError::Conflict`] when the user name is already taken.
    pub fn create_author(&self, new: NewAuthor) -> Result<Author> {
        new.validate()?;

        let author = Author {
            id: Uuid::new_v4(),
            first_name: new.first_name,
            last_name: new.last_name,
            user_name: new.user_name,
            created_at: Utc::now(),
        };

        self.conn()
            .execute(
                "INSERT INTO authors (id, first_name, last_name, user_name, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    author.id.to_string(),
                    author.first_name,
                    author.last_name,
                    author.user_name,
                    author.created_at.to_rfc3339(),
                ],
            )
            .map_err(StoreError::from_query)?;

        tracing::debug!(id = %author.id, user_name = %author.user_name, "author created");
        Ok(author)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single author by UUID.
    pub fn get_author(&self, id: Uuid) -> Result<Author> {
        self.conn()
            .query_row(
                "SELECT id, first_name, last_name, user_name, created_at
                 FROM authors
                 WHERE id = ?1",
                params![id.to_string()],
                row_to_author,
            )
            .map_err(StoreError::from_query)
    }

    /// List all authors, oldest first.
    pub fn list_authors(&self) -> Result<Vec<Author>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, first_name, last_name, user_name, created_at
             FROM authors
             ORDER BY created_at ASC, rowid ASC",
        )?;

        let rows = stmt.query_map([], row_to_author)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Whether an author with this id exists.
    pub fn author_exists(&self, id: Uuid) -> Result<bool> {
        let found: i64 = self.conn().query_row(
            "SELECT EXISTS(SELECT 1 FROM authors WHERE id = ?1)",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(found != 0)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Replace only the fields present in `update`.
    ///
    /// An empty update still verifies the author exists.
    pub fn update_author(&self, id: Uuid, update: &AuthorUpdate) -> Result<()> {
        update.validate()?;

        let affected = self
            .conn()
            .execute(
                "UPDATE authors
                 SET first_name = COALESCE(?2, first_name),
                     last_name  = COALESCE(?3, last_name),
                     user_name  = COALESCE(?4, user_name)
                 WHERE id = ?1",
                params![
                    id.to_string(),
                    update.first_name,
                    update.last_name,
                    update.user_name,
                ],
            )
            .map_err(StoreError::from_query)?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete an author together with every blogpost that references it.
    ///
    /// Both deletes run in one transaction, so a failure leaves the author
    /// and all of its blogposts in place.  Returns the number of blogposts
    /// removed.
    pub fn delete_author(&self, id: Uuid) -> Result<usize> {
        let tx = self.conn().unchecked_transaction()?;

        // Comments go with their blogposts (ON DELETE CASCADE).
        let removed_posts = tx.execute(
            "DELETE FROM blogposts WHERE author_id = ?1",
            params![id.to_string()],
        )?;
        let removed_authors =
            tx.execute("DELETE FROM authors WHERE id = ?1", params![id.to_string()])?;

        if removed_authors == 0 {
            // Dropping `tx` rolls back.
            return Err(StoreError::NotFound);
        }

        tx.commit()?;
        tracing::debug!(id = %id, removed_posts, "author deleted");
        Ok(removed_posts)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to an [`Author`], reading columns starting at
/// `offset` so joined queries can reuse it.
pub(crate) fn author_from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Author> {
    let id_str: String = row.get(offset)?;
    let first_name: String = row.get(offset + 1)?;
    let last_name: String = row.get(offset + 2)?;
    let user_name: String = row.get(offset + 3)?;
    let created_str: String = row.get(offset + 4)?;

    let id = Uuid::parse_str(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(offset, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                offset + 4,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;

    Ok(Author {
        id,
        first_name,
        last_name,
        user_name,
        created_at,
    })
}

fn row_to_author(row: &rusqlite::Row<'_>) -> rusqlite::Result<Author> {
    author_from_row(row, 0)
}
