//! CRUD operations for [`Blogpost`] records, the author join and the
//! append-only comment list.

use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use crate::authors::author_from_row;
use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{
    Blogpost, BlogpostFilter, BlogpostUpdate, Comment, NewBlogpost, PopulatedBlogpost,
};

const POPULATED_COLUMNS: &str = "b.id, b.title, b.content, b.author_id, b.created_at,
        a.id, a.first_name, a.last_name, a.user_name, a.created_at";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new blogpost and return the stored record.
    ///
    /// The referenced author must exist; otherwise
    /// [`StoreError::UnknownAuthor`] is returned and nothing is written.
    pub fn create_blogpost(&self, new: NewBlogpost) -> Result<Blogpost> {
        new.validate()?;

        if !self.author_exists(new.author_id)? {
            return Err(StoreError::UnknownAuthor(new.author_id));
        }

        let blogpost = Blogpost {
            id: Uuid::new_v4(),
            title: new.title,
            content: new.content,
            author_id: new.author_id,
            created_at: Utc::now(),
        };

        self.conn()
            .execute(
                "INSERT INTO blogposts (id, title, content, author_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    blogpost.id.to_string(),
                    blogpost.title,
                    blogpost.content,
                    blogpost.author_id.to_string(),
                    blogpost.created_at.to_rfc3339(),
                ],
            )
            .map_err(StoreError::from_query)?;

        tracing::debug!(id = %blogpost.id, author_id = %blogpost.author_id, "blogpost created");
        Ok(blogpost)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single blogpost by UUID, without its author.
    pub fn get_blogpost(&self, id: Uuid) -> Result<Blogpost> {
        self.conn()
            .query_row(
                "SELECT id, title, content, author_id, created_at
                 FROM blogposts
                 WHERE id = ?1",
                params![id.to_string()],
                row_to_blogpost,
            )
            .map_err(StoreError::from_query)
    }

    /// List blogposts matching `filter`, oldest first.
    pub fn list_blogposts(&self, filter: &BlogpostFilter) -> Result<Vec<Blogpost>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, title, content, author_id, created_at
             FROM blogposts
             WHERE ?1 IS NULL OR author_id = ?1
             ORDER BY created_at ASC, rowid ASC",
        )?;

        let rows = stmt.query_map(
            params![filter.author_id.map(|id| id.to_string())],
            row_to_blogpost,
        )?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Resolve the author reference of an already loaded blogpost.
    pub fn populate(&self, blogpost: Blogpost) -> Result<PopulatedBlogpost> {
        let author = self.get_author(blogpost.author_id)?;
        Ok(PopulatedBlogpost { blogpost, author })
    }

    /// Fetch a blogpost joined with its author.
    pub fn get_populated_blogpost(&self, id: Uuid) -> Result<PopulatedBlogpost> {
        let sql = format!(
            "SELECT {POPULATED_COLUMNS}
             FROM blogposts b
             JOIN authors a ON a.id = b.author_id
             WHERE b.id = ?1"
        );
        self.conn()
            .query_row(&sql, params![id.to_string()], row_to_populated)
            .map_err(StoreError::from_query)
    }

    /// List blogposts matching `filter`, each joined with its author, in a
    /// single query.
    pub fn list_populated_blogposts(
        &self,
        filter: &BlogpostFilter,
    ) -> Result<Vec<PopulatedBlogpost>> {
        let sql = format!(
            "SELECT {POPULATED_COLUMNS}
             FROM blogposts b
             JOIN authors a ON a.id = b.author_id
             WHERE ?1 IS NULL OR b.author_id = ?1
             ORDER BY b.created_at ASC, b.rowid ASC"
        );
        let mut stmt = self.conn().prepare(&sql)?;

        let rows = stmt.query_map(
            params![filter.author_id.map(|id| id.to_string())],
            row_to_populated,
        )?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Replace only the fields present in `update`.
    pub fn update_blogpost(&self, id: Uuid, update: &BlogpostUpdate) -> Result<()> {
        update.validate()?;

        let affected = self.conn().execute(
            "UPDATE blogposts
             SET title   = COALESCE(?2, title),
                 content = COALESCE(?3, content)
             WHERE id = ?1",
            params![id.to_string(), update.title, update.content],
        )?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a blogpost (and its comments) by UUID.
    pub fn delete_blogpost(&self, id: Uuid) -> Result<()> {
        let affected = self
            .conn()
            .execute("DELETE FROM blogposts WHERE id = ?1", params![id.to_string()])?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    /// Append a comment to a blogpost.
    pub fn add_comment(&self, blogpost_id: Uuid, content: &str) -> Result<Comment> {
        crate::models::require("content", content)?;

        let affected = self.conn().execute(
            "INSERT INTO comments (blogpost_id, content, created_at)
             SELECT id, ?2, ?3 FROM blogposts WHERE id = ?1",
            params![blogpost_id.to_string(), content, Utc::now().to_rfc3339()],
        )?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(Comment {
            content: content.to_string(),
        })
    }

    /// Comments on a blogpost in the order they were added.
    pub fn list_comments(&self, blogpost_id: Uuid) -> Result<Vec<Comment>> {
        // Distinguish "no comments" from "no such blogpost".
        self.get_blogpost(blogpost_id)?;

        let mut stmt = self.conn().prepare(
            "SELECT content FROM comments
             WHERE blogpost_id = ?1
             ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![blogpost_id.to_string()], |row| {
            Ok(Comment {
                content: row.get(0)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_uuid_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_blogpost(row: &rusqlite::Row<'_>) -> rusqlite::Result<Blogpost> {
    let id = parse_uuid_column(row, 0)?;
    let title: String = row.get(1)?;
    let content: String = row.get(2)?;
    let author_id = parse_uuid_column(row, 3)?;
    let created_str: String = row.get(4)?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Blogpost {
        id,
        title,
        content,
        author_id,
        created_at,
    })
}

fn row_to_populated(row: &rusqlite::Row<'_>) -> rusqlite::Result<PopulatedBlogpost> {
    Ok(PopulatedBlogpost {
        blogpost: row_to_blogpost(row)?,
        author: author_from_row(row, 5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Author, NewAuthor};

    fn setup() -> (Database, Author) {
        let db = Database::open_in_memory().unwrap();
        let author = db
            .create_author(NewAuthor {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                user_name: "ada".to_string(),
            })
            .unwrap();
        (db, author)
    }

    fn post(author: &Author, title: &str) -> NewBlogpost {
        NewBlogpost {
            title: title.to_string(),
            content: "C".to_string(),
            author_id: author.id,
        }
    }

    #[test]
    fn create_then_populate() {
        let (db, author) = setup();
        let created = db.create_blogpost(post(&author, "T")).unwrap();

        let populated = db.get_populated_blogpost(created.id).unwrap();
        assert_eq!(populated.blogpost, created);
        assert_eq!(populated.author_name(), "Ada Lovelace");

        let serialized = populated.serialize();
        assert_eq!(serialized.id, created.id);
        assert_eq!(serialized.title, "T");
        assert_eq!(serialized.content, "C");
        assert_eq!(serialized.author, "Ada Lovelace");

        assert_eq!(db.populate(created).unwrap(), populated);
    }

    #[test]
    fn create_rejects_unknown_author() {
        let (db, _) = setup();
        let missing = Uuid::new_v4();
        let err = db
            .create_blogpost(NewBlogpost {
                title: "T".to_string(),
                content: "C".to_string(),
                author_id: missing,
            })
            .unwrap_err();

        assert!(matches!(err, StoreError::UnknownAuthor(id) if id == missing));
        assert!(db.list_blogposts(&BlogpostFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn create_rejects_empty_content() {
        let (db, author) = setup();
        let mut new = post(&author, "T");
        new.content.clear();

        assert!(matches!(
            db.create_blogpost(new),
            Err(StoreError::Validation { field: "content" })
        ));
        assert!(db.list_blogposts(&BlogpostFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn list_filters_by_author() {
        let (db, ada) = setup();
        let grace = db
            .create_author(NewAuthor {
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                user_name: "grace".to_string(),
            })
            .unwrap();

        db.create_blogpost(post(&ada, "first")).unwrap();
        db.create_blogpost(post(&grace, "second")).unwrap();
        db.create_blogpost(post(&ada, "third")).unwrap();

        let all = db
            .list_populated_blogposts(&BlogpostFilter::default())
            .unwrap();
        let titles: Vec<_> = all.iter().map(|p| p.blogpost.title.as_str()).collect();
        assert_eq!(titles, ["first", "second", "third"]);

        let only_ada = db
            .list_blogposts(&BlogpostFilter {
                author_id: Some(ada.id),
            })
            .unwrap();
        assert_eq!(only_ada.len(), 2);
        assert!(only_ada.iter().all(|b| b.author_id == ada.id));
    }

    #[test]
    fn update_replaces_only_supplied_fields() {
        let (db, author) = setup();
        let created = db.create_blogpost(post(&author, "T")).unwrap();

        db.update_blogpost(
            created.id,
            &BlogpostUpdate {
                content: Some("new body".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let fetched = db.get_blogpost(created.id).unwrap();
        assert_eq!(fetched.title, "T");
        assert_eq!(fetched.content, "new body");
        assert_eq!(fetched.author_id, author.id);
    }

    #[test]
    fn delete_twice_is_not_found() {
        let (db, author) = setup();
        let created = db.create_blogpost(post(&author, "T")).unwrap();

        db.delete_blogpost(created.id).unwrap();
        assert!(matches!(
            db.delete_blogpost(created.id),
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            db.get_populated_blogpost(created.id),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn comments_keep_insertion_order() {
        let (db, author) = setup();
        let created = db.create_blogpost(post(&author, "T")).unwrap();

        db.add_comment(created.id, "first").unwrap();
        db.add_comment(created.id, "second").unwrap();

        let contents: Vec<_> = db
            .list_comments(created.id)
            .unwrap()
            .into_iter()
            .map(|c| c.content)
            .collect();
        assert_eq!(contents, ["first", "second"]);
    }

    #[test]
    fn comment_on_missing_blogpost_is_not_found() {
        let (db, _) = setup();
        assert!(matches!(
            db.add_comment(Uuid::new_v4(), "hi"),
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            db.list_comments(Uuid::new_v4()),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn comments_are_removed_with_blogpost() {
        let (db, author) = setup();
        let created = db.create_blogpost(post(&author, "T")).unwrap();
        db.add_comment(created.id, "bye").unwrap();

        db.delete_blogpost(created.id).unwrap();

        let left: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM comments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(left, 0);
    }
}
