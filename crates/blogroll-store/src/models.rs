//! Record types persisted in the SQLite database, plus the input shapes used
//! to create and partially update them.
//!
//! Stored records derive `Serialize` and `Deserialize`; the public JSON shape
//! of a blogpost is the separate [`SerializedBlogpost`] projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, StoreError};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Parse a caller-supplied record identifier.
///
/// Identifiers are UUIDs assigned by the store; anything else can never name
/// a record and is rejected as [`StoreError::InvalidIdentifier`].
pub fn parse_record_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| StoreError::InvalidIdentifier(raw.to_string()))
}

/// Reject an empty required text field.
pub(crate) fn require(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(StoreError::Validation { field });
    }
    Ok(())
}

/// Reject a partial update that supplies a required field as `""`.
fn require_if_present(field: &'static str, value: Option<&str>) -> Result<()> {
    match value {
        Some(v) => require(field, v),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Author
// ---------------------------------------------------------------------------

/// A blog author.  `user_name` is unique across all authors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// Unique author identifier.
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Login-style handle, unique across all authors.
    pub user_name: String,
    /// When the author was created.
    pub created_at: DateTime<Utc>,
}

impl Author {
    /// `"first last"` with surrounding whitespace removed, so a missing
    /// name part does not leave a dangling space.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Fields required to create an [`Author`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
}

impl NewAuthor {
    pub fn validate(&self) -> Result<()> {
        require("firstName", &self.first_name)?;
        require("lastName", &self.last_name)?;
        require("userName", &self.user_name)
    }
}

/// Partial update of an [`Author`].  `None` leaves the stored value as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub user_name: Option<String>,
}

impl AuthorUpdate {
    pub fn validate(&self) -> Result<()> {
        require_if_present("firstName", self.first_name.as_deref())?;
        require_if_present("lastName", self.last_name.as_deref())?;
        require_if_present("userName", self.user_name.as_deref())
    }

    /// `true` when no field would change.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.user_name.is_none()
    }
}

// ---------------------------------------------------------------------------
// Blogpost
// ---------------------------------------------------------------------------

/// A stored blogpost.  The author is held by reference only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Blogpost {
    /// Unique blogpost identifier.
    pub id: Uuid,
    pub title: String,
    pub content: String,
    /// The referenced [`Author`]'s id.
    pub author_id: Uuid,
    /// When the blogpost was created.
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a [`Blogpost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlogpost {
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
}

impl NewBlogpost {
    pub fn validate(&self) -> Result<()> {
        require("title", &self.title)?;
        require("content", &self.content)
    }
}

/// Partial update of a [`Blogpost`].  Only these fields are mutable; the
/// author reference is fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogpostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl BlogpostUpdate {
    pub fn validate(&self) -> Result<()> {
        require_if_present("title", self.title.as_deref())?;
        require_if_present("content", self.content.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

/// Selection criteria for listing blogposts.  The default filter matches
/// every blogpost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlogpostFilter {
    pub author_id: Option<Uuid>,
}

/// A blogpost with its author reference resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulatedBlogpost {
    pub blogpost: Blogpost,
    pub author: Author,
}

impl PopulatedBlogpost {
    /// Derived from the joined author, never stored.
    pub fn author_name(&self) -> String {
        self.author.display_name()
    }

    /// Project into the external representation.
    pub fn serialize(&self) -> SerializedBlogpost {
        SerializedBlogpost {
            id: self.blogpost.id,
            title: self.blogpost.title.clone(),
            content: self.blogpost.content.clone(),
            author: self.author_name(),
        }
    }
}

/// External JSON shape of a blogpost: `{id, title, content, author}` where
/// `author` is the author's display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SerializedBlogpost {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: String,
}

// ---------------------------------------------------------------------------
// Comment
// ---------------------------------------------------------------------------

/// A comment on a blogpost.  Comments are append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub content: String,
}
