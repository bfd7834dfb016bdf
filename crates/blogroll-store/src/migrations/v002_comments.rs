use rusqlite::Connection;

// AUTOINCREMENT so ids never get reused and `ORDER BY id` is insertion order.
const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS comments (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    blogpost_id TEXT NOT NULL,                -- UUID v4, FK -> blogposts(id)
    content     TEXT NOT NULL,
    created_at  TEXT NOT NULL,

    FOREIGN KEY (blogpost_id) REFERENCES blogposts(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_comments_blogpost_id ON comments(blogpost_id, id);
"#;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
