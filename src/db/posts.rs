use rusqlite::params;
use serde_json::Value;

use crate::db::models::NewPost;
use crate::error::AppResult;
use crate::feed::RawRecord;
use crate::state::DbPool;

/// Columns handed to the feed, in select order.
const FEED_COLUMNS: &[&str] = &[
    "author_name",
    "date_added",
    "image_url",
    "description",
    "image_name",
    "labels",
];

/// Write a post record keyed by its image name.
pub fn put_post(db: &DbPool, post: &NewPost) -> AppResult<()> {
    let conn = db.get()?;
    conn.execute(
        "INSERT OR REPLACE INTO posts
         (image_name, author_email, author_name, image_url, description, labels, date_added)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            &post.image_name,
            &post.author_email,
            &post.author_name,
            &post.image_url,
            &post.description,
            &post.labels,
            &post.date_added,
        ],
    )?;
    Ok(())
}

/// All posts as raw records, newest first.
pub fn recent_posts(db: &DbPool) -> AppResult<Vec<RawRecord>> {
    let conn = db.get()?;
    let sql = format!(
        "SELECT {} FROM posts ORDER BY date_added DESC",
        FEED_COLUMNS.join(", ")
    );
    let mut stmt = conn.prepare(&sql)?;

    let records = stmt
        .query_map([], |row| {
            let mut record = RawRecord::new();
            for (i, column) in FEED_COLUMNS.iter().enumerate() {
                // NULLs are left out so the feed reports them as missing
                if let Some(value) = row.get::<_, Option<String>>(i)? {
                    record.insert(column.to_string(), Value::String(value));
                }
            }
            Ok(record)
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

pub fn count_posts(db: &DbPool) -> AppResult<u64> {
    let conn = db.get()?;
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
    Ok(count as u64)
}
