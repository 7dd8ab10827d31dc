use rusqlite::{params, OptionalExtension};

use crate::db::models::Face;
use crate::error::AppResult;
use crate::state::DbPool;

/// Write a face record keyed by its object name.
pub fn put_face(db: &DbPool, face: &Face) -> AppResult<()> {
    let conn = db.get()?;
    conn.execute(
        "INSERT OR REPLACE INTO faces (blob_name, image_public_url, timestamp, joy)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            &face.blob_name,
            &face.image_public_url,
            &face.timestamp,
            &face.joy
        ],
    )?;
    Ok(())
}

pub fn find_face(db: &DbPool, blob_name: &str) -> AppResult<Option<Face>> {
    let conn = db.get()?;
    let face = conn
        .query_row(
            "SELECT blob_name, image_public_url, timestamp, joy FROM faces WHERE blob_name = ?1",
            params![blob_name],
            |row| {
                Ok(Face {
                    blob_name: row.get(0)?,
                    image_public_url: row.get(1)?,
                    timestamp: row.get(2)?,
                    joy: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(face)
}

pub fn count_faces(db: &DbPool) -> AppResult<u64> {
    let conn = db.get()?;
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM faces", [], |row| row.get(0))?;
    Ok(count as u64)
}
