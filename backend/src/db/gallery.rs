use super::now;
use crate::error::AppError;
use common::model::GalleryImage;
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, filename, thumbnail, caption, category, sort_order, is_active, uploaded_at";
const ORDER: &str = "ORDER BY sort_order, uploaded_at DESC, id DESC";

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryFields {
    pub filename: String,
    pub thumbnail: Option<String>,
    pub caption: Option<String>,
    pub category: String,
    pub sort_order: i64,
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<GalleryImage> {
    Ok(GalleryImage {
        id: row.get("id")?,
        filename: row.get("filename")?,
        thumbnail: row.get("thumbnail")?,
        caption: row.get("caption")?,
        category: row.get("category")?,
        sort_order: row.get("sort_order")?,
        is_active: row.get("is_active")?,
        uploaded_at: row.get("uploaded_at")?,
    })
}

pub fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<GalleryImage>> {
    conn.query_row(
        &format!("SELECT {} FROM gallery_images WHERE id = ?1", COLUMNS),
        [id],
        map_row,
    )
    .optional()
}

pub fn get(conn: &Connection, id: i64) -> Result<GalleryImage, AppError> {
    find(conn, id)?.ok_or_else(|| AppError::not_found("image"))
}

pub fn list_all(conn: &Connection) -> rusqlite::Result<Vec<GalleryImage>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM gallery_images {}", COLUMNS, ORDER))?;
    let rows = stmt.query_map([], map_row)?;
    rows.collect()
}

pub fn list_active(conn: &Connection) -> rusqlite::Result<Vec<GalleryImage>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM gallery_images WHERE is_active = 1 {}",
        COLUMNS, ORDER
    ))?;
    let rows = stmt.query_map([], map_row)?;
    rows.collect()
}

/// Distinct categories among active images.
pub fn active_categories(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT category FROM gallery_images WHERE is_active = 1 ORDER BY category",
    )?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    rows.collect()
}

pub fn insert(conn: &Connection, fields: &GalleryFields) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO gallery_images (filename, thumbnail, caption, category, sort_order, is_active, \
         uploaded_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
        params![
            fields.filename,
            fields.thumbnail,
            fields.caption,
            fields.category,
            fields.sort_order,
            now(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM gallery_images WHERE id = ?1", [id])
}
