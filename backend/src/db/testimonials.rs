use super::now;
use crate::error::AppError;
use common::model::Testimonial;
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str =
    "id, student_name, content, rating, grade, photo, is_featured, is_active, created_at";

#[derive(Debug, Clone, PartialEq)]
pub struct TestimonialFields {
    pub student_name: String,
    pub content: String,
    pub rating: i64,
    pub grade: Option<String>,
    pub is_featured: bool,
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Testimonial> {
    Ok(Testimonial {
        id: row.get("id")?,
        student_name: row.get("student_name")?,
        content: row.get("content")?,
        rating: row.get("rating")?,
        grade: row.get("grade")?,
        photo: row.get("photo")?,
        is_featured: row.get("is_featured")?,
        is_active: row.get("is_active")?,
        created_at: row.get("created_at")?,
    })
}

pub fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<Testimonial>> {
    conn.query_row(
        &format!("SELECT {} FROM testimonials WHERE id = ?1", COLUMNS),
        [id],
        map_row,
    )
    .optional()
}

pub fn get(conn: &Connection, id: i64) -> Result<Testimonial, AppError> {
    find(conn, id)?.ok_or_else(|| AppError::not_found("testimonial"))
}

pub fn list_all(conn: &Connection) -> rusqlite::Result<Vec<Testimonial>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM testimonials ORDER BY created_at DESC, id DESC",
        COLUMNS
    ))?;
    let rows = stmt.query_map([], map_row)?;
    rows.collect()
}

pub fn list_active(conn: &Connection) -> rusqlite::Result<Vec<Testimonial>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM testimonials WHERE is_active = 1 ORDER BY created_at DESC, id DESC",
        COLUMNS
    ))?;
    let rows = stmt.query_map([], map_row)?;
    rows.collect()
}

/// Featured testimonials for the home page.
pub fn featured(conn: &Connection, limit: u32) -> rusqlite::Result<Vec<Testimonial>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM testimonials WHERE is_active = 1 AND is_featured = 1 \
         ORDER BY created_at DESC, id DESC LIMIT ?1",
        COLUMNS
    ))?;
    let rows = stmt.query_map([limit], map_row)?;
    rows.collect()
}

pub fn insert(
    conn: &Connection,
    fields: &TestimonialFields,
    photo: Option<&str>,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO testimonials (student_name, content, rating, grade, photo, is_featured, \
         is_active, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)",
        params![
            fields.student_name,
            fields.content,
            fields.rating,
            fields.grade,
            photo,
            fields.is_featured,
            now(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(
    conn: &Connection,
    id: i64,
    fields: &TestimonialFields,
    photo: Option<&str>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE testimonials SET student_name = ?1, content = ?2, rating = ?3, grade = ?4, \
         is_featured = ?5, photo = COALESCE(?6, photo) WHERE id = ?7",
        params![
            fields.student_name,
            fields.content,
            fields.rating,
            fields.grade,
            fields.is_featured,
            photo,
            id,
        ],
    )
}

pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM testimonials WHERE id = ?1", [id])
}
