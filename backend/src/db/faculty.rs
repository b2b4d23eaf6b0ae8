use crate::error::AppError;
use common::model::{Faculty, DEFAULT_AVATAR};
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, full_name, email, phone, qualification, experience, bio, photo, \
                       specialization, is_active, sort_order";

#[derive(Debug, Clone, PartialEq)]
pub struct FacultyFields {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub qualification: Option<String>,
    pub experience: Option<String>,
    pub bio: Option<String>,
    pub specialization: Option<String>,
    pub sort_order: i64,
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Faculty> {
    Ok(Faculty {
        id: row.get("id")?,
        full_name: row.get("full_name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        qualification: row.get("qualification")?,
        experience: row.get("experience")?,
        bio: row.get("bio")?,
        photo: row
            .get::<_, Option<String>>("photo")?
            .unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
        specialization: row.get("specialization")?,
        is_active: row.get("is_active")?,
        sort_order: row.get("sort_order")?,
    })
}

pub fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<Faculty>> {
    conn.query_row(
        &format!("SELECT {} FROM faculty WHERE id = ?1", COLUMNS),
        [id],
        map_row,
    )
    .optional()
}

pub fn get(conn: &Connection, id: i64) -> Result<Faculty, AppError> {
    find(conn, id)?.ok_or_else(|| AppError::not_found("faculty member"))
}

pub fn is_active(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM faculty WHERE id = ?1 AND is_active = 1)",
        [id],
        |row| row.get(0),
    )
}

/// Active faculty in their manual display order.
pub fn list_active(conn: &Connection) -> rusqlite::Result<Vec<Faculty>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM faculty WHERE is_active = 1 ORDER BY sort_order, id",
        COLUMNS
    ))?;
    let rows = stmt.query_map([], map_row)?;
    rows.collect()
}

pub fn list_all(conn: &Connection) -> rusqlite::Result<Vec<Faculty>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM faculty ORDER BY sort_order, id",
        COLUMNS
    ))?;
    let rows = stmt.query_map([], map_row)?;
    rows.collect()
}

/// Faculty assigned to active batches of `subject_id`.
pub fn teaching_subject(conn: &Connection, subject_id: i64) -> rusqlite::Result<Vec<Faculty>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM faculty WHERE id IN \
         (SELECT faculty_id FROM batches \
          WHERE subject_id = ?1 AND is_active = 1 AND faculty_id IS NOT NULL) \
         ORDER BY sort_order, id",
        COLUMNS
    ))?;
    let rows = stmt.query_map([subject_id], map_row)?;
    rows.collect()
}

pub fn count_active(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM faculty WHERE is_active = 1",
        [],
        |row| row.get(0),
    )
}

pub fn insert(conn: &Connection, fields: &FacultyFields, photo: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO faculty (full_name, email, phone, qualification, experience, bio, photo, \
         specialization, is_active, sort_order) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9)",
        params![
            fields.full_name,
            fields.email,
            fields.phone,
            fields.qualification,
            fields.experience,
            fields.bio,
            photo,
            fields.specialization,
            fields.sort_order,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Updates the profile; the photo is only replaced when `photo` is given.
pub fn update(
    conn: &Connection,
    id: i64,
    fields: &FacultyFields,
    photo: Option<&str>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE faculty SET full_name = ?1, email = ?2, phone = ?3, qualification = ?4, \
         experience = ?5, bio = ?6, specialization = ?7, sort_order = ?8, \
         photo = COALESCE(?9, photo) WHERE id = ?10",
        params![
            fields.full_name,
            fields.email,
            fields.phone,
            fields.qualification,
            fields.experience,
            fields.bio,
            fields.specialization,
            fields.sort_order,
            photo,
            id,
        ],
    )
}

pub fn deactivate(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("UPDATE faculty SET is_active = 0 WHERE id = ?1", [id])
}
