use crate::error::AppError;
use common::model::Subject;
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, name, code, description, icon, color, is_active";

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectFields {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Subject> {
    Ok(Subject {
        id: row.get("id")?,
        name: row.get("name")?,
        code: row.get("code")?,
        description: row.get("description")?,
        icon: row.get("icon")?,
        color: row.get("color")?,
        is_active: row.get("is_active")?,
    })
}

pub fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<Subject>> {
    conn.query_row(
        &format!("SELECT {} FROM subjects WHERE id = ?1", COLUMNS),
        [id],
        map_row,
    )
    .optional()
}

pub fn get(conn: &Connection, id: i64) -> Result<Subject, AppError> {
    find(conn, id)?.ok_or_else(|| AppError::not_found("subject"))
}

pub fn find_active_by_code(conn: &Connection, code: &str) -> rusqlite::Result<Option<Subject>> {
    conn.query_row(
        &format!("SELECT {} FROM subjects WHERE code = ?1 AND is_active = 1", COLUMNS),
        [code],
        map_row,
    )
    .optional()
}

pub fn code_taken(conn: &Connection, code: &str, except_id: Option<i64>) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM subjects WHERE code = ?1 AND id != ?2)",
        params![code, except_id.unwrap_or(-1)],
        |row| row.get(0),
    )
}

pub fn is_active(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM subjects WHERE id = ?1 AND is_active = 1)",
        [id],
        |row| row.get(0),
    )
}

pub fn list_active(conn: &Connection) -> rusqlite::Result<Vec<Subject>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM subjects WHERE is_active = 1 ORDER BY id",
        COLUMNS
    ))?;
    let rows = stmt.query_map([], map_row)?;
    rows.collect()
}

pub fn list_all(conn: &Connection) -> rusqlite::Result<Vec<Subject>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM subjects ORDER BY id", COLUMNS))?;
    let rows = stmt.query_map([], map_row)?;
    rows.collect()
}

pub fn count(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM subjects", [], |row| row.get(0))
}

pub fn insert(conn: &Connection, fields: &SubjectFields) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO subjects (name, code, description, icon, color, is_active) \
         VALUES (?1, ?2, ?3, ?4, ?5, 1)",
        params![
            fields.name,
            fields.code,
            fields.description,
            fields.icon,
            fields.color
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(conn: &Connection, id: i64, fields: &SubjectFields) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE subjects SET name = ?1, code = ?2, description = ?3, icon = ?4, color = ?5 \
         WHERE id = ?6",
        params![
            fields.name,
            fields.code,
            fields.description,
            fields.icon,
            fields.color,
            id
        ],
    )
}

pub fn deactivate(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("UPDATE subjects SET is_active = 0 WHERE id = ?1", [id])
}
