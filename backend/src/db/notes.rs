use super::now;
use crate::error::AppError;
use common::model::Note;
use rusqlite::{params, Connection, OptionalExtension, Row};

const SELECT: &str = "SELECT n.id, n.title, n.subject_id, s.name AS subject_name, n.grade, \
                      n.chapter, n.filename, n.file_size, n.uploaded_at, n.is_active \
                      FROM notes n LEFT JOIN subjects s ON s.id = n.subject_id";

#[derive(Debug, Clone, PartialEq)]
pub struct NoteFields {
    pub title: String,
    pub subject_id: i64,
    pub grade: i64,
    pub chapter: Option<String>,
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get("id")?,
        title: row.get("title")?,
        subject_id: row.get("subject_id")?,
        subject_name: row.get("subject_name")?,
        grade: row.get("grade")?,
        chapter: row.get("chapter")?,
        filename: row.get("filename")?,
        file_size: row.get("file_size")?,
        uploaded_at: row.get("uploaded_at")?,
        is_active: row.get("is_active")?,
    })
}

pub fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<Note>> {
    conn.query_row(&format!("{} WHERE n.id = ?1", SELECT), [id], map_row)
        .optional()
}

pub fn get(conn: &Connection, id: i64) -> Result<Note, AppError> {
    find(conn, id)?.ok_or_else(|| AppError::not_found("note"))
}

/// Active notes, newest upload first.
pub fn list_active(conn: &Connection) -> rusqlite::Result<Vec<Note>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE n.is_active = 1 ORDER BY n.uploaded_at DESC, n.id DESC",
        SELECT
    ))?;
    let rows = stmt.query_map([], map_row)?;
    rows.collect()
}

/// Active notes for one grade, grouped by subject then chapter.
pub fn for_grade(
    conn: &Connection,
    grade: i64,
    subject_id: Option<i64>,
) -> rusqlite::Result<Vec<Note>> {
    let subject_id = subject_id.filter(|s| *s != 0);
    let mut stmt = conn.prepare(&format!(
        "{} WHERE n.is_active = 1 AND n.grade = ?1 AND (?2 IS NULL OR n.subject_id = ?2) \
         ORDER BY n.subject_id, n.chapter, n.id",
        SELECT
    ))?;
    let rows = stmt.query_map(params![grade, subject_id], map_row)?;
    rows.collect()
}

pub fn insert(
    conn: &Connection,
    fields: &NoteFields,
    filename: &str,
    file_size: u64,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO notes (title, subject_id, grade, chapter, filename, file_size, uploaded_at, \
         is_active) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1)",
        params![
            fields.title,
            fields.subject_id,
            fields.grade,
            fields.chapter,
            filename,
            file_size as i64,
            now(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn deactivate(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("UPDATE notes SET is_active = 0 WHERE id = ?1", [id])
}
