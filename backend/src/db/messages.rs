use super::now;
use crate::error::AppError;
use common::model::ContactMessage;
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, name, email, phone, subject, message, is_read, created_at";

#[derive(Debug, Clone, PartialEq)]
pub struct MessageFields {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<ContactMessage> {
    Ok(ContactMessage {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        subject: row.get("subject")?,
        message: row.get("message")?,
        is_read: row.get("is_read")?,
        created_at: row.get("created_at")?,
    })
}

pub fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<ContactMessage>> {
    conn.query_row(
        &format!("SELECT {} FROM contact_messages WHERE id = ?1", COLUMNS),
        [id],
        map_row,
    )
    .optional()
}

pub fn get(conn: &Connection, id: i64) -> Result<ContactMessage, AppError> {
    find(conn, id)?.ok_or_else(|| AppError::not_found("message"))
}

pub fn list(conn: &Connection, limit: Option<u32>) -> rusqlite::Result<Vec<ContactMessage>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM contact_messages ORDER BY created_at DESC, id DESC LIMIT ?1",
        COLUMNS
    ))?;
    let limit = limit.map(i64::from).unwrap_or(-1);
    let rows = stmt.query_map([limit], map_row)?;
    rows.collect()
}

pub fn count_unread(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM contact_messages WHERE is_read = 0",
        [],
        |row| row.get(0),
    )
}

pub fn insert(conn: &Connection, fields: &MessageFields) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO contact_messages (name, email, phone, subject, message, is_read, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
        params![
            fields.name,
            fields.email,
            fields.phone,
            fields.subject,
            fields.message,
            now(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// One-way: there is no way back to unread.
pub fn mark_read(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE contact_messages SET is_read = 1 WHERE id = ?1 AND is_read = 0",
        [id],
    )
}
