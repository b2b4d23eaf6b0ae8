use super::now;
use common::model::AdminUser;
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, username, email, password_hash, full_name, is_superadmin, created_at";

fn map_row(row: &Row<'_>) -> rusqlite::Result<AdminUser> {
    Ok(AdminUser {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        full_name: row.get("full_name")?,
        is_superadmin: row.get("is_superadmin")?,
        created_at: row.get("created_at")?,
    })
}

pub fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<AdminUser>> {
    conn.query_row(
        &format!("SELECT {} FROM admin_users WHERE id = ?1", COLUMNS),
        [id],
        map_row,
    )
    .optional()
}

pub fn find_by_username(conn: &Connection, username: &str) -> rusqlite::Result<Option<AdminUser>> {
    conn.query_row(
        &format!("SELECT {} FROM admin_users WHERE username = ?1", COLUMNS),
        [username],
        map_row,
    )
    .optional()
}

pub fn insert(
    conn: &Connection,
    username: &str,
    email: &str,
    password_hash: &str,
    full_name: &str,
    is_superadmin: bool,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO admin_users (username, email, password_hash, full_name, is_superadmin, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![username, email, password_hash, full_name, is_superadmin, now()],
    )?;
    Ok(conn.last_insert_rowid())
}
