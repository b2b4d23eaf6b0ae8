use super::now;
use crate::error::AppError;
use chrono::NaiveDateTime;
use common::model::Announcement;
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str =
    "id, title, content, category, priority, target_grade, is_active, created_at, expires_at";

#[derive(Debug, Clone, PartialEq)]
pub struct AnnouncementFields {
    pub title: String,
    pub content: String,
    pub category: String,
    pub priority: String,
    pub target_grade: Option<i64>,
    pub expires_at: Option<NaiveDateTime>,
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Announcement> {
    Ok(Announcement {
        id: row.get("id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        category: row.get("category")?,
        priority: row.get("priority")?,
        target_grade: row.get("target_grade")?,
        is_active: row.get("is_active")?,
        created_at: row.get("created_at")?,
        expires_at: row.get("expires_at")?,
    })
}

pub fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<Announcement>> {
    conn.query_row(
        &format!("SELECT {} FROM announcements WHERE id = ?1", COLUMNS),
        [id],
        map_row,
    )
    .optional()
}

pub fn get(conn: &Connection, id: i64) -> Result<Announcement, AppError> {
    find(conn, id)?.ok_or_else(|| AppError::not_found("announcement"))
}

pub fn list_all(conn: &Connection) -> rusqlite::Result<Vec<Announcement>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM announcements ORDER BY created_at DESC, id DESC",
        COLUMNS
    ))?;
    let rows = stmt.query_map([], map_row)?;
    rows.collect()
}

/// Newest active announcements. With `grade`, only those addressed to every
/// grade or to that grade. `expires_at` is deliberately not consulted.
pub fn recent_active(
    conn: &Connection,
    grade: Option<i64>,
    limit: u32,
) -> rusqlite::Result<Vec<Announcement>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM announcements WHERE is_active = 1 \
         AND (?1 IS NULL OR target_grade IS NULL OR target_grade = ?1) \
         ORDER BY created_at DESC, id DESC LIMIT ?2",
        COLUMNS
    ))?;
    let rows = stmt.query_map(params![grade, limit], map_row)?;
    rows.collect()
}

pub fn count_active(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM announcements WHERE is_active = 1",
        [],
        |row| row.get(0),
    )
}

pub fn insert(conn: &Connection, fields: &AnnouncementFields) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO announcements (title, content, category, priority, target_grade, is_active, \
         created_at, expires_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?7)",
        params![
            fields.title,
            fields.content,
            fields.category,
            fields.priority,
            fields.target_grade,
            now(),
            fields.expires_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(conn: &Connection, id: i64, fields: &AnnouncementFields) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE announcements SET title = ?1, content = ?2, category = ?3, priority = ?4, \
         target_grade = ?5, expires_at = ?6 WHERE id = ?7",
        params![
            fields.title,
            fields.content,
            fields.category,
            fields.priority,
            fields.target_grade,
            fields.expires_at,
            id,
        ],
    )
}

pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM announcements WHERE id = ?1", [id])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_db;

    fn fields(title: &str, target_grade: Option<i64>) -> AnnouncementFields {
        AnnouncementFields {
            title: title.to_string(),
            content: "body".to_string(),
            category: "general".to_string(),
            priority: "normal".to_string(),
            target_grade,
            expires_at: None,
        }
    }

    #[test]
    fn grade_filter_keeps_untargeted_and_matching_announcements() {
        let (_dir, db) = temp_db();
        let conn = db.connect().unwrap();
        insert(&conn, &fields("everyone", None)).unwrap();
        insert(&conn, &fields("tenth", Some(10))).unwrap();
        insert(&conn, &fields("twelfth", Some(12))).unwrap();

        let mut titles: Vec<String> = recent_active(&conn, Some(10), 5)
            .unwrap()
            .into_iter()
            .map(|a| a.title)
            .collect();
        titles.sort();
        assert_eq!(titles, vec!["everyone", "tenth"]);
        assert_eq!(recent_active(&conn, None, 5).unwrap().len(), 3);
    }

    #[test]
    fn expired_announcements_are_still_listed() {
        let (_dir, db) = temp_db();
        let conn = db.connect().unwrap();
        let mut expired = fields("old", None);
        expired.expires_at = NaiveDateTime::parse_from_str("2000-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").ok();
        insert(&conn, &expired).unwrap();

        assert_eq!(recent_active(&conn, Some(9), 5).unwrap().len(), 1);
    }
}
