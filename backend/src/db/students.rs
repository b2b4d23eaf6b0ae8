use super::{escape_like, like_pattern, now, page_window, Paginated};
use crate::error::AppError;
use chrono::NaiveDate;
use common::model::{Student, DEFAULT_AVATAR};
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, student_id, full_name, email, phone, password_hash, grade, avatar, \
                       parent_name, parent_phone, address, date_of_birth, is_active, created_at";

/// Profile fields an administrator may set. Identity and password are
/// managed separately.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentFields {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub grade: i64,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get("id")?,
        student_id: row.get("student_id")?,
        full_name: row.get("full_name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        password_hash: row.get("password_hash")?,
        grade: row.get("grade")?,
        avatar: row
            .get::<_, Option<String>>("avatar")?
            .unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
        parent_name: row.get("parent_name")?,
        parent_phone: row.get("parent_phone")?,
        address: row.get("address")?,
        date_of_birth: row.get("date_of_birth")?,
        is_active: row.get("is_active")?,
        created_at: row.get("created_at")?,
    })
}

/// Looks a student up by surrogate id, active or not.
pub fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<Student>> {
    conn.query_row(
        &format!("SELECT {} FROM students WHERE id = ?1", COLUMNS),
        [id],
        map_row,
    )
    .optional()
}

pub fn get(conn: &Connection, id: i64) -> Result<Student, AppError> {
    find(conn, id)?.ok_or_else(|| AppError::not_found("student"))
}

/// Login lookup: only active students may sign in.
pub fn find_active_by_student_id(
    conn: &Connection,
    student_id: &str,
) -> rusqlite::Result<Option<Student>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM students WHERE student_id = ?1 AND is_active = 1",
            COLUMNS
        ),
        [student_id],
        map_row,
    )
    .optional()
}

/// Whether `email` belongs to a student other than `except_id`.
pub fn email_taken(conn: &Connection, email: &str, except_id: Option<i64>) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM students WHERE email = ?1 COLLATE NOCASE AND id != ?2)",
        params![email, except_id.unwrap_or(-1)],
        |row| row.get(0),
    )
}

/// Next free id of the form `PREFIX-YEAR-NNN` for the given year.
///
/// The sequence is the highest numeric suffix already issued for that
/// prefix and year plus one, so it restarts at `001` every year.
pub fn next_student_id(conn: &Connection, prefix: &str, year: i32) -> rusqlite::Result<String> {
    let head = format!("{}-{}-", prefix, year);
    let mut stmt =
        conn.prepare("SELECT student_id FROM students WHERE student_id LIKE ?1 ESCAPE '\\'")?;
    let pattern = format!("{}%", escape_like(&head));
    let highest = stmt
        .query_map([pattern], |row| row.get::<_, String>(0))?
        .filter_map(Result::ok)
        .filter_map(|sid| sid.strip_prefix(&head).and_then(|n| n.parse::<u32>().ok()))
        .max()
        .unwrap_or(0);
    Ok(format!("{}{:03}", head, highest + 1))
}

pub fn insert(
    conn: &Connection,
    student_id: &str,
    fields: &StudentFields,
    password_hash: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO students (student_id, full_name, email, phone, password_hash, grade, \
         parent_name, parent_phone, address, date_of_birth, is_active, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 1, ?11)",
        params![
            student_id,
            fields.full_name,
            fields.email,
            fields.phone,
            password_hash,
            fields.grade,
            fields.parent_name,
            fields.parent_phone,
            fields.address,
            fields.date_of_birth,
            now(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(conn: &Connection, id: i64, fields: &StudentFields) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE students SET full_name = ?1, email = ?2, phone = ?3, grade = ?4, \
         parent_name = ?5, parent_phone = ?6, address = ?7, date_of_birth = ?8 WHERE id = ?9",
        params![
            fields.full_name,
            fields.email,
            fields.phone,
            fields.grade,
            fields.parent_name,
            fields.parent_phone,
            fields.address,
            fields.date_of_birth,
            id,
        ],
    )
}

/// Fields a student may change about themselves.
pub fn update_contact(
    conn: &Connection,
    id: i64,
    phone: Option<&str>,
    address: Option<&str>,
    avatar: Option<&str>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE students SET phone = ?1, address = ?2, avatar = COALESCE(?3, avatar) WHERE id = ?4",
        params![phone, address, avatar, id],
    )
}

pub fn set_password(conn: &Connection, id: i64, password_hash: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE students SET password_hash = ?1 WHERE id = ?2",
        params![password_hash, id],
    )
}

pub fn deactivate(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("UPDATE students SET is_active = 0 WHERE id = ?1", [id])
}

/// Active students, newest first, optionally narrowed by a name / student-id
/// fragment and a grade.
pub fn list_active(
    conn: &Connection,
    search: Option<&str>,
    grade: Option<i64>,
    page: Option<u32>,
    per_page: u32,
) -> rusqlite::Result<Paginated<Student>> {
    let search = search.map(str::trim).filter(|s| !s.is_empty()).map(like_pattern);
    let grade = grade.filter(|g| *g != 0);
    let filter = "is_active = 1 \
                  AND (?1 IS NULL OR full_name LIKE ?1 ESCAPE '\\' OR student_id LIKE ?1 ESCAPE '\\') \
                  AND (?2 IS NULL OR grade = ?2)";

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM students WHERE {}", filter),
        params![search, grade],
        |row| row.get(0),
    )?;

    let (page, offset) = page_window(page, per_page);
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM students WHERE {} ORDER BY created_at DESC, id DESC LIMIT ?3 OFFSET ?4",
        COLUMNS, filter
    ))?;
    let items = stmt
        .query_map(params![search, grade, per_page, offset], map_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Paginated::new(items, page, per_page, total))
}

pub fn recent_active(conn: &Connection, limit: u32) -> rusqlite::Result<Vec<Student>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM students WHERE is_active = 1 ORDER BY created_at DESC, id DESC LIMIT ?1",
        COLUMNS
    ))?;
    let rows = stmt.query_map([limit], map_row)?;
    rows.collect()
}

/// Every active student, used to fill pickers.
pub fn all_active(conn: &Connection) -> rusqlite::Result<Vec<Student>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM students WHERE is_active = 1 ORDER BY student_id",
        COLUMNS
    ))?;
    let rows = stmt.query_map([], map_row)?;
    rows.collect()
}

pub fn count_active(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM students WHERE is_active = 1",
        [],
        |row| row.get(0),
    )
}

/// Active students of `grade` not yet enrolled in `batch_id`.
pub fn available_for_batch(
    conn: &Connection,
    grade: i64,
    batch_id: i64,
) -> rusqlite::Result<Vec<Student>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM students WHERE is_active = 1 AND grade = ?1 \
         AND id NOT IN (SELECT student_id FROM batch_enrollments WHERE batch_id = ?2) \
         ORDER BY full_name",
        COLUMNS
    ))?;
    let rows = stmt.query_map(params![grade, batch_id], map_row)?;
    rows.collect()
}

/// Students currently enrolled in `batch_id`, active or not.
pub fn enrolled_in_batch(conn: &Connection, batch_id: i64) -> rusqlite::Result<Vec<Student>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM students WHERE id IN \
         (SELECT student_id FROM batch_enrollments WHERE batch_id = ?1) ORDER BY full_name",
        COLUMNS
    ))?;
    let rows = stmt.query_map([batch_id], map_row)?;
    rows.collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn fields(name: &str, email: &str, grade: i64) -> StudentFields {
        StudentFields {
            full_name: name.to_string(),
            email: email.to_string(),
            phone: None,
            grade,
            parent_name: None,
            parent_phone: None,
            address: None,
            date_of_birth: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::fields;
    use super::*;
    use crate::db::test_support::temp_db;

    #[test]
    fn student_ids_continue_from_the_highest_suffix_of_the_year() {
        let (_dir, db) = temp_db();
        let conn = db.connect().unwrap();

        assert_eq!(next_student_id(&conn, "MPC", 2026).unwrap(), "MPC-2026-001");

        insert(&conn, "MPC-2026-001", &fields("A", "a@x.io", 9), "h").unwrap();
        insert(&conn, "MPC-2026-007", &fields("B", "b@x.io", 9), "h").unwrap();
        insert(&conn, "MPC-2025-042", &fields("C", "c@x.io", 9), "h").unwrap();

        assert_eq!(next_student_id(&conn, "MPC", 2026).unwrap(), "MPC-2026-008");
        assert_eq!(next_student_id(&conn, "MPC", 2027).unwrap(), "MPC-2027-001");
    }

    #[test]
    fn deactivated_students_leave_listings_but_stay_readable() {
        let (_dir, db) = temp_db();
        let conn = db.connect().unwrap();
        let id = insert(&conn, "MPC-2026-001", &fields("Asha", "asha@x.io", 10), "h").unwrap();

        assert_eq!(list_active(&conn, None, None, None, 15).unwrap().total, 1);
        deactivate(&conn, id).unwrap();

        assert_eq!(list_active(&conn, None, None, None, 15).unwrap().total, 0);
        assert_eq!(count_active(&conn).unwrap(), 0);
        let student = find(&conn, id).unwrap().unwrap();
        assert!(!student.is_active);
        assert!(find_active_by_student_id(&conn, "MPC-2026-001").unwrap().is_none());
    }

    #[test]
    fn listing_filters_by_search_and_grade() {
        let (_dir, db) = temp_db();
        let conn = db.connect().unwrap();
        insert(&conn, "MPC-2026-001", &fields("Asha Rao", "a@x.io", 10), "h").unwrap();
        insert(&conn, "MPC-2026-002", &fields("Ben Ode", "b@x.io", 11), "h").unwrap();

        let by_name = list_active(&conn, Some("asha"), None, None, 15).unwrap();
        assert_eq!(by_name.items.len(), 1);
        assert_eq!(by_name.items[0].full_name, "Asha Rao");

        let by_id = list_active(&conn, Some("2026-002"), None, None, 15).unwrap();
        assert_eq!(by_id.items[0].full_name, "Ben Ode");

        let by_grade = list_active(&conn, None, Some(11), None, 15).unwrap();
        assert_eq!(by_grade.total, 1);
    }

    #[test]
    fn email_check_ignores_the_student_being_edited() {
        let (_dir, db) = temp_db();
        let conn = db.connect().unwrap();
        let id = insert(&conn, "MPC-2026-001", &fields("A", "a@x.io", 9), "h").unwrap();

        assert!(email_taken(&conn, "A@X.io", None).unwrap());
        assert!(!email_taken(&conn, "a@x.io", Some(id)).unwrap());
    }
}
