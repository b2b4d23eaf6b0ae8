use super::now;
use crate::error::AppError;
use chrono::NaiveDate;
use common::model::{Batch, BatchEnrollment};
use rusqlite::{params, Connection, OptionalExtension, Row};

const SELECT: &str = "SELECT b.id, b.name, b.subject_id, s.name AS subject_name, b.grade, \
                      b.faculty_id, f.full_name AS faculty_name, b.schedule, b.start_date, \
                      b.end_date, b.max_students, b.is_active, b.created_at \
                      FROM batches b \
                      LEFT JOIN subjects s ON s.id = b.subject_id \
                      LEFT JOIN faculty f ON f.id = b.faculty_id";

#[derive(Debug, Clone, PartialEq)]
pub struct BatchFields {
    pub name: String,
    pub subject_id: i64,
    pub grade: i64,
    pub faculty_id: Option<i64>,
    pub schedule: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub max_students: i64,
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Batch> {
    Ok(Batch {
        id: row.get("id")?,
        name: row.get("name")?,
        subject_id: row.get("subject_id")?,
        subject_name: row.get("subject_name")?,
        grade: row.get("grade")?,
        faculty_id: row.get("faculty_id")?,
        faculty_name: row.get("faculty_name")?,
        schedule: row.get("schedule")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        max_students: row.get("max_students")?,
        is_active: row.get("is_active")?,
        created_at: row.get("created_at")?,
    })
}

pub fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<Batch>> {
    conn.query_row(&format!("{} WHERE b.id = ?1", SELECT), [id], map_row)
        .optional()
}

pub fn get(conn: &Connection, id: i64) -> Result<Batch, AppError> {
    find(conn, id)?.ok_or_else(|| AppError::not_found("batch"))
}

/// Active batches, newest first.
pub fn list_active(conn: &Connection) -> rusqlite::Result<Vec<Batch>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE b.is_active = 1 ORDER BY b.created_at DESC, b.id DESC",
        SELECT
    ))?;
    let rows = stmt.query_map([], map_row)?;
    rows.collect()
}

pub fn list_active_for_subject(conn: &Connection, subject_id: i64) -> rusqlite::Result<Vec<Batch>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE b.is_active = 1 AND b.subject_id = ?1 ORDER BY b.grade, b.name",
        SELECT
    ))?;
    let rows = stmt.query_map([subject_id], map_row)?;
    rows.collect()
}

/// Active batches the student is enrolled in.
pub fn active_for_student(conn: &Connection, student_id: i64) -> rusqlite::Result<Vec<Batch>> {
    let mut stmt = conn.prepare(&format!(
        "{} JOIN batch_enrollments e ON e.batch_id = b.id \
         WHERE e.student_id = ?1 AND b.is_active = 1 ORDER BY e.enrolled_at, b.id",
        SELECT
    ))?;
    let rows = stmt.query_map([student_id], map_row)?;
    rows.collect()
}

pub fn count_active(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM batches WHERE is_active = 1",
        [],
        |row| row.get(0),
    )
}

pub fn insert(conn: &Connection, fields: &BatchFields) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO batches (name, subject_id, grade, faculty_id, schedule, start_date, end_date, \
         max_students, is_active, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9)",
        params![
            fields.name,
            fields.subject_id,
            fields.grade,
            fields.faculty_id,
            fields.schedule,
            fields.start_date,
            fields.end_date,
            fields.max_students,
            now(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(conn: &Connection, id: i64, fields: &BatchFields) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE batches SET name = ?1, subject_id = ?2, grade = ?3, faculty_id = ?4, schedule = ?5, \
         start_date = ?6, end_date = ?7, max_students = ?8 WHERE id = ?9",
        params![
            fields.name,
            fields.subject_id,
            fields.grade,
            fields.faculty_id,
            fields.schedule,
            fields.start_date,
            fields.end_date,
            fields.max_students,
            id,
        ],
    )
}

pub fn deactivate(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("UPDATE batches SET is_active = 0 WHERE id = ?1", [id])
}

pub fn enrolled_student_ids(conn: &Connection, batch_id: i64) -> rusqlite::Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT student_id FROM batch_enrollments WHERE batch_id = ?1")?;
    let rows = stmt.query_map([batch_id], |row| row.get(0))?;
    rows.collect()
}

pub fn enrollment_count(conn: &Connection, batch_id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM batch_enrollments WHERE batch_id = ?1",
        [batch_id],
        |row| row.get(0),
    )
}

/// Inserts one enrollment. A repeated `(student, batch)` pair fails with
/// the table's UNIQUE constraint.
pub fn enroll(conn: &Connection, student_id: i64, batch_id: i64) -> rusqlite::Result<BatchEnrollment> {
    let enrolled_at = now();
    conn.execute(
        "INSERT INTO batch_enrollments (student_id, batch_id, enrolled_at) VALUES (?1, ?2, ?3)",
        params![student_id, batch_id, enrolled_at],
    )?;
    Ok(BatchEnrollment {
        id: conn.last_insert_rowid(),
        student_id,
        batch_id,
        enrolled_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::students::{self, fixtures};
    use crate::db::subjects::{self, SubjectFields};
    use crate::db::test_support::temp_db;

    fn seed_batch(conn: &Connection) -> i64 {
        let subject_id = subjects::insert(
            conn,
            &SubjectFields {
                name: "Mathematics".into(),
                code: "MATH".into(),
                description: None,
                icon: None,
                color: None,
            },
        )
        .unwrap();
        insert(
            conn,
            &BatchFields {
                name: "Morning 10".into(),
                subject_id,
                grade: 10,
                faculty_id: None,
                schedule: Some("Mon/Wed 7am".into()),
                start_date: None,
                end_date: None,
                max_students: 30,
            },
        )
        .unwrap()
    }

    #[test]
    fn the_same_pair_cannot_be_enrolled_twice() {
        let (_dir, db) = temp_db();
        let conn = db.connect().unwrap();
        let batch_id = seed_batch(&conn);
        let student_id =
            students::insert(&conn, "MPC-2026-001", &fixtures::fields("A", "a@x.io", 10), "h")
                .unwrap();

        enroll(&conn, student_id, batch_id).unwrap();
        let second = enroll(&conn, student_id, batch_id).unwrap_err();

        assert_eq!(
            second.sqlite_error_code(),
            Some(rusqlite::ErrorCode::ConstraintViolation)
        );
        assert_eq!(enrollment_count(&conn, batch_id).unwrap(), 1);
    }

    #[test]
    fn available_students_exclude_enrolled_and_other_grades() {
        let (_dir, db) = temp_db();
        let conn = db.connect().unwrap();
        let batch_id = seed_batch(&conn);
        let a = students::insert(&conn, "MPC-2026-001", &fixtures::fields("A", "a@x.io", 10), "h")
            .unwrap();
        let b = students::insert(&conn, "MPC-2026-002", &fixtures::fields("B", "b@x.io", 10), "h")
            .unwrap();
        students::insert(&conn, "MPC-2026-003", &fixtures::fields("C", "c@x.io", 11), "h").unwrap();

        enroll(&conn, a, batch_id).unwrap();

        let available: Vec<i64> = students::available_for_batch(&conn, 10, batch_id)
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(available, vec![b]);
        assert_eq!(active_for_student(&conn, a).unwrap().len(), 1);

        deactivate(&conn, batch_id).unwrap();
        assert!(active_for_student(&conn, a).unwrap().is_empty());
    }
}
