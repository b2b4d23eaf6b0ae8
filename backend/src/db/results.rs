use super::{now, page_window, Paginated};
use crate::error::AppError;
use chrono::NaiveDate;
use common::grading::{grade_for_marks, percentage, GradeLetter};
use common::model::ExamResult;
use rusqlite::{params, Connection, OptionalExtension, Row};

const SELECT: &str = "SELECT r.id, r.student_id, st.full_name AS student_name, r.subject_id, \
                      su.name AS subject_name, r.exam_name, r.exam_date, r.marks_obtained, \
                      r.total_marks, r.grade_letter, r.remarks, r.created_at \
                      FROM results r \
                      LEFT JOIN students st ON st.id = r.student_id \
                      LEFT JOIN subjects su ON su.id = r.subject_id";

#[derive(Debug, Clone, PartialEq)]
pub struct ResultFields {
    pub student_id: i64,
    pub subject_id: i64,
    pub exam_name: String,
    pub exam_date: NaiveDate,
    pub marks_obtained: f64,
    pub total_marks: f64,
    pub remarks: Option<String>,
}

impl ResultFields {
    /// The letter stored next to these marks.
    pub fn grade_letter(&self) -> GradeLetter {
        grade_for_marks(self.marks_obtained, self.total_marks)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<ExamResult> {
    let marks_obtained: f64 = row.get("marks_obtained")?;
    let total_marks: f64 = row.get("total_marks")?;
    let grade_letter = row
        .get::<_, Option<String>>("grade_letter")?
        .and_then(|g| g.parse::<GradeLetter>().ok());
    Ok(ExamResult {
        id: row.get("id")?,
        student_id: row.get("student_id")?,
        student_name: row.get("student_name")?,
        subject_id: row.get("subject_id")?,
        subject_name: row.get("subject_name")?,
        exam_name: row.get("exam_name")?,
        exam_date: row.get("exam_date")?,
        marks_obtained,
        total_marks,
        percentage: percentage(marks_obtained, total_marks),
        grade_letter,
        remarks: row.get("remarks")?,
        created_at: row.get("created_at")?,
    })
}

pub fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<ExamResult>> {
    conn.query_row(&format!("{} WHERE r.id = ?1", SELECT), [id], map_row)
        .optional()
}

pub fn get(conn: &Connection, id: i64) -> Result<ExamResult, AppError> {
    find(conn, id)?.ok_or_else(|| AppError::not_found("result"))
}

/// All results, newest entry first.
pub fn list(conn: &Connection, page: Option<u32>, per_page: u32) -> rusqlite::Result<Paginated<ExamResult>> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM results", [], |row| row.get(0))?;
    let (page, offset) = page_window(page, per_page);
    let mut stmt = conn.prepare(&format!(
        "{} ORDER BY r.created_at DESC, r.id DESC LIMIT ?1 OFFSET ?2",
        SELECT
    ))?;
    let items = stmt
        .query_map(params![per_page, offset], map_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(Paginated::new(items, page, per_page, total))
}

/// A student's own results, latest exam first, optionally for one subject.
pub fn for_student(
    conn: &Connection,
    student_id: i64,
    subject_id: Option<i64>,
    limit: Option<u32>,
) -> rusqlite::Result<Vec<ExamResult>> {
    let subject_id = subject_id.filter(|s| *s != 0);
    let mut stmt = conn.prepare(&format!(
        "{} WHERE r.student_id = ?1 AND (?2 IS NULL OR r.subject_id = ?2) \
         ORDER BY r.exam_date DESC, r.id DESC LIMIT ?3",
        SELECT
    ))?;
    let limit = limit.map(i64::from).unwrap_or(-1);
    let rows = stmt.query_map(params![student_id, subject_id, limit], map_row)?;
    rows.collect()
}

pub fn insert(conn: &Connection, fields: &ResultFields) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO results (student_id, subject_id, exam_name, exam_date, marks_obtained, \
         total_marks, grade_letter, remarks, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            fields.student_id,
            fields.subject_id,
            fields.exam_name,
            fields.exam_date,
            fields.marks_obtained,
            fields.total_marks,
            fields.grade_letter().as_str(),
            fields.remarks,
            now(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Rewrites the marks and recomputes the stored letter from them.
pub fn update(conn: &Connection, id: i64, fields: &ResultFields) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE results SET student_id = ?1, subject_id = ?2, exam_name = ?3, exam_date = ?4, \
         marks_obtained = ?5, total_marks = ?6, grade_letter = ?7, remarks = ?8 WHERE id = ?9",
        params![
            fields.student_id,
            fields.subject_id,
            fields.exam_name,
            fields.exam_date,
            fields.marks_obtained,
            fields.total_marks,
            fields.grade_letter().as_str(),
            fields.remarks,
            id,
        ],
    )
}

pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM results WHERE id = ?1", [id])
}
