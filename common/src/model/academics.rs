use crate::grading::GradeLetter;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faculty {
    pub id: i64,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub qualification: Option<String>,
    pub experience: Option<String>,
    pub bio: Option<String>,
    pub photo: String,
    pub specialization: Option<String>,
    pub is_active: bool,
    pub sort_order: i64,
}

/// A scheduled run of one subject for one grade.
///
/// `subject_name` and `faculty_name` are joined in for display and are not
/// columns of the batch itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: i64,
    pub name: String,
    pub subject_id: i64,
    pub subject_name: Option<String>,
    pub grade: i64,
    pub faculty_id: Option<i64>,
    pub faculty_name: Option<String>,
    pub schedule: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub max_students: i64,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEnrollment {
    pub id: i64,
    pub student_id: i64,
    pub batch_id: i64,
    pub enrolled_at: NaiveDateTime,
}

/// One exam outcome. `percentage` is derived from the marks when the row is
/// loaded; `grade_letter` is the stored value written alongside the marks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamResult {
    pub id: i64,
    pub student_id: i64,
    pub student_name: Option<String>,
    pub subject_id: i64,
    pub subject_name: Option<String>,
    pub exam_name: String,
    pub exam_date: NaiveDate,
    pub marks_obtained: f64,
    pub total_marks: f64,
    pub percentage: f64,
    pub grade_letter: Option<GradeLetter>,
    pub remarks: Option<String>,
    pub created_at: NaiveDateTime,
}
