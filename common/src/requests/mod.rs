//! Raw payloads posted by the portal's forms.
//!
//! Every field arrives as text exactly as the browser sent it; missing
//! fields default to empty. Parsing and validation happen on the backend so
//! a bad value becomes a field error instead of a rejected request.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    /// `admin` or `student`; anything else is treated as `student`.
    pub role: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub grade: String,
    pub parent_name: String,
    pub parent_phone: String,
    pub address: String,
    pub date_of_birth: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectForm {
    pub name: String,
    pub code: String,
    pub description: String,
    pub icon: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchForm {
    pub name: String,
    pub subject_id: String,
    pub grade: String,
    /// `0` or empty means no faculty assigned.
    pub faculty_id: String,
    pub schedule: String,
    pub start_date: String,
    pub end_date: String,
    pub max_students: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultForm {
    pub student_id: String,
    pub subject_id: String,
    pub exam_name: String,
    pub exam_date: String,
    pub marks_obtained: String,
    pub total_marks: String,
    pub remarks: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnouncementForm {
    pub title: String,
    pub content: String,
    pub category: String,
    pub priority: String,
    /// `0` or empty targets every grade.
    pub target_grade: String,
    /// `YYYY-MM-DDTHH:MM` or `YYYY-MM-DD`; stored, never enforced.
    pub expires_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FacultyForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub qualification: String,
    pub experience: String,
    pub bio: String,
    pub specialization: String,
    pub sort_order: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryUploadForm {
    pub caption: String,
    pub category: String,
    pub sort_order: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteUploadForm {
    pub title: String,
    pub subject_id: String,
    pub grade: String,
    pub chapter: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TestimonialForm {
    pub student_name: String,
    pub content: String,
    pub rating: String,
    pub grade: String,
    /// Checkbox: present with any of `y`, `on`, `true`, `1` when ticked.
    pub is_featured: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Query string accepted by paginated admin listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub grade: Option<i64>,
}

/// `?subject=<id>` filter used by the student area.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectFilter {
    pub subject: Option<i64>,
}
