use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A notice board entry. `target_grade` of `None` addresses every grade.
/// `expires_at` is kept for the record only; no listing filters on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category: String,
    pub priority: String,
    pub target_grade: Option<i64>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub expires_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: i64,
    pub filename: String,
    pub thumbnail: Option<String>,
    pub caption: Option<String>,
    pub category: String,
    pub sort_order: i64,
    pub is_active: bool,
    pub uploaded_at: NaiveDateTime,
}

/// Downloadable study material (a PDF on disk).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub subject_id: i64,
    pub subject_name: Option<String>,
    pub grade: i64,
    pub chapter: Option<String>,
    pub filename: String,
    pub file_size: Option<i64>,
    pub uploaded_at: NaiveDateTime,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: i64,
    pub student_name: String,
    pub content: String,
    pub rating: i64,
    pub grade: Option<String>,
    pub photo: Option<String>,
    pub is_featured: bool,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}
