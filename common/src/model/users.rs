use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Back-office account. Created by the seeder, never deleted in-flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub full_name: String,
    pub is_superadmin: bool,
    pub created_at: NaiveDateTime,
}

/// An enrolled learner. `student_id` is the generated login name
/// (`PREFIX-YEAR-SEQ`); `id` is the surrogate key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub student_id: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub grade: i64,
    pub avatar: String,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}
