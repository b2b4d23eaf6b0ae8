//! Persisted entities as they travel over the wire.
//!
//! Every struct mirrors one table. Password hashes never leave the backend,
//! so the user types skip them when serializing.

pub mod academics;
pub mod content;
pub mod role;
pub mod site;
pub mod users;

pub use academics::{Batch, BatchEnrollment, ExamResult, Faculty, Subject};
pub use content::{Announcement, ContactMessage, GalleryImage, Note, Testimonial};
pub use role::Role;
pub use site::{SiteSetting, SITE_SETTING_KEYS};
pub use users::{AdminUser, Student};

/// Filename used when a person has no uploaded photo.
pub const DEFAULT_AVATAR: &str = "default-avatar.png";

/// Grades the centre teaches.
pub const GRADES: [i64; 4] = [9, 10, 11, 12];
