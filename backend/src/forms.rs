//! Validation of posted forms into the typed field sets the repositories
//! write.
//!
//! Each `*_fields` function checks every field, collects one message per
//! failing field and only then fails, so a response can flag all mistakes
//! at once. Nothing is persisted before these succeed.

use crate::db::announcements::AnnouncementFields;
use crate::db::batches::BatchFields;
use crate::db::faculty::FacultyFields;
use crate::db::gallery::GalleryFields;
use crate::db::messages::MessageFields;
use crate::db::notes::NoteFields;
use crate::db::results::ResultFields;
use crate::db::students::StudentFields;
use crate::db::subjects::SubjectFields;
use crate::db::testimonials::TestimonialFields;
use crate::error::{AppError, FieldErrors};
use chrono::{NaiveDate, NaiveDateTime};
use common::requests::{
    AnnouncementForm, BatchForm, ChangePasswordForm, ContactForm, FacultyForm, GalleryUploadForm,
    NoteUploadForm, ResultForm, StudentForm, SubjectForm, TestimonialForm,
};
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

pub const ANNOUNCEMENT_CATEGORIES: &[&str] = &["general", "exam", "holiday", "event"];
pub const ANNOUNCEMENT_PRIORITIES: &[&str] = &["low", "normal", "high", "urgent"];
pub const GALLERY_CATEGORIES: &[&str] = &["general", "classroom", "events", "achievements", "campus"];
pub const MIN_PASSWORD_LENGTH: usize = 6;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid regex pattern for email addresses")
});

/// Accumulates field errors while converting raw text.
#[derive(Default)]
pub struct Checker {
    errors: FieldErrors,
}

impl Checker {
    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    pub fn required(&mut self, field: &str, value: &str, max: usize) -> String {
        let value = value.trim();
        if value.is_empty() {
            self.fail(field, "This field is required.");
        } else if value.chars().count() > max {
            self.fail(field, format!("Must be at most {} characters.", max));
        }
        value.to_string()
    }

    /// A required single line of text. Control characters such as embedded
    /// newlines are refused.
    pub fn line(&mut self, field: &str, value: &str, max: usize) -> String {
        let value = self.required(field, value, max);
        if value.chars().any(char::is_control) {
            self.fail(field, "Must be a single line of text.");
        }
        value
    }

    /// Empty text becomes `None`. `max` of `0` means unbounded.
    pub fn optional(&mut self, field: &str, value: &str, max: usize) -> Option<String> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if max > 0 && value.chars().count() > max {
            self.fail(field, format!("Must be at most {} characters.", max));
        }
        Some(value.to_string())
    }

    pub fn email(&mut self, field: &str, value: &str) -> String {
        let value = self.required(field, value, 120);
        if !value.is_empty() && !EMAIL.is_match(&value) {
            self.fail(field, "Invalid email address.");
        }
        value
    }

    pub fn optional_email(&mut self, field: &str, value: &str) -> Option<String> {
        let value = self.optional(field, value, 120)?;
        if !EMAIL.is_match(&value) {
            self.fail(field, "Invalid email address.");
        }
        Some(value)
    }

    fn parse<T: FromStr>(&mut self, field: &str, value: &str, message: &str) -> Option<T> {
        let value = value.trim();
        if value.is_empty() {
            self.fail(field, "This field is required.");
            return None;
        }
        match value.parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                self.fail(field, message);
                None
            }
        }
    }

    /// A required choice among the taught grades.
    pub fn grade(&mut self, field: &str, value: &str) -> i64 {
        match self.parse::<i64>(field, value, "Not a valid choice.") {
            Some(grade) if common::model::GRADES.contains(&grade) => grade,
            Some(_) => {
                self.fail(field, "Not a valid choice.");
                0
            }
            None => 0,
        }
    }

    /// A required reference to another row.
    pub fn id(&mut self, field: &str, value: &str) -> i64 {
        match self.parse::<i64>(field, value, "Not a valid choice.") {
            Some(id) if id > 0 => id,
            Some(_) => {
                self.fail(field, "This field is required.");
                0
            }
            None => 0,
        }
    }

    /// Select boxes post `0` for "none".
    pub fn optional_id(&mut self, field: &str, value: &str) -> Option<i64> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        match value.parse::<i64>() {
            Ok(0) => None,
            Ok(id) if id > 0 => Some(id),
            _ => {
                self.fail(field, "Not a valid choice.");
                None
            }
        }
    }

    pub fn integer_in(&mut self, field: &str, value: &str, default: i64, min: i64, max: i64) -> i64 {
        let value = value.trim();
        if value.is_empty() {
            return default;
        }
        match value.parse::<i64>() {
            Ok(n) if (min..=max).contains(&n) => n,
            Ok(_) => {
                self.fail(field, format!("Must be between {} and {}.", min, max));
                default
            }
            Err(_) => {
                self.fail(field, "Not a valid integer value.");
                default
            }
        }
    }

    pub fn number_at_least(&mut self, field: &str, value: &str, min: f64) -> f64 {
        match self.parse::<f64>(field, value, "Not a valid number.") {
            Some(n) if n.is_finite() && n >= min => n,
            Some(_) => {
                self.fail(field, format!("Must be at least {}.", min));
                min
            }
            None => min,
        }
    }

    pub fn date(&mut self, field: &str, value: &str) -> NaiveDate {
        self.parse::<NaiveDate>(field, value, "Not a valid date value.")
            .unwrap_or_default()
    }

    pub fn optional_date(&mut self, field: &str, value: &str) -> Option<NaiveDate> {
        if value.trim().is_empty() {
            return None;
        }
        self.parse::<NaiveDate>(field, value, "Not a valid date value.")
    }

    /// Accepts the browser's `datetime-local` format or a bare date.
    pub fn optional_datetime(&mut self, field: &str, value: &str) -> Option<NaiveDateTime> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let parsed = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
            .ok()
            .or_else(|| value.parse::<NaiveDate>().ok().and_then(|d| d.and_hms_opt(0, 0, 0)));
        if parsed.is_none() {
            self.fail(field, "Not a valid date value.");
        }
        parsed
    }

    /// One of `choices`, or `default` when left empty.
    pub fn choice(&mut self, field: &str, value: &str, choices: &[&str], default: &str) -> String {
        let value = value.trim();
        if value.is_empty() {
            return default.to_string();
        }
        if !choices.contains(&value) {
            self.fail(field, "Not a valid choice.");
        }
        value.to_string()
    }

    pub fn finish<T>(self, value: T) -> Result<T, AppError> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

/// HTML checkboxes post `y`, `on` or similar when ticked and nothing
/// otherwise.
pub fn checkbox(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "y" | "yes" | "on" | "true" | "1"
    )
}

pub fn student_fields(form: &StudentForm) -> Result<StudentFields, AppError> {
    let mut c = Checker::default();
    let fields = StudentFields {
        full_name: c.required("full_name", &form.full_name, 120),
        email: c.email("email", &form.email),
        phone: c.optional("phone", &form.phone, 15),
        grade: c.grade("grade", &form.grade),
        parent_name: c.optional("parent_name", &form.parent_name, 120),
        parent_phone: c.optional("parent_phone", &form.parent_phone, 15),
        address: c.optional("address", &form.address, 0),
        date_of_birth: c.optional_date("date_of_birth", &form.date_of_birth),
    };
    c.finish(fields)
}

pub fn subject_fields(form: &SubjectForm) -> Result<SubjectFields, AppError> {
    let mut c = Checker::default();
    let fields = SubjectFields {
        name: c.required("name", &form.name, 100),
        code: c.required("code", &form.code, 20).to_ascii_uppercase(),
        description: c.optional("description", &form.description, 0),
        icon: c.optional("icon", &form.icon, 50),
        color: c.optional("color", &form.color, 20),
    };
    c.finish(fields)
}

pub fn batch_fields(form: &BatchForm) -> Result<BatchFields, AppError> {
    let mut c = Checker::default();
    let fields = BatchFields {
        name: c.required("name", &form.name, 100),
        subject_id: c.id("subject_id", &form.subject_id),
        grade: c.grade("grade", &form.grade),
        faculty_id: c.optional_id("faculty_id", &form.faculty_id),
        schedule: c.optional("schedule", &form.schedule, 200),
        start_date: c.optional_date("start_date", &form.start_date),
        end_date: c.optional_date("end_date", &form.end_date),
        max_students: c.integer_in("max_students", &form.max_students, 30, 1, i64::from(u16::MAX)),
    };
    if let (Some(start), Some(end)) = (fields.start_date, fields.end_date) {
        if end < start {
            c.fail("end_date", "End date must not be before the start date.");
        }
    }
    c.finish(fields)
}

pub fn result_fields(form: &ResultForm) -> Result<ResultFields, AppError> {
    let mut c = Checker::default();
    let fields = ResultFields {
        student_id: c.id("student_id", &form.student_id),
        subject_id: c.id("subject_id", &form.subject_id),
        exam_name: c.required("exam_name", &form.exam_name, 100),
        exam_date: c.date("exam_date", &form.exam_date),
        marks_obtained: c.number_at_least("marks_obtained", &form.marks_obtained, 0.0),
        total_marks: c.number_at_least("total_marks", &form.total_marks, 1.0),
        remarks: c.optional("remarks", &form.remarks, 0),
    };
    c.finish(fields)
}

pub fn announcement_fields(form: &AnnouncementForm) -> Result<AnnouncementFields, AppError> {
    let mut c = Checker::default();
    let target_grade = match c.optional_id("target_grade", &form.target_grade) {
        Some(grade) if !common::model::GRADES.contains(&grade) => {
            c.fail("target_grade", "Not a valid choice.");
            None
        }
        other => other,
    };
    let fields = AnnouncementFields {
        title: c.required("title", &form.title, 200),
        content: c.required("content", &form.content, usize::MAX),
        category: c.choice("category", &form.category, ANNOUNCEMENT_CATEGORIES, "general"),
        priority: c.choice("priority", &form.priority, ANNOUNCEMENT_PRIORITIES, "normal"),
        target_grade,
        expires_at: c.optional_datetime("expires_at", &form.expires_at),
    };
    c.finish(fields)
}

pub fn faculty_fields(form: &FacultyForm) -> Result<FacultyFields, AppError> {
    let mut c = Checker::default();
    let fields = FacultyFields {
        full_name: c.required("full_name", &form.full_name, 120),
        email: c.optional_email("email", &form.email),
        phone: c.optional("phone", &form.phone, 15),
        qualification: c.optional("qualification", &form.qualification, 200),
        experience: c.optional("experience", &form.experience, 100),
        bio: c.optional("bio", &form.bio, 0),
        specialization: c.optional("specialization", &form.specialization, 200),
        sort_order: c.integer_in("sort_order", &form.sort_order, 0, -9999, 9999),
    };
    c.finish(fields)
}

/// Gallery metadata; the file name and thumbnail are filled in once the
/// image is stored.
pub fn gallery_fields(form: &GalleryUploadForm) -> Result<GalleryFields, AppError> {
    let mut c = Checker::default();
    let fields = GalleryFields {
        filename: String::new(),
        thumbnail: None,
        caption: c.optional("caption", &form.caption, 200),
        category: c.choice("category", &form.category, GALLERY_CATEGORIES, "general"),
        sort_order: c.integer_in("sort_order", &form.sort_order, 0, -9999, 9999),
    };
    c.finish(fields)
}

pub fn note_fields(form: &NoteUploadForm) -> Result<NoteFields, AppError> {
    let mut c = Checker::default();
    let fields = NoteFields {
        title: c.line("title", &form.title, 200),
        subject_id: c.id("subject_id", &form.subject_id),
        grade: c.grade("grade", &form.grade),
        chapter: c.optional("chapter", &form.chapter, 100),
    };
    c.finish(fields)
}

pub fn testimonial_fields(form: &TestimonialForm) -> Result<TestimonialFields, AppError> {
    let mut c = Checker::default();
    let fields = TestimonialFields {
        student_name: c.required("student_name", &form.student_name, 120),
        content: c.required("content", &form.content, usize::MAX),
        rating: c.integer_in("rating", &form.rating, 5, 1, 5),
        grade: c.optional("grade", &form.grade, 20),
        is_featured: checkbox(&form.is_featured),
    };
    c.finish(fields)
}

pub fn message_fields(form: &ContactForm) -> Result<MessageFields, AppError> {
    let mut c = Checker::default();
    let fields = MessageFields {
        name: c.required("name", &form.name, 120),
        email: c.email("email", &form.email),
        phone: c.optional("phone", &form.phone, 15),
        subject: c.optional("subject", &form.subject, 200),
        message: c.required("message", &form.message, usize::MAX),
    };
    c.finish(fields)
}

/// Checks the shape of a password change. Whether `current_password` is
/// right is up to the caller.
pub fn password_change(form: &ChangePasswordForm) -> Result<(), AppError> {
    let mut c = Checker::default();
    if form.current_password.is_empty() {
        c.fail("current_password", "This field is required.");
    }
    if form.new_password.is_empty() {
        c.fail("new_password", "This field is required.");
    } else if form.new_password.chars().count() < MIN_PASSWORD_LENGTH {
        c.fail(
            "new_password",
            format!("Must be at least {} characters.", MIN_PASSWORD_LENGTH),
        );
    }
    if form.confirm_password != form.new_password {
        c.fail("confirm_password", "Passwords do not match.");
    }
    c.finish(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student_form() -> StudentForm {
        StudentForm {
            full_name: "  Asha Rai ".into(),
            email: "asha@example.com".into(),
            grade: "10".into(),
            date_of_birth: "2010-04-01".into(),
            ..StudentForm::default()
        }
    }

    fn field_errors(err: AppError) -> FieldErrors {
        match err {
            AppError::Validation(errors) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn valid_student_forms_are_trimmed_and_typed() {
        let fields = student_fields(&student_form()).unwrap();
        assert_eq!(fields.full_name, "Asha Rai");
        assert_eq!(fields.grade, 10);
        assert_eq!(fields.phone, None);
        assert_eq!(fields.date_of_birth, NaiveDate::from_ymd_opt(2010, 4, 1));
    }

    #[test]
    fn every_bad_student_field_is_reported() {
        let form = StudentForm {
            full_name: String::new(),
            email: "not-an-email".into(),
            grade: "8".into(),
            date_of_birth: "01/04/2010".into(),
            ..StudentForm::default()
        };
        let errors = field_errors(student_fields(&form).unwrap_err());
        assert_eq!(errors.get("full_name"), Some("This field is required."));
        assert_eq!(errors.get("email"), Some("Invalid email address."));
        assert_eq!(errors.get("grade"), Some("Not a valid choice."));
        assert!(errors.get("date_of_birth").is_some());
    }

    #[test]
    fn results_need_a_positive_total() {
        let form = ResultForm {
            student_id: "1".into(),
            subject_id: "2".into(),
            exam_name: "Unit test 1".into(),
            exam_date: "2026-03-02".into(),
            marks_obtained: "-1".into(),
            total_marks: "0".into(),
            remarks: String::new(),
        };
        let errors = field_errors(result_fields(&form).unwrap_err());
        assert!(errors.get("marks_obtained").is_some());
        assert_eq!(errors.get("total_marks"), Some("Must be at least 1."));
    }

    #[test]
    fn batch_faculty_zero_means_unassigned() {
        let form = BatchForm {
            name: "Evening 11".into(),
            subject_id: "3".into(),
            grade: "11".into(),
            faculty_id: "0".into(),
            ..BatchForm::default()
        };
        let fields = batch_fields(&form).unwrap();
        assert_eq!(fields.faculty_id, None);
        assert_eq!(fields.max_students, 30);
    }

    #[test]
    fn announcements_default_their_choices() {
        let form = AnnouncementForm {
            title: "Holiday".into(),
            content: "Closed on Friday".into(),
            target_grade: "0".into(),
            expires_at: "2026-12-31T18:00".into(),
            ..AnnouncementForm::default()
        };
        let fields = announcement_fields(&form).unwrap();
        assert_eq!(fields.category, "general");
        assert_eq!(fields.priority, "normal");
        assert_eq!(fields.target_grade, None);
        assert!(fields.expires_at.is_some());
    }

    #[test]
    fn testimonial_ratings_stay_within_five_stars() {
        let form = TestimonialForm {
            student_name: "R. K.".into(),
            content: "Great teachers".into(),
            rating: "6".into(),
            is_featured: "y".into(),
            ..TestimonialForm::default()
        };
        let errors = field_errors(testimonial_fields(&form).unwrap_err());
        assert!(errors.get("rating").is_some());
        assert!(checkbox("on"));
        assert!(!checkbox(""));
    }

    #[test]
    fn password_changes_must_match_and_be_long_enough() {
        let form = ChangePasswordForm {
            current_password: "old".into(),
            new_password: "abc".into(),
            confirm_password: "abd".into(),
        };
        let errors = field_errors(password_change(&form).unwrap_err());
        assert!(errors.get("new_password").is_some());
        assert_eq!(errors.get("confirm_password"), Some("Passwords do not match."));

        let ok = ChangePasswordForm {
            current_password: "old".into(),
            new_password: "abcdef".into(),
            confirm_password: "abcdef".into(),
        };
        assert!(password_change(&ok).is_ok());
    }

    #[test]
    fn note_titles_must_be_a_single_line() {
        let form = NoteUploadForm {
            title: "line1\nline2".into(),
            subject_id: "1".into(),
            grade: "10".into(),
            chapter: String::new(),
        };
        let errors = field_errors(note_fields(&form).unwrap_err());
        assert_eq!(errors.get("title"), Some("Must be a single line of text."));

        let ok = NoteUploadForm {
            title: "Ångström \"units\"".into(),
            ..form
        };
        assert_eq!(note_fields(&ok).unwrap().title, "Ångström \"units\"");
    }
}
