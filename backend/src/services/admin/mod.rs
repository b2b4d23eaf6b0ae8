//! The back office.
//!
//! Every route runs behind the admin guard. Listing pages answer with a
//! `View`; form posts answer `201 Created` with the new record, `200` with
//! the updated one, or a short notice for deletions.
//!
//! Soft-deleted entities (students, subjects, batches, faculty, notes) keep
//! their rows; announcements, results, gallery images and testimonials are
//! removed outright.

mod announcements;
mod batches;
mod dashboard;
mod faculty;
mod gallery;
mod messages;
mod notes;
mod results;
mod settings;
mod students;
mod subjects;
mod testimonials;

use crate::auth::guard;
use crate::error::AppError;
use crate::state::AppState;
use crate::uploads::{self, ImageSpec, UploadedFile, IMAGE_EXTENSIONS};
use actix_web::dev::HttpServiceFactory;
use actix_web::middleware::from_fn;
use actix_web::web::{get, post, scope};

const API_PATH: &str = "/admin";

pub fn configure_routes() -> impl HttpServiceFactory {
    scope(API_PATH)
        .wrap(from_fn(guard::require_admin))
        .route("", get().to(dashboard::process))
        .route("/", get().to(dashboard::process))
        // Students
        .route("/students", get().to(students::list))
        .route("/students/add", post().to(students::create))
        .route("/students/{id}", get().to(students::show))
        .route("/students/{id}/edit", post().to(students::update))
        .route("/students/{id}/delete", post().to(students::deactivate))
        .route("/students/{id}/reset-password", post().to(students::reset_password))
        // Subjects
        .route("/subjects", get().to(subjects::list))
        .route("/subjects/add", post().to(subjects::create))
        .route("/subjects/{id}/edit", post().to(subjects::update))
        .route("/subjects/{id}/delete", post().to(subjects::deactivate))
        // Batches and enrollment
        .route("/batches", get().to(batches::list))
        .route("/batches/add", get().to(batches::options))
        .route("/batches/add", post().to(batches::create))
        .route("/batches/{id}/edit", get().to(batches::edit))
        .route("/batches/{id}/edit", post().to(batches::update))
        .route("/batches/{id}/delete", post().to(batches::deactivate))
        .route("/batches/{id}/enroll", get().to(batches::enrollment))
        .route("/batches/{id}/enroll", post().to(batches::enroll))
        // Results
        .route("/results", get().to(results::list))
        .route("/results/add", get().to(results::options))
        .route("/results/add", post().to(results::create))
        .route("/results/{id}/edit", get().to(results::edit))
        .route("/results/{id}/edit", post().to(results::update))
        .route("/results/{id}/delete", post().to(results::delete))
        // Announcements
        .route("/announcements", get().to(announcements::list))
        .route("/announcements/add", post().to(announcements::create))
        .route("/announcements/{id}/edit", post().to(announcements::update))
        .route("/announcements/{id}/delete", post().to(announcements::delete))
        // Gallery
        .route("/gallery", get().to(gallery::list))
        .route("/gallery/upload", post().to(gallery::upload))
        .route("/gallery/{id}/delete", post().to(gallery::delete))
        // Faculty
        .route("/faculty", get().to(faculty::list))
        .route("/faculty/add", post().to(faculty::create))
        .route("/faculty/{id}/edit", post().to(faculty::update))
        .route("/faculty/{id}/delete", post().to(faculty::deactivate))
        // Testimonials
        .route("/testimonials", get().to(testimonials::list))
        .route("/testimonials/add", post().to(testimonials::create))
        .route("/testimonials/{id}/edit", post().to(testimonials::update))
        .route("/testimonials/{id}/delete", post().to(testimonials::delete))
        // Notes
        .route("/notes", get().to(notes::list))
        .route("/notes/upload", get().to(notes::options))
        .route("/notes/upload", post().to(notes::upload))
        .route("/notes/{id}/delete", post().to(notes::deactivate))
        // Messages
        .route("/messages", get().to(messages::list))
        .route("/messages/{id}", get().to(messages::show))
        // Settings
        .route("/settings", get().to(settings::show))
        .route("/settings", post().to(settings::save))
}

/// Validates and stores an optional photo upload in the avatars folder.
/// Returns the stored name, or `None` when no file was sent.
async fn save_photo(
    state: &AppState,
    file: Option<UploadedFile>,
) -> Result<Option<String>, AppError> {
    let Some(file) = file else { return Ok(None) };
    if !uploads::allowed_file(&file.filename, IMAGE_EXTENSIONS) {
        return Err(AppError::field("photo", "Images only!"));
    }
    let dir = state.config.avatars_folder();
    let name = uploads::offload(move || {
        uploads::save_image(&file.bytes, &file.filename, &dir, ImageSpec::PHOTO)
    })
    .await?;
    Ok(Some(name))
}

/// Removes a freshly stored photo when its record could not be saved.
fn discard_photo_on_error<T>(
    state: &AppState,
    saved: Result<T, AppError>,
    photo: Option<&str>,
) -> Result<T, AppError> {
    if saved.is_err() {
        if let Some(name) = photo {
            uploads::remove_best_effort(&state.config.avatars_folder().join(name));
        }
    }
    saved
}
