//! The student self-service area.
//!
//! Every route runs behind the student guard, so handlers receive the
//! signed-in `Student` through `web::ReqData` and only ever read rows that
//! belong to that student or to their grade.

mod dashboard;
mod notes;
mod profile;
mod results;
mod schedule;

use crate::auth::guard;
use actix_web::dev::HttpServiceFactory;
use actix_web::middleware::from_fn;
use actix_web::web::{get, post, scope};

const API_PATH: &str = "/student";

pub fn configure_routes() -> impl HttpServiceFactory {
    scope(API_PATH)
        .wrap(from_fn(guard::require_student))
        .route("", get().to(dashboard::process))
        .route("/", get().to(dashboard::process))
        .route("/results", get().to(results::process))
        .route("/notes", get().to(notes::list))
        .route("/notes/{id}/download", get().to(notes::download))
        .route("/schedule", get().to(schedule::process))
        .route("/profile", get().to(profile::show))
        .route("/profile", post().to(profile::update))
}
