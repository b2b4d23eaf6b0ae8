//! HTTP surface, one sub-module per area of the portal.
//!
//! - `public`: marketing pages and the contact form, open to everyone.
//! - `auth`: the shared login form and logout.
//! - `admin`: the back office, behind the admin guard.
//! - `student`: the self-service area, behind the student guard.
//!
//! Pages answer with a JSON `View` envelope; form posts answer with the
//! created or updated record, or with a short notice.

pub mod admin;
pub mod auth;
pub mod public;
pub mod student;

use actix_web::http::header::LOCATION;
use actix_web::HttpResponse;
use serde::Serialize;

#[derive(Serialize)]
struct Notice<'a> {
    message: &'a str,
}

/// `200 OK` with a one-line confirmation.
pub fn notice(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(Notice { message })
}

/// `303 See Other`, the answer to a successful form post that moves on.
pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location))
        .finish()
}
