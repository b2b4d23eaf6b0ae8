//! Public pages. Everything here is read-only except the contact form.
//!
//! These routes sit at the root of the site, so they are registered on the
//! app directly rather than in a scope that would swallow every path.

mod contact;
mod home;
mod pages;
mod subjects;

use actix_web::web::{get, post, ServiceConfig};

pub fn configure_routes(cfg: &mut ServiceConfig) {
    cfg.route("/", get().to(home::process))
        .route("/about", get().to(pages::about))
        .route("/faculty", get().to(pages::faculty))
        .route("/gallery", get().to(pages::gallery))
        .route("/testimonials", get().to(pages::testimonials))
        .route("/subjects", get().to(subjects::list))
        .route("/subjects/{code}", get().to(subjects::detail))
        .route("/contact", get().to(contact::form))
        .route("/contact", post().to(contact::submit));
}
