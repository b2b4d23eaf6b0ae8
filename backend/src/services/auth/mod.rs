//! The login form shared by both roles, and logout.

mod login;
mod logout;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/auth";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/login", get().to(login::form))
        .route("/login", post().to(login::process))
        .route("/logout", get().to(logout::process))
}
