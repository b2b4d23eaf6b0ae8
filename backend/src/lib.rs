//! A tutoring centre's website: public pages, a student area and an admin
//! back office over one SQLite database and an uploads folder.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod services;
pub mod state;
pub mod uploads;
pub mod view;

use crate::error::AppError;
use crate::state::AppState;
use actix_files::Files;
use actix_web::web::{self, ServiceConfig};

/// URL prefix under which public uploads are served.
pub const UPLOADS_PATH: &str = "/uploads";

/// Registers shared state and every route on an `App`. The public routes
/// sit at the site root, so they are added after the scoped areas.
pub fn configure_app(state: AppState) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let limit = state.config.max_content_length;
        let form_config = web::FormConfig::default()
            .limit(limit)
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into());

        // Notes stay behind the student download route.
        let config = &state.config;
        let public_folders = [
            ("gallery", config.gallery_folder()),
            ("avatars", config.avatars_folder()),
            ("thumbnails", config.thumbnails_folder()),
        ];

        cfg.app_data(web::Data::new(state.clone()))
            .app_data(form_config)
            .app_data(web::PayloadConfig::new(limit));
        for (name, dir) in public_folders {
            cfg.service(Files::new(&format!("{}/{}", UPLOADS_PATH, name), dir));
        }
        cfg.service(services::auth::configure_routes())
            .service(services::admin::configure_routes())
            .service(services::student::configure_routes());
        services::public::configure_routes(cfg);
    }
}
