//! Shared application state.
//!
//! `AppState` is built once in `main.rs` (or by a test harness) and handed to
//! every worker as `web::Data`. Everything inside is cheap to clone: the
//! database handle only carries the file location, the configuration sits
//! behind an `Arc`, and the cookie key is reference counted by the cookie
//! crate.

use crate::config::Config;
use crate::db::Db;
use crate::view::SettingsService;
use actix_web::cookie::Key;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Unit-of-work entry point for every handler.
    pub db: Db,
    pub config: Arc<Config>,
    /// Signs the session cookie. Derived from `SECRET_KEY`.
    pub cookie_key: Key,
    /// Site-wide key/value settings injected into every page envelope.
    pub settings: SettingsService,
}

impl AppState {
    pub fn new(config: Config, db: Db) -> Self {
        let cookie_key = Key::derive_from(config.secret_key.as_bytes());
        let settings = SettingsService::new(db.clone());
        AppState {
            db,
            config: Arc::new(config),
            cookie_key,
            settings,
        }
    }
}
