//! Page envelope shared by every view.
//!
//! Handlers return their page data wrapped in `View<T>`, which also carries
//! the site settings a layout needs (site name, contact details, social
//! links). The settings come from an explicit `SettingsService` rather than
//! a global lookup.

use crate::db::{self, Db};
use crate::error::AppError;
use actix_web::HttpResponse;
use log::warn;
use serde::Serialize;
use std::collections::BTreeMap;

pub type SiteSettings = BTreeMap<String, String>;

#[derive(Clone, Debug)]
pub struct SettingsService {
    db: Db,
}

impl SettingsService {
    pub fn new(db: Db) -> Self {
        SettingsService { db }
    }

    /// Current settings. Any failure yields an empty map so pages still
    /// render.
    pub async fn load(&self) -> SiteSettings {
        match self.db.run(|tx| Ok(db::settings::as_map(tx)?)).await {
            Ok(settings) => settings,
            Err(e) => {
                warn!("site settings unavailable, using defaults: {}", e);
                SiteSettings::new()
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct View<T: Serialize> {
    pub site_settings: SiteSettings,
    #[serde(flatten)]
    pub page: T,
}

impl<T: Serialize> View<T> {
    pub async fn render(settings: &SettingsService, page: T) -> Result<HttpResponse, AppError> {
        let view = View {
            site_settings: settings.load().await,
            page,
        };
        Ok(HttpResponse::Ok().json(view))
    }
}
