//! The site-wide key/value settings. Only the known keys are written; a
//! key left out of the form is stored as an empty string.

use crate::db;
use crate::error::AppError;
use crate::services::notice;
use crate::state::AppState;
use crate::view::View;
use actix_web::{web, HttpResponse};
use common::model::SITE_SETTING_KEYS;
use log::info;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Serialize)]
struct SettingsPage {
    settings: BTreeMap<String, String>,
    keys: &'static [&'static str],
}

pub async fn show(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let settings = state.db.run(|tx| Ok(db::settings::as_map(tx)?)).await?;
    let page = SettingsPage {
        settings,
        keys: &SITE_SETTING_KEYS,
    };
    View::render(&state.settings, page).await
}

pub async fn save(
    state: web::Data<AppState>,
    form: web::Form<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let submitted = form.into_inner();
    state
        .db
        .run(move |tx| {
            for key in SITE_SETTING_KEYS {
                let value = submitted.get(key).map(|v| v.trim()).unwrap_or_default();
                db::settings::upsert(tx, key, value)?;
            }
            Ok(())
        })
        .await?;
    info!("site settings saved");
    Ok(notice("Settings saved successfully!"))
}
