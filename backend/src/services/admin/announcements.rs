use crate::db;
use crate::error::AppError;
use crate::forms;
use crate::services::notice;
use crate::state::AppState;
use crate::view::View;
use actix_web::{web, HttpResponse};
use common::model::Announcement;
use common::requests::AnnouncementForm;
use log::info;
use serde::Serialize;

#[derive(Serialize)]
struct AnnouncementsPage {
    announcements: Vec<Announcement>,
    categories: &'static [&'static str],
    priorities: &'static [&'static str],
}

pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let announcements = state
        .db
        .run(|tx| Ok(db::announcements::list_all(tx)?))
        .await?;
    let page = AnnouncementsPage {
        announcements,
        categories: forms::ANNOUNCEMENT_CATEGORIES,
        priorities: forms::ANNOUNCEMENT_PRIORITIES,
    };
    View::render(&state.settings, page).await
}

pub async fn create(
    state: web::Data<AppState>,
    form: web::Form<AnnouncementForm>,
) -> Result<HttpResponse, AppError> {
    let fields = forms::announcement_fields(&form)?;
    let announcement = state
        .db
        .run(move |tx| {
            let id = db::announcements::insert(tx, &fields)?;
            db::announcements::get(tx, id)
        })
        .await?;
    info!("announcement {} created", announcement.id);
    Ok(HttpResponse::Created().json(announcement))
}

pub async fn update(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    form: web::Form<AnnouncementForm>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let fields = forms::announcement_fields(&form)?;
    let announcement = state
        .db
        .run(move |tx| {
            db::announcements::get(tx, id)?;
            db::announcements::update(tx, id, &fields)?;
            db::announcements::get(tx, id)
        })
        .await?;
    info!("announcement {} updated", announcement.id);
    Ok(HttpResponse::Ok().json(announcement))
}

pub async fn delete(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    state
        .db
        .run(move |tx| {
            db::announcements::get(tx, id)?;
            db::announcements::delete(tx, id)?;
            Ok(())
        })
        .await?;
    info!("announcement {} deleted", id);
    Ok(notice("Announcement deleted."))
}
