use super::{discard_photo_on_error, save_photo};
use crate::db;
use crate::error::AppError;
use crate::forms;
use crate::services::notice;
use crate::state::AppState;
use crate::uploads::{self, UploadForm};
use crate::view::View;
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::{Faculty, DEFAULT_AVATAR};
use common::requests::FacultyForm;
use log::info;
use serde::Serialize;

#[derive(Serialize)]
struct FacultyPage {
    faculty: Vec<Faculty>,
}

pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let faculty = state.db.run(|tx| Ok(db::faculty::list_all(tx)?)).await?;
    View::render(&state.settings, FacultyPage { faculty }).await
}

pub async fn create(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse, AppError> {
    let mut form = UploadForm::read(&req, payload, state.config.max_content_length).await?;
    let fields = forms::faculty_fields(&form.parse::<FacultyForm>()?)?;
    let photo = save_photo(&state, form.take_file("photo")).await?;

    let stored = photo.clone();
    let saved = state
        .db
        .run(move |tx| {
            let photo = stored.as_deref().unwrap_or(DEFAULT_AVATAR);
            let id = db::faculty::insert(tx, &fields, photo)?;
            db::faculty::get(tx, id)
        })
        .await;
    let member = discard_photo_on_error(&state, saved, photo.as_deref())?;
    info!("faculty member {} added", member.full_name);
    Ok(HttpResponse::Created().json(member))
}

/// A new photo replaces the old one; without one the photo is kept.
pub async fn update(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let mut form = UploadForm::read(&req, payload, state.config.max_content_length).await?;
    let fields = forms::faculty_fields(&form.parse::<FacultyForm>()?)?;
    let photo = save_photo(&state, form.take_file("photo")).await?;

    let stored = photo.clone();
    let saved = state
        .db
        .run(move |tx| {
            let before = db::faculty::get(tx, id)?;
            db::faculty::update(tx, id, &fields, stored.as_deref())?;
            Ok((before, db::faculty::get(tx, id)?))
        })
        .await;
    let (before, member) = discard_photo_on_error(&state, saved, photo.as_deref())?;
    if photo.is_some() && before.photo != DEFAULT_AVATAR {
        uploads::remove_best_effort(&state.config.avatars_folder().join(&before.photo));
    }
    info!("faculty member {} updated", member.full_name);
    Ok(HttpResponse::Ok().json(member))
}

pub async fn deactivate(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let member = state
        .db
        .run(move |tx| {
            let member = db::faculty::get(tx, id)?;
            db::faculty::deactivate(tx, id)?;
            Ok(member)
        })
        .await?;
    info!("faculty member {} deactivated", member.full_name);
    Ok(notice("Faculty deactivated."))
}
