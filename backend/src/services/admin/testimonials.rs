use super::{discard_photo_on_error, save_photo};
use crate::db;
use crate::error::AppError;
use crate::forms;
use crate::services::notice;
use crate::state::AppState;
use crate::uploads::{self, UploadForm};
use crate::view::View;
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::Testimonial;
use common::requests::TestimonialForm;
use log::info;
use serde::Serialize;

#[derive(Serialize)]
struct TestimonialsPage {
    testimonials: Vec<Testimonial>,
}

pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let testimonials = state
        .db
        .run(|tx| Ok(db::testimonials::list_all(tx)?))
        .await?;
    View::render(&state.settings, TestimonialsPage { testimonials }).await
}

pub async fn create(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse, AppError> {
    let mut form = UploadForm::read(&req, payload, state.config.max_content_length).await?;
    let fields = forms::testimonial_fields(&form.parse::<TestimonialForm>()?)?;
    let photo = save_photo(&state, form.take_file("photo")).await?;

    let stored = photo.clone();
    let saved = state
        .db
        .run(move |tx| {
            let id = db::testimonials::insert(tx, &fields, stored.as_deref())?;
            db::testimonials::get(tx, id)
        })
        .await;
    let testimonial = discard_photo_on_error(&state, saved, photo.as_deref())?;
    info!("testimonial {} added", testimonial.id);
    Ok(HttpResponse::Created().json(testimonial))
}

pub async fn update(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let mut form = UploadForm::read(&req, payload, state.config.max_content_length).await?;
    let fields = forms::testimonial_fields(&form.parse::<TestimonialForm>()?)?;
    let photo = save_photo(&state, form.take_file("photo")).await?;

    let stored = photo.clone();
    let saved = state
        .db
        .run(move |tx| {
            let before = db::testimonials::get(tx, id)?;
            db::testimonials::update(tx, id, &fields, stored.as_deref())?;
            Ok((before, db::testimonials::get(tx, id)?))
        })
        .await;
    let (before, testimonial) = discard_photo_on_error(&state, saved, photo.as_deref())?;
    if photo.is_some() {
        if let Some(old) = &before.photo {
            uploads::remove_best_effort(&state.config.avatars_folder().join(old));
        }
    }
    info!("testimonial {} updated", id);
    Ok(HttpResponse::Ok().json(testimonial))
}

/// Testimonials are removed outright, photo included.
pub async fn delete(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let testimonial = state
        .db
        .run(move |tx| {
            let testimonial = db::testimonials::get(tx, id)?;
            db::testimonials::delete(tx, id)?;
            Ok(testimonial)
        })
        .await?;
    if let Some(photo) = &testimonial.photo {
        uploads::remove_best_effort(&state.config.avatars_folder().join(photo));
    }
    info!("testimonial {} deleted", id);
    Ok(notice("Testimonial deleted."))
}
