//! Gallery uploads. Each image is stored downscaled and gets a thumbnail;
//! deleting the record removes both files.

use crate::config::Config;
use crate::db;
use crate::error::AppError;
use crate::forms;
use crate::services::notice;
use crate::state::AppState;
use crate::uploads::{self, ImageSpec, UploadForm, UploadedFile, IMAGE_EXTENSIONS};
use crate::view::View;
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::GalleryImage;
use common::requests::GalleryUploadForm;
use log::info;
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct GalleryPage {
    images: Vec<GalleryImage>,
    categories: &'static [&'static str],
}

#[derive(Serialize)]
struct Uploaded {
    images: Vec<GalleryImage>,
}

pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let images = state.db.run(|tx| Ok(db::gallery::list_all(tx)?)).await?;
    let page = GalleryPage {
        images,
        categories: forms::GALLERY_CATEGORIES,
    };
    View::render(&state.settings, page).await
}

/// Stores one image and its thumbnail. Returns `(filename, thumbnail)`.
fn store(config: &Config, file: &UploadedFile) -> Result<(String, String), AppError> {
    let gallery = config.gallery_folder();
    let filename = uploads::save_image(&file.bytes, &file.filename, &gallery, ImageSpec::PHOTO)?;
    match uploads::create_thumbnail(&gallery.join(&filename), &config.thumbnails_folder()) {
        Ok(thumbnail) => Ok((filename, thumbnail)),
        Err(e) => {
            uploads::remove_best_effort(&gallery.join(&filename));
            Err(e)
        }
    }
}

fn discard(config: &Config, stored: &[(String, String)]) {
    for (filename, thumbnail) in stored {
        uploads::remove_best_effort(&config.gallery_folder().join(filename));
        uploads::remove_best_effort(&config.thumbnails_folder().join(thumbnail));
    }
}

/// Accepts one or more files under `images`. Every file must be an image;
/// if any fails, nothing is kept.
pub async fn upload(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse, AppError> {
    let mut form = UploadForm::read(&req, payload, state.config.max_content_length).await?;
    let meta = forms::gallery_fields(&form.parse::<GalleryUploadForm>()?)?;
    let files = form.take_files("images");
    if files.is_empty() {
        return Err(AppError::field("images", "Please select an image."));
    }
    if files
        .iter()
        .any(|f| !uploads::allowed_file(&f.filename, IMAGE_EXTENSIONS))
    {
        return Err(AppError::field("images", "Invalid file type."));
    }

    let config = Arc::clone(&state.config);
    let stored = uploads::offload(move || {
        let mut stored = Vec::with_capacity(files.len());
        for file in &files {
            match store(&config, file) {
                Ok(names) => stored.push(names),
                Err(e) => {
                    discard(&config, &stored);
                    return Err(e);
                }
            }
        }
        Ok(stored)
    })
    .await?;

    let rows = stored.clone();
    let saved = state
        .db
        .run(move |tx| {
            let mut images = Vec::with_capacity(rows.len());
            for (filename, thumbnail) in rows {
                let mut fields = meta.clone();
                fields.filename = filename;
                fields.thumbnail = Some(thumbnail);
                let id = db::gallery::insert(tx, &fields)?;
                images.push(db::gallery::get(tx, id)?);
            }
            Ok(images)
        })
        .await;

    match saved {
        Ok(images) => {
            info!("{} gallery image(s) uploaded", images.len());
            Ok(HttpResponse::Created().json(Uploaded { images }))
        }
        Err(e) => {
            discard(&state.config, &stored);
            Err(e)
        }
    }
}

pub async fn delete(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let image = state
        .db
        .run(move |tx| {
            let image = db::gallery::get(tx, id)?;
            db::gallery::delete(tx, id)?;
            Ok(image)
        })
        .await?;

    uploads::remove_best_effort(&state.config.gallery_folder().join(&image.filename));
    if let Some(thumbnail) = &image.thumbnail {
        uploads::remove_best_effort(&state.config.thumbnails_folder().join(thumbnail));
    }
    info!("gallery image {} deleted", id);
    Ok(notice("Image deleted."))
}
