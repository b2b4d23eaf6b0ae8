use crate::db;
use crate::error::AppError;
use crate::state::AppState;
use crate::view::View;
use actix_web::{web, HttpResponse};
use common::model::{Faculty, GalleryImage, Testimonial};
use serde::Serialize;

#[derive(Serialize)]
struct FacultyPage {
    faculty: Vec<Faculty>,
}

#[derive(Serialize)]
struct GalleryPage {
    images: Vec<GalleryImage>,
    categories: Vec<String>,
}

#[derive(Serialize)]
struct TestimonialsPage {
    testimonials: Vec<Testimonial>,
}

async fn faculty_page(state: &AppState) -> Result<HttpResponse, AppError> {
    let faculty = state.db.run(|tx| Ok(db::faculty::list_active(tx)?)).await?;
    View::render(&state.settings, FacultyPage { faculty }).await
}

/// The about page introduces the team, so it shares the faculty listing.
pub async fn about(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    faculty_page(&state).await
}

pub async fn faculty(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    faculty_page(&state).await
}

pub async fn gallery(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let page = state
        .db
        .run(|tx| {
            Ok(GalleryPage {
                images: db::gallery::list_active(tx)?,
                categories: db::gallery::active_categories(tx)?,
            })
        })
        .await?;
    View::render(&state.settings, page).await
}

pub async fn testimonials(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let testimonials = state
        .db
        .run(|tx| Ok(db::testimonials::list_active(tx)?))
        .await?;
    View::render(&state.settings, TestimonialsPage { testimonials }).await
}
