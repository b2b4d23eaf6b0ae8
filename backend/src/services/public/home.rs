use crate::db;
use crate::error::AppError;
use crate::state::AppState;
use crate::view::View;
use actix_web::{web, HttpResponse};
use common::model::{Announcement, Subject, Testimonial};
use serde::Serialize;

const FEATURED_TESTIMONIALS: u32 = 6;
const LATEST_ANNOUNCEMENTS: u32 = 5;

#[derive(Serialize)]
pub struct Stats {
    pub students: i64,
    pub faculty: i64,
    pub batches: i64,
}

#[derive(Serialize)]
struct HomePage {
    subjects: Vec<Subject>,
    testimonials: Vec<Testimonial>,
    announcements: Vec<Announcement>,
    stats: Stats,
}

pub async fn process(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let page = state
        .db
        .run(|tx| {
            Ok(HomePage {
                subjects: db::subjects::list_active(tx)?,
                testimonials: db::testimonials::featured(tx, FEATURED_TESTIMONIALS)?,
                announcements: db::announcements::recent_active(tx, None, LATEST_ANNOUNCEMENTS)?,
                stats: Stats {
                    students: db::students::count_active(tx)?,
                    faculty: db::faculty::count_active(tx)?,
                    batches: db::batches::count_active(tx)?,
                },
            })
        })
        .await?;
    View::render(&state.settings, page).await
}
