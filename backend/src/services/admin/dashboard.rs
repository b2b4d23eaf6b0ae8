use crate::db;
use crate::error::AppError;
use crate::state::AppState;
use crate::view::View;
use actix_web::{web, HttpResponse};
use common::model::{AdminUser, ContactMessage, Student};
use serde::Serialize;

const RECENT: u32 = 5;

#[derive(Serialize)]
struct Counts {
    students: i64,
    batches: i64,
    unread_messages: i64,
    announcements: i64,
}

#[derive(Serialize)]
struct DashboardPage {
    admin: AdminUser,
    counts: Counts,
    recent_students: Vec<Student>,
    recent_messages: Vec<ContactMessage>,
}

pub async fn process(
    state: web::Data<AppState>,
    admin: web::ReqData<AdminUser>,
) -> Result<HttpResponse, AppError> {
    let admin = admin.into_inner();
    let page = state
        .db
        .run(move |tx| {
            Ok(DashboardPage {
                admin,
                counts: Counts {
                    students: db::students::count_active(tx)?,
                    batches: db::batches::count_active(tx)?,
                    unread_messages: db::messages::count_unread(tx)?,
                    announcements: db::announcements::count_active(tx)?,
                },
                recent_students: db::students::recent_active(tx, RECENT)?,
                recent_messages: db::messages::list(tx, Some(RECENT))?,
            })
        })
        .await?;
    View::render(&state.settings, page).await
}
