use crate::db;
use crate::error::AppError;
use crate::state::AppState;
use crate::view::View;
use actix_web::{web, HttpResponse};
use common::model::ContactMessage;
use serde::Serialize;

#[derive(Serialize)]
struct MessagesPage {
    messages: Vec<ContactMessage>,
    unread: i64,
}

#[derive(Serialize)]
struct MessagePage {
    message: ContactMessage,
}

pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let page = state
        .db
        .run(|tx| {
            Ok(MessagesPage {
                messages: db::messages::list(tx, None)?,
                unread: db::messages::count_unread(tx)?,
            })
        })
        .await?;
    View::render(&state.settings, page).await
}

/// Opening a message marks it read.
pub async fn show(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let message = state
        .db
        .run(move |tx| {
            db::messages::get(tx, id)?;
            db::messages::mark_read(tx, id)?;
            db::messages::get(tx, id)
        })
        .await?;
    View::render(&state.settings, MessagePage { message }).await
}
