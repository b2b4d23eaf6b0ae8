use crate::db;
use crate::error::AppError;
use crate::forms;
use crate::state::AppState;
use crate::view::View;
use actix_web::{web, HttpResponse};
use common::requests::ContactForm;
use log::info;
use serde::Serialize;

#[derive(Serialize)]
struct ContactPage {
    sent: bool,
}

pub async fn form(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    View::render(&state.settings, ContactPage { sent: false }).await
}

/// Stores the message for the back office. Nothing else happens; there is
/// no mail delivery.
pub async fn submit(
    state: web::Data<AppState>,
    form: web::Form<ContactForm>,
) -> Result<HttpResponse, AppError> {
    let fields = forms::message_fields(&form)?;
    let id = state
        .db
        .run(move |tx| Ok(db::messages::insert(tx, &fields)?))
        .await?;
    info!("contact message {} received", id);
    Ok(HttpResponse::Created().json(serde_json::json!({
        "id": id,
        "message": "Thank you! Your message has been sent. We will get back to you soon.",
    })))
}
