use crate::db;
use crate::error::AppError;
use crate::forms;
use crate::services::notice;
use crate::state::AppState;
use crate::view::View;
use actix_web::{web, HttpResponse};
use common::model::Subject;
use common::requests::SubjectForm;
use log::info;
use serde::Serialize;

#[derive(Serialize)]
struct SubjectsPage {
    subjects: Vec<Subject>,
}

/// Every subject, deactivated ones included, so they can be told apart.
pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let subjects = state.db.run(|tx| Ok(db::subjects::list_all(tx)?)).await?;
    View::render(&state.settings, SubjectsPage { subjects }).await
}

pub async fn create(
    state: web::Data<AppState>,
    form: web::Form<SubjectForm>,
) -> Result<HttpResponse, AppError> {
    let fields = forms::subject_fields(&form)?;
    let subject = state
        .db
        .run(move |tx| {
            if db::subjects::code_taken(tx, &fields.code, None)? {
                return Err(AppError::field("code", "Code already in use."));
            }
            let id = db::subjects::insert(tx, &fields)?;
            db::subjects::get(tx, id)
        })
        .await?;
    info!("subject {} added", subject.code);
    Ok(HttpResponse::Created().json(subject))
}

pub async fn update(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    form: web::Form<SubjectForm>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let fields = forms::subject_fields(&form)?;
    let subject = state
        .db
        .run(move |tx| {
            db::subjects::get(tx, id)?;
            if db::subjects::code_taken(tx, &fields.code, Some(id))? {
                return Err(AppError::field("code", "Code already in use."));
            }
            db::subjects::update(tx, id, &fields)?;
            db::subjects::get(tx, id)
        })
        .await?;
    info!("subject {} updated", subject.code);
    Ok(HttpResponse::Ok().json(subject))
}

pub async fn deactivate(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let subject = state
        .db
        .run(move |tx| {
            let subject = db::subjects::get(tx, id)?;
            db::subjects::deactivate(tx, id)?;
            Ok(subject)
        })
        .await?;
    info!("subject {} deactivated", subject.code);
    Ok(notice("Subject deactivated."))
}
