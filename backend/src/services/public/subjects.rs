use crate::db;
use crate::error::AppError;
use crate::state::AppState;
use crate::view::View;
use actix_web::{web, HttpResponse};
use common::model::{Batch, Faculty, Subject};
use serde::Serialize;

#[derive(Serialize)]
struct SubjectsPage {
    subjects: Vec<Subject>,
}

#[derive(Serialize)]
struct SubjectPage {
    subject: Subject,
    batches: Vec<Batch>,
    faculty: Vec<Faculty>,
}

pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let subjects = state.db.run(|tx| Ok(db::subjects::list_active(tx)?)).await?;
    View::render(&state.settings, SubjectsPage { subjects }).await
}

/// Unknown and deactivated codes are both `404`.
pub async fn detail(
    state: web::Data<AppState>,
    code: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let code = code.into_inner().to_ascii_uppercase();
    let page = state
        .db
        .run(move |tx| {
            let subject = db::subjects::find_active_by_code(tx, &code)?
                .ok_or_else(|| AppError::not_found("subject"))?;
            Ok(SubjectPage {
                batches: db::batches::list_active_for_subject(tx, subject.id)?,
                faculty: db::faculty::teaching_subject(tx, subject.id)?,
                subject,
            })
        })
        .await?;
    View::render(&state.settings, page).await
}
