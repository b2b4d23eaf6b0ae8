//! Study material. Notes are PDFs kept under the notes folder; removing a
//! note hides it from students and deletes the file.

use crate::db;
use crate::error::AppError;
use crate::forms;
use crate::services::notice;
use crate::state::AppState;
use crate::uploads::{self, UploadForm, NOTE_EXTENSIONS};
use crate::view::View;
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::{Note, Subject, GRADES};
use common::requests::NoteUploadForm;
use log::info;
use serde::Serialize;

#[derive(Serialize)]
struct NotesPage {
    notes: Vec<Note>,
}

#[derive(Serialize)]
struct NoteOptions {
    subjects: Vec<Subject>,
    grades: [i64; 4],
}

pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let notes = state.db.run(|tx| Ok(db::notes::list_active(tx)?)).await?;
    View::render(&state.settings, NotesPage { notes }).await
}

pub async fn options(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let subjects = state.db.run(|tx| Ok(db::subjects::list_active(tx)?)).await?;
    let page = NoteOptions {
        subjects,
        grades: GRADES,
    };
    View::render(&state.settings, page).await
}

/// Expects the PDF under `file`.
pub async fn upload(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse, AppError> {
    let mut form = UploadForm::read(&req, payload, state.config.max_content_length).await?;
    let fields = forms::note_fields(&form.parse::<NoteUploadForm>()?)?;
    let Some(file) = form.take_file("file") else {
        return Err(AppError::field("file", "Please select a file."));
    };
    if !uploads::allowed_file(&file.filename, NOTE_EXTENSIONS) {
        return Err(AppError::field("file", "PDF files only!"));
    }

    let dir = state.config.notes_folder();
    let (filename, size) =
        uploads::offload(move || uploads::save_file(&file.bytes, &file.filename, &dir)).await?;

    let stored = filename.clone();
    let saved = state
        .db
        .run(move |tx| {
            if !db::subjects::is_active(tx, fields.subject_id)? {
                return Err(AppError::field("subject_id", "Please select a subject."));
            }
            let id = db::notes::insert(tx, &fields, &stored, size)?;
            db::notes::get(tx, id)
        })
        .await;

    match saved {
        Ok(note) => {
            info!("note {} uploaded as {}", note.title, note.filename);
            Ok(HttpResponse::Created().json(note))
        }
        Err(e) => {
            uploads::remove_best_effort(&state.config.notes_folder().join(&filename));
            Err(e)
        }
    }
}

pub async fn deactivate(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let note = state
        .db
        .run(move |tx| {
            let note = db::notes::get(tx, id)?;
            db::notes::deactivate(tx, id)?;
            Ok(note)
        })
        .await?;
    uploads::remove_best_effort(&state.config.notes_folder().join(&note.filename));
    info!("note {} removed", note.title);
    Ok(notice("Note deleted."))
}
