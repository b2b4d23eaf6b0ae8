use crate::db;
use crate::error::AppError;
use crate::state::AppState;
use crate::view::View;
use actix_files::NamedFile;
use actix_web::http::header::{
    Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue,
};
use actix_web::{web, HttpResponse};
use common::model::{Note, Student, Subject};
use common::requests::SubjectFilter;
use log::warn;
use serde::Serialize;
use std::io::ErrorKind;

#[derive(Serialize)]
struct NotesPage {
    notes: Vec<Note>,
    subjects: Vec<Subject>,
    selected_subject: Option<i64>,
}

/// Active notes for the student's grade, grouped by subject and chapter.
pub async fn list(
    state: web::Data<AppState>,
    student: web::ReqData<Student>,
    filter: web::Query<SubjectFilter>,
) -> Result<HttpResponse, AppError> {
    let grade = student.grade;
    let subject = filter.subject.filter(|s| *s != 0);
    let page = state
        .db
        .run(move |tx| {
            Ok(NotesPage {
                notes: db::notes::for_grade(tx, grade, subject)?,
                subjects: db::subjects::list_active(tx)?,
                selected_subject: subject,
            })
        })
        .await?;
    View::render(&state.settings, page).await
}

/// Streams the PDF as an attachment named after the note's title. Notes of
/// other grades and removed notes are treated as missing.
pub async fn download(
    state: web::Data<AppState>,
    student: web::ReqData<Student>,
    id: web::Path<i64>,
) -> Result<NamedFile, AppError> {
    let id = id.into_inner();
    let grade = student.grade;
    let note = state
        .db
        .run(move |tx| {
            Ok(db::notes::find(tx, id)?.filter(|n| n.is_active && n.grade == grade))
        })
        .await?
        .ok_or_else(|| AppError::not_found("note"))?;

    let path = state.config.notes_folder().join(&note.filename);
    let file = match NamedFile::open_async(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("note {} is missing its file {}", note.id, path.display());
            return Err(AppError::not_found("file"));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(file.set_content_disposition(attachment(&note.title)))
}

/// `attachment` named `<title>.pdf`. Control characters become spaces;
/// a non-ASCII title is sent as `filename*` with an ASCII fallback.
fn attachment(title: &str) -> ContentDisposition {
    let cleaned: String = title
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let cleaned = cleaned.trim();
    let name = format!("{}.pdf", if cleaned.is_empty() { "note" } else { cleaned });
    let ascii: String = name
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();

    let mut parameters = vec![DispositionParam::Filename(ascii.clone())];
    if ascii != name {
        parameters.push(DispositionParam::FilenameExt(ExtendedValue {
            charset: Charset::Ext("UTF-8".to_string()),
            language_tag: None,
            value: name.into_bytes(),
        }));
    }
    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_names_never_carry_control_characters() {
        let header = attachment("line1\nline2").to_string();
        assert_eq!(header, "attachment; filename=\"line1 line2.pdf\"");
    }

    #[test]
    fn non_ascii_titles_get_an_extended_filename() {
        let disposition = attachment("Ångström");
        assert_eq!(disposition.get_filename(), Some("_ngstr_m.pdf"));
        let ext = disposition.get_filename_ext().unwrap();
        assert_eq!(ext.value, "Ångström.pdf".as_bytes());
    }
}
