//! Batches and the two-step enrollment workflow: list who can join, then
//! enroll a selection.

use crate::db::{self, batches::BatchFields};
use crate::error::AppError;
use crate::forms;
use crate::services::notice;
use crate::state::AppState;
use crate::view::View;
use actix_web::{web, HttpResponse};
use common::model::{Batch, BatchEnrollment, Faculty, Student, Subject, GRADES};
use common::requests::BatchForm;
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Serialize)]
struct BatchesPage {
    batches: Vec<Batch>,
}

/// Choices for the batch form.
#[derive(Serialize)]
struct BatchOptions {
    subjects: Vec<Subject>,
    faculty: Vec<Faculty>,
    grades: [i64; 4],
}

#[derive(Serialize)]
struct BatchEditPage {
    batch: Batch,
    #[serde(flatten)]
    options: BatchOptions,
}

#[derive(Serialize)]
struct EnrollmentPage {
    batch: Batch,
    available: Vec<Student>,
    enrolled: Vec<Student>,
}

#[derive(Serialize)]
struct Enrolled {
    enrolled: Vec<BatchEnrollment>,
    message: String,
}

fn load_options(conn: &Connection) -> Result<BatchOptions, AppError> {
    Ok(BatchOptions {
        subjects: db::subjects::list_active(conn)?,
        faculty: db::faculty::list_active(conn)?,
        grades: GRADES,
    })
}

/// A batch may only point at an active subject and, if any, an active
/// faculty member.
fn check_references(conn: &Connection, fields: &BatchFields) -> Result<(), AppError> {
    if !db::subjects::is_active(conn, fields.subject_id)? {
        return Err(AppError::field("subject_id", "Not a valid choice."));
    }
    if let Some(faculty_id) = fields.faculty_id {
        if !db::faculty::is_active(conn, faculty_id)? {
            return Err(AppError::field("faculty_id", "Not a valid choice."));
        }
    }
    Ok(())
}

fn active_batch(conn: &Connection, id: i64) -> Result<Batch, AppError> {
    db::batches::find(conn, id)?
        .filter(|b| b.is_active)
        .ok_or_else(|| AppError::not_found("batch"))
}

pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let batches = state.db.run(|tx| Ok(db::batches::list_active(tx)?)).await?;
    View::render(&state.settings, BatchesPage { batches }).await
}

pub async fn options(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let options = state.db.run(|tx| load_options(tx)).await?;
    View::render(&state.settings, options).await
}

pub async fn create(
    state: web::Data<AppState>,
    form: web::Form<BatchForm>,
) -> Result<HttpResponse, AppError> {
    let fields = forms::batch_fields(&form)?;
    let batch = state
        .db
        .run(move |tx| {
            check_references(tx, &fields)?;
            let id = db::batches::insert(tx, &fields)?;
            db::batches::get(tx, id)
        })
        .await?;
    info!("batch {} created", batch.name);
    Ok(HttpResponse::Created().json(batch))
}

pub async fn edit(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let page = state
        .db
        .run(move |tx| {
            Ok(BatchEditPage {
                batch: db::batches::get(tx, id)?,
                options: load_options(tx)?,
            })
        })
        .await?;
    View::render(&state.settings, page).await
}

pub async fn update(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    form: web::Form<BatchForm>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let fields = forms::batch_fields(&form)?;
    let batch = state
        .db
        .run(move |tx| {
            db::batches::get(tx, id)?;
            check_references(tx, &fields)?;
            db::batches::update(tx, id, &fields)?;
            db::batches::get(tx, id)
        })
        .await?;
    info!("batch {} updated", batch.name);
    Ok(HttpResponse::Ok().json(batch))
}

pub async fn deactivate(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let batch = state
        .db
        .run(move |tx| {
            let batch = db::batches::get(tx, id)?;
            db::batches::deactivate(tx, id)?;
            Ok(batch)
        })
        .await?;
    info!("batch {} deactivated", batch.name);
    Ok(notice("Batch deactivated."))
}

/// Students of the batch's grade who could join, and those already in.
pub async fn enrollment(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let page = state
        .db
        .run(move |tx| {
            let batch = active_batch(tx, id)?;
            Ok(EnrollmentPage {
                available: db::students::available_for_batch(tx, batch.grade, batch.id)?,
                enrolled: db::students::enrolled_in_batch(tx, batch.id)?,
                batch,
            })
        })
        .await?;
    View::render(&state.settings, page).await
}

/// Reads the repeated `student_ids` field of an urlencoded body.
pub fn parse_student_ids(body: &[u8]) -> Result<Vec<i64>, AppError> {
    let mut ids = Vec::new();
    for (key, value) in url::form_urlencoded::parse(body) {
        if key != "student_ids" {
            continue;
        }
        let id = value
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::field("student_ids", "Not a valid choice."))?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Enrolls every selected student or none of them. Anyone already in the
/// batch, and going over capacity, reject the whole request with `409`.
pub async fn enroll(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let student_ids = parse_student_ids(&body)?;
    if student_ids.is_empty() {
        return Err(AppError::field("student_ids", "Select at least one student."));
    }

    let enrolled = state
        .db
        .run(move |tx| {
            let batch = active_batch(tx, id)?;
            for student_id in &student_ids {
                let student = db::students::find(tx, *student_id)?.filter(|s| s.is_active);
                match student {
                    None => return Err(AppError::field("student_ids", "Not a valid choice.")),
                    Some(s) if s.grade != batch.grade => {
                        return Err(AppError::field(
                            "student_ids",
                            format!("{} is not in grade {}.", s.student_id, batch.grade),
                        ));
                    }
                    Some(_) => {}
                }
            }

            let existing: BTreeSet<i64> =
                db::batches::enrolled_student_ids(tx, batch.id)?.into_iter().collect();
            let duplicates: Vec<String> = student_ids
                .iter()
                .filter(|sid| existing.contains(*sid))
                .map(|sid| sid.to_string())
                .collect();
            if !duplicates.is_empty() {
                return Err(AppError::Conflict(format!(
                    "already enrolled in {}: {}",
                    batch.name,
                    duplicates.join(", ")
                )));
            }
            if existing.len() as i64 + student_ids.len() as i64 > batch.max_students {
                return Err(AppError::Conflict(format!(
                    "{} holds at most {} students",
                    batch.name, batch.max_students
                )));
            }

            student_ids
                .iter()
                .map(|sid| Ok(db::batches::enroll(tx, *sid, batch.id)?))
                .collect::<Result<Vec<_>, AppError>>()
        })
        .await?;

    let message = format!("{} student(s) enrolled!", enrolled.len());
    info!("batch {}: {}", id, message);
    Ok(HttpResponse::Created().json(Enrolled { enrolled, message }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_ids_are_collected_once() {
        let ids = parse_student_ids(b"student_ids=3&student_ids=5&csrf=x&student_ids=3").unwrap();
        assert_eq!(ids, vec![3, 5]);
        assert!(parse_student_ids(b"student_ids=abc").is_err());
        assert!(parse_student_ids(b"").unwrap().is_empty());
    }
}
