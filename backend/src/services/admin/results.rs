use crate::db::{self, results::ResultFields, Paginated};
use crate::error::AppError;
use crate::forms;
use crate::services::notice;
use crate::state::AppState;
use crate::view::View;
use actix_web::{web, HttpResponse};
use common::model::{ExamResult, Student, Subject};
use common::requests::{ListQuery, ResultForm};
use log::info;
use rusqlite::Connection;
use serde::Serialize;

const PER_PAGE: u32 = 20;

#[derive(Serialize)]
struct ResultsPage {
    results: Paginated<ExamResult>,
}

#[derive(Serialize)]
struct ResultOptions {
    students: Vec<Student>,
    subjects: Vec<Subject>,
}

#[derive(Serialize)]
struct ResultEditPage {
    result: ExamResult,
    #[serde(flatten)]
    options: ResultOptions,
}

fn load_options(conn: &Connection) -> Result<ResultOptions, AppError> {
    Ok(ResultOptions {
        students: db::students::all_active(conn)?,
        subjects: db::subjects::list_active(conn)?,
    })
}

fn check_references(conn: &Connection, fields: &ResultFields) -> Result<(), AppError> {
    if !db::students::find(conn, fields.student_id)?.is_some_and(|s| s.is_active) {
        return Err(AppError::field("student_id", "Not a valid choice."));
    }
    if !db::subjects::is_active(conn, fields.subject_id)? {
        return Err(AppError::field("subject_id", "Not a valid choice."));
    }
    Ok(())
}

pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let page_number = query.page;
    let results = state
        .db
        .run(move |tx| Ok(db::results::list(tx, page_number, PER_PAGE)?))
        .await?;
    View::render(&state.settings, ResultsPage { results }).await
}

pub async fn options(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let options = state.db.run(|tx| load_options(tx)).await?;
    View::render(&state.settings, options).await
}

/// Stores the marks together with the letter grade they earn.
pub async fn create(
    state: web::Data<AppState>,
    form: web::Form<ResultForm>,
) -> Result<HttpResponse, AppError> {
    let fields = forms::result_fields(&form)?;
    let result = state
        .db
        .run(move |tx| {
            check_references(tx, &fields)?;
            let id = db::results::insert(tx, &fields)?;
            db::results::get(tx, id)
        })
        .await?;
    info!(
        "result {} recorded: {}/{}",
        result.id, result.marks_obtained, result.total_marks
    );
    Ok(HttpResponse::Created().json(result))
}

pub async fn edit(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let page = state
        .db
        .run(move |tx| {
            Ok(ResultEditPage {
                result: db::results::get(tx, id)?,
                options: load_options(tx)?,
            })
        })
        .await?;
    View::render(&state.settings, page).await
}

/// Edited marks get a freshly computed letter grade.
pub async fn update(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    form: web::Form<ResultForm>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let fields = forms::result_fields(&form)?;
    let result = state
        .db
        .run(move |tx| {
            db::results::get(tx, id)?;
            check_references(tx, &fields)?;
            db::results::update(tx, id, &fields)?;
            db::results::get(tx, id)
        })
        .await?;
    info!("result {} updated", result.id);
    Ok(HttpResponse::Ok().json(result))
}

pub async fn delete(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    state
        .db
        .run(move |tx| {
            db::results::get(tx, id)?;
            db::results::delete(tx, id)?;
            Ok(())
        })
        .await?;
    info!("result {} deleted", id);
    Ok(notice("Result deleted."))
}
