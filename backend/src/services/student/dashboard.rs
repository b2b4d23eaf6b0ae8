use crate::db;
use crate::error::AppError;
use crate::state::AppState;
use crate::view::View;
use actix_web::{web, HttpResponse};
use common::model::{Announcement, Batch, ExamResult, Student};
use serde::Serialize;

const LATEST: u32 = 5;

#[derive(Serialize)]
struct DashboardPage {
    student: Student,
    announcements: Vec<Announcement>,
    batches: Vec<Batch>,
    recent_results: Vec<ExamResult>,
}

pub async fn process(
    state: web::Data<AppState>,
    student: web::ReqData<Student>,
) -> Result<HttpResponse, AppError> {
    let student = student.into_inner();
    let page = state
        .db
        .run(move |tx| {
            Ok(DashboardPage {
                announcements: db::announcements::recent_active(tx, Some(student.grade), LATEST)?,
                batches: db::batches::active_for_student(tx, student.id)?,
                recent_results: db::results::for_student(tx, student.id, None, Some(LATEST))?,
                student,
            })
        })
        .await?;
    View::render(&state.settings, page).await
}
