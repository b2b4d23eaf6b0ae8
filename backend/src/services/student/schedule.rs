use crate::db;
use crate::error::AppError;
use crate::state::AppState;
use crate::view::View;
use actix_web::{web, HttpResponse};
use common::model::{Batch, Student};
use serde::Serialize;

#[derive(Serialize)]
struct SchedulePage {
    batches: Vec<Batch>,
}

pub async fn process(
    state: web::Data<AppState>,
    student: web::ReqData<Student>,
) -> Result<HttpResponse, AppError> {
    let student_id = student.id;
    let batches = state
        .db
        .run(move |tx| Ok(db::batches::active_for_student(tx, student_id)?))
        .await?;
    View::render(&state.settings, SchedulePage { batches }).await
}
