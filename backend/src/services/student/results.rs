use crate::db;
use crate::error::AppError;
use crate::state::AppState;
use crate::view::View;
use actix_web::{web, HttpResponse};
use common::model::{ExamResult, Student, Subject};
use common::requests::SubjectFilter;
use serde::Serialize;

#[derive(Serialize)]
struct ResultsPage {
    results: Vec<ExamResult>,
    subjects: Vec<Subject>,
    selected_subject: Option<i64>,
}

/// The student's own results, latest exam first.
pub async fn process(
    state: web::Data<AppState>,
    student: web::ReqData<Student>,
    filter: web::Query<SubjectFilter>,
) -> Result<HttpResponse, AppError> {
    let student_id = student.id;
    let subject = filter.subject.filter(|s| *s != 0);
    let page = state
        .db
        .run(move |tx| {
            Ok(ResultsPage {
                results: db::results::for_student(tx, student_id, subject, None)?,
                subjects: db::subjects::list_active(tx)?,
                selected_subject: subject,
            })
        })
        .await?;
    View::render(&state.settings, page).await
}
