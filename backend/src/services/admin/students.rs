//! Student records. Creation and password resets hand out a generated
//! password exactly once; only its hash is kept.

use crate::auth::password;
use crate::db::{self, Paginated};
use crate::error::AppError;
use crate::forms;
use crate::services::notice;
use crate::state::AppState;
use crate::view::View;
use actix_web::{web, HttpResponse};
use chrono::{Datelike, Local};
use common::model::{AdminUser, Batch, ExamResult, Student, GRADES};
use common::requests::{ListQuery, StudentForm};
use log::info;
use serde::Serialize;

const PER_PAGE: u32 = 15;

#[derive(Serialize)]
struct StudentsPage {
    students: Paginated<Student>,
    search: Option<String>,
    grade: Option<i64>,
    grades: [i64; 4],
}

#[derive(Serialize)]
struct StudentPage {
    student: Student,
    batches: Vec<Batch>,
    results: Vec<ExamResult>,
}

/// Answer to a create or reset: the only time the password is visible.
#[derive(Serialize)]
struct Credentials {
    student: Student,
    password: String,
}

pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let search = query.search.clone();
    let grade = query.grade.filter(|g| *g != 0);
    let students = state
        .db
        .run(move |tx| {
            Ok(db::students::list_active(
                tx,
                search.as_deref(),
                grade,
                query.page,
                PER_PAGE,
            )?)
        })
        .await?;
    let page = StudentsPage {
        students,
        search: query.search,
        grade,
        grades: GRADES,
    };
    View::render(&state.settings, page).await
}

/// Any student by id, including deactivated ones.
pub async fn show(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let page = state
        .db
        .run(move |tx| {
            Ok(StudentPage {
                student: db::students::get(tx, id)?,
                batches: db::batches::active_for_student(tx, id)?,
                results: db::results::for_student(tx, id, None, None)?,
            })
        })
        .await?;
    View::render(&state.settings, page).await
}

pub async fn create(
    state: web::Data<AppState>,
    admin: web::ReqData<AdminUser>,
    form: web::Form<StudentForm>,
) -> Result<HttpResponse, AppError> {
    let fields = forms::student_fields(&form)?;
    let prefix = state.config.student_id_prefix.clone();
    let cost = state.config.bcrypt_cost;
    let year = Local::now().year();

    let credentials = state
        .db
        .run(move |tx| {
            if db::students::email_taken(tx, &fields.email, None)? {
                return Err(AppError::field("email", "Email already registered."));
            }
            let student_id = db::students::next_student_id(tx, &prefix, year)?;
            let plain = password::generate();
            let hashed = password::hash(&plain, cost)?;
            let id = db::students::insert(tx, &student_id, &fields, &hashed)?;
            Ok(Credentials {
                student: db::students::get(tx, id)?,
                password: plain,
            })
        })
        .await?;

    info!(
        "{} added student {}",
        admin.username, credentials.student.student_id
    );
    Ok(HttpResponse::Created().json(credentials))
}

/// Profile fields only; the student-id and password stay as they are.
pub async fn update(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    form: web::Form<StudentForm>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let fields = forms::student_fields(&form)?;
    let student = state
        .db
        .run(move |tx| {
            db::students::get(tx, id)?;
            if db::students::email_taken(tx, &fields.email, Some(id))? {
                return Err(AppError::field("email", "Email already registered."));
            }
            db::students::update(tx, id, &fields)?;
            db::students::get(tx, id)
        })
        .await?;
    info!("student {} updated", student.student_id);
    Ok(HttpResponse::Ok().json(student))
}

pub async fn deactivate(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let student = state
        .db
        .run(move |tx| {
            let student = db::students::get(tx, id)?;
            db::students::deactivate(tx, id)?;
            Ok(student)
        })
        .await?;
    info!("student {} deactivated", student.student_id);
    Ok(notice("Student deactivated."))
}

pub async fn reset_password(
    state: web::Data<AppState>,
    admin: web::ReqData<AdminUser>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let cost = state.config.bcrypt_cost;
    let credentials = state
        .db
        .run(move |tx| {
            let student = db::students::get(tx, id)?;
            let plain = password::generate();
            db::students::set_password(tx, id, &password::hash(&plain, cost)?)?;
            Ok(Credentials {
                student,
                password: plain,
            })
        })
        .await?;
    info!(
        "{} reset the password of {}",
        admin.username, credentials.student.student_id
    );
    Ok(HttpResponse::Ok().json(credentials))
}
