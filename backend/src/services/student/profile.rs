//! Profile page. One POST endpoint serves two forms; the submit button's
//! name (`update_profile` or `change_password`) says which one was sent.

use crate::auth::password;
use crate::db;
use crate::error::AppError;
use crate::forms::{self, Checker};
use crate::services::notice;
use crate::state::AppState;
use crate::uploads::{self, ImageSpec, UploadForm, IMAGE_EXTENSIONS};
use crate::view::View;
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::{Student, DEFAULT_AVATAR};
use common::requests::{ChangePasswordForm, ProfileForm};
use log::info;
use serde::Serialize;

#[derive(Serialize)]
struct ProfilePage {
    student: Student,
}

pub async fn show(
    state: web::Data<AppState>,
    student: web::ReqData<Student>,
) -> Result<HttpResponse, AppError> {
    let page = ProfilePage {
        student: student.into_inner(),
    };
    View::render(&state.settings, page).await
}

pub async fn update(
    state: web::Data<AppState>,
    student: web::ReqData<Student>,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse, AppError> {
    let form = UploadForm::read(&req, payload, state.config.max_content_length).await?;
    let student = student.into_inner();

    if form.has_field("change_password") {
        change_password(&state, student, form.parse()?).await
    } else if form.has_field("update_profile") {
        update_profile(&state, student, form).await
    } else {
        Err(AppError::BadRequest(
            "expected either update_profile or change_password".to_string(),
        ))
    }
}

async fn update_profile(
    state: &AppState,
    student: Student,
    mut form: UploadForm,
) -> Result<HttpResponse, AppError> {
    let profile: ProfileForm = form.parse()?;
    let mut c = Checker::default();
    let phone = c.optional("phone", &profile.phone, 15);
    let address = c.optional("address", &profile.address, 0);
    let avatar = form.take_file("avatar");
    if let Some(file) = &avatar {
        if !uploads::allowed_file(&file.filename, IMAGE_EXTENSIONS) {
            c.fail("avatar", "Images only!");
        }
    }
    c.finish(())?;

    let avatars = state.config.avatars_folder();
    let stored = match avatar {
        Some(file) => {
            let dir = avatars.clone();
            Some(
                uploads::offload(move || {
                    uploads::save_image(&file.bytes, &file.filename, &dir, ImageSpec::AVATAR)
                })
                .await?,
            )
        }
        None => None,
    };

    let id = student.id;
    let new_avatar = stored.clone();
    let saved = state
        .db
        .run(move |tx| {
            db::students::update_contact(
                tx,
                id,
                phone.as_deref(),
                address.as_deref(),
                new_avatar.as_deref(),
            )?;
            db::students::get(tx, id)
        })
        .await;
    let updated = match saved {
        Ok(updated) => updated,
        Err(e) => {
            if let Some(name) = &stored {
                uploads::remove_best_effort(&avatars.join(name));
            }
            return Err(e);
        }
    };

    if stored.is_some() && student.avatar != DEFAULT_AVATAR {
        uploads::remove_best_effort(&avatars.join(&student.avatar));
    }
    info!("student {} updated their profile", student.student_id);
    Ok(HttpResponse::Ok().json(ProfilePage { student: updated }))
}

async fn change_password(
    state: &AppState,
    student: Student,
    form: ChangePasswordForm,
) -> Result<HttpResponse, AppError> {
    forms::password_change(&form)?;
    let cost = state.config.bcrypt_cost;
    let id = student.id;
    state
        .db
        .run(move |tx| {
            let current = db::students::get(tx, id)?;
            if !password::verify(&form.current_password, &current.password_hash) {
                return Err(AppError::field(
                    "current_password",
                    "Current password is incorrect.",
                ));
            }
            let hashed = password::hash(&form.new_password, cost)?;
            db::students::set_password(tx, id, &hashed)?;
            Ok(())
        })
        .await?;
    info!("student {} changed their password", student.student_id);
    Ok(notice("Password changed successfully!"))
}
