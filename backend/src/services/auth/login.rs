use crate::auth::{self, session};
use crate::error::{AppError, FieldErrors};
use crate::services::see_other;
use crate::state::AppState;
use crate::view::View;
use actix_web::http::header::LOCATION;
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::Role;
use common::requests::LoginForm;
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginQuery {
    pub role: Option<String>,
    pub next: Option<String>,
}

#[derive(Serialize)]
struct LoginPage {
    role: Role,
    next: Option<String>,
}

/// Anything but `admin` logs in as a student.
fn role_of(value: Option<&str>) -> Role {
    match value {
        Some("admin") => Role::Admin,
        _ => Role::Student,
    }
}

/// Only same-site paths are followed after login.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
}

/// Shows the login form, or sends an already signed-in caller to their
/// dashboard.
pub async fn form(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<LoginQuery>,
) -> Result<HttpResponse, AppError> {
    if let Some(identity) = session::from_request(&state.cookie_key, &req) {
        let principal = state.db.run(move |tx| auth::resolve(tx, identity)).await?;
        if let Some(principal) = principal {
            return Ok(see_other(principal.role().dashboard_path()));
        }
    }
    let query = query.into_inner();
    let page = LoginPage {
        role: role_of(query.role.as_deref()),
        next: safe_next(query.next.as_deref()).map(str::to_string),
    };
    View::render(&state.settings, page).await
}

pub async fn process(
    state: web::Data<AppState>,
    query: web::Query<LoginQuery>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let role = if form.role.is_empty() {
        role_of(query.role.as_deref())
    } else {
        role_of(Some(form.role.as_str()))
    };

    let mut errors = FieldErrors::default();
    if form.username.trim().is_empty() {
        errors.add("username", "This field is required.");
    }
    if form.password.is_empty() {
        errors.add("password", "This field is required.");
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let username = form.username.trim().to_string();
    let password = form.password;
    let principal = state
        .db
        .run(move |tx| auth::authenticate(tx, role, &username, &password))
        .await?;
    let identity = principal.identity();
    info!("{} signed in", identity);

    let target = safe_next(query.next.as_deref()).unwrap_or(role.dashboard_path());
    Ok(HttpResponse::SeeOther()
        .insert_header((LOCATION, target))
        .cookie(session::issue(&state.cookie_key, identity))
        .finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_local_paths_are_followed() {
        assert_eq!(safe_next(Some("/student/notes")), Some("/student/notes"));
        assert_eq!(safe_next(Some("https://evil.example")), None);
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(None), None);
    }

    #[test]
    fn unknown_roles_fall_back_to_student() {
        assert_eq!(role_of(Some("admin")), Role::Admin);
        assert_eq!(role_of(Some("teacher")), Role::Student);
        assert_eq!(role_of(None), Role::Student);
    }
}
