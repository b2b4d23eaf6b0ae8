//! Role guards, applied as middleware to whole scopes.
//!
//! The guard runs before any handler in its scope: an anonymous caller is
//! sent to the login page with a return target, a caller of the other role
//! gets `403`. On success the resolved `AdminUser` or `Student` is placed in
//! the request extensions, so handlers take it as `web::ReqData<_>`.

use super::{resolve, session, Principal};
use crate::error::AppError;
use crate::state::AppState;
use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::LOCATION;
use actix_web::middleware::Next;
use actix_web::{error, web, Error, HttpMessage, HttpResponse};
use common::model::Role;
use log::debug;

pub async fn require_admin(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    require(Role::Admin, req, next).await
}

pub async fn require_student(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    require(Role::Student, req, next).await
}

async fn require<B: MessageBody + 'static>(
    role: Role,
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| error::ErrorInternalServerError("application state missing"))?;

    let principal = match session::from_service_request(&state.cookie_key, &req) {
        Some(identity) => state.db.run(move |tx| resolve(tx, identity)).await?,
        None => None,
    };

    match principal {
        None => {
            let target = req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| req.path().to_string());
            debug!("anonymous request to {} redirected to login", target);
            let response = HttpResponse::Found()
                .insert_header((LOCATION, login_location(role, &target)))
                .finish();
            return Ok(req.into_response(response));
        }
        Some(principal) if principal.role() != role => {
            debug!("{} denied access to {}", principal.identity(), req.path());
            return Ok(req.error_response(AppError::Forbidden));
        }
        Some(Principal::Admin(admin)) => {
            req.extensions_mut().insert(admin);
        }
        Some(Principal::Student(student)) => {
            req.extensions_mut().insert(student);
        }
    }

    Ok(next.call(req).await?.map_into_boxed_body())
}

/// `/auth/login?role=..&next=..` with both values form-encoded.
pub fn login_location(role: Role, next: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("role", role.as_str())
        .append_pair("next", next)
        .finish();
    format!("/auth/login?{}", query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_location_encodes_the_return_target() {
        assert_eq!(
            login_location(Role::Student, "/student/results?subject=2"),
            "/auth/login?role=student&next=%2Fstudent%2Fresults%3Fsubject%3D2"
        );
    }
}
