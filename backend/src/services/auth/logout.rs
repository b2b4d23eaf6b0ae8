use crate::auth::session;
use actix_web::http::header::LOCATION;
use actix_web::HttpResponse;

/// Drops the session cookie and returns to the home page.
pub async fn process() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, "/"))
        .cookie(session::removal())
        .finish()
}
