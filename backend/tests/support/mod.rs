//! Harness shared by the HTTP tests: a throwaway database and upload root,
//! an app wired exactly like the server, and sign-in helpers.

#![allow(dead_code)]

use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header::LOCATION;
use actix_web::http::StatusCode;
use actix_web::{test, App, Error};
use portal::auth::password;
use portal::auth::session::SESSION_COOKIE;
use portal::config::Config;
use portal::db::batches::BatchFields;
use portal::db::students::StudentFields;
use portal::db::subjects::SubjectFields;
use portal::db::{self, Db};
use portal::state::AppState;
use portal::{configure_app, uploads};
use tempfile::TempDir;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const STUDENT_PASSWORD: &str = "student-pass";

pub struct TestApp {
    /// Holds the database and uploads until the test ends.
    pub dir: TempDir,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: dir.path().join("portal.db"),
            upload_folder: dir.path().join("uploads"),
            bcrypt_cost: 4,
            ..Config::default()
        };
        uploads::prepare_folders(&config).unwrap();
        let db = Db::open(&config.database_path).unwrap();

        let hash = password::hash(ADMIN_PASSWORD, 4).unwrap();
        db.transact(|tx| {
            Ok(db::admins::insert(
                tx,
                ADMIN_USERNAME,
                "admin@example.com",
                &hash,
                "Administrator",
                true,
            )?)
        })
        .unwrap();

        TestApp {
            dir,
            state: AppState::new(config, db),
        }
    }

    pub async fn service(
        &self,
    ) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = Error> {
        test::init_service(App::new().configure(configure_app(self.state.clone()))).await
    }

    pub fn add_subject(&self, code: &str) -> i64 {
        let fields = SubjectFields {
            name: format!("Subject {}", code),
            code: code.to_string(),
            description: None,
            icon: None,
            color: None,
        };
        self.state
            .db
            .transact(|tx| Ok(db::subjects::insert(tx, &fields)?))
            .unwrap()
    }

    pub fn add_batch(&self, subject_id: i64, grade: i64, max_students: i64) -> i64 {
        let fields = BatchFields {
            name: format!("Grade {} batch", grade),
            subject_id,
            grade,
            faculty_id: None,
            schedule: None,
            start_date: None,
            end_date: None,
            max_students,
        };
        self.state
            .db
            .transact(|tx| Ok(db::batches::insert(tx, &fields)?))
            .unwrap()
    }

    /// Inserts an active student who can sign in with `STUDENT_PASSWORD`.
    pub fn add_student(&self, student_id: &str, email: &str, grade: i64) -> i64 {
        let fields = StudentFields {
            full_name: format!("Student {}", student_id),
            email: email.to_string(),
            phone: None,
            grade,
            parent_name: None,
            parent_phone: None,
            address: None,
            date_of_birth: None,
        };
        let hash = password::hash(STUDENT_PASSWORD, 4).unwrap();
        self.state
            .db
            .transact(|tx| Ok(db::students::insert(tx, student_id, &fields, &hash)?))
            .unwrap()
    }
}

/// Posts the login form and returns the session cookie it sets.
pub async fn login<S>(app: &S, role: &str, username: &str, password: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = Error>,
{
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_form([("username", username), ("password", password), ("role", role)])
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER, "login as {} failed", username);
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
        .expect("login sets the session cookie")
}

pub async fn login_admin<S>(app: &S) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = Error>,
{
    login(app, "admin", ADMIN_USERNAME, ADMIN_PASSWORD).await
}

pub fn location(resp: &ServiceResponse) -> &str {
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub const BOUNDARY: &str = "----portal-test-boundary";

/// A `multipart/form-data` body with text fields followed by files given as
/// `(field, filename, bytes)`.
pub fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    for (name, filename, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

/// A PNG of the given size, encoded in memory.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}
