mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use support::{location, login, login_admin, TestApp, STUDENT_PASSWORD};

#[actix_web::test]
async fn anonymous_visitors_are_sent_to_the_login_form() {
    let harness = TestApp::new();
    let app = harness.service().await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/admin/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login?role=admin&next=%2Fadmin%2F");

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/student/results").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(location(&resp).starts_with("/auth/login?role=student"));
}

#[actix_web::test]
async fn a_signed_in_user_of_the_other_role_is_forbidden() {
    let harness = TestApp::new();
    harness.add_student("MPC-2026-001", "a@example.com", 10);
    let app = harness.service().await;

    let student = login(&app, "student", "MPC-2026-001", STUDENT_PASSWORD).await;
    let req = test::TestRequest::get()
        .uri("/admin/")
        .cookie(student)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let admin = login_admin(&app).await;
    let req = test::TestRequest::get()
        .uri("/student/")
        .cookie(admin)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn wrong_passwords_are_rejected() {
    let harness = TestApp::new();
    let app = harness.service().await;

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_form([("username", "admin"), ("password", "nope"), ("role", "admin")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.response().cookies().next().is_none());
}

#[actix_web::test]
async fn deactivated_students_cannot_sign_in() {
    let harness = TestApp::new();
    let id = harness.add_student("MPC-2026-001", "a@example.com", 10);
    harness
        .state
        .db
        .transact(|tx| Ok(portal::db::students::deactivate(tx, id)?))
        .unwrap();
    let app = harness.service().await;

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_form([
            ("username", "MPC-2026-001"),
            ("password", STUDENT_PASSWORD),
            ("role", "student"),
        ])
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn login_follows_a_local_next_path() {
    let harness = TestApp::new();
    let app = harness.service().await;

    let req = test::TestRequest::post()
        .uri("/auth/login?next=%2Fadmin%2Fmessages")
        .set_form([("username", "admin"), ("password", "admin123"), ("role", "admin")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/messages");
}

#[actix_web::test]
async fn logout_clears_the_session() {
    let harness = TestApp::new();
    let app = harness.service().await;
    let admin = login_admin(&app).await;

    let req = test::TestRequest::get()
        .uri("/auth/logout")
        .cookie(admin)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    let cleared = resp
        .response()
        .cookies()
        .find(|c| c.name() == portal::auth::session::SESSION_COOKIE)
        .unwrap();
    assert!(cleared.value().is_empty());
}
