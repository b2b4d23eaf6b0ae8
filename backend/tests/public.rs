mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::Value;
use support::{login_admin, TestApp};

#[actix_web::test]
async fn a_contact_message_shows_up_unread_in_the_back_office() {
    let harness = TestApp::new();
    let app = harness.service().await;
    let admin = login_admin(&app).await;

    let unread = |body: &Value| body["counts"]["unread_messages"].as_i64().unwrap();
    let req = test::TestRequest::get()
        .uri("/admin/")
        .cookie(admin.clone())
        .to_request();
    let before: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/contact")
        .set_form([
            ("name", "Parent"),
            ("email", "parent@example.com"),
            ("message", "When does the grade 11 batch start?"),
        ])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri("/admin/")
        .cookie(admin.clone())
        .to_request();
    let after: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(unread(&after), unread(&before) + 1);

    let id = after["recent_messages"][0]["id"].as_i64().unwrap();
    let req = test::TestRequest::get()
        .uri(&format!("/admin/messages/{}", id))
        .cookie(admin.clone())
        .to_request();
    let opened: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(opened["message"]["is_read"], true);

    let req = test::TestRequest::get()
        .uri("/admin/messages")
        .cookie(admin)
        .to_request();
    let listing: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listing["unread"], 0);
}

#[actix_web::test]
async fn an_invalid_contact_message_reports_its_fields() {
    let harness = TestApp::new();
    let app = harness.service().await;

    let req = test::TestRequest::post()
        .uri("/contact")
        .set_form([("name", ""), ("email", "not-an-email"), ("message", "hi")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["fields"]["name"].is_string());
    assert!(body["fields"]["email"].is_string());
}

#[actix_web::test]
async fn subject_pages_are_looked_up_by_code() {
    let harness = TestApp::new();
    harness.add_subject("MATH");
    let app = harness.service().await;

    let req = test::TestRequest::get().uri("/subjects/math").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["subject"]["code"], "MATH");

    let req = test::TestRequest::get().uri("/subjects/NOPE").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn the_home_page_renders_on_an_empty_database() {
    let harness = TestApp::new();
    let app = harness.service().await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["site_settings"], serde_json::json!({}));
}
