mod support;

use actix_web::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use actix_web::http::StatusCode;
use actix_web::test;
use portal::db;
use portal::db::notes::NoteFields;
use serde_json::Value;
use support::{login, multipart_body, multipart_content_type, png, TestApp, STUDENT_PASSWORD};

fn add_note(harness: &TestApp, subject_id: i64, grade: i64, filename: &str) -> i64 {
    add_titled_note(harness, "Quadratic Equations", subject_id, grade, filename)
}

fn add_titled_note(
    harness: &TestApp,
    title: &str,
    subject_id: i64,
    grade: i64,
    filename: &str,
) -> i64 {
    let fields = NoteFields {
        title: title.to_string(),
        subject_id,
        grade,
        chapter: Some("Chapter 4".to_string()),
    };
    harness
        .state
        .db
        .transact(|tx| Ok(db::notes::insert(tx, &fields, filename, 9)?))
        .unwrap()
}

#[actix_web::test]
async fn a_note_whose_file_is_gone_is_not_found() {
    let harness = TestApp::new();
    harness.add_student("MPC-2026-001", "a@example.com", 10);
    let subject = harness.add_subject("MATH");
    let note = add_note(&harness, subject, 10, "vanished.pdf");
    let app = harness.service().await;
    let cookie = login(&app, "student", "MPC-2026-001", STUDENT_PASSWORD).await;

    let req = test::TestRequest::get()
        .uri(&format!("/student/notes/{}/download", note))
        .cookie(cookie)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn notes_download_as_attachments_for_the_students_grade_only() {
    let harness = TestApp::new();
    harness.add_student("MPC-2026-001", "a@example.com", 10);
    let subject = harness.add_subject("MATH");
    std::fs::write(
        harness.state.config.notes_folder().join("quadratics.pdf"),
        b"%PDF-1.4",
    )
    .unwrap();
    let mine = add_note(&harness, subject, 10, "quadratics.pdf");
    let other_grade = add_note(&harness, subject, 12, "quadratics.pdf");
    let app = harness.service().await;
    let cookie = login(&app, "student", "MPC-2026-001", STUDENT_PASSWORD).await;

    let req = test::TestRequest::get()
        .uri(&format!("/student/notes/{}/download", mine))
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp.headers().get(CONTENT_DISPOSITION).unwrap().to_str().unwrap();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("Quadratic Equations.pdf"));

    let req = test::TestRequest::get()
        .uri(&format!("/student/notes/{}/download", other_grade))
        .cookie(cookie.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/student/notes")
        .cookie(cookie)
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["notes"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn the_wrong_current_password_changes_nothing() {
    let harness = TestApp::new();
    harness.add_student("MPC-2026-001", "a@example.com", 10);
    let app = harness.service().await;
    let cookie = login(&app, "student", "MPC-2026-001", STUDENT_PASSWORD).await;

    let req = test::TestRequest::post()
        .uri("/student/profile")
        .cookie(cookie.clone())
        .set_form([
            ("change_password", "1"),
            ("current_password", "wrong-one"),
            ("new_password", "brand-new"),
            ("confirm_password", "brand-new"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["fields"]["current_password"],
        "Current password is incorrect."
    );

    login(&app, "student", "MPC-2026-001", STUDENT_PASSWORD).await;
}

#[actix_web::test]
async fn a_changed_password_is_the_one_that_signs_in() {
    let harness = TestApp::new();
    harness.add_student("MPC-2026-001", "a@example.com", 10);
    let app = harness.service().await;
    let cookie = login(&app, "student", "MPC-2026-001", STUDENT_PASSWORD).await;

    let req = test::TestRequest::post()
        .uri("/student/profile")
        .cookie(cookie)
        .set_form([
            ("change_password", "1"),
            ("current_password", STUDENT_PASSWORD),
            ("new_password", "brand-new"),
            ("confirm_password", "brand-new"),
        ])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    login(&app, "student", "MPC-2026-001", "brand-new").await;
}

#[actix_web::test]
async fn a_new_avatar_is_stored_at_avatar_size() {
    let harness = TestApp::new();
    harness.add_student("MPC-2026-001", "a@example.com", 10);
    let app = harness.service().await;
    let cookie = login(&app, "student", "MPC-2026-001", STUDENT_PASSWORD).await;

    let avatar = png(900, 600);
    let req = test::TestRequest::post()
        .uri("/student/profile")
        .cookie(cookie)
        .insert_header((CONTENT_TYPE, multipart_content_type()))
        .set_payload(multipart_body(
            &[("update_profile", "1"), ("phone", "9876543210")],
            &[("avatar", "me.png", avatar.as_slice())],
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["student"]["phone"], "9876543210");

    let stored = body["student"]["avatar"].as_str().unwrap();
    let saved = image::open(harness.state.config.avatars_folder().join(stored)).unwrap();
    assert_eq!((saved.width(), saved.height()), (300, 200));
}

#[actix_web::test]
async fn awkward_note_titles_still_download() {
    let harness = TestApp::new();
    harness.add_student("MPC-2026-001", "a@example.com", 10);
    let subject = harness.add_subject("MATH");
    std::fs::write(
        harness.state.config.notes_folder().join("algebra.pdf"),
        b"%PDF-1.4",
    )
    .unwrap();
    let multiline = add_titled_note(&harness, "line1\nline2", subject, 10, "algebra.pdf");
    let unicode = add_titled_note(&harness, "Ångström \"units\"", subject, 10, "algebra.pdf");
    let app = harness.service().await;
    let cookie = login(&app, "student", "MPC-2026-001", STUDENT_PASSWORD).await;

    let req = test::TestRequest::get()
        .uri(&format!("/student/notes/{}/download", multiline))
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp.headers().get(CONTENT_DISPOSITION).unwrap().to_str().unwrap();
    assert!(disposition.contains("line1 line2.pdf"));

    let req = test::TestRequest::get()
        .uri(&format!("/student/notes/{}/download", unicode))
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp.headers().get(CONTENT_DISPOSITION).unwrap().to_str().unwrap();
    assert!(disposition.contains("filename*=UTF-8''"));
}

#[actix_web::test]
async fn note_files_are_not_served_as_public_uploads() {
    let harness = TestApp::new();
    let config = &harness.state.config;
    std::fs::write(config.notes_folder().join("private.pdf"), b"%PDF-1.4").unwrap();
    std::fs::write(config.gallery_folder().join("open.png"), png(10, 10)).unwrap();
    let app = harness.service().await;

    let req = test::TestRequest::get()
        .uri("/uploads/notes/private.pdf")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/uploads/gallery/open.png")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}
