//! Account operations: sign-in, registration checks, announcements, approvals

mod common;

use common::{guest_app, mentor_app, token_for, Reply};
use mentorhub::core::http::{Method, RequestBody};
use mentorhub::core::models::{RegisterRequest, Role};
use mentorhub::core::panels::account;
use mentorhub::core::{PanelError, ValidationError};
use serde_json::json;

#[tokio::test]
async fn login_adopts_the_issued_token() {
    let app = guest_app();
    let token = token_for("Kim", "20231234", "MENTEE");
    app.transport()
        .on(Method::Post, "/auth/login", Reply::ok(json!({"accessToken": token})));

    let user = account::login(&app, " kim@example.org ", " secret ").await.unwrap();
    assert_eq!(user.student_number, "20231234");
    assert_eq!(user.role, Role::Mentee);
    assert!(app.session().is_authenticated());
    assert_eq!(app.token().as_deref(), Some(token.as_str()));

    let sent = app.transport().calls_to(Method::Post, "/auth/login");
    assert_eq!(sent[0].token, None);
    let RequestBody::Json(body) = &sent[0].body else {
        panic!("login is JSON");
    };
    assert_eq!(body["email"], "kim@example.org");
    assert_eq!(body["password"], " secret ");
}

#[tokio::test]
async fn login_with_garbage_token_stays_signed_out() {
    let app = guest_app();
    app.transport()
        .on(Method::Post, "/auth/login", Reply::ok(json!("not-a-jwt")));

    assert!(account::login(&app, "a@b.c", "pw").await.is_err());
    assert!(!app.session().is_authenticated());
    assert_eq!(app.alerts().len(), 1);
}

#[tokio::test]
async fn failed_login_shows_server_message() {
    let app = guest_app();
    app.transport().on(
        Method::Post,
        "/auth/login",
        Reply::status(401, None, "Invalid email or password"),
    );

    assert!(account::login(&app, "a@b.c", "pw").await.is_err());
    assert_eq!(app.alerts(), vec!["Invalid email or password".to_string()]);
}

#[tokio::test]
async fn logout_forgets_token_and_data() {
    let app = mentor_app();
    app.store().set_announcements(Vec::new());
    account::logout(&app);
    assert!(app.token().is_none());
    assert!(app.user().is_none());
}

#[tokio::test]
async fn register_requires_every_field() {
    let app = guest_app();
    let request = RegisterRequest {
        name: "Lee".to_string(),
        email: "lee@example.org".to_string(),
        student_number: " ".to_string(),
        password: "pw".to_string(),
    };
    let err = account::register(&app, &request).await.unwrap_err();
    assert_eq!(err, PanelError::Validation(ValidationError::Missing("student number")));
    assert_eq!(app.transport().call_count(), 0);
}

#[tokio::test]
async fn availability_checks() {
    let app = guest_app();
    app.transport()
        .on(Method::Get, "/auth/check-student-number", Reply::ok(json!({"duplicate": false})))
        .on(
            Method::Get,
            "/auth/check-email",
            Reply::status(409, Some("DUPLICATE_EMAIL"), "taken"),
        );

    assert!(account::check_student_number(&app, "20231234").await.unwrap());
    assert!(!account::check_email(&app, "lee@example.org").await.unwrap());
    assert!(app.alerts().is_empty());

    let sent = app.transport().calls_to(Method::Get, "/auth/check-email");
    assert_eq!(sent[0].query, vec![("email".to_string(), "lee@example.org".to_string())]);
}

#[tokio::test]
async fn user_page_needs_a_session() {
    let app = guest_app();
    assert_eq!(account::user_page(&app).await, Err(PanelError::SignedOut));
    assert_eq!(app.alerts(), vec!["Sign in to continue".to_string()]);
}

#[tokio::test]
async fn user_page_is_stored() {
    let app = mentor_app();
    app.transport().on(
        Method::Get,
        "/user/user-page",
        Reply::ok(json!({
            "name": "Park",
            "email": "park@example.org",
            "studentNumber": "2019001",
            "role": "ROLE_MENTOR",
            "groups": [{"groupId": 1, "name": "Rust study"}]
        })),
    );

    let page = account::user_page(&app).await.unwrap();
    assert_eq!(page.role, Some(Role::Mentor));
    assert_eq!(page.groups[0].id, 1);
    assert_eq!(app.store().user_page().map(|p| p.name.clone()), Some("Park".to_string()));
}

#[tokio::test]
async fn announcements_are_listed_newest_first_and_deleted() {
    let app = mentor_app();
    app.transport()
        .on(
            Method::Get,
            "/users/announcements",
            Reply::ok(json!([
                {"announcementId": 1, "title": "Welcome"},
                {"announcementId": 3, "title": "Exams"}
            ])),
        )
        .on(Method::Delete, "/users/announcements/3", Reply::ok(json!(null)));

    let list = account::load_announcements(&app).await.unwrap();
    assert_eq!(list[0].id, 3);

    account::delete_announcement(&app, 3).await.unwrap();
    assert_eq!(app.store().announcements().len(), 1);
}

#[tokio::test]
async fn approving_removes_from_queue() {
    let app = mentor_app();
    app.transport()
        .on(
            Method::Get,
            "/admin/member-approval",
            Reply::ok(json!([
                {"studentNumber": "20240001", "name": "New"},
                {"studentNumber": "20240002", "name": "Newer"}
            ])),
        )
        .on(Method::Post, "/admin/member-approval/20240001", Reply::ok(json!(null)));

    assert_eq!(account::pending_members(&app).await.unwrap().len(), 2);
    account::approve_member(&app, "20240001").await.unwrap();
    let left = app.store().pending_members().to_vec();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].student_number, "20240002");
}
