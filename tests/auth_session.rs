//! Session restore, token jar persistence and sign-in/out through the app state

mod common;

use chrono::{Duration, Utc};
use common::{token_for, FakeTransport, BASE};
use mentorhub::core::auth::{decode_token, unsigned_token, TokenError, TokenJar};
use mentorhub::core::AppState;
use serde_json::json;
use tempfile::TempDir;

fn jar_in(dir: &TempDir, ttl_hours: u32) -> TokenJar {
    TokenJar::new(dir.path().join("token.json"), ttl_hours)
}

#[test]
fn sign_in_persists_and_next_start_restores() {
    let dir = TempDir::new().unwrap();
    let token = token_for("Kim", "20231234", "MENTEE");

    let app = AppState::new(FakeTransport::new(), BASE).with_jar(jar_in(&dir, 10));
    assert!(!app.session().is_authenticated());
    app.sign_in(&token).unwrap();
    assert!(dir.path().join("token.json").exists());

    let restarted = AppState::new(FakeTransport::new(), BASE).with_jar(jar_in(&dir, 10));
    assert_eq!(restarted.token().as_deref(), Some(token.as_str()));
    assert_eq!(restarted.user().map(|u| u.name), Some("Kim".to_string()));
}

#[test]
fn sign_out_clears_the_jar() {
    let dir = TempDir::new().unwrap();
    let app = AppState::new(FakeTransport::new(), BASE).with_jar(jar_in(&dir, 10));
    app.sign_in(&token_for("Kim", "1", "MENTEE")).unwrap();

    app.sign_out();
    assert!(!dir.path().join("token.json").exists());
    assert!(app.token().is_none());
}

#[test]
fn undecodable_stored_token_falls_back_to_guest_and_is_removed() {
    let dir = TempDir::new().unwrap();
    let jar = jar_in(&dir, 10);
    jar.store("definitely.not.base64!").unwrap();
    assert!(jar.load().is_some());

    let app = AppState::new(FakeTransport::new(), BASE).with_jar(jar_in(&dir, 10));
    assert!(!app.session().is_authenticated());
    assert!(!dir.path().join("token.json").exists());
}

#[test]
fn rejected_sign_in_leaves_a_guest() {
    let dir = TempDir::new().unwrap();
    let app = AppState::new(FakeTransport::new(), BASE).with_jar(jar_in(&dir, 10));
    app.sign_in(&token_for("Kim", "1", "MENTEE")).unwrap();

    let expired = unsigned_token(&json!({"studentNumber": "1", "exp": 1}));
    assert!(matches!(app.sign_in(&expired), Err(TokenError::Expired(_))));
    assert!(app.user().is_none());
    assert!(!dir.path().join("token.json").exists());
}

#[test]
fn jar_expiry_is_capped_by_ttl_and_exp() {
    let dir = TempDir::new().unwrap();
    let jar = jar_in(&dir, 10);
    let now = Utc::now();

    let long_lived = unsigned_token(&json!({"exp": (now + Duration::days(7)).timestamp()}));
    assert_eq!(jar.expiry_for(&long_lived, now), now + Duration::hours(10));

    let short_exp = now + Duration::hours(1);
    let short_lived = unsigned_token(&json!({"exp": short_exp.timestamp()}));
    assert_eq!(
        jar.expiry_for(&short_lived, now).timestamp(),
        short_exp.timestamp()
    );
}

#[test]
fn stored_token_expires_with_the_jar() {
    let dir = TempDir::new().unwrap();
    let jar = jar_in(&dir, 1);
    jar.store(&token_for("Kim", "1", "MENTEE")).unwrap();

    assert!(jar.load_at(Utc::now() + Duration::minutes(30)).is_some());
    assert!(jar.load_at(Utc::now() + Duration::hours(2)).is_none());
    assert!(!jar.path().exists());
}

#[test]
fn claims_fall_back_to_alternate_names() {
    let token = unsigned_token(&json!({
        "username": "Choi",
        "student_number": "42",
        "auth": "ROLE_ADMIN",
        "sub": "choi@example.org"
    }));
    let user = decode_token(&token).unwrap();
    assert_eq!(user.name, "Choi");
    assert_eq!(user.student_number, "42");
    assert_eq!(user.email, "choi@example.org");
    assert_eq!(user.role, mentorhub::core::models::Role::Admin);
    assert!(user.expires_at.is_none());
}

#[test]
fn token_needs_three_segments() {
    assert_eq!(decode_token("a.b"), Err(TokenError::Malformed));
    assert_eq!(decode_token("a.b.c.d"), Err(TokenError::Malformed));
}

#[test]
fn viewer_student_number_prefers_the_token() {
    let app = AppState::new(FakeTransport::new(), BASE);
    app.storage().set("studentNumber", "from-storage");
    assert_eq!(app.viewer_student_number().as_deref(), Some("from-storage"));

    app.sign_in(&token_for("Kim", "from-token", "MENTEE")).unwrap();
    assert_eq!(app.viewer_student_number().as_deref(), Some("from-token"));
}

#[test]
fn theme_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("storage.json");
    let app = AppState::new(FakeTransport::new(), BASE)
        .with_storage(mentorhub::core::storage::LocalStorage::open(&path));
    assert!(app.toggle_dark_mode());

    let restarted = AppState::new(FakeTransport::new(), BASE)
        .with_storage(mentorhub::core::storage::LocalStorage::open(&path));
    assert!(restarted.ui().dark_mode);
    assert!(restarted.toggle_sidebar());
}
