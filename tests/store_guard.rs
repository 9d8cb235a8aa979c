//! Out-of-order responses never overwrite newer data

mod common;

use common::{activity_json, mentee_json, mentor_app, plan_json, Reply};
use mentorhub::core::http::Method;
use mentorhub::core::models::AttendanceType;
use mentorhub::core::panels::{ActivityPanel, CurriculumPanel};
use mentorhub::core::store::{FetchKey, Store};
use serde_json::json;

#[test]
fn ticket_goes_stale_when_a_newer_fetch_starts() {
    let mut store = Store::new();
    let first = store.begin(FetchKey::Plans(1));
    let second = store.begin(FetchKey::Plans(1));
    let other = store.begin(FetchKey::Plans(2));

    assert!(!store.is_current(&first));
    assert!(store.is_current(&second));
    assert!(store.is_current(&other));
    assert!(!store.commit(first, |_| panic!("stale write must not run")));
    assert!(store.commit(second, |s| s.set_plans(1, Vec::new())));
}

#[test]
fn clearing_invalidates_in_flight_fetches() {
    let mut store = Store::new();
    let ticket = store.begin(FetchKey::UserPage);
    store.clear();
    assert!(!store.is_current(&ticket));
}

#[tokio::test]
async fn slow_first_load_does_not_clobber_fast_second_load() {
    let app = mentor_app();
    app.transport()
        .on(
            Method::Get,
            "/group/1/plan",
            Reply::ok(json!([plan_json(1, "old")])).after_ms(80),
        )
        .on(Method::Get, "/group/1/plan", Reply::ok(json!([plan_json(1, "new")])));

    let panel = CurriculumPanel::new(1);
    let (slow, fast) = tokio::join!(panel.load(&app), panel.load(&app));

    assert!(slow.is_ok());
    assert!(fast.is_ok());
    let plans = panel.plans(&app);
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].title, "new");
}

#[tokio::test]
async fn sign_out_during_a_fetch_discards_its_result() {
    let app = mentor_app();
    app.transport().on(
        Method::Get,
        "/group/1/plan",
        Reply::ok(json!([plan_json(1, "private")])).after_ms(50),
    );

    let panel = CurriculumPanel::new(1);
    let (loaded, ()) = tokio::join!(panel.load(&app), async {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        app.sign_out();
    });

    assert!(loaded.is_ok());
    assert!(!app.store().has_plans(1));
}

#[tokio::test]
async fn stale_week_marks_are_not_applied() {
    let app = mentor_app();
    app.transport()
        .on(Method::Get, "/group/1/mentee", Reply::ok(json!([mentee_json("A", "Ahn")])))
        .on(
            Method::Get,
            "/group/1/attendance/week/1",
            Reply::ok(json!([{"studentNumber": "A", "attendanceType": "ABSENCE"}])).after_ms(60),
        );

    let mut panel = ActivityPanel::new(1);
    panel.open_new(&app).await.unwrap();

    let (marks, ()) = tokio::join!(panel.set_week(&app, "1"), async {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        app.store().begin(FetchKey::DraftWeek(1));
    });

    assert_eq!(marks.unwrap().map(|w| w.number()), Some(1));
    assert_eq!(panel.draft().unwrap().mark("A"), Some(AttendanceType::Attend));
}

#[tokio::test]
async fn deleted_activity_is_gone_from_every_view() {
    let app = mentor_app();
    app.transport()
        .on(
            Method::Get,
            "/group/1/activity-list",
            Reply::ok(json!([activity_json(1, 1, &[]), activity_json(2, 2, &[])])),
        )
        .on(Method::Delete, "/group/1/activity/1", Reply::ok(json!(null)));

    let mut panel = ActivityPanel::new(1);
    panel.load(&app).await.unwrap();
    panel.delete(&app, 1).await.unwrap();

    assert!(app.store().activity(1).is_none());
    assert_eq!(panel.activities(&app).len(), 1);
}
