//! Activity panel: form lifecycle, week marks, deep links and attendance rate

mod common;

use common::{activity_json, mentee_app, mentee_json, mentor_app, Reply};
use mentorhub::core::http::{Method, Part, RequestBody, Upload};
use mentorhub::core::models::AttendanceType;
use mentorhub::core::panels::{ActivityPanel, WeekStatus};
use mentorhub::core::{PanelError, ValidationError};
use serde_json::json;

fn roster() -> serde_json::Value {
    json!([mentee_json("A", "Ahn"), mentee_json("B", "Baek"), mentee_json("C", "Cho")])
}

#[tokio::test]
async fn new_form_marks_everyone_present() {
    let app = mentor_app();
    app.transport().on(Method::Get, "/group/1/mentee", Reply::ok(roster()));

    let mut panel = ActivityPanel::new(1);
    let draft = panel.open_new(&app).await.unwrap();
    assert_eq!(draft.attendances.len(), 3);
    assert!(draft
        .attendances
        .iter()
        .all(|a| a.attendance_type == AttendanceType::Attend));
    assert!(draft.activity_id.is_none());
}

#[tokio::test]
async fn week_change_resets_then_applies_recorded_marks() {
    let app = mentor_app();
    app.transport()
        .on(Method::Get, "/group/1/mentee", Reply::ok(roster()))
        .on(
            Method::Get,
            "/group/1/attendance/week/3",
            Reply::ok(json!([{"studentNumber": "B", "name": "Baek", "attendanceType": "ABSENCE"}])),
        )
        .on(Method::Get, "/group/1/attendance/week/4", Reply::ok(json!(null)));

    let mut panel = ActivityPanel::new(1);
    panel.open_new(&app).await.unwrap();
    assert!(panel.set_attendance("C", AttendanceType::Makeup));

    let week = panel.set_week(&app, "3주차").await.unwrap();
    assert_eq!(week.map(|w| w.number()), Some(3));
    let draft = panel.draft().unwrap();
    assert_eq!(draft.mark("A"), Some(AttendanceType::Attend));
    assert_eq!(draft.mark("B"), Some(AttendanceType::Absence));
    assert_eq!(draft.mark("C"), Some(AttendanceType::Attend));

    panel.set_week(&app, "4").await.unwrap();
    assert_eq!(panel.draft().unwrap().mark("B"), Some(AttendanceType::Attend));
}

#[tokio::test]
async fn failed_week_fetch_keeps_week_and_marks() {
    let app = mentor_app();
    app.transport()
        .on(Method::Get, "/group/1/mentee", Reply::ok(roster()))
        .on(Method::Get, "/group/1/attendance/week/1", Reply::ok(json!([])))
        .on(Method::Get, "/group/1/attendance/week/2", Reply::offline());

    let mut panel = ActivityPanel::new(1);
    panel.open_new(&app).await.unwrap();
    panel.set_week(&app, "1").await.unwrap();
    assert!(panel.set_attendance("A", AttendanceType::Absence));

    assert!(panel.set_week(&app, "2").await.is_err());
    let draft = panel.draft().unwrap();
    assert_eq!(draft.week, "1");
    assert_eq!(draft.mark("A"), Some(AttendanceType::Absence));
    assert_eq!(app.alerts().len(), 1);
}

#[tokio::test]
async fn invalid_week_is_kept_and_rejected_on_submit() {
    let app = mentor_app();
    app.transport().on(Method::Get, "/group/1/mentee", Reply::ok(roster()));

    let mut panel = ActivityPanel::new(1);
    panel.open_new(&app).await.unwrap();
    let calls_before = app.transport().call_count();

    assert_eq!(panel.set_week(&app, "21").await.unwrap(), None);
    assert_eq!(panel.draft().unwrap().week, "21");
    assert_eq!(app.transport().call_count(), calls_before);

    let draft = panel.draft_mut().unwrap();
    draft.title = "Study".to_string();
    draft.content = "notes".to_string();
    let err = panel.submit(&app).await.unwrap_err();
    assert_eq!(
        err,
        PanelError::Validation(ValidationError::InvalidWeek("21".to_string()))
    );
    assert_eq!(app.transport().call_count(), calls_before);
    assert!(panel.draft().is_some());
}

#[tokio::test]
async fn submit_posts_multipart_and_closes_the_form() {
    let app = mentor_app();
    app.transport()
        .on(Method::Get, "/group/1/mentee", Reply::ok(roster()))
        .on(Method::Get, "/group/1/attendance/week/2", Reply::ok(json!([])))
        .on(Method::Post, "/group/1/create-activity", Reply::ok(json!(null)))
        .on(
            Method::Get,
            "/group/1/activity-list",
            Reply::ok(json!([activity_json(5, 2, &[("A", "ATTEND")])])),
        );

    let mut panel = ActivityPanel::new(1);
    panel.open_new(&app).await.unwrap();
    let draft = panel.draft_mut().unwrap();
    draft.title = "Week two".to_string();
    draft.content = "pair programming".to_string();
    panel.set_week(&app, "2").await.unwrap();
    panel.set_attendance("B", AttendanceType::Absence);
    assert!(panel.set_image(Some(Upload::new("photo.png", "image/png", vec![1, 2, 3]))));

    let list = panel.submit(&app).await.unwrap();
    assert_eq!(list.len(), 1);
    assert!(panel.draft().is_none());

    let sent = app.transport().calls_to(Method::Post, "/group/1/create-activity");
    let RequestBody::Multipart(body) = &sent[0].body else {
        panic!("activity must be multipart");
    };
    let Some(Part::Json(activity)) = body.get("activity") else {
        panic!("missing activity part");
    };
    assert_eq!(activity["title"], "Week two");
    assert_eq!(activity["week"], "2주차");
    assert_eq!(activity["attendances"][1]["attendanceType"], "ABSENCE");
    assert!(matches!(body.get("image"), Some(Part::File(u)) if u.file_name == "photo.png"));
}

#[tokio::test]
async fn edit_submits_a_put_without_image_part() {
    let app = mentor_app();
    app.transport()
        .on(
            Method::Get,
            "/group/1/activity/5",
            Reply::ok(activity_json(5, 2, &[("A", "ABSENCE")])),
        )
        .on(Method::Put, "/group/1/activity/5", Reply::ok(json!(null)))
        .on(Method::Get, "/group/1/activity-list", Reply::ok(json!([])));

    let mut panel = ActivityPanel::new(1);
    let draft = panel.open_edit(&app, 5).await.unwrap();
    assert_eq!(draft.activity_id, Some(5));
    assert_eq!(draft.mark("A"), Some(AttendanceType::Absence));

    panel.submit(&app).await.unwrap();
    let sent = app.transport().calls_to(Method::Put, "/group/1/activity/5");
    let RequestBody::Multipart(body) = &sent[0].body else {
        panic!("activity must be multipart");
    };
    assert!(body.get("image").is_none());
}

#[tokio::test]
async fn submit_without_form_reports() {
    let app = mentor_app();
    let err = ActivityPanel::new(1).submit(&app).await.unwrap_err();
    assert_eq!(err, PanelError::Validation(ValidationError::NoDraft));
    assert_eq!(app.alerts().len(), 1);
}

#[tokio::test]
async fn deleting_the_open_activity_closes_its_detail() {
    let app = mentor_app();
    app.transport()
        .on(Method::Delete, "/group/1/activity/5", Reply::ok(json!(null)));

    let mut panel = ActivityPanel::new(1);
    panel.open_detail(5);
    assert_eq!(panel.location().to_string(), "?activityId=5");

    panel.delete(&app, 5).await.unwrap();
    assert_eq!(panel.detail(), None);
    assert!(panel.location().get("activityId").is_none());
}

#[tokio::test]
async fn navigation_restores_the_detail() {
    let mut panel = ActivityPanel::new(1);
    assert_eq!(panel.on_navigate("?tab=activity&activityId=9"), Some(9));
    assert_eq!(panel.location().get("tab"), Some("activity"));
    panel.close_detail();
    assert_eq!(panel.detail(), None);
    assert_eq!(panel.on_navigate(""), None);
}

#[tokio::test]
async fn own_attendance_counts_weeks_without_a_record() {
    let app = mentee_app();
    app.transport().on(
        Method::Get,
        "/group/1/activity-list",
        Reply::ok(json!([
            activity_json(1, 1, &[("20231234", "ATTEND")]),
            activity_json(2, 2, &[("someone", "ATTEND")]),
            activity_json(3, 3, &[("20231234", "MAKEUP")])
        ])),
    );

    let panel = ActivityPanel::new(1);
    panel.load(&app).await.unwrap();
    let summary = panel.my_attendance(&app).unwrap();

    assert_eq!(summary.total_weeks(), 3);
    assert_eq!(summary.attended, 2);
    assert_eq!(summary.rate(), Some(67));
    assert_eq!(summary.weeks[1].1, WeekStatus::NoRecord);
    assert_eq!(summary.weeks[2].1, WeekStatus::Attended(AttendanceType::Makeup));
}

#[tokio::test]
async fn guest_has_no_attendance_summary() {
    let app = common::guest_app();
    assert!(ActivityPanel::new(1).my_attendance(&app).is_none());
}

#[tokio::test]
async fn attendance_falls_back_to_stored_student_number() {
    let app = common::guest_app();
    app.storage().set("student_number", "S1");
    app.transport().on(
        Method::Get,
        "/group/1/activity-list",
        Reply::ok(json!([activity_json(1, 1, &[("S1", "ABSENCE")])])),
    );

    let panel = ActivityPanel::new(1);
    panel.load(&app).await.unwrap();
    let summary = panel.my_attendance(&app).unwrap();
    assert_eq!(summary.weeks[0].1, WeekStatus::Absent);
    assert_eq!(summary.rate(), Some(0));
}

#[tokio::test]
async fn mentor_overview_of_all_weeks() {
    let app = mentor_app();
    app.transport().on(
        Method::Get,
        "/group/1/attendance/all-weeks",
        Reply::ok(json!([
            {"week": 1, "attendances": [{"studentNumber": "A", "attendanceType": "ATTEND"}]},
            {"week": "2주차", "attendanceList": []}
        ])),
    );

    let weeks = ActivityPanel::new(1).load_all_weeks(&app).await.unwrap();
    assert_eq!(weeks.len(), 2);
    assert_eq!(weeks[1].week.number(), 2);
    assert!(app.store().all_weeks(1).is_some());
}
