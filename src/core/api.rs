//! Backend routes and response envelope handling
//!
//! Every function here only builds an [`ApiRequest`]; sending it and attaching
//! the token is up to the caller (normally [`crate::core::app::AppState`]).
//! Responses follow `{ code, data, message }` and go through
//! [`unwrap_envelope`] before being decoded.

use crate::core::error::ApiError;
use crate::core::http::{ApiRequest, MultipartBody, Upload};
use crate::core::models::{
    ActivityForm, AnnouncementForm, GroupUpdateForm, LoginRequest, PlanForm, RegisterRequest,
    SubmissionForm, Week,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Envelope code of a successful call
pub const SUCCESS: &str = "SUCCESS";

/// Strip the `{ code, data, message }` envelope.
///
/// A body without `code` is returned as-is; a `code` other than `SUCCESS`
/// becomes [`ApiError::Business`].
///
/// # Errors
/// Returns [`ApiError::Business`] for a non-`SUCCESS` envelope
pub fn unwrap_envelope(body: Value) -> Result<Value, ApiError> {
    let Value::Object(mut map) = body else {
        return Ok(body);
    };
    let Some(code) = map.get("code").and_then(Value::as_str).map(str::to_string) else {
        return Ok(Value::Object(map));
    };
    if code != SUCCESS {
        let message = map
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| code.clone(), str::to_string);
        return Err(ApiError::Business { code, message });
    }
    Ok(map.remove("data").unwrap_or(Value::Null))
}

/// Decode envelope data into `T`
///
/// # Errors
/// Returns [`ApiError::Decode`] when the shape does not match
pub fn decode<T: DeserializeOwned>(data: Value) -> Result<T, ApiError> {
    serde_json::from_value(data).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Decode a list, treating `null` as empty
///
/// # Errors
/// Returns [`ApiError::Decode`] when the shape does not match
pub fn decode_list<T: DeserializeOwned>(data: Value) -> Result<Vec<T>, ApiError> {
    if data.is_null() {
        return Ok(Vec::new());
    }
    decode(data)
}

fn seg(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

// ---------------------------------------------------------------- plans

/// `GET /group/{id}/plan`
#[must_use]
pub fn list_plans(group_id: i64) -> ApiRequest {
    ApiRequest::get(format!("/group/{group_id}/plan"))
}

/// `POST /mentor/group/{id}/create-plan`
///
/// # Errors
/// Returns [`ApiError::Decode`] if the form cannot be serialized
pub fn create_plan(group_id: i64, form: &PlanForm) -> Result<ApiRequest, ApiError> {
    ApiRequest::post(format!("/mentor/group/{group_id}/create-plan")).json(form)
}

/// `PUT /mentor/group/{id}/plan/{planId}`
///
/// # Errors
/// Returns [`ApiError::Decode`] if the form cannot be serialized
pub fn update_plan(group_id: i64, plan_id: i64, form: &PlanForm) -> Result<ApiRequest, ApiError> {
    ApiRequest::put(format!("/mentor/group/{group_id}/plan/{plan_id}")).json(form)
}

/// `DELETE /mentor/group/{id}/plan/{planId}`
#[must_use]
pub fn delete_plan(group_id: i64, plan_id: i64) -> ApiRequest {
    ApiRequest::delete(format!("/mentor/group/{group_id}/plan/{plan_id}"))
}

// ---------------------------------------------------------- submissions

/// `POST /group/{id}/assignment/submit/{planId}`
///
/// # Errors
/// Returns [`ApiError::Decode`] if the form cannot be serialized
pub fn submit_assignment(
    group_id: i64,
    plan_id: i64,
    form: &SubmissionForm,
) -> Result<ApiRequest, ApiError> {
    ApiRequest::post(format!("/group/{group_id}/assignment/submit/{plan_id}")).json(form)
}

/// `GET /group/{id}/assignment/{planId}/submission`
#[must_use]
pub fn list_submissions(group_id: i64, plan_id: i64) -> ApiRequest {
    ApiRequest::get(format!("/group/{group_id}/assignment/{plan_id}/submission"))
}

/// `GET /group/{id}/assignment/submission/{submissionId}`
#[must_use]
pub fn get_submission(group_id: i64, submission_id: i64) -> ApiRequest {
    ApiRequest::get(format!(
        "/group/{group_id}/assignment/submission/{submission_id}"
    ))
}

/// `PUT /group/{id}/assignment/submission/{submissionId}`
///
/// # Errors
/// Returns [`ApiError::Decode`] if the form cannot be serialized
pub fn update_submission(
    group_id: i64,
    submission_id: i64,
    form: &SubmissionForm,
) -> Result<ApiRequest, ApiError> {
    ApiRequest::put(format!(
        "/group/{group_id}/assignment/submission/{submission_id}"
    ))
    .json(form)
}

/// `DELETE /group/{id}/assignment/submission/{submissionId}`
#[must_use]
pub fn delete_submission(group_id: i64, submission_id: i64) -> ApiRequest {
    ApiRequest::delete(format!(
        "/group/{group_id}/assignment/submission/{submission_id}"
    ))
}

// ----------------------------------------------------------- activities

fn activity_body(form: &ActivityForm, image: Option<Upload>) -> Result<MultipartBody, ApiError> {
    Ok(MultipartBody::new().json("activity", form)?.file("image", image))
}

/// `POST /group/{id}/create-activity` (multipart `activity` + optional `image`)
///
/// # Errors
/// Returns [`ApiError::Decode`] if the form cannot be serialized
pub fn create_activity(
    group_id: i64,
    form: &ActivityForm,
    image: Option<Upload>,
) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::post(format!("/group/{group_id}/create-activity"))
        .multipart(activity_body(form, image)?))
}

/// `GET /group/{id}/activity-list`
#[must_use]
pub fn list_activities(group_id: i64) -> ApiRequest {
    ApiRequest::get(format!("/group/{group_id}/activity-list"))
}

/// `GET /group/{id}/activity/{activityId}`
#[must_use]
pub fn get_activity(group_id: i64, activity_id: i64) -> ApiRequest {
    ApiRequest::get(format!("/group/{group_id}/activity/{activity_id}"))
}

/// `PUT /group/{id}/activity/{activityId}` (multipart)
///
/// # Errors
/// Returns [`ApiError::Decode`] if the form cannot be serialized
pub fn update_activity(
    group_id: i64,
    activity_id: i64,
    form: &ActivityForm,
    image: Option<Upload>,
) -> Result<ApiRequest, ApiError> {
    Ok(
        ApiRequest::put(format!("/group/{group_id}/activity/{activity_id}"))
            .multipart(activity_body(form, image)?),
    )
}

/// `DELETE /group/{id}/activity/{activityId}`
#[must_use]
pub fn delete_activity(group_id: i64, activity_id: i64) -> ApiRequest {
    ApiRequest::delete(format!("/group/{group_id}/activity/{activity_id}"))
}

/// `GET /group/{id}/attendance/week/{week}`
#[must_use]
pub fn week_attendance(group_id: i64, week: Week) -> ApiRequest {
    ApiRequest::get(format!(
        "/group/{group_id}/attendance/week/{}",
        week.number()
    ))
}

/// `GET /group/{id}/attendance/all-weeks`
#[must_use]
pub fn all_weeks_attendance(group_id: i64) -> ApiRequest {
    ApiRequest::get(format!("/group/{group_id}/attendance/all-weeks"))
}

// ---------------------------------------------------------------- group

/// `GET /group/{id}`
#[must_use]
pub fn group_detail(group_id: i64) -> ApiRequest {
    ApiRequest::get(format!("/group/{group_id}"))
}

/// `GET /group/{id}/mentee`
#[must_use]
pub fn list_mentees(group_id: i64) -> ApiRequest {
    ApiRequest::get(format!("/group/{group_id}/mentee"))
}

/// `POST /mentor/group/{id}/add-member/{studentNumber}`
#[must_use]
pub fn add_member(group_id: i64, student_number: &str) -> ApiRequest {
    ApiRequest::post(format!(
        "/mentor/group/{group_id}/add-member/{}",
        seg(student_number)
    ))
}

/// `DELETE /mentor/group/{id}/delete-member/{studentNumber}`
#[must_use]
pub fn delete_member(group_id: i64, student_number: &str) -> ApiRequest {
    ApiRequest::delete(format!(
        "/mentor/group/{group_id}/delete-member/{}",
        seg(student_number)
    ))
}

/// `POST /mentor/warn/{groupId}/{studentNumber}`
#[must_use]
pub fn warn_member(group_id: i64, student_number: &str) -> ApiRequest {
    ApiRequest::post(format!("/mentor/warn/{group_id}/{}", seg(student_number)))
}

/// `GET /group/{id}/mentee/warn`
#[must_use]
pub fn list_warnings(group_id: i64) -> ApiRequest {
    ApiRequest::get(format!("/group/{group_id}/mentee/warn"))
}

/// `PUT /mentor/group/{id}` (multipart `group` + optional `image`)
///
/// # Errors
/// Returns [`ApiError::Decode`] if the form cannot be serialized
pub fn update_group(
    group_id: i64,
    form: &GroupUpdateForm,
    image: Option<Upload>,
) -> Result<ApiRequest, ApiError> {
    let body = MultipartBody::new().json("group", form)?.file("image", image);
    Ok(ApiRequest::put(format!("/mentor/group/{group_id}")).multipart(body))
}

// ------------------------------------------------------- auth and users

/// `POST /auth/login`
///
/// # Errors
/// Returns [`ApiError::Decode`] if the body cannot be serialized
pub fn login(body: &LoginRequest) -> Result<ApiRequest, ApiError> {
    ApiRequest::post("/auth/login").json(body)
}

/// `POST /auth/register`
///
/// # Errors
/// Returns [`ApiError::Decode`] if the body cannot be serialized
pub fn register(body: &RegisterRequest) -> Result<ApiRequest, ApiError> {
    ApiRequest::post("/auth/register").json(body)
}

/// `GET /auth/check-student-number?studentNumber=`
#[must_use]
pub fn check_student_number(student_number: &str) -> ApiRequest {
    ApiRequest::get("/auth/check-student-number").query("studentNumber", student_number)
}

/// `GET /auth/check-email?email=`
#[must_use]
pub fn check_email(email: &str) -> ApiRequest {
    ApiRequest::get("/auth/check-email").query("email", email)
}

/// `GET /user/user-page`
#[must_use]
pub fn user_page() -> ApiRequest {
    ApiRequest::get("/user/user-page")
}

/// `GET /users/announcements`
#[must_use]
pub fn list_announcements() -> ApiRequest {
    ApiRequest::get("/users/announcements")
}

/// `GET /users/announcements/{id}`
#[must_use]
pub fn get_announcement(id: i64) -> ApiRequest {
    ApiRequest::get(format!("/users/announcements/{id}"))
}

/// `POST /users/announcements`
///
/// # Errors
/// Returns [`ApiError::Decode`] if the form cannot be serialized
pub fn create_announcement(form: &AnnouncementForm) -> Result<ApiRequest, ApiError> {
    ApiRequest::post("/users/announcements").json(form)
}

/// `PUT /users/announcements/{id}`
///
/// # Errors
/// Returns [`ApiError::Decode`] if the form cannot be serialized
pub fn update_announcement(id: i64, form: &AnnouncementForm) -> Result<ApiRequest, ApiError> {
    ApiRequest::put(format!("/users/announcements/{id}")).json(form)
}

/// `DELETE /users/announcements/{id}`
#[must_use]
pub fn delete_announcement(id: i64) -> ApiRequest {
    ApiRequest::delete(format!("/users/announcements/{id}"))
}

/// `GET /admin/member-approval`
#[must_use]
pub fn pending_members() -> ApiRequest {
    ApiRequest::get("/admin/member-approval")
}

/// `POST /admin/member-approval/{studentNumber}`
#[must_use]
pub fn approve_member(student_number: &str) -> ApiRequest {
    ApiRequest::post(format!("/admin/member-approval/{}", seg(student_number)))
}

/// `GET /image/{filename}` relative path
#[must_use]
pub fn image_path(file_name: &str) -> String {
    format!("/image/{}", seg(file_name))
}
