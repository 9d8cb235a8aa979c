//! Sign-in, registration, user page, announcements and member approval

use crate::core::api;
use crate::core::app::AppState;
use crate::core::error::{ApiError, PanelError, ValidationError};
use crate::core::http::Transport;
use crate::core::models::{
    Announcement, AnnouncementForm, AuthenticatedUser, LoginRequest, LoginResponse, PendingMember,
    RegisterRequest, UserPage,
};
use crate::core::store::FetchKey;
use crate::info;
use serde_json::Value;

fn require(app: &AppState<impl Transport>, value: &str, field: &'static str) -> Result<String, PanelError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(app.report(ValidationError::Missing(field)))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Passwords are checked for blankness but sent as typed
fn secret(app: &AppState<impl Transport>, value: &str) -> Result<String, PanelError> {
    require(app, value, "password").map(|_| value.to_string())
}

fn require_session(app: &AppState<impl Transport>) -> Result<(), PanelError> {
    if app.session().is_authenticated() {
        Ok(())
    } else {
        Err(app.report(PanelError::SignedOut))
    }
}

/// Login data is either `{ token }` / `{ accessToken }` or the bare token string
fn token_from(data: Value) -> Result<String, ApiError> {
    match data {
        Value::String(token) => Ok(token),
        other => api::decode::<LoginResponse>(other).map(|r| r.token),
    }
}

/// Sign in and keep the token
///
/// # Errors
/// Returns the validation or API error, or a decode error when the issued
/// token is unreadable; one alert is raised
pub async fn login<T: Transport>(
    app: &AppState<T>,
    email: &str,
    password: &str,
) -> Result<AuthenticatedUser, PanelError> {
    let body = LoginRequest {
        email: require(app, email, "email")?,
        password: secret(app, password)?,
    };
    let request = api::login(&body).map_err(|e| app.report(e))?;
    let token = app
        .fetch(request)
        .await
        .and_then(token_from)
        .map_err(|e| app.report(e))?;
    app.sign_in(&token)
        .map_err(|e| app.report(ApiError::Decode(e.to_string())))
}

/// Forget the token and all loaded data
pub fn logout<T: Transport>(app: &AppState<T>) {
    app.sign_out();
    info!("signed out");
}

/// Create an account; it stays pending until an admin approves it
///
/// # Errors
/// Returns the validation or API error; one alert is raised
pub async fn register<T: Transport>(app: &AppState<T>, request: &RegisterRequest) -> Result<(), PanelError> {
    let body = RegisterRequest {
        name: require(app, &request.name, "name")?,
        email: require(app, &request.email, "email")?,
        student_number: require(app, &request.student_number, "student number")?,
        password: secret(app, &request.password)?,
    };
    let request = api::register(&body).map_err(|e| app.report(e))?;
    app.fetch(request).await.map_err(|e| app.report(e))?;
    info!("registered {}", body.student_number);
    Ok(())
}

/// Reads availability out of a check response.
///
/// `{available}` / `{isAvailable}` are taken as-is, `{duplicate}` / `{exists}`
/// inverted, a bare boolean is the availability itself. Anything else that
/// came back successfully counts as available.
fn availability(data: &Value) -> bool {
    if let Some(flag) = data.as_bool() {
        return flag;
    }
    for key in ["available", "isAvailable"] {
        if let Some(flag) = data.get(key).and_then(Value::as_bool) {
            return flag;
        }
    }
    for key in ["duplicate", "isDuplicate", "exists"] {
        if let Some(flag) = data.get(key).and_then(Value::as_bool) {
            return !flag;
        }
    }
    true
}

fn is_conflict(err: &ApiError) -> bool {
    err.status() == Some(409) || err.code().is_some_and(|c| c.contains("DUPLICATE"))
}

async fn check<T: Transport>(app: &AppState<T>, request: crate::core::http::ApiRequest) -> Result<bool, PanelError> {
    match app.fetch(request).await {
        Ok(data) => Ok(availability(&data)),
        Err(e) if is_conflict(&e) => Ok(false),
        Err(e) => Err(app.report(e)),
    }
}

/// True when `student_number` is not registered yet
///
/// # Errors
/// Returns the API error; one alert is raised
pub async fn check_student_number<T: Transport>(app: &AppState<T>, student_number: &str) -> Result<bool, PanelError> {
    let sn = require(app, student_number, "student number")?;
    check(app, api::check_student_number(&sn)).await
}

/// True when `email` is not registered yet
///
/// # Errors
/// Returns the API error; one alert is raised
pub async fn check_email<T: Transport>(app: &AppState<T>, email: &str) -> Result<bool, PanelError> {
    let email = require(app, email, "email")?;
    check(app, api::check_email(&email)).await
}

/// Fetch the viewer's user page
///
/// # Errors
/// Returns [`PanelError::SignedOut`] or the API error; one alert is raised
pub async fn user_page<T: Transport>(app: &AppState<T>) -> Result<UserPage, PanelError> {
    require_session(app)?;
    let ticket = app.store().begin(FetchKey::UserPage);
    let page: UserPage = app
        .fetch_as(api::user_page())
        .await
        .map_err(|e| app.report(e))?;
    app.store().commit(ticket, |s| s.set_user_page(page.clone()));
    Ok(page)
}

/// Fetch all announcements, newest first
///
/// # Errors
/// Returns the API error; one alert is raised
pub async fn load_announcements<T: Transport>(app: &AppState<T>) -> Result<Vec<Announcement>, PanelError> {
    let ticket = app.store().begin(FetchKey::Announcements);
    let list: Vec<Announcement> = app
        .fetch_list(api::list_announcements())
        .await
        .map_err(|e| app.report(e))?;
    app.store().commit(ticket, |s| s.set_announcements(list));
    Ok(app.store().announcements())
}

/// Fetch one announcement
///
/// # Errors
/// Returns the API error; one alert is raised
pub async fn announcement<T: Transport>(app: &AppState<T>, id: i64) -> Result<Announcement, PanelError> {
    let item: Announcement = app
        .fetch_as(api::get_announcement(id))
        .await
        .map_err(|e| app.report(e))?;
    app.store().upsert_announcement(item.clone());
    Ok(item)
}

fn announcement_form(app: &AppState<impl Transport>, title: &str, content: &str) -> Result<AnnouncementForm, PanelError> {
    Ok(AnnouncementForm {
        title: require(app, title, "title")?,
        content: require(app, content, "content")?,
    })
}

/// Publish an announcement, then refetch the list
///
/// # Errors
/// Returns the validation or API error; one alert is raised
pub async fn create_announcement<T: Transport>(
    app: &AppState<T>,
    title: &str,
    content: &str,
) -> Result<Vec<Announcement>, PanelError> {
    require_session(app)?;
    let form = announcement_form(app, title, content)?;
    let request = api::create_announcement(&form).map_err(|e| app.report(e))?;
    app.fetch(request).await.map_err(|e| app.report(e))?;
    info!("published announcement '{}'", form.title);
    load_announcements(app).await
}

/// Edit an announcement, then refetch the list
///
/// # Errors
/// Returns the validation or API error; one alert is raised
pub async fn update_announcement<T: Transport>(
    app: &AppState<T>,
    id: i64,
    title: &str,
    content: &str,
) -> Result<Vec<Announcement>, PanelError> {
    require_session(app)?;
    let form = announcement_form(app, title, content)?;
    let request = api::update_announcement(id, &form).map_err(|e| app.report(e))?;
    app.fetch(request).await.map_err(|e| app.report(e))?;
    info!("updated announcement {id}");
    load_announcements(app).await
}

/// Delete an announcement
///
/// # Errors
/// Returns the API error; one alert is raised
pub async fn delete_announcement<T: Transport>(app: &AppState<T>, id: i64) -> Result<(), PanelError> {
    require_session(app)?;
    app.fetch(api::delete_announcement(id))
        .await
        .map_err(|e| app.report(e))?;
    app.store().remove_announcement(id);
    info!("deleted announcement {id}");
    Ok(())
}

/// Fetch the member approval queue (admin)
///
/// # Errors
/// Returns the API error; one alert is raised
pub async fn pending_members<T: Transport>(app: &AppState<T>) -> Result<Vec<PendingMember>, PanelError> {
    require_session(app)?;
    let ticket = app.store().begin(FetchKey::PendingMembers);
    let list: Vec<PendingMember> = app
        .fetch_list(api::pending_members())
        .await
        .map_err(|e| app.report(e))?;
    app.store().commit(ticket, |s| s.set_pending_members(list));
    Ok(app.store().pending_members().to_vec())
}

/// Approve a pending registration (admin)
///
/// # Errors
/// Returns the API error; one alert is raised
pub async fn approve_member<T: Transport>(app: &AppState<T>, student_number: &str) -> Result<(), PanelError> {
    require_session(app)?;
    let sn = require(app, student_number, "student number")?;
    app.fetch(api::approve_member(&sn))
        .await
        .map_err(|e| app.report(e))?;
    app.store().remove_pending_member(&sn);
    info!("approved {sn}");
    Ok(())
}
