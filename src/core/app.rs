//! Root view-model shared by every panel

use crate::config::Config;
use crate::core::api;
use crate::core::auth::{Session, TokenError, TokenJar};
use crate::core::error::{ApiError, PanelError};
use crate::core::http::{ApiRequest, Transport};
use crate::core::image::normalize_image_url;
use crate::core::models::AuthenticatedUser;
use crate::core::storage::LocalStorage;
use crate::core::store::Store;
use crate::{info, warn};
use parking_lot::{Mutex, MutexGuard, RwLock};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Theme and layout flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiState {
    /// Dark theme
    pub dark_mode: bool,
    /// Sidebar expanded
    pub sidebar_open: bool,
}

/// Transport, session, store, UI flags and pending alerts.
///
/// Locks are never held across an `.await`; fetches copy the token out first.
pub struct AppState<T: Transport> {
    transport: T,
    api_base: String,
    session: RwLock<Session>,
    jar: Option<TokenJar>,
    store: Mutex<Store>,
    storage: Mutex<LocalStorage>,
    ui: Mutex<UiState>,
    alerts: Mutex<Vec<String>>,
}

impl<T: Transport> AppState<T> {
    /// Guest state with in-memory storage and no token jar
    pub fn new(transport: T, api_base: impl Into<String>) -> Self {
        Self {
            transport,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            session: RwLock::new(Session::guest()),
            jar: None,
            store: Mutex::new(Store::new()),
            storage: Mutex::new(LocalStorage::in_memory()),
            ui: Mutex::new(UiState::default()),
            alerts: Mutex::new(Vec::new()),
        }
    }

    /// State wired to the config directory: token jar and local storage on disk
    pub fn from_config(config: &Config, transport: T) -> Self {
        let jar = TokenJar::new(Config::get_token_file_path(), config.session.token_ttl_hours);
        let storage = LocalStorage::open(Config::get_storage_file_path());
        Self::new(transport, config.api_base())
            .with_storage(storage)
            .with_jar(jar)
    }

    /// Use `session` as the current session
    #[must_use]
    pub fn with_session(self, session: Session) -> Self {
        *self.session.write() = session;
        self
    }

    /// Persist tokens in `jar` and restore the session from it
    #[must_use]
    pub fn with_jar(mut self, jar: TokenJar) -> Self {
        *self.session.write() = Session::restore(&jar);
        self.jar = Some(jar);
        self
    }

    /// Use `storage`, picking up the stored theme
    #[must_use]
    pub fn with_storage(self, storage: LocalStorage) -> Self {
        self.ui.lock().dark_mode = storage.dark_mode();
        *self.storage.lock() = storage;
        self
    }

    /// Underlying transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolved API base
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    // ---------------------------------------------------------- session

    /// Snapshot of the session
    pub fn session(&self) -> Session {
        self.session.read().clone()
    }

    /// Signed-in user
    pub fn user(&self) -> Option<AuthenticatedUser> {
        self.session.read().user().cloned()
    }

    /// Bearer token
    pub fn token(&self) -> Option<String> {
        self.session.read().token().map(str::to_string)
    }

    /// Adopt `token`, saving it to the jar
    ///
    /// # Errors
    /// Returns [`TokenError`] when the token does not decode; the session is then logged out
    pub fn sign_in(&self, token: &str) -> Result<AuthenticatedUser, TokenError> {
        match crate::core::auth::decode_token(token) {
            Ok(user) => {
                *self.session.write() = Session::from_token(token);
                if let Some(jar) = &self.jar {
                    if let Err(e) = jar.store(token) {
                        warn!("failed to save token to {}: {e}", jar.path().display());
                    }
                }
                self.store.lock().clear();
                info!("signed in as {}", user.student_number);
                Ok(user)
            }
            Err(e) => {
                self.sign_out();
                Err(e)
            }
        }
    }

    /// Forget the token and everything loaded under it
    pub fn sign_out(&self) {
        self.session.write().logout();
        if let Some(jar) = &self.jar {
            jar.clear();
        }
        self.store.lock().clear();
    }

    /// Viewer's student number: token claim first, then local storage
    pub fn viewer_student_number(&self) -> Option<String> {
        self.user()
            .map(|u| u.student_number)
            .filter(|sn| !sn.trim().is_empty())
            .or_else(|| self.storage.lock().student_number())
    }

    // ------------------------------------------------------------ store

    /// Lock the store; do not hold the guard across an `.await`
    pub fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock()
    }

    /// Lock local storage
    pub fn storage(&self) -> MutexGuard<'_, LocalStorage> {
        self.storage.lock()
    }

    // --------------------------------------------------------------- ui

    /// Current UI flags
    pub fn ui(&self) -> UiState {
        *self.ui.lock()
    }

    /// Set the theme and remember it
    pub fn set_dark_mode(&self, on: bool) {
        self.ui.lock().dark_mode = on;
        self.storage.lock().set_dark_mode(on);
    }

    /// Flip the theme; returns the new value
    pub fn toggle_dark_mode(&self) -> bool {
        let on = !self.ui().dark_mode;
        self.set_dark_mode(on);
        on
    }

    /// Flip the sidebar; returns the new value
    pub fn toggle_sidebar(&self) -> bool {
        let mut ui = self.ui.lock();
        ui.sidebar_open = !ui.sidebar_open;
        ui.sidebar_open
    }

    /// Canonical URL for a stored image path
    pub fn image_url(&self, raw: Option<&str>) -> String {
        normalize_image_url(&self.api_base, raw)
    }

    // ----------------------------------------------------------- alerts

    /// Queue a user-visible alert
    pub fn alert(&self, message: impl Into<String>) {
        self.alerts.lock().push(message.into());
    }

    /// Alerts not yet taken
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().clone()
    }

    /// Take and clear pending alerts
    pub fn take_alerts(&self) -> Vec<String> {
        std::mem::take(&mut *self.alerts.lock())
    }

    /// Raise the single alert for a failed operation and hand the error back
    pub fn report(&self, err: impl Into<PanelError>) -> PanelError {
        let err = err.into();
        warn!("{err}");
        self.alert(err.user_message());
        err
    }

    // ---------------------------------------------------------- network

    /// Send `request` with the current token and strip the envelope
    ///
    /// # Errors
    /// Returns the transport or envelope error
    pub async fn fetch(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let request = request.bearer(self.token());
        let body = self.transport.call(request).await?;
        api::unwrap_envelope(body)
    }

    /// [`AppState::fetch`] and decode the data
    ///
    /// # Errors
    /// Returns the transport, envelope or decode error
    pub async fn fetch_as<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ApiError> {
        api::decode(self.fetch(request).await?)
    }

    /// [`AppState::fetch`] a list, `null` meaning empty
    ///
    /// # Errors
    /// Returns the transport, envelope or decode error
    pub async fn fetch_list<R: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<Vec<R>, ApiError> {
        api::decode_list(self.fetch(request).await?)
    }
}
