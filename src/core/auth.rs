//! Session holder and token jar
//!
//! The token's claims are decoded without verifying the signature; the
//! backend re-checks every request. A token that cannot be decoded, or whose
//! `exp` has passed, is discarded and the session falls back to guest.

use crate::core::models::{AuthenticatedUser, Role};
use crate::{debug, warn};
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Why a token was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Not three dot-separated segments
    #[error("token is not a JWT")]
    Malformed,
    /// Claims segment is not base64url JSON
    #[error("token claims are unreadable: {0}")]
    Claims(String),
    /// `exp` is in the past
    #[error("token expired at {0}")]
    Expired(DateTime<Utc>),
}

fn claim_str(claims: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| claims.get(*key).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

/// Decode the claims of `token` as of `now`
///
/// # Errors
/// Returns [`TokenError`] when the token is malformed or expired
pub fn decode_token_at(token: &str, now: DateTime<Utc>) -> Result<AuthenticatedUser, TokenError> {
    let mut segments = token.trim().split('.');
    let (Some(_), Some(payload), Some(_), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        return Err(TokenError::Malformed);
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| URL_SAFE.decode(payload))
        .map_err(|e| TokenError::Claims(e.to_string()))?;
    let claims: Value =
        serde_json::from_slice(&bytes).map_err(|e| TokenError::Claims(e.to_string()))?;
    if !claims.is_object() {
        return Err(TokenError::Claims("claims are not an object".to_string()));
    }

    let expires_at = claims
        .get("exp")
        .and_then(Value::as_i64)
        .and_then(|exp| Utc.timestamp_opt(exp, 0).single());
    if let Some(exp) = expires_at {
        if exp <= now {
            return Err(TokenError::Expired(exp));
        }
    }

    Ok(AuthenticatedUser {
        name: claim_str(&claims, &["name", "username"]),
        student_number: claim_str(&claims, &["studentNumber", "student_number"]),
        role: Role::parse(&claim_str(&claims, &["role", "auth"])),
        email: claim_str(&claims, &["email", "sub"]),
        expires_at,
    })
}

/// Decode the claims of `token` as of now
///
/// # Errors
/// Returns [`TokenError`] when the token is malformed or expired
pub fn decode_token(token: &str) -> Result<AuthenticatedUser, TokenError> {
    decode_token_at(token, Utc::now())
}

/// Signed-in state: either a guest or a token with its decoded user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    user: Option<AuthenticatedUser>,
}

impl Session {
    /// Logged-out session
    #[must_use]
    pub fn guest() -> Self {
        Self::default()
    }

    /// Session for `token`, or a guest session if it does not decode
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match decode_token(token) {
            Ok(user) => {
                debug!("session restored for {}", user.student_number);
                Self {
                    token: Some(token.trim().to_string()),
                    user: Some(user),
                }
            }
            Err(e) => {
                warn!("discarding stored token: {e}");
                Self::guest()
            }
        }
    }

    /// Restore from the jar; a token that does not decode is cleared from it
    #[must_use]
    pub fn restore(jar: &TokenJar) -> Self {
        let Some(token) = jar.load() else {
            return Self::guest();
        };
        let session = Self::from_token(&token);
        if !session.is_authenticated() {
            jar.clear();
        }
        session
    }

    /// Bearer token, if signed in
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Decoded user, if signed in
    #[must_use]
    pub const fn user(&self) -> Option<&AuthenticatedUser> {
        self.user.as_ref()
    }

    /// True when a decodable token is held
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Drop token and user
    pub fn logout(&mut self) {
        self.token = None;
        self.user = None;
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// File-backed token "cookie" with an absolute expiry
#[derive(Debug, Clone)]
pub struct TokenJar {
    path: PathBuf,
    ttl: Duration,
}

impl TokenJar {
    /// Jar at `path` keeping tokens for `ttl_hours`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, ttl_hours: u32) -> Self {
        Self {
            path: path.into(),
            ttl: Duration::hours(i64::from(ttl_hours)),
        }
    }

    /// Location on disk
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Expiry for a token stored at `now`: the TTL, capped by the token's own `exp`
    #[must_use]
    pub fn expiry_for(&self, token: &str, now: DateTime<Utc>) -> DateTime<Utc> {
        let by_ttl = now + self.ttl;
        decode_token_at(token, now)
            .ok()
            .and_then(|user| user.expires_at)
            .map_or(by_ttl, |exp| exp.min(by_ttl))
    }

    /// Persist `token`
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn store(&self, token: &str) -> std::io::Result<()> {
        let stored = StoredToken {
            token: token.to_string(),
            expires_at: self.expiry_for(token, Utc::now()),
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(&self.path, json)
    }

    /// Stored token as of `now`; an expired entry is removed
    #[must_use]
    pub fn load_at(&self, now: DateTime<Utc>) -> Option<String> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let Ok(stored) = serde_json::from_str::<StoredToken>(&raw) else {
            warn!("token file {} is unreadable; removing it", self.path.display());
            self.clear();
            return None;
        };
        if stored.expires_at <= now {
            debug!("stored token expired at {}", stored.expires_at);
            self.clear();
            return None;
        }
        Some(stored.token)
    }

    /// Stored token, if present and not expired
    #[must_use]
    pub fn load(&self) -> Option<String> {
        self.load_at(Utc::now())
    }

    /// Remove the stored token
    pub fn clear(&self) {
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!("failed to remove {}: {e}", self.path.display());
            }
        }
    }
}

/// Build an unsigned token carrying `claims`; used by tests and fixtures
#[must_use]
pub fn unsigned_token(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.sig")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_claims() {
        let exp = Utc::now().timestamp() + 3600;
        let token = unsigned_token(&json!({
            "name": "Kim",
            "studentNumber": "20231234",
            "role": "ROLE_MENTEE",
            "email": "kim@example.org",
            "exp": exp
        }));
        let user = decode_token(&token).unwrap();
        assert_eq!(user.name, "Kim");
        assert_eq!(user.student_number, "20231234");
        assert_eq!(user.role, Role::Mentee);
        assert_eq!(user.expires_at.map(|t| t.timestamp()), Some(exp));
    }

    #[test]
    fn rejects_expired_and_malformed_tokens() {
        let token = unsigned_token(&json!({"name": "x", "exp": 1_000}));
        assert!(matches!(decode_token(&token), Err(TokenError::Expired(_))));
        assert_eq!(decode_token("not-a-token"), Err(TokenError::Malformed));
        assert!(matches!(decode_token("a.!!!.c"), Err(TokenError::Claims(_))));
    }

    #[test]
    fn guest_on_bad_token() {
        let session = Session::from_token("garbage");
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
    }

    #[test]
    fn jar_expiry_is_capped_by_token_exp() {
        let now = Utc::now();
        let jar = TokenJar::new("unused.json", 10);
        let short = unsigned_token(&json!({"exp": now.timestamp() + 60}));
        let long = unsigned_token(&json!({"exp": now.timestamp() + 86_400}));
        assert_eq!(jar.expiry_for(&short, now).timestamp(), now.timestamp() + 60);
        assert_eq!(jar.expiry_for(&long, now), now + Duration::hours(10));
    }
}
