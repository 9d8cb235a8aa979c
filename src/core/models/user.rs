//! Users, roles and account payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Site-wide role carried in the token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    /// Regular member
    Mentee,
    /// Group mentor
    Mentor,
    /// Administrator (member approval, announcements)
    Admin,
    /// Any role this client does not know
    Other(String),
}

impl Role {
    /// Parse `MENTOR`, `ROLE_MENTOR`, `mentor`, ...
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let upper = raw.trim().to_ascii_uppercase();
        match upper.strip_prefix("ROLE_").unwrap_or(&upper) {
            "MENTEE" | "USER" => Self::Mentee,
            "MENTOR" => Self::Mentor,
            "ADMIN" => Self::Admin,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mentee => f.write_str("MENTEE"),
            Self::Mentor => f.write_str("MENTOR"),
            Self::Admin => f.write_str("ADMIN"),
            Self::Other(other) => f.write_str(other),
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Signed-in user as decoded from the token's claims (not verified)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Display name
    pub name: String,
    /// Student number
    pub student_number: String,
    /// Site-wide role
    pub role: Role,
    /// Email address
    pub email: String,
    /// `exp` claim
    pub expires_at: Option<DateTime<Utc>>,
}

/// Group entry on the user page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    /// Group identifier
    #[serde(alias = "groupId")]
    pub id: i64,
    /// Group name
    pub name: String,
    /// Generation label
    #[serde(default)]
    pub generation: Option<String>,
}

/// `GET /user/user-page`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    /// Display name
    pub name: String,
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Student number
    #[serde(default)]
    pub student_number: String,
    /// Site-wide role
    #[serde(default)]
    pub role: Option<Role>,
    /// Stored profile image path
    #[serde(default)]
    pub profile_image: Option<String>,
    /// Groups the user belongs to
    #[serde(default)]
    pub groups: Vec<GroupSummary>,
}

/// `POST /auth/login` body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
}

/// `POST /auth/login` response data
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Issued JWT
    #[serde(alias = "accessToken")]
    pub token: String,
}

/// `POST /auth/register` body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Student number
    pub student_number: String,
    /// Password
    pub password: String,
}

/// Registration waiting for admin approval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingMember {
    /// Student number
    pub student_number: String,
    /// Display name
    pub name: String,
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Registration timestamp as served
    #[serde(default, alias = "createdAt")]
    pub requested_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_accepts_spring_style_prefix() {
        assert_eq!(Role::parse("ROLE_MENTOR"), Role::Mentor);
        assert_eq!(Role::parse("mentee"), Role::Mentee);
        assert_eq!(Role::parse("USER"), Role::Mentee);
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("guest"), Role::Other("GUEST".to_string()));
    }

    #[test]
    fn login_response_accepts_access_token() {
        let resp: LoginResponse =
            serde_json::from_value(serde_json::json!({"accessToken": "a.b.c"})).unwrap();
        assert_eq!(resp.token, "a.b.c");
    }
}
