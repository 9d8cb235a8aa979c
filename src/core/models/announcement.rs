//! Announcement model

use serde::{Deserialize, Serialize};

/// Site-wide announcement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    /// Identifier
    #[serde(alias = "announcementId")]
    pub id: i64,
    /// Title
    pub title: String,
    /// Body
    #[serde(default)]
    pub content: String,
    /// Author display name
    #[serde(default, alias = "writer")]
    pub author: String,
    /// Creation timestamp as served
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of a create/update announcement request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnouncementForm {
    /// Title
    pub title: String,
    /// Body
    pub content: String,
}
