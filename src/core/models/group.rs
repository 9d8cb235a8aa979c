//! Group, roster and warning models

use serde::{Deserialize, Serialize};

/// A mentee listed in a group roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mentee {
    /// User identifier
    #[serde(default, alias = "id")]
    pub user_id: i64,
    /// Display name
    pub name: String,
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Student number; the key members are matched on
    pub student_number: String,
    /// Stored profile image path
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// Mentor of a group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorInfo {
    /// Display name
    #[serde(default, alias = "mentorName")]
    pub name: String,
    /// Student number
    #[serde(default, alias = "mentorStudentNumber")]
    pub student_number: String,
    /// Email address
    #[serde(default, alias = "mentorEmail")]
    pub email: String,
}

/// A study group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Group identifier
    #[serde(alias = "groupId")]
    pub id: i64,
    /// Group name
    pub name: String,
    /// Description
    #[serde(default, alias = "description")]
    pub content: String,
    /// Generation label (e.g. `"5기"`)
    #[serde(default)]
    pub generation: Option<String>,
    /// Mentor, when the server includes it
    #[serde(default)]
    pub mentor: Option<MentorInfo>,
    /// Stored group image path
    #[serde(default, alias = "imageUrl")]
    pub image: Option<String>,
    /// Embedded roster, when the server includes it
    #[serde(default)]
    pub mentees: Vec<Mentee>,
}

/// Warning tally of one mentee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningCount {
    /// Student number
    pub student_number: String,
    /// Number of warnings issued
    #[serde(alias = "warningCount", alias = "warnCount")]
    pub count: u32,
}

/// Textual part of a group metadata update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupUpdateForm {
    /// New name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_reads_description_alias_and_nested_mentor() {
        let group: Group = serde_json::from_value(serde_json::json!({
            "groupId": 9,
            "name": "Rust study",
            "description": "systems programming",
            "generation": "5기",
            "mentor": {"mentorName": "Park", "mentorStudentNumber": "2019001", "mentorEmail": "park@example.org"}
        }))
        .unwrap();
        assert_eq!(group.id, 9);
        assert_eq!(group.content, "systems programming");
        let mentor = group.mentor.unwrap();
        assert_eq!(mentor.student_number, "2019001");
        assert!(group.mentees.is_empty());
    }

    #[test]
    fn update_form_omits_absent_fields() {
        let form = GroupUpdateForm {
            name: Some("New name".to_string()),
            content: None,
        };
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json, serde_json::json!({"name": "New name"}));
    }
}
