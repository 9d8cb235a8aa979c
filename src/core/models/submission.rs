//! Assignment submission model

use serde::{Deserialize, Serialize};

/// A mentee's assignment submission for one plan.
///
/// `password` is stored and shown in plaintext; the backend hands it to the
/// mentor as-is so they can open the submitted link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Submission identifier
    #[serde(alias = "submissionId")]
    pub id: i64,

    /// Plan the submission answers
    #[serde(default)]
    pub plan_id: i64,

    /// Submitter display name
    #[serde(default)]
    pub name: String,

    /// Submitter student number
    #[serde(default)]
    pub student_number: String,

    /// Submitted URL
    #[serde(default)]
    pub content: String,

    /// Password protecting the submitted URL
    #[serde(default)]
    pub password: String,

    /// Creation timestamp as served
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of a create/edit submission request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionForm {
    /// Submitted URL
    pub content: String,
    /// Password for the URL
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_submission_id_alias() {
        let sub: Submission = serde_json::from_value(serde_json::json!({
            "submissionId": 12,
            "planId": 3,
            "name": "Lee",
            "studentNumber": "20231234",
            "content": "https://github.com/lee/hw1",
            "password": "hunter2"
        }))
        .unwrap();
        assert_eq!(sub.id, 12);
        assert_eq!(sub.plan_id, 3);
        assert_eq!(sub.password, "hunter2");
    }
}
