//! Panel view-models
//!
//! Each panel is a thin view over [`crate::core::app::AppState`]: it owns only
//! its local UI state (open drafts, expanded rows, query string) and reads
//! entities through the store. Operations return `Result<_, PanelError>` and
//! raise exactly one alert on failure. Account operations are free functions
//! in [`account`] since they have no local state.

pub mod account;
pub mod activity;
pub mod curriculum;
pub mod group;

use crate::core::error::{ApiError, ErrorCode, PanelError};

pub use activity::{attendance_summary, ActivityDraft, ActivityPanel, AttendanceSummary, Location, WeekStatus};
pub use curriculum::{CurriculumPanel, SubmissionState};
pub use group::{GroupEdit, GroupPanel};

/// Shown for transport failures
pub const NETWORK_MESSAGE: &str = "Could not reach the server. Check your connection and try again.";

/// Message for a server code this client knows
#[must_use]
pub const fn code_message(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::UnauthorizedMenteeRole => "Only mentees of this group can do that.",
        ErrorCode::UnauthorizedMentorRole => "Only the mentor of this group can do that.",
        ErrorCode::ForbiddenDomain => "Links to that domain cannot be submitted.",
        ErrorCode::DuplicateSubmission => "You have already submitted this assignment.",
        ErrorCode::WarningContent => "The content was flagged as inappropriate. Please revise it.",
        ErrorCode::GroupPlanMismatch => "This plan does not belong to this group.",
        ErrorCode::StudyNotFound => "The study group could not be found.",
        ErrorCode::MemberNotFound => "The member could not be found.",
        ErrorCode::AssignmentNotFound => "This plan has no assignment.",
        ErrorCode::SubmissionNotFound => "The submission could not be found.",
        ErrorCode::PlanNotFound => "The plan could not be found.",
        ErrorCode::ActivityNotFound => "The activity could not be found.",
        ErrorCode::AlreadyMember => "That student is already in this group.",
    }
}

impl PanelError {
    /// Text of the alert raised for this error
    #[must_use]
    pub fn user_message(&self) -> String {
        if let Some(code) = self.code() {
            return code_message(code).to_string();
        }
        match self {
            Self::Api(ApiError::Network(_)) => NETWORK_MESSAGE.to_string(),
            Self::Api(ApiError::Decode(_)) => "The server sent an unexpected response.".to_string(),
            Self::Api(err) => err.to_string(),
            Self::Validation(err) => capitalize(&err.to_string()),
            Self::SignedOut => capitalize(&self.to_string()),
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ValidationError;

    #[test]
    fn known_codes_get_their_own_message() {
        let err = PanelError::Api(ApiError::Business {
            code: "WARNING_CONTENT".to_string(),
            message: "server text".to_string(),
        });
        assert_eq!(err.user_message(), code_message(ErrorCode::WarningContent));
    }

    #[test]
    fn unknown_codes_fall_back_to_server_message() {
        let err = PanelError::Api(ApiError::Http {
            status: 500,
            code: Some("INTERNAL".to_string()),
            message: "boom".to_string(),
        });
        assert_eq!(err.user_message(), "boom");
    }

    #[test]
    fn network_and_validation_messages() {
        assert_eq!(
            PanelError::Api(ApiError::Network("refused".to_string())).user_message(),
            NETWORK_MESSAGE
        );
        assert_eq!(
            PanelError::Validation(ValidationError::Missing("title")).user_message(),
            "Title is required"
        );
    }
}
