//! Error taxonomy shared by the transport, the store and the panels

use std::fmt;

/// Failure of a single backend call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx status; `message` is `body.message ?? body.error ?? "HTTP {status}"`
    #[error("{message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// `body.code` when the server sent one
        code: Option<String>,
        /// Human-readable message
        message: String,
    },

    /// 2xx response whose envelope `code` is not `SUCCESS`
    #[error("{message}")]
    Business {
        /// Envelope code, e.g. `DUPLICATE_SUBMISSION`
        code: String,
        /// Envelope message
        message: String,
    },

    /// The response body did not have the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Server-side error code, from either an envelope or an error body
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Http { code, .. } => code.as_deref(),
            Self::Business { code, .. } => Some(code),
            Self::Network(_) | Self::Decode(_) => None,
        }
    }

    /// Known error code, if the server sent one this client understands
    #[must_use]
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.code().and_then(ErrorCode::parse)
    }

    /// True when the server reported `code`
    #[must_use]
    pub fn is(&self, code: ErrorCode) -> bool {
        self.error_code() == Some(code)
    }

    /// HTTP status, when there was a response
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Business error codes the panels map to their own messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Caller is not a mentee of the group
    UnauthorizedMenteeRole,
    /// Caller is not the mentor of the group
    UnauthorizedMentorRole,
    /// Submitted URL points at a blocked domain
    ForbiddenDomain,
    /// A submission already exists for this plan and mentee
    DuplicateSubmission,
    /// Content was rejected by the server's content filter
    WarningContent,
    /// The plan does not belong to the group in the path
    GroupPlanMismatch,
    /// Unknown group
    StudyNotFound,
    /// Unknown member
    MemberNotFound,
    /// Plan has no assignment
    AssignmentNotFound,
    /// Unknown submission
    SubmissionNotFound,
    /// Unknown plan
    PlanNotFound,
    /// Unknown activity
    ActivityNotFound,
    /// Member already in the group
    AlreadyMember,
}

impl ErrorCode {
    /// Parse a wire code
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        let code = match code.trim() {
            "UNAUTHORIZED_MENTEE_ROLE" => Self::UnauthorizedMenteeRole,
            "UNAUTHORIZED_MENTOR_ROLE" => Self::UnauthorizedMentorRole,
            "FORBIDDEN_DOMAIN" => Self::ForbiddenDomain,
            "DUPLICATE_SUBMISSION" => Self::DuplicateSubmission,
            "WARNING_CONTENT" => Self::WarningContent,
            "GROUP_PLAN_MISMATCH" => Self::GroupPlanMismatch,
            "STUDY_NOT_FOUND" => Self::StudyNotFound,
            "MEMBER_NOT_FOUND" => Self::MemberNotFound,
            "ASSIGNMENT_NOT_FOUND" => Self::AssignmentNotFound,
            "SUBMISSION_NOT_FOUND" => Self::SubmissionNotFound,
            "PLAN_NOT_FOUND" => Self::PlanNotFound,
            "ACTIVITY_NOT_FOUND" => Self::ActivityNotFound,
            "ALREADY_MEMBER" => Self::AlreadyMember,
            _ => return None,
        };
        Some(code)
    }

    /// Wire spelling
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnauthorizedMenteeRole => "UNAUTHORIZED_MENTEE_ROLE",
            Self::UnauthorizedMentorRole => "UNAUTHORIZED_MENTOR_ROLE",
            Self::ForbiddenDomain => "FORBIDDEN_DOMAIN",
            Self::DuplicateSubmission => "DUPLICATE_SUBMISSION",
            Self::WarningContent => "WARNING_CONTENT",
            Self::GroupPlanMismatch => "GROUP_PLAN_MISMATCH",
            Self::StudyNotFound => "STUDY_NOT_FOUND",
            Self::MemberNotFound => "MEMBER_NOT_FOUND",
            Self::AssignmentNotFound => "ASSIGNMENT_NOT_FOUND",
            Self::SubmissionNotFound => "SUBMISSION_NOT_FOUND",
            Self::PlanNotFound => "PLAN_NOT_FOUND",
            Self::ActivityNotFound => "ACTIVITY_NOT_FOUND",
            Self::AlreadyMember => "ALREADY_MEMBER",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-side form rejection; raised before any request is sent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field is blank
    #[error("{0} is required")]
    Missing(&'static str),

    /// Start date is not strictly before end date
    #[error("start date must be before end date")]
    DateOrder,

    /// Week is not a number in 1..=20
    #[error("week must be a number between 1 and 20 (got '{0}')")]
    InvalidWeek(String),

    /// An update carried no field to change
    #[error("enter a name or a description to update")]
    NothingToUpdate,

    /// No activity form is open
    #[error("no activity form is open")]
    NoDraft,

    /// Edit or delete requested before a submission exists
    #[error("there is no submission to change")]
    NoSubmission,
}

/// Error returned by every panel operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PanelError {
    /// Backend call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Form rejected locally
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Operation needs a signed-in user
    #[error("sign in to continue")]
    SignedOut,
}

impl PanelError {
    /// Server code carried by the error, if any
    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api(err) => err.error_code(),
            _ => None,
        }
    }
}
