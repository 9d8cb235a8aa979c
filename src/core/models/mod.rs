//! Data models for `mentorhub`

pub mod activity;
pub mod announcement;
pub mod group;
pub mod plan;
pub mod submission;
pub mod user;

pub use activity::{Activity, ActivityForm, AttendanceEntry, AttendanceType, Week, WeekAttendance};
pub use announcement::{Announcement, AnnouncementForm};
pub use group::{Group, GroupUpdateForm, Mentee, MentorInfo, WarningCount};
pub use plan::{Plan, PlanForm};
pub use submission::{Submission, SubmissionForm};
pub use user::{
    AuthenticatedUser, GroupSummary, LoginRequest, LoginResponse, PendingMember,
    RegisterRequest, Role, UserPage,
};
