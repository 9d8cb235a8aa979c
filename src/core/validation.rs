//! Client-side form gates
//!
//! These run before any request is sent. The server remains the authority;
//! a form that passes here can still be rejected there.

use crate::core::error::ValidationError;
use crate::core::models::{ActivityForm, AttendanceEntry, PlanForm, SubmissionForm, Week};
use chrono::NaiveDate;

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Missing(field))
    } else {
        Ok(value.to_string())
    }
}

/// Plan form as typed, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanDraft {
    /// Title
    pub title: String,
    /// Rich-text body
    pub content: String,
    /// Assignment flag
    pub has_assignment: bool,
    /// Start date
    pub start_date: Option<NaiveDate>,
    /// End date
    pub end_date: Option<NaiveDate>,
}

impl PlanDraft {
    /// Non-blank title and description, both dates, start strictly before end
    ///
    /// # Errors
    /// Returns the first failing rule
    pub fn validate(&self) -> Result<PlanForm, ValidationError> {
        let title = required(&self.title, "title")?;
        let content = required(&self.content, "description")?;
        let start_date = self.start_date.ok_or(ValidationError::Missing("start date"))?;
        let end_date = self.end_date.ok_or(ValidationError::Missing("end date"))?;
        if start_date >= end_date {
            return Err(ValidationError::DateOrder);
        }
        Ok(PlanForm {
            title,
            content,
            has_assignment: self.has_assignment,
            start_date,
            end_date,
        })
    }
}

/// Submission form as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionDraft {
    /// Submitted URL
    pub content: String,
    /// Password for the URL
    pub password: String,
}

impl SubmissionDraft {
    /// Non-blank URL and password
    ///
    /// # Errors
    /// Returns the first blank field
    pub fn validate(&self) -> Result<SubmissionForm, ValidationError> {
        Ok(SubmissionForm {
            content: required(&self.content, "submission URL")?.trim().to_string(),
            password: required(&self.password, "password")?,
        })
    }
}

/// Non-blank title and content, week parsed into `1..=20`
///
/// # Errors
/// Returns the first failing rule
pub fn validate_activity(
    title: &str,
    content: &str,
    week: &str,
    attendances: Vec<AttendanceEntry>,
) -> Result<ActivityForm, ValidationError> {
    let title = required(title, "title")?;
    let content = required(content, "content")?;
    let week: Week = week.parse()?;
    Ok(ActivityForm {
        title,
        content,
        week,
        attendances,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 3, d)
    }

    fn draft() -> PlanDraft {
        PlanDraft {
            title: "Ownership".to_string(),
            content: "<p>chapter 4</p>".to_string(),
            has_assignment: true,
            start_date: day(4),
            end_date: day(10),
        }
    }

    #[test]
    fn valid_plan_passes() {
        let form = draft().validate().unwrap();
        assert_eq!(form.title, "Ownership");
        assert!(form.has_assignment);
    }

    #[test]
    fn plan_rules() {
        let mut d = draft();
        d.title = "  ".to_string();
        assert_eq!(d.validate(), Err(ValidationError::Missing("title")));

        let mut d = draft();
        d.content.clear();
        assert_eq!(d.validate(), Err(ValidationError::Missing("description")));

        let mut d = draft();
        d.end_date = None;
        assert_eq!(d.validate(), Err(ValidationError::Missing("end date")));

        let mut d = draft();
        d.end_date = d.start_date;
        assert_eq!(d.validate(), Err(ValidationError::DateOrder));
    }

    #[test]
    fn submission_requires_both_fields() {
        let d = SubmissionDraft {
            content: " https://github.com/x ".to_string(),
            password: String::new(),
        };
        assert_eq!(d.validate(), Err(ValidationError::Missing("password")));
        let d = SubmissionDraft {
            password: "pw".to_string(),
            ..d
        };
        assert_eq!(d.validate().unwrap().content, "https://github.com/x");
    }

    #[test]
    fn activity_week_is_checked() {
        assert!(validate_activity("t", "c", "3주차", Vec::new()).is_ok());
        assert!(matches!(
            validate_activity("t", "c", "21", Vec::new()),
            Err(ValidationError::InvalidWeek(_))
        ));
        assert_eq!(
            validate_activity("", "c", "3", Vec::new()),
            Err(ValidationError::Missing("title"))
        );
    }
}
