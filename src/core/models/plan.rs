//! Curriculum plan model

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// A curriculum item ("plan") of one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Plan identifier
    #[serde(alias = "planId")]
    pub id: i64,

    /// Title shown in the curriculum list
    pub title: String,

    /// Rich-text body, kept as served
    #[serde(default)]
    pub content: String,

    /// Whether mentees submit an assignment for this plan
    #[serde(default)]
    pub has_assignment: bool,

    /// First day of the plan
    #[serde(default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,

    /// Last day of the plan
    #[serde(default, deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,

    /// Display name of the mentor who wrote it
    #[serde(default)]
    pub creator_name: Option<String>,

    /// Creation timestamp as served
    #[serde(default)]
    pub created_at: Option<String>,

    /// Last update timestamp as served
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Plan {
    /// True when both dates are set and `day` falls inside them
    #[must_use]
    pub fn is_open_on(&self, day: NaiveDate) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start <= day && day <= end,
            _ => false,
        }
    }
}

/// Validated body of a create/update plan request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanForm {
    /// Title
    pub title: String,
    /// Rich-text body
    pub content: String,
    /// Assignment flag
    pub has_assignment: bool,
    /// Start date (strictly before `end_date`)
    pub start_date: NaiveDate,
    /// End date
    pub end_date: NaiveDate,
}

/// Accepts `YYYY-MM-DD`, a datetime whose first ten characters are a date, or null.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let date_part = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(Some)
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_plan_from_camel_case_json() {
        let plan: Plan = serde_json::from_value(serde_json::json!({
            "planId": 7,
            "title": "Week 1: ownership",
            "content": "<p>read chapter 4</p>",
            "hasAssignment": true,
            "startDate": "2024-03-04",
            "endDate": "2024-03-10T23:59:59",
            "creatorName": "Kim"
        }))
        .unwrap();

        assert_eq!(plan.id, 7);
        assert!(plan.has_assignment);
        assert_eq!(plan.start_date, Some(day(2024, 3, 4)));
        assert_eq!(plan.end_date, Some(day(2024, 3, 10)));
        assert_eq!(plan.creator_name.as_deref(), Some("Kim"));
        assert!(plan.created_at.is_none());
    }

    #[test]
    fn test_missing_and_null_dates() {
        let plan: Plan = serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "Orientation",
            "startDate": null
        }))
        .unwrap();

        assert!(plan.start_date.is_none());
        assert!(plan.end_date.is_none());
        assert!(!plan.has_assignment);
        assert!(!plan.is_open_on(day(2024, 1, 1)));
    }

    #[test]
    fn test_is_open_on_is_inclusive() {
        let plan = Plan {
            id: 1,
            title: "t".to_string(),
            content: String::new(),
            has_assignment: false,
            start_date: Some(day(2024, 3, 4)),
            end_date: Some(day(2024, 3, 10)),
            creator_name: None,
            created_at: None,
            updated_at: None,
        };
        assert!(plan.is_open_on(day(2024, 3, 4)));
        assert!(plan.is_open_on(day(2024, 3, 10)));
        assert!(!plan.is_open_on(day(2024, 3, 11)));
    }

    #[test]
    fn test_form_serializes_camel_case() {
        let form = PlanForm {
            title: "t".to_string(),
            content: "c".to_string(),
            has_assignment: true,
            start_date: day(2024, 3, 4),
            end_date: day(2024, 3, 10),
        };
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["hasAssignment"], true);
        assert_eq!(json["startDate"], "2024-03-04");
    }
}
