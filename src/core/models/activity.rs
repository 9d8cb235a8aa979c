//! Activity and attendance models

use crate::core::error::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Suffix of a week label, as in `3주차`
pub const WEEK_SUFFIX: &str = "주차";

/// First valid week
pub const MIN_WEEK: u8 = 1;

/// Last valid week
pub const MAX_WEEK: u8 = 20;

/// Attendance mark of one mentee for one activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceType {
    /// Present
    Attend,
    /// Absent
    Absence,
    /// Absent but made it up later
    Makeup,
}

impl AttendanceType {
    /// All marks, in display order
    pub const ALL: [Self; 3] = [Self::Attend, Self::Absence, Self::Makeup];

    /// Counts toward the attendance rate
    #[must_use]
    pub const fn counts_as_attended(self) -> bool {
        matches!(self, Self::Attend | Self::Makeup)
    }
}

impl FromStr for AttendanceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ATTEND" => Ok(Self::Attend),
            "ABSENCE" => Ok(Self::Absence),
            "MAKEUP" => Ok(Self::Makeup),
            other => Err(format!("Unknown attendance type: '{other}' (expected ATTEND, ABSENCE or MAKEUP)")),
        }
    }
}

impl fmt::Display for AttendanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Attend => "ATTEND",
            Self::Absence => "ABSENCE",
            Self::Makeup => "MAKEUP",
        };
        f.write_str(s)
    }
}

/// Week number in `1..=20`; on the wire as `"<N>주차"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Week(u8);

impl Week {
    /// Build a week, rejecting numbers outside `1..=20`
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidWeek`] when out of range
    pub fn new(number: u8) -> Result<Self, ValidationError> {
        if (MIN_WEEK..=MAX_WEEK).contains(&number) {
            Ok(Self(number))
        } else {
            Err(ValidationError::InvalidWeek(number.to_string()))
        }
    }

    /// Week number
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Wire label, e.g. `3주차`
    #[must_use]
    pub fn label(self) -> String {
        format!("{}{WEEK_SUFFIX}", self.0)
    }
}

impl FromStr for Week {
    type Err = ValidationError;

    /// Accepts `3`, ` 3 `, and `3주차`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_suffix(WEEK_SUFFIX).unwrap_or(trimmed).trim();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidWeek(s.to_string()));
        }
        let number: u8 = digits
            .parse()
            .map_err(|_| ValidationError::InvalidWeek(s.to_string()))?;
        Self::new(number).map_err(|_| ValidationError::InvalidWeek(s.to_string()))
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{WEEK_SUFFIX}", self.0)
    }
}

impl Serialize for Week {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for Week {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => u8::try_from(n)
                .map_err(|_| ValidationError::InvalidWeek(n.to_string()))
                .and_then(Self::new)
                .map_err(serde::de::Error::custom),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// One mentee's mark inside an activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    /// Mentee student number
    pub student_number: String,
    /// Mentee name
    #[serde(default)]
    pub name: String,
    /// Mark
    #[serde(alias = "type", alias = "attendance")]
    pub attendance_type: AttendanceType,
}

/// A weekly activity record with its attendance sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Activity identifier
    #[serde(alias = "activityId")]
    pub id: i64,
    /// Title
    pub title: String,
    /// Free text
    #[serde(default)]
    pub content: String,
    /// Week the activity belongs to
    pub week: Week,
    /// Stored image path, if a photo was attached
    #[serde(default, alias = "imageUrl")]
    pub image: Option<String>,
    /// Attendance sheet
    #[serde(default, alias = "attendanceList")]
    pub attendances: Vec<AttendanceEntry>,
}

impl Activity {
    /// Mark recorded for `student_number`, if any
    #[must_use]
    pub fn attendance_of(&self, student_number: &str) -> Option<AttendanceType> {
        self.attendances
            .iter()
            .find(|entry| entry.student_number == student_number)
            .map(|entry| entry.attendance_type)
    }
}

/// JSON metadata part of a create/update activity request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityForm {
    /// Title
    pub title: String,
    /// Free text
    pub content: String,
    /// Week
    pub week: Week,
    /// Attendance sheet
    pub attendances: Vec<AttendanceEntry>,
}

/// Attendance recorded for one week across the group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekAttendance {
    /// Week
    pub week: Week,
    /// Marks recorded for that week
    #[serde(default, alias = "attendanceList")]
    pub attendances: Vec<AttendanceEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_parses_plain_and_labelled_numbers() {
        assert_eq!("3".parse::<Week>().unwrap().number(), 3);
        assert_eq!(" 12 ".parse::<Week>().unwrap().number(), 12);
        assert_eq!("20주차".parse::<Week>().unwrap().number(), 20);
    }

    #[test]
    fn week_rejects_out_of_range_and_garbage() {
        for bad in ["0", "21", "-1", "", "abc", "3.5", "300", "1e1"] {
            assert!(bad.parse::<Week>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn week_round_trips_through_label() {
        let week = Week::new(7).unwrap();
        let json = serde_json::to_value(week).unwrap();
        assert_eq!(json, "7주차");
        let back: Week = serde_json::from_value(json).unwrap();
        assert_eq!(back, week);
        let numeric: Week = serde_json::from_value(serde_json::json!(7)).unwrap();
        assert_eq!(numeric, week);
    }

    #[test]
    fn attendance_type_rejects_fourth_value() {
        let err = serde_json::from_value::<AttendanceType>(serde_json::json!("LATE"));
        assert!(err.is_err());
        assert_eq!("makeup".parse::<AttendanceType>(), Ok(AttendanceType::Makeup));
    }

    #[test]
    fn activity_reads_alias_fields() {
        let activity: Activity = serde_json::from_value(serde_json::json!({
            "activityId": 4,
            "title": "Code review",
            "content": "PR walkthrough",
            "week": "2주차",
            "attendanceList": [
                {"studentNumber": "1", "name": "A", "type": "ATTEND"},
                {"studentNumber": "2", "name": "B", "attendanceType": "ABSENCE"}
            ]
        }))
        .unwrap();
        assert_eq!(activity.id, 4);
        assert_eq!(activity.week.number(), 2);
        assert_eq!(activity.attendance_of("2"), Some(AttendanceType::Absence));
        assert_eq!(activity.attendance_of("3"), None);
    }
}
