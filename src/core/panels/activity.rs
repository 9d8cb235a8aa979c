//! Activity and attendance panel
//!
//! Mentors record one activity per week with an attendance sheet and an
//! optional photo. The open detail is mirrored in the panel's [`Location`]
//! as `activityId=<id>` so back/forward navigation can reopen it.

use crate::core::api;
use crate::core::app::AppState;
use crate::core::error::{ApiError, PanelError, ValidationError};
use crate::core::http::{Transport, Upload};
use crate::core::models::{Activity, AttendanceEntry, AttendanceType, Mentee, Week, WeekAttendance};
use crate::core::store::FetchKey;
use crate::core::validation::validate_activity;
use crate::{debug, info};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Query parameter holding the open activity
pub const ACTIVITY_QUERY_KEY: &str = "activityId";

/// Query string of the panel's location
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pairs: Vec<(String, String)>,
}

impl Location {
    /// Parse `?a=1&b=2` (leading `?` optional)
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let pairs = query
            .trim()
            .trim_start_matches('?')
            .split('&')
            .filter(|p| !p.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(key), decode(value))
            })
            .collect();
        Self { pairs }
    }

    /// Value of `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set `key`, replacing any previous value
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    /// Remove `key`
    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }
}

fn decode(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    urlencoding::decode(&raw).map_or(raw.clone(), |s| s.into_owned())
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{}={}", urlencoding::encode(key), urlencoding::encode(value))?;
        }
        Ok(())
    }
}

/// Activity form being edited
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityDraft {
    /// `Some` when editing an existing activity
    pub activity_id: Option<i64>,
    /// Title
    pub title: String,
    /// Free text
    pub content: String,
    /// Week exactly as typed
    pub week: String,
    /// One mark per mentee, in roster order
    pub attendances: Vec<AttendanceEntry>,
    /// Photo to upload
    pub image: Option<Upload>,
}

impl ActivityDraft {
    fn for_roster(roster: &[Mentee]) -> Self {
        let attendances = roster
            .iter()
            .map(|m| AttendanceEntry {
                student_number: m.student_number.clone(),
                name: m.name.clone(),
                attendance_type: AttendanceType::Attend,
            })
            .collect();
        Self {
            attendances,
            ..Self::default()
        }
    }

    fn from_activity(activity: &Activity, roster: &[Mentee]) -> Self {
        let mut attendances = activity.attendances.clone();
        for mentee in roster {
            if !attendances
                .iter()
                .any(|a| a.student_number == mentee.student_number)
            {
                attendances.push(AttendanceEntry {
                    student_number: mentee.student_number.clone(),
                    name: mentee.name.clone(),
                    attendance_type: AttendanceType::Attend,
                });
            }
        }
        Self {
            activity_id: Some(activity.id),
            title: activity.title.clone(),
            content: activity.content.clone(),
            week: activity.week.number().to_string(),
            attendances,
            image: None,
        }
    }

    /// Mark currently selected for `student_number`
    #[must_use]
    pub fn mark(&self, student_number: &str) -> Option<AttendanceType> {
        self.attendances
            .iter()
            .find(|a| a.student_number == student_number)
            .map(|a| a.attendance_type)
    }

    fn set_mark(&mut self, student_number: &str, mark: AttendanceType) -> bool {
        self.attendances
            .iter_mut()
            .find(|a| a.student_number == student_number)
            .map(|a| a.attendance_type = mark)
            .is_some()
    }
}

/// One week in a viewer's attendance summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekStatus {
    /// Marked present (or made up)
    Attended(AttendanceType),
    /// Marked absent
    Absent,
    /// Activities exist but none lists the viewer
    NoRecord,
}

/// A viewer's attendance over every week that has an activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceSummary {
    /// Status per week, ascending
    pub weeks: Vec<(Week, WeekStatus)>,
    /// Weeks counted as attended
    pub attended: usize,
}

impl AttendanceSummary {
    /// Weeks with any recorded activity
    #[must_use]
    pub fn total_weeks(&self) -> usize {
        self.weeks.len()
    }

    /// `round(attended / total_weeks * 100)`; `None` without any week
    #[must_use]
    pub fn rate(&self) -> Option<u32> {
        let total = self.total_weeks();
        if total == 0 {
            return None;
        }
        let percent = (self.attended * 200 + total) / (2 * total);
        u32::try_from(percent).ok()
    }
}

/// Summarize `student_number`'s attendance across `activities`
#[must_use]
pub fn attendance_summary(activities: &[Activity], student_number: &str) -> AttendanceSummary {
    let mut by_week: BTreeMap<Week, Vec<AttendanceType>> = BTreeMap::new();
    for activity in activities {
        let marks = by_week.entry(activity.week).or_default();
        if let Some(mark) = activity.attendance_of(student_number) {
            marks.push(mark);
        }
    }

    let weeks: Vec<(Week, WeekStatus)> = by_week
        .into_iter()
        .map(|(week, marks)| {
            let status = marks
                .iter()
                .copied()
                .find(|m| m.counts_as_attended())
                .map_or_else(
                    || {
                        if marks.is_empty() {
                            WeekStatus::NoRecord
                        } else {
                            WeekStatus::Absent
                        }
                    },
                    WeekStatus::Attended,
                );
            (week, status)
        })
        .collect();
    let attended = weeks
        .iter()
        .filter(|(_, s)| matches!(s, WeekStatus::Attended(_)))
        .count();
    AttendanceSummary { weeks, attended }
}

/// Viewer's student number: token claim, then local storage
pub fn viewer_student_number<T: Transport>(app: &AppState<T>) -> Option<String> {
    app.viewer_student_number()
}

/// Marks recorded for a week, from a list, an activity list or a wrapped object
fn decode_week_marks(data: Value) -> Result<Vec<AttendanceEntry>, ApiError> {
    match data {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => {
            let nested = items
                .iter()
                .any(|i| i.get("attendances").or_else(|| i.get("attendanceList")).is_some());
            if nested {
                let activities: Vec<Activity> = api::decode(Value::Array(items))?;
                Ok(activities.into_iter().flat_map(|a| a.attendances).collect())
            } else {
                api::decode(Value::Array(items))
            }
        }
        Value::Object(mut map) => {
            let list = map
                .remove("attendances")
                .or_else(|| map.remove("attendanceList"))
                .unwrap_or(Value::Null);
            api::decode_list(list)
        }
        other => Err(ApiError::Decode(format!("unexpected attendance payload: {other}"))),
    }
}

/// Activities of one group, the open form and the deep-link location
#[derive(Debug, Clone)]
pub struct ActivityPanel {
    group_id: i64,
    draft: Option<ActivityDraft>,
    location: Location,
}

impl ActivityPanel {
    /// Panel for `group_id`
    #[must_use]
    pub fn new(group_id: i64) -> Self {
        Self {
            group_id,
            draft: None,
            location: Location::default(),
        }
    }

    /// Activities currently in the store
    pub fn activities<T: Transport>(&self, app: &AppState<T>) -> Vec<Activity> {
        app.store().activities(self.group_id)
    }

    /// Fetch the activity list
    ///
    /// # Errors
    /// Returns the API error; one alert is raised
    pub async fn load<T: Transport>(&self, app: &AppState<T>) -> Result<Vec<Activity>, PanelError> {
        let ticket = app.store().begin(FetchKey::Activities(self.group_id));
        let list: Vec<Activity> = app
            .fetch_list(api::list_activities(self.group_id))
            .await
            .map_err(|e| app.report(e))?;
        app.store()
            .commit(ticket, |store| store.set_activities(self.group_id, list));
        Ok(self.activities(app))
    }

    /// Mentor overview of every recorded week
    ///
    /// # Errors
    /// Returns the API error; one alert is raised
    pub async fn load_all_weeks<T: Transport>(
        &self,
        app: &AppState<T>,
    ) -> Result<Vec<WeekAttendance>, PanelError> {
        let ticket = app.store().begin(FetchKey::AllWeeks(self.group_id));
        let weeks: Vec<WeekAttendance> = app
            .fetch_list(api::all_weeks_attendance(self.group_id))
            .await
            .map_err(|e| app.report(e))?;
        app.store()
            .commit(ticket, |store| store.set_all_weeks(self.group_id, weeks));
        Ok(app
            .store()
            .all_weeks(self.group_id)
            .map(<[WeekAttendance]>::to_vec)
            .unwrap_or_default())
    }

    async fn roster<T: Transport>(&self, app: &AppState<T>) -> Result<Vec<Mentee>, PanelError> {
        if let Some(roster) = app.store().roster(self.group_id) {
            return Ok(roster);
        }
        let ticket = app.store().begin(FetchKey::Roster(self.group_id));
        let roster: Vec<Mentee> = app
            .fetch_list(api::list_mentees(self.group_id))
            .await
            .map_err(|e| app.report(e))?;
        app.store()
            .commit(ticket, |store| store.set_roster(self.group_id, roster.clone()));
        Ok(roster)
    }

    // ------------------------------------------------------------ form

    /// Open a blank form with every mentee marked present
    ///
    /// # Errors
    /// Returns the roster fetch error; one alert is raised
    pub async fn open_new<T: Transport>(&mut self, app: &AppState<T>) -> Result<&ActivityDraft, PanelError> {
        let roster = self.roster(app).await?;
        Ok(&*self.draft.insert(ActivityDraft::for_roster(&roster)))
    }

    /// Fetch an activity and open it in the form
    ///
    /// # Errors
    /// Returns the API error; one alert is raised
    pub async fn open_edit<T: Transport>(
        &mut self,
        app: &AppState<T>,
        activity_id: i64,
    ) -> Result<&ActivityDraft, PanelError> {
        let ticket = app.store().begin(FetchKey::Activity(activity_id));
        let activity: Activity = app
            .fetch_as(api::get_activity(self.group_id, activity_id))
            .await
            .map_err(|e| app.report(e))?;
        let roster = app.store().roster(self.group_id).unwrap_or_default();
        let draft = ActivityDraft::from_activity(&activity, &roster);
        app.store()
            .commit(ticket, |store| store.upsert_activity(self.group_id, activity));
        Ok(&*self.draft.insert(draft))
    }

    /// Open form
    #[must_use]
    pub const fn draft(&self) -> Option<&ActivityDraft> {
        self.draft.as_ref()
    }

    /// Open form, for editing title, content or image
    pub fn draft_mut(&mut self) -> Option<&mut ActivityDraft> {
        self.draft.as_mut()
    }

    /// Discard the form
    pub fn close_form(&mut self) {
        self.draft = None;
    }

    /// Change the week field.
    ///
    /// A valid week fetches what is already recorded for it; once that
    /// arrives every mark is reset to present and the recorded marks are
    /// applied. A failed fetch leaves the form as it was. An invalid week is
    /// kept as typed and left for [`ActivityPanel::submit`] to reject.
    ///
    /// # Errors
    /// Returns an error when no form is open or the fetch fails; one alert is raised
    pub async fn set_week<T: Transport>(
        &mut self,
        app: &AppState<T>,
        input: &str,
    ) -> Result<Option<Week>, PanelError> {
        let group_id = self.group_id;
        let draft = self
            .draft
            .as_mut()
            .ok_or(ValidationError::NoDraft)
            .map_err(|e| app.report(e))?;
        let Ok(week) = input.parse::<Week>() else {
            draft.week = input.to_string();
            return Ok(None);
        };

        let ticket = app.store().begin(FetchKey::DraftWeek(group_id));
        let marks = app
            .fetch(api::week_attendance(group_id, week))
            .await
            .and_then(decode_week_marks)
            .map_err(|e| app.report(e))?;
        if !app.store().is_current(&ticket) {
            debug!("ignoring stale marks for {week}");
            return Ok(Some(week));
        }
        draft.week = input.to_string();
        for entry in &mut draft.attendances {
            entry.attendance_type = AttendanceType::Attend;
        }
        for mark in marks {
            draft.set_mark(&mark.student_number, mark.attendance_type);
        }
        Ok(Some(week))
    }

    /// Set one mentee's mark; false when no form is open or the mentee is not on it
    pub fn set_attendance(&mut self, student_number: &str, mark: AttendanceType) -> bool {
        self.draft
            .as_mut()
            .is_some_and(|d| d.set_mark(student_number, mark))
    }

    /// Attach or clear the photo
    pub fn set_image(&mut self, image: Option<Upload>) -> bool {
        self.draft.as_mut().map(|d| d.image = image).is_some()
    }

    /// Validate and send the form, then refetch the list.
    ///
    /// Nothing is sent when validation fails.
    ///
    /// # Errors
    /// Returns the validation or API error; one alert is raised
    pub async fn submit<T: Transport>(&mut self, app: &AppState<T>) -> Result<Vec<Activity>, PanelError> {
        let draft = self
            .draft
            .as_ref()
            .ok_or(ValidationError::NoDraft)
            .map_err(|e| app.report(e))?;
        let form = validate_activity(
            &draft.title,
            &draft.content,
            &draft.week,
            draft.attendances.clone(),
        )
        .map_err(|e| app.report(e))?;
        let editing = draft.activity_id;
        let request = match editing {
            Some(id) => api::update_activity(self.group_id, id, &form, draft.image.clone()),
            None => api::create_activity(self.group_id, &form, draft.image.clone()),
        }
        .map_err(|e| app.report(e))?;

        app.fetch(request).await.map_err(|e| app.report(e))?;
        match editing {
            Some(id) => info!("updated activity {id} ({})", form.week),
            None => info!("created activity '{}' for {}", form.title, form.week),
        }
        self.draft = None;
        self.load(app).await
    }

    /// Delete an activity, closing its detail if open
    ///
    /// # Errors
    /// Returns the API error; one alert is raised
    pub async fn delete<T: Transport>(&mut self, app: &AppState<T>, activity_id: i64) -> Result<(), PanelError> {
        app.fetch(api::delete_activity(self.group_id, activity_id))
            .await
            .map_err(|e| app.report(e))?;
        app.store().remove_activity(activity_id);
        if self.detail() == Some(activity_id) {
            self.close_detail();
        }
        info!("deleted activity {activity_id}");
        Ok(())
    }

    // ------------------------------------------------------- deep link

    /// Current query string
    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    /// Activity whose detail is open, as read from the location
    #[must_use]
    pub fn detail(&self) -> Option<i64> {
        self.location
            .get(ACTIVITY_QUERY_KEY)
            .and_then(|v| v.trim().parse().ok())
    }

    /// Open a detail and record it in the location
    pub fn open_detail(&mut self, activity_id: i64) {
        self.location
            .set(ACTIVITY_QUERY_KEY, activity_id.to_string());
    }

    /// Close the detail and drop it from the location
    pub fn close_detail(&mut self) {
        self.location.remove(ACTIVITY_QUERY_KEY);
    }

    /// Back/forward navigation landed on `query`; returns the detail now open
    pub fn on_navigate(&mut self, query: &str) -> Option<i64> {
        self.location = Location::parse(query);
        self.detail()
    }

    // ----------------------------------------------------- own attendance

    /// Viewer's attendance over the loaded activities
    pub fn my_attendance<T: Transport>(&self, app: &AppState<T>) -> Option<AttendanceSummary> {
        let student_number = viewer_student_number(app)?;
        Some(attendance_summary(&self.activities(app), &student_number))
    }
}
