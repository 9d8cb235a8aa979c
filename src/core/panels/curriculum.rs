//! Curriculum and assignment panel
//!
//! Mentors manage a group's plans and review submissions; mentees submit one
//! URL/password pair per assignment-bearing plan. A `DUPLICATE_SUBMISSION`
//! answer is reconciled by fetching the submission the server already has.

use crate::core::api;
use crate::core::app::AppState;
use crate::core::error::{ApiError, ErrorCode, PanelError, ValidationError};
use crate::core::http::Transport;
use crate::core::models::{Plan, Submission};
use crate::core::store::FetchKey;
use crate::core::validation::{PlanDraft, SubmissionDraft};
use crate::{debug, info};
use serde_json::Value;
use std::collections::HashSet;

/// Mentee-side state of one plan's assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    /// Nothing submitted yet
    NoSubmission,
    /// The viewer's single submission
    Submitted(Submission),
}

impl SubmissionState {
    /// Submission, if any
    #[must_use]
    pub const fn submission(&self) -> Option<&Submission> {
        match self {
            Self::Submitted(s) => Some(s),
            Self::NoSubmission => None,
        }
    }
}

/// Plans of one group plus which review rows are open
#[derive(Debug, Clone)]
pub struct CurriculumPanel {
    group_id: i64,
    expanded: HashSet<i64>,
    open_details: HashSet<i64>,
}

/// Submission endpoints answer with a list, a single object or nothing
fn decode_submissions(data: Value) -> Result<Vec<Submission>, ApiError> {
    match data {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => api::decode(data),
        other => api::decode::<Submission>(other).map(|s| vec![s]),
    }
}

/// Id from a response that only echoes it: `42` or `{"submissionId": 42}`
fn echoed_id(data: &Value) -> Option<i64> {
    data.as_i64().or_else(|| {
        ["submissionId", "id"]
            .iter()
            .find_map(|key| data.get(*key).and_then(Value::as_i64))
    })
}

/// The viewer's entry.
///
/// Falls back to the first entry only when the viewer is unknown or the
/// server sent no student numbers, i.e. it already filtered the list.
fn pick_own(list: Vec<Submission>, viewer: Option<&str>) -> Option<Submission> {
    let anonymous = list.iter().all(|s| s.student_number.trim().is_empty());
    match viewer {
        Some(sn) if !anonymous => list.into_iter().find(|s| s.student_number == sn),
        _ => list.into_iter().next(),
    }
}

impl CurriculumPanel {
    /// Panel for `group_id`
    #[must_use]
    pub fn new(group_id: i64) -> Self {
        Self {
            group_id,
            expanded: HashSet::new(),
            open_details: HashSet::new(),
        }
    }

    /// Group shown
    #[must_use]
    pub const fn group_id(&self) -> i64 {
        self.group_id
    }

    /// Plans currently in the store
    pub fn plans<T: Transport>(&self, app: &AppState<T>) -> Vec<Plan> {
        app.store().plans(self.group_id)
    }

    /// Fetch the plan list
    ///
    /// # Errors
    /// Returns the failed call; one alert is raised
    pub async fn load<T: Transport>(&self, app: &AppState<T>) -> Result<Vec<Plan>, PanelError> {
        let ticket = app.store().begin(FetchKey::Plans(self.group_id));
        let plans: Vec<Plan> = app
            .fetch_list(api::list_plans(self.group_id))
            .await
            .map_err(|e| app.report(e))?;
        app.store()
            .commit(ticket, |store| store.set_plans(self.group_id, plans));
        Ok(self.plans(app))
    }

    /// Validate and create a plan, then refetch the list
    ///
    /// # Errors
    /// Returns the validation or API error; one alert is raised
    pub async fn create_plan<T: Transport>(
        &self,
        app: &AppState<T>,
        draft: &PlanDraft,
    ) -> Result<Vec<Plan>, PanelError> {
        let form = draft.validate().map_err(|e| app.report(e))?;
        let request = api::create_plan(self.group_id, &form).map_err(|e| app.report(e))?;
        app.fetch(request).await.map_err(|e| app.report(e))?;
        info!("created plan '{}' in group {}", form.title, self.group_id);
        self.load(app).await
    }

    /// Validate and update a plan, then refetch the list
    ///
    /// # Errors
    /// Returns the validation or API error; one alert is raised
    pub async fn update_plan<T: Transport>(
        &self,
        app: &AppState<T>,
        plan_id: i64,
        draft: &PlanDraft,
    ) -> Result<Vec<Plan>, PanelError> {
        let form = draft.validate().map_err(|e| app.report(e))?;
        let request =
            api::update_plan(self.group_id, plan_id, &form).map_err(|e| app.report(e))?;
        app.fetch(request).await.map_err(|e| app.report(e))?;
        info!("updated plan {plan_id} in group {}", self.group_id);
        self.load(app).await
    }

    /// Delete a plan; its cached submissions go with it
    ///
    /// # Errors
    /// Returns the API error; one alert is raised and the store is untouched
    pub async fn delete_plan<T: Transport>(
        &mut self,
        app: &AppState<T>,
        plan_id: i64,
    ) -> Result<(), PanelError> {
        app.fetch(api::delete_plan(self.group_id, plan_id))
            .await
            .map_err(|e| app.report(e))?;
        app.store().remove_plan(plan_id);
        self.expanded.remove(&plan_id);
        info!("deleted plan {plan_id} in group {}", self.group_id);
        Ok(())
    }

    // ------------------------------------------------------------ mentee

    /// Mentee view of `plan_id`
    pub fn submission_state<T: Transport>(&self, app: &AppState<T>, plan_id: i64) -> SubmissionState {
        app.store()
            .my_submission(plan_id)
            .cloned()
            .map_or(SubmissionState::NoSubmission, SubmissionState::Submitted)
    }

    async fn fetch_own<T: Transport>(
        &self,
        app: &AppState<T>,
        plan_id: i64,
    ) -> Result<Option<Submission>, ApiError> {
        let data = app
            .fetch(api::list_submissions(self.group_id, plan_id))
            .await?;
        let viewer = super::activity::viewer_student_number(app);
        Ok(pick_own(decode_submissions(data)?, viewer.as_deref()))
    }

    /// Re-read a submission by id when the server told us one, else look it up in the list
    async fn read_back<T: Transport>(
        &self,
        app: &AppState<T>,
        plan_id: i64,
        id: Option<i64>,
    ) -> Result<Option<Submission>, ApiError> {
        match id {
            Some(id) => app
                .fetch_as::<Submission>(api::get_submission(self.group_id, id))
                .await
                .map(Some),
            None => self.fetch_own(app, plan_id).await,
        }
    }

    /// Fetch the viewer's submission for `plan_id`
    ///
    /// # Errors
    /// Returns the API error; one alert is raised
    pub async fn load_my_submission<T: Transport>(
        &self,
        app: &AppState<T>,
        plan_id: i64,
    ) -> Result<SubmissionState, PanelError> {
        let ticket = app.store().begin(FetchKey::MySubmission(plan_id));
        let own = self
            .fetch_own(app, plan_id)
            .await
            .map_err(|e| app.report(e))?;
        app.store().commit(ticket, |store| match own {
            Some(submission) => store.set_my_submission(plan_id, submission),
            None => store.clear_my_submission(plan_id),
        });
        Ok(self.submission_state(app, plan_id))
    }

    /// Submit an assignment.
    ///
    /// A duplicate answer is not a failure when the existing submission can
    /// be fetched: it becomes the viewer's submission and no alert is raised.
    ///
    /// # Errors
    /// Returns the validation or API error; one alert is raised
    pub async fn submit<T: Transport>(
        &self,
        app: &AppState<T>,
        plan_id: i64,
        draft: &SubmissionDraft,
    ) -> Result<Submission, PanelError> {
        let form = draft.validate().map_err(|e| app.report(e))?;
        let request =
            api::submit_assignment(self.group_id, plan_id, &form).map_err(|e| app.report(e))?;

        let submission = match app.fetch(request).await {
            Ok(data) => match api::decode::<Submission>(data.clone()) {
                Ok(submission) => submission,
                Err(_) => match self.read_back(app, plan_id, echoed_id(&data)).await {
                    Ok(Some(submission)) => submission,
                    Ok(None) => {
                        return Err(app.report(ApiError::Business {
                            code: ErrorCode::SubmissionNotFound.to_string(),
                            message: "submission was accepted but could not be read back".to_string(),
                        }))
                    }
                    Err(e) => return Err(app.report(e)),
                },
            },
            Err(e) if e.is(ErrorCode::DuplicateSubmission) => {
                debug!("duplicate submission for plan {plan_id}; fetching the existing one");
                match self.fetch_own(app, plan_id).await {
                    Ok(Some(existing)) => existing,
                    _ => return Err(app.report(e)),
                }
            }
            Err(e) => return Err(app.report(e)),
        };

        app.store().set_my_submission(plan_id, submission.clone());
        info!("submission {} recorded for plan {plan_id}", submission.id);
        Ok(submission)
    }

    /// Replace URL and password of the viewer's submission; the id is kept
    ///
    /// # Errors
    /// Returns the validation or API error; one alert is raised
    pub async fn edit_submission<T: Transport>(
        &self,
        app: &AppState<T>,
        plan_id: i64,
        draft: &SubmissionDraft,
    ) -> Result<Submission, PanelError> {
        let form = draft.validate().map_err(|e| app.report(e))?;
        let current = app
            .store()
            .my_submission(plan_id)
            .cloned()
            .ok_or(ValidationError::NoSubmission)
            .map_err(|e| app.report(e))?;
        let request = api::update_submission(self.group_id, current.id, &form)
            .map_err(|e| app.report(e))?;
        let data = app.fetch(request).await.map_err(|e| app.report(e))?;

        let updated = match api::decode::<Submission>(data) {
            Ok(updated) => updated,
            Err(_) => match self.read_back(app, plan_id, Some(current.id)).await {
                Ok(Some(updated)) => updated,
                _ => Submission {
                    content: form.content,
                    password: form.password,
                    ..current
                },
            },
        };
        app.store().set_my_submission(plan_id, updated.clone());
        info!("submission {} updated", updated.id);
        Ok(updated)
    }

    /// Delete the viewer's submission
    ///
    /// # Errors
    /// Returns the API error; one alert is raised
    pub async fn delete_submission<T: Transport>(
        &self,
        app: &AppState<T>,
        plan_id: i64,
    ) -> Result<(), PanelError> {
        let id = app
            .store()
            .my_submission(plan_id)
            .map(|s| s.id)
            .ok_or(ValidationError::NoSubmission)
            .map_err(|e| app.report(e))?;
        app.fetch(api::delete_submission(self.group_id, id))
            .await
            .map_err(|e| app.report(e))?;
        app.store().clear_my_submission(plan_id);
        info!("submission {id} deleted");
        Ok(())
    }

    // ------------------------------------------------------------ mentor

    /// Review list of `plan_id`, if fetched
    pub fn submissions<T: Transport>(&self, app: &AppState<T>, plan_id: i64) -> Option<Vec<Submission>> {
        app.store().submissions(plan_id)
    }

    /// Fetch the review list of `plan_id`, replacing any cached copy
    ///
    /// # Errors
    /// Returns the API error; one alert is raised
    pub async fn load_submissions<T: Transport>(
        &self,
        app: &AppState<T>,
        plan_id: i64,
    ) -> Result<Vec<Submission>, PanelError> {
        let ticket = app.store().begin(FetchKey::Submissions(plan_id));
        let list = app
            .fetch(api::list_submissions(self.group_id, plan_id))
            .await
            .and_then(decode_submissions)
            .map_err(|e| app.report(e))?;
        app.store()
            .commit(ticket, |store| store.set_submissions(plan_id, list));
        Ok(self.submissions(app, plan_id).unwrap_or_default())
    }

    /// Expand or collapse the review list; the first expand fetches it
    ///
    /// # Errors
    /// Returns the API error of the first fetch; the row stays collapsed
    pub async fn toggle_submissions<T: Transport>(
        &mut self,
        app: &AppState<T>,
        plan_id: i64,
    ) -> Result<bool, PanelError> {
        if self.expanded.remove(&plan_id) {
            return Ok(false);
        }
        if app.store().submissions(plan_id).is_none() {
            self.load_submissions(app, plan_id).await?;
        }
        self.expanded.insert(plan_id);
        Ok(true)
    }

    /// True when the review list of `plan_id` is expanded
    #[must_use]
    pub fn is_expanded(&self, plan_id: i64) -> bool {
        self.expanded.contains(&plan_id)
    }

    /// Open or close one submission's detail (password included)
    pub fn toggle_submission_detail(&mut self, submission_id: i64) -> bool {
        if self.open_details.remove(&submission_id) {
            false
        } else {
            self.open_details.insert(submission_id);
            true
        }
    }

    /// True when the detail of `submission_id` is open
    #[must_use]
    pub fn is_detail_open(&self, submission_id: i64) -> bool {
        self.open_details.contains(&submission_id)
    }

    /// `total_mentees - submissions`, not a set difference; negative if
    /// submissions outnumber mentees
    pub fn unsubmitted_count<T: Transport>(
        &self,
        app: &AppState<T>,
        plan_id: i64,
        total_mentees: usize,
    ) -> i64 {
        let submitted = app.store().submissions(plan_id).map_or(0, |s| s.len());
        i64::try_from(total_mentees).unwrap_or(i64::MAX) - i64::try_from(submitted).unwrap_or(i64::MAX)
    }
}
