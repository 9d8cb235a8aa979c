//! Group detail and membership panel

use crate::core::api;
use crate::core::app::AppState;
use crate::core::error::{PanelError, ValidationError};
use crate::core::http::{Transport, Upload};
use crate::core::models::{Group, GroupUpdateForm, Mentee, WarningCount};
use crate::core::role::{current_member_role, MemberRole};
use crate::core::store::FetchKey;
use crate::{info, warn};
use std::collections::BTreeMap;

/// Requested change to a group's metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupEdit {
    /// New name
    pub name: Option<String>,
    /// New description
    pub content: Option<String>,
    /// New image
    pub image: Option<Upload>,
}

impl GroupEdit {
    /// Textual part with blank fields dropped; `None` when nothing is left
    #[must_use]
    pub fn form(&self) -> Option<GroupUpdateForm> {
        let keep = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let form = GroupUpdateForm {
            name: keep(&self.name),
            content: keep(&self.content),
        };
        (form.name.is_some() || form.content.is_some()).then_some(form)
    }
}

/// One group's detail, roster and warnings
#[derive(Debug, Clone, Copy)]
pub struct GroupPanel {
    group_id: i64,
}

impl GroupPanel {
    /// Panel for `group_id`
    #[must_use]
    pub const fn new(group_id: i64) -> Self {
        Self { group_id }
    }

    /// Group detail, if loaded
    pub fn group<T: Transport>(&self, app: &AppState<T>) -> Option<Group> {
        app.store().group(self.group_id).cloned()
    }

    /// Roster, empty until loaded
    pub fn roster<T: Transport>(&self, app: &AppState<T>) -> Vec<Mentee> {
        app.store().roster(self.group_id).unwrap_or_default()
    }

    /// Viewer's resolved role; `Outsider` until [`GroupPanel::load`] ran
    pub fn role<T: Transport>(&self, app: &AppState<T>) -> MemberRole {
        app.store()
            .member_role(self.group_id)
            .unwrap_or(MemberRole::Outsider)
    }

    /// Fetch detail and roster, then resolve the viewer's role.
    ///
    /// A failed roster fetch is not an error: the role then comes from the
    /// token claim.
    ///
    /// # Errors
    /// Returns the detail fetch error; one alert is raised
    pub async fn load<T: Transport>(&self, app: &AppState<T>) -> Result<MemberRole, PanelError> {
        let (detail_ticket, roster_ticket) = {
            let mut store = app.store();
            (
                store.begin(FetchKey::Group(self.group_id)),
                store.begin(FetchKey::Roster(self.group_id)),
            )
        };
        let (detail, roster) = tokio::join!(
            app.fetch_as::<Group>(api::group_detail(self.group_id)),
            app.fetch_list::<Mentee>(api::list_mentees(self.group_id)),
        );
        let group = detail.map_err(|e| app.report(e))?;
        let roster = match roster {
            Ok(roster) => Some(roster),
            Err(e) => {
                warn!("roster of group {} unavailable, using token role: {e}", self.group_id);
                None
            }
        };

        let role = current_member_role(app.user().as_ref(), Some(&group), roster.as_deref());
        let mut store = app.store();
        store.commit(detail_ticket, |s| {
            s.set_group(group);
            s.set_member_role(self.group_id, role);
        });
        if let Some(roster) = roster {
            store.commit(roster_ticket, |s| s.set_roster(self.group_id, roster));
        }
        Ok(store.member_role(self.group_id).unwrap_or(role))
    }

    /// Refetch just the roster
    ///
    /// # Errors
    /// Returns the API error; one alert is raised
    pub async fn load_roster<T: Transport>(&self, app: &AppState<T>) -> Result<Vec<Mentee>, PanelError> {
        let ticket = app.store().begin(FetchKey::Roster(self.group_id));
        let roster: Vec<Mentee> = app
            .fetch_list(api::list_mentees(self.group_id))
            .await
            .map_err(|e| app.report(e))?;
        app.store()
            .commit(ticket, |s| s.set_roster(self.group_id, roster));
        Ok(self.roster(app))
    }

    fn student_number<T: Transport>(app: &AppState<T>, raw: &str) -> Result<String, PanelError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(app.report(ValidationError::Missing("student number")));
        }
        Ok(trimmed.to_string())
    }

    /// Add a mentee by student number, then refetch the roster
    ///
    /// # Errors
    /// Returns the API error; one alert is raised
    pub async fn add_mentee<T: Transport>(
        &self,
        app: &AppState<T>,
        student_number: &str,
    ) -> Result<Vec<Mentee>, PanelError> {
        let sn = Self::student_number(app, student_number)?;
        app.fetch(api::add_member(self.group_id, &sn))
            .await
            .map_err(|e| app.report(e))?;
        info!("added {sn} to group {}", self.group_id);
        self.load_roster(app).await
    }

    /// Remove a mentee, then refetch the roster
    ///
    /// # Errors
    /// Returns the API error; one alert is raised
    pub async fn remove_mentee<T: Transport>(
        &self,
        app: &AppState<T>,
        student_number: &str,
    ) -> Result<Vec<Mentee>, PanelError> {
        let sn = Self::student_number(app, student_number)?;
        app.fetch(api::delete_member(self.group_id, &sn))
            .await
            .map_err(|e| app.report(e))?;
        info!("removed {sn} from group {}", self.group_id);
        self.load_roster(app).await
    }

    /// Warning counts keyed by student number
    pub fn warnings<T: Transport>(&self, app: &AppState<T>) -> BTreeMap<String, u32> {
        app.store().warnings(self.group_id)
    }

    /// Fetch warning counts
    ///
    /// # Errors
    /// Returns the API error; one alert is raised
    pub async fn load_warnings<T: Transport>(
        &self,
        app: &AppState<T>,
    ) -> Result<BTreeMap<String, u32>, PanelError> {
        let ticket = app.store().begin(FetchKey::Warnings(self.group_id));
        let counts: Vec<WarningCount> = app
            .fetch_list(api::list_warnings(self.group_id))
            .await
            .map_err(|e| app.report(e))?;
        app.store()
            .commit(ticket, |s| s.set_warnings(self.group_id, counts));
        Ok(self.warnings(app))
    }

    /// Issue a warning, then recompute the counts
    ///
    /// # Errors
    /// Returns the API error; one alert is raised
    pub async fn warn<T: Transport>(
        &self,
        app: &AppState<T>,
        student_number: &str,
    ) -> Result<u32, PanelError> {
        let sn = Self::student_number(app, student_number)?;
        app.fetch(api::warn_member(self.group_id, &sn))
            .await
            .map_err(|e| app.report(e))?;
        info!("warned {sn} in group {}", self.group_id);
        self.load_warnings(app).await?;
        Ok(app.store().warning_count(self.group_id, &sn))
    }

    /// Update name, description and image in one multipart request.
    ///
    /// Nothing is sent unless a name or description is given.
    ///
    /// # Errors
    /// Returns [`ValidationError::NothingToUpdate`] or the API error; one alert is raised
    pub async fn update_group<T: Transport>(
        &self,
        app: &AppState<T>,
        edit: GroupEdit,
    ) -> Result<Group, PanelError> {
        let form = edit
            .form()
            .ok_or(ValidationError::NothingToUpdate)
            .map_err(|e| app.report(e))?;
        let request =
            api::update_group(self.group_id, &form, edit.image).map_err(|e| app.report(e))?;
        app.fetch(request).await.map_err(|e| app.report(e))?;
        info!("updated group {}", self.group_id);

        let ticket = app.store().begin(FetchKey::Group(self.group_id));
        let group: Group = app
            .fetch_as(api::group_detail(self.group_id))
            .await
            .map_err(|e| app.report(e))?;
        app.store().commit(ticket, |s| s.set_group(group.clone()));
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_without_text_has_no_form() {
        let edit = GroupEdit {
            name: Some("  ".to_string()),
            content: None,
            image: Some(Upload::new("a.png", "image/png", vec![1])),
        };
        assert!(edit.form().is_none());
    }

    #[test]
    fn edit_keeps_trimmed_fields() {
        let edit = GroupEdit {
            name: None,
            content: Some(" new description ".to_string()),
            image: None,
        };
        let form = edit.form().unwrap();
        assert_eq!(form.content.as_deref(), Some("new description"));
        assert!(form.name.is_none());
    }
}
