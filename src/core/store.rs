//! Normalized client-side store
//!
//! One table per entity, keyed by id, plus per-group (or per-plan) index
//! lists. Panels read through the selectors and write only after a confirmed
//! response. Every fetch takes a [`Ticket`] from [`Store::begin`]; its result
//! is applied through [`Store::commit`], which drops it if a newer fetch for
//! the same [`FetchKey`] has started since.

use crate::core::models::{
    Activity, Announcement, Group, Mentee, PendingMember, Plan, Submission, UserPage,
    WarningCount, WeekAttendance,
};
use crate::core::role::MemberRole;
use crate::debug;
use std::collections::{BTreeMap, HashMap};

/// What a fetch loads; fetches with equal keys supersede each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKey {
    /// Plan list of a group
    Plans(i64),
    /// Mentor review list of a plan
    Submissions(i64),
    /// Viewer's own submission for a plan
    MySubmission(i64),
    /// Activity list of a group
    Activities(i64),
    /// One activity
    Activity(i64),
    /// Recorded marks for the week selected in a group's activity form
    DraftWeek(i64),
    /// Attendance overview of a group
    AllWeeks(i64),
    /// Group detail
    Group(i64),
    /// Group roster
    Roster(i64),
    /// Warning counts of a group
    Warnings(i64),
    /// Viewer's user page
    UserPage,
    /// Announcement list
    Announcements,
    /// Member approval queue
    PendingMembers,
}

/// Proof that a fetch was started; see [`Store::commit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    key: FetchKey,
    generation: u64,
}

impl Ticket {
    /// Key the ticket was issued for
    #[must_use]
    pub const fn key(&self) -> FetchKey {
        self.key
    }
}

/// Entity tables and fetch generations
#[derive(Debug, Default)]
pub struct Store {
    generations: HashMap<FetchKey, u64>,

    plans: HashMap<i64, Plan>,
    group_plans: HashMap<i64, Vec<i64>>,

    submissions: HashMap<i64, Submission>,
    plan_submissions: HashMap<i64, Vec<i64>>,
    my_submissions: HashMap<i64, i64>,

    activities: HashMap<i64, Activity>,
    group_activities: HashMap<i64, Vec<i64>>,
    all_weeks: HashMap<i64, Vec<WeekAttendance>>,

    groups: HashMap<i64, Group>,
    mentees: HashMap<String, Mentee>,
    rosters: HashMap<i64, Vec<String>>,
    warnings: HashMap<i64, BTreeMap<String, u32>>,
    member_roles: HashMap<i64, MemberRole>,

    user_page: Option<UserPage>,
    announcements: BTreeMap<i64, Announcement>,
    pending_members: Vec<PendingMember>,
}

impl Store {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch for `key`, superseding any fetch already in flight
    pub fn begin(&mut self, key: FetchKey) -> Ticket {
        let generation = self.generations.entry(key).or_insert(0);
        *generation += 1;
        Ticket {
            key,
            generation: *generation,
        }
    }

    /// True when no newer fetch for the ticket's key has started
    #[must_use]
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.generations.get(&ticket.key) == Some(&ticket.generation)
    }

    /// Apply `write` if `ticket` is still current; returns whether it was applied
    pub fn commit(&mut self, ticket: Ticket, write: impl FnOnce(&mut Self)) -> bool {
        if self.is_current(&ticket) {
            write(self);
            true
        } else {
            debug!(
                "dropping stale response for {:?} (generation {})",
                ticket.key, ticket.generation
            );
            false
        }
    }

    /// Forget everything, including fetch generations
    pub fn clear(&mut self) {
        let generations = std::mem::take(&mut self.generations);
        *self = Self::default();
        // in-flight fetches started before the clear must stay stale
        self.generations = generations
            .into_iter()
            .map(|(key, generation)| (key, generation + 1))
            .collect();
    }

    // ------------------------------------------------------------ plans

    /// Replace the plan list of `group_id`
    pub fn set_plans(&mut self, group_id: i64, plans: Vec<Plan>) {
        if let Some(old) = self.group_plans.remove(&group_id) {
            for id in old {
                self.plans.remove(&id);
            }
        }
        let ids = plans.iter().map(|p| p.id).collect();
        for plan in plans {
            self.plans.insert(plan.id, plan);
        }
        self.group_plans.insert(group_id, ids);
    }

    /// Plans of `group_id` in server order
    #[must_use]
    pub fn plans(&self, group_id: i64) -> Vec<Plan> {
        self.group_plans
            .get(&group_id)
            .map(|ids| ids.iter().filter_map(|id| self.plans.get(id)).cloned().collect())
            .unwrap_or_default()
    }

    /// True once the plan list of `group_id` has been loaded
    #[must_use]
    pub fn has_plans(&self, group_id: i64) -> bool {
        self.group_plans.contains_key(&group_id)
    }

    /// One plan
    #[must_use]
    pub fn plan(&self, plan_id: i64) -> Option<&Plan> {
        self.plans.get(&plan_id)
    }

    /// Remove a plan and every submission hanging off it
    pub fn remove_plan(&mut self, plan_id: i64) {
        self.plans.remove(&plan_id);
        for ids in self.group_plans.values_mut() {
            ids.retain(|id| *id != plan_id);
        }
        if let Some(ids) = self.plan_submissions.remove(&plan_id) {
            for id in ids {
                self.submissions.remove(&id);
            }
        }
        if let Some(id) = self.my_submissions.remove(&plan_id) {
            self.submissions.remove(&id);
        }
    }

    // ------------------------------------------------------ submissions

    /// Replace the mentor review list of `plan_id`
    pub fn set_submissions(&mut self, plan_id: i64, submissions: Vec<Submission>) {
        if let Some(old) = self.plan_submissions.remove(&plan_id) {
            let mine = self.my_submissions.get(&plan_id).copied();
            for id in old.into_iter().filter(|id| Some(*id) != mine) {
                self.submissions.remove(&id);
            }
        }
        let ids = submissions.iter().map(|s| s.id).collect();
        for submission in submissions {
            self.submissions.insert(submission.id, submission);
        }
        self.plan_submissions.insert(plan_id, ids);
    }

    /// Review list of `plan_id`; `None` until it has been fetched
    #[must_use]
    pub fn submissions(&self, plan_id: i64) -> Option<Vec<Submission>> {
        self.plan_submissions.get(&plan_id).map(|ids| {
            ids.iter()
                .filter_map(|id| self.submissions.get(id))
                .cloned()
                .collect()
        })
    }

    /// Record the viewer's submission for `plan_id`, replacing any other
    pub fn set_my_submission(&mut self, plan_id: i64, submission: Submission) {
        if let Some(old) = self.my_submissions.insert(plan_id, submission.id) {
            if old != submission.id {
                self.submissions.remove(&old);
            }
        }
        self.submissions.insert(submission.id, submission);
    }

    /// Viewer's submission for `plan_id`
    #[must_use]
    pub fn my_submission(&self, plan_id: i64) -> Option<&Submission> {
        self.my_submissions
            .get(&plan_id)
            .and_then(|id| self.submissions.get(id))
    }

    /// Forget the viewer's submission for `plan_id`
    pub fn clear_my_submission(&mut self, plan_id: i64) {
        if let Some(id) = self.my_submissions.remove(&plan_id) {
            self.submissions.remove(&id);
            if let Some(ids) = self.plan_submissions.get_mut(&plan_id) {
                ids.retain(|s| *s != id);
            }
        }
    }

    // ------------------------------------------------------- activities

    /// Replace the activity list of `group_id`
    pub fn set_activities(&mut self, group_id: i64, activities: Vec<Activity>) {
        if let Some(old) = self.group_activities.remove(&group_id) {
            for id in old {
                self.activities.remove(&id);
            }
        }
        let ids = activities.iter().map(|a| a.id).collect();
        for activity in activities {
            self.activities.insert(activity.id, activity);
        }
        self.group_activities.insert(group_id, ids);
    }

    /// Insert or replace one activity of `group_id`
    pub fn upsert_activity(&mut self, group_id: i64, activity: Activity) {
        let ids = self.group_activities.entry(group_id).or_default();
        if !ids.contains(&activity.id) {
            ids.push(activity.id);
        }
        self.activities.insert(activity.id, activity);
    }

    /// Remove one activity
    pub fn remove_activity(&mut self, activity_id: i64) {
        self.activities.remove(&activity_id);
        for ids in self.group_activities.values_mut() {
            ids.retain(|id| *id != activity_id);
        }
    }

    /// Activities of `group_id` in server order
    #[must_use]
    pub fn activities(&self, group_id: i64) -> Vec<Activity> {
        self.group_activities
            .get(&group_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.activities.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// One activity
    #[must_use]
    pub fn activity(&self, activity_id: i64) -> Option<&Activity> {
        self.activities.get(&activity_id)
    }

    /// Replace the attendance overview of `group_id`
    pub fn set_all_weeks(&mut self, group_id: i64, weeks: Vec<WeekAttendance>) {
        self.all_weeks.insert(group_id, weeks);
    }

    /// Attendance overview of `group_id`
    #[must_use]
    pub fn all_weeks(&self, group_id: i64) -> Option<&[WeekAttendance]> {
        self.all_weeks.get(&group_id).map(Vec::as_slice)
    }

    // ------------------------------------------------------------ group

    /// Store group detail
    pub fn set_group(&mut self, group: Group) {
        self.groups.insert(group.id, group);
    }

    /// Group detail
    #[must_use]
    pub fn group(&self, group_id: i64) -> Option<&Group> {
        self.groups.get(&group_id)
    }

    /// Replace the roster of `group_id`; mentees are shared across groups by student number
    pub fn set_roster(&mut self, group_id: i64, roster: Vec<Mentee>) {
        if let Some(old) = self.rosters.remove(&group_id) {
            for key in old {
                if !self.rosters.values().any(|keys| keys.contains(&key)) {
                    self.mentees.remove(&key);
                }
            }
        }
        let keys = roster.iter().map(|m| m.student_number.clone()).collect();
        for mentee in roster {
            self.mentees.insert(mentee.student_number.clone(), mentee);
        }
        self.rosters.insert(group_id, keys);
    }

    /// Roster of `group_id`; `None` until it has been fetched
    #[must_use]
    pub fn roster(&self, group_id: i64) -> Option<Vec<Mentee>> {
        self.rosters.get(&group_id).map(|keys| {
            keys.iter()
                .filter_map(|k| self.mentees.get(k))
                .cloned()
                .collect()
        })
    }

    /// Replace warning counts of `group_id`
    pub fn set_warnings(&mut self, group_id: i64, counts: Vec<WarningCount>) {
        let map = counts
            .into_iter()
            .map(|w| (w.student_number, w.count))
            .collect();
        self.warnings.insert(group_id, map);
    }

    /// Warning counts of `group_id` keyed by student number
    #[must_use]
    pub fn warnings(&self, group_id: i64) -> BTreeMap<String, u32> {
        self.warnings.get(&group_id).cloned().unwrap_or_default()
    }

    /// Warnings issued to one member
    #[must_use]
    pub fn warning_count(&self, group_id: i64, student_number: &str) -> u32 {
        self.warnings
            .get(&group_id)
            .and_then(|m| m.get(student_number))
            .copied()
            .unwrap_or(0)
    }

    /// Store the viewer's resolved role in `group_id`
    pub fn set_member_role(&mut self, group_id: i64, role: MemberRole) {
        self.member_roles.insert(group_id, role);
    }

    /// Viewer's resolved role in `group_id`
    #[must_use]
    pub fn member_role(&self, group_id: i64) -> Option<MemberRole> {
        self.member_roles.get(&group_id).copied()
    }

    // ---------------------------------------------------------- account

    /// Store the user page
    pub fn set_user_page(&mut self, page: UserPage) {
        self.user_page = Some(page);
    }

    /// Viewer's user page
    #[must_use]
    pub const fn user_page(&self) -> Option<&UserPage> {
        self.user_page.as_ref()
    }

    /// Replace all announcements
    pub fn set_announcements(&mut self, list: Vec<Announcement>) {
        self.announcements = list.into_iter().map(|a| (a.id, a)).collect();
    }

    /// Insert or replace one announcement
    pub fn upsert_announcement(&mut self, announcement: Announcement) {
        self.announcements.insert(announcement.id, announcement);
    }

    /// Remove one announcement
    pub fn remove_announcement(&mut self, id: i64) {
        self.announcements.remove(&id);
    }

    /// Announcements, newest id first
    #[must_use]
    pub fn announcements(&self) -> Vec<Announcement> {
        self.announcements.values().rev().cloned().collect()
    }

    /// Replace the approval queue
    pub fn set_pending_members(&mut self, list: Vec<PendingMember>) {
        self.pending_members = list;
    }

    /// Drop one entry from the approval queue
    pub fn remove_pending_member(&mut self, student_number: &str) {
        self.pending_members
            .retain(|m| m.student_number != student_number);
    }

    /// Approval queue
    #[must_use]
    pub fn pending_members(&self) -> &[PendingMember] {
        &self.pending_members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(id: i64) -> Plan {
        serde_json::from_value(serde_json::json!({"id": id, "title": format!("plan {id}")})).unwrap()
    }

    fn submission(id: i64, plan_id: i64) -> Submission {
        serde_json::from_value(serde_json::json!({"id": id, "planId": plan_id})).unwrap()
    }

    #[test]
    fn newer_ticket_wins() {
        let mut store = Store::new();
        let first = store.begin(FetchKey::Plans(1));
        let second = store.begin(FetchKey::Plans(1));

        assert!(store.commit(second, |s| s.set_plans(1, vec![plan(2)])));
        assert!(!store.commit(first, |s| s.set_plans(1, vec![plan(1)])));
        assert_eq!(store.plans(1)[0].id, 2);
    }

    #[test]
    fn keys_are_independent() {
        let mut store = Store::new();
        let plans = store.begin(FetchKey::Plans(1));
        let _other = store.begin(FetchKey::Plans(2));
        let _roster = store.begin(FetchKey::Roster(1));
        assert!(store.is_current(&plans));
    }

    #[test]
    fn clear_invalidates_in_flight_tickets() {
        let mut store = Store::new();
        let ticket = store.begin(FetchKey::UserPage);
        store.clear();
        assert!(!store.is_current(&ticket));
    }

    #[test]
    fn removing_plan_drops_its_submissions() {
        let mut store = Store::new();
        store.set_plans(1, vec![plan(10), plan(11)]);
        store.set_submissions(10, vec![submission(100, 10), submission(101, 10)]);
        store.set_my_submission(10, submission(102, 10));

        store.remove_plan(10);
        assert_eq!(store.plans(1).len(), 1);
        assert!(store.submissions(10).is_none());
        assert!(store.my_submission(10).is_none());
    }

    #[test]
    fn my_submission_is_single() {
        let mut store = Store::new();
        store.set_my_submission(5, submission(1, 5));
        store.set_my_submission(5, submission(2, 5));
        assert_eq!(store.my_submission(5).map(|s| s.id), Some(2));
        store.clear_my_submission(5);
        assert!(store.my_submission(5).is_none());
    }

    #[test]
    fn refetched_review_list_evicts_old_rows_but_keeps_mine() {
        let mut store = Store::new();
        store.set_my_submission(10, submission(102, 10));
        store.set_submissions(10, vec![submission(100, 10), submission(101, 10), submission(102, 10)]);
        store.set_submissions(10, vec![submission(101, 10)]);

        assert_eq!(store.submissions.len(), 2);
        assert!(!store.submissions.contains_key(&100));
        assert_eq!(store.my_submission(10).map(|s| s.id), Some(102));
    }

    #[test]
    fn refetched_roster_evicts_members_no_group_lists() {
        let mentee = |sn: &str| -> Mentee {
            serde_json::from_value(serde_json::json!({"studentNumber": sn, "name": sn})).unwrap()
        };
        let mut store = Store::new();
        store.set_roster(1, vec![mentee("a"), mentee("b")]);
        store.set_roster(2, vec![mentee("b")]);
        store.set_roster(1, vec![mentee("c")]);

        assert!(!store.mentees.contains_key("a"));
        assert!(store.mentees.contains_key("b"));
        assert_eq!(store.roster(2).map(|r| r.len()), Some(1));
        assert_eq!(store.mentees.len(), 2);
    }
}
