//! Group membership role resolution

use crate::core::models::{AuthenticatedUser, Group, Mentee, Role};
use std::fmt;

/// The viewer's standing in one group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberRole {
    /// Mentor of the group
    Mentor,
    /// Mentee on the roster
    Mentee,
    /// Signed in but not a member, or signed out
    Outsider,
}

impl MemberRole {
    /// True for [`MemberRole::Mentor`]
    #[must_use]
    pub const fn is_mentor(self) -> bool {
        matches!(self, Self::Mentor)
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mentor => "mentor",
            Self::Mentee => "mentee",
            Self::Outsider => "outsider",
        })
    }
}

fn same_person(user: &AuthenticatedUser, student_number: &str, email: &str) -> bool {
    let sn = student_number.trim();
    let mail = email.trim();
    (!sn.is_empty() && sn == user.student_number.trim())
        || (!mail.is_empty() && mail.eq_ignore_ascii_case(user.email.trim()))
}

/// Resolve the viewer's role in a group.
///
/// With a roster (`Some`), the roster decides: matching the group's mentor by
/// student number or email gives `Mentor`, matching a mentee gives `Mentee`,
/// anything else `Outsider`. When the roster could not be fetched (`None`),
/// the token's role claim is used instead. No user is always `Outsider`.
#[must_use]
pub fn current_member_role(
    user: Option<&AuthenticatedUser>,
    group: Option<&Group>,
    roster: Option<&[Mentee]>,
) -> MemberRole {
    let Some(user) = user else {
        return MemberRole::Outsider;
    };

    if let Some(roster) = roster {
        let mentor = group.and_then(|g| g.mentor.as_ref());
        if mentor.is_some_and(|m| same_person(user, &m.student_number, &m.email)) {
            return MemberRole::Mentor;
        }
        if roster
            .iter()
            .any(|m| same_person(user, &m.student_number, &m.email))
        {
            return MemberRole::Mentee;
        }
        return MemberRole::Outsider;
    }

    match user.role {
        Role::Mentor | Role::Admin => MemberRole::Mentor,
        Role::Mentee => MemberRole::Mentee,
        Role::Other(_) => MemberRole::Outsider,
    }
}
