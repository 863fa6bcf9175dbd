//! Workspace members.

use slack_tui_api::Member;

/// A member of one workspace. Replaced wholesale on every user refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Owning team name.
    pub team: String,
    /// User ID.
    pub id: String,
    /// Handle shown as `@name`.
    pub name: String,
}

impl User {
    pub fn new(team: impl Into<String>, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            id: id.into(),
            name: name.into(),
        }
    }

    pub(crate) fn from_member(team: &str, member: Member) -> Self {
        Self::new(team, member.id, member.name)
    }

    /// Entry in the user selector list.
    pub fn selector_label(&self) -> String {
        format!("@{}", self.name)
    }
}
