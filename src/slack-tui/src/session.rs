//! Which workspace the panels show.

/// Process-wide view state. Changing focus never touches team data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    focused_team: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused_team(&self) -> Option<&str> {
        self.focused_team.as_deref()
    }

    pub fn is_focused(&self, team: &str) -> bool {
        self.focused_team.as_deref() == Some(team)
    }

    /// The session with `team` focused.
    #[must_use]
    pub fn focus(&self, team: impl Into<String>) -> Self {
        Self {
            focused_team: Some(team.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_is_a_transition() {
        let empty = Session::new();
        let acme = empty.focus("Acme");

        assert_eq!(empty.focused_team(), None);
        assert_eq!(acme.focused_team(), Some("Acme"));
        assert!(acme.is_focused("Acme"));
        assert!(!acme.is_focused("Globex"));
        assert_eq!(acme.focus("Globex").focused_team(), Some("Globex"));
    }
}
