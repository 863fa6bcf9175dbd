//! Focus cycling across the five widgets.

/// Widget holding keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum FocusTarget {
    #[default]
    TeamList,
    ChannelList,
    UserList,
    MessageInput,
    ContentPane,
}

impl FocusTarget {
    /// Tab order.
    pub const ORDER: [FocusTarget; 5] = [
        FocusTarget::TeamList,
        FocusTarget::ChannelList,
        FocusTarget::UserList,
        FocusTarget::MessageInput,
        FocusTarget::ContentPane,
    ];

    fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|t| *t == self)
            .unwrap_or_default()
    }

    /// Next widget in Tab order, wrapping around.
    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    /// Previous widget in Tab order, wrapping around.
    pub fn prev(self) -> Self {
        let len = Self::ORDER.len();
        Self::ORDER[(self.position() + len - 1) % len]
    }

    /// Border title.
    pub fn title(self) -> &'static str {
        match self {
            FocusTarget::TeamList => "Teams",
            FocusTarget::ChannelList => "Channels",
            FocusTarget::UserList => "Users",
            FocusTarget::MessageInput => "Message",
            FocusTarget::ContentPane => "Content",
        }
    }

    /// Whether typed characters go to a text field.
    pub fn is_text_entry(self) -> bool {
        matches!(self, FocusTarget::MessageInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_forward_wraps() {
        let mut focus = FocusTarget::default();
        let mut seen = vec![focus];
        for _ in 0..5 {
            focus = focus.next();
            seen.push(focus);
        }
        assert_eq!(
            seen,
            vec![
                FocusTarget::TeamList,
                FocusTarget::ChannelList,
                FocusTarget::UserList,
                FocusTarget::MessageInput,
                FocusTarget::ContentPane,
                FocusTarget::TeamList,
            ]
        );
    }

    #[test]
    fn test_cycle_backward() {
        assert_eq!(FocusTarget::TeamList.prev(), FocusTarget::ContentPane);
        assert_eq!(FocusTarget::MessageInput.prev(), FocusTarget::UserList);
        for target in FocusTarget::ORDER {
            assert_eq!(target.next().prev(), target);
        }
    }
}
