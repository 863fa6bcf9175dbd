//! Terminal view.
//!
//! [`View`] is plain state: three selector lists, the content pane, the
//! message line and which of them has focus. Key events go in through
//! [`View::handle_key`] and come out as [`ViewEvent`]s for the controller;
//! team render requests go in through [`View::apply_request`]. Drawing is
//! in [`render`].

mod content;
mod focus;
mod input;
pub mod render;
mod selector;

pub use content::ContentPane;
pub use focus::FocusTarget;
pub use input::InputState;
pub use selector::SelectorList;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::team::ViewRequest;

/// Rows moved by PageUp / PageDown in the content pane.
const PAGE_SCROLL: usize = 10;

/// What the operator asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// Enter on a team list entry (label as shown).
    TeamSelected(String),
    /// Enter on a channel list entry (label as shown).
    ChannelSelected(String),
    /// Enter on the user list, by position.
    UserSelected(usize),
    /// Enter in the message line. The line has already been cleared.
    Submit(String),
    /// Ctrl-C.
    Quit,
}

/// Everything on screen.
#[derive(Debug, Clone)]
pub struct View {
    pub teams: SelectorList,
    pub channels: SelectorList,
    pub users: SelectorList,
    pub content: ContentPane,
    pub input: InputState,
    focus: FocusTarget,
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

impl View {
    pub fn new() -> Self {
        Self {
            teams: SelectorList::new(),
            channels: SelectorList::new(),
            users: SelectorList::new(),
            content: ContentPane::welcome(),
            input: InputState::new(),
            focus: FocusTarget::TeamList,
        }
    }

    pub fn focus(&self) -> FocusTarget {
        self.focus
    }

    pub fn set_focus(&mut self, focus: FocusTarget) {
        self.focus = focus;
    }

    /// Append to the content pane.
    pub fn log(&mut self, text: &str) {
        self.content.log(text);
    }

    /// Paint a team's render request. Notifications are not the view's
    /// concern and are ignored here.
    pub fn apply_request(&mut self, request: &ViewRequest) {
        match request {
            ViewRequest::ChannelList(items) => self.channels.set_items(items.clone()),
            ViewRequest::UserList(items) => self.users.set_items(items.clone()),
            ViewRequest::ClearContent => self.content.clear(),
            ViewRequest::ContentLabel(label) => self.content.set_label(label.clone()),
            ViewRequest::Log(text) => self.content.log(text),
            ViewRequest::Notify(_) => {}
        }
    }

    /// Route a key press to the focused widget.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ViewEvent> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(ViewEvent::Quit);
        }

        match key.code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return None;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return None;
            }
            KeyCode::Char('t')
                if !self.focus.is_text_entry()
                    && !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.focus = FocusTarget::TeamList;
                return None;
            }
            _ => {}
        }

        match self.focus {
            FocusTarget::TeamList => {
                list_key(&mut self.teams, key).map(|(_, label)| ViewEvent::TeamSelected(label))
            }
            FocusTarget::ChannelList => list_key(&mut self.channels, key)
                .map(|(_, label)| ViewEvent::ChannelSelected(label)),
            FocusTarget::UserList => {
                list_key(&mut self.users, key).map(|(index, _)| ViewEvent::UserSelected(index))
            }
            FocusTarget::MessageInput => self.input_key(key),
            FocusTarget::ContentPane => {
                self.content_key(key);
                None
            }
        }
    }

    /// Bracketed paste goes to the message line when it has focus.
    pub fn handle_paste(&mut self, text: &str) {
        if self.focus.is_text_entry() {
            self.input.insert_str(text);
        }
    }

    fn input_key(&mut self, key: KeyEvent) -> Option<ViewEvent> {
        match key.code {
            KeyCode::Enter => return Some(ViewEvent::Submit(self.input.take())),
            KeyCode::Esc => self.focus = FocusTarget::ContentPane,
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete(),
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.clear()
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.insert(c)
            }
            _ => {}
        }
        None
    }

    fn content_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.content.scroll_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.content.scroll_down(1),
            KeyCode::PageUp => self.content.scroll_up(PAGE_SCROLL),
            KeyCode::PageDown => self.content.scroll_down(PAGE_SCROLL),
            KeyCode::Home => self.content.scroll_to_top(),
            KeyCode::End => self.content.scroll_to_bottom(),
            _ => {}
        }
    }
}

/// Shared list navigation. Returns the selection on Enter.
fn list_key(list: &mut SelectorList, key: KeyEvent) -> Option<(usize, String)> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => list.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => list.select_next(),
        KeyCode::Home => list.select_first(),
        KeyCode::End => list.select_last(),
        KeyCode::Enter => {
            let index = list.selected_index()?;
            let label = list.selected_item()?.to_string();
            return Some((index, label));
        }
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(view: &mut View, text: &str) {
        for c in text.chars() {
            assert_eq!(view.handle_key(press(KeyCode::Char(c))), None);
        }
    }

    #[test]
    fn test_tab_cycles_focus() {
        let mut view = View::new();
        let mut order = vec![view.focus()];
        for _ in 0..5 {
            view.handle_key(press(KeyCode::Tab));
            order.push(view.focus());
        }
        assert_eq!(&order[..5], &FocusTarget::ORDER[..]);
        assert_eq!(order[5], FocusTarget::TeamList);

        view.handle_key(press(KeyCode::BackTab));
        assert_eq!(view.focus(), FocusTarget::ContentPane);
    }

    #[test]
    fn test_t_jumps_to_teams_except_while_typing() {
        let mut view = View::new();
        view.set_focus(FocusTarget::UserList);
        view.handle_key(press(KeyCode::Char('t')));
        assert_eq!(view.focus(), FocusTarget::TeamList);

        view.set_focus(FocusTarget::MessageInput);
        type_text(&mut view, "tt");
        assert_eq!(view.focus(), FocusTarget::MessageInput);
        assert_eq!(view.input.value, "tt");
    }

    #[test]
    fn test_ctrl_c_quits_from_anywhere() {
        let mut view = View::new();
        for target in FocusTarget::ORDER {
            view.set_focus(target);
            assert_eq!(view.handle_key(ctrl('c')), Some(ViewEvent::Quit));
        }
    }

    #[test]
    fn test_list_enter_emits_selection() {
        let mut view = View::new();
        view.apply_request(&ViewRequest::ChannelList(vec![
            "general (3)".to_string(),
            "random (0)".to_string(),
        ]));
        view.set_focus(FocusTarget::ChannelList);

        view.handle_key(press(KeyCode::Down));
        assert_eq!(
            view.handle_key(press(KeyCode::Enter)),
            Some(ViewEvent::ChannelSelected("random (0)".to_string()))
        );

        view.apply_request(&ViewRequest::UserList(vec![
            "@alice".to_string(),
            "@bob".to_string(),
        ]));
        view.set_focus(FocusTarget::UserList);
        view.handle_key(press(KeyCode::End));
        assert_eq!(
            view.handle_key(press(KeyCode::Enter)),
            Some(ViewEvent::UserSelected(1))
        );
    }

    #[test]
    fn test_enter_on_empty_list_does_nothing() {
        let mut view = View::new();
        assert_eq!(view.handle_key(press(KeyCode::Enter)), None);
    }

    #[test]
    fn test_submit_clears_line() {
        let mut view = View::new();
        view.set_focus(FocusTarget::MessageInput);
        type_text(&mut view, "hi");

        assert_eq!(
            view.handle_key(press(KeyCode::Enter)),
            Some(ViewEvent::Submit("hi".to_string()))
        );
        assert!(view.input.is_empty());

        view.handle_key(press(KeyCode::Esc));
        assert_eq!(view.focus(), FocusTarget::ContentPane);
    }

    #[test]
    fn test_requests_paint_content() {
        let mut view = View::new();
        view.apply_request(&ViewRequest::ClearContent);
        view.apply_request(&ViewRequest::ContentLabel("Acme/#general".to_string()));
        view.apply_request(&ViewRequest::Log("alice: first\nbob: second".to_string()));
        view.apply_request(&ViewRequest::Notify("New message on Acme".to_string()));

        assert_eq!(view.content.label(), Some("Acme/#general"));
        assert_eq!(
            view.content.lines().to_vec(),
            vec!["alice: first".to_string(), "bob: second".to_string()]
        );
    }

    #[test]
    fn test_paste_only_into_input() {
        let mut view = View::new();
        view.handle_paste("ignored");
        assert!(view.input.is_empty());

        view.set_focus(FocusTarget::MessageInput);
        view.handle_paste("pasted");
        assert_eq!(view.input.value, "pasted");
    }
}
