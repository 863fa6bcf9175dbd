//! Scrollback pane for history and diagnostics.

/// Lines shown when the client starts.
const WELCOME: [&str; 3] = [
    "Welcome to SlackTUI!",
    "Use Tab key to move box focus.",
    "Use cursor keys to choose item.",
];

/// Rule width around the welcome text.
const RULE_WIDTH: usize = 40;

/// State of the content pane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentPane {
    label: Option<String>,
    lines: Vec<String>,
    /// Number of leading lines rendered centered (the welcome banner).
    centered: usize,
    /// Lines scrolled up from the bottom.
    scroll_back: usize,
}

impl ContentPane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pane holding the welcome banner.
    pub fn welcome() -> Self {
        let rule = "=".repeat(RULE_WIDTH);
        let mut lines = vec![rule.clone()];
        lines.extend(WELCOME.iter().map(|s| s.to_string()));
        lines.push(rule);

        Self {
            centered: lines.len(),
            lines,
            ..Self::default()
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn centered_lines(&self) -> usize {
        self.centered
    }

    pub fn scroll_back(&self) -> usize {
        self.scroll_back
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.centered = 0;
        self.scroll_back = 0;
    }

    /// Append `text`, one entry per line.
    pub fn log(&mut self, text: &str) {
        self.lines.extend(text.split('\n').map(str::to_string));
    }

    pub fn scroll_up(&mut self, amount: usize) {
        self.scroll_back = (self.scroll_back + amount).min(self.lines.len().saturating_sub(1));
    }

    pub fn scroll_down(&mut self, amount: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(amount);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_back = self.lines.len().saturating_sub(1);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_back = 0;
    }

    /// First line to draw when `height` rows are visible.
    pub fn first_visible(&self, height: usize) -> usize {
        self.lines
            .len()
            .saturating_sub(height)
            .saturating_sub(self.scroll_back)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_banner() {
        let pane = ContentPane::welcome();
        assert_eq!(pane.lines().len(), 5);
        assert_eq!(pane.lines()[1], "Welcome to SlackTUI!");
        assert_eq!(pane.centered_lines(), 5);
    }

    #[test]
    fn test_log_splits_lines_and_clear_resets() {
        let mut pane = ContentPane::welcome();
        pane.log("Loading...");
        pane.log("a: one\nb: two");
        assert_eq!(pane.lines().len(), 8);

        pane.clear();
        assert!(pane.lines().is_empty());
        assert_eq!(pane.centered_lines(), 0);
    }

    #[test]
    fn test_scrolling_window() {
        let mut pane = ContentPane::new();
        for i in 0..10 {
            pane.log(&format!("line {i}"));
        }
        assert_eq!(pane.first_visible(4), 6);

        pane.scroll_up(3);
        assert_eq!(pane.first_visible(4), 3);

        pane.scroll_up(100);
        assert_eq!(pane.first_visible(4), 0);

        pane.scroll_to_bottom();
        assert_eq!(pane.first_visible(4), 6);
    }
}
