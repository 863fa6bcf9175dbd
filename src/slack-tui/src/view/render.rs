//! Drawing the view with ratatui.
//!
//! Layout:
//! - left column (25%): teams 25%, channels 25%, users 50% of the height
//! - right column (75%): content 80%, message input 20%

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use super::{ContentPane, FocusTarget, InputState, SelectorList, View};

/// Draw the whole screen.
pub fn render(frame: &mut Frame, view: &View) {
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(25), Constraint::Percentage(75)])
            .areas(frame.area());
    let [teams, channels, users] = Layout::vertical([
        Constraint::Percentage(25),
        Constraint::Percentage(25),
        Constraint::Percentage(50),
    ])
    .areas(left);
    let [content, input] =
        Layout::vertical([Constraint::Percentage(80), Constraint::Percentage(20)]).areas(right);

    let focus = view.focus();
    render_list(frame, teams, &view.teams, FocusTarget::TeamList, focus);
    render_list(frame, channels, &view.channels, FocusTarget::ChannelList, focus);
    render_list(frame, users, &view.users, FocusTarget::UserList, focus);
    render_content(frame, content, &view.content, focus == FocusTarget::ContentPane);
    render_input(frame, input, &view.input, focus == FocusTarget::MessageInput);
}

fn panel(title: &str, focused: bool) -> Block<'_> {
    let border = if focused { Color::Green } else { Color::White };
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

fn render_list(
    frame: &mut Frame,
    area: Rect,
    list: &SelectorList,
    target: FocusTarget,
    focus: FocusTarget,
) {
    let items: Vec<ListItem> = list
        .items()
        .iter()
        .map(|item| ListItem::new(item.as_str()))
        .collect();

    let widget = List::new(items)
        .block(panel(target.title(), focus == target))
        .highlight_style(Style::default().fg(Color::White).bg(Color::Green));

    let mut state = ListState::default();
    state.select(list.selected_index());
    frame.render_stateful_widget(widget, area, &mut state);
}

fn render_content(frame: &mut Frame, area: Rect, content: &ContentPane, focused: bool) {
    let block = panel(content.label().unwrap_or(""), focused);
    let inner = block.inner(area);
    let height = inner.height as usize;

    let first = content.first_visible(height);
    let lines: Vec<Line> = content
        .lines()
        .iter()
        .enumerate()
        .skip(first)
        .take(height)
        .map(|(idx, text)| {
            let line = Line::from(text.as_str());
            if idx < content.centered_lines() {
                line.centered()
            } else {
                line
            }
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_input(frame: &mut Frame, area: Rect, input: &InputState, focused: bool) {
    let block = panel(FocusTarget::MessageInput.title(), focused);
    let inner = block.inner(area);

    // Keep the cursor in view on long lines.
    let column = input.cursor_column() as u16;
    let offset = column.saturating_sub(inner.width.saturating_sub(1));

    let widget = Paragraph::new(input.value.as_str())
        .style(Style::default().fg(Color::White))
        .scroll((0, offset))
        .block(block);
    frame.render_widget(widget, area);

    if focused && inner.width > 0 && inner.height > 0 {
        frame.set_cursor_position(Position::new(inner.x + column - offset, inner.y));
    }
}
