// Grouping widgets: the generated groups and the grouping settings panel.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;

use huddle_core::grouping::group_count;
use huddle_core::Group;

use super::visible_window;
use crate::tui::ViewState;

/// One header line per group followed by its members.
pub fn group_lines(groups: &[Group]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for group in groups {
        lines.push(Line::from(Span::styled(
            format!("{} ({})", group.name, group.members.len()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        for member in &group.members {
            lines.push(Line::from(format!("  {}", member.name)));
        }
    }
    lines
}

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let groups = &state.app.groups;
    let title = if state.app.generating {
        "Groups (naming...)".to_string()
    } else {
        format!("Groups ({})", groups.len())
    };

    if groups.is_empty() {
        let paragraph = Paragraph::new("  No groups yet. Press g to shuffle the roster into groups.")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);
        return;
    }

    let lines = group_lines(groups);
    let offset = state.scroll_offset.get("groups").copied().unwrap_or(0);
    let (offset, rows) = visible_window(area, lines.len(), offset);

    let items: Vec<ListItem> = lines
        .into_iter()
        .skip(offset)
        .take(rows)
        .map(ListItem::new)
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

pub fn settings_lines(state: &ViewState) -> Vec<Line<'static>> {
    let app = &state.app;
    let mut lines = vec![
        Line::from(format!("Group size: {}  (+/-)", app.group_size)),
        Line::from(format!("Theme: {}  (t)", app.theme)),
        Line::from(format!(
            "Groups for {} people: {}",
            app.participants.len(),
            group_count(app.participants.len(), app.group_size)
        )),
        Line::from(""),
    ];

    if app.generating {
        lines.push(Line::from(Span::styled(
            "Generating group names...",
            Style::default().fg(Color::Yellow),
        )));
    } else if app.groups.is_empty() {
        lines.push(Line::from("Press g to create groups."));
    } else {
        lines.push(Line::from("Press g to regroup, e to export CSV."));
    }
    lines
}

pub fn render_settings(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(settings_lines(state))
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Settings"));
    frame.render_widget(paragraph, area);
}
