// Participants widget: the roster list and its summary panel.
//
// Names that occur more than once are highlighted so they can be cleaned up
// with the remove-duplicates command.

use std::collections::HashSet;

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;

use huddle_core::roster::SMALL_ROSTER_THRESHOLD;

use super::visible_window;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let participants = &state.app.participants;
    let title = format!("Participants ({})", participants.len());

    if participants.is_empty() {
        let paragraph = Paragraph::new("  No participants yet. Press i to type names, f to load a file, m for samples.")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);
        return;
    }

    let duplicates: HashSet<&str> = state.app.duplicate_names.iter().map(String::as_str).collect();
    let offset = state.scroll_offset.get("participants").copied().unwrap_or(0);
    let (offset, rows) = visible_window(area, participants.len(), offset);

    let items: Vec<ListItem> = participants
        .iter()
        .enumerate()
        .skip(offset)
        .take(rows)
        .map(|(i, p)| {
            let style = if duplicates.contains(p.name.as_str()) {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>4}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(p.name.clone(), style),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

/// Summary lines for the sidebar: counts, duplicates and hints.
pub fn summary_lines(state: &ViewState) -> Vec<Line<'static>> {
    let count = state.app.participants.len();
    let mut lines = vec![Line::from(format!("Total: {count}"))];

    if state.app.small_roster {
        lines.push(Line::from(Span::styled(
            format!(
                "Small roster: draws and groups work best with {SMALL_ROSTER_THRESHOLD} or more people."
            ),
            Style::default().fg(Color::Cyan),
        )));
    }

    if state.app.duplicate_names.is_empty() {
        lines.push(Line::from("No duplicate names."));
    } else {
        lines.push(Line::from(Span::styled(
            format!("Duplicates ({}), press d to remove:", state.app.duplicate_names.len()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        for name in &state.app.duplicate_names {
            lines.push(Line::from(format!("  {name}")));
        }
    }
    lines
}

pub fn render_summary(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(summary_lines(state))
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Roster"));
    frame.render_widget(paragraph, area);
}
