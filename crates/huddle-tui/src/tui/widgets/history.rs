// Draw history widget: winners, most recent first.
//
// Each: "#{n} {name}" where n counts up from the first draw.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;

use huddle_core::Participant;

use super::visible_window;
use crate::tui::ViewState;

/// Format history entries with their draw number, most recent first.
pub fn format_history(history: &[Participant]) -> Vec<String> {
    let total = history.len();
    history
        .iter()
        .enumerate()
        .map(|(i, p)| format!("#{} {}", total - i, p.name))
        .collect()
}

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let history = &state.app.history;
    let title = format!("History ({})", history.len());

    if history.is_empty() {
        let paragraph = Paragraph::new("  No winners yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);
        return;
    }

    let offset = state.scroll_offset.get("history").copied().unwrap_or(0);
    let (offset, rows) = visible_window(area, history.len(), offset);

    let items: Vec<ListItem> = format_history(history)
        .into_iter()
        .enumerate()
        .skip(offset)
        .take(rows)
        .map(|(i, text)| {
            // Latest winner in bold
            let style = if i == 0 {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(Span::styled(text, style)))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}
