// Confirmation overlay, drawn on top of the dashboard while
// `ViewState::confirm` holds a prompt.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::tui::Confirm;

const DIALOG_WIDTH: u16 = 40;
const DIALOG_HEIGHT: u16 = 5;

fn prompt_text(prompt: Confirm, roster_len: usize) -> (&'static str, String, String) {
    match prompt {
        Confirm::Quit => (
            " Quit ",
            " Roster and results are not saved.".to_string(),
            " Leave Huddle? (".to_string(),
        ),
        Confirm::ClearRoster => (
            " Clear roster ",
            format!(" All {roster_len} participants will go."),
            " Clear the roster? (".to_string(),
        ),
    }
}

pub fn render(frame: &mut Frame, area: Rect, prompt: Confirm, roster_len: usize) {
    let (title, detail, question) = prompt_text(prompt, roster_len);
    let dialog = centered_rect(DIALOG_WIDTH, DIALOG_HEIGHT, area);
    frame.render_widget(Clear, dialog);

    let key = |k: &'static str, color: Color| {
        Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
    };
    let lines = vec![
        Line::from(detail),
        Line::from(vec![
            Span::raw(question),
            key("y", Color::Green),
            Span::raw("/"),
            key("n", Color::Red),
            Span::raw(")"),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(title),
        )
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog);
}

/// A `width` x `height` rectangle centered in `area`, clamped to fit.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}
