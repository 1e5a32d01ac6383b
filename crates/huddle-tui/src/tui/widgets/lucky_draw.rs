// Lucky draw widget: the flashing name during the suspense animation and the
// winner once it is revealed.

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::ViewState;

/// Headline shown in the middle of the panel.
pub fn headline(state: &ViewState) -> (String, Style) {
    let app = &state.app;
    match (&state.draw_display, app.drawing) {
        (Some(name), true) => (
            name.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        (None, true) => ("...".to_string(), Style::default().fg(Color::Yellow)),
        (Some(name), false) => (
            format!("Winner: {name}"),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        (None, false) if app.participants.is_empty() => (
            "Add participants first".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        (None, false) if app.pool_size == 0 => (
            "Everyone has been drawn".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        (None, false) => (
            "Press Space to draw".to_string(),
            Style::default().fg(Color::White),
        ),
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (text, style) = headline(state);
    let mode = if state.app.allow_repeat {
        "repeat winners allowed"
    } else {
        "each person wins once"
    };

    let top_padding = (area.height as usize).saturating_sub(6) / 2;
    let mut lines: Vec<Line> = std::iter::repeat(Line::from("")).take(top_padding).collect();
    lines.push(Line::from(Span::styled(text, style)));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "{} of {} in pool ({mode})",
            state.app.pool_size,
            state.app.participants.len()
        ),
        Style::default().fg(Color::Gray),
    )));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Lucky Draw"));
    frame.render_widget(paragraph, area);
}
