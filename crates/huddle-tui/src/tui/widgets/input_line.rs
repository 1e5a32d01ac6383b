// Input line widget: the text being typed while editing, otherwise the most
// recent notice from the orchestrator.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use huddle_core::protocol::NoticeLevel;

use crate::tui::ViewState;

pub fn notice_color(level: NoticeLevel) -> Color {
    match level {
        NoticeLevel::Info => Color::Green,
        NoticeLevel::Warning => Color::Yellow,
        NoticeLevel::Error => Color::Red,
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (line, border) = if state.is_editing() {
        (
            Line::from(vec![
                Span::styled(state.input_mode.prompt(), Style::default().fg(Color::Cyan)),
                Span::raw(state.input_text.clone()),
                Span::styled("_", Style::default().fg(Color::Cyan)),
            ]),
            Style::default().fg(Color::Cyan),
        )
    } else if let Some(notice) = &state.notice {
        (
            Line::from(Span::styled(
                notice.message.clone(),
                Style::default().fg(notice_color(notice.level)),
            )),
            Style::default(),
        )
    } else {
        (Line::from(""), Style::default())
    };

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border),
    );
    frame.render_widget(paragraph, area);
}
