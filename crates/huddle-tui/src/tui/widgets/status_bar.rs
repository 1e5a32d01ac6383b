// Status bar widget: tab indicator and roster counters.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use huddle_core::protocol::TabId;

use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [app name] [tab bar] | [participants] [pool] [groups]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = vec![Span::styled(
        " Huddle ",
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    spans.push(Span::raw(" "));
    spans.extend(tab_spans(state.active_tab));
    spans.push(Span::styled("| ", Style::default().fg(Color::Gray)));
    spans.push(Span::styled(
        counters(state),
        Style::default().fg(Color::White),
    ));

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Build tab indicator spans with the active tab highlighted.
/// E.g. "[1:Participants] [2:Lucky Draw] [3:Grouping]"
pub fn tab_spans(active: TabId) -> Vec<Span<'static>> {
    let tabs = [
        (TabId::Participants, "1:Participants"),
        (TabId::LuckyDraw, "2:Lucky Draw"),
        (TabId::Grouping, "3:Grouping"),
    ];

    let mut spans = Vec::new();
    for (tab_id, label) in tabs {
        let style = if tab_id == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{label}]"), style));
        spans.push(Span::raw(" "));
    }
    spans
}

pub fn counters(state: &ViewState) -> String {
    format!(
        "{} participants | {} in pool | {} groups",
        state.app.participants.len(),
        state.app.pool_size,
        state.app.groups.len()
    )
}
