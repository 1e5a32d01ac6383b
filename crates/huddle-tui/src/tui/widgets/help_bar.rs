// Help bar widget: key hints for the active tab.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use huddle_core::protocol::TabId;

use crate::tui::ViewState;

pub fn help_text(state: &ViewState) -> &'static str {
    if state.is_editing() {
        return " Enter:Submit | Esc:Cancel";
    }
    match state.active_tab {
        TabId::Participants => {
            " i:Type names | f:Load file | m:Samples | d:Dedupe | c:Clear | 1-3:Tabs | q:Quit"
        }
        TabId::LuckyDraw => " Space:Draw | x:Reset | a:Toggle repeat | 1-3:Tabs | q:Quit",
        TabId::Grouping => {
            " +/-:Group size | t:Theme | p:Preset | g:Group | e:Export CSV | 1-3:Tabs | q:Quit"
        }
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        help_text(state),
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}
