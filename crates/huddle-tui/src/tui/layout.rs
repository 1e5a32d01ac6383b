// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +-------------------------+------------------------+
// | Main Panel (65%)        | Sidebar (35%)          |
// +-------------------------+------------------------+
// | Input / Notice Line (3 rows)                      |
// +--------------------------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each dashboard zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: tabs and roster counters.
    pub status_bar: Rect,
    /// Tab-switched content area.
    pub main_panel: Rect,
    /// Tab-switched summary next to the main panel.
    pub sidebar: Rect,
    /// Text entry while editing, the latest notice otherwise.
    pub input_line: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(6),    // main + sidebar
            Constraint::Length(3), // input line
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(vertical[1]);

    AppLayout {
        status_bar: vertical[0],
        main_panel: horizontal[0],
        sidebar: horizontal[1],
        input_line: vertical[2],
        help_bar: vertical[3],
    }
}
