// TUI widget modules for each dashboard panel.

pub mod confirm;
pub mod groups;
pub mod help_bar;
pub mod history;
pub mod input_line;
pub mod lucky_draw;
pub mod participants;
pub mod status_bar;

use ratatui::layout::Rect;

/// Clamp a scroll offset so the last page stays full, and return it with the
/// number of visible rows inside a bordered block of `area`.
pub fn visible_window(area: Rect, total: usize, offset: usize) -> (usize, usize) {
    let visible_rows = (area.height as usize).saturating_sub(2).max(1);
    let max_offset = total.saturating_sub(visible_rows);
    (offset.min(max_offset), visible_rows)
}
