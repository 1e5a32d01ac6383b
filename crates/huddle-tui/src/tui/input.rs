// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages sent to the
// app orchestrator, or into local ViewState mutations (tab switching,
// scrolling, the input line).

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use huddle_core::grouping::{next_theme_preset, MIN_GROUP_SIZE};
use huddle_core::protocol::{TabId, UserCommand};

use super::{Confirm, InputMode, ViewState};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app orchestrator. Returns `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Crossterm emits Press and Release on some platforms.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if let Some(prompt) = view_state.confirm {
        return handle_confirm(prompt, key_event, view_state);
    }

    if view_state.is_editing() {
        return handle_input_mode(key_event, view_state);
    }

    match key_event.code {
        KeyCode::Char('1') => switch_tab(view_state, TabId::Participants),
        KeyCode::Char('2') => switch_tab(view_state, TabId::LuckyDraw),
        KeyCode::Char('3') => switch_tab(view_state, TabId::Grouping),

        KeyCode::Up | KeyCode::Char('k') => {
            scroll_up(view_state, 1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            scroll_down(view_state, 1);
            None
        }
        KeyCode::PageUp => {
            scroll_up(view_state, 10);
            None
        }
        KeyCode::PageDown => {
            scroll_down(view_state, 10);
            None
        }

        KeyCode::Char('q') => {
            view_state.confirm = Some(Confirm::Quit);
            None
        }

        code => match view_state.active_tab {
            TabId::Participants => participants_key(code, view_state),
            TabId::LuckyDraw => draw_key(code, view_state),
            TabId::Grouping => grouping_key(code, view_state),
        },
    }
}

fn switch_tab(view_state: &mut ViewState, tab: TabId) -> Option<UserCommand> {
    if view_state.active_tab == tab {
        return None;
    }
    view_state.active_tab = tab;
    Some(UserCommand::SwitchTab(tab))
}

fn begin_input(view_state: &mut ViewState, mode: InputMode, initial: &str) {
    view_state.input_mode = mode;
    view_state.input_text = initial.to_string();
}

fn participants_key(code: KeyCode, view_state: &mut ViewState) -> Option<UserCommand> {
    match code {
        KeyCode::Char('i') => {
            begin_input(view_state, InputMode::Names, "");
            None
        }
        KeyCode::Char('f') => {
            begin_input(view_state, InputMode::FilePath, "");
            None
        }
        KeyCode::Char('m') => Some(UserCommand::AddSamples),
        KeyCode::Char('d') => Some(UserCommand::RemoveDuplicates),
        KeyCode::Char('c') if !view_state.app.participants.is_empty() => {
            view_state.confirm = Some(Confirm::ClearRoster);
            None
        }
        _ => None,
    }
}

fn draw_key(code: KeyCode, view_state: &mut ViewState) -> Option<UserCommand> {
    match code {
        KeyCode::Char(' ') | KeyCode::Enter if !view_state.app.drawing => {
            Some(UserCommand::StartDraw)
        }
        KeyCode::Char('x') => Some(UserCommand::ResetDraw),
        KeyCode::Char('a') => Some(UserCommand::SetAllowRepeat(!view_state.app.allow_repeat)),
        _ => None,
    }
}

fn grouping_key(code: KeyCode, view_state: &mut ViewState) -> Option<UserCommand> {
    let size = view_state.app.group_size;
    let max_size = view_state.app.participants.len().max(MIN_GROUP_SIZE);
    match code {
        KeyCode::Char('+') | KeyCode::Char('=') if size < max_size => {
            Some(UserCommand::SetGroupSize(size + 1))
        }
        KeyCode::Char('-') if size > MIN_GROUP_SIZE => Some(UserCommand::SetGroupSize(size - 1)),
        KeyCode::Char('t') => {
            let theme = view_state.app.theme.clone();
            begin_input(view_state, InputMode::Theme, &theme);
            None
        }
        KeyCode::Char('p') => Some(UserCommand::SetTheme(
            next_theme_preset(&view_state.app.theme).to_string(),
        )),
        KeyCode::Char('g') if !view_state.app.generating => Some(UserCommand::StartGrouping),
        KeyCode::Char('e') => Some(UserCommand::ExportGroups),
        _ => None,
    }
}

/// y confirms, n/Esc cancel, everything else is blocked. `q` also confirms
/// a quit.
fn handle_confirm(
    prompt: Confirm,
    key_event: KeyEvent,
    view_state: &mut ViewState,
) -> Option<UserCommand> {
    let accepted = match (key_event.code, prompt) {
        (KeyCode::Char('y') | KeyCode::Char('Y'), _) => true,
        (KeyCode::Char('q') | KeyCode::Char('Q'), Confirm::Quit) => true,
        (KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc, _) => false,
        _ => return None,
    };
    view_state.confirm = None;
    if !accepted {
        return None;
    }
    Some(match prompt {
        Confirm::Quit => UserCommand::Quit,
        Confirm::ClearRoster => UserCommand::ClearRoster,
    })
}

/// Edit the input line. Enter submits, Esc cancels.
fn handle_input_mode(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.input_mode = InputMode::Normal;
            view_state.input_text.clear();
            None
        }
        KeyCode::Enter => {
            let mode = view_state.input_mode;
            let text = std::mem::take(&mut view_state.input_text);
            view_state.input_mode = InputMode::Normal;
            submit_input(mode, text)
        }
        KeyCode::Backspace => {
            view_state.input_text.pop();
            None
        }
        KeyCode::Char(c) => {
            view_state.input_text.push(c);
            None
        }
        _ => None,
    }
}

fn submit_input(mode: InputMode, text: String) -> Option<UserCommand> {
    let trimmed = text.trim();
    match mode {
        InputMode::Normal => None,
        InputMode::Names if trimmed.is_empty() => None,
        InputMode::Names => Some(UserCommand::AddNames(text)),
        InputMode::FilePath if trimmed.is_empty() => None,
        InputMode::FilePath => Some(UserCommand::LoadFile(PathBuf::from(trimmed))),
        InputMode::Theme => Some(UserCommand::SetTheme(trimmed.to_string())),
    }
}

/// Widget key for scroll state based on the active tab.
pub fn active_widget_key(tab: TabId) -> &'static str {
    match tab {
        TabId::Participants => "participants",
        TabId::LuckyDraw => "history",
        TabId::Grouping => "groups",
    }
}

fn scroll_up(view_state: &mut ViewState, lines: usize) {
    let key = active_widget_key(view_state.active_tab);
    let offset = view_state.scroll_offset.entry(key.to_string()).or_insert(0);
    *offset = offset.saturating_sub(lines);
}

fn scroll_down(view_state: &mut ViewState, lines: usize) {
    let key = active_widget_key(view_state.active_tab);
    let offset = view_state.scroll_offset.entry(key.to_string()).or_insert(0);
    *offset = offset.saturating_add(lines);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
