// TUI dashboard: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors the application state. The app
// orchestrator pushes `UiUpdate` messages over an mpsc channel; the TUI
// applies them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::collections::HashMap;
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;

use huddle_core::protocol::{AppSnapshot, Notice, TabId, UiUpdate, UserCommand};

use layout::build_layout;

// ---------------------------------------------------------------------------
// InputMode
// ---------------------------------------------------------------------------

/// What the input line is currently capturing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Names separated by commas.
    Names,
    /// Path of a text/CSV roster file.
    FilePath,
    /// Theme for group names.
    Theme,
}

impl InputMode {
    pub fn prompt(self) -> &'static str {
        match self {
            InputMode::Normal => "",
            InputMode::Names => "Names (comma separated): ",
            InputMode::FilePath => "File path: ",
            InputMode::Theme => "Theme: ",
        }
    }
}

/// Yes/no question shown over the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    Quit,
    ClearRoster,
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the application state for rendering.
///
/// `app` is replaced wholesale by every snapshot; the remaining fields are
/// owned by the TUI.
pub struct ViewState {
    pub app: AppSnapshot,
    /// Which tab is active in the main panel.
    pub active_tab: TabId,
    /// Name shown in the draw panel: the animation frame while drawing,
    /// otherwise the last winner.
    pub draw_display: Option<String>,
    /// Most recent notice from the orchestrator.
    pub notice: Option<Notice>,
    pub input_mode: InputMode,
    pub input_text: String,
    /// Open confirmation dialog, if any.
    pub confirm: Option<Confirm>,
    /// Per-widget scroll offsets (keyed by widget name).
    pub scroll_offset: HashMap<String, usize>,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            app: AppSnapshot::default(),
            active_tab: TabId::Participants,
            draw_display: None,
            notice: None,
            input_mode: InputMode::Normal,
            input_text: String::new(),
            confirm: None,
            scroll_offset: HashMap::new(),
        }
    }
}

impl ViewState {
    /// Apply a full state snapshot from the app orchestrator.
    pub fn apply_snapshot(&mut self, snapshot: AppSnapshot) {
        if let Some(tab) = snapshot.active_tab {
            self.active_tab = tab;
        }
        if !snapshot.drawing {
            self.draw_display = snapshot.winner.as_ref().map(|w| w.name.clone());
        }
        self.app = snapshot;
    }

    pub fn is_editing(&self) -> bool {
        self.input_mode != InputMode::Normal
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::StateSnapshot(snapshot) => {
            state.apply_snapshot(*snapshot);
        }
        UiUpdate::DrawTick(name) => {
            if state.app.drawing {
                state.draw_display = Some(name);
            }
        }
        UiUpdate::Notice(notice) => {
            state.notice = Some(notice);
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete dashboard frame.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);

    match state.active_tab {
        TabId::Participants => {
            widgets::participants::render(frame, layout.main_panel, state);
            widgets::participants::render_summary(frame, layout.sidebar, state);
        }
        TabId::LuckyDraw => {
            widgets::lucky_draw::render(frame, layout.main_panel, state);
            widgets::history::render(frame, layout.sidebar, state);
        }
        TabId::Grouping => {
            widgets::groups::render(frame, layout.main_panel, state);
            widgets::groups::render_settings(frame, layout.sidebar, state);
        }
    }

    widgets::input_line::render(frame, layout.input_line, state);
    widgets::help_bar::render(frame, layout.help_bar, state);

    if let Some(prompt) = state.confirm {
        widgets::confirm::render(frame, frame.area(), prompt, state.app.participants.len());
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// This is the main entry point for the terminal UI. It:
/// 1. Initializes the terminal (enters raw mode, enables alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on clean exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    // 1. Initialize terminal
    let mut terminal = ratatui::init();

    // 2. Restore the terminal before the original panic hook prints.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    // 3. Render interval (~30fps)
    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            // UI updates from the app orchestrator
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    None => {
                        // Channel closed: app is shutting down
                        break;
                    }
                }
            }

            // Keyboard input
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }

            // Render tick
            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    // 4. Restore terminal
    ratatui::restore();

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
