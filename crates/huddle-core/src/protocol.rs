// Message types exchanged between the orchestrator and the TUI.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::participant::{Group, Participant};

// ---------------------------------------------------------------------------
// TUI <-> app
// ---------------------------------------------------------------------------

/// Top-level views of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabId {
    Participants,
    LuckyDraw,
    Grouping,
}

/// Commands from the TUI to the app orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// Free-form names, separated by newlines or commas.
    AddNames(String),
    /// Read names from a text/CSV file.
    LoadFile(PathBuf),
    AddSamples,
    RemoveDuplicates,
    ClearRoster,
    StartDraw,
    ResetDraw,
    SetAllowRepeat(bool),
    SetGroupSize(usize),
    SetTheme(String),
    StartGrouping,
    ExportGroups,
    SwitchTab(TabId),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A one-line message for the status area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Full view of the application state, pushed after every state change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppSnapshot {
    pub participants: Vec<Participant>,
    /// Names that occur more than once in the roster.
    pub duplicate_names: Vec<String>,
    /// Non-empty roster below the suggested minimum.
    pub small_roster: bool,
    pub allow_repeat: bool,
    /// Participants the next draw selects from.
    pub pool_size: usize,
    /// Winners, most recent first.
    pub history: Vec<Participant>,
    /// True while the suspense animation runs.
    pub drawing: bool,
    /// Winner of the last completed draw.
    pub winner: Option<Participant>,
    pub group_size: usize,
    pub theme: String,
    pub groups: Vec<Group>,
    /// True while group names are being generated.
    pub generating: bool,
    pub active_tab: Option<TabId>,
}

/// Updates from the app orchestrator to the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    StateSnapshot(Box<AppSnapshot>),
    /// Name shown by the suspense animation.
    DrawTick(String),
    Notice(Notice),
}
