// Orchestration: owns the application state and runs the event loop between
// the TUI and the background tasks.

pub mod app;

pub use app::{run, AppState, TaskEvent, TASK_CHANNEL_CAPACITY};
