// Terminal dashboard for the huddle binary.

pub mod tui;
