// Domain core: roster, lucky draw and grouping engines, CSV export,
// configuration and the message types shared with the app and TUI.

pub mod config;
pub mod draw;
pub mod export;
pub mod grouping;
pub mod participant;
pub mod protocol;
pub mod roster;

pub use draw::{DrawEngine, DrawError, PendingDraw};
pub use grouping::{GroupNamer, GroupingEngine, GroupingError, PendingGrouping, PlaceholderNamer};
pub use participant::{Group, Participant};
pub use roster::Roster;
