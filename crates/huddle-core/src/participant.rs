// Participant and group records shared by the draw and grouping engines.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Process-wide sequence so ids minted within the same millisecond differ.
static ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generate a fresh opaque id of the form `<prefix>-<unix millis>-<seq>`.
pub fn next_id(prefix: &str) -> String {
    let seq = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let millis = chrono::Utc::now().timestamp_millis();
    format!("{prefix}-{millis}-{seq}")
}

/// A single registered participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    /// Opaque id, unique within a roster.
    pub id: String,
    /// Display name. Not required to be unique.
    pub name: String,
}

impl Participant {
    /// Create a participant with a freshly generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Participant {
            id: next_id("p"),
            name: name.into(),
        }
    }

    /// Create a participant with an explicit id (sample data, tests).
    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Participant {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One group of a grouping result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    /// Members in shuffled order.
    pub members: Vec<Participant>,
}
