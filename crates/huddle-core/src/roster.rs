// Roster: the ordered participant list plus text/file ingestion and
// duplicate handling.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::participant::{next_id, Participant};

/// Below this many participants the UI suggests adding more.
pub const SMALL_ROSTER_THRESHOLD: usize = 5;

/// Built-in sample names for trying the tool without real data.
pub const SAMPLE_NAMES: &[&str] = &[
    "張小明",
    "李美玲",
    "王大同",
    "陳佩琪",
    "林國華",
    "Alice Johnson",
    "Bob Smith",
    "Charlie Brown",
    "David Wilson",
    "Eva Green",
    "黃心怡",
    "周杰倫",
    "吳建宏",
    "鄭文燦",
    "許淑華",
    "Frank Miller",
    "Grace Lee",
    "Henry Ford",
    "Ivy Chen",
    "Jack Ma",
];

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Split free-form text into participant names.
///
/// Tokens are separated by newlines or commas, trimmed, and empty tokens are
/// dropped. A leading byte-order mark is ignored.
pub fn parse_names(text: &str) -> Vec<String> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.split(|c: char| matches!(c, '\n' | '\r' | ','))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Names from raw file bytes. Invalid UTF-8 sequences become U+FFFD
/// instead of failing the whole import.
fn parse_names_from_bytes(bytes: &[u8]) -> Vec<String> {
    let content = String::from_utf8_lossy(bytes);
    if matches!(content, std::borrow::Cow::Owned(_)) {
        warn!("roster file is not valid UTF-8, replacing invalid bytes");
    }
    parse_names(&content)
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// The ordered list of registered participants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    participants: Vec<Participant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from plain names, minting a fresh id for each.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Roster {
            participants: names.into_iter().map(Participant::new).collect(),
        }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// True when the roster is non-empty but below the suggested minimum.
    pub fn is_small(&self) -> bool {
        !self.participants.is_empty() && self.participants.len() < SMALL_ROSTER_THRESHOLD
    }

    /// Parse `text` and append one participant per name.
    ///
    /// Returns the number of participants added.
    pub fn ingest_text(&mut self, text: &str) -> usize {
        let names = parse_names(text);
        let added = names.len();
        self.participants
            .extend(names.into_iter().map(Participant::new));
        debug!(added, total = self.participants.len(), "ingested text");
        added
    }

    /// Read a text or CSV file and append its names.
    pub fn ingest_file(&mut self, path: &Path) -> Result<usize, RosterError> {
        let bytes = std::fs::read(path).map_err(|e| RosterError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let names = parse_names_from_bytes(&bytes);
        let added = names.len();
        self.participants
            .extend(names.into_iter().map(Participant::new));
        info!("Loaded {} names from {}", added, path.display());
        Ok(added)
    }

    /// Append the built-in sample names.
    pub fn add_samples(&mut self) -> usize {
        let stamp = next_id("mock");
        self.participants.extend(
            SAMPLE_NAMES
                .iter()
                .enumerate()
                .map(|(i, name)| Participant::with_id(format!("{stamp}-{i}"), *name)),
        );
        SAMPLE_NAMES.len()
    }

    /// Names that occur more than once.
    pub fn duplicate_names(&self) -> BTreeSet<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for p in &self.participants {
            *counts.entry(p.name.as_str()).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Keep only the first participant for each name.
    ///
    /// Returns the number of participants removed.
    pub fn remove_duplicates(&mut self) -> usize {
        let before = self.participants.len();
        let mut seen: HashSet<String> = HashSet::new();
        self.participants.retain(|p| seen.insert(p.name.clone()));
        let removed = before - self.participants.len();
        if removed > 0 {
            info!("Removed {} duplicate participants", removed);
        }
        removed
    }

    pub fn clear(&mut self) {
        self.participants.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn names(roster: &Roster) -> Vec<&str> {
        roster.participants().iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn parse_names_mixed_separators() {
        let parsed = parse_names("Alice, Bob\nCarol,,\n  Dave  \n");
        assert_eq!(parsed, vec!["Alice", "Bob", "Carol", "Dave"]);
    }

    #[test]
    fn parse_names_crlf_and_bom() {
        let parsed = parse_names("\u{feff}Alice\r\nBob\r\n");
        assert_eq!(parsed, vec!["Alice", "Bob"]);
    }

    #[test]
    fn parse_names_blank_input() {
        assert!(parse_names("").is_empty());
        assert!(parse_names(" , \n ,").is_empty());
    }

    #[test]
    fn parse_names_keeps_inner_whitespace() {
        assert_eq!(parse_names("Alice Johnson"), vec!["Alice Johnson"]);
    }

    #[test]
    fn parse_names_from_bytes_strips_bom() {
        let parsed = parse_names_from_bytes("\u{feff}name one\nname two,name three".as_bytes());
        assert_eq!(parsed, vec!["name one", "name two", "name three"]);
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let parsed = parse_names_from_bytes(b"Ann,Bob\nJos\xe9\nCy\n");
        assert_eq!(parsed, vec!["Ann", "Bob", "Jos\u{fffd}", "Cy"]);
    }

    #[test]
    fn ingest_text_appends_in_order() {
        let mut roster = Roster::from_names(["Zed"]);
        let added = roster.ingest_text("Alice\nBob");
        assert_eq!(added, 2);
        assert_eq!(names(&roster), vec!["Zed", "Alice", "Bob"]);
    }

    #[test]
    fn ingest_text_allows_duplicate_names_with_unique_ids() {
        let mut roster = Roster::new();
        roster.ingest_text("Alice,Alice");
        assert_eq!(roster.len(), 2);
        let ids: HashSet<_> = roster.participants().iter().map(|p| &p.id).collect();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn ingest_file_reads_names() {
        let dir = std::env::temp_dir().join("huddle_roster_ingest_file");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("names.csv");
        std::fs::write(&path, "Alice,Bob\nCarol\n").unwrap();

        let mut roster = Roster::new();
        let added = roster.ingest_file(&path).unwrap();
        assert_eq!(added, 3);
        assert_eq!(names(&roster), vec!["Alice", "Bob", "Carol"]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn ingest_file_tolerates_latin1_bytes() {
        let dir = std::env::temp_dir().join("huddle_roster_ingest_latin1");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("names.csv");
        std::fs::write(&path, b"Ann,Bob\nJos\xe9\nCy\n").unwrap();

        let mut roster = Roster::new();
        assert_eq!(roster.ingest_file(&path).unwrap(), 4);
        assert_eq!(names(&roster), vec!["Ann", "Bob", "Jos\u{fffd}", "Cy"]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn ingest_file_missing_is_io_error() {
        let mut roster = Roster::new();
        let err = roster
            .ingest_file(Path::new("/nonexistent/huddle/names.txt"))
            .unwrap_err();
        assert!(matches!(err, RosterError::Io { .. }));
        assert!(roster.is_empty());
    }

    #[test]
    fn add_samples_adds_twenty_unique_ids() {
        let mut roster = Roster::new();
        assert_eq!(roster.add_samples(), 20);
        roster.add_samples();
        assert_eq!(roster.len(), 40);
        let ids: HashSet<_> = roster.participants().iter().map(|p| &p.id).collect();
        assert_eq!(ids.len(), 40);
    }

    #[test]
    fn duplicate_names_reports_each_once() {
        let roster = Roster::from_names(["A", "B", "A", "C", "B", "A"]);
        let dups = roster.duplicate_names();
        assert_eq!(dups.into_iter().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn remove_duplicates_keeps_first_occurrence() {
        let mut roster = Roster::from_names(["A", "B", "A", "C", "B"]);
        let first_a = roster.participants()[0].id.clone();
        let removed = roster.remove_duplicates();
        assert_eq!(removed, 2);
        assert_eq!(names(&roster), vec!["A", "B", "C"]);
        assert_eq!(roster.participants()[0].id, first_a);
        assert!(roster.duplicate_names().is_empty());
    }

    #[test]
    fn is_small_threshold() {
        assert!(Roster::from_names(["a", "b", "c", "d"]).is_small());
        assert!(!Roster::from_names(["a", "b", "c", "d", "e"]).is_small());
        assert!(!Roster::new().is_small());
    }

    #[test]
    fn clear_empties_roster() {
        let mut roster = Roster::from_names(["a", "b"]);
        roster.clear();
        assert!(roster.is_empty());
    }
}
