// Grouping engine: shuffle the roster, slice it into fixed-size groups and
// label each group with a generated name.

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::participant::{next_id, Group, Participant};

/// Smallest group size the engine accepts.
pub const MIN_GROUP_SIZE: usize = 2;

/// Themes offered without typing.
pub const THEME_PRESETS: &[&str] = &[
    "Professional",
    "Superheroes",
    "Space Exploration",
    "Exotic Fruits",
    "Greek Gods",
    "Famous Scientists",
];

/// The preset after `current`, wrapping around. A custom theme moves to the
/// first preset.
pub fn next_theme_preset(current: &str) -> &'static str {
    let next = THEME_PRESETS
        .iter()
        .position(|p| p.eq_ignore_ascii_case(current.trim()))
        .map_or(0, |i| (i + 1) % THEME_PRESETS.len());
    THEME_PRESETS[next]
}

// ---------------------------------------------------------------------------
// Naming collaborator
// ---------------------------------------------------------------------------

/// Source of display names for groups.
///
/// Best-effort and infallible: implementations absorb their own failures and
/// may return fewer (or more) names than requested.
#[async_trait]
pub trait GroupNamer: Send + Sync {
    async fn generate_names(&self, count: usize, theme: &str) -> Vec<String>;
}

/// Placeholder name for the group at zero-based `index`.
pub fn placeholder_name(index: usize) -> String {
    format!("Team {}", index + 1)
}

/// `count` placeholder names: "Team 1", "Team 2", ...
pub fn placeholder_names(count: usize) -> Vec<String> {
    (0..count).map(placeholder_name).collect()
}

/// Namer that never calls out; every group gets its placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderNamer;

#[async_trait]
impl GroupNamer for PlaceholderNamer {
    async fn generate_names(&self, count: usize, _theme: &str) -> Vec<String> {
        placeholder_names(count)
    }
}

/// Pad or truncate `names` to exactly `count` entries. Missing and blank
/// entries are replaced by their placeholder.
pub fn resolve_names(names: Vec<String>, count: usize) -> Vec<String> {
    if names.len() != count {
        debug!(requested = count, received = names.len(), "adjusting group names");
    }
    let mut names = names.into_iter();
    (0..count)
        .map(|i| match names.next() {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => placeholder_name(i),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Shuffle and partition
// ---------------------------------------------------------------------------

/// Uniformly random permutation (Fisher–Yates).
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = rng.gen_range(0..=i);
        out.swap(i, j);
    }
    out
}

/// Number of groups needed for `len` participants.
pub fn group_count(len: usize, group_size: usize) -> usize {
    if group_size == 0 {
        return 0;
    }
    len.div_ceil(group_size)
}

/// Contiguous chunks of `group_size`; the last chunk holds the remainder.
pub fn partition<T: Clone>(items: &[T], group_size: usize) -> Vec<Vec<T>> {
    if group_size == 0 {
        return Vec::new();
    }
    items.chunks(group_size).map(<[T]>::to_vec).collect()
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupingError {
    #[error("no participants to group")]
    EmptyRoster,

    #[error("group size must be at least 2, got {0}")]
    InvalidGroupSize(usize),

    #[error("a grouping is already being generated")]
    AlreadyGenerating,
}

// ---------------------------------------------------------------------------
// PendingGrouping
// ---------------------------------------------------------------------------

/// A shuffled and partitioned roster waiting for its group names.
#[derive(Debug)]
pub struct PendingGrouping {
    chunks: Vec<Vec<Participant>>,
    theme: String,
}

impl PendingGrouping {
    pub fn group_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn chunks(&self) -> &[Vec<Participant>] {
        &self.chunks
    }
}

// ---------------------------------------------------------------------------
// GroupingEngine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct GroupingEngine {
    groups: Vec<Group>,
    generating: bool,
}

impl GroupingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent grouping result.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// True while a grouping is waiting on its names.
    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// Validate, shuffle and partition. Marks the engine as generating.
    pub fn begin<R: Rng + ?Sized>(
        &mut self,
        roster: &[Participant],
        group_size: usize,
        theme: &str,
        rng: &mut R,
    ) -> Result<PendingGrouping, GroupingError> {
        if self.generating {
            return Err(GroupingError::AlreadyGenerating);
        }
        if roster.is_empty() {
            return Err(GroupingError::EmptyRoster);
        }
        if group_size < MIN_GROUP_SIZE {
            return Err(GroupingError::InvalidGroupSize(group_size));
        }

        let shuffled = shuffle(roster, rng);
        let chunks = partition(&shuffled, group_size);
        debug_assert_eq!(chunks.len(), group_count(roster.len(), group_size));

        self.generating = true;
        debug!(
            participants = roster.len(),
            group_size,
            groups = chunks.len(),
            "grouping started"
        );
        Ok(PendingGrouping {
            chunks,
            theme: theme.to_string(),
        })
    }

    /// Attach names to a pending grouping and make it the current result.
    pub fn complete(&mut self, pending: PendingGrouping, names: Vec<String>) -> &[Group] {
        let names = resolve_names(names, pending.chunks.len());
        self.groups = pending
            .chunks
            .into_iter()
            .zip(names)
            .map(|(members, name)| Group {
                id: next_id("g"),
                name,
                members,
            })
            .collect();
        self.generating = false;
        info!("Created {} groups", self.groups.len());
        &self.groups
    }

    /// Drop an unfinished grouping, keeping the previous result.
    pub fn abandon(&mut self) {
        if self.generating {
            warn!("abandoning unfinished grouping");
        }
        self.generating = false;
    }

    /// Run a full grouping: partition, ask `namer` for names, complete.
    pub async fn group<R: Rng + ?Sized>(
        &mut self,
        roster: &[Participant],
        group_size: usize,
        theme: &str,
        namer: &dyn GroupNamer,
        rng: &mut R,
    ) -> Result<&[Group], GroupingError> {
        let pending = self.begin(roster, group_size, theme, rng)?;
        let names = namer
            .generate_names(pending.group_count(), pending.theme())
            .await;
        Ok(self.complete(pending, names))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn people(n: usize) -> Vec<Participant> {
        (0..n)
            .map(|i| Participant::with_id(format!("id-{i}"), format!("Person {i}")))
            .collect()
    }

    struct FixedNamer(Vec<String>);

    #[async_trait]
    impl GroupNamer for FixedNamer {
        async fn generate_names(&self, _count: usize, _theme: &str) -> Vec<String> {
            self.0.clone()
        }
    }

    #[test]
    fn theme_presets_cycle() {
        assert_eq!(next_theme_preset("Professional"), "Superheroes");
        assert_eq!(next_theme_preset("superheroes"), "Space Exploration");
        assert_eq!(next_theme_preset("Famous Scientists"), "Professional");
        assert_eq!(next_theme_preset("Pirates"), "Professional");
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let items: Vec<u32> = (0..50).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let mut shuffled = shuffle(&items, &mut rng);
        assert_eq!(shuffled.len(), items.len());
        shuffled.sort_unstable();
        assert_eq!(shuffled, items);
    }

    #[test]
    fn shuffle_handles_empty_and_single() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(shuffle::<u8, _>(&[], &mut rng).is_empty());
        assert_eq!(shuffle(&[9], &mut rng), vec![9]);
    }

    #[test]
    fn shuffle_positions_are_uniform() {
        let items = [0usize, 1, 2, 3];
        let mut rng = StdRng::seed_from_u64(2024);
        let trials = 24_000;
        // counts[item][position]
        let mut counts = [[0usize; 4]; 4];
        for _ in 0..trials {
            for (pos, item) in shuffle(&items, &mut rng).into_iter().enumerate() {
                counts[item][pos] += 1;
            }
        }
        // Expected 6000 per cell.
        for row in counts {
            for cell in row {
                assert!((5600..=6400).contains(&cell), "non-uniform: {counts:?}");
            }
        }
    }

    #[test]
    fn shuffle_produces_every_permutation_of_three() {
        let items = ['a', 'b', 'c'];
        let mut rng = StdRng::seed_from_u64(5);
        let seen: HashSet<Vec<char>> = (0..600).map(|_| shuffle(&items, &mut rng)).collect();
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn partition_sizes() {
        let items: Vec<u8> = (0..10).collect();
        let chunks = partition(&items, 4);
        let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        assert_eq!(group_count(10, 4), 3);
    }

    #[test]
    fn partition_exact_multiple_has_no_short_group() {
        let items: Vec<u8> = (0..9).collect();
        let sizes: Vec<usize> = partition(&items, 3).iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 3, 3]);
    }

    #[test]
    fn partition_size_larger_than_roster_gives_one_group() {
        let items: Vec<u8> = (0..3).collect();
        assert_eq!(partition(&items, 8).len(), 1);
        assert_eq!(group_count(3, 8), 1);
    }

    #[test]
    fn resolve_names_pads_with_placeholders() {
        assert_eq!(
            resolve_names(vec![], 3),
            vec!["Team 1", "Team 2", "Team 3"]
        );
        assert_eq!(
            resolve_names(vec!["Falcons".into()], 3),
            vec!["Falcons", "Team 2", "Team 3"]
        );
    }

    #[test]
    fn resolve_names_truncates_and_replaces_blanks() {
        let names = vec!["A".into(), "  ".into(), "C".into(), "D".into()];
        assert_eq!(resolve_names(names, 3), vec!["A", "Team 2", "C"]);
    }

    #[tokio::test]
    async fn group_ten_by_four() {
        let roster = people(10);
        let mut engine = GroupingEngine::new();
        let mut rng = StdRng::seed_from_u64(3);
        let groups = engine
            .group(&roster, 4, "Space", &PlaceholderNamer, &mut rng)
            .await
            .unwrap();

        let mut sizes: Vec<usize> = groups.iter().map(|g| g.members.len()).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![2, 4, 4]);

        let ids: Vec<&str> = groups
            .iter()
            .flat_map(|g| g.members.iter().map(|m| m.id.as_str()))
            .collect();
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(ids.len(), 10);
        assert_eq!(unique.len(), 10);
        let expected: HashSet<&str> = roster.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(unique, expected);
        assert!(!engine.is_generating());
    }

    #[tokio::test]
    async fn failed_namer_yields_team_placeholders() {
        let roster = people(10);
        let mut engine = GroupingEngine::new();
        let mut rng = StdRng::seed_from_u64(3);
        let groups = engine
            .group(&roster, 4, "Space", &FixedNamer(vec![]), &mut rng)
            .await
            .unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Team 1", "Team 2", "Team 3"]);
    }

    #[tokio::test]
    async fn namer_names_are_used_in_order() {
        let roster = people(5);
        let mut engine = GroupingEngine::new();
        let mut rng = StdRng::seed_from_u64(3);
        let namer = FixedNamer(vec!["Red".into(), "Blue".into(), "Green".into()]);
        let groups = engine.group(&roster, 2, "Colors", &namer, &mut rng).await.unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Red", "Blue", "Green"]);
    }

    #[tokio::test]
    async fn regrouping_replaces_previous_result() {
        let roster = people(6);
        let mut engine = GroupingEngine::new();
        let mut rng = StdRng::seed_from_u64(3);
        engine.group(&roster, 2, "x", &PlaceholderNamer, &mut rng).await.unwrap();
        let first_ids: HashSet<String> = engine.groups().iter().map(|g| g.id.clone()).collect();

        engine.group(&roster, 3, "x", &PlaceholderNamer, &mut rng).await.unwrap();
        assert_eq!(engine.groups().len(), 2);
        assert!(engine.groups().iter().all(|g| !first_ids.contains(&g.id)));
    }

    #[test]
    fn begin_validates_inputs() {
        let mut engine = GroupingEngine::new();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            engine.begin(&[], 4, "x", &mut rng).unwrap_err(),
            GroupingError::EmptyRoster
        );
        assert_eq!(
            engine.begin(&people(3), 1, "x", &mut rng).unwrap_err(),
            GroupingError::InvalidGroupSize(1)
        );
        assert!(!engine.is_generating());
    }

    #[test]
    fn begin_rejects_reentrant_grouping() {
        let roster = people(4);
        let mut engine = GroupingEngine::new();
        let mut rng = StdRng::seed_from_u64(3);
        let pending = engine.begin(&roster, 2, "x", &mut rng).unwrap();
        assert!(engine.is_generating());
        assert_eq!(
            engine.begin(&roster, 2, "x", &mut rng).unwrap_err(),
            GroupingError::AlreadyGenerating
        );

        engine.complete(pending, vec![]);
        assert!(!engine.is_generating());
        assert!(engine.begin(&roster, 2, "x", &mut rng).is_ok());
    }

    #[test]
    fn abandon_keeps_previous_groups() {
        let roster = people(4);
        let mut engine = GroupingEngine::new();
        let mut rng = StdRng::seed_from_u64(3);
        let pending = engine.begin(&roster, 2, "x", &mut rng).unwrap();
        engine.complete(pending, vec!["A".into(), "B".into()]);

        let _pending = engine.begin(&roster, 4, "x", &mut rng).unwrap();
        engine.abandon();
        assert!(!engine.is_generating());
        assert_eq!(engine.groups().len(), 2);
        assert_eq!(engine.groups()[0].name, "A");
    }

    #[test]
    fn members_keep_shuffled_order() {
        let roster = people(7);
        let mut engine = GroupingEngine::new();
        let mut rng = StdRng::seed_from_u64(11);
        let pending = engine.begin(&roster, 3, "x", &mut rng).unwrap();
        let flattened: Vec<Participant> = pending.chunks().concat();
        let groups = engine.complete(pending, vec![]);
        let from_groups: Vec<Participant> =
            groups.iter().flat_map(|g| g.members.clone()).collect();
        assert_eq!(from_groups, flattened);
    }
}
