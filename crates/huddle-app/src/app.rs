// Application state and orchestration logic.
//
// The central event loop that owns the roster and both engines, applies user
// commands from the TUI, and reacts to events from the background tasks (the
// suspense animation and group naming). Pushes UI updates to the TUI render
// loop after every state change.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use huddle_core::config::Config;
use huddle_core::export::write_export;
use huddle_core::grouping::MIN_GROUP_SIZE;
use huddle_core::protocol::{AppSnapshot, Notice, TabId, UiUpdate, UserCommand};
use huddle_core::{
    DrawEngine, DrawError, GroupNamer, GroupingEngine, Participant, PendingDraw, PendingGrouping,
    Roster,
};

// ---------------------------------------------------------------------------
// Task events
// ---------------------------------------------------------------------------

/// Events sent by background tasks back to the event loop. `generation`
/// identifies the task so events from cancelled tasks can be dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    /// A name flashed by the suspense animation.
    DrawTick { name: String, generation: u64 },
    /// The suspense animation ran to completion.
    DrawFinished { generation: u64 },
    /// The namer produced names for a pending grouping.
    NamesReady { names: Vec<String>, generation: u64 },
}

/// Capacity of the task event channel.
pub const TASK_CHANNEL_CAPACITY: usize = 256;

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub roster: Roster,
    pub draw: DrawEngine,
    pub grouping: GroupingEngine,
    pub group_size: usize,
    pub theme: String,
    pub active_tab: TabId,
    /// Winner of the last committed draw, cleared on reset.
    pub last_winner: Option<Participant>,
    namer: Arc<dyn GroupNamer>,
    rng: StdRng,
    pending_draw: Option<PendingDraw>,
    draw_task: Option<JoinHandle<()>>,
    /// Identifies the current animation task. Incremented on every draw.
    draw_generation: u64,
    pending_grouping: Option<PendingGrouping>,
    naming_task: Option<JoinHandle<()>>,
    /// Identifies the current naming task. Incremented on every grouping.
    naming_generation: u64,
    task_tx: mpsc::Sender<TaskEvent>,
}

impl AppState {
    pub fn new(
        config: Config,
        namer: Arc<dyn GroupNamer>,
        rng: StdRng,
        task_tx: mpsc::Sender<TaskEvent>,
    ) -> Self {
        let draw = DrawEngine::new(&[], config.draw.allow_repeat);
        let group_size = config.grouping.group_size;
        let theme = config.grouping.theme.clone();

        AppState {
            config,
            roster: Roster::new(),
            draw,
            grouping: GroupingEngine::new(),
            group_size,
            theme,
            active_tab: TabId::Participants,
            last_winner: None,
            namer,
            rng,
            pending_draw: None,
            draw_task: None,
            draw_generation: 0,
            pending_grouping: None,
            naming_task: None,
            naming_generation: 0,
            task_tx,
        }
    }

    /// True while the suspense animation for a pending draw runs.
    pub fn is_drawing(&self) -> bool {
        self.pending_draw.is_some()
    }

    /// Build an `AppSnapshot` from the current application state.
    pub fn build_snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            participants: self.roster.participants().to_vec(),
            duplicate_names: self.roster.duplicate_names().into_iter().collect(),
            small_roster: self.roster.is_small(),
            allow_repeat: self.draw.allow_repeat(),
            pool_size: self.draw.pool_size(),
            history: self.draw.history().iter().cloned().collect(),
            drawing: self.is_drawing(),
            winner: self.last_winner.clone(),
            group_size: self.group_size,
            theme: self.theme.clone(),
            groups: self.grouping.groups().to_vec(),
            generating: self.grouping.is_generating(),
            active_tab: None, // Don't override the user's active tab
        }
    }

    // -----------------------------------------------------------------------
    // Roster
    // -----------------------------------------------------------------------

    /// Push the roster into the draw engine after any roster change. Cancels
    /// a running draw.
    fn roster_changed(&mut self) {
        self.cancel_draw_animation();
        self.draw.set_roster(self.roster.participants());
    }

    pub fn add_names(&mut self, text: &str) -> Notice {
        let added = self.roster.ingest_text(text);
        if added == 0 {
            return Notice::warning("No names found in input");
        }
        self.roster_changed();
        Notice::info(format!("Added {added} participants"))
    }

    pub fn load_file(&mut self, path: &Path) -> Notice {
        match self.roster.ingest_file(path) {
            Ok(0) => Notice::warning(format!("No names found in {}", path.display())),
            Ok(added) => {
                self.roster_changed();
                Notice::info(format!("Added {added} participants from {}", path.display()))
            }
            Err(e) => {
                warn!("Failed to load roster file: {}", e);
                Notice::error(e.to_string())
            }
        }
    }

    pub fn add_samples(&mut self) -> Notice {
        let added = self.roster.add_samples();
        self.roster_changed();
        Notice::info(format!("Added {added} sample participants"))
    }

    pub fn remove_duplicates(&mut self) -> Notice {
        let removed = self.roster.remove_duplicates();
        if removed == 0 {
            return Notice::info("No duplicate names found");
        }
        self.roster_changed();
        Notice::info(format!("Removed {removed} duplicate entries"))
    }

    pub fn clear_roster(&mut self) -> Notice {
        self.roster.clear();
        self.roster_changed();
        Notice::info("Cleared all participants")
    }

    // -----------------------------------------------------------------------
    // Lucky draw
    // -----------------------------------------------------------------------

    /// Select a winner and start the suspense animation. The winner is
    /// committed when the animation finishes.
    pub fn start_draw(&mut self) -> Result<(), DrawError> {
        self.cancel_draw_animation();

        let pending = self.draw.begin_draw(&mut self.rng)?;
        self.draw_generation += 1;
        let generation = self.draw_generation;

        let names: Vec<String> = self.draw.roster().iter().map(|p| p.name.clone()).collect();
        let interval = Duration::from_millis(self.config.draw.animation_interval_ms);
        let duration = Duration::from_millis(self.config.draw.animation_duration_ms);
        let rng = StdRng::seed_from_u64(self.rng.gen());
        let tx = self.task_tx.clone();

        debug!(generation, "starting draw animation");
        self.draw_task = Some(tokio::spawn(run_draw_animation(
            names, interval, duration, rng, tx, generation,
        )));
        self.pending_draw = Some(pending);
        Ok(())
    }

    /// Abort the animation task and drop its pending draw.
    pub fn cancel_draw_animation(&mut self) {
        if let Some(handle) = self.draw_task.take() {
            handle.abort();
            info!("Cancelled draw animation");
        }
        self.pending_draw = None;
    }

    /// Commit the pending draw if `generation` is the current animation.
    pub fn finish_draw(&mut self, generation: u64) -> Option<Notice> {
        if generation != self.draw_generation {
            debug!(generation, current = self.draw_generation, "dropping stale draw finish");
            return None;
        }
        self.draw_task = None;
        let pending = self.pending_draw.take()?;

        match self.draw.commit(pending) {
            Ok(winner) => {
                let notice = Notice::info(format!("Winner: {}", winner.name));
                self.last_winner = Some(winner);
                Some(notice)
            }
            Err(e) => {
                debug!("draw not committed: {}", e);
                None
            }
        }
    }

    pub fn reset_draw(&mut self) -> Notice {
        self.cancel_draw_animation();
        self.draw.reset();
        self.last_winner = None;
        Notice::info("Draw reset: everyone is back in the pool")
    }

    pub fn set_allow_repeat(&mut self, allow_repeat: bool) -> Notice {
        if allow_repeat != self.draw.allow_repeat() {
            self.cancel_draw_animation();
            self.draw.set_allow_repeat(allow_repeat);
        }
        if allow_repeat {
            Notice::info("Repeat winners allowed")
        } else {
            Notice::info("Each participant can win once")
        }
    }

    // -----------------------------------------------------------------------
    // Grouping
    // -----------------------------------------------------------------------

    pub fn set_group_size(&mut self, group_size: usize) -> Option<Notice> {
        if group_size < MIN_GROUP_SIZE {
            return Some(Notice::warning(format!(
                "Group size must be at least {MIN_GROUP_SIZE}"
            )));
        }
        self.group_size = group_size;
        None
    }

    pub fn set_theme(&mut self, theme: &str) -> Notice {
        let theme = theme.trim();
        self.theme = if theme.is_empty() {
            self.config.grouping.theme.clone()
        } else {
            theme.to_string()
        };
        Notice::info(format!("Theme set to {}", self.theme))
    }

    /// Shuffle and partition the roster, then ask the namer for group names
    /// in the background.
    pub fn start_grouping(&mut self) -> Result<(), huddle_core::GroupingError> {
        let pending = self.grouping.begin(
            self.roster.participants(),
            self.group_size,
            &self.theme,
            &mut self.rng,
        )?;
        self.naming_generation += 1;
        let generation = self.naming_generation;

        let namer = Arc::clone(&self.namer);
        let count = pending.group_count();
        let theme = pending.theme().to_string();
        let tx = self.task_tx.clone();

        info!(count, theme = %theme, "requesting group names");
        self.naming_task = Some(tokio::spawn(async move {
            let names = namer.generate_names(count, &theme).await;
            let _ = tx.send(TaskEvent::NamesReady { names, generation }).await;
        }));
        self.pending_grouping = Some(pending);
        Ok(())
    }

    /// Complete the pending grouping if `generation` is the current request.
    pub fn finish_grouping(&mut self, names: Vec<String>, generation: u64) -> Option<Notice> {
        if generation != self.naming_generation {
            debug!(generation, current = self.naming_generation, "dropping stale group names");
            return None;
        }
        self.naming_task = None;
        let pending = self.pending_grouping.take()?;
        let groups = self.grouping.complete(pending, names);
        Some(Notice::info(format!("Created {} groups", groups.len())))
    }

    /// Abort a running naming task and release the grouping engine.
    pub fn cancel_naming_task(&mut self) {
        if let Some(handle) = self.naming_task.take() {
            handle.abort();
            info!("Cancelled group naming task");
        }
        self.pending_grouping = None;
        self.grouping.abandon();
    }

    pub fn export_groups(&self) -> Notice {
        let dir = self.config.export_dir();
        let today = chrono::Local::now().date_naive();
        match write_export(self.grouping.groups(), &dir, today) {
            Ok(path) => Notice::info(format!("Exported to {}", path.display())),
            Err(e) => {
                warn!("Export failed: {}", e);
                Notice::error(format!("Export failed: {e}"))
            }
        }
    }

    /// Abort all background tasks.
    pub fn shutdown(&mut self) {
        self.cancel_draw_animation();
        self.cancel_naming_task();
    }
}

// ---------------------------------------------------------------------------
// Background tasks
// ---------------------------------------------------------------------------

/// Flash random roster names every `interval` until `duration` has elapsed,
/// then report completion.
async fn run_draw_animation(
    names: Vec<String>,
    interval: Duration,
    duration: Duration,
    mut rng: StdRng,
    tx: mpsc::Sender<TaskEvent>,
    generation: u64,
) {
    let started = Instant::now();
    let frames = (duration.as_millis() / interval.as_millis().max(1)).max(1);
    let mut ticker = tokio::time::interval(interval);

    for _ in 0..frames {
        ticker.tick().await;
        if let Some(name) = names.choose(&mut rng) {
            let tick = TaskEvent::DrawTick {
                name: name.clone(),
                generation,
            };
            if tx.send(tick).await.is_err() {
                return;
            }
        }
    }

    tokio::time::sleep_until(started + duration).await;
    let _ = tx.send(TaskEvent::DrawFinished { generation }).await;
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the application event loop.
///
/// Listens on two channels using `tokio::select!`:
/// - `cmd_rx`: user commands from the TUI
/// - `task_rx`: events from the animation and naming tasks
///
/// Exits on `UserCommand::Quit` or when the command channel closes.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut task_rx: mpsc::Receiver<TaskEvent>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");
    send_snapshot(&state, &ui_tx).await;

    // When the task channel closes, stop polling it so select! never spins.
    let mut tasks_open = true;

    loop {
        tokio::select! {
            // --- Background task events ---
            event = task_rx.recv(), if tasks_open => {
                match event {
                    Some(event) => handle_task_event(&mut state, event, &ui_tx).await,
                    None => {
                        info!("Task channel closed");
                        tasks_open = false;
                    }
                }
            }

            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    // Cleanup
    state.shutdown();
    info!("Application event loop exiting");
    Ok(())
}

async fn send_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let snapshot = state.build_snapshot();
    let _ = ui_tx.send(UiUpdate::StateSnapshot(Box::new(snapshot))).await;
}

async fn send_notice(notice: Option<Notice>, ui_tx: &mpsc::Sender<UiUpdate>) {
    if let Some(notice) = notice {
        let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
    }
}

async fn handle_task_event(state: &mut AppState, event: TaskEvent, ui_tx: &mpsc::Sender<UiUpdate>) {
    match event {
        TaskEvent::DrawTick { name, generation } => {
            if generation == state.draw_generation && state.is_drawing() {
                let _ = ui_tx.send(UiUpdate::DrawTick(name)).await;
            }
        }
        TaskEvent::DrawFinished { generation } => {
            let notice = state.finish_draw(generation);
            send_snapshot(state, ui_tx).await;
            send_notice(notice, ui_tx).await;
        }
        TaskEvent::NamesReady { names, generation } => {
            let notice = state.finish_grouping(names, generation);
            send_snapshot(state, ui_tx).await;
            send_notice(notice, ui_tx).await;
        }
    }
}

async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let notice = match cmd {
        UserCommand::AddNames(text) => Some(state.add_names(&text)),
        UserCommand::LoadFile(path) => Some(state.load_file(&path)),
        UserCommand::AddSamples => Some(state.add_samples()),
        UserCommand::RemoveDuplicates => Some(state.remove_duplicates()),
        UserCommand::ClearRoster => Some(state.clear_roster()),
        UserCommand::StartDraw => match state.start_draw() {
            Ok(()) => None,
            Err(DrawError::EmptyRoster) => {
                debug!("draw requested with an empty roster");
                Some(Notice::warning("Add participants before drawing"))
            }
            Err(DrawError::PoolExhausted) => Some(Notice::warning(
                "Everyone has been drawn. Reset to draw again.",
            )),
            Err(e) => Some(Notice::warning(e.to_string())),
        },
        UserCommand::ResetDraw => Some(state.reset_draw()),
        UserCommand::SetAllowRepeat(allow) => Some(state.set_allow_repeat(allow)),
        UserCommand::SetGroupSize(size) => state.set_group_size(size),
        UserCommand::SetTheme(theme) => Some(state.set_theme(&theme)),
        UserCommand::StartGrouping => match state.start_grouping() {
            Ok(()) => Some(Notice::info("Generating group names...")),
            Err(e) => Some(Notice::warning(e.to_string())),
        },
        UserCommand::ExportGroups => Some(state.export_groups()),
        UserCommand::SwitchTab(tab) => {
            state.active_tab = tab;
            info!("Switched to tab: {:?}", tab);
            None
        }
        UserCommand::Quit => None,
    };

    send_snapshot(state, ui_tx).await;
    send_notice(notice, ui_tx).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_core::PlaceholderNamer;
    use huddle_core::protocol::NoticeLevel;

    fn test_state() -> (AppState, mpsc::Receiver<TaskEvent>) {
        let (tx, rx) = mpsc::channel(TASK_CHANNEL_CAPACITY);
        let state = AppState::new(
            Config::default(),
            Arc::new(PlaceholderNamer),
            StdRng::seed_from_u64(7),
            tx,
        );
        (state, rx)
    }

    #[tokio::test]
    async fn new_state_uses_config_defaults() {
        let (state, _rx) = test_state();
        let snap = state.build_snapshot();
        assert!(snap.participants.is_empty());
        assert_eq!(snap.group_size, 4);
        assert_eq!(snap.theme, "Superheroes");
        assert!(!snap.allow_repeat);
        assert!(!snap.drawing);
        assert_eq!(snap.active_tab, None);
        assert!(!snap.small_roster);
    }

    #[tokio::test]
    async fn snapshot_flags_small_roster() {
        let (mut state, _rx) = test_state();
        state.add_names("Alice, Bob");
        assert!(state.build_snapshot().small_roster);
        state.add_names("Carol, Dave, Eve");
        assert!(!state.build_snapshot().small_roster);
    }

    #[tokio::test]
    async fn roster_changes_reach_the_draw_pool() {
        let (mut state, _rx) = test_state();
        let notice = state.add_names("Alice, Bob\nCarol");
        assert_eq!(notice.message, "Added 3 participants");
        assert_eq!(state.draw.pool_size(), 3);

        state.add_names("Alice");
        let snap = state.build_snapshot();
        assert_eq!(snap.duplicate_names, vec!["Alice".to_string()]);

        state.remove_duplicates();
        assert_eq!(state.draw.pool_size(), 3);

        state.clear_roster();
        assert_eq!(state.draw.pool_size(), 0);
    }

    #[tokio::test]
    async fn blank_input_is_a_warning() {
        let (mut state, _rx) = test_state();
        let notice = state.add_names(" , \n ");
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(state.roster.is_empty());
    }

    #[tokio::test]
    async fn draw_on_empty_roster_fails() {
        let (mut state, _rx) = test_state();
        assert_eq!(state.start_draw(), Err(DrawError::EmptyRoster));
        assert!(!state.is_drawing());
    }

    #[tokio::test(start_paused = true)]
    async fn animation_finish_commits_winner() {
        let (mut state, mut rx) = test_state();
        state.add_names("Alice, Bob, Carol");
        state.start_draw().unwrap();
        assert!(state.is_drawing());

        let mut ticks = 0;
        loop {
            match rx.recv().await.unwrap() {
                TaskEvent::DrawTick { .. } => ticks += 1,
                TaskEvent::DrawFinished { generation } => {
                    let notice = state.finish_draw(generation).unwrap();
                    assert!(notice.message.starts_with("Winner: "));
                    break;
                }
                other => panic!("unexpected event {other:?}"),
            }
        }

        assert_eq!(ticks, 2500 / 80);
        assert!(!state.is_drawing());
        assert_eq!(state.draw.history().len(), 1);
        assert_eq!(state.draw.pool_size(), 2);
        assert_eq!(state.last_winner.as_ref(), state.draw.history().front());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_finish_is_ignored() {
        let (mut state, _rx) = test_state();
        state.add_names("Alice, Bob, Carol");
        state.start_draw().unwrap();
        state.start_draw().unwrap();

        // Generation 1 belongs to the first, superseded draw.
        assert_eq!(state.finish_draw(1), None);
        assert!(state.is_drawing());
        assert!(state.draw.history().is_empty());

        assert!(state.finish_draw(2).is_some());
        assert_eq!(state.draw.history().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn roster_change_cancels_running_draw() {
        let (mut state, _rx) = test_state();
        state.add_names("Alice, Bob, Carol");
        state.start_draw().unwrap();
        state.add_names("Dave");

        assert!(!state.is_drawing());
        assert_eq!(state.finish_draw(1), None);
        assert!(state.draw.history().is_empty());
        assert_eq!(state.draw.pool_size(), 4);
    }

    #[tokio::test]
    async fn reset_clears_winner() {
        let (mut state, _rx) = test_state();
        state.add_names("Alice, Bob");
        state.start_draw().unwrap();
        state.finish_draw(1);
        assert!(state.last_winner.is_some());

        state.reset_draw();
        assert!(state.last_winner.is_none());
        assert!(state.draw.history().is_empty());
        assert_eq!(state.draw.pool_size(), 2);
    }

    #[tokio::test]
    async fn group_size_below_minimum_is_rejected() {
        let (mut state, _rx) = test_state();
        assert!(state.set_group_size(1).is_some());
        assert_eq!(state.group_size, 4);
        assert!(state.set_group_size(3).is_none());
        assert_eq!(state.group_size, 3);
    }

    #[tokio::test]
    async fn blank_theme_falls_back_to_configured_theme() {
        let (mut state, _rx) = test_state();
        state.set_theme("  Space  ");
        assert_eq!(state.theme, "Space");
        state.set_theme("   ");
        assert_eq!(state.theme, "Superheroes");
    }

    #[tokio::test]
    async fn grouping_completes_with_placeholder_names() {
        let (mut state, mut rx) = test_state();
        state.add_samples();
        state.start_grouping().unwrap();
        assert!(state.grouping.is_generating());
        assert!(state.start_grouping().is_err());

        match rx.recv().await.unwrap() {
            TaskEvent::NamesReady { names, generation } => {
                let notice = state.finish_grouping(names, generation).unwrap();
                assert_eq!(notice.message, "Created 5 groups");
            }
            other => panic!("unexpected event {other:?}"),
        }

        assert!(!state.grouping.is_generating());
        let names: Vec<&str> = state.grouping.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Team 1", "Team 2", "Team 3", "Team 4", "Team 5"]);
    }

    #[tokio::test]
    async fn cancel_naming_releases_engine() {
        let (mut state, _rx) = test_state();
        state.add_samples();
        state.start_grouping().unwrap();
        state.cancel_naming_task();
        assert!(!state.grouping.is_generating());
        assert_eq!(state.finish_grouping(vec![], 1), None);
        assert!(state.start_grouping().is_ok());
    }

    #[tokio::test]
    async fn export_without_groups_is_an_error_notice() {
        let (state, _rx) = test_state();
        let notice = state.export_groups();
        assert_eq!(notice.level, NoticeLevel::Error);
    }
}
