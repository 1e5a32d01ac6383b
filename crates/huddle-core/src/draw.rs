// Lucky draw engine: remaining pool, winner history, repeat mode.
//
// A draw is split into two phases so the orchestrator can run a suspense
// animation between selecting the winner and recording it:
//
//   begin_draw  -> selects the winner from the pool as it is right now
//   commit      -> records it (history, pool depletion)
//
// Every state change that could make a pending selection stale (another
// begin_draw, reset, roster change, repeat toggle) bumps `epoch`; commit
// refuses a pending draw from an older epoch.

use std::collections::VecDeque;

use rand::Rng;
use tracing::{debug, info};

use crate::participant::Participant;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrawError {
    #[error("no participants to draw from")]
    EmptyRoster,

    #[error("no more participants left in the pool")]
    PoolExhausted,

    #[error("draw was cancelled before it completed")]
    Cancelled,
}

// ---------------------------------------------------------------------------
// PendingDraw
// ---------------------------------------------------------------------------

/// A selected but not yet recorded winner.
///
/// Not `Clone`: a pending draw commits at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct PendingDraw {
    winner: Participant,
    epoch: u64,
    allow_repeat: bool,
}

impl PendingDraw {
    pub fn winner(&self) -> &Participant {
        &self.winner
    }
}

// ---------------------------------------------------------------------------
// DrawEngine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct DrawEngine {
    roster: Vec<Participant>,
    remaining: Vec<Participant>,
    /// Most recent winner first.
    history: VecDeque<Participant>,
    allow_repeat: bool,
    epoch: u64,
}

impl DrawEngine {
    pub fn new(roster: &[Participant], allow_repeat: bool) -> Self {
        DrawEngine {
            roster: roster.to_vec(),
            remaining: roster.to_vec(),
            history: VecDeque::new(),
            allow_repeat,
            epoch: 0,
        }
    }

    pub fn roster(&self) -> &[Participant] {
        &self.roster
    }

    pub fn remaining(&self) -> &[Participant] {
        &self.remaining
    }

    pub fn history(&self) -> &VecDeque<Participant> {
        &self.history
    }

    pub fn allow_repeat(&self) -> bool {
        self.allow_repeat
    }

    /// Number of participants the next draw selects from.
    pub fn pool_size(&self) -> usize {
        self.selection_pool().len()
    }

    fn selection_pool(&self) -> &[Participant] {
        if self.allow_repeat {
            &self.roster
        } else {
            &self.remaining
        }
    }

    /// Switch repeat mode. Invalidates any pending draw.
    pub fn set_allow_repeat(&mut self, allow_repeat: bool) {
        if self.allow_repeat != allow_repeat {
            self.allow_repeat = allow_repeat;
            self.epoch += 1;
            debug!(allow_repeat, "draw repeat mode changed");
        }
    }

    /// Select a winner without recording it.
    pub fn begin_draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<PendingDraw, DrawError> {
        if self.roster.is_empty() {
            return Err(DrawError::EmptyRoster);
        }
        let pool = self.selection_pool();
        if pool.is_empty() {
            return Err(DrawError::PoolExhausted);
        }

        let index = rng.gen_range(0..pool.len());
        let winner = pool[index].clone();

        self.epoch += 1;
        Ok(PendingDraw {
            winner,
            epoch: self.epoch,
            allow_repeat: self.allow_repeat,
        })
    }

    /// Record a pending draw: prepend to history and, in no-repeat mode,
    /// remove the winner from the remaining pool.
    pub fn commit(&mut self, pending: PendingDraw) -> Result<Participant, DrawError> {
        if pending.epoch != self.epoch {
            debug!(
                pending_epoch = pending.epoch,
                epoch = self.epoch,
                "discarding stale draw"
            );
            return Err(DrawError::Cancelled);
        }

        let winner = pending.winner;
        if !pending.allow_repeat {
            self.remaining.retain(|p| p.id != winner.id);
        }
        self.history.push_front(winner.clone());

        info!(
            "Winner #{}: {} ({} left in pool)",
            self.history.len(),
            winner.name,
            self.pool_size()
        );
        Ok(winner)
    }

    /// Select and record a winner in one step.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Participant, DrawError> {
        let pending = self.begin_draw(rng)?;
        self.commit(pending)
    }

    /// Restore the pool to the full roster and clear the history.
    pub fn reset(&mut self) {
        self.remaining = self.roster.clone();
        self.history.clear();
        self.epoch += 1;
    }

    /// Replace the roster. The pool resets to the new roster; history is kept.
    pub fn set_roster(&mut self, roster: &[Participant]) {
        self.roster = roster.to_vec();
        self.remaining = roster.to_vec();
        self.epoch += 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
