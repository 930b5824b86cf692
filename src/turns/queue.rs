//! Turn order within a movement phase.
//!
//! The chaser always sits at index 0 and moves first. Evaders follow in a
//! base order (fixed by the opening roll) rotated by a counter that goes up
//! once per movement phase, so a different evader leads each round.
//!
//! Finishing an evader's turn rotates index 1 to the back. The entries
//! never disappear; instead the queue counts how many turns are still
//! pending and reports itself exhausted once the chaser and every evader
//! have had theirs.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::core::{MatchError, PlayerId, Roster};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnQueue {
    entries: SmallVec<[PlayerId; 4]>,
    chaser_pending: bool,
    evaders_pending: usize,
}

impl TurnQueue {
    /// Queue for one movement phase.
    ///
    /// `evader_order` is the base order; ids that are not seated evaders
    /// are dropped with a warning and seated evaders missing from it are
    /// appended in roster order.
    pub fn build(roster: &Roster, evader_order: &[PlayerId], rotation: usize) -> Result<Self, MatchError> {
        let chaser = roster.require(roster.chaser())?.id;

        let mut evaders: SmallVec<[PlayerId; 4]> = SmallVec::new();
        for &id in evader_order {
            let seated = roster.role(id).is_some_and(|r| r.is_evader());
            if !seated {
                warn!(error = %MatchError::InvalidQueueState { player: id }, "dropping order entry");
                continue;
            }
            if !evaders.contains(&id) {
                evaders.push(id);
            }
        }
        for player in roster.evaders() {
            if !evaders.contains(&player.id) {
                evaders.push(player.id);
            }
        }
        if !evaders.is_empty() {
            let shift = rotation % evaders.len();
            evaders.rotate_left(shift);
        }

        let mut entries = SmallVec::with_capacity(evaders.len() + 1);
        entries.push(chaser);
        entries.extend(evaders);

        let queue = Self {
            evaders_pending: entries.len() - 1,
            chaser_pending: true,
            entries,
        };
        debug!(order = ?queue.entries, rotation, "turn queue built");
        Ok(queue)
    }

    /// Whose turn it is, or `None` once everyone has moved.
    #[must_use]
    pub fn current(&self) -> Option<PlayerId> {
        if self.chaser_pending {
            self.entries.first().copied()
        } else if self.evaders_pending > 0 {
            self.entries.get(1).copied()
        } else {
            None
        }
    }

    #[must_use]
    pub fn chaser(&self) -> Option<PlayerId> {
        self.entries.first().copied()
    }

    #[must_use]
    pub fn entries(&self) -> &[PlayerId] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn is_chaser_turn(&self) -> bool {
        self.chaser_pending
    }

    pub fn finish_chaser_turn(&mut self) {
        self.chaser_pending = false;
    }

    /// Rotate the leading evader to the back and count its turn as done.
    pub fn advance(&mut self) {
        if self.entries.len() > 1 {
            self.entries[1..].rotate_left(1);
        }
        self.evaders_pending = self.evaders_pending.saturating_sub(1);
    }

    /// Finish whichever turn is current.
    pub fn finish_current(&mut self) {
        if self.chaser_pending {
            self.finish_chaser_turn();
        } else {
            self.advance();
        }
    }

    /// Next player able to move.
    ///
    /// The chaser is always eligible. Trapped evaders lose their turn and
    /// rotate to the back. `None` means nobody pending can move.
    pub fn skip_if_trapped(&mut self, mut is_trapped: impl FnMut(PlayerId) -> bool) -> Option<PlayerId> {
        if self.chaser_pending {
            return self.chaser();
        }
        while let Some(next) = self.current() {
            if !is_trapped(next) {
                return Some(next);
            }
            debug!(player = %next, "evader trapped, turn skipped");
            self.advance();
        }
        None
    }

    /// Drop entries that no longer resolve to a seated player.
    ///
    /// Returns the dropped ids. Each one is logged as an invalid queue
    /// state; the turn loop carries on with what is left.
    pub fn normalize(&mut self, roster: &Roster) -> SmallVec<[PlayerId; 4]> {
        let mut dropped = SmallVec::new();
        let mut kept: SmallVec<[PlayerId; 4]> = SmallVec::new();
        for &id in &self.entries {
            if !roster.contains(id) || kept.contains(&id) {
                warn!(error = %MatchError::InvalidQueueState { player: id }, "dropping queue entry");
                dropped.push(id);
            } else {
                kept.push(id);
            }
        }

        let chaser = roster.chaser();
        if let Some(pos) = kept.iter().position(|&id| id == chaser) {
            if pos != 0 {
                let id = kept.remove(pos);
                kept.insert(0, id);
            }
        }

        self.entries = kept;
        self.evaders_pending = self.evaders_pending.min(self.entries.len().saturating_sub(1));
        dropped
    }

    /// Every queued player has had their turn.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        !self.chaser_pending && self.evaders_pending == 0
    }

    #[cfg(test)]
    pub(crate) fn push_raw(&mut self, id: PlayerId) {
        self.entries.push(id);
        self.evaders_pending += 1;
    }
}
