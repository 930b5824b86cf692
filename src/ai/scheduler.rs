//! Single-token scheduling of computer-player actions.
//!
//! At most one action is live at a time. Scheduling hands out an
//! [`ActionToken`]; a due action is delivered by [`AiScheduler::poll`] and
//! must be acknowledged with [`AiScheduler::complete`] using the same
//! token. Anything requested while an action is executing waits in a
//! queue holding one entry per player; a repeated request for that player
//! replaces its entry instead of stacking.
//!
//! Scheduling a different action before the pending one fires supersedes
//! it: the old token stops being current and any callback still holding
//! it must not touch state. [`AiScheduler::cancel_all`] drops everything
//! on restart.
//!
//! Actions blocked by a modal transition back off and retry. After
//! `max_retries` blocked attempts the action is delivered anyway with
//! `forced` set, so the match cannot stall behind a modal that never
//! finishes closing.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::core::{AiPacing, MatchError, PlayerId, RetryPolicy};

/// Identity of one scheduled action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionToken {
    id: u64,
    generation: u32,
}

/// What a computer player is about to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiIntent {
    Roll,
    Move,
    Throw,
    /// Everyone's roll in a low-roll penalty round.
    PenaltyRoll,
    RevealAnswer,
    DismissQuestion,
}

impl AiIntent {
    /// Pacing delay before the action fires.
    #[must_use]
    pub fn delay(self, pacing: &AiPacing) -> u64 {
        let base = match self {
            AiIntent::Roll | AiIntent::PenaltyRoll => pacing.roll_ms,
            AiIntent::Move => pacing.move_ms,
            AiIntent::Throw => pacing.throw_ms,
            AiIntent::RevealAnswer => pacing.reveal_ms,
            AiIntent::DismissQuestion => pacing.dismiss_ms,
        };
        pacing.scaled(base)
    }

    /// Acts on the question dialog itself rather than the board.
    #[must_use]
    pub const fn drives_modal(self) -> bool {
        matches!(self, AiIntent::RevealAnswer | AiIntent::DismissQuestion)
    }
}

/// Lifecycle of the host's modal dialog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModalState {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

impl ModalState {
    /// Whether `intent` must wait.
    ///
    /// Nothing fires while the dialog animates. While it is open only the
    /// dialog's own buttons may be pressed.
    #[must_use]
    pub const fn blocks(self, intent: AiIntent) -> bool {
        match self {
            ModalState::Closed => false,
            ModalState::Opening | ModalState::Closing => true,
            ModalState::Open => !intent.drives_modal(),
        }
    }
}

/// An action whose time has come.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DueAction {
    pub token: ActionToken,
    pub player: PlayerId,
    pub intent: AiIntent,
    /// Logical time the action fired at.
    pub due_ms: u64,
    /// Delivered despite a blocking modal after exhausting retries.
    pub forced: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct Slot {
    token: ActionToken,
    player: PlayerId,
    intent: AiIntent,
    due_ms: u64,
    attempts: u32,
    executing: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct Queued {
    player: PlayerId,
    intent: AiIntent,
    delay_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiScheduler {
    retry: RetryPolicy,
    next_id: u64,
    generation: u32,
    slot: Option<Slot>,
    queued: SmallVec<[Queued; 4]>,
}

impl AiScheduler {
    #[must_use]
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            retry,
            next_id: 0,
            generation: 0,
            slot: None,
            queued: SmallVec::new(),
        }
    }

    /// Request `intent` for `player`, due at `now_ms + delay_ms`.
    ///
    /// Returns the live token, or `None` when the request was queued
    /// behind an executing action.
    pub fn schedule(&mut self, player: PlayerId, intent: AiIntent, now_ms: u64, delay_ms: u64) -> Option<ActionToken> {
        let current = self.slot;
        match current {
            Some(slot) if slot.executing => {
                let entry = Queued { player, intent, delay_ms };
                match self.queued.iter_mut().find(|q| q.player == player) {
                    Some(existing) => *existing = entry,
                    None => self.queued.push(entry),
                }
                debug!(%player, ?intent, "AI action queued behind executing action");
                None
            }
            Some(slot) if slot.player == player && slot.intent == intent => {
                debug!(%player, ?intent, "AI action already pending");
                Some(slot.token)
            }
            previous => {
                if let Some(old) = previous {
                    debug!(player = %old.player, intent = ?old.intent, "AI action superseded");
                }
                let token = self.issue();
                self.slot = Some(Slot {
                    token,
                    player,
                    intent,
                    due_ms: now_ms.saturating_add(delay_ms),
                    attempts: 0,
                    executing: false,
                });
                debug!(%player, ?intent, due_ms = now_ms.saturating_add(delay_ms), "AI action scheduled");
                Some(token)
            }
        }
    }

    /// Deliver the pending action if it is due and not blocked.
    pub fn poll(&mut self, now_ms: u64, modal: ModalState) -> Option<DueAction> {
        let slot = self.slot?;
        if slot.executing || slot.due_ms > now_ms {
            return None;
        }

        let mut forced = false;
        if modal.blocks(slot.intent) {
            match self.retry(slot.token) {
                Some(_) => return None,
                None => {
                    warn!(
                        error = %MatchError::StalledAsyncCallback { what: "modal transition" },
                        player = %slot.player,
                        intent = ?slot.intent,
                        "forcing AI action"
                    );
                    forced = true;
                }
            }
        }

        let slot = self.slot.as_mut()?;
        slot.executing = true;
        Some(DueAction {
            token: slot.token,
            player: slot.player,
            intent: slot.intent,
            due_ms: slot.due_ms,
            forced,
        })
    }

    /// Push the pending action back by the retry backoff.
    ///
    /// Returns the new due time, or `None` once retries are exhausted (or
    /// the token is stale).
    pub fn retry(&mut self, token: ActionToken) -> Option<u64> {
        let retry = &self.retry;
        let slot = self.slot.as_mut().filter(|s| s.token == token)?;
        slot.attempts += 1;
        if slot.attempts > retry.max_retries {
            return None;
        }
        slot.due_ms = slot.due_ms.saturating_add(retry.backoff(slot.attempts));
        debug!(attempt = slot.attempts, due_ms = slot.due_ms, "AI action blocked by modal, retrying");
        Some(slot.due_ms)
    }

    /// Acknowledge a delivered action and promote the next queued one.
    ///
    /// Stale tokens are ignored and return `false`.
    pub fn complete(&mut self, token: ActionToken, now_ms: u64) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.slot = None;
        if !self.queued.is_empty() {
            let next = self.queued.remove(0);
            self.schedule(next.player, next.intent, now_ms, next.delay_ms);
        }
        true
    }

    /// Drop the pending action and the queue; every issued token goes stale.
    pub fn cancel_all(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.slot = None;
        self.queued.clear();
        debug!(generation = self.generation, "AI actions cancelled");
    }

    #[must_use]
    pub fn is_current(&self, token: ActionToken) -> bool {
        self.slot.is_some_and(|s| s.token == token)
    }

    /// When the host should next call back, if anything is pending.
    #[must_use]
    pub fn next_due(&self) -> Option<u64> {
        self.slot.filter(|s| !s.executing).map(|s| s.due_ms)
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.slot.is_none() && self.queued.is_empty()
    }

    #[must_use]
    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    fn issue(&mut self) -> ActionToken {
        self.next_id += 1;
        ActionToken {
            id: self.next_id,
            generation: self.generation,
        }
    }
}

impl Default for AiScheduler {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}
