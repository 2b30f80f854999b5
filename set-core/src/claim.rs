use crate::freeze::{FreezeCell, FreezeState};
use crate::ParticipantId;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// The dealer's claim queue plus the lock that makes "enqueue a claim"
/// and "transition the claimant to `FrozenUntilWoken`" atomic with
/// respect to the dealer draining the queue. This is spec.md §5's
/// "dealer coordination lock".
///
/// Acquisition order is fixed crate-wide: the table mutex, if held, is
/// always acquired before this lock — except claim submission itself,
/// which never holds the table mutex (the placement worker releases it
/// first; see [`crate::participant::Participant`]).
#[derive(Debug, Default)]
pub struct ClaimQueue {
    pending: Mutex<VecDeque<ParticipantId>>,
}

impl ClaimQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues `id` and marks it `FrozenUntilWoken`, atomically.
    pub fn submit(&self, id: ParticipantId, freeze: &FreezeCell) {
        let mut pending = self.pending.lock();
        pending.push_back(id);
        freeze.set(FreezeState::FrozenUntilWoken);
    }

    /// Drains every pending claim in FIFO order.
    pub fn drain(&self) -> VecDeque<ParticipantId> {
        std::mem::take(&mut *self.pending.lock())
    }

    /// Removes `id` if present (used when a claim is invalidated by a
    /// concurrent award before the dealer reaches it in FIFO order).
    pub fn remove(&self, id: ParticipantId) -> bool {
        let mut pending = self.pending.lock();
        if let Some(pos) = pending.iter().position(|&p| p == id) {
            pending.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
