use crate::claim::ClaimQueue;
use crate::display::DisplaySink;
use crate::freeze::{FreezeCell, FreezeState};
use crate::set_testing::SetTester;
use crate::table::Table;
use crate::{ParticipantId, Slot};
use parking_lot::{FairMutex, Mutex};
use rand::seq::SliceRandom;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Duration;

/// The synthetic-input worker's press strategy, set at configuration
/// time (`hints` in [`crate::GameConfig`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiMode {
    /// Starting from zero tokens: press a randomly chosen legal triplet.
    /// Any nonzero count otherwise (a full set ready to submit, or a
    /// partial leftover from a collision) is cleared by re-pressing
    /// instead.
    Hint,
    /// Press one uniformly random used slot.
    Random,
}

/// Per-participant state: everything a participant's own threads touch,
/// plus what the dealer needs to score, freeze, and terminate it. Holds
/// no reference back to the dealer — only the shared claim queue and a
/// handle to the table mutex are threaded through at spawn time (spec's
/// redesign away from cyclic dealer/participant ownership).
pub struct Participant {
    pub id: ParticipantId,
    pub is_human: bool,
    set_size: usize,
    score: AtomicU32,
    freeze: FreezeCell,
    terminate: AtomicBool,
    pending_tx: SyncSender<Slot>,
    pending_rx: Mutex<Receiver<Slot>>,
    ai_thread: Mutex<Option<ThreadId>>,
}

impl Participant {
    pub fn new(id: ParticipantId, is_human: bool, set_size: usize) -> Self {
        let (pending_tx, pending_rx) = mpsc::sync_channel(set_size);
        Self {
            id,
            is_human,
            set_size,
            score: AtomicU32::new(0),
            freeze: FreezeCell::new(),
            terminate: AtomicBool::new(false),
            pending_tx,
            pending_rx: Mutex::new(pending_rx),
            ai_thread: Mutex::new(None),
        }
    }

    pub fn score(&self) -> u32 {
        self.score.load(Ordering::Acquire)
    }

    pub fn freeze_state(&self) -> FreezeState {
        self.freeze.get()
    }

    pub fn request_terminate(&self) {
        self.terminate.store(true, Ordering::Release);
        // Wake a participant blocked on a long freeze so it notices.
        self.freeze.set(self.freeze.get());
    }

    pub fn should_terminate(&self) -> bool {
        self.terminate.load(Ordering::Acquire)
    }

    /// `point`/`penalty` freeze impositions, always dealer-driven.
    pub fn set_freeze(&self, state: FreezeState) {
        self.freeze.set(state);
    }

    pub fn add_point(&self) {
        self.score.fetch_add(1, Ordering::AcqRel);
    }

    fn mark_current_thread_as_ai(&self) {
        *self.ai_thread.lock() = Some(thread::current().id());
    }

    fn calling_thread_is_ai(&self) -> bool {
        *self.ai_thread.lock() == Some(thread::current().id())
    }

    /// Key-event ingress. Callable from any thread. Ignored if the
    /// participant is non-human and the caller isn't its own
    /// synthetic-input worker, if frozen, or (via backpressure) if
    /// `pendingKeys` is already full.
    pub fn on_key(&self, slot: Slot, table: &FairMutex<Table>) {
        if !self.is_human && !self.calling_thread_is_ai() {
            return;
        }
        if self.freeze.get().is_frozen() {
            return;
        }
        let (count, already_tokened) = {
            let t = table.lock();
            let tokens = t.get_player_tokens(self.id);
            (tokens.len(), tokens.contains(&slot))
        };
        let admit = count < self.set_size || already_tokened;
        if !admit {
            return;
        }
        match self.pending_tx.try_send(slot) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(_)) => {
                log::debug!("participant {}: pending key queue full, dropping", self.id);
            }
        }
    }

    fn drain_pending(&self) -> Vec<Slot> {
        let rx = self.pending_rx.lock();
        let mut out = Vec::new();
        while let Ok(slot) = rx.try_recv() {
            out.push(slot);
        }
        out
    }

    /// Drains pending keys under the table mutex, toggling tokens; if any
    /// toggle reached `set_size`, submits a claim and self-transitions to
    /// `FrozenUntilWoken`.
    fn run_placement_worker(&self, table: &FairMutex<Table>, claims: &ClaimQueue) {
        let pending = self.drain_pending();
        if pending.is_empty() {
            return;
        }
        let mut set_laid = false;
        {
            let mut t = table.lock();
            for slot in pending {
                if t.get_card(slot).is_none() {
                    continue; // stale: card removed while the key sat queued
                }
                if t.place_token(self.id, slot) {
                    set_laid = true;
                }
            }
        }
        if set_laid {
            log::debug!("participant {} laid a set, submitting claim", self.id);
            claims.submit(self.id, &self.freeze);
        }
    }

    fn run_ai_worker(
        self: &Arc<Self>,
        table: &FairMutex<Table>,
        tester: &dyn SetTester,
        mode: AiMode,
        tick: Duration,
    ) {
        self.mark_current_thread_as_ai();
        while !self.should_terminate() {
            if self.freeze.get().is_frozen() {
                thread::sleep(tick);
                continue;
            }
            match mode {
                AiMode::Hint => {
                    let tokens = table.lock().get_player_tokens(self.id);
                    if tokens.is_empty() {
                        let hint = table.lock().hints_for_ai(tester);
                        for slot in hint {
                            self.on_key(slot, table);
                        }
                    } else {
                        // Full set ready to submit, or a leftover partial
                        // token from a collision (the dealer strips a
                        // losing participant's token off an awarded slot
                        // without resetting it to zero). Either way,
                        // re-pressing clears it; only ever fetch a fresh
                        // triplet from zero, so a leftover token and a
                        // freshly chosen one can never land in the same
                        // placement batch.
                        for slot in tokens {
                            self.on_key(slot, table);
                        }
                    }
                }
                AiMode::Random => {
                    let used = table.lock().used_slots();
                    if let Some(&slot) = used.choose(&mut rand::thread_rng()) {
                        self.on_key(slot, table);
                    }
                }
            }
            thread::sleep(tick);
        }
    }

    /// The participant's main loop. Spawns the synthetic-input worker
    /// (non-human only) and joins it on exit.
    pub fn run(
        self: Arc<Self>,
        table: Arc<FairMutex<Table>>,
        claims: Arc<ClaimQueue>,
        tester: Arc<dyn SetTester>,
        display: Arc<dyn DisplaySink>,
        tick: Duration,
        ai_mode: Option<AiMode>,
    ) {
        let ai_handle = ai_mode.map(|mode| {
            let participant = self.clone();
            let table = table.clone();
            let tester = tester.clone();
            thread::Builder::new()
                .name(format!("participant-{}-ai", self.id))
                .spawn(move || participant.run_ai_worker(&table, tester.as_ref(), mode, tick))
                .expect("spawn synthetic-input worker")
        });

        while !self.should_terminate() {
            match self.freeze.get() {
                FreezeState::Active => {
                    self.run_placement_worker(&table, &claims);
                    thread::sleep(tick);
                }
                frozen => {
                    display.set_freeze(self.id, frozen.remaining_millis());
                    self.freeze.wait_tick(tick);
                }
            }
        }

        if let Some(handle) = ai_handle {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::ClaimQueue;
    use crate::display::{NullDisplay, RecordingDisplay};
    use crate::Card;

    fn table(participants: usize, set_size: usize) -> FairMutex<Table> {
        FairMutex::new(Table::new(
            6,
            participants,
            set_size,
            Duration::ZERO,
            Arc::new(NullDisplay),
        ))
    }

    #[test]
    fn on_key_is_dropped_while_frozen() {
        let p = Participant::new(0, true, 3);
        let t = table(1, 3);
        t.lock().place_card(Card(0), 0);
        p.set_freeze(FreezeState::FrozenUntilWoken);
        p.on_key(0, &t);
        assert!(p.drain_pending().is_empty());
    }

    #[test]
    fn on_key_admits_repress_past_set_size() {
        let p = Participant::new(0, true, 2);
        let t = table(1, 2);
        {
            let mut guard = t.lock();
            guard.place_card(Card(0), 0);
            guard.place_card(Card(1), 1);
            guard.place_token(0, 0);
            guard.place_token(0, 1);
        }
        p.on_key(0, &t);
        assert_eq!(p.drain_pending(), vec![0]);
    }

    #[test]
    fn on_key_rejects_from_non_ai_thread_for_ai_participant() {
        let p = Participant::new(0, false, 3);
        let t = table(1, 3);
        t.lock().place_card(Card(0), 0);
        p.on_key(0, &t);
        assert!(p.drain_pending().is_empty());
    }

    #[test]
    fn placement_worker_skips_stale_slots_and_submits_on_set_laid() {
        let p = Arc::new(Participant::new(0, true, 1));
        let t = table(1, 1);
        t.lock().place_card(Card(0), 0);
        p.on_key(0, &t);
        let claims = ClaimQueue::new();
        p.run_placement_worker(&t, &claims);
        assert_eq!(p.freeze_state(), FreezeState::FrozenUntilWoken);
        assert_eq!(claims.drain().into_iter().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn run_exits_promptly_after_request_terminate() {
        let p = Arc::new(Participant::new(0, true, 3));
        let t = Arc::new(table(1, 3));
        let claims = Arc::new(ClaimQueue::new());
        let tester = Arc::new(crate::set_testing::testing::ModThreeSetTester);
        let display = Arc::new(RecordingDisplay::new());
        let p2 = p.clone();
        let handle = thread::spawn(move || {
            p2.run(t, claims, tester, display, Duration::from_millis(5), None)
        });
        thread::sleep(Duration::from_millis(20));
        p.request_terminate();
        handle.join().unwrap();
    }

    #[test]
    fn hint_worker_clears_a_leftover_partial_token_before_rehinting() {
        let p = Arc::new(Participant::new(0, false, 3));
        let t = Arc::new(table(1, 3));
        {
            let mut guard = t.lock();
            for i in 0..6u32 {
                guard.place_card(Card(i), i as usize);
            }
            // Simulates the collision side effect: the dealer stripped one
            // of this participant's tokens off an awarded slot without
            // resetting the rest, leaving a partial (non-zero,
            // non-set_size) count.
            guard.place_token(0, 0);
        }
        let claims = Arc::new(ClaimQueue::new());
        let tester = Arc::new(crate::set_testing::testing::ModThreeSetTester);
        let display = Arc::new(RecordingDisplay::new());
        let p2 = p.clone();
        let t2 = t.clone();
        let handle = thread::spawn(move || {
            p2.run(t2, claims, tester, display, Duration::from_millis(5), Some(AiMode::Hint))
        });
        thread::sleep(Duration::from_millis(60));
        p.request_terminate();
        handle
            .join()
            .expect("a leftover partial token must never panic the placement worker");
    }
}
