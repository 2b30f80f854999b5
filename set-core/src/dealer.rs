use crate::claim::ClaimQueue;
use crate::config::TimerMode;
use crate::deck::{Deck, DeckSeed};
use crate::display::DisplaySink;
use crate::freeze::FreezeState;
use crate::participant::{AiMode, Participant};
use crate::set_testing::{self, SetTester};
use crate::table::Table;
use crate::{Card, GameConfig, GameError, ParticipantId, Slot};
use parking_lot::{FairMutex, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_millis(10);

/// The round coordinator: the single thread that owns the deck, drives the
/// timer, adjudicates claims, and reshuffles. Owns every participant
/// handle so that termination has a single, unambiguous place to start
/// from — the redesign spec.md's design notes call for in place of the
/// original's cyclic dealer/participant references.
pub struct Dealer {
    config: GameConfig,
    table: Arc<FairMutex<Table>>,
    participants: Vec<Arc<Participant>>,
    claims: Arc<ClaimQueue>,
    tester: Arc<dyn SetTester>,
    display: Arc<dyn DisplaySink>,
    deck: Mutex<Deck>,
    round_start: Mutex<Instant>,
    terminate: AtomicBool,
    warned_this_round: AtomicBool,
    participant_handles: Mutex<Vec<Option<JoinHandle<()>>>>,
    dealer_handle: Mutex<Option<JoinHandle<()>>>,
    shutdown_started: Mutex<bool>,
}

impl Dealer {
    pub fn new(
        config: GameConfig,
        tester: Arc<dyn SetTester>,
        display: Arc<dyn DisplaySink>,
    ) -> Arc<Self> {
        Self::build(config, Deck::new(config.deck_size), tester, display)
    }

    /// Builds a dealer whose deck is seeded rather than randomly shuffled,
    /// for reproducible tests.
    pub fn new_seeded(
        config: GameConfig,
        seed: &DeckSeed,
        tester: Arc<dyn SetTester>,
        display: Arc<dyn DisplaySink>,
    ) -> Arc<Self> {
        Self::build(config, Deck::seeded(config.deck_size, seed), tester, display)
    }

    fn build(
        config: GameConfig,
        deck: Deck,
        tester: Arc<dyn SetTester>,
        display: Arc<dyn DisplaySink>,
    ) -> Arc<Self> {
        let table = Arc::new(FairMutex::new(Table::new(
            config.table_size,
            config.players,
            config.set_size,
            Duration::from_millis(config.table_delay_millis),
            display.clone(),
        )));
        let participants = (0..config.players)
            .map(|id| Arc::new(Participant::new(id, id < config.human_count, config.set_size)))
            .collect();
        Arc::new(Self {
            deck: Mutex::new(deck),
            config,
            table,
            participants,
            claims: Arc::new(ClaimQueue::new()),
            tester,
            display,
            round_start: Mutex::new(Instant::now()),
            terminate: AtomicBool::new(false),
            warned_this_round: AtomicBool::new(false),
            participant_handles: Mutex::new(Vec::new()),
            dealer_handle: Mutex::new(None),
            shutdown_started: Mutex::new(false),
        })
    }

    /// Spawns one thread per participant (plus its synthetic-input worker,
    /// for non-human participants) and the dealer's own round-control
    /// thread.
    pub fn start(self: &Arc<Self>) {
        let mut handles = Vec::with_capacity(self.participants.len());
        for participant in &self.participants {
            let participant = participant.clone();
            let table = self.table.clone();
            let claims = self.claims.clone();
            let tester = self.tester.clone();
            let display = self.display.clone();
            let ai_mode = if participant.is_human {
                None
            } else if self.config.hints {
                Some(AiMode::Hint)
            } else {
                Some(AiMode::Random)
            };
            let handle = thread::Builder::new()
                .name(format!("participant-{}", participant.id))
                .spawn(move || participant.run(table, claims, tester, display, TICK, ai_mode))
                .expect("spawn participant thread");
            handles.push(Some(handle));
        }
        *self.participant_handles.lock() = handles;

        let dealer = self.clone();
        let dealer_handle = thread::Builder::new()
            .name("dealer".into())
            .spawn(move || dealer.run())
            .expect("spawn dealer thread");
        *self.dealer_handle.lock() = Some(dealer_handle);
    }

    pub fn on_key(&self, id: ParticipantId, slot: Slot) -> Result<(), GameError> {
        let participant = self
            .participants
            .get(id)
            .ok_or(GameError::UnknownParticipant(id))?;
        participant.on_key(slot, &self.table);
        Ok(())
    }

    pub fn participant_score(&self, id: ParticipantId) -> Option<u32> {
        self.participants.get(id).map(|p| p.score())
    }

    /// Sets the terminate flag, suspends and joins every participant
    /// (highest id first), announces winners, then joins the dealer's own
    /// round-control thread. Idempotent, and safe to call more than once
    /// or from a game that has already finished by exhaustion.
    pub fn terminate(&self) {
        self.ensure_shutdown();
        if let Some(handle) = self.dealer_handle.lock().take() {
            let _ = handle.join();
        }
    }

    fn ensure_shutdown(&self) {
        let mut started = self.shutdown_started.lock();
        if *started {
            return;
        }
        *started = true;
        self.terminate.store(true, Ordering::Release);
        {
            let _table = self.table.lock();
            for participant in &self.participants {
                participant.request_terminate();
            }
        }
        let mut handles = self.participant_handles.lock();
        for slot in handles.iter_mut().rev() {
            if let Some(handle) = slot.take() {
                let _ = handle.join();
            }
        }
        drop(handles);
        self.announce_winners();
        self.display.dispose();
    }

    fn run(self: Arc<Self>) {
        log::info!("dealer starting, {} participants", self.participants.len());
        while !self.should_finish() {
            self.place_cards_on_table();
            if self.config.hints {
                self.print_hint();
            }
            *self.round_start.lock() = Instant::now();
            self.warned_this_round.store(false, Ordering::Release);
            self.wake_all_participants();
            self.timer_loop();
            if self.should_finish() {
                break;
            }
            self.reshuffle();
        }
        self.ensure_shutdown();
        log::info!("dealer finished");
    }

    fn place_cards_on_table(&self) {
        let mut deck = self.deck.lock();
        let mut table = self.table.lock();
        for slot in 0..table.table_size() {
            if table.get_card(slot).is_some() {
                continue;
            }
            match deck.draw() {
                Ok(card) => table.place_card(card, slot),
                Err(_) => break,
            }
        }
    }

    fn print_hint(&self) {
        let table = self.table.lock();
        let hint = table.hints_for_ai(self.tester.as_ref());
        if !hint.is_empty() {
            log::info!("hint: a legal set is at slots {hint:?}");
        }
    }

    fn wake_all_participants(&self) {
        for p in &self.participants {
            p.set_freeze(FreezeState::Active);
        }
    }

    /// One call per tick: sleep, drain and adjudicate claims under the
    /// table mutex, refresh the table in elapsed/no-timer modes if it
    /// has gone setless, then publish the timer and check exit
    /// conditions. Exits on termination, on the countdown deadline, or
    /// once the game itself should finish.
    fn timer_loop(&self) {
        loop {
            thread::sleep(TICK);
            {
                let mut table = self.table.lock();
                for id in self.claims.drain() {
                    self.adjudicate(id, &mut table);
                }
                if matches!(self.config.timer_mode(), TimerMode::Elapsed | TimerMode::NoDisplay)
                    && !table.check_for_sets(self.tester.as_ref())
                    && !self.should_finish_locked(&table)
                {
                    self.refresh_table_locked(&mut table);
                }
            }
            self.publish_timer();
            if self.terminate.load(Ordering::Acquire) || self.should_finish() {
                return;
            }
            if self.config.timer_mode() == TimerMode::Countdown && self.remaining_millis() <= 0 {
                return;
            }
        }
    }

    /// Claim adjudication (table mutex already held by the caller).
    fn adjudicate(&self, id: ParticipantId, table: &mut Table) {
        let participant = self.participants[id].clone();
        let tokens = table.get_player_tokens(id);
        if tokens.len() < self.config.set_size {
            log::debug!("participant {id}: claim stale, tokens fell below set size");
            participant.set_freeze(FreezeState::Active);
            return;
        }
        for &slot in &tokens {
            if table.get_card(slot).is_none() {
                log::debug!("participant {id}: claim invalid, a tokened slot emptied");
                self.penalize(&participant);
                return;
            }
        }
        let cards: Vec<Card> = tokens.iter().map(|&s| table.get_card(s).unwrap()).collect();
        if !self.tester.test_set(&cards) {
            log::debug!("participant {id}: claim invalid, not a legal set");
            self.penalize(&participant);
            return;
        }

        table.remove_player_tokens(id);
        for &slot in &tokens {
            let collided: Vec<ParticipantId> = (0..self.participants.len())
                .filter(|&other| other != id && table.get_player_tokens(other).contains(&slot))
                .collect();
            table.remove_card(slot);
            self.refill_slot(table, slot);
            for other in collided {
                if self.claims.remove(other) {
                    log::debug!(
                        "participant {other}: claim invalidated by {id}'s award, woken to retry"
                    );
                    self.participants[other].set_freeze(FreezeState::Active);
                }
            }
        }
        log::info!("participant {id}: awarded a point");
        self.award_point(&participant);
    }

    fn refill_slot(&self, table: &mut Table, slot: Slot) {
        if let Ok(card) = self.deck.lock().draw() {
            table.place_card(card, slot);
        }
    }

    fn award_point(&self, participant: &Participant) {
        participant.add_point();
        self.display.set_score(participant.id, participant.score());
        participant.set_freeze(FreezeState::until(self.config.point_freeze_millis));
    }

    fn penalize(&self, participant: &Participant) {
        participant.set_freeze(FreezeState::until(self.config.penalty_freeze_millis));
    }

    /// Removes every card on the table back to the deck, reshuffles, and
    /// re-deals. In elapsed/no-timer modes repeats until the table holds
    /// a legal set or the game is ending; countdown mode always does
    /// exactly one pass. Participants are suspended for the duration.
    fn reshuffle(&self) {
        self.publish_timer_reset();
        let mut table = self.table.lock();
        for p in &self.participants {
            p.set_freeze(FreezeState::FrozenUntilWoken);
        }
        loop {
            self.refresh_table_locked(&mut table);
            let elapsed_mode = matches!(
                self.config.timer_mode(),
                TimerMode::Elapsed | TimerMode::NoDisplay
            );
            if !elapsed_mode
                || table.check_for_sets(self.tester.as_ref())
                || self.should_finish_locked(&table)
            {
                break;
            }
        }
        for p in &self.participants {
            p.set_freeze(FreezeState::Active);
        }
    }

    /// Clears the table back to the deck and re-deals, once. Shared by
    /// the timer loop's in-round refresh and the between-rounds
    /// reshuffle. Table mutex already held by the caller.
    fn refresh_table_locked(&self, table: &mut Table) {
        table.reset_all_tokens();
        let mut deck = self.deck.lock();
        for slot in table.used_slots() {
            if let Some(card) = table.remove_card(slot) {
                deck.recall(card);
            }
        }
        deck.shuffle();
        for slot in 0..table.table_size() {
            if table.get_card(slot).is_some() {
                continue;
            }
            match deck.draw() {
                Ok(card) => table.place_card(card, slot),
                Err(_) => break,
            }
        }
    }

    fn publish_timer_reset(&self) {
        match self.config.timer_mode() {
            TimerMode::NoDisplay => {}
            TimerMode::Elapsed => self.display.set_elapsed(0),
            TimerMode::Countdown => {
                self.display
                    .set_countdown(self.config.turn_timeout_millis, false);
            }
        }
    }

    fn publish_timer(&self) {
        match self.config.timer_mode() {
            TimerMode::NoDisplay => {}
            TimerMode::Elapsed => {
                let elapsed = self.round_start.lock().elapsed().as_millis() as u64;
                self.display.set_elapsed(elapsed);
            }
            TimerMode::Countdown => {
                let remaining = self.remaining_millis().max(0);
                let crossed = remaining as u64 <= self.config.turn_timeout_warning_millis;
                let warn = crossed && !self.warned_this_round.swap(crossed, Ordering::AcqRel);
                self.display.set_countdown(remaining, warn);
            }
        }
    }

    fn remaining_millis(&self) -> i64 {
        let elapsed = self.round_start.lock().elapsed().as_millis() as i64;
        self.config.turn_timeout_millis - elapsed
    }

    fn should_finish(&self) -> bool {
        if self.terminate.load(Ordering::Acquire) {
            return true;
        }
        let table = self.table.lock();
        self.should_finish_locked(&table)
    }

    /// Same check, for a caller that already holds the table mutex.
    fn should_finish_locked(&self, table: &Table) -> bool {
        if self.terminate.load(Ordering::Acquire) {
            return true;
        }
        let deck_has_set = {
            let deck = self.deck.lock();
            set_testing::any_set_exists(self.tester.as_ref(), deck.cards())
        };
        !deck_has_set && !table.check_for_sets(self.tester.as_ref())
    }

    fn announce_winners(&self) {
        let max = self.participants.iter().map(|p| p.score()).max().unwrap_or(0);
        let winners: Vec<ParticipantId> = self
            .participants
            .iter()
            .filter(|p| p.score() == max)
            .map(|p| p.id)
            .collect();
        self.display.announce_winners(&winners);
    }
}
