use crate::dealer::Dealer;
use crate::deck::DeckSeed;
use crate::display::DisplaySink;
use crate::set_testing::SetTester;
use crate::{GameConfig, GameError, ParticipantId, Slot};
use std::sync::Arc;

/// The crate's single public entry point: wires a dealer, its table and
/// participants, and the two externally-supplied collaborators (the
/// set-testing utility and the display sink) into one running game.
///
/// `Game` itself holds no game state — it is a thin facade over
/// [`Dealer`], which is the actual owner of the table, the claim queue,
/// and every participant handle.
pub struct Game {
    dealer: Arc<Dealer>,
}

impl Game {
    pub fn new(config: GameConfig, tester: Arc<dyn SetTester>, display: Arc<dyn DisplaySink>) -> Self {
        Self {
            dealer: Dealer::new(config, tester, display),
        }
    }

    /// As [`Game::new`], but with a reproducible deck shuffle. Intended
    /// for tests.
    pub fn new_seeded(
        config: GameConfig,
        seed: &DeckSeed,
        tester: Arc<dyn SetTester>,
        display: Arc<dyn DisplaySink>,
    ) -> Self {
        Self {
            dealer: Dealer::new_seeded(config, seed, tester, display),
        }
    }

    /// Spawns the dealer and every participant thread. Returns
    /// immediately; the game runs in the background until it either
    /// exhausts its legal sets or [`Game::terminate`] is called.
    pub fn start(&self) {
        self.dealer.start();
    }

    /// Key ingress for a human participant. Safe to call from any
    /// thread; silently ignored if `id` isn't human, is frozen, or the
    /// participant's pending-key queue is full.
    pub fn on_key(&self, id: ParticipantId, slot: Slot) -> Result<(), GameError> {
        self.dealer.on_key(id, slot)
    }

    pub fn score(&self, id: ParticipantId) -> Option<u32> {
        self.dealer.participant_score(id)
    }

    /// Requests termination and blocks until every participant thread
    /// and the dealer's own thread have exited and winners have been
    /// announced to the display.
    pub fn terminate(&self) {
        self.dealer.terminate();
    }
}
