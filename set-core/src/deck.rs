use crate::card::Card;
use rand::prelude::*;
use rand_chacha::ChaChaRng;
use std::error::Error;
use std::fmt;

const SEED_LEN: usize = 32;

/// A seed for reproducible deck shuffles, e.g. in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeckSeed([u8; SEED_LEN]);

impl DeckSeed {
    pub fn from_u64(n: u64) -> Self {
        let mut seed = [0u8; SEED_LEN];
        seed[..8].copy_from_slice(&n.to_le_bytes());
        Self(seed)
    }
}

impl Default for DeckSeed {
    fn default() -> Self {
        let mut rng = rand::thread_rng();
        let mut seed = [0u8; SEED_LEN];
        rng.fill(&mut seed);
        Self(seed)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum DeckError {
    OutOfCards,
}

impl Error for DeckError {}

impl fmt::Display for DeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckError::OutOfCards => write!(f, "no more cards in deck"),
        }
    }
}

/// The dealer's deck: cards neither on the table nor awarded this round.
///
/// Owned exclusively by the [`crate::dealer::Dealer`]; drawing pops from
/// the end so the "top" of the deck is the last element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Builds a fresh, shuffled deck of `size` cards numbered `0..size`.
    pub fn new(size: usize) -> Self {
        let mut d = Self::unshuffled(size);
        d.shuffle();
        d
    }

    /// Builds a fresh, shuffled deck using a fixed seed (deterministic).
    pub fn seeded(size: usize, seed: &DeckSeed) -> Self {
        let mut d = Self::unshuffled(size);
        d.seeded_shuffle(seed);
        d
    }

    fn unshuffled(size: usize) -> Self {
        Self {
            cards: (0..size as u32).map(Card).collect(),
        }
    }

    pub fn shuffle(&mut self) {
        self.seeded_shuffle(&DeckSeed::default());
    }

    pub fn seeded_shuffle(&mut self, seed: &DeckSeed) {
        let mut rng = ChaChaRng::from_seed(seed.0);
        // Sort first so shuffling the same seed twice is deterministic
        // regardless of the deck's prior order.
        self.cards.sort_unstable();
        self.cards.shuffle(&mut rng);
    }

    /// Draws the topmost card, or `Err` if the deck is empty.
    pub fn draw(&mut self) -> Result<Card, DeckError> {
        self.cards.pop().ok_or(DeckError::OutOfCards)
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Returns every card currently in the deck, for set-existence checks.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Returns a card to the deck (reshuffle / un-award is not a thing;
    /// this is used only when returning table cards at reshuffle time).
    pub fn recall(&mut self, card: Card) {
        self.cards.push(card);
    }
}
