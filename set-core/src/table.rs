use crate::display::DisplaySink;
use crate::set_testing::{self, SetTester};
use crate::{Card, ParticipantId, Slot};
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// The shared grid state: slot<->card bijection, per-participant token
/// sets, and the pure queries over them.
///
/// A `Table` does **not** acquire any lock itself — every mutation method
/// here assumes the caller already holds the table mutex (a
/// `parking_lot::FairMutex<Table>` in [`crate::game::Game`]) so that
/// composite operations (drain pending keys, then toggle several tokens)
/// can be linearized as one atomic block. Violating the invariants this
/// type maintains is a coordination bug, not recoverable application
/// state, so violations `panic!` rather than return an error (spec's
/// "fatal; abort the process" taxonomy).
pub struct Table {
    slot_to_card: Vec<Option<Card>>,
    card_to_slot: HashMap<Card, Slot>,
    used_slots: Vec<Slot>,
    tokens: Vec<Vec<Slot>>,
    set_size: usize,
    table_delay: Duration,
    display: Arc<dyn DisplaySink>,
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("slot_to_card", &self.slot_to_card)
            .field("card_to_slot", &self.card_to_slot)
            .field("used_slots", &self.used_slots)
            .field("tokens", &self.tokens)
            .field("set_size", &self.set_size)
            .field("table_delay", &self.table_delay)
            .field("display", &"<dyn DisplaySink>")
            .finish()
    }
}

impl Table {
    pub fn new(
        table_size: usize,
        participants: usize,
        set_size: usize,
        table_delay: Duration,
        display: Arc<dyn DisplaySink>,
    ) -> Self {
        Self {
            slot_to_card: vec![None; table_size],
            card_to_slot: HashMap::new(),
            used_slots: Vec::with_capacity(table_size),
            tokens: vec![Vec::with_capacity(set_size); participants],
            set_size,
            table_delay,
            display,
        }
    }

    pub fn table_size(&self) -> usize {
        self.slot_to_card.len()
    }

    /// Places `card` at `slot`. Panics if the slot is occupied or the
    /// card is already on the table (invariant I1 would break).
    pub fn place_card(&mut self, card: Card, slot: Slot) {
        assert!(
            self.slot_to_card[slot].is_none(),
            "place_card: slot {slot} already occupied"
        );
        assert!(
            !self.card_to_slot.contains_key(&card),
            "place_card: card {card} already on table"
        );
        self.slot_to_card[slot] = Some(card);
        self.card_to_slot.insert(card, slot);
        self.used_slots.push(slot);
        self.display.place_card(card, slot);
        self.delay();
    }

    /// Removes whatever card occupies `slot`, stripping every
    /// participant's token there first. No-op if the slot is empty.
    pub fn remove_card(&mut self, slot: Slot) -> Option<Card> {
        let card = self.slot_to_card[slot]?;
        for participant in 0..self.tokens.len() {
            if self.remove_token(participant, slot) {
                self.display.remove_token(participant, slot);
            }
        }
        self.slot_to_card[slot] = None;
        self.card_to_slot.remove(&card);
        self.used_slots.retain(|&s| s != slot);
        self.display.remove_card(slot);
        self.delay();
        Some(card)
    }

    /// Toggles `participant`'s token on `slot`. Returns `true` iff the
    /// participant now holds exactly `set_size` tokens (the only way a
    /// participant can reach a claimable state).
    pub fn place_token(&mut self, participant: ParticipantId, slot: Slot) -> bool {
        assert!(
            self.slot_to_card[slot].is_some(),
            "place_token: slot {slot} is empty"
        );
        let tokens = &mut self.tokens[participant];
        if let Some(pos) = tokens.iter().position(|&s| s == slot) {
            tokens.remove(pos);
            self.display.remove_token(participant, slot);
            false
        } else {
            assert!(
                tokens.len() < self.set_size,
                "place_token: participant {participant} already has {} tokens",
                tokens.len()
            );
            tokens.push(slot);
            self.display.place_token(participant, slot);
            tokens.len() == self.set_size
        }
    }

    /// Idempotent: removes `participant`'s token from `slot` if present.
    /// Returns whether a removal actually happened. Does not itself
    /// notify the display — callers that remove on behalf of someone
    /// else (e.g. [`Table::remove_card`]) decide whether to announce it.
    pub fn remove_token(&mut self, participant: ParticipantId, slot: Slot) -> bool {
        let tokens = &mut self.tokens[participant];
        if let Some(pos) = tokens.iter().position(|&s| s == slot) {
            tokens.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn remove_player_tokens(&mut self, participant: ParticipantId) {
        let slots = std::mem::take(&mut self.tokens[participant]);
        for slot in slots {
            self.display.remove_token(participant, slot);
        }
    }

    pub fn reset_all_tokens(&mut self) {
        for tokens in &mut self.tokens {
            tokens.clear();
        }
        self.display.remove_all_tokens();
    }

    pub fn get_card(&self, slot: Slot) -> Option<Card> {
        self.slot_to_card[slot]
    }

    pub fn get_player_tokens(&self, participant: ParticipantId) -> Vec<Slot> {
        self.tokens[participant].clone()
    }

    pub fn used_slots(&self) -> Vec<Slot> {
        self.used_slots.clone()
    }

    pub fn count_cards(&self) -> usize {
        self.used_slots.len()
    }

    /// Existence-only probe: is there a legal set anywhere on the table?
    pub fn check_for_sets(&self, tester: &dyn SetTester) -> bool {
        let cards: Vec<Card> = self.used_slots.iter().filter_map(|&s| self.get_card(s)).collect();
        set_testing::any_set_exists(tester, &cards)
    }

    /// Returns the slots of one randomly chosen legal set on the table,
    /// or empty if none exists.
    pub fn hints_for_ai(&self, tester: &dyn SetTester) -> Vec<Slot> {
        let cards: Vec<Card> = self.used_slots.iter().filter_map(|&s| self.get_card(s)).collect();
        let sets = tester.find_sets(&cards, usize::MAX);
        let Some(chosen) = sets.choose(&mut rand::thread_rng()) else {
            return Vec::new();
        };
        chosen
            .iter()
            .filter_map(|c| self.card_to_slot.get(c).copied())
            .collect()
    }

    fn delay(&self) {
        if !self.table_delay.is_zero() {
            thread::sleep(self.table_delay);
        }
    }
}
