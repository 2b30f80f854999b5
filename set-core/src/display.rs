use crate::{Card, ParticipantId, Slot};

/// The rendering surface the core publishes to. All calls are expected to
/// be non-blocking from the core's standpoint — an implementation that
/// blocks (e.g. on a full network socket) would stall the table mutex
/// holder that triggered it.
pub trait DisplaySink: Send + Sync {
    fn place_card(&self, card: Card, slot: Slot);
    fn remove_card(&self, slot: Slot);
    fn place_token(&self, participant: ParticipantId, slot: Slot);
    fn remove_token(&self, participant: ParticipantId, slot: Slot);
    fn remove_all_tokens(&self);
    fn remove_slot_tokens(&self, slot: Slot);
    fn set_score(&self, participant: ParticipantId, score: u32);
    fn set_freeze(&self, participant: ParticipantId, millis_remaining: u64);
    fn set_countdown(&self, millis: i64, warn: bool);
    fn set_elapsed(&self, millis: u64);
    fn announce_winners(&self, ids: &[ParticipantId]);
    fn dispose(&self);
}

/// A `DisplaySink` that does nothing. Useful when embedding the core
/// without a UI (e.g. headless simulation, benchmarking).
#[derive(Debug, Default)]
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn place_card(&self, _card: Card, _slot: Slot) {}
    fn remove_card(&self, _slot: Slot) {}
    fn place_token(&self, _participant: ParticipantId, _slot: Slot) {}
    fn remove_token(&self, _participant: ParticipantId, _slot: Slot) {}
    fn remove_all_tokens(&self) {}
    fn remove_slot_tokens(&self, _slot: Slot) {}
    fn set_score(&self, _participant: ParticipantId, _score: u32) {}
    fn set_freeze(&self, _participant: ParticipantId, _millis_remaining: u64) {}
    fn set_countdown(&self, _millis: i64, _warn: bool) {}
    fn set_elapsed(&self, _millis: u64) {}
    fn announce_winners(&self, _ids: &[ParticipantId]) {}
    fn dispose(&self) {}
}

/// Every call a `DisplaySink` received, in order. Used by tests to assert
/// on the sequence of display effects a scenario produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    PlaceCard(Card, Slot),
    RemoveCard(Slot),
    PlaceToken(ParticipantId, Slot),
    RemoveToken(ParticipantId, Slot),
    RemoveAllTokens,
    RemoveSlotTokens(Slot),
    SetScore(ParticipantId, u32),
    SetFreeze(ParticipantId, u64),
    SetCountdown(i64, bool),
    SetElapsed(u64),
    AnnounceWinners(Vec<ParticipantId>),
    Dispose,
}

/// A `DisplaySink` that records every call for later inspection.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    events: parking_lot::Mutex<Vec<DisplayEvent>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DisplayEvent> {
        self.events.lock().clone()
    }

    fn push(&self, event: DisplayEvent) {
        self.events.lock().push(event);
    }
}

impl DisplaySink for RecordingDisplay {
    fn place_card(&self, card: Card, slot: Slot) {
        self.push(DisplayEvent::PlaceCard(card, slot));
    }
    fn remove_card(&self, slot: Slot) {
        self.push(DisplayEvent::RemoveCard(slot));
    }
    fn place_token(&self, participant: ParticipantId, slot: Slot) {
        self.push(DisplayEvent::PlaceToken(participant, slot));
    }
    fn remove_token(&self, participant: ParticipantId, slot: Slot) {
        self.push(DisplayEvent::RemoveToken(participant, slot));
    }
    fn remove_all_tokens(&self) {
        self.push(DisplayEvent::RemoveAllTokens);
    }
    fn remove_slot_tokens(&self, slot: Slot) {
        self.push(DisplayEvent::RemoveSlotTokens(slot));
    }
    fn set_score(&self, participant: ParticipantId, score: u32) {
        self.push(DisplayEvent::SetScore(participant, score));
    }
    fn set_freeze(&self, participant: ParticipantId, millis_remaining: u64) {
        self.push(DisplayEvent::SetFreeze(participant, millis_remaining));
    }
    fn set_countdown(&self, millis: i64, warn: bool) {
        self.push(DisplayEvent::SetCountdown(millis, warn));
    }
    fn set_elapsed(&self, millis: u64) {
        self.push(DisplayEvent::SetElapsed(millis));
    }
    fn announce_winners(&self, ids: &[ParticipantId]) {
        self.push(DisplayEvent::AnnounceWinners(ids.to_vec()));
    }
    fn dispose(&self) {
        self.push(DisplayEvent::Dispose);
    }
}
