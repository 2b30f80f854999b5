use set_core::{Card, ParticipantId, Slot};
use set_core::display::DisplaySink;
use set_core::set_testing::SetTester;

/// Forwards every display effect to `log`, at a level roughly matched to
/// how interesting it is to a human watching the console. Table and
/// token churn is `debug`; score changes, freezes, and the final
/// announcement are `info`.
#[derive(Debug, Default)]
pub struct LoggingDisplay;

impl DisplaySink for LoggingDisplay {
    fn place_card(&self, card: Card, slot: Slot) {
        log::debug!("slot {slot}: {card} dealt");
    }
    fn remove_card(&self, slot: Slot) {
        log::debug!("slot {slot}: card removed");
    }
    fn place_token(&self, participant: ParticipantId, slot: Slot) {
        log::debug!("participant {participant}: token on slot {slot}");
    }
    fn remove_token(&self, participant: ParticipantId, slot: Slot) {
        log::debug!("participant {participant}: token cleared from slot {slot}");
    }
    fn remove_all_tokens(&self) {
        log::debug!("all tokens cleared");
    }
    fn remove_slot_tokens(&self, slot: Slot) {
        log::debug!("slot {slot}: all tokens cleared");
    }
    fn set_score(&self, participant: ParticipantId, score: u32) {
        log::info!("participant {participant}: score is now {score}");
    }
    fn set_freeze(&self, participant: ParticipantId, millis_remaining: u64) {
        log::info!("participant {participant}: frozen for {millis_remaining}ms");
    }
    fn set_countdown(&self, millis: i64, warn: bool) {
        if warn {
            log::info!("{millis}ms remaining in the round");
        } else {
            log::debug!("{millis}ms remaining in the round");
        }
    }
    fn set_elapsed(&self, millis: u64) {
        log::debug!("{millis}ms elapsed this round");
    }
    fn announce_winners(&self, ids: &[ParticipantId]) {
        log::info!("winners: {ids:?}");
    }
    fn dispose(&self) {
        log::info!("display disposed");
    }
}

/// A real, playable [`SetTester`]: decodes each card id as `features`
/// base-3 digits (the classic four-feature encoding — number, shape,
/// shading, color — for a 3^4 = 81 card deck) and tests the standard
/// per-feature "all same or all different" rule, which is equivalent to
/// every feature's digit sum being a multiple of three.
///
/// The combinatorial utility spec.md treats as an external, out-of-scope
/// collaborator is whatever the embedding application actually ships;
/// this one exists so the demo binaries are playable without it.
#[derive(Debug, Clone, Copy)]
pub struct TernarySetTester {
    features: u32,
}

impl TernarySetTester {
    pub fn new(features: u32) -> Self {
        Self { features }
    }

    /// Picks the smallest feature count whose deck (`3^features`) covers
    /// `deck_size`, so a tester built this way can decode every id the
    /// deck can produce.
    pub fn for_deck_size(deck_size: usize) -> Self {
        let mut features = 1;
        while 3usize.pow(features) < deck_size {
            features += 1;
        }
        Self::new(features)
    }

    fn digits(&self, card: Card) -> Vec<u8> {
        let mut n = card.0;
        (0..self.features)
            .map(|_| {
                let d = (n % 3) as u8;
                n /= 3;
                d
            })
            .collect()
    }
}

impl SetTester for TernarySetTester {
    fn test_set(&self, cards: &[Card]) -> bool {
        if cards.len() != 3 {
            return false;
        }
        if cards[0] == cards[1] || cards[1] == cards[2] || cards[0] == cards[2] {
            return false;
        }
        let digits: Vec<Vec<u8>> = cards.iter().map(|&c| self.digits(c)).collect();
        (0..self.features as usize).all(|f| {
            let sum: u32 = digits.iter().map(|d| d[f] as u32).sum();
            sum % 3 == 0
        })
    }

    fn find_sets(&self, cards: &[Card], max_results: usize) -> Vec<Vec<Card>> {
        use itertools::Itertools;
        let mut out = Vec::new();
        for combo in cards.iter().copied().combinations(3) {
            if self.test_set(&combo) {
                out.push(combo);
                if out.len() >= max_results {
                    break;
                }
            }
        }
        out
    }

    fn card_features(&self, card: Card) -> Vec<i32> {
        self.digits(card).into_iter().map(i32::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_feature_digits_form_a_set() {
        let t = TernarySetTester::new(4);
        // 0 decodes to all-zero digits; three distinct all-zero-except-one
        // -feature cards sum to 0 mod 3 on every feature.
        assert!(t.test_set(&[Card(0), Card(1), Card(2)]));
    }

    #[test]
    fn two_same_one_different_on_a_feature_is_not_a_set() {
        let t = TernarySetTester::new(4);
        // Cards 0 and 1 share every digit but the first; 3 differs from
        // both on the first digit too, but shares the rest with neither
        // pattern needed: two-same-one-different trips the mod-3 check.
        assert!(!t.test_set(&[Card(0), Card(1), Card(3)]));
    }

    #[test]
    fn for_deck_size_covers_the_whole_deck() {
        let t = TernarySetTester::for_deck_size(81);
        assert_eq!(t.features, 4);
    }

    #[test]
    fn card_features_matches_the_base_three_digits() {
        let t = TernarySetTester::new(4);
        assert_eq!(t.card_features(Card(1)), vec![1, 0, 0, 0]);
    }
}
