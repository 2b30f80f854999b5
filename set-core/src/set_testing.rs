use crate::Card;

/// The combinatorial set-testing utility, consumed but not implemented by
/// this crate. Must be pure and thread-safe: it is called from the
/// dealer's adjudication path while holding the table mutex, and from AI
/// participants' synthetic-input workers without it.
pub trait SetTester: Send + Sync {
    /// Does this triplet of cards form a legal set?
    fn test_set(&self, cards: &[Card]) -> bool;

    /// Enumerate up to `max_results` legal triplets drawn from `cards`.
    fn find_sets(&self, cards: &[Card], max_results: usize) -> Vec<Vec<Card>>;

    /// Decodes a card into its feature vector. Length is constant across
    /// calls for a given tester instance.
    fn card_features(&self, card: Card) -> Vec<i32>;
}

/// Does any legal set exist among `cards`, per `tester`?
pub fn any_set_exists(tester: &dyn SetTester, cards: &[Card]) -> bool {
    !tester.find_sets(cards, 1).is_empty()
}

/// Deterministic stand-ins for [`SetTester`], used by this crate's own
/// tests and by `set-core`'s integration tests. The real combinatorial
/// utility (feature decomposition over color/shape/number/shading) is an
/// external collaborator out of scope for this crate.
pub mod testing {
    use super::*;
    use itertools::Itertools;

    /// Treats any triplet whose ids sum to a multiple of 3 as a legal set.
    /// Arbitrary but deterministic and cheap to seed test fixtures around.
    #[derive(Debug, Default)]
    pub struct ModThreeSetTester;

    impl SetTester for ModThreeSetTester {
        fn test_set(&self, cards: &[Card]) -> bool {
            if cards.len() < 2 {
                return false;
            }
            let sum: u32 = cards.iter().map(|c| c.0).sum();
            sum % 3 == 0 && cards.iter().all_unique()
        }

        fn find_sets(&self, cards: &[Card], max_results: usize) -> Vec<Vec<Card>> {
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
            vec![(card.0 % 3) as i32]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ModThreeSetTester;
    use super::*;

    #[test]
    fn finds_a_trivial_set() {
        let t = ModThreeSetTester;
        assert!(t.test_set(&[Card(0), Card(1), Card(2)]));
        assert!(!t.test_set(&[Card(0), Card(1), Card(1)]));
    }

    #[test]
    fn find_sets_respects_max_results() {
        let t = ModThreeSetTester;
        let cards: Vec<Card> = (0..9).map(Card).collect();
        let found = t.find_sets(&cards, 2);
        assert!(found.len() <= 2);
        for combo in &found {
            assert!(t.test_set(combo));
        }
    }

    #[test]
    fn card_features_is_the_id_mod_three() {
        let t = ModThreeSetTester;
        assert_eq!(t.card_features(Card(5)), vec![2]);
    }
}
