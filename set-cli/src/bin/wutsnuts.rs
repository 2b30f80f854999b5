use set_cli::TernarySetTester;
use set_core::set_testing::SetTester;
use set_core::Deck;

/// Draws a hand of `n` cards from a fresh shuffled deck and prints every
/// legal set hiding inside it, if any.
fn main() {
    let n = 12;
    let deck_size = 81;
    let mut deck = Deck::new(deck_size);
    let cards: Vec<_> = (0..n).map(|_| deck.draw().unwrap()).collect();
    let tester = TernarySetTester::for_deck_size(deck_size);

    println!(
        "Hand: {}",
        cards
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let sets = tester.find_sets(&cards, usize::MAX);
    if sets.is_empty() {
        println!("No legal sets in this hand.");
        return;
    }
    for set in &sets {
        println!(
            "  set: {}",
            set.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" ")
        );
    }
}
