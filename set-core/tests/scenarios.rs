//! Black-box coverage of the concrete scenarios a game must exhibit,
//! driven entirely through `Game`'s public surface (`start`, `on_key`,
//! `score`, `terminate`) and observed entirely through a `RecordingDisplay`
//! — exactly what an embedding UI would have access to.
//!
//! Several scenarios need to know which card landed on which slot before
//! choosing which slots to press. Rather than guess, they read it back
//! off the recorded `PlaceCard` events, the same way a real display would
//! learn the board.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use set_core::display::{DisplayEvent, RecordingDisplay};
use set_core::set_testing::testing::ModThreeSetTester;
use set_core::set_testing::SetTester;
use set_core::{Card, Game, GameConfig};

fn wait_until<F: Fn() -> bool>(timeout: Duration, pred: F) -> bool {
    let start = Instant::now();
    loop {
        if pred() {
            return true;
        }
        if start.elapsed() >= timeout {
            return pred();
        }
        thread::sleep(Duration::from_millis(5));
    }
}

fn dealt_board(display: &RecordingDisplay) -> Vec<(Card, usize)> {
    display
        .events()
        .into_iter()
        .filter_map(|e| match e {
            DisplayEvent::PlaceCard(card, slot) => Some((card, slot)),
            _ => None,
        })
        .collect()
}

#[test]
fn valid_set_award_scores_a_point_and_freezes_the_claimant() {
    let display = Arc::new(RecordingDisplay::new());
    let game = Game::new(
        GameConfig {
            players: 1,
            human_count: 1,
            deck_size: 3,
            table_size: 3,
            set_size: 3,
            point_freeze_millis: 50,
            ..Default::default()
        },
        Arc::new(ModThreeSetTester),
        display.clone(),
    );
    game.start();

    // With a 3-card deck dealt whole onto a 3-slot table, the board is
    // always exactly {0, 1, 2}, which always sums to a multiple of 3 —
    // any press order is a legal claim.
    assert!(wait_until(Duration::from_secs(1), || dealt_board(&display).len() >= 3));
    game.on_key(0, 0).unwrap();
    game.on_key(0, 1).unwrap();
    game.on_key(0, 2).unwrap();

    assert!(wait_until(Duration::from_secs(1), || game.score(0) == Some(1)));
    assert!(display
        .events()
        .iter()
        .any(|e| matches!(e, DisplayEvent::SetFreeze(0, millis) if *millis > 0)));

    game.terminate();
}

#[test]
fn invalid_set_penalty_freezes_without_scoring() {
    let display = Arc::new(RecordingDisplay::new());
    let game = Game::new(
        GameConfig {
            players: 1,
            human_count: 1,
            deck_size: 4,
            table_size: 4,
            set_size: 3,
            penalty_freeze_millis: 50,
            ..Default::default()
        },
        Arc::new(ModThreeSetTester),
        display.clone(),
    );
    game.start();
    assert!(wait_until(Duration::from_secs(1), || dealt_board(&display).len() >= 4));

    let board = dealt_board(&display);
    let illegal = (0..board.len())
        .flat_map(|i| (0..board.len()).map(move |j| (i, j)))
        .flat_map(|(i, j)| (0..board.len()).map(move |k| (i, j, k)))
        .find_map(|(i, j, k)| {
            if i == j || j == k || i == k {
                return None;
            }
            let cards = [board[i].0, board[j].0, board[k].0];
            if ModThreeSetTester.test_set(&cards) {
                None
            } else {
                Some((board[i].1, board[j].1, board[k].1))
            }
        })
        .expect("a 4-card board with values 0..4 always has an illegal triple");

    game.on_key(0, illegal.0).unwrap();
    game.on_key(0, illegal.1).unwrap();
    game.on_key(0, illegal.2).unwrap();

    assert!(wait_until(Duration::from_secs(1), || {
        display
            .events()
            .iter()
            .any(|e| matches!(e, DisplayEvent::SetFreeze(0, millis) if *millis > 0))
    }));
    assert_eq!(game.score(0), Some(0));

    game.terminate();
}

#[test]
fn collision_strips_the_losing_participants_shared_token() {
    let display = Arc::new(RecordingDisplay::new());
    let game = Game::new(
        GameConfig {
            players: 2,
            human_count: 2,
            deck_size: 6,
            table_size: 6,
            set_size: 3,
            ..Default::default()
        },
        Arc::new(ModThreeSetTester),
        display.clone(),
    );
    game.start();
    assert!(wait_until(Duration::from_secs(1), || dealt_board(&display).len() >= 6));

    let board = dealt_board(&display);
    let mut legal_triples: Vec<[usize; 3]> = Vec::new();
    for i in 0..board.len() {
        for j in 0..board.len() {
            for k in 0..board.len() {
                if i == j || j == k || i == k {
                    continue;
                }
                let cards = [board[i].0, board[j].0, board[k].0];
                if ModThreeSetTester.test_set(&cards) {
                    legal_triples.push([board[i].1, board[j].1, board[k].1]);
                }
            }
        }
    }

    let (first, second) = legal_triples
        .iter()
        .find_map(|a| {
            legal_triples.iter().find_map(|b| {
                let shared: Vec<usize> = a.iter().copied().filter(|s| b.contains(s)).collect();
                if shared.len() == 1 && a != b {
                    Some((*a, *b))
                } else {
                    None
                }
            })
        })
        .expect("a 6-card mod-three board has two legal triples sharing exactly one slot");
    let shared_slot = first.iter().copied().find(|s| second.contains(s)).unwrap();

    game.on_key(0, first[0]).unwrap();
    game.on_key(0, first[1]).unwrap();
    game.on_key(0, first[2]).unwrap();
    for &slot in &second {
        game.on_key(1, slot).unwrap();
    }

    assert!(wait_until(Duration::from_secs(1), || game.score(0) == Some(1)));
    assert!(wait_until(Duration::from_secs(1), || {
        display
            .events()
            .iter()
            .any(|e| matches!(e, DisplayEvent::RemoveToken(1, s) if *s == shared_slot))
    }));

    game.terminate();
}

#[test]
fn reshuffle_resets_the_countdown_after_a_round_with_no_claims() {
    let display = Arc::new(RecordingDisplay::new());
    let game = Game::new(
        GameConfig {
            players: 1,
            human_count: 1,
            deck_size: 81,
            table_size: 6,
            turn_timeout_millis: 80,
            ..Default::default()
        },
        Arc::new(ModThreeSetTester),
        display.clone(),
    );
    game.start();

    assert!(wait_until(Duration::from_secs(1), || {
        display
            .events()
            .iter()
            .any(|e| matches!(e, DisplayEvent::SetCountdown(80, false)))
    }));

    game.terminate();
}

#[test]
fn termination_cascade_announces_winners_and_disposes_the_display() {
    let display = Arc::new(RecordingDisplay::new());
    let game = Game::new(
        GameConfig {
            players: 3,
            human_count: 0,
            deck_size: 81,
            table_size: 12,
            ..Default::default()
        },
        Arc::new(ModThreeSetTester),
        display.clone(),
    );
    game.start();
    thread::sleep(Duration::from_millis(30));
    game.terminate();

    let events = display.events();
    assert!(events
        .iter()
        .any(|e| matches!(e, DisplayEvent::AnnounceWinners(_))));
    assert_eq!(events.last(), Some(&DisplayEvent::Dispose));
}

#[test]
fn game_end_by_exhaustion_finishes_with_no_claims_possible() {
    let display = Arc::new(RecordingDisplay::new());
    // Fewer than set_size cards exist in the whole game: no legal set can
    // ever exist in the deck or on the table, so the very first
    // `shouldFinish` check ends the game before a round is dealt.
    let game = Game::new(
        GameConfig {
            players: 0,
            human_count: 0,
            deck_size: 2,
            table_size: 2,
            set_size: 3,
            ..Default::default()
        },
        Arc::new(ModThreeSetTester),
        display.clone(),
    );
    game.start();

    assert!(wait_until(Duration::from_secs(1), || {
        display.events().contains(&DisplayEvent::Dispose)
    }));
    assert!(display
        .events()
        .contains(&DisplayEvent::AnnounceWinners(Vec::new())));
}
