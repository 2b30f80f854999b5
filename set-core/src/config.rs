use serde::{Deserialize, Serialize};

/// Construction-time configuration for a [`crate::Game`].
///
/// Built by whatever static configuration loader the embedding
/// application uses; this crate only consumes the finished value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub players: usize,
    pub deck_size: usize,
    pub table_size: usize,
    /// Cards per legal set, and per claim. `SET_SIZE` in spec terms.
    pub set_size: usize,
    /// Sign selects the timer mode: negative = no display, zero = elapsed
    /// mode, positive = countdown mode.
    pub turn_timeout_millis: i64,
    pub turn_timeout_warning_millis: u64,
    pub point_freeze_millis: u64,
    pub penalty_freeze_millis: u64,
    pub table_delay_millis: u64,
    /// Enables AI hint mode (legal-triplet presses) and hint printing,
    /// instead of AI random-slot mode.
    pub hints: bool,
    /// Participants `0..human_count` are human (key-driven); the rest are
    /// synthetic. Which physical keys route to which human participant is
    /// the key-binding translator's job, out of scope for this crate —
    /// this field is the one thing the dealer itself needs to know.
    pub human_count: usize,
}

impl GameConfig {
    pub fn timer_mode(&self) -> TimerMode {
        match self.turn_timeout_millis.cmp(&0) {
            std::cmp::Ordering::Less => TimerMode::NoDisplay,
            std::cmp::Ordering::Equal => TimerMode::Elapsed,
            std::cmp::Ordering::Greater => TimerMode::Countdown,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            players: 2,
            deck_size: 81,
            table_size: 12,
            set_size: 3,
            turn_timeout_millis: 60_000,
            turn_timeout_warning_millis: 5_000,
            point_freeze_millis: 1_000,
            penalty_freeze_millis: 3_000,
            table_delay_millis: 0,
            hints: false,
            human_count: 1,
        }
    }
}

/// Derived from [`GameConfig::turn_timeout_millis`]'s sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    NoDisplay,
    Elapsed,
    Countdown,
}
