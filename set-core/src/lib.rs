pub mod card;
pub mod claim;
pub mod config;
pub mod dealer;
pub mod deck;
pub mod display;
pub mod freeze;
pub mod game;
pub mod participant;
pub mod set_testing;
pub mod table;

pub use card::Card;
pub use config::GameConfig;
pub use deck::Deck;
pub use game::Game;
pub use table::Table;

/// A participant identifier, stable for the lifetime of a [`Game`].
pub type ParticipantId = usize;

/// A fixed grid position on the table.
pub type Slot = usize;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum GameError {
    #[display(fmt = "no participant with id {_0}")]
    UnknownParticipant(#[error(ignore)] ParticipantId),
}
