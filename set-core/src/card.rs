use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque card identifier drawn from `0..deck_size`.
///
/// Unlike a playing card, a `Card` carries no suit/rank/feature data of
/// its own — feature decomposition is the job of the external
/// set-testing utility (see [`crate::set_testing::SetTester`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Card(pub u32);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for Card {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_stable() {
        assert_eq!(Card(7).to_string(), "c7");
    }

    #[test]
    fn ordering_matches_id() {
        assert!(Card(1) < Card(2));
    }
}
