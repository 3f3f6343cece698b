//! Per-player running score totals.
//!
//! Totals change in exactly two ways: a game-wide reset to zero, and a +1
//! credit per operator-approved answer. They never decrement and never go
//! negative.

use log::warn;
use std::collections::HashMap;

pub struct ScoreKeeper {
    totals: HashMap<u32, u32>,
}

impl ScoreKeeper {
    pub fn new() -> Self {
        ScoreKeeper {
            totals: HashMap::new(),
        }
    }

    /// Zeroes the totals for exactly the given players, dropping anyone
    /// else. Called once per game, when the roster is frozen.
    pub fn reset(&mut self, player_ids: &[u32]) {
        self.totals = player_ids.iter().map(|id| (*id, 0)).collect();
    }

    /// Adds one point. Crediting a player outside the game is a bug in the
    /// caller and is dropped with a warning rather than inventing an entry.
    pub fn credit(&mut self, player_id: u32) {
        match self.totals.get_mut(&player_id) {
            Some(total) => *total += 1,
            None => warn!("Ignoring credit for unknown player {}", player_id),
        }
    }

    pub fn get(&self, player_id: u32) -> u32 {
        self.totals.get(&player_id).copied().unwrap_or(0)
    }
}

impl Default for ScoreKeeper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_zeroes_given_players() {
        let mut scores = ScoreKeeper::new();
        scores.reset(&[1, 2]);
        scores.credit(1);
        scores.credit(1);
        scores.reset(&[1, 2]);

        assert_eq!(scores.get(1), 0);
        assert_eq!(scores.get(2), 0);
    }

    #[test]
    fn test_credit_increments_by_exactly_one() {
        let mut scores = ScoreKeeper::new();
        scores.reset(&[7]);

        scores.credit(7);
        assert_eq!(scores.get(7), 1);
        scores.credit(7);
        assert_eq!(scores.get(7), 2);
    }

    #[test]
    fn test_credit_for_unknown_player_is_dropped() {
        let mut scores = ScoreKeeper::new();
        scores.reset(&[1]);

        scores.credit(99);
        assert_eq!(scores.get(99), 0);
        assert_eq!(scores.get(1), 0);
    }

    #[test]
    fn test_reset_drops_departed_players() {
        let mut scores = ScoreKeeper::new();
        scores.reset(&[1, 2]);
        scores.credit(2);

        scores.reset(&[1]);
        assert_eq!(scores.get(2), 0);
    }
}
