//! Rope position arithmetic and win/loss thresholds.
//!
//! Lower positions favour Player 1, higher positions favour the computer or
//! Player 2. A pull always clamps first and then checks thresholds, so a
//! single large pull can cross a threshold without landing on it.

use crate::session::{GameMode, Player, SessionState};

pub const ROPE_CENTER: f64 = 50.0;
pub const ROPE_MIN: f64 = 5.0;
pub const ROPE_MAX: f64 = 95.0;
pub const PLAYER_ONE_THRESHOLD: f64 = 10.0;
pub const OPPONENT_THRESHOLD: f64 = 90.0;

/// Terminal result of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    PlayerOne,
    PlayerTwo,
    Computer,
}

impl Winner {
    pub fn is_human(&self) -> bool {
        !matches!(self, Winner::Computer)
    }
}

pub fn clamp(position: f64) -> f64 {
    position.clamp(ROPE_MIN, ROPE_MAX)
}

/// Evaluate thresholds for an already clamped position.
pub fn outcome(position: f64, mode: GameMode) -> Option<Winner> {
    if position <= PLAYER_ONE_THRESHOLD {
        Some(Winner::PlayerOne)
    } else if position >= OPPONENT_THRESHOLD {
        match mode {
            GameMode::Single => Some(Winner::Computer),
            GameMode::TwoPlayer => Some(Winner::PlayerTwo),
        }
    } else {
        None
    }
}

/// Apply one signed pull to the rope. Negative moves toward Player 1.
///
/// Returns the winner when the pull ends the match. Inactive sessions are
/// left untouched.
pub fn apply_pull(state: &mut SessionState, delta: f64) -> Option<Winner> {
    if !state.game_active {
        return None;
    }
    state.rope_position = clamp(state.rope_position + delta);
    outcome(state.rope_position, state.game_mode)
}

/// Signed delta for an answer: a correct answer pulls toward the answering
/// player, a wrong one helps the other side by the same amount.
pub fn answer_delta(player: Player, correct: bool, strength: f64) -> f64 {
    let toward_player = match player {
        Player::One => -strength,
        Player::Two => strength,
    };
    if correct {
        toward_player
    } else {
        -toward_player
    }
}
