use serde::{Deserialize, Serialize};

use crate::problem::{Operation, Problem};
use crate::rope::ROPE_CENTER;

/// Fixed manual pull strength used when two humans play
pub const TWO_PLAYER_PULL_STRENGTH: f64 = 5.0;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GameMode {
    /// Player 1 against the computer
    #[default]
    Single,
    /// Two players sharing one keyboard
    TwoPlayer,
}

impl GameMode {
    pub fn description(&self) -> &'static str {
        match self {
            GameMode::Single => "Face off against the computer!",
            GameMode::TwoPlayer => "Compete with a friend on the same device!",
        }
    }

    pub fn opponent_label(&self) -> &'static str {
        match self {
            GameMode::Single => "COMPUTER",
            GameMode::TwoPlayer => "PLAYER 2",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            GameMode::Single => GameMode::TwoPlayer,
            GameMode::TwoPlayer => GameMode::Single,
        }
    }
}

/// Which side of the rope a submission comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn number(&self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }
}

/// Everything that describes the match in progress (or the one that just ended)
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub rope_position: f64,
    pub game_mode: GameMode,
    pub operation: Operation,
    pub level: u32,
    pub game_active: bool,
    /// Elapsed match seconds
    pub timer: u64,
    pub player1_problem: Option<Problem>,
    pub player2_problem: Option<Problem>,
    /// Percentage points per answered question
    pub pull_strength: f64,
    /// Milliseconds between computer pulls
    pub opponent_pull_speed: f64,
    pub score: u32,
    pub opponent_score: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            rope_position: ROPE_CENTER,
            game_mode: GameMode::Single,
            operation: Operation::Addition,
            level: 1,
            game_active: false,
            timer: 0,
            player1_problem: None,
            player2_problem: None,
            pull_strength: TWO_PLAYER_PULL_STRENGTH,
            opponent_pull_speed: 1000.0,
            score: 0,
            opponent_score: 0,
        }
    }
}

impl SessionState {
    /// Clear match-scoped fields. Mode, operation and level are pre-game
    /// selections and survive.
    pub fn reset(&mut self) {
        self.score = 0;
        self.opponent_score = 0;
        self.rope_position = ROPE_CENTER;
        self.player1_problem = None;
        self.player2_problem = None;
        self.game_active = false;
        self.timer = 0;
    }

    /// Recompute pull strength and opponent cadence from level and mode.
    pub fn derive_pull_settings(&mut self) {
        let level = f64::from(self.level.max(1));
        self.opponent_pull_speed = 3000.0 / level;
        self.pull_strength = match self.game_mode {
            GameMode::Single => 8.0 / level,
            GameMode::TwoPlayer => TWO_PLAYER_PULL_STRENGTH,
        };
    }

    /// Magnitude of one automated computer pull
    pub fn opponent_pull(&self) -> f64 {
        2.0 * f64::from(self.level.max(1))
    }

    pub fn problem_for(&self, player: Player) -> Option<&Problem> {
        match player {
            Player::One => self.player1_problem.as_ref(),
            Player::Two => self.player2_problem.as_ref(),
        }
    }

    pub fn problem_slot(&mut self, player: Player) -> &mut Option<Problem> {
        match player {
            Player::One => &mut self.player1_problem,
            Player::Two => &mut self.player2_problem,
        }
    }
}
