use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Arithmetic operation practiced during a match
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Addition,
        Operation::Subtraction,
        Operation::Multiplication,
        Operation::Division,
    ];

    pub fn symbol(&self) -> char {
        match self {
            Operation::Addition => '+',
            Operation::Subtraction => '-',
            Operation::Multiplication => '×',
            Operation::Division => '÷',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operation: {0}")]
pub struct ParseOperationError(pub String);

impl FromStr for Operation {
    type Err = ParseOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "addition" | "add" | "+" => Ok(Operation::Addition),
            "subtraction" | "sub" | "-" => Ok(Operation::Subtraction),
            "multiplication" | "mul" | "×" | "*" => Ok(Operation::Multiplication),
            "division" | "div" | "÷" | "/" => Ok(Operation::Division),
            _ => Err(ParseOperationError(s.to_string())),
        }
    }
}

/// A single question shown to a player. Replaced wholesale, never edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub question: String,
    pub answer: i64,
}

impl Problem {
    fn render(lhs: i64, op: Operation, rhs: i64, answer: i64) -> Self {
        Self {
            question: format!("{} {} {}", lhs, op.symbol(), rhs),
            answer,
        }
    }
}

/// Generate a random problem for `operation` at difficulty `level` (clamped to at least 1).
///
/// Addition and subtraction operands scale with `10 * level`; multiplication and
/// division factors stay within `1..=5 + level`. Subtraction never yields a
/// negative answer and division is always exact.
pub fn generate<R: Rng + ?Sized>(operation: Operation, level: u32, rng: &mut R) -> Problem {
    let level = i64::from(level.max(1));

    match operation {
        Operation::Addition => {
            let num1 = rng.gen_range(1..=10 * level);
            let num2 = rng.gen_range(1..=10 * level);
            Problem::render(num1, operation, num2, num1 + num2)
        }
        Operation::Subtraction => {
            let num2 = rng.gen_range(1..=10 * level);
            let num1 = num2 + rng.gen_range(0..=10 * level);
            Problem::render(num1, operation, num2, num1 - num2)
        }
        Operation::Multiplication => {
            let num1 = rng.gen_range(1..=5 + level);
            let num2 = rng.gen_range(1..=5 + level);
            Problem::render(num1, operation, num2, num1 * num2)
        }
        Operation::Division => {
            let num2 = rng.gen_range(1..=5 + level);
            let answer = rng.gen_range(1..=5 + level);
            Problem::render(num2 * answer, operation, num2, answer)
        }
    }
}

/// Same as [`generate`] for an operation given by name; `None` when the name is unknown.
pub fn generate_named<R: Rng + ?Sized>(name: &str, level: u32, rng: &mut R) -> Option<Problem> {
    match name.parse::<Operation>() {
        Ok(operation) => Some(generate(operation, level, rng)),
        Err(err) => {
            tracing::warn!("attempted to generate problem with {err}");
            None
        }
    }
}
