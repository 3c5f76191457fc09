//! Game logic: difficulty, choice sets, countdown, scoring, rosters

pub mod catalog;
pub mod countdown;
pub mod roster;
pub mod schedule;
pub mod score;

pub use catalog::NameCatalog;
pub use countdown::{Countdown, CountdownEvent};
pub use roster::Roster;
pub use schedule::Scheduler;
pub use score::ScoreTracker;

use rand::prelude::*;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Sequence number of a round. Lookup results carry the token of the round
/// that asked for them, so late answers for an earlier round can be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RoundToken(pub u64);

impl RoundToken {
    pub fn next(self) -> Self {
        RoundToken(self.0 + 1)
    }
}

/// Difficulty level, mapping to a choice count and a time budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// All levels in menu order
    pub fn all() -> &'static [Difficulty] {
        &[Difficulty::Easy, Difficulty::Normal, Difficulty::Hard]
    }

    /// Number of choice buttons shown per round
    pub fn choice_count(self) -> usize {
        match self {
            Difficulty::Easy => 2,
            Difficulty::Normal => 4,
            Difficulty::Hard => 6,
        }
    }

    /// Seconds on the countdown per round
    pub fn time_budget(self) -> u32 {
        match self {
            Difficulty::Easy => 15,
            Difficulty::Normal => 12,
            Difficulty::Hard => 10,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown difficulty name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty: {0} (expected easy, normal or hard)")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(UnknownDifficulty(s.to_string())),
        }
    }
}

/// Build the choice labels for a round.
///
/// The result holds `correct` exactly once plus up to `count - 1` distinct
/// distractors sampled without replacement from `pool`. It is shorter than
/// `count` only when the pool runs out of distinct names. The final order is
/// shuffled so the correct answer's position carries no information.
pub fn generate_choices<R: Rng + ?Sized>(
    correct: &str,
    pool: &[String],
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let distinct: Vec<&str> = pool
        .iter()
        .map(String::as_str)
        .filter(|name| *name != correct && seen.insert(*name))
        .collect();

    let wanted = count.max(1) - 1;
    let mut choices: Vec<String> = distinct
        .choose_multiple(rng, wanted)
        .map(|name| name.to_string())
        .collect();
    choices.push(correct.to_string());
    choices.shuffle(rng);
    choices
}

/// Upper-case the first character, leaving the rest untouched.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
