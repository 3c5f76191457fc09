//! Score, guess history and accuracy

/// Number of recent guesses shown on screen
pub const RECENT_GUESSES: usize = 6;

/// A single guess and whether it was right
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessRecord {
    pub label: String,
    pub was_correct: bool,
}

/// Running totals for the current game
#[derive(Debug, Clone, Default)]
pub struct ScoreTracker {
    score: u32,
    total_guesses: u32,
    correct_guesses: u32,
    history: Vec<GuessRecord>,
}

impl ScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a guess. A correct guess also adds a point to the score.
    pub fn record(&mut self, label: impl Into<String>, correct: bool) {
        self.total_guesses += 1;
        if correct {
            self.correct_guesses += 1;
            self.score += 1;
        }
        self.history.push(GuessRecord {
            label: label.into(),
            was_correct: correct,
        });
    }

    /// Zero the score, keeping totals and history
    pub fn reset_score(&mut self) {
        self.score = 0;
    }

    /// Zero everything and clear history
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total_guesses(&self) -> u32 {
        self.total_guesses
    }

    pub fn correct_guesses(&self) -> u32 {
        self.correct_guesses
    }

    /// Fraction of guesses that were correct, 0 before any guess
    pub fn accuracy(&self) -> f64 {
        if self.total_guesses == 0 {
            0.0
        } else {
            self.correct_guesses as f64 / self.total_guesses as f64
        }
    }

    /// Whether at least half of the guesses so far were right
    pub fn accuracy_is_good(&self) -> bool {
        self.total_guesses > 0 && self.accuracy() >= 0.5
    }

    /// Full guess history, oldest first
    #[cfg(test)]
    pub fn history(&self) -> &[GuessRecord] {
        &self.history
    }

    /// The last few guesses, oldest first
    pub fn recent(&self) -> &[GuessRecord] {
        let start = self.history.len().saturating_sub(RECENT_GUESSES);
        &self.history[start..]
    }
}
