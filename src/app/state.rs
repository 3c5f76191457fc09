//! Round lifecycle: the game state machine
//!
//! A round goes Loading → AwaitingGuess → Resolved and back to Loading.
//! Everything time-related is driven through [`Game::advance`], and all
//! I/O is pushed out through outboxes (`take_requests`, `take_cues`), so the
//! whole lifecycle runs without a terminal or a network.

use crate::game::{
    generate_choices, Countdown, CountdownEvent, Difficulty, NameCatalog, Roster, RoundToken,
    Scheduler, ScoreTracker,
};
use crate::pokedex::{LookupError, Subject};

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::mem;
use std::time::Duration;

/// Wrong guesses allowed per round in Timed games
pub const TIMED_ATTEMPT_CAP: u32 = 2;
/// Pause on a solved (or timed-out) round before the next one loads
pub const NEXT_ROUND_DELAY: Duration = Duration::from_millis(1200);
/// Pause after the final wrong attempt before the next round loads
pub const FAILED_ROUND_DELAY: Duration = Duration::from_millis(1500);
/// Choices stay locked this long after a wrong first attempt
pub const REENABLE_DELAY: Duration = Duration::from_millis(900);
/// Classic games show the verdict after this pause
pub const VERDICT_DELAY: Duration = Duration::from_millis(800);

/// Scoring policy, chosen when a game starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rules {
    /// Local roster, one guess per round, a wrong answer restarts the game
    Classic,
    /// Remote subjects, a countdown, two attempts per round
    Timed,
}

impl Rules {
    pub fn label(self) -> &'static str {
        match self {
            Rules::Classic => "Classic",
            Rules::Timed => "Timed",
        }
    }
}

/// Where the current round is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundState {
    /// Waiting for a subject
    Loading,
    /// Countdown running, choices clickable
    AwaitingGuess,
    /// Outcome shown, next round pending
    Resolved,
    /// Every roster subject guessed (Classic only)
    Completed,
    /// Subject lookup gave up; `retry` starts the round again
    Failed(String),
}

/// Visual state of a choice button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Neutral,
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub mark: Mark,
}

/// Outcome dialog of a Classic round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub correct: bool,
    pub title: String,
    pub text: String,
}

/// Sound cue for the audio surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Correct,
    Wrong,
}

/// Fixed-delay transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    NextRound,
    EnableChoices,
    ShowVerdict,
}

/// One game: the current round plus everything that outlives it
pub struct Game {
    rules: Rules,
    difficulty: Difficulty,
    state: RoundState,
    token: RoundToken,
    subject: Option<Subject>,
    choices: Vec<Choice>,
    choices_enabled: bool,
    /// Identity shown (silhouette lifted)
    revealed: bool,
    /// Wrong guesses this round
    attempts: u32,
    /// Status line under the choices
    feedback: String,
    verdict: Option<Verdict>,
    verdict_visible: bool,
    countdown: Countdown,
    /// Last second reported by the countdown
    seconds_left: u32,
    scheduler: Scheduler<Deferred>,
    score: ScoreTracker,
    catalog: NameCatalog,
    roster: Roster,
    rng: StdRng,
    requests: Vec<RoundToken>,
    cues: Vec<Cue>,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("rules", &self.rules)
            .field("difficulty", &self.difficulty)
            .field("state", &self.state)
            .field("token", &self.token)
            .field("score", &self.score.score())
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Create a game with an OS-seeded RNG. Call [`Game::start`] to begin.
    pub fn new(rules: Rules, difficulty: Difficulty) -> Self {
        Self::with_rng(rules, difficulty, StdRng::from_os_rng())
    }

    /// Create a game with a specific RNG (for testing/seeding)
    pub fn with_rng(rules: Rules, difficulty: Difficulty, rng: StdRng) -> Self {
        Self {
            rules,
            difficulty,
            state: RoundState::Loading,
            token: RoundToken::default(),
            subject: None,
            choices: Vec::new(),
            choices_enabled: false,
            revealed: false,
            attempts: 0,
            feedback: String::new(),
            verdict: None,
            verdict_visible: false,
            countdown: Countdown::new(),
            seconds_left: difficulty.time_budget(),
            scheduler: Scheduler::new(),
            score: ScoreTracker::new(),
            catalog: NameCatalog::new(),
            roster: Roster::new(),
            rng,
            requests: Vec::new(),
            cues: Vec::new(),
        }
    }

    /// Number rounds after `token`. Lookups still in flight for an earlier
    /// game then never match a round of this one.
    pub fn continue_after(mut self, token: RoundToken) -> Self {
        self.token = token;
        self
    }

    /// Start (or restart) the game from zero
    pub fn start(&mut self) {
        tracing::info!(
            "Starting {} game on {}",
            self.rules.label(),
            self.difficulty
        );
        self.score.reset();
        self.roster.reset();
        self.begin_round();
    }

    /// Alias for [`Game::start`], used from the completion screen
    pub fn restart(&mut self) {
        self.start();
    }

    /// Switch difficulty. Always resets the score and starts a fresh round.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.start();
    }

    /// Provide the distractor pool for Timed rounds.
    /// Takes effect from the next round that is built.
    pub fn set_catalog(&mut self, catalog: NameCatalog) {
        tracing::info!("Name catalog ready ({} names)", catalog.len());
        self.catalog = catalog;
    }

    /// Enter Loading for a new round
    fn begin_round(&mut self) {
        self.countdown.cancel();
        self.scheduler.cancel_all();
        self.token = self.token.next();
        self.state = RoundState::Loading;
        self.subject = None;
        self.choices.clear();
        self.choices_enabled = false;
        self.revealed = false;
        self.attempts = 0;
        self.seconds_left = self.difficulty.time_budget();
        self.feedback.clear();
        self.verdict = None;
        self.verdict_visible = false;

        match self.rules {
            Rules::Classic => {
                if self.roster.is_exhausted() {
                    tracing::info!("Roster exhausted, game complete");
                    self.state = RoundState::Completed;
                    self.feedback = "You caught them all!".to_string();
                } else if let Some(subject) = self.roster.draw(&mut self.rng) {
                    self.present(subject);
                }
            }
            Rules::Timed => {
                tracing::debug!("Round {:?} waiting for a subject", self.token);
                self.requests.push(self.token);
            }
        }
    }

    /// Subject lookups the game is waiting on (drain and hand to the fetcher)
    pub fn take_requests(&mut self) -> Vec<RoundToken> {
        mem::take(&mut self.requests)
    }

    /// Sound cues raised since the last call
    pub fn take_cues(&mut self) -> Vec<Cue> {
        mem::take(&mut self.cues)
    }

    /// Deliver a lookup result. Results for any round but the current,
    /// still-loading one are dropped.
    pub fn on_subject(&mut self, token: RoundToken, result: Result<Subject, LookupError>) {
        if token != self.token || self.state != RoundState::Loading {
            tracing::debug!(
                "Dropping stale lookup for round {:?} (current {:?})",
                token,
                self.token
            );
            return;
        }

        match result {
            Ok(subject) => self.present(subject),
            Err(error) => {
                tracing::warn!("Round {:?} lookup failed: {error}", token);
                self.state = RoundState::Failed(error.to_string());
            }
        }
    }

    /// Manual retry after a failed lookup
    pub fn retry(&mut self) {
        if matches!(self.state, RoundState::Failed(_)) {
            self.begin_round();
        }
    }

    /// Render the subject, deal choices, start the countdown
    fn present(&mut self, subject: Subject) {
        let roster_names;
        let pool: &[String] = match self.rules {
            Rules::Classic => {
                roster_names = self.roster.names();
                &roster_names
            }
            Rules::Timed => self.catalog.names(),
        };
        let labels = generate_choices(
            &subject.name,
            pool,
            self.difficulty.choice_count(),
            &mut self.rng,
        );

        tracing::info!(
            "Round {:?}: {} ({} choices)",
            self.token,
            subject.name,
            labels.len()
        );

        self.choices = labels
            .into_iter()
            .map(|label| Choice {
                label,
                mark: Mark::Neutral,
            })
            .collect();
        self.subject = Some(subject);
        self.state = RoundState::AwaitingGuess;
        self.choices_enabled = true;
        self.revealed = false;

        let events = self.countdown.start(self.difficulty.time_budget());
        self.handle_countdown(events);
    }

    /// Pick the choice at `index` (0-based)
    pub fn select(&mut self, index: usize) {
        if let Some(label) = self.choices.get(index).map(|c| c.label.clone()) {
            self.guess(&label);
        }
    }

    /// Handle a guess. Ignored unless a round is awaiting one and `label`
    /// is among its choices.
    pub fn guess(&mut self, label: &str) {
        if self.state != RoundState::AwaitingGuess || !self.choices_enabled {
            return;
        }
        if !self.choices.iter().any(|c| c.label == label) {
            return;
        }
        let Some(answer) = self.subject.as_ref().map(|s| s.name.clone()) else {
            return;
        };

        let correct = label == answer;
        self.choices_enabled = false;
        self.score.record(label, correct);
        self.mark(label, if correct { Mark::Correct } else { Mark::Incorrect });
        self.cues.push(if correct { Cue::Correct } else { Cue::Wrong });
        tracing::info!("Guessed {label}: {}", if correct { "correct" } else { "wrong" });

        match self.rules {
            Rules::Timed => self.resolve_timed_guess(correct, &answer),
            Rules::Classic => self.resolve_classic_guess(correct, &answer),
        }
    }

    fn resolve_timed_guess(&mut self, correct: bool, answer: &str) {
        if correct {
            self.countdown.cancel();
            self.revealed = true;
            self.state = RoundState::Resolved;
            self.feedback = format!("Correct! It's {answer}!");
            self.scheduler.schedule(NEXT_ROUND_DELAY, Deferred::NextRound);
            return;
        }

        self.attempts += 1;
        if self.attempts >= TIMED_ATTEMPT_CAP {
            self.countdown.cancel();
            self.score.reset_score();
            self.revealed = true;
            self.state = RoundState::Resolved;
            self.feedback = format!("Out of attempts! It was {answer}.");
            self.scheduler.schedule(FAILED_ROUND_DELAY, Deferred::NextRound);
        } else {
            // Held, not restarted: resumes when the choices unlock
            self.countdown.pause();
            self.feedback = "Not quite... one more try!".to_string();
            self.scheduler.schedule(REENABLE_DELAY, Deferred::EnableChoices);
        }
    }

    fn resolve_classic_guess(&mut self, correct: bool, answer: &str) {
        self.countdown.cancel();
        self.revealed = true;
        self.state = RoundState::Resolved;
        self.mark(answer, Mark::Correct);

        let verdict = if correct {
            self.roster.mark_guessed(answer);
            Verdict {
                correct: true,
                title: "Correct!".to_string(),
                text: format!("It's {answer}!"),
            }
        } else {
            Verdict {
                correct: false,
                title: "Incorrect!".to_string(),
                text: format!(
                    "Wrong answer! The correct answer was {answer}. Starting over..."
                ),
            }
        };
        self.show_verdict_later(verdict);
    }

    fn show_verdict_later(&mut self, verdict: Verdict) {
        self.verdict = Some(verdict);
        self.verdict_visible = false;
        self.scheduler.schedule(VERDICT_DELAY, Deferred::ShowVerdict);
    }

    /// Dismiss the Classic verdict: next round after a correct answer,
    /// a fresh game after a wrong one.
    pub fn acknowledge(&mut self) {
        if self.rules != Rules::Classic
            || self.state != RoundState::Resolved
            || !self.verdict_visible
        {
            return;
        }

        let correct = self.verdict.as_ref().is_some_and(|v| v.correct);
        if correct {
            self.begin_round();
        } else {
            self.start();
        }
    }

    /// Let `dt` pass: fire due transitions, then tick the countdown
    pub fn advance(&mut self, dt: Duration) {
        for task in self.scheduler.advance(dt) {
            self.run(task);
        }
        let events = self.countdown.advance(dt);
        self.handle_countdown(events);
    }

    fn run(&mut self, task: Deferred) {
        match task {
            Deferred::NextRound => {
                if self.state == RoundState::Resolved {
                    self.begin_round();
                }
            }
            Deferred::EnableChoices => {
                if self.state == RoundState::AwaitingGuess {
                    self.choices_enabled = true;
                    self.feedback.clear();
                    self.countdown.resume();
                }
            }
            Deferred::ShowVerdict => {
                self.verdict_visible = self.verdict.is_some();
            }
        }
    }

    fn handle_countdown(&mut self, events: Vec<CountdownEvent>) {
        for event in events {
            match event {
                CountdownEvent::Tick { id, remaining } => {
                    if id == self.countdown.id() {
                        self.seconds_left = remaining;
                    }
                }
                CountdownEvent::Expired { id } => {
                    if id == self.countdown.id() {
                        self.on_timeout();
                    }
                }
            }
        }
    }

    /// Countdown reached zero while awaiting a guess
    fn on_timeout(&mut self) {
        if self.state != RoundState::AwaitingGuess {
            return;
        }
        let Some(answer) = self.subject.as_ref().map(|s| s.name.clone()) else {
            return;
        };

        tracing::info!("Round {:?} timed out", self.token);
        self.choices_enabled = false;
        self.revealed = true;
        self.state = RoundState::Resolved;
        self.mark(&answer, Mark::Correct);

        match self.rules {
            Rules::Timed => {
                self.feedback = format!("Time's up! It was {answer}.");
                self.scheduler.schedule(NEXT_ROUND_DELAY, Deferred::NextRound);
            }
            Rules::Classic => {
                self.show_verdict_later(Verdict {
                    correct: false,
                    title: "Time's up!".to_string(),
                    text: format!("The correct answer was {answer}. Starting over..."),
                });
            }
        }
    }

    fn mark(&mut self, label: &str, mark: Mark) {
        if let Some(choice) = self.choices.iter_mut().find(|c| c.label == label) {
            choice.mark = mark;
        }
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn token(&self) -> RoundToken {
        self.token
    }

    pub fn subject(&self) -> Option<&Subject> {
        self.subject.as_ref()
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn choices_enabled(&self) -> bool {
        self.choices_enabled
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Wrong guesses so far this round
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    /// Seconds left, as of the latest countdown tick
    pub fn time_remaining(&self) -> u32 {
        self.seconds_left
    }

    /// Countdown is live: not stopped, not held after a wrong guess
    pub fn timer_running(&self) -> bool {
        self.countdown.is_running() && !self.countdown.is_paused()
    }

    pub fn score(&self) -> &ScoreTracker {
        &self.score
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// The Classic verdict, once it is due on screen
    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref().filter(|_| self.verdict_visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::roster::LOCAL_ROSTER;
    use crate::pokedex::ImageRef;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn pikachu() -> Subject {
        Subject {
            name: "Pikachu".to_string(),
            image: ImageRef::Sprite("https://example.test/25.png".to_string()),
            types: vec!["Electric".to_string()],
            height_dm: 4,
            weight_hg: 60,
        }
    }

    fn catalog() -> NameCatalog {
        NameCatalog::from_raw([
            "bulbasaur",
            "charmander",
            "squirtle",
            "pikachu",
            "eevee",
            "gengar",
            "snorlax",
            "mew",
        ])
    }

    /// A Timed game on Normal with Pikachu on screen
    fn timed_round() -> Game {
        let mut game = Game::with_rng(Rules::Timed, Difficulty::Normal, StdRng::seed_from_u64(1));
        game.set_catalog(catalog());
        game.start();
        let requests = game.take_requests();
        assert_eq!(requests.len(), 1);
        game.on_subject(requests[0], Ok(pikachu()));
        assert_eq!(*game.state(), RoundState::AwaitingGuess);
        game
    }

    fn wrong_label(game: &Game) -> String {
        game.choices()
            .iter()
            .find(|c| c.label != "Pikachu")
            .map(|c| c.label.clone())
            .unwrap()
    }

    fn classic_game(seed: u64) -> Game {
        let mut game = Game::with_rng(Rules::Classic, Difficulty::Normal, StdRng::seed_from_u64(seed));
        game.start();
        game
    }

    fn answer(game: &Game) -> String {
        game.subject().unwrap().name.clone()
    }

    #[test]
    fn test_timed_round_loads_through_request() {
        let mut game = Game::with_rng(Rules::Timed, Difficulty::Normal, StdRng::seed_from_u64(1));
        game.start();
        assert_eq!(*game.state(), RoundState::Loading);
        assert!(game.choices().is_empty());
        assert!(!game.choices_enabled());

        let requests = game.take_requests();
        assert_eq!(requests, vec![game.token()]);
        assert!(game.take_requests().is_empty());
    }

    #[test]
    fn test_round_starts_silhouetted_with_full_timer() {
        let game = timed_round();
        assert_eq!(game.choices().len(), 4);
        assert_eq!(game.choices().iter().filter(|c| c.label == "Pikachu").count(), 1);
        assert!(game.choices_enabled());
        assert!(!game.is_revealed());
        assert_eq!(game.time_remaining(), 12);
    }

    #[test]
    fn test_empty_catalog_degrades_to_single_choice() {
        let mut game = Game::with_rng(Rules::Timed, Difficulty::Hard, StdRng::seed_from_u64(1));
        game.start();
        let token = game.take_requests()[0];
        game.on_subject(token, Ok(pikachu()));

        assert_eq!(game.choices().len(), 1);
        assert_eq!(game.choices()[0].label, "Pikachu");
    }

    #[test]
    fn test_timed_correct_first_attempt() {
        let mut game = timed_round();
        let token = game.token();

        game.guess("Pikachu");

        assert_eq!(game.score().score(), 1);
        assert_eq!(*game.state(), RoundState::Resolved);
        assert!(game.is_revealed());
        assert!(!game.choices_enabled());
        assert_eq!(game.take_cues(), vec![Cue::Correct]);

        game.advance(ms(1199));
        assert_eq!(*game.state(), RoundState::Resolved);

        game.advance(ms(1));
        assert_eq!(*game.state(), RoundState::Loading);
        assert_eq!(game.attempts(), 0);
        assert_eq!(game.token(), token.next());
        assert_eq!(game.take_requests(), vec![token.next()]);
    }

    #[test]
    fn test_timed_wrong_first_attempt_reenables() {
        let mut game = timed_round();
        game.advance(secs(3));
        assert_eq!(game.time_remaining(), 9);

        let wrong = wrong_label(&game);
        game.guess(&wrong);

        assert_eq!(game.attempts(), 1);
        assert_eq!(*game.state(), RoundState::AwaitingGuess);
        assert!(!game.choices_enabled());
        assert!(!game.is_revealed());
        assert_eq!(game.score().total_guesses(), 1);
        assert_eq!(game.take_cues(), vec![Cue::Wrong]);

        // Locked choices ignore further guesses
        game.guess("Pikachu");
        assert_eq!(game.score().total_guesses(), 1);

        game.advance(ms(899));
        assert!(!game.choices_enabled());

        game.advance(ms(1));
        assert!(game.choices_enabled());
        assert_eq!(*game.state(), RoundState::AwaitingGuess);
        // Countdown carried on from where it was
        assert_eq!(game.time_remaining(), 9);
    }

    #[test]
    fn test_timer_held_while_choices_locked() {
        let mut game = timed_round();
        assert!(game.timer_running());

        let wrong = wrong_label(&game);
        game.guess(&wrong);
        assert!(!game.timer_running());
        assert_eq!(game.feedback(), "Not quite... one more try!");

        game.advance(REENABLE_DELAY);
        assert!(game.timer_running());
        assert!(game.feedback().is_empty());

        game.guess("Pikachu");
        assert!(!game.timer_running());
        assert_eq!(game.feedback(), "Correct! It's Pikachu!");
    }

    #[test]
    fn test_round_numbering_continues_after_given_token() {
        let mut game = Game::with_rng(Rules::Timed, Difficulty::Normal, StdRng::seed_from_u64(1))
            .continue_after(RoundToken(41));
        game.start();
        assert_eq!(game.take_requests(), vec![RoundToken(42)]);

        // A result tagged for an earlier game's round is ignored
        game.on_subject(RoundToken(1), Ok(pikachu()));
        assert_eq!(*game.state(), RoundState::Loading);

        game.on_subject(RoundToken(42), Ok(pikachu()));
        assert_eq!(*game.state(), RoundState::AwaitingGuess);
    }

    #[test]
    fn test_timed_correct_second_attempt_scores() {
        let mut game = timed_round();
        let wrong = wrong_label(&game);
        game.guess(&wrong);
        game.advance(ms(900));

        game.guess("Pikachu");
        assert_eq!(game.score().score(), 1);
        assert_eq!(game.score().total_guesses(), 2);
        assert_eq!(*game.state(), RoundState::Resolved);
    }

    #[test]
    fn test_timed_wrong_second_attempt_resets_score() {
        let mut game = timed_round();
        game.guess("Pikachu");
        game.advance(NEXT_ROUND_DELAY);
        let token = game.take_requests()[0];
        game.on_subject(token, Ok(pikachu()));
        assert_eq!(game.score().score(), 1);

        let wrong = wrong_label(&game);
        game.guess(&wrong);
        game.advance(REENABLE_DELAY);
        let other = game
            .choices()
            .iter()
            .find(|c| c.label != "Pikachu" && c.label != wrong)
            .map(|c| c.label.clone())
            .unwrap();
        game.guess(&other);

        assert_eq!(game.score().score(), 0);
        assert_eq!(game.score().total_guesses(), 3);
        assert_eq!(*game.state(), RoundState::Resolved);
        assert!(game.is_revealed());
        assert!(!game.choices_enabled());

        game.advance(ms(1499));
        assert_eq!(*game.state(), RoundState::Resolved);
        game.advance(ms(1));
        assert_eq!(*game.state(), RoundState::Loading);
    }

    #[test]
    fn test_timed_timeout_reveals_without_scoring() {
        let mut game = timed_round();
        game.guess("Pikachu");
        game.advance(NEXT_ROUND_DELAY);
        let token = game.take_requests()[0];
        game.on_subject(token, Ok(pikachu()));

        for _ in 0..12 {
            game.advance(secs(1));
        }

        assert_eq!(game.time_remaining(), 0);
        assert_eq!(*game.state(), RoundState::Resolved);
        assert!(game.is_revealed());
        assert_eq!(game.score().score(), 1);
        assert_eq!(game.score().total_guesses(), 1);
        assert!(game
            .choices()
            .iter()
            .any(|c| c.label == "Pikachu" && c.mark == Mark::Correct));

        game.advance(ms(1199));
        assert_eq!(*game.state(), RoundState::Resolved);
        game.advance(ms(1));
        assert_eq!(*game.state(), RoundState::Loading);
    }

    #[test]
    fn test_guess_outside_choices_is_ignored() {
        let mut game = timed_round();
        game.guess("Missingno");
        assert_eq!(game.score().total_guesses(), 0);
        assert!(game.choices_enabled());
    }

    #[test]
    fn test_select_by_index() {
        let mut game = timed_round();
        let index = game.choices().iter().position(|c| c.label == "Pikachu").unwrap();
        game.select(index);
        assert_eq!(game.score().score(), 1);

        // Out of range does nothing
        game.select(99);
        assert_eq!(game.score().total_guesses(), 1);
    }

    #[test]
    fn test_stale_lookup_is_dropped() {
        let mut game = Game::with_rng(Rules::Timed, Difficulty::Normal, StdRng::seed_from_u64(1));
        game.start();
        let old = game.take_requests()[0];

        game.set_difficulty(Difficulty::Hard);
        let current = game.take_requests()[0];
        assert_ne!(old, current);

        game.on_subject(old, Ok(pikachu()));
        assert_eq!(*game.state(), RoundState::Loading);
        assert!(game.subject().is_none());

        game.on_subject(current, Ok(pikachu()));
        assert_eq!(*game.state(), RoundState::AwaitingGuess);
        assert_eq!(game.time_remaining(), 10);
    }

    #[test]
    fn test_duplicate_lookup_for_current_round_is_dropped() {
        let mut game = timed_round();
        let token = game.token();
        game.advance(secs(2));

        game.on_subject(token, Ok(pikachu()));
        assert_eq!(game.time_remaining(), 10);
    }

    #[test]
    fn test_new_round_cancels_previous_timer() {
        let mut game = timed_round();
        game.advance(secs(11));
        assert_eq!(game.time_remaining(), 1);

        game.set_difficulty(Difficulty::Easy);
        let token = game.take_requests()[0];
        game.on_subject(token, Ok(pikachu()));

        // The old run would have expired within the next second
        game.advance(secs(1));
        assert_eq!(*game.state(), RoundState::AwaitingGuess);
        assert_eq!(game.time_remaining(), 14);
    }

    #[test]
    fn test_difficulty_change_resets_score_and_pending_transition() {
        let mut game = timed_round();
        game.guess("Pikachu");
        assert_eq!(game.score().score(), 1);

        game.set_difficulty(Difficulty::Hard);
        assert_eq!(game.score().score(), 0);
        assert_eq!(game.score().total_guesses(), 0);
        assert!(game.score().history().is_empty());
        assert_eq!(game.difficulty(), Difficulty::Hard);

        let token = game.token();
        // The pending next-round transition must not fire into the new round
        game.advance(NEXT_ROUND_DELAY);
        assert_eq!(game.token(), token);
        assert_eq!(*game.state(), RoundState::Loading);
    }

    #[test]
    fn test_lookup_failure_enters_failed_and_retries() {
        let mut game = Game::with_rng(Rules::Timed, Difficulty::Normal, StdRng::seed_from_u64(1));
        game.start();
        let token = game.take_requests()[0];

        game.on_subject(
            token,
            Err(LookupError::Exhausted {
                attempts: 5,
                last: Box::new(LookupError::MissingSprite(10)),
            }),
        );
        assert!(matches!(game.state(), RoundState::Failed(message) if message.contains("5 attempts")));

        game.retry();
        assert_eq!(*game.state(), RoundState::Loading);
        assert_eq!(game.take_requests(), vec![token.next()]);
    }

    #[test]
    fn test_classic_round_draws_from_roster() {
        let game = classic_game(5);
        assert_eq!(*game.state(), RoundState::AwaitingGuess);
        let subject = game.subject().unwrap();
        assert!(matches!(subject.image, ImageRef::Emoji(_)));
        assert_eq!(game.choices().len(), 4);
        assert!(game
            .choices()
            .iter()
            .all(|c| LOCAL_ROSTER.iter().any(|e| e.name == c.label)));
    }

    #[test]
    fn test_classic_correct_guess_waits_for_acknowledgment() {
        let mut game = classic_game(5);
        let name = answer(&game);
        game.guess(&name);

        assert_eq!(game.score().score(), 1);
        assert!(game.roster().is_guessed(&name));
        assert_eq!(*game.state(), RoundState::Resolved);

        // Verdict is not on screen yet, so acknowledging does nothing
        game.acknowledge();
        assert_eq!(*game.state(), RoundState::Resolved);

        game.advance(VERDICT_DELAY);
        let verdict = game.verdict().unwrap();
        assert!(verdict.correct);
        assert_eq!(verdict.text, format!("It's {}!", name));

        // No automatic transition in Classic games
        game.advance(secs(30));
        assert_eq!(*game.state(), RoundState::Resolved);

        game.acknowledge();
        assert_eq!(*game.state(), RoundState::AwaitingGuess);
        assert_ne!(answer(&game), name);
        assert_eq!(game.score().score(), 1);
    }

    #[test]
    fn test_classic_wrong_guess_restarts_game() {
        let mut game = classic_game(8);
        let first = answer(&game);
        game.guess(&first);
        game.advance(VERDICT_DELAY);
        game.acknowledge();

        let name = answer(&game);
        let wrong = game
            .choices()
            .iter()
            .find(|c| c.label != name)
            .map(|c| c.label.clone())
            .unwrap();
        game.guess(&wrong);

        assert!(game
            .choices()
            .iter()
            .any(|c| c.label == name && c.mark == Mark::Correct));
        assert!(game
            .choices()
            .iter()
            .any(|c| c.label == wrong && c.mark == Mark::Incorrect));

        game.advance(VERDICT_DELAY);
        assert!(!game.verdict().unwrap().correct);

        game.acknowledge();
        assert_eq!(game.score().score(), 0);
        assert!(game.score().history().is_empty());
        assert_eq!(game.roster().guessed_count(), 0);
        assert_eq!(*game.state(), RoundState::AwaitingGuess);
    }

    #[test]
    fn test_classic_timeout_counts_as_wrong() {
        let mut game = classic_game(3);
        game.advance(secs(12));

        assert_eq!(*game.state(), RoundState::Resolved);
        assert!(game.is_revealed());
        game.advance(VERDICT_DELAY);
        let verdict = game.verdict().unwrap();
        assert!(!verdict.correct);
        assert_eq!(verdict.title, "Time's up!");
    }

    #[test]
    fn test_classic_roster_exhaustion_completes_game() {
        let mut game = classic_game(21);
        for _ in 0..LOCAL_ROSTER.len() {
            let name = answer(&game);
            game.guess(&name);
            game.advance(VERDICT_DELAY);
            game.acknowledge();
        }

        assert_eq!(*game.state(), RoundState::Completed);
        assert_eq!(game.score().score(), LOCAL_ROSTER.len() as u32);
        assert!(game.choices().is_empty());

        // No further rounds until restarted
        game.guess("Pikachu");
        game.acknowledge();
        game.advance(secs(60));
        assert_eq!(*game.state(), RoundState::Completed);

        game.restart();
        assert_eq!(*game.state(), RoundState::AwaitingGuess);
        assert_eq!(game.score().score(), 0);
    }

    #[test]
    fn test_acknowledge_ignored_in_timed_games() {
        let mut game = timed_round();
        game.guess("Pikachu");
        game.acknowledge();
        assert_eq!(*game.state(), RoundState::Resolved);
    }
}
