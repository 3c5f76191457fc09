//! Application screen state management
//!
//! Handles transitions between the application screens:
//! - Main menu (rules and difficulty)
//! - Playing (Classic or Timed)
//! - Startup error

use crate::config::Config;
use crate::game::{Difficulty, NameCatalog, RoundToken};
use crate::pokedex::{Completion, Fetcher};

use super::state::{Cue, Game, RoundState, Rules};

use std::time::Duration;

/// Menu option on the main screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    Timed,
    Classic,
    Quit,
}

impl MenuOption {
    /// Get all menu options in order
    pub fn all() -> &'static [MenuOption] {
        &[MenuOption::Timed, MenuOption::Classic, MenuOption::Quit]
    }

    /// Get the display label for this option
    pub fn label(&self) -> &'static str {
        match self {
            MenuOption::Timed => "Timed (PokéAPI)",
            MenuOption::Classic => "Classic (offline roster)",
            MenuOption::Quit => "Quit",
        }
    }
}

/// The current application screen
#[derive(Debug)]
pub enum Screen {
    /// Main menu
    Menu {
        selected: usize,
        difficulty: Difficulty,
    },
    /// Playing a game
    Playing { game: Game },
    /// Something went wrong outside a round
    Error { message: String },
}

/// Main application coordinator
pub struct AppCoordinator {
    /// Current screen
    pub screen: Screen,
    /// Whether the application should quit
    pub should_quit: bool,
    fetcher: Option<Fetcher>,
    /// Distractor names, kept across games once loaded
    catalog: NameCatalog,
    catalog_error: Option<String>,
    /// Last round token handed out, carried across games
    last_token: RoundToken,
}

impl AppCoordinator {
    /// Create a coordinator starting at the menu.
    ///
    /// Without a fetcher only Classic games can be played.
    pub fn new(config: &Config, fetcher: Option<Fetcher>) -> Self {
        Self {
            screen: Screen::Menu {
                selected: 0,
                difficulty: config.difficulty,
            },
            should_quit: false,
            fetcher,
            catalog: NameCatalog::new(),
            catalog_error: None,
            last_token: RoundToken::default(),
        }
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Go back to the main menu, keeping the last difficulty
    pub fn go_to_menu(&mut self) {
        let difficulty = match &self.screen {
            Screen::Menu { difficulty, .. } => *difficulty,
            Screen::Playing { game } => {
                self.last_token = game.token();
                game.difficulty()
            }
            Screen::Error { .. } => Difficulty::default(),
        };
        self.screen = Screen::Menu {
            selected: 0,
            difficulty,
        };
    }

    /// Esc: leave the current screen, quit from the menu
    pub fn back(&mut self) {
        match self.screen {
            Screen::Menu { .. } => self.quit(),
            _ => self.go_to_menu(),
        }
    }

    pub fn catalog(&self) -> &NameCatalog {
        &self.catalog
    }

    /// Why the name listing could not be loaded, if it failed
    pub fn catalog_error(&self) -> Option<&str> {
        self.catalog_error.as_deref()
    }

    pub fn has_fetcher(&self) -> bool {
        self.fetcher.as_ref().is_some_and(Fetcher::is_alive)
    }

    /// Handle menu navigation (up)
    pub fn menu_up(&mut self) {
        if let Screen::Menu { selected, .. } = &mut self.screen {
            if *selected > 0 {
                *selected -= 1;
            }
        }
    }

    /// Handle menu navigation (down)
    pub fn menu_down(&mut self) {
        if let Screen::Menu { selected, .. } = &mut self.screen {
            if *selected < MenuOption::all().len() - 1 {
                *selected += 1;
            }
        }
    }

    /// Handle menu selection (Enter)
    pub fn menu_select(&mut self) {
        let (selected, difficulty) = match &self.screen {
            Screen::Menu {
                selected,
                difficulty,
            } => (*selected, *difficulty),
            _ => return,
        };

        match MenuOption::all()[selected] {
            MenuOption::Timed => {
                if !self.has_fetcher() {
                    self.screen = Screen::Error {
                        message: "Timed games need the PokéAPI client, which failed to start"
                            .to_string(),
                    };
                    return;
                }
                self.start_game(Rules::Timed, difficulty);
            }
            MenuOption::Classic => self.start_game(Rules::Classic, difficulty),
            MenuOption::Quit => self.quit(),
        }
    }

    fn start_game(&mut self, rules: Rules, difficulty: Difficulty) {
        let mut game = Game::new(rules, difficulty).continue_after(self.last_token);
        if rules == Rules::Timed {
            game.set_catalog(self.catalog.clone());
        }
        game.start();
        self.screen = Screen::Playing { game };
        self.pump_requests();
    }

    /// Pick a difficulty: in the menu for the next game, in a game it
    /// restarts on the new level.
    pub fn set_difficulty(&mut self, level: Difficulty) {
        match &mut self.screen {
            Screen::Menu { difficulty, .. } => *difficulty = level,
            Screen::Playing { game } => {
                game.set_difficulty(level);
                self.pump_requests();
            }
            Screen::Error { .. } => {}
        }
    }

    /// Enter: select in the menu, acknowledge in a game
    pub fn enter(&mut self) {
        match self.screen {
            Screen::Menu { .. } => self.menu_select(),
            Screen::Playing { .. } => self.acknowledge(),
            Screen::Error { .. } => self.go_to_menu(),
        }
    }

    /// Choice key `1`..`6` (0-based `index`)
    pub fn choose(&mut self, index: usize) {
        if let Screen::Playing { game } = &mut self.screen {
            game.select(index);
        }
    }

    /// Enter while playing
    pub fn acknowledge(&mut self) {
        if let Screen::Playing { game } = &mut self.screen {
            game.acknowledge();
            self.pump_requests();
        }
    }

    /// `r`: retry a failed lookup or restart a completed game
    pub fn retry_or_restart(&mut self) {
        if let Screen::Playing { game } = &mut self.screen {
            match game.state().clone() {
                RoundState::Failed(_) => game.retry(),
                RoundState::Completed => game.restart(),
                _ => return,
            }
            self.pump_requests();
        }
    }

    /// Let `dt` pass for the active game
    pub fn advance(&mut self, dt: Duration) {
        if let Screen::Playing { game } = &mut self.screen {
            game.advance(dt);
            self.pump_requests();
        }
    }

    /// Sound cues raised by the active game
    pub fn take_cues(&mut self) -> Vec<Cue> {
        match &mut self.screen {
            Screen::Playing { game } => game.take_cues(),
            _ => Vec::new(),
        }
    }

    /// Poll for updates (call regularly)
    pub fn poll(&mut self) {
        let completions = match &mut self.fetcher {
            Some(fetcher) => fetcher.poll(),
            None => return,
        };

        for completion in completions {
            match completion {
                Completion::Catalog(Ok(raw)) => {
                    self.catalog = NameCatalog::from_raw(raw);
                    self.catalog_error = None;
                    if let Screen::Playing { game } = &mut self.screen {
                        if game.rules() == Rules::Timed {
                            game.set_catalog(self.catalog.clone());
                        }
                    }
                }
                Completion::Catalog(Err(error)) => {
                    tracing::warn!("Name listing unavailable, choices will be sparse: {error}");
                    self.catalog_error = Some(error.to_string());
                }
                Completion::Subject { token, result } => {
                    if let Screen::Playing { game } = &mut self.screen {
                        game.on_subject(token, result);
                    } else {
                        tracing::debug!("Dropping lookup for round {:?}, no game running", token);
                    }
                }
            }
        }
    }

    /// Hand the game's pending lookups to the fetcher
    fn pump_requests(&mut self) {
        let Screen::Playing { game } = &mut self.screen else {
            return;
        };
        let requests = game.take_requests();
        if requests.is_empty() {
            return;
        }
        match &mut self.fetcher {
            Some(fetcher) => {
                for token in requests {
                    fetcher.request_subject(token);
                }
            }
            None => tracing::warn!("No fetcher, {} lookups dropped", requests.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pokedex::{FetchSettings, ImageRef, LookupError, PokemonLookup, RetryPolicy, Subject};
    use std::sync::Mutex;
    use std::thread;
    use std::time::Instant;

    /// Every id resolves instantly
    struct AlwaysFound;

    impl PokemonLookup for AlwaysFound {
        fn fetch_by_id(&self, id: u32) -> Result<Subject, LookupError> {
            Ok(Subject {
                name: format!("Mon{}", id),
                image: ImageRef::Sprite(format!("https://example.test/{}.png", id)),
                types: vec!["Normal".to_string()],
                height_dm: 3,
                weight_hg: 30,
            })
        }

        fn list_names(&self, limit: u32) -> Result<Vec<String>, LookupError> {
            Ok((1..=limit).map(|i| format!("mon{}", i)).collect())
        }
    }

    /// Fails the first lookup, then always succeeds, slowly
    struct FirstLookupFails {
        calls: Mutex<u32>,
    }

    impl PokemonLookup for FirstLookupFails {
        fn fetch_by_id(&self, id: u32) -> Result<Subject, LookupError> {
            thread::sleep(Duration::from_millis(100));
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if *calls == 1 {
                return Err(LookupError::NotFound(id));
            }
            AlwaysFound.fetch_by_id(id)
        }

        fn list_names(&self, limit: u32) -> Result<Vec<String>, LookupError> {
            AlwaysFound.list_names(limit)
        }
    }

    fn coordinator_with_fetcher() -> AppCoordinator {
        let settings = FetchSettings {
            roster_size: 20,
            retry: RetryPolicy::default(),
        };
        let mut fetcher = Fetcher::spawn(AlwaysFound, settings).unwrap();
        fetcher.request_catalog();
        AppCoordinator::new(&Config::default(), Some(fetcher))
    }

    /// Poll until the active game leaves Loading or a second passed
    fn poll_until_loaded(app: &mut AppCoordinator) {
        let deadline = Instant::now() + Duration::from_secs(1);
        while Instant::now() < deadline {
            app.poll();
            if let Screen::Playing { game } = &app.screen {
                if *game.state() != RoundState::Loading {
                    return;
                }
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn game(app: &AppCoordinator) -> &Game {
        match &app.screen {
            Screen::Playing { game } => game,
            other => panic!("not playing: {:?}", other),
        }
    }

    #[test]
    fn test_menu_navigation_bounds() {
        let mut app = AppCoordinator::new(&Config::default(), None);
        app.menu_up();
        app.menu_down();
        app.menu_down();
        app.menu_down();
        assert!(matches!(app.screen, Screen::Menu { selected: 2, .. }));
    }

    #[test]
    fn test_menu_difficulty_carries_into_game() {
        let mut app = AppCoordinator::new(&Config::default(), None);
        app.set_difficulty(Difficulty::Hard);
        app.menu_down();
        app.menu_select();

        let game = game(&app);
        assert_eq!(game.rules(), Rules::Classic);
        assert_eq!(game.difficulty(), Difficulty::Hard);
        assert_eq!(game.choices().len(), 6);
    }

    #[test]
    fn test_timed_without_fetcher_shows_error() {
        let mut app = AppCoordinator::new(&Config::default(), None);
        app.menu_select();
        assert!(matches!(app.screen, Screen::Error { .. }));

        app.back();
        assert!(matches!(app.screen, Screen::Menu { .. }));
        app.back();
        assert!(app.should_quit);
    }

    #[test]
    fn test_timed_game_loads_subject_through_fetcher() {
        let mut app = coordinator_with_fetcher();
        app.menu_select();
        assert_eq!(*game(&app).state(), RoundState::Loading);

        poll_until_loaded(&mut app);

        let game = game(&app);
        assert_eq!(*game.state(), RoundState::AwaitingGuess);
        assert!(game.subject().unwrap().name.starts_with("Mon"));
        assert!(!app.catalog().is_empty());
    }

    #[test]
    fn test_difficulty_change_mid_game_requests_new_subject() {
        let mut app = coordinator_with_fetcher();
        app.menu_select();
        poll_until_loaded(&mut app);
        let first = game(&app).token();

        app.set_difficulty(Difficulty::Easy);
        assert_eq!(*game(&app).state(), RoundState::Loading);
        poll_until_loaded(&mut app);

        let game = game(&app);
        assert_eq!(game.token(), first.next());
        assert_eq!(*game.state(), RoundState::AwaitingGuess);
        assert_eq!(game.time_remaining(), 15);
    }

    #[test]
    fn test_lookup_from_abandoned_game_is_ignored() {
        let settings = FetchSettings {
            roster_size: 20,
            retry: RetryPolicy {
                max_attempts: 1,
                ..RetryPolicy::default()
            },
        };
        let lookup = FirstLookupFails {
            calls: Mutex::new(0),
        };
        let fetcher = Fetcher::spawn(lookup, settings).unwrap();
        let mut app = AppCoordinator::new(&Config::default(), Some(fetcher));

        // Start a Timed game, leave before its lookup lands, start another
        app.menu_select();
        let abandoned = game(&app).token();
        app.back();
        app.menu_select();
        assert_ne!(game(&app).token(), abandoned);

        poll_until_loaded(&mut app);

        let game = game(&app);
        assert_eq!(*game.state(), RoundState::AwaitingGuess);
        assert!(game.subject().is_some());
    }

    #[test]
    fn test_cues_flow_out_of_game() {
        let mut app = AppCoordinator::new(&Config::default(), None);
        app.menu_down();
        app.menu_select();

        let answer = game(&app).subject().unwrap().name.clone();
        let index = game(&app)
            .choices()
            .iter()
            .position(|c| c.label == answer)
            .unwrap();
        app.choose(index);

        assert_eq!(app.take_cues(), vec![Cue::Correct]);
        assert!(app.take_cues().is_empty());
    }
}
