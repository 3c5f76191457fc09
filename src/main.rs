//! Who's That Pokémon? - a terminal silhouette quiz
//!
//! Guess the Pokémon from its outline before the timer runs out.

mod app;
mod config;
mod game;
mod logging;
mod pokedex;
mod tui;

use anyhow::Context;
use app::AppCoordinator;
use config::Config;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use game::Difficulty;
use pokedex::{Fetcher, PokeApi};
use std::time::{Duration, Instant};
use tui::Tui;

fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("reading configuration")?;
    // A session without a log file is still playable
    let log_path = logging::init(&config.log_filter);

    let fetcher = match start_fetcher(&config) {
        Ok(fetcher) => Some(fetcher),
        Err(error) => {
            tracing::error!("PokéAPI client unavailable, only Classic games: {error:#}");
            None
        }
    };

    let mut app = AppCoordinator::new(&config, fetcher);

    let mut terminal = Tui::new().context("opening terminal")?;
    terminal.enter().context("entering raw mode")?;

    let result = run(&mut terminal, &mut app);

    // Terminal cleanup happens automatically via Tui::drop
    drop(terminal);
    if let Err(error) = &log_path {
        eprintln!("Logging disabled: {error}");
    }
    result
}

fn start_fetcher(config: &Config) -> anyhow::Result<Fetcher> {
    let api = PokeApi::new(&config.api_base, config.http_timeout)?;
    let mut fetcher = Fetcher::spawn(api, config.fetch_settings())?;
    fetcher.request_catalog();
    Ok(fetcher)
}

fn run(terminal: &mut Tui, app: &mut AppCoordinator) -> anyhow::Result<()> {
    let frame_rate = Duration::from_millis(50);
    let mut last_tick = Instant::now();

    loop {
        app.poll();
        terminal.draw(|frame| tui::render(frame, app))?;

        let timeout = frame_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key.code);
                }
            }
        }

        let now = Instant::now();
        app.advance(now - last_tick);
        last_tick = now;

        if !app.take_cues().is_empty() {
            terminal.bell()?;
        }

        if app.should_quit {
            break;
        }
    }

    tracing::info!("Bye");
    Ok(())
}

fn handle_key(app: &mut AppCoordinator, code: KeyCode) {
    match code {
        KeyCode::Esc => app.back(),
        KeyCode::Up => app.menu_up(),
        KeyCode::Down => app.menu_down(),
        KeyCode::Enter => app.enter(),
        KeyCode::Char(c @ '1'..='6') => {
            let index = c as usize - '1' as usize;
            app.choose(index);
        }
        KeyCode::Char('e') => app.set_difficulty(Difficulty::Easy),
        KeyCode::Char('n') => app.set_difficulty(Difficulty::Normal),
        KeyCode::Char('h') => app.set_difficulty(Difficulty::Hard),
        KeyCode::Char('r') => app.retry_or_restart(),
        KeyCode::Char('q') => app.quit(),
        _ => {}
    }
}
