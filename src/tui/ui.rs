//! UI rendering using ratatui
//!
//! Supports multiple screens:
//! - Menu: game rules and difficulty
//! - Playing: subject panel, choices, score sidebar, verdict popup
//! - Error: error message display

use crate::app::state::TIMED_ATTEMPT_CAP;
use crate::app::{AppCoordinator, Choice, Game, Mark, MenuOption, RoundState, Rules, Screen, Verdict};
use crate::game::{Difficulty, Roster, ScoreTracker};
use crate::pokedex::{ImageRef, Subject};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

const SILHOUETTE: &str = r#"
   ▄▄▄▄▄
  █▀   ▀█
      ▄█▀
     █▀
     ▀
     █
"#;

/// Render the appropriate screen based on app state
pub fn render(frame: &mut Frame, coordinator: &AppCoordinator) {
    match &coordinator.screen {
        Screen::Menu {
            selected,
            difficulty,
        } => {
            render_menu(frame, *selected, *difficulty, coordinator);
        }
        Screen::Playing { game } => {
            render_game(frame, game);
        }
        Screen::Error { message } => {
            render_error(frame, message);
        }
    }
}

/// Render the main menu
fn render_menu(frame: &mut Frame, selected: usize, difficulty: Difficulty, coordinator: &AppCoordinator) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Logo
            Constraint::Length(2), // Difficulty
            Constraint::Length(1), // Catalog status
            Constraint::Min(5),    // Menu options
            Constraint::Length(2), // Footer
        ])
        .margin(2)
        .split(area);

    let logo = r#"
__        ___           _       _____ _           _   ___
\ \      / / |__   ___ ( )___  |_   _| |__   __ _| |_|__ \
 \ \ /\ / /| '_ \ / _ \|// __|   | | | '_ \ / _` | __| / /
  \ V  V / | | | | (_) | \__ \   | | | | | | (_| | |_ |_|
   \_/\_/  |_| |_|\___/  |___/   |_| |_| |_|\__,_|\__|(_)
"#;
    let logo_widget = Paragraph::new(logo)
        .style(Style::default().fg(Color::Yellow).bold())
        .alignment(Alignment::Center);
    frame.render_widget(logo_widget, layout[0]);

    let levels: Vec<Span> = Difficulty::all()
        .iter()
        .flat_map(|level| {
            let style = if *level == difficulty {
                Style::default().fg(Color::Black).bg(Color::Cyan).bold()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            [
                Span::styled(format!(" {} ", level.label()), style),
                Span::raw(" "),
            ]
        })
        .collect();
    let difficulty_widget = Paragraph::new(Line::from(levels)).alignment(Alignment::Center);
    frame.render_widget(difficulty_widget, layout[1]);

    let (status, color) = match coordinator.catalog_error() {
        Some(error) => (format!("Name list unavailable: {}", error), Color::Red),
        None if coordinator.catalog().is_empty() => {
            ("Loading names...".to_string(), Color::DarkGray)
        }
        None => (
            format!("{} names loaded", coordinator.catalog().len()),
            Color::DarkGray,
        ),
    };
    let status_widget = Paragraph::new(status)
        .style(Style::default().fg(color))
        .alignment(Alignment::Center);
    frame.render_widget(status_widget, layout[2]);

    let items: Vec<ListItem> = MenuOption::all()
        .iter()
        .enumerate()
        .map(|(i, opt)| {
            let style = if i == selected {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::White)
            };
            let prefix = if i == selected { "> " } else { "  " };
            ListItem::new(format!("{}{}", prefix, opt.label())).style(style)
        })
        .collect();
    frame.render_widget(List::new(items), layout[3]);

    let footer = Paragraph::new("↑↓ Navigate  e/n/h Difficulty  Enter Select  Esc Quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, layout[4]);
}

fn render_error(frame: &mut Frame, message: &str) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Percentage(40),
        ])
        .margin(2)
        .split(area);

    let error = Paragraph::new(format!("Error: {}", message))
        .style(Style::default().fg(Color::Red))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(error, layout[1]);

    let hint = Paragraph::new("Press Esc to go back")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(hint, layout[2]);
}

fn render_game(frame: &mut Frame, game: &Game) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header: title, difficulty, timer
            Constraint::Min(0),    // Round + sidebar
            Constraint::Length(1), // Key hints
        ])
        .split(area);

    render_header(frame, layout[0], game);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(28)])
        .split(layout[1]);

    match game.state() {
        RoundState::Loading => render_notice(
            frame,
            columns[0],
            "Loading...",
            "Looking for a Pokémon",
            Color::DarkGray,
        ),
        RoundState::Completed => render_notice(
            frame,
            columns[0],
            "You caught them all!",
            &format!("Final score: {}  ·  r to play again", game.score().score()),
            Color::Green,
        ),
        RoundState::Failed(message) => render_notice(
            frame,
            columns[0],
            "Couldn't load a Pokémon",
            &format!("{}  ·  r to retry", message),
            Color::Red,
        ),
        RoundState::AwaitingGuess | RoundState::Resolved => {
            render_round(frame, columns[0], game);
        }
    }

    render_sidebar(frame, columns[1], game);
    render_hints(frame, layout[2], game);

    if let Some(verdict) = game.verdict() {
        render_verdict(frame, area, verdict);
    }
}

/// Title, rules and difficulty, timer
fn render_header(frame: &mut Frame, area: Rect, game: &Game) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let header_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(22), // Title
            Constraint::Min(20),    // Rules and difficulty
            Constraint::Length(10), // Timer
        ])
        .split(inner);

    let title = Paragraph::new("Who's That Pokémon?")
        .style(Style::default().fg(Color::Yellow).bold())
        .alignment(Alignment::Left);
    frame.render_widget(title, header_layout[0]);

    let mut mode_text = format!("{}  ·  {}", game.rules().label(), game.difficulty());
    if game.rules() == Rules::Timed && *game.state() == RoundState::AwaitingGuess {
        let left = TIMED_ATTEMPT_CAP.saturating_sub(game.attempts());
        mode_text.push_str(&format!("  ·  {} {} left", left, if left == 1 { "try" } else { "tries" }));
    }
    let mode = Paragraph::new(mode_text)
    .style(Style::default().fg(Color::Cyan))
    .alignment(Alignment::Center);
    frame.render_widget(mode, header_layout[1]);

    let remaining = game.time_remaining();
    let timer = Paragraph::new(format!("⏱ {}s", remaining))
        .style(Style::default().fg(timer_color(remaining, game.timer_running())).bold())
        .alignment(Alignment::Right);
    frame.render_widget(timer, header_layout[2]);
}

/// Grey while the countdown is held or stopped, then green to red
fn timer_color(remaining: u32, running: bool) -> Color {
    if !running {
        Color::DarkGray
    } else if remaining <= 3 {
        Color::Red
    } else if remaining <= 6 {
        Color::Yellow
    } else {
        Color::Green
    }
}

/// Centered two-line message in place of the round
fn render_notice(frame: &mut Frame, area: Rect, title: &str, detail: &str, color: Color) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .margin(1)
        .split(area);

    let title = Paragraph::new(title.to_string())
        .style(Style::default().fg(color).bold())
        .alignment(Alignment::Center);
    frame.render_widget(title, layout[1]);

    let detail = Paragraph::new(detail.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(detail, layout[2]);
}

/// Subject panel, facts line, choices, feedback
fn render_round(frame: &mut Frame, area: Rect, game: &Game) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(9), // Subject
            Constraint::Length(1), // Facts
            Constraint::Length(1), // Spacer
            Constraint::Length(game.choices().len() as u16),
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Feedback
            Constraint::Min(0),
        ])
        .split(area);

    if let Some(subject) = game.subject() {
        render_subject(frame, layout[0], subject, game.is_revealed());

        let facts = Paragraph::new(subject.facts())
            .style(Style::default().fg(Color::DarkGray).italic())
            .alignment(Alignment::Center);
        frame.render_widget(facts, layout[1]);
    }

    let items: Vec<ListItem> = game
        .choices()
        .iter()
        .enumerate()
        .map(|(i, choice)| {
            ListItem::new(format!("[{}] {}", i + 1, choice.label))
                .style(choice_style(choice, game.choices_enabled()))
        })
        .collect();
    frame.render_widget(List::new(items), layout[3]);

    let (feedback_text, feedback_color) = format_feedback(game.feedback());
    let feedback = Paragraph::new(feedback_text)
        .style(Style::default().fg(feedback_color).bold())
        .alignment(Alignment::Center);
    frame.render_widget(feedback, layout[5]);
}

/// The picture: a silhouette until revealed
fn render_subject(frame: &mut Frame, area: Rect, subject: &Subject, revealed: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let lines: Vec<Line> = if !revealed {
        SILHOUETTE
            .lines()
            .map(|l| Line::styled(l.to_string(), Style::default().fg(Color::DarkGray)))
            .collect()
    } else {
        let picture = match &subject.image {
            ImageRef::Emoji(glyph) => glyph.clone(),
            ImageRef::Sprite(_) => "★".to_string(),
        };
        let mut lines = vec![
            Line::raw(""),
            Line::raw(""),
            Line::styled(picture, Style::default().bold()),
            Line::raw(""),
            Line::styled(subject.name.clone(), Style::default().fg(Color::Yellow).bold()),
        ];
        if let ImageRef::Sprite(url) = &subject.image {
            lines.push(Line::styled(url.clone(), Style::default().fg(Color::DarkGray)));
        }
        lines
    };

    let panel = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(panel, area);
}

fn choice_style(choice: &Choice, enabled: bool) -> Style {
    match choice.mark {
        Mark::Correct => Style::default().fg(Color::Black).bg(Color::Green).bold(),
        Mark::Incorrect => Style::default().fg(Color::White).bg(Color::Red),
        Mark::Neutral if enabled => Style::default().fg(Color::White),
        Mark::Neutral => Style::default().fg(Color::DarkGray),
    }
}

/// Score, counters, recent guesses and (Classic) the roster
fn render_sidebar(frame: &mut Frame, area: Rect, game: &Game) {
    let constraints = match game.rules() {
        Rules::Classic => vec![
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Min(0),
        ],
        Rules::Timed => vec![Constraint::Length(6), Constraint::Min(0)],
    };
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    render_score(frame, layout[0], game.score());
    render_history(frame, layout[1], game.score());
    if game.rules() == Rules::Classic {
        render_roster(frame, layout[2], game.roster());
    }
}

fn render_score(frame: &mut Frame, area: Rect, score: &ScoreTracker) {
    let counter_color = if score.accuracy_is_good() {
        Color::Green
    } else {
        Color::Red
    };

    let lines = vec![
        Line::styled(
            format!("Score: {}", score.score()),
            Style::default().fg(Color::Magenta).bold(),
        ),
        Line::styled(
            format!(
                "Correct: {} / {}",
                score.correct_guesses(),
                score.total_guesses()
            ),
            Style::default().fg(counter_color),
        ),
        Line::styled(
            format!("Accuracy: {:.0}%", score.accuracy() * 100.0),
            Style::default().fg(counter_color),
        ),
    ];

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("Score"),
    );
    frame.render_widget(panel, area);
}

/// Most recent guesses, newest first
fn render_history(frame: &mut Frame, area: Rect, score: &ScoreTracker) {
    let items: Vec<ListItem> = score
        .recent()
        .iter()
        .rev()
        .map(|record| {
            let (mark, color) = if record.was_correct {
                ("✓", Color::Green)
            } else {
                ("✗", Color::Red)
            };
            ListItem::new(format!("{} {}", mark, record.label)).style(Style::default().fg(color))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("Recent"),
    );
    frame.render_widget(list, area);
}

fn render_roster(frame: &mut Frame, area: Rect, roster: &Roster) {
    let items: Vec<ListItem> = roster
        .entries()
        .iter()
        .map(|entry| {
            if roster.is_guessed(entry.name) {
                ListItem::new(format!("{} {}", entry.emoji, entry.name))
                    .style(Style::default().fg(Color::Green))
            } else {
                ListItem::new("?  ???").style(Style::default().fg(Color::DarkGray))
            }
        })
        .collect();

    let title = format!(
        "Caught {}/{}",
        roster.guessed_count(),
        roster.entries().len()
    );
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title),
    );
    frame.render_widget(list, area);
}

fn render_hints(frame: &mut Frame, area: Rect, game: &Game) {
    let hint = match game.state() {
        RoundState::Failed(_) => "r Retry  e/n/h Difficulty  Esc Menu",
        RoundState::Completed => "r Play again  e/n/h Difficulty  Esc Menu",
        _ if game.verdict().is_some() => "Enter Continue  Esc Menu",
        _ => "1-6 Guess  e/n/h Difficulty  Esc Menu",
    };
    let widget = Paragraph::new(hint)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

/// Classic round outcome, drawn over everything else
fn render_verdict(frame: &mut Frame, area: Rect, verdict: &Verdict) {
    let popup = centered_rect(area, 44, 7);
    let color = if verdict.correct { Color::Green } else { Color::Red };

    let lines = vec![
        Line::raw(""),
        Line::styled(verdict.text.clone(), Style::default().fg(Color::White)),
        Line::raw(""),
        Line::styled("Press Enter", Style::default().fg(Color::DarkGray)),
    ];
    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(verdict.title.clone())
                .title_style(Style::default().fg(color).bold()),
        );

    frame.render_widget(Clear, popup);
    frame.render_widget(widget, popup);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Format feedback with appropriate color
fn format_feedback(feedback: &str) -> (String, Color) {
    if feedback.is_empty() {
        return (String::new(), Color::White);
    }

    let color = if feedback.starts_with("Correct") || feedback.starts_with("You caught") {
        Color::Green
    } else if feedback.starts_with("Not quite") {
        Color::Yellow
    } else if feedback.starts_with("Out of attempts") || feedback.starts_with("Time's up") {
        Color::Red
    } else {
        Color::White
    };

    (feedback.to_string(), color)
}
