use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::{
    app::{App, AppState},
    scores::MAX_NAME_CHARS,
    ui::shift_hint_line,
};

/// The part of the UI that changes with the game state: start prompt, live round or name form
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Waiting for the player to start a round
pub struct IdleScreen;

impl Screen for IdleScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let lines = vec![
            Line::from(""),
            Line::from(""),
            Line::from(Span::styled(
                format!("Press Enter to start Level {}", app.selected_level.id),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
        ];
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

/// Live round: clock, score and the key to press
pub struct PlayingScreen;

impl Screen for PlayingScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let session = &app.session;
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let target_style = if session.last_press_was_error {
            bold.fg(Color::Red)
        } else {
            bold
        };
        let target = session.target_key.unwrap_or(' ');

        let mut lines = vec![
            Line::from(vec![
                Span::styled(format!("Time: {}s", session.seconds_remaining), bold),
                Span::raw("  |  "),
                Span::styled(format!("Score: {}", session.score), bold),
            ]),
            Line::from(""),
            Line::from(Span::styled(format!("[ {target} ]"), target_style)),
        ];
        if let Some(hint) = shift_hint_line(session.level, target) {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                hint,
                Style::default().fg(Color::Yellow),
            )));
        }

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

/// Game over: collect a name for the leaderboard
pub struct NameEntryScreen;

impl Screen for NameEntryScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let placeholder = app.name_input.is_empty();
        let input = if placeholder {
            Span::styled("Enter your name", Style::default().add_modifier(Modifier::DIM))
        } else {
            Span::styled(app.name_input.clone(), bold)
        };

        let lines = vec![
            Line::from(Span::styled("Game Over!", bold.fg(Color::Magenta))),
            Line::from(format!("Final Score: {}", app.session.score)),
            Line::from(""),
            Line::from(vec![
                Span::raw("Name: "),
                input,
                Span::styled("▏", Style::default().add_modifier(Modifier::SLOW_BLINK)),
            ]),
            Line::from(Span::styled(
                format!(
                    "{}/{} · Enter to save score",
                    app.name_input.chars().count(),
                    MAX_NAME_CHARS
                ),
                Style::default().add_modifier(Modifier::DIM),
            )),
        ];
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: AppState) -> Box<dyn Screen> {
    match state {
        AppState::Idle => Box::new(IdleScreen),
        AppState::Playing => Box::new(PlayingScreen),
        AppState::NameEntry => Box::new(NameEntryScreen),
    }
}
