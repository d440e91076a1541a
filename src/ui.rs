pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::{App, AppState},
    game::ROUND_SECS,
    levels::{LevelConfig, LEVELS},
    scores::ScoreRecord,
    util::{format_stored_timestamp, points_label},
};

const HORIZONTAL_MARGIN: u16 = 2;
const NAME_COLUMN_WIDTH: usize = 12;

const TIPS: [&str; 3] = [
    "Position your hands properly on the keyboard for best results",
    "Focus on accuracy rather than speed to avoid penalties",
    "Practice regularly to improve your typing skills",
];

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(2), // title
                Constraint::Length(1), // level picker
                Constraint::Length(8), // game panel
                Constraint::Min(4),    // scores + instructions
                Constraint::Length(1), // status / key hints
            ])
            .split(area);

        render_title(chunks[0], buf);
        render_level_picker(self, chunks[1], buf);

        let panel = Block::default().borders(Borders::ALL);
        let inner = panel.inner(chunks[2]);
        panel.render(chunks[2], buf);
        screen::current_screen(self.state()).render(self, inner, buf);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[3]);
        render_high_scores(self, bottom[0], buf);
        render_instructions(self.selected_level, bottom[1], buf);

        render_footer(self, chunks[4], buf);
    }
}

fn render_title(area: Rect, buf: &mut Buffer) {
    Paragraph::new(vec![
        Line::from(Span::styled(
            "⌨ Typing Game",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Practice typing with different challenges!",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ])
    .alignment(Alignment::Center)
    .render(area, buf);
}

pub fn level_label(level: &LevelConfig) -> String {
    format!("Level {}: {}", level.id, level.name)
}

fn render_level_picker(app: &App, area: Rect, buf: &mut Buffer) {
    let locked = app.state() == AppState::Playing;
    let mut spans = Vec::new();
    for level in LEVELS.iter() {
        let mut style = if level.id == app.selected_level.id {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        if locked {
            style = style.add_modifier(Modifier::DIM);
        }
        spans.push(Span::styled(format!(" {} ", level_label(level)), style));
        spans.push(Span::raw("  "));
    }
    spans.pop();

    Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .render(area, buf);
}

/// `"Hold SHIFT + 1"` for a symbol target, nothing otherwise
pub fn shift_hint_line(level: &LevelConfig, target: char) -> Option<String> {
    level
        .shift_hint(target)
        .map(|digit| format!("Hold SHIFT + {digit}"))
}

/// One leaderboard line: rank, padded name, date stamp, score
pub fn score_row(rank: usize, record: &ScoreRecord) -> String {
    let stamp = format_stored_timestamp(&record.created_at);
    let pad = NAME_COLUMN_WIDTH.saturating_sub(record.name.width());
    format!(
        "{:>2}. {}{}  {} at {}  {:>5}",
        rank,
        record.name,
        " ".repeat(pad),
        stamp.date,
        stamp.time,
        record.score
    )
}

fn render_high_scores(app: &App, area: Rect, buf: &mut Buffer) {
    let level = app.selected_level;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("🏆 High Scores - {}", level_label(level)));

    // the cache may still hold another level's scores until the next fetch
    let scores: Vec<&ScoreRecord> = app
        .leaderboard
        .scores()
        .iter()
        .filter(|r| r.level == level.id)
        .collect();

    let lines: Vec<Line> = if scores.is_empty() {
        vec![Line::from(Span::styled(
            "No scores yet for this level. Be the first to play!",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        scores
            .iter()
            .enumerate()
            .map(|(idx, record)| Line::from(score_row(idx + 1, record)))
            .collect()
    };

    Paragraph::new(lines).block(block).render(area, buf);
}

pub fn instruction_lines(level: &LevelConfig) -> Vec<String> {
    let mut lines = vec!["Game Rules:".to_string()];
    lines.extend(level.instructions.iter().map(|s| format!("• {s}")));
    lines.push(format!(
        "• You have {ROUND_SECS} seconds to achieve the highest score possible"
    ));
    lines.push("Scoring System:".to_string());
    lines.push(format!(
        "• {} for each correct keystroke",
        points_label(level.correct_points)
    ));
    lines.push(format!(
        "• {} for each incorrect keystroke",
        points_label(level.incorrect_points)
    ));
    lines.push("• The letter will turn red when you make a mistake".to_string());
    lines.push("Tips:".to_string());
    lines.extend(TIPS.iter().map(|s| format!("• {s}")));
    lines
}

fn render_instructions(level: &LevelConfig, area: Rect, buf: &mut Buffer) {
    let heading = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let lines: Vec<Line> = instruction_lines(level)
        .into_iter()
        .map(|l| {
            if l.ends_with(':') {
                Line::from(Span::styled(l, heading))
            } else {
                Line::from(l)
            }
        })
        .collect();

    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("ⓘ How to Play - Level {}", level.id)),
        )
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn render_footer(app: &App, area: Rect, buf: &mut Buffer) {
    let (text, style) = match &app.status {
        Some(status) => (status.clone(), Style::default().fg(Color::Yellow)),
        None => {
            let hints = match app.state() {
                AppState::Idle => "1-3/←→ level · enter start · q quit",
                AppState::Playing => "esc quit",
                AppState::NameEntry => "enter save · esc quit",
            };
            (hints.to_string(), Style::default().add_modifier(Modifier::DIM))
        }
    };
    Paragraph::new(Span::styled(text, style))
        .alignment(Alignment::Center)
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        game::{ScriptedTargets, WrongKeyPolicy},
        scores::{Leaderboard, ScoreStore, SqliteScoreStore},
    };
    use chrono::{TimeZone, Utc};
    use ratatui::{backend::TestBackend, Terminal};

    fn test_app(targets: Vec<char>) -> App {
        let store: Box<dyn ScoreStore> = Box::new(SqliteScoreStore::open_in_memory().unwrap());
        App::new(
            Leaderboard::new(store, 10),
            LevelConfig::first(),
            WrongKeyPolicy::Keep,
            Box::new(ScriptedTargets::new(targets)),
        )
    }

    fn rendered(app: &App) -> String {
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| f.render_widget(app, f.area())).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_render_idle_with_empty_leaderboard() {
        let app = test_app(vec!['q']);
        let content = rendered(&app);
        assert!(content.contains("Press Enter to start Level 1"));
        assert!(content.contains("No scores yet for this level."));
        assert!(content.contains("Level 2: Numbers & Symbols"));
    }

    #[test]
    fn test_render_playing_shows_clock_and_hint() {
        let mut app = test_app(vec!['$']);
        app.select_level(LevelConfig::by_id(2).unwrap());
        app.start_game();
        let content = rendered(&app);
        assert!(content.contains("Time: 60s"));
        assert!(content.contains("Score: 0"));
        assert!(content.contains("[ $ ]"));
        assert!(content.contains("Hold SHIFT + 4"));
    }

    #[test]
    fn test_render_name_entry_and_scores() {
        let mut app = test_app(vec!['q']);
        app.start_game();
        for _ in 0..60 {
            app.on_tick();
        }
        app.name_input = "Ada".into();
        let content = rendered(&app);
        assert!(content.contains("Game Over!"));
        assert!(content.contains("Final Score: 0"));
        assert!(content.contains("3/12"));

        app.submit_name();
        let content = rendered(&app);
        assert!(content.contains(" 1. Ada"));
        assert!(content.contains("Saved 0 for Ada"));
    }

    #[test]
    fn test_level_label() {
        assert_eq!(level_label(LevelConfig::first()), "Level 1: Left Hand Basic");
    }

    #[test]
    fn test_shift_hint_line() {
        let symbols = LevelConfig::by_id(2).unwrap();
        assert_eq!(shift_hint_line(symbols, '$').as_deref(), Some("Hold SHIFT + 4"));
        assert_eq!(shift_hint_line(symbols, '4'), None);
    }

    #[test]
    fn test_instruction_lines_pluralize() {
        let lines = instruction_lines(LevelConfig::first());
        assert!(lines.contains(&"• 1 point for each correct keystroke".to_string()));
        assert!(lines.contains(&"• -2 points for each incorrect keystroke".to_string()));

        let lines = instruction_lines(LevelConfig::by_id(2).unwrap());
        assert!(lines.contains(&"• 3 points for each correct keystroke".to_string()));
        assert!(lines
            .iter()
            .any(|l| l.contains("hold SHIFT while pressing")));
    }

    #[test]
    fn test_score_row_layout() {
        let record = ScoreRecord {
            id: 1,
            name: "Ada".into(),
            score: 42,
            level: 1,
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 8, 7, 0).unwrap(),
        };
        let stamp = format_stored_timestamp(&record.created_at);
        let row = score_row(1, &record);
        assert!(row.starts_with(" 1. Ada         "));
        assert!(row.contains(&format!("{} at {}", stamp.date, stamp.time)));
        assert!(row.ends_with("   42"));
    }
}
