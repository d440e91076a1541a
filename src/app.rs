use crate::game::{GameMsg, KeyOutcome, SessionState, TargetSource, WrongKeyPolicy};
use crate::levels::{shifted_symbol, LevelConfig};
use crate::scores::{Leaderboard, ScoreStore, StoreError, MAX_NAME_CHARS};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};
use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Idle,
    Playing,
    NameEntry,
}

/// What the event loop should do after a key was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    GameStarted,
    Quit,
}

pub struct App {
    pub session: SessionState,
    pub selected_level: &'static LevelConfig,
    pub leaderboard: Leaderboard<Box<dyn ScoreStore>>,
    pub name_input: String,
    pub status: Option<String>,
    /// Terminal sends shift press/release events
    pub modifier_events: bool,
    targets: Box<dyn TargetSource>,
}

impl App {
    pub fn new(
        leaderboard: Leaderboard<Box<dyn ScoreStore>>,
        level: &'static LevelConfig,
        wrong_key_policy: WrongKeyPolicy,
        targets: Box<dyn TargetSource>,
    ) -> Self {
        let mut app = Self {
            session: SessionState::new(wrong_key_policy),
            selected_level: level,
            leaderboard,
            name_input: String::new(),
            status: None,
            modifier_events: false,
            targets,
        };
        app.leaderboard.fetch_top_scores(Some(level.id));
        app
    }

    pub fn state(&self) -> AppState {
        if self.session.active {
            AppState::Playing
        } else if self.session.awaiting_name_entry {
            AppState::NameEntry
        } else {
            AppState::Idle
        }
    }

    pub fn select_level(&mut self, level: &'static LevelConfig) {
        if self.state() != AppState::Idle {
            return;
        }
        self.selected_level = level;
        self.leaderboard.fetch_top_scores(Some(level.id));
    }

    pub fn start_game(&mut self) {
        self.status = None;
        self.name_input.clear();
        self.session
            .apply(GameMsg::Start(self.selected_level), &mut self.targets);
        info!("started level {}", self.selected_level.id);
    }

    /// Advance the countdown; true when this tick ended the round
    pub fn on_tick(&mut self) -> bool {
        if !self.session.active {
            return false;
        }
        self.session.apply(GameMsg::Tick, &mut self.targets);
        if self.session.awaiting_name_entry {
            info!(
                "round over on level {} with score {}",
                self.session.level.id, self.session.score
            );
            return true;
        }
        false
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }

        if let KeyCode::Modifier(ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift) =
            key.code
        {
            self.modifier_events = true;
            let msg = match key.kind {
                KeyEventKind::Release => GameMsg::ModifierUp,
                _ => GameMsg::ModifierDown,
            };
            self.session.apply(msg, &mut self.targets);
            return Control::Continue;
        }

        if key.kind == KeyEventKind::Release {
            return Control::Continue;
        }

        match self.state() {
            AppState::Idle => self.on_idle_key(key),
            AppState::Playing => self.on_playing_key(key),
            AppState::NameEntry => self.on_name_key(key),
        }
    }

    fn on_idle_key(&mut self, key: KeyEvent) -> Control {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Control::Quit,
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.start_game();
                Control::GameStarted
            }
            KeyCode::Left => {
                self.select_level(self.selected_level.prev());
                Control::Continue
            }
            KeyCode::Right | KeyCode::Tab => {
                self.select_level(self.selected_level.next());
                Control::Continue
            }
            KeyCode::Char(c) => {
                if let Some(level) = c
                    .to_digit(10)
                    .and_then(|d| u8::try_from(d).ok())
                    .and_then(LevelConfig::by_id)
                {
                    self.select_level(level);
                }
                Control::Continue
            }
            _ => Control::Continue,
        }
    }

    fn on_playing_key(&mut self, key: KeyEvent) -> Control {
        match key.code {
            KeyCode::Esc => Control::Quit,
            KeyCode::Char(c) => {
                let shift = key.modifiers.contains(KeyModifiers::SHIFT);
                // enhanced keyboards may report the base digit plus SHIFT
                let c = if shift { shifted_symbol(c).unwrap_or(c) } else { c };
                let modifier_held = self.session.modifier_held
                    || shift
                    || (!self.modifier_events && self.session.level.requires_shift(c));
                let outcome = self.session.apply(
                    GameMsg::KeyPress {
                        key: c,
                        modifier_held,
                    },
                    &mut self.targets,
                );
                if outcome == KeyOutcome::Wrong {
                    log::debug!("miss: pressed {c:?}, wanted {:?}", self.session.target_key);
                }
                Control::Continue
            }
            _ => Control::Continue,
        }
    }

    fn on_name_key(&mut self, key: KeyEvent) -> Control {
        match key.code {
            KeyCode::Esc => Control::Quit,
            KeyCode::Enter => {
                self.submit_name();
                Control::Continue
            }
            KeyCode::Backspace => {
                self.name_input.pop();
                Control::Continue
            }
            KeyCode::Char(c) if !c.is_control() => {
                if self.name_input.chars().count() < MAX_NAME_CHARS {
                    self.name_input.push(c);
                }
                Control::Continue
            }
            _ => Control::Continue,
        }
    }

    /// Save the finished round under the typed name and go back to idle.
    /// A rejected name keeps the form open; a store failure does not.
    pub fn submit_name(&mut self) {
        let score = self.session.score;
        let level = self.session.level;
        match self
            .leaderboard
            .submit_score(&self.name_input, score, level.id)
        {
            Ok(record) => {
                self.status = Some(format!("Saved {} for {}", record.score, record.name));
            }
            Err(StoreError::InvalidName(reason)) => {
                self.status = Some(format!("Please enter a valid name: {reason}"));
                return;
            }
            Err(e) => {
                self.status = Some(format!("Could not save score: {e}"));
            }
        }
        self.name_input.clear();
        self.session.finish_name_entry();
        if self.selected_level.id != level.id {
            self.leaderboard.fetch_top_scores(Some(self.selected_level.id));
        }
    }
}
