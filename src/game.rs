use crate::levels::LevelConfig;
use clap::ValueEnum;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Length of one round in seconds
pub const ROUND_SECS: u32 = 60;

/// Source of target keys; swapped for a scripted one in tests
pub trait TargetSource {
    fn pick(&mut self, keys: &[char]) -> char;
}

impl<T: TargetSource + ?Sized> TargetSource for Box<T> {
    fn pick(&mut self, keys: &[char]) -> char {
        (**self).pick(keys)
    }
}

/// Uniform draw with replacement
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTargets;

impl TargetSource for RandomTargets {
    fn pick(&mut self, keys: &[char]) -> char {
        let mut rng = rand::thread_rng();
        *keys.choose(&mut rng).unwrap_or(&' ')
    }
}

/// Replays a fixed sequence of targets, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedTargets {
    sequence: Vec<char>,
    next: usize,
}

impl ScriptedTargets {
    pub fn new(sequence: impl Into<Vec<char>>) -> Self {
        Self {
            sequence: sequence.into(),
            next: 0,
        }
    }
}

impl TargetSource for ScriptedTargets {
    fn pick(&mut self, keys: &[char]) -> char {
        if self.sequence.is_empty() {
            return keys.first().copied().unwrap_or(' ');
        }
        let c = self.sequence[self.next % self.sequence.len()];
        self.next += 1;
        debug_assert!(keys.contains(&c), "scripted target {c:?} is not in {keys:?}");
        c
    }
}

/// What happens to the target after a valid but wrong key
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum WrongKeyPolicy {
    /// Target stays until the player gets it right
    #[default]
    Keep,
    /// A fresh target is drawn after every miss
    Reroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Correct,
    Wrong,
    Ignored,
}

/// Discrete inputs from the keyboard and the clock, applied in arrival order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameMsg {
    Start(&'static LevelConfig),
    Tick,
    KeyPress { key: char, modifier_held: bool },
    ModifierDown,
    ModifierUp,
}

/// Everything a round needs; idle until the first `start_game`
#[derive(Debug, Clone)]
pub struct SessionState {
    pub active: bool,
    pub seconds_remaining: u32,
    pub score: i64,
    pub target_key: Option<char>,
    pub last_press_was_error: bool,
    pub level: &'static LevelConfig,
    pub modifier_held: bool,
    pub awaiting_name_entry: bool,
    pub wrong_key_policy: WrongKeyPolicy,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(WrongKeyPolicy::default())
    }
}

impl SessionState {
    pub fn new(wrong_key_policy: WrongKeyPolicy) -> Self {
        Self {
            active: false,
            seconds_remaining: ROUND_SECS,
            score: 0,
            target_key: None,
            last_press_was_error: false,
            level: LevelConfig::first(),
            modifier_held: false,
            awaiting_name_entry: false,
            wrong_key_policy,
        }
    }

    pub fn start_game(&mut self, level: &'static LevelConfig, targets: &mut impl TargetSource) {
        self.level = level;
        self.active = true;
        self.seconds_remaining = ROUND_SECS;
        self.score = 0;
        self.awaiting_name_entry = false;
        self.last_press_was_error = false;
        self.target_key = Some(targets.pick(level.keys));
    }

    pub fn tick(&mut self) {
        if !self.active {
            return;
        }
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining == 0 {
            self.active = false;
            self.awaiting_name_entry = true;
        }
    }

    pub fn handle_key_press(
        &mut self,
        key: char,
        modifier_held: bool,
        targets: &mut impl TargetSource,
    ) -> KeyOutcome {
        if !self.active {
            return KeyOutcome::Ignored;
        }
        if self.level.requires_shift(key) && !modifier_held {
            return KeyOutcome::Ignored;
        }

        if Some(key) == self.target_key {
            self.score += self.level.correct_points;
            self.last_press_was_error = false;
            self.target_key = Some(targets.pick(self.level.keys));
            KeyOutcome::Correct
        } else if self.level.is_valid_key(key) {
            self.score += self.level.incorrect_points;
            self.last_press_was_error = true;
            if self.wrong_key_policy == WrongKeyPolicy::Reroll {
                self.target_key = Some(targets.pick(self.level.keys));
            }
            KeyOutcome::Wrong
        } else {
            KeyOutcome::Ignored
        }
    }

    pub fn set_modifier_held(&mut self, held: bool) {
        self.modifier_held = held;
    }

    /// Leaves the game-over state once the name form is done with
    pub fn finish_name_entry(&mut self) {
        self.awaiting_name_entry = false;
    }

    pub fn apply(&mut self, msg: GameMsg, targets: &mut impl TargetSource) -> KeyOutcome {
        match msg {
            GameMsg::Start(level) => self.start_game(level, targets),
            GameMsg::Tick => self.tick(),
            GameMsg::KeyPress { key, modifier_held } => {
                return self.handle_key_press(key, modifier_held, targets)
            }
            GameMsg::ModifierDown => self.set_modifier_held(true),
            GameMsg::ModifierUp => self.set_modifier_held(false),
        }
        KeyOutcome::Ignored
    }

    pub fn is_idle(&self) -> bool {
        !self.active && !self.awaiting_name_entry
    }
}
