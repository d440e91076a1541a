/// Static description of one level: which keys may be drawn and how presses are scored
#[derive(Debug, PartialEq, Eq)]
pub struct LevelConfig {
    pub id: u8,
    pub name: &'static str,
    pub keys: &'static [char],
    pub correct_points: i64,
    pub incorrect_points: i64,
    /// Keys that only count while shift is held
    pub shift_required: &'static [char],
    pub instructions: &'static [&'static str],
}

/// US layout: each shifted symbol and the digit key that produces it
const SHIFTED_DIGITS: [(char, char); 5] = [('!', '1'), ('@', '2'), ('#', '3'), ('$', '4'), ('%', '5')];

pub static LEVELS: [LevelConfig; 3] = [
    LevelConfig {
        id: 1,
        name: "Left Hand Basic",
        keys: &[
            'q', 'w', 'e', 'r', 't', 'a', 's', 'd', 'f', 'g', 'z', 'x', 'c', 'v', 'b',
        ],
        correct_points: 1,
        incorrect_points: -2,
        shift_required: &[],
        instructions: &[
            "Type the displayed letter using your left hand only",
            "Only letters on the left side of the keyboard are used: Q, W, E, R, T, A, S, D, F, G, Z, X, C, V, B",
        ],
    },
    LevelConfig {
        id: 2,
        name: "Numbers & Symbols",
        keys: &['1', '2', '3', '4', '5', '!', '@', '#', '$', '%'],
        correct_points: 3,
        incorrect_points: -3,
        shift_required: &['!', '@', '#', '$', '%'],
        instructions: &[
            "Type numbers and symbols using your left hand",
            "Numbers (1, 2, 3, 4, 5) and symbols (!, @, #, $, %)",
            "For symbols, hold SHIFT while pressing the corresponding number",
        ],
    },
    LevelConfig {
        id: 3,
        name: "Full Keyboard",
        keys: &['y', 'u', 'i', 'o', 'p', 'h', 'j', 'k', 'l', 'n', 'm'],
        correct_points: 2,
        incorrect_points: -2,
        shift_required: &[],
        instructions: &[
            "Type letters from both sides of the keyboard",
            "Includes all letters from Level 1 plus: Y, U, I, O, P, H, J, K, L, N, M",
        ],
    },
];

/// The symbol shift turns `digit` into, if it is one of the drilled ones
pub fn shifted_symbol(digit: char) -> Option<char> {
    SHIFTED_DIGITS
        .iter()
        .find(|(_, d)| *d == digit)
        .map(|(symbol, _)| *symbol)
}

impl LevelConfig {
    pub fn by_id(id: u8) -> Option<&'static LevelConfig> {
        LEVELS.iter().find(|l| l.id == id)
    }

    pub fn first() -> &'static LevelConfig {
        &LEVELS[0]
    }

    /// Next level in table order, wrapping around
    pub fn next(&self) -> &'static LevelConfig {
        let idx = LEVELS.iter().position(|l| l.id == self.id).unwrap_or(0);
        &LEVELS[(idx + 1) % LEVELS.len()]
    }

    /// Previous level in table order, wrapping around
    pub fn prev(&self) -> &'static LevelConfig {
        let idx = LEVELS.iter().position(|l| l.id == self.id).unwrap_or(0);
        &LEVELS[(idx + LEVELS.len() - 1) % LEVELS.len()]
    }

    pub fn is_valid_key(&self, c: char) -> bool {
        self.keys.contains(&c)
    }

    pub fn requires_shift(&self, c: char) -> bool {
        self.shift_required.contains(&c)
    }

    /// The unshifted key to hold shift with, e.g. `'1'` for `'!'`
    pub fn shift_hint(&self, c: char) -> Option<char> {
        if !self.requires_shift(c) {
            return None;
        }
        SHIFTED_DIGITS
            .iter()
            .find(|(symbol, _)| *symbol == c)
            .map(|(_, digit)| *digit)
    }
}
