//! Key bytes, direction presets, and human-readable names.
//!
//! The byte constants are what a VT100-style terminal sends in raw mode.
//! Arrow keys arrive as `ESC [ X` and shift-arrows as `ESC [ 1 ; 2 X`,
//! where `X` is one of [`UP`], [`DOWN`], [`RIGHT`], [`LEFT`].

use std::fmt;

use crate::code::Code;
use crate::keymap::KeyMap;

pub const ENTER: u8 = 0x0a;
pub const CARRIAGE_RETURN: u8 = 0x0d;
pub const TAB: u8 = 0x09;
pub const ESC: u8 = 0x1b;
pub const SPACE: u8 = 0x20;
pub const BACKSPACE: u8 = 0x7f;
pub const CTRL_C: u8 = 0x03;
pub const CTRL_R: u8 = 0x12;
pub const CTRL_W: u8 = 0x17;

pub const L_BRACKET: u8 = 0x5b;
pub const ONE: u8 = 0x31;
pub const TWO: u8 = 0x32;
pub const SEMI: u8 = 0x3b;

pub const UP: u8 = 0x41;
pub const DOWN: u8 = 0x42;
pub const RIGHT: u8 = 0x43;
pub const LEFT: u8 = 0x44;

/// `ESC [` — ends on the [`Escape`](crate::trie::Anchor::Escape) anchor.
pub const ESCAPE_PREFIX: &[u8] = &[ESC, L_BRACKET];

/// `ESC [ 1 ; 2` — ends on the [`Modifier`](crate::trie::Anchor::Modifier) anchor.
pub const MODIFIER_PREFIX: &[u8] = &[ESC, L_BRACKET, ONE, SEMI, TWO];

// ─── Direction ──────────────────────────────────────────────────────────────

/// One of the four arrow directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// The final byte of this direction's arrow sequence.
    #[must_use]
    pub const fn byte(self) -> u8 {
        match self {
            Self::Up => UP,
            Self::Down => DOWN,
            Self::Right => RIGHT,
            Self::Left => LEFT,
        }
    }

    /// Inverse of [`byte`](Self::byte).
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            UP => Some(Self::Up),
            DOWN => Some(Self::Down),
            RIGHT => Some(Self::Right),
            LEFT => Some(Self::Left),
            _ => None,
        }
    }

    /// Column and row offset of one step, rows growing downward.
    #[must_use]
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Code of the plain arrow key (`ESC [ X`).
    #[must_use]
    pub fn arrow_code(self) -> Code {
        Code::new(self.byte(), 1)
    }

    /// Code of the shift-modified arrow key (`ESC [ 1 ; 2 X`).
    #[must_use]
    pub fn shift_arrow_code(self) -> Code {
        Code::new(self.byte(), 2)
    }

    /// Plain arrow codes → direction. Everything else is dropped.
    #[must_use]
    pub fn arrows() -> KeyMap<Self> {
        Self::ALL.into_iter().map(|d| (d.arrow_code(), d)).collect()
    }

    /// Shift-arrow codes → direction.
    #[must_use]
    pub fn shift_arrows() -> KeyMap<Self> {
        Self::ALL
            .into_iter()
            .map(|d| (d.shift_arrow_code(), d))
            .collect()
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Names ──────────────────────────────────────────────────────────────────

/// A readable name for `code`, if we know one.
///
/// Covers printable ASCII, common control keys, and the CSI keys the
/// standard trie can produce. Unknown CSI finals return `None`.
#[must_use]
pub fn key_name(code: Code) -> Option<String> {
    let byte = code.byte();
    match code.depth() {
        0 => plain_name(byte),
        1 => csi_name(byte).map(str::to_owned),
        2 => Direction::from_byte(byte).map(|d| format!("shift-{d}")),
        _ => None,
    }
}

fn plain_name(byte: u8) -> Option<String> {
    let name = match byte {
        ENTER | CARRIAGE_RETURN => "enter",
        TAB => "tab",
        ESC => "esc",
        SPACE => "space",
        BACKSPACE => "backspace",
        0x00 => "ctrl-@",
        b @ 0x01..=0x1a => return Some(format!("ctrl-{}", char::from(b + b'a' - 1))),
        b @ 0x21..=0x7e => return Some(char::from(b).to_string()),
        _ => return None,
    };
    Some(name.to_owned())
}

const fn csi_name(byte: u8) -> Option<&'static str> {
    match byte {
        UP => Some("up"),
        DOWN => Some("down"),
        RIGHT => Some("right"),
        LEFT => Some("left"),
        b'H' => Some("home"),
        b'F' => Some("end"),
        b'Z' => Some("shift-tab"),
        _ => None,
    }
}
