//! Character cursor over script source.
//!
//! The parser pulls one code point at a time and may push the last one back.
//! Line and column are tracked so every error can point at its source.

use super::error::Position;

pub struct Reader {
    chars: Vec<char>,
    pos: Position,
    /// Position before the most recent `advance`, restored by `pushback`.
    prev: Option<Position>,
}

impl Reader {
    pub fn new(src: &str) -> Self {
        Reader {
            chars: src.chars().collect(),
            pos: Position::START,
            prev: None,
        }
    }

    /// The next character without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos.offset).copied()
    }

    /// Consume and return the next character; `None` at end of input.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.prev = Some(self.pos);
        self.pos.offset += 1;
        if ch == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
        Some(ch)
    }

    /// Undo the most recent `advance`.  Only one level of undo is kept.
    pub fn pushback(&mut self) {
        if let Some(prev) = self.prev.take() {
            self.pos = prev;
        }
    }

    /// Position of the next character to be read.
    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn at_end(&self) -> bool {
        self.pos.offset >= self.chars.len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
