//! Language-neutral program tree.
//!
//! Front ends for the surface languages build a [`Program`] with every identifier resolved and every
//! expression typed (see [`crate::compiler::typecheck`] for the typed constructors). The compiler lowers the
//! finished tree into bytecode, the tree is not needed afterwards.

mod program;
mod expression;
mod statement;
mod builtins;

pub use program::*;
pub use expression::*;
pub use statement::*;
pub use builtins::*;

use crate::prelude::*;

/// Byte offset of a tree node in its source text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position(pub usize);

impl Position {
    /// Compute 1-based line/column number in string.
    pub fn loc(self: &Self, input: &str) -> (u32, u32) {
        let offset = self.0.min(input.len());
        let mut line = 1;
        let mut column = 1;
        for c in input[..offset].chars() {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        (line, column)
    }
}

impl Display for Position {
    fn fmt(self: &Self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tree nodes with a source position.
pub trait Positioned {
    fn position(self: &Self) -> Position;
}
