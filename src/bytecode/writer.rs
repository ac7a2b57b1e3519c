//! Line buffer and writer.

use crate::config::{Value, LineIndex};
use crate::shared::typed_ids::RoutineId;
use crate::bytecode::{Bytecode, Line, OpCode};

/// Sentinel operand for a subroutine start line that is not yet known.
///
/// Placeholders are negative (`-(routine + 1)`) and can never be confused with a line index.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Placeholder(pub RoutineId);

impl Placeholder {
    /// Returns the operand value representing the placeholder.
    pub fn to_value(self: Self) -> Value {
        -(self.0.into_usize() as Value) - 1
    }
    /// Returns the placeholder represented by the given operand value, if any.
    pub fn from_value(value: Value) -> Option<Self> {
        if value < 0 && value != Writer::PENDING {
            Some(Placeholder(RoutineId::new((-(value + 1)) as usize)))
        } else {
            None
        }
    }
}

/// Bytecode line buffer and writer.
#[derive(Debug, Default)]
pub struct Writer {
    lines: Vec<Line>,
}

impl Writer {
    /// Operand of a local jump whose target is patched once known. Left unpatched, it fails validation.
    pub const PENDING: Value = Value::MIN;
    /// Creates a new writer instance.
    pub fn new() -> Self {
        Writer { lines: Vec::new() }
    }
    /// Returns the number of lines written so far. This is also the index of the next line.
    pub fn len(self: &Self) -> usize {
        self.lines.len()
    }
    /// Whether no lines have been written.
    pub fn is_empty(self: &Self) -> bool {
        self.lines.is_empty()
    }
    /// Starts a new line and returns it.
    pub fn line(self: &mut Self) -> &mut Line {
        self.lines.push(Line::new());
        let index = self.lines.len() - 1;
        &mut self.lines[index]
    }
    /// Returns the line at given index.
    pub fn line_at(self: &mut Self, index: LineIndex) -> Option<&mut Line> {
        self.lines.get_mut(index)
    }
    /// Iterates the lines in given range.
    pub fn lines_mut(self: &mut Self, from: LineIndex) -> impl Iterator<Item=&mut Line> {
        self.lines[from..].iter_mut()
    }
    /// Overwrites the operand of the instruction at (line, position) and returns the previous operand.
    pub fn overwrite(self: &mut Self, line: LineIndex, position: usize, operand: Value) -> Option<Value> {
        let line = self.lines.get_mut(line)?;
        let previous = *line.code.get(position + 1)?;
        line.patch(position, operand);
        Some(previous)
    }
    /// Replaces every placeholder operand of a jump-class instruction using the given resolver.
    /// Returns the first placeholder that could not be resolved.
    pub fn fix_targets<F>(self: &mut Self, resolve: F) -> Result<(), Placeholder>
        where F: Fn(Placeholder) -> Option<LineIndex>
    {
        for line in &mut self.lines {
            let targets: Vec<_> = line.instructions()
                .filter(|i| i.opcode.map_or(false, OpCode::is_jump_class))
                .filter_map(|i| Placeholder::from_value(*i.operands.first()?).map(|p| (i.position, p)))
                .collect();
            for (position, placeholder) in targets {
                let target = resolve(placeholder).ok_or(placeholder)?;
                line.patch(position, target as Value);
            }
        }
        Ok(())
    }
    /// Converts the writer into the finished program.
    pub fn into_bytecode(self: Self) -> Bytecode {
        Bytecode::new(self.lines)
    }
}
