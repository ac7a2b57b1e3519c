//! Bytecode ("pcode") representation shared by compiler and runtime.
//!
//! A program is a sequence of lines, each an ordered list of integers: opcodes followed by their inline
//! operands. Jump-class instructions address line indices, the machine's program counter is the pair
//! (line, position within line).

#[macro_use]
mod macros;
mod opcodes;
mod file;
mod writer;

use crate::prelude::*;
use crate::config::{Value, LineIndex};
pub use self::opcodes::OpCode;
pub use self::file::{ProgramFile, Language};
pub use self::writer::{Writer, Placeholder};

/// A single bytecode line.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Line {
    pub(crate) code: Vec<Value>,
}

/// A decoded instruction within a line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Instruction<'a> {
    /// Position of the opcode within the line.
    pub position: usize,
    /// The raw opcode value.
    pub value   : Value,
    /// The opcode, if `value` is a known opcode.
    pub opcode  : Option<OpCode>,
    /// Inline operands. Truncated if the line ends early.
    pub operands: &'a [Value],
}

/// Iterator over the instructions of a line.
pub struct Instructions<'a> {
    code    : &'a [Value],
    position: usize,
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Instruction<'a>;
    fn next(self: &mut Self) -> Option<Instruction<'a>> {
        let position = self.position;
        let &value = self.code.get(position)?;
        let opcode = OpCode::from_value(value);
        let count = match opcode {
            Some(opcode) => opcode.operand_count(self.code, position),
            None => 0,
        };
        let end = (position + 1 + count).min(self.code.len());
        self.position = if opcode.is_some() { position + 1 + count } else { self.code.len() };
        Some(Instruction { position, value, opcode, operands: &self.code[position + 1 .. end] })
    }
}

impl Line {
    /// Creates an empty line.
    pub fn new() -> Self {
        Self { code: Vec::new() }
    }
    /// Creates a line from raw values.
    pub fn from_values(code: Vec<Value>) -> Self {
        Self { code }
    }
    /// The raw values of the line.
    pub fn values(self: &Self) -> &[Value] {
        &self.code
    }
    /// Number of values in the line.
    pub fn size(self: &Self) -> usize {
        self.code.len()
    }
    /// Whether the line contains no instructions.
    pub fn is_empty(self: &Self) -> bool {
        self.code.is_empty()
    }
    /// Iterates the decoded instructions of the line.
    pub fn instructions(self: &Self) -> Instructions<'_> {
        Instructions { code: &self.code, position: 0 }
    }
    /// Whether the line contains the given opcode.
    pub fn contains(self: &Self, opcode: OpCode) -> bool {
        self.instructions().any(|i| i.opcode == Some(opcode))
    }
    /// Returns the sequence of opcodes in the line.
    pub fn opcodes(self: &Self) -> Vec<OpCode> {
        self.instructions().filter_map(|i| i.opcode).collect()
    }
    /// Position of the line's trailing `jump` or `ifno`, if the line ends with one.
    pub fn trailing_jump(self: &Self) -> Option<usize> {
        self.instructions()
            .last()
            .filter(|i| matches!(i.opcode, Some(OpCode::jump) | Some(OpCode::ifno)))
            .map(|i| i.position)
    }
    /// Inserts an operand-less instruction immediately before the trailing jump, or at the end of the line.
    pub(crate) fn insert_before_trailing_jump(self: &mut Self, opcode: OpCode) {
        debug_assert!(opcode.fixed_operands() == 0);
        match self.trailing_jump() {
            Some(position) => self.code.insert(position, opcode as Value),
            None => self.code.push(opcode as Value),
        }
    }
    /// Writes an instruction without inline operands.
    pub(crate) fn instruction(self: &mut Self, opcode: OpCode) -> usize {
        debug_assert!(opcode.fixed_operands() == 0);
        let position = self.code.len();
        self.code.push(opcode as Value);
        position
    }
    /// Writes a string literal instruction.
    pub(crate) fn string(self: &mut Self, text: &str) -> usize {
        let position = self.lstr(text.chars().count() as Value);
        self.code.extend(text.chars().map(|c| c as Value));
        position
    }
    /// Overwrites the operand of the instruction at `position`.
    pub(crate) fn patch(self: &mut Self, position: usize, operand: Value) {
        self.code[position + 1] = operand;
    }
}

impl Debug for Line {
    fn fmt(self: &Self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for instruction in self.instructions() {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            match instruction.opcode {
                Some(opcode) if opcode == OpCode::lstr => {
                    let text: String = instruction.operands.iter().skip(1).map(|&c| char::from_u32(c as u32).unwrap_or('?')).collect();
                    write!(f, "lstr {:?}", text)?;
                }
                Some(opcode) => {
                    write!(f, "{}", opcode.mnemonic())?;
                    for operand in instruction.operands {
                        write!(f, " {}", operand)?;
                    }
                }
                None => write!(f, "<{}>", instruction.value)?,
            }
        }
        Ok(())
    }
}

/// Represents the various ways a bytecode program can be malformed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BytecodeErrorKind {
    UnknownOpcode(Value),
    MissingOperands(OpCode),
    InvalidTarget(OpCode, Value),
}

/// A malformed instruction found by `Bytecode::validate`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BytecodeError {
    pub kind    : BytecodeErrorKind,
    pub line    : LineIndex,
    pub position: usize,
}

impl Display for BytecodeError {
    fn fmt(self: &Self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            BytecodeErrorKind::UnknownOpcode(value) => write!(f, "Unknown opcode {} at line {}, position {}", value, self.line, self.position),
            BytecodeErrorKind::MissingOperands(opcode) => write!(f, "Missing operands for {} at line {}, position {}", opcode.mnemonic(), self.line, self.position),
            BytecodeErrorKind::InvalidTarget(opcode, target) => write!(f, "Invalid target {} for {} at line {}, position {}", target, opcode.mnemonic(), self.line, self.position),
        }
    }
}

/// A compiled program: the sequence of bytecode lines.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bytecode {
    lines: Vec<Line>,
}

impl Bytecode {
    /// Creates a program from the given lines.
    pub fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }
    /// Creates a program from raw line values, e.g. loaded from a program file.
    pub fn from_values(lines: Vec<Vec<Value>>) -> Self {
        Self { lines: lines.into_iter().map(Line::from_values).collect() }
    }
    /// Returns the raw line values.
    pub fn to_values(self: &Self) -> Vec<Vec<Value>> {
        self.lines.iter().map(|line| line.code.clone()).collect()
    }
    /// The lines of the program.
    pub fn lines(self: &Self) -> &[Line] {
        &self.lines
    }
    /// Returns the line at `index`.
    pub fn line(self: &Self, index: LineIndex) -> Option<&Line> {
        self.lines.get(index)
    }
    /// Number of lines.
    pub fn len(self: &Self) -> usize {
        self.lines.len()
    }
    /// Whether the program has no lines.
    pub fn is_empty(self: &Self) -> bool {
        self.lines.is_empty()
    }
    /// Returns every jump-class instruction as (line, position, opcode, target).
    pub fn jump_targets(self: &Self) -> Vec<(LineIndex, usize, OpCode, Value)> {
        let mut result = Vec::new();
        for (index, line) in self.lines.iter().enumerate() {
            for instruction in line.instructions() {
                match (instruction.opcode, instruction.operands.first()) {
                    (Some(opcode), Some(&target)) if opcode.is_jump_class() => result.push((index, instruction.position, opcode, target)),
                    _ => { }
                }
            }
        }
        result
    }
    /// Checks that every instruction is known and complete and every jump-class target is a valid line index.
    pub fn validate(self: &Self) -> Result<(), BytecodeError> {
        for (index, line) in self.lines.iter().enumerate() {
            for instruction in line.instructions() {
                let error = |kind| Err(BytecodeError { kind, line: index, position: instruction.position });
                let opcode = match instruction.opcode {
                    Some(opcode) => opcode,
                    None => return error(BytecodeErrorKind::UnknownOpcode(instruction.value)),
                };
                if instruction.operands.len() != opcode.operand_count(&line.code, instruction.position) {
                    return error(BytecodeErrorKind::MissingOperands(opcode));
                }
                if opcode.is_jump_class() {
                    let target = instruction.operands[0];
                    if target < 0 || target as usize >= self.lines.len() {
                        return error(BytecodeErrorKind::InvalidTarget(opcode, target));
                    }
                }
            }
        }
        Ok(())
    }
    /// Disassembles the program, one line per bytecode line.
    pub fn disassemble(self: &Self) -> String {
        let width = self.lines.len().to_string().len();
        let mut result = String::new();
        for (index, line) in self.lines.iter().enumerate() {
            result.push_str(&format!("{:>width$}: {:?}\n", index, line, width = width));
        }
        result
    }
}

impl Debug for Bytecode {
    fn fmt(self: &Self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.disassemble())
    }
}
