use crate::prelude::*;
use crate::config::{Value, LineIndex};

/// Represents the various possible runtime error-kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum RuntimeErrorKind {
    AngleZero,
    IndexOutOfRange,
    StringIndexOutOfRange,
    DivisionByZero,
    InvalidResult,
    StackOverflow,
    StackUnderflow,
    HeapOverflow,
    NotImplemented,
    InvalidJump(Value),
    InvalidOpCode(Value),
    InvalidAddress(Value),
    InvalidRelease,
    AlreadyRunning,
}

/// An error reported by the runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeError {
    kind    : RuntimeErrorKind,
    line    : LineIndex,
    position: usize,
}

impl RuntimeError {
    pub(crate) fn new(kind: RuntimeErrorKind, line: LineIndex, position: usize) -> RuntimeError {
        Self { kind, line, position }
    }
    /// The kind of the error.
    pub fn kind(self: &Self) -> RuntimeErrorKind {
        self.kind
    }
    /// Bytecode line of the failing instruction.
    pub fn line(self: &Self) -> LineIndex {
        self.line
    }
    /// Position of the failing instruction within its line.
    pub fn position(self: &Self) -> usize {
        self.position
    }
}

impl Display for RuntimeErrorKind {
    fn fmt(self: &Self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeErrorKind::AngleZero => write!(f, "Angles cannot be set to zero."),
            RuntimeErrorKind::IndexOutOfRange => write!(f, "Array index out of range."),
            RuntimeErrorKind::StringIndexOutOfRange => write!(f, "String index out of range."),
            RuntimeErrorKind::DivisionByZero => write!(f, "Division by zero."),
            RuntimeErrorKind::InvalidResult => write!(f, "The result of a calculation is invalid."),
            RuntimeErrorKind::StackOverflow => write!(f, "Memory stack has overflowed."),
            RuntimeErrorKind::StackUnderflow => write!(f, "Memory stack has underflowed."),
            RuntimeErrorKind::HeapOverflow => write!(f, "Memory heap has overflowed."),
            RuntimeErrorKind::NotImplemented => write!(f, "File processing has not been implemented."),
            RuntimeErrorKind::InvalidJump(line) => write!(f, "Jump to non-existent line {}.", line),
            RuntimeErrorKind::InvalidOpCode(value) => write!(f, "Invalid instruction {}.", value),
            RuntimeErrorKind::InvalidAddress(address) => write!(f, "Invalid memory address {}.", address),
            RuntimeErrorKind::InvalidRelease => write!(f, "Memory released without being claimed."),
            RuntimeErrorKind::AlreadyRunning => write!(f, "A program is already running."),
        }
    }
}

impl Display for RuntimeError {
    fn fmt(self: &Self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for RuntimeError { }

pub type RuntimeResult<T = ()> = Result<T, RuntimeError>;

/// Result of a single operation. The machine adds the location of the failing instruction.
pub(crate) type OpResult<T = ()> = Result<T, RuntimeErrorKind>;
