use crate::prelude::*;
use crate::shared::types::Type;
use crate::tree::{Position, Positioned};

/// Represents the various possible compiler error-kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum CompileErrorKind {
    TypeMismatch { expected: Type, found: Type },
    /// The tree references a variable or routine that does not exist.
    Unresolved(String),
    Internal(String),
    NonConstant(String),
    InvalidConstant(String),
    InvalidLoopStep,
    ArgumentCount { name: String, expected: usize, found: usize },
    ReferenceArgument(String),
    NotAProcedure(String),
    NotAFunction(String),
    NonLocalVariable(String),
    MultiDimensionalIndex(String),
    NotIndexable(String),
    ArrayValueParameter(String),
    UnindexedArray(String),
    ReturnOutsideFunction,
    InvalidReturn(String),
    Syntax(String),
    UnknownIdentifier(String),
    ConstantAssignment(String),
}

/// An error reported by the compiler.
#[derive(Clone, Debug, PartialEq)]
pub struct CompileError {
    kind: CompileErrorKind,
    position: Position,
}

impl CompileError {
    pub(crate) fn new(item: &dyn Positioned, kind: CompileErrorKind) -> CompileError {
        Self { kind, position: item.position() }
    }
    pub(crate) fn at(position: Position, kind: CompileErrorKind) -> CompileError {
        Self { kind, position }
    }
    #[cfg_attr(feature="ice_panics", allow(dead_code))]
    pub(crate) fn ice(message: String) -> CompileError {
        #[cfg(feature="ice_panics")]
        panic!("Internal compiler error: {}", message);
        #[cfg(not(feature="ice_panics"))]
        Self { kind: CompileErrorKind::Internal(message), position: Position(0) }
    }
    /// Compute 1-based line/column number in string.
    pub fn loc(self: &Self, input: &str) -> (u32, u32) {
        self.position.loc(input)
    }
    /// The kind of the error.
    pub fn kind(self: &Self) -> &CompileErrorKind {
        &self.kind
    }
    /// Source position of the offending tree node.
    pub fn position(self: &Self) -> Position {
        self.position
    }
    /// Whether the error is a contract violation or code generation failure rather than a mistake in the program.
    pub fn is_internal(self: &Self) -> bool {
        matches!(self.kind, CompileErrorKind::Internal(_) | CompileErrorKind::Unresolved(_))
    }
}

impl Display for CompileError {
    fn fmt(self: &Self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            CompileErrorKind::TypeMismatch { expected, found } => write!(f, "Type error: '{expected}' expected but '{found}' found."),
            CompileErrorKind::Unresolved(name) => write!(f, "Internal compiler error: unresolved reference to '{name}'."),
            CompileErrorKind::Internal(msg) => write!(f, "Internal compiler error: {msg}"),
            CompileErrorKind::NonConstant(what) => write!(f, "Constant expression expected but {what} found."),
            CompileErrorKind::InvalidConstant(msg) => write!(f, "Invalid constant expression: {msg}."),
            CompileErrorKind::InvalidLoopStep => write!(f, "Loop step must be 1 or -1."),
            CompileErrorKind::ArgumentCount { name, expected, found } => write!(f, "'{name}' expects {expected} argument(s) but {found} given."),
            CompileErrorKind::ReferenceArgument(name) => write!(f, "Reference parameter '{name}' requires a variable argument."),
            CompileErrorKind::NotAProcedure(name) => write!(f, "'{name}' is not a procedure."),
            CompileErrorKind::NotAFunction(name) => write!(f, "'{name}' is not a function."),
            CompileErrorKind::NonLocalVariable(name) => write!(f, "Variable '{name}' belongs to an enclosing subroutine and is not accessible here."),
            CompileErrorKind::MultiDimensionalIndex(name) => write!(f, "Multi-dimensional indexing of '{name}' is not supported."),
            CompileErrorKind::NotIndexable(name) => write!(f, "'{name}' is not an array or string."),
            CompileErrorKind::ArrayValueParameter(name) => write!(f, "Array parameter '{name}' must be passed by reference."),
            CompileErrorKind::UnindexedArray(name) => write!(f, "Array '{name}' must be indexed."),
            CompileErrorKind::ReturnOutsideFunction => write!(f, "Return statement outside of a subroutine."),
            CompileErrorKind::InvalidReturn(name) => write!(f, "Invalid return from '{name}': functions must return a value, procedures must not."),
            CompileErrorKind::Syntax(msg) => write!(f, "Syntax error: {msg}"),
            CompileErrorKind::UnknownIdentifier(name) => write!(f, "Unknown identifier '{name}'."),
            CompileErrorKind::ConstantAssignment(name) => write!(f, "'{name}' is not a variable and cannot be assigned to."),
        }
    }
}

impl std::error::Error for CompileError { }

pub type CompileResult<T = ()> = Result<T, CompileError>;

/// Trait to convert an Option to a Result compatible with CompileResult
pub(crate) trait OptionToCompileError<T> {
    fn ice_msg(self: Self, message: &str) -> CompileResult<T>;
    fn ice(self: Self) -> CompileResult<T>;
}

impl<T> OptionToCompileError<T> for Option<T> {
    fn ice_msg(self: Self, message: &str) -> CompileResult<T> {
        if let Some(result) = self {
            Ok(result)
        } else {
            Err(CompileError::ice(message.to_string()))
        }
    }
    fn ice(self: Self) -> CompileResult<T> {
        self.ice_msg("Expectation failed.")
    }
}
