use crate::prelude::*;
#[cfg(feature="compiler")]
use crate::compiler::error::CompileError;
#[cfg(feature="runtime")]
use crate::runtime::RuntimeError;
use crate::bytecode::BytecodeError;

/// An error generated during program compilation, execution or program file handling.
#[derive(Debug)]
pub enum Error {
    #[cfg(feature="compiler")]
    CompileError(CompileError),
    #[cfg(feature="runtime")]
    RuntimeError(RuntimeError),
    FileError(serde_json::Error),
    InvalidBytecode(BytecodeError),
}

impl Display for Error {
    fn fmt(self: &Self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature="compiler")]
            Self::CompileError(e) => write!(f, "{}", e),
            #[cfg(feature="runtime")]
            Self::RuntimeError(e) => write!(f, "{}", e),
            Self::FileError(e) => write!(f, "Invalid program file: {}", e),
            Self::InvalidBytecode(e) => write!(f, "Invalid bytecode: {}", e),
        }
    }
}

impl std::error::Error for Error { }

#[cfg(feature="compiler")]
impl From<CompileError> for Error {
    fn from(error: CompileError) -> Error {
        Error::CompileError(error)
    }
}

#[cfg(feature="runtime")]
impl From<RuntimeError> for Error {
    fn from(error: RuntimeError) -> Error {
        Error::RuntimeError(error)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Error {
        Error::FileError(error)
    }
}

impl From<BytecodeError> for Error {
    fn from(error: BytecodeError) -> Error {
        Error::InvalidBytecode(error)
    }
}
