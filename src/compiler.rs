//! Type checking and bytecode generation.
//!
//! Front ends build the program tree through the constructors in [`typecheck`] (or parse neutral syntax
//! with [`parser`]). [`compile`] validates the finished tree and lowers it into bytecode.

pub mod error;
pub mod typecheck;
pub mod constant;
pub mod parser;
mod encoder;

use crate::bytecode::Bytecode;
use crate::tree::Program;
use error::CompileResult;

pub use error::{CompileError, CompileErrorKind};

/// Validates the given program tree and compiles it to bytecode.
///
/// Errors in the program are reported as user errors. A tree with dangling references or any failure
/// of the code generator's own invariants is reported as an internal error (see [`CompileError::is_internal`]).
pub fn compile(program: &Program) -> CompileResult<Bytecode> {
    typecheck::check_program(program)?;
    let bytecode = encoder::encode(program)?;
    log::debug!("compiled program '{}': {} routines, {} lines", program.name, program.routine_count(), bytecode.len());
    Ok(bytecode)
}
