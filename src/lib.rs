//! Typed compiler and cooperative bytecode virtual machine for turtle-graphics teaching languages.
//!
//! Front ends for the individual surface languages build a language-neutral [`tree::Program`]. The
//! [`compiler`] checks and lowers it into [`bytecode::Bytecode`] ("pcode"), a sequence of lines of integer
//! opcodes and operands. The [`runtime`] executes pcode in time slices, reporting drawing and output to a
//! [`runtime::Host`].
//!
//! # Examples
//!
//! ```
//! use turtle_pcode::{tree::Program, compiler::{compile, parser::parse_statement}, runtime::{Machine, Options, Recorder}};
//! use turtle_pcode::bytecode::Language;
//!
//! let mut program = Program::new(Language::Pascal, "demo");
//! let statement = parse_statement(&program, Program::ID, "forward(10 * 5)").unwrap();
//! program.push_statement(Program::ID, statement);
//!
//! let bytecode = compile(&program).unwrap();
//! let mut machine = Machine::new(Recorder::new());
//! machine.run(bytecode, Options::default()).unwrap();
//! machine.run_to_end().unwrap();
//! assert_eq!(machine.host().lines().len(), 1);
//! ```

pub mod bytecode;
pub mod config;
pub mod shared;
#[cfg(feature="compiler")]
pub mod tree;
#[cfg(feature="compiler")]
pub mod compiler;
#[cfg(feature="runtime")]
pub mod runtime;

pub use shared::error::Error;

pub(crate) mod prelude {
    #![allow(unused_imports)]
    pub use std::fmt::{self, Debug, Display};
    pub use serde::{Serialize, Deserialize};
}

/// One stop shop to compile a program tree and run it to completion (or its first suspension) on the given host.
#[cfg(all(feature="compiler", feature="runtime"))]
pub fn run<H: runtime::Host>(program: &tree::Program, host: H, options: runtime::Options) -> Result<runtime::Machine<H>, Error> {
    let bytecode = compiler::compile(program)?;
    let mut machine = runtime::Machine::new(host);
    machine.run(bytecode, options)?;
    machine.run_to_end()?;
    Ok(machine)
}
