//! Bytecode interpretation.
//!
//! The [`Machine`] owns memory, stacks and turtle state and executes pcode cooperatively: each [`Machine::tick`]
//! runs a bounded batch of instructions. Drawing, output and timer requests are reported as [`Message`]s to a
//! [`Host`]; keyboard, pointer and timer events are delivered through [`Machine::resume`].

mod error;
mod options;
mod host;
mod memory;
mod machine;
mod exec;
mod turtle;
mod strings;
mod math;
mod input;
mod colours;
mod random;

pub use self::error::{RuntimeError, RuntimeErrorKind, RuntimeResult};
pub use self::options::Options;
pub use self::host::{Host, Message, Draw, Turtle, MemoryDump, Point, Recorder};
pub use self::machine::{Machine, MachineState, Suspension, WaitKind, Event};
pub use self::colours::PALETTE;
