
/// Type of a memory cell, an operand stack slot and a bytecode operand.
pub type Value = i32;

/// Type representing a memory address.
pub type Address = usize;

/// Type representing a line index into the bytecode.
pub type LineIndex = usize;

/// Value pushed by comparison operators for "true". Literal booleans are encoded by the front end.
pub const TRUE: Value = -1;

/// Value pushed by comparison operators for "false".
pub const FALSE: Value = 0;

/// Memory address of the frame base pointer.
pub const FRAME_BASE: Address = 0;

/// Memory address of the first turtle property. The six properties occupy consecutive cells.
pub const TURTLE_BASE: Address = 1;

/// Number of built-in turtle properties.
pub const TURTLE_SLOTS: usize = 6;

/// Memory address of the first program-level variable.
pub const GLOBAL_BASE: Address = TURTLE_BASE + TURTLE_SLOTS;

/// Number of header cells preceding the elements of an array (element count, first index).
pub const ARRAY_HEADER: usize = 2;

/// Number of header cells preceding the characters of a heap string (maximum length, length).
pub const STRING_HEADER: usize = 2;

/// Maximum length of a string variable if the declaration does not specify one.
pub const DEFAULT_STRING_LENGTH: usize = 32;

/// Maximum length of a function's string result.
pub const RESULT_STRING_LENGTH: usize = 255;

/// Capacity of the keyboard buffer created by the global setup line.
pub const KEYBUFFER_SIZE: usize = 32;

/// Number of tracked key codes.
pub const KEY_CODES: usize = 256;

/// Upper bound for the cell count of a single frame or global region.
pub const MAX_FRAME_SIZE: usize = 1 << 24;
