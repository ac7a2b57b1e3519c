//! Shared code for compiler and runtime.

pub mod typed_ids;
pub mod types;
pub mod error;
