//! Generic utility primitives with zero domain knowledge.
//!
//! - `command` - External process execution with captured output
//! - `io` - File I/O with consistent error handling
//! - `shell` - Shell escaping and quoting
//! - `validation` - Option unwrapping with validation errors

pub mod command;
pub mod io;
pub mod shell;
pub mod validation;
