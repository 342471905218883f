// src/error.rs

//! Crate-wide error type
//!
//! Most of satchel is deliberately total: the argument coalescer, the
//! capability guesser, and the recovery engine always produce a result.
//! Errors are reserved for the few places where failing is the contract:
//! rejected duplicate requests, unreadable configuration, terminal I/O,
//! and device ejection.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Device error: {0}")]
    Device(String),
}

/// Result type for satchel operations
pub type Result<T> = std::result::Result<T, Error>;
