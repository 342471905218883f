// src/session.rs

//! Explicit session state shared by the request parser and the recovery
//! engine.
//!
//! Everything the two subsystems need from their surroundings travels in a
//! [`Session`] passed by mutable reference: output and prompting go through
//! the attached [`Terminal`], and cross-call memory (the one-time verify
//! hint, whether a package download is in flight) lives in
//! [`RuntimeState`]. There is no process-wide singleton.

use crate::terminal::{Console, Terminal};

/// Global options that shape prompting behavior.
#[derive(Debug, Clone)]
pub struct Options {
    /// Answer every prompt with its default instead of asking.
    pub non_interactive: bool,
    /// Output verbosity: -1 quiet, 0 normal, 1 verbose, 2 debug.
    pub verbosity: i32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            non_interactive: false,
            verbosity: 0,
        }
    }
}

/// Mutable state accumulated over a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeState {
    /// Set by the caller while package payloads are being downloaded, so
    /// that ignoring a failed download can trigger the verify hint.
    pub downloading_packages: bool,
    /// Whether the verify hint was already shown in this run.
    pub seen_verify_hint: bool,
}

/// The session value threaded through both subsystems.
pub struct Session {
    pub options: Options,
    pub runtime: RuntimeState,
    pub terminal: Box<dyn Terminal>,
}

impl Session {
    /// Create a session talking to the console.
    pub fn new(options: Options) -> Self {
        let terminal = Box::new(Console::new(options.non_interactive));
        Self {
            options,
            runtime: RuntimeState::default(),
            terminal,
        }
    }

    /// Create a session with a caller-supplied terminal, e.g. a
    /// [`crate::terminal::Scripted`] replay for embedding or tests.
    pub fn with_terminal(options: Options, terminal: Box<dyn Terminal>) -> Self {
        Self {
            options,
            runtime: RuntimeState::default(),
            terminal,
        }
    }
}
