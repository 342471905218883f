// src/recovery/mod.rs

//! Interactive recovery decisions for transfer failures.
//!
//! When the external transfer/install engine hits a problem — wrong disc
//! in the drive, flaky mirror, dead link — it reports a classified
//! failure and expects one of four answers back: abort, retry, ignore,
//! or change location. The [`RecoveryEngine`] produces that answer, by
//! prompting the operator where possible and by configured defaults
//! where not. Richer decisions (ejecting a drive, disabling certificate
//! checks) are carried out as side effects before the answer is
//! returned; the engine itself never fails.

mod counter;
mod devices;
mod engine;

pub use counter::RepeatCounter;
pub use devices::{DeviceEjector, StaticDevices};
pub use engine::{RecoveryConfig, RecoveryEngine};

use strum_macros::Display;

/// Classification of a failure, supplied by the transfer engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A medium is present but it is not the requested one.
    WrongMedium,
    /// The requested medium is not available at all.
    MissingMedium,
    /// A transient I/O error; retrying may well succeed.
    SoftIo,
    /// Anything else.
    Generic,
}

/// The only vocabulary the transfer engine understands as an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum RecoveryAction {
    Abort,
    Retry,
    Ignore,
    ChangeLocation,
}

/// One reported failure event.
#[derive(Debug, Clone)]
pub struct TransferFailure {
    pub kind: FailureKind,
    /// Human-readable label of the medium, e.g. a product name.
    pub label: String,
    /// Which medium of a multi-part set failed (1-based).
    pub medium_nr: u32,
    /// Description supplied by the transfer engine, shown verbatim.
    pub description: String,
}

impl TransferFailure {
    pub fn new(kind: FailureKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            label: String::new(),
            medium_nr: 1,
            description: description.into(),
        }
    }
}
