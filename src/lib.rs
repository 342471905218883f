// src/lib.rs

//! Satchel package-manager front end
//!
//! The two pieces of a package manager that sit between the operator and
//! the resolution/transfer machinery:
//!
//! - **Request parsing**: free-form command-line package arguments
//!   (`+vim`, `satchel>=1.2.15`, `non-oss:opera-2:10.1-1.2.gcc44.x86_64`)
//!   become structured wanted/unwanted capability sets, scoped to
//!   configured repositories.
//! - **Transfer recovery**: classified download and media failures become
//!   one of abort/retry/ignore/change-location, decided interactively
//!   with scheme-specific options, bounded timeouts, and repeat-failure
//!   escalation.
//!
//! # Architecture
//!
//! - No global state: an explicit [`Session`] carries options, runtime
//!   flags, and the terminal into both subsystems
//! - Total parsing: the argument coalescer and capability guesser always
//!   produce a result, never an error
//! - Collaborators behind traits: prompting ([`Terminal`]) and media
//!   handling ([`DeviceEjector`]) are injected, so the decision logic is
//!   deterministic under test

mod error;
pub mod recovery;
pub mod repository;
pub mod request;
pub mod session;
pub mod terminal;

pub use error::{Error, Result};
pub use recovery::{
    DeviceEjector, FailureKind, RecoveryAction, RecoveryConfig, RecoveryEngine, RepeatCounter,
    StaticDevices, TransferFailure,
};
pub use repository::{Repository, RepositoryRegistry};
pub use request::{
    CapKind, CapRepoPair, Capability, CompareOp, Constraint, DuplicatePolicy, Edition,
    PackageRequests, RequestParser, coalesce_args,
};
pub use session::{Options, RuntimeState, Session};
pub use terminal::{Console, PromptOptions, Scripted, Terminal, Transcript};
