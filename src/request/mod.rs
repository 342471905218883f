// src/request/mod.rs

//! Package request parsing
//!
//! Turns the free-form package arguments of an install/remove command into
//! structured requests. The pipeline has three stages:
//!
//! 1. [`coalesce_args`] merges raw argument tokens so that comparison
//!    operators split across shell words end up inside one specifier
//!    (`satchel = 1.2.15` becomes `satchel=1.2.15`).
//! 2. Each coalesced argument is resolved: install/remove modifier,
//!    optional `repo:` prefix checked against the configured repositories,
//!    then a best-effort parse into a [`Capability`].
//! 3. The results accumulate into a [`PackageRequests`] value holding the
//!    wanted and unwanted sets.
//!
//! # Accepted argument shapes
//!
//! ```text
//! vim                                   bare name
//! +vim  ~vim                            force install
//! -emacs  !emacs                        force removal
//! libdnet1.i586                         name.arch
//! satchel>=1.2.15                        name op edition
//! opera-2:10.1-1.2.gcc44.x86_64         name-edition.arch
//! perl-devel:perl(Digest::MD5)          repo prefix + dependency expression
//! pattern:lamp_server                   explicit kind
//! ```

pub mod capability;
pub mod coalesce;
pub mod parser;

pub use capability::{CapKind, Capability, CompareOp, Constraint, Edition};
pub use coalesce::coalesce_args;
pub use parser::{CapRepoPair, DuplicatePolicy, PackageRequests, RequestParser};
