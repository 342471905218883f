// src/request/parser.rs

//! Resolving coalesced arguments into wanted/unwanted request sets.
//!
//! Each argument is processed in a fixed order: the install/remove
//! modifier is consumed first, then an optional repository prefix is
//! validated against the configured repositories, and the remainder is
//! handed to the capability guesser. Kind conflicts between the argument
//! and the command context are reconciled last.

use std::fmt;
use strum_macros::{Display, EnumString};
use tracing::debug;

use crate::error::{Error, Result};
use crate::repository::RepositoryRegistry;
use crate::session::Session;

use super::capability::{CapKind, Capability};
use super::coalesce::coalesce_args;

/// Install/remove modifier consumed from the front of an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    Want,
    Unwant,
}

/// A capability scoped to the repository it may be satisfied from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CapRepoPair {
    pub capability: Capability,
    /// Alias of the repository named by a `repo:` prefix, if any.
    pub repo: Option<String>,
}

impl fmt::Display for CapRepoPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.capability)?;
        if let Some(ref repo) = self.repo {
            write!(f, " (repository: {})", repo)?;
        }
        Ok(())
    }
}

/// Policy for a capability requested both for install and removal.
///
/// Upstream package tools keep both entries and let the dependency
/// resolver sort out the contradiction, which is what [`Retain`] does.
///
/// [`Retain`]: DuplicatePolicy::Retain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Keep the entry in both sets.
    #[default]
    Retain,
    /// The later argument evicts the earlier one from the opposite set.
    LastWins,
    /// Fail parsing with an error naming the capability.
    Reject,
}

/// The accumulated outcome of parsing: what must be present and what
/// must be absent. Insertion-ordered; exact duplicates within one set
/// are dropped. There is no removal operation.
#[derive(Debug, Default)]
pub struct PackageRequests {
    wanted: Vec<CapRepoPair>,
    unwanted: Vec<CapRepoPair>,
}

impl PackageRequests {
    /// Capabilities that must be present after the operation.
    pub fn wanted(&self) -> &[CapRepoPair] {
        &self.wanted
    }

    /// Capabilities that must be absent after the operation.
    pub fn unwanted(&self) -> &[CapRepoPair] {
        &self.unwanted
    }

    pub fn is_empty(&self) -> bool {
        self.wanted.is_empty() && self.unwanted.is_empty()
    }

    fn insert(&mut self, pair: CapRepoPair, modifier: Modifier, policy: DuplicatePolicy) -> Result<()> {
        let (target, opposite) = match modifier {
            Modifier::Want => (&mut self.wanted, &mut self.unwanted),
            Modifier::Unwant => (&mut self.unwanted, &mut self.wanted),
        };

        if target.contains(&pair) {
            return Ok(());
        }

        if opposite.contains(&pair) {
            match policy {
                DuplicatePolicy::Retain => {}
                DuplicatePolicy::LastWins => opposite.retain(|p| p != &pair),
                DuplicatePolicy::Reject => {
                    return Err(Error::Parse(format!(
                        "'{}' was requested both for installation and removal",
                        pair.capability
                    )));
                }
            }
        }

        target.push(pair);
        Ok(())
    }
}

/// Parses raw package arguments against a session and repository
/// registry.
pub struct RequestParser<'a> {
    session: &'a mut Session,
    registry: &'a RepositoryRegistry,
    default_kind: CapKind,
    policy: DuplicatePolicy,
}

impl<'a> RequestParser<'a> {
    /// `default_kind` is the kind the surrounding command operates on,
    /// e.g. patch for a patch command.
    pub fn new(
        session: &'a mut Session,
        registry: &'a RepositoryRegistry,
        default_kind: CapKind,
    ) -> Self {
        Self {
            session,
            registry,
            default_kind,
            policy: DuplicatePolicy::default(),
        }
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Coalesce and resolve `args` into a [`PackageRequests`] value.
    pub fn parse<S: AsRef<str>>(&mut self, args: &[S]) -> Result<PackageRequests> {
        let mut requests = PackageRequests::default();
        for arg in coalesce_args(args) {
            self.resolve_one(&arg, &mut requests)?;
        }
        Ok(requests)
    }

    fn resolve_one(&mut self, arg: &str, requests: &mut PackageRequests) -> Result<()> {
        let (modifier, rest) = strip_modifier(arg);
        let (repo, rest) = self.strip_repo_prefix(rest);

        let mut capability = Capability::guess(rest);

        // the kind spelled in the argument beats the command context,
        // but only when it was actually spelled
        if capability.kind != self.default_kind {
            if CapKind::split_ident(rest).is_some() {
                self.session.terminal.warning(&format!(
                    "Requested kind '{}' differs from the kind specified in '{}'. Using the latter.",
                    self.default_kind, arg
                ));
            } else {
                capability.kind = self.default_kind;
            }
        }

        debug!(
            "got {} '{}'; repo {:?}",
            match modifier {
                Modifier::Want => "wanted",
                Modifier::Unwant => "unwanted",
            },
            capability,
            repo
        );

        requests.insert(CapRepoPair { capability, repo }, modifier, self.policy)
    }

    /// Detect and strip a `repo:` prefix. A colon at or after the first
    /// `(` or `=` belongs to capability syntax, and a candidate that the
    /// registry does not know leaves the argument untouched.
    fn strip_repo_prefix<'s>(&self, arg: &'s str) -> (Option<String>, &'s str) {
        let Some(pos) = arg.find(':') else {
            return (None, arg);
        };
        if arg.find(['(', '=']).is_some_and(|p| p <= pos) {
            return (None, arg);
        }
        let candidate = &arg[..pos];
        match self.registry.resolve(candidate) {
            Some(repo) => {
                debug!("got repo '{}' for '{}'", repo.alias, &arg[pos + 1..]);
                (Some(repo.alias.clone()), &arg[pos + 1..])
            }
            None => (None, arg),
        }
    }
}

/// Consume a leading install/remove modifier. Anything unmarked counts
/// as wanted.
fn strip_modifier(arg: &str) -> (Modifier, &str) {
    match arg.chars().next() {
        Some('+') | Some('~') => (Modifier::Want, &arg[1..]),
        Some('-') | Some('!') => (Modifier::Unwant, &arg[1..]),
        _ => (Modifier::Want, arg),
    }
}
