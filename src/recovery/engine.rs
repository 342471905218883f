// src/recovery/engine.rs

//! The Abort/Retry/Ignore decision machine for transfer failures.
//!
//! One call to [`RecoveryEngine::resolve`] handles one reported failure:
//! classify, build the applicable prompt options, obtain a selection
//! (or a default, non-interactively or on timeout), apply its side
//! effect, and hand a [`RecoveryAction`] back. Every branch terminates
//! in a concrete action; the engine never returns an error.

use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::session::Session;
use crate::terminal::PromptOptions;

use super::counter::RepeatCounter;
use super::devices::DeviceEjector;
use super::{FailureKind, RecoveryAction, TransferFailure};

const PROMPT_ARI: &str = "Abort, retry, ignore?";

// indices into the common option set
const OPT_ABORT: usize = 0;
const OPT_RETRY: usize = 1;
const OPT_IGNORE: usize = 2;
const OPT_CHANGE_URI: usize = 3;
/// index of the scheme-specific extra option, when present
const OPT_SCHEME_EXTRA: usize = 4;

/// Tunables for the decision engine.
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Consecutive soft failures tolerated per location before the
    /// suggested action escalates from retry to abort.
    pub soft_error_limit: u32,
    /// How long the soft-error prompt waits before answering itself.
    pub prompt_timeout: Duration,
    /// Action suggested for a soft error while still below the limit.
    /// Only abort, retry, and ignore are selectable here.
    pub soft_default: RecoveryAction,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            soft_error_limit: 2,
            prompt_timeout: Duration::from_secs(30),
            soft_default: RecoveryAction::Retry,
        }
    }
}

/// Maps classified transfer failures to recovery actions.
///
/// The engine is re-entered once per failure event; the only state kept
/// between calls is the per-location [`RepeatCounter`].
pub struct RecoveryEngine {
    config: RecoveryConfig,
    repeats: RepeatCounter,
}

impl RecoveryEngine {
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            config,
            repeats: RepeatCounter::new(),
        }
    }

    /// Note a successful transfer from `url`, clearing its failure
    /// history.
    pub fn transfer_succeeded(&mut self, url: &Url) {
        self.repeats.reset(url.as_str());
    }

    /// Failures recorded so far for `url`.
    pub fn failure_count(&self, url: &Url) -> u32 {
        self.repeats.count(url.as_str())
    }

    /// Decide how to proceed after `failure` while transferring from
    /// `url`. May rewrite `url` in place (change-location, certificate
    /// downgrade); the caller retries against the rewritten location.
    pub fn resolve(
        &mut self,
        session: &mut Session,
        devices: &dyn DeviceEjector,
        failure: &TransferFailure,
        url: &mut Url,
    ) -> RecoveryAction {
        debug!("medium problem, url: {}", url);
        if !failure.description.is_empty() {
            session.terminal.error(&failure.description);
        }

        // a wrong disc in a changeable drive is a plain swap question
        if failure.kind == FailureKind::WrongMedium && is_changeable_media(url) {
            let question = format!(
                "Please insert medium [{}] #{} and confirm to continue the operation.",
                failure.label, failure.medium_nr
            );
            return if session.terminal.confirm(&question, false) {
                RecoveryAction::Retry
            } else {
                RecoveryAction::Abort
            };
        }

        if failure.kind == FailureKind::SoftIo {
            let suggested = if self.repeats.overrun(url.as_str(), self.config.soft_error_limit) {
                RecoveryAction::Abort
            } else {
                self.config.soft_default
            };
            return self.soft_error_prompt(session, suggested);
        }

        let scheme = url.scheme().to_string();
        let action = match scheme.as_str() {
            "https" => self.secure_failure(session, url),
            "cd" | "dvd" => self.disc_failure(session, devices, url),
            _ => {
                let options = common_options();
                let reply = session.terminal.select(PROMPT_ARI, &options);
                self.common_reply(session, reply, url)
            }
        };

        if action == RecoveryAction::Ignore
            && session.runtime.downloading_packages
            && !session.runtime.seen_verify_hint
        {
            session.runtime.seen_verify_hint = true;
            session.terminal.info(
                "Ignoring a failed package download can leave the installation \
                 incomplete. Run a verification of installed packages once the \
                 operation finishes.",
            );
        }

        action
    }

    /// Timed Abort/Retry/Ignore prompt: the suggested action is taken
    /// when nothing is answered in time or the session is
    /// non-interactive.
    fn soft_error_prompt(&self, session: &mut Session, suggested: RecoveryAction) -> RecoveryAction {
        let default = match suggested {
            RecoveryAction::Abort => OPT_ABORT,
            RecoveryAction::Ignore => OPT_IGNORE,
            // retry also stands in for the one action not offered here
            RecoveryAction::Retry | RecoveryAction::ChangeLocation => OPT_RETRY,
        };
        let mut options = PromptOptions::new(default);
        options.push("a", "Skip retrieval of the file and abort current operation.");
        options.push("r", "Try to retrieve the file again.");
        options.push(
            "i",
            "Skip retrieval of the file and try to continue with the operation without the file.",
        );

        let reply = session
            .terminal
            .select_timed(PROMPT_ARI, &options, self.config.prompt_timeout);
        match reply {
            OPT_ABORT => RecoveryAction::Abort,
            OPT_RETRY => RecoveryAction::Retry,
            OPT_IGNORE => RecoveryAction::Ignore,
            other => {
                warn!("invalid prompt reply: {}", other);
                RecoveryAction::Abort
            }
        }
    }

    /// Secure transfer: the common options plus a certificate-check
    /// downgrade.
    fn secure_failure(&self, session: &mut Session, url: &mut Url) -> RecoveryAction {
        let mut options = common_options();
        options.push("s", "Disable SSL certificate authority check and continue.");

        let reply = session.terminal.select(PROMPT_ARI, &options);
        if reply == OPT_SCHEME_EXTRA {
            disable_cert_check(url);
            session
                .terminal
                .info("SSL certificate authority check disabled.");
            return RecoveryAction::Retry;
        }
        self.common_reply(session, reply, url)
    }

    /// Removable disc: the common options plus ejection.
    fn disc_failure(
        &self,
        session: &mut Session,
        devices: &dyn DeviceEjector,
        url: &mut Url,
    ) -> RecoveryAction {
        let mut options = common_options();
        options.push("e", "Eject medium.");

        let reply = session.terminal.select(PROMPT_ARI, &options);
        if reply == OPT_SCHEME_EXTRA {
            self.eject_dialog(session, devices, url);
            return RecoveryAction::Retry;
        }
        self.common_reply(session, reply, url)
    }

    /// Handle a selection from the common option set.
    fn common_reply(&self, session: &mut Session, reply: usize, url: &mut Url) -> RecoveryAction {
        match reply {
            OPT_ABORT => RecoveryAction::Abort,
            OPT_RETRY => RecoveryAction::Retry,
            OPT_IGNORE => RecoveryAction::Ignore,
            OPT_CHANGE_URI => {
                self.change_location(session, url);
                // a location change is always followed by a retry
                RecoveryAction::Retry
            }
            other => {
                warn!("invalid prompt reply: {}", other);
                RecoveryAction::Abort
            }
        }
    }

    /// Read a replacement location, re-prompting until it parses.
    /// Empty input keeps the current location.
    fn change_location(&self, session: &mut Session, url: &mut Url) {
        loop {
            let input = session.terminal.prompt_line("New URI", url.as_str());
            let text = input.trim();
            if text.is_empty() || text == url.as_str() {
                return;
            }
            match Url::parse(text) {
                Ok(new_url) => {
                    *url = new_url;
                    return;
                }
                Err(e) => session
                    .terminal
                    .warning(&format!("Invalid URI '{}': {}", text, e)),
            }
        }
    }

    /// The nested eject dialog. Whatever happens here, the outer action
    /// stays a retry.
    fn eject_dialog(&self, session: &mut Session, ejector: &dyn DeviceEjector, url: &Url) {
        let devices = ejector.detect(url);
        let mut cancelled = false;

        if devices.is_empty() {
            session.terminal.info("No devices detected, cannot eject.");
            session.terminal.info("Try to eject the device manually.");
        } else if devices.len() == 1 {
            debug!("ejecting {}", devices[0]);
            if let Err(e) = ejector.eject(url, &devices[0]) {
                session
                    .terminal
                    .warning(&format!("Failed to eject {}: {}", devices[0], e));
            }
        } else {
            session.terminal.info("Detected devices:");
            let mut options = PromptOptions::new(0);
            for (n, device) in devices.iter().enumerate() {
                session.terminal.info(&format!("{}  {}", n + 1, device));
                options.push(&(n + 1).to_string(), device);
            }
            options.push("c", "Cancel");

            let reply = session.terminal.select("Select device to eject.", &options);
            if reply >= devices.len() {
                if reply > devices.len() {
                    warn!("invalid prompt reply: {}", reply);
                }
                cancelled = true;
            } else {
                debug!("ejecting {}", devices[reply]);
                if let Err(e) = ejector.eject(url, &devices[reply]) {
                    session
                        .terminal
                        .warning(&format!("Failed to eject {}: {}", devices[reply], e));
                }
            }
        }

        if !cancelled {
            session
                .terminal
                .pause("Insert the medium and press ENTER to continue.");
        }
        session.terminal.info("Retrying...");
    }
}

/// The four options every failure prompt offers. The change-URI option
/// is accepted but kept out of the inline answer list.
fn common_options() -> PromptOptions {
    let mut options = PromptOptions::new(OPT_ABORT);
    options.push("a", "Skip retrieval of the file and abort current operation.");
    options.push("r", "Try to retrieve the file again.");
    options.push(
        "i",
        "Skip retrieval of the file and try to continue with the operation without the file.",
    );
    options.push(
        "u",
        "Change current base URI and try retrieving the file again.",
    );
    options.set_shown_count(3);
    options
}

/// Whether the operator can physically swap the medium behind `url`.
fn is_changeable_media(url: &Url) -> bool {
    matches!(url.scheme(), "cd" | "dvd")
}

/// Replace any existing verification setting and disable the check.
fn disable_cert_check(url: &mut Url) {
    let params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "ssl_verify")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let mut pairs = url.query_pairs_mut();
    pairs.clear();
    for (k, v) in &params {
        pairs.append_pair(k, v);
    }
    pairs.append_pair("ssl_verify", "no");
}
