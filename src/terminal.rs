// src/terminal.rs

//! Prompting and user-facing output.
//!
//! [`PromptOptions`] describes an ordered, bounded set of selectable
//! answers with help text and a default. The [`Terminal`] trait is the
//! seam between the decision logic and the operator: the [`Console`]
//! implementation talks to stdin/stdout, while [`Scripted`] replays
//! canned answers deterministically for embedding and tests.
//!
//! Non-interactive terminals resolve every prompt immediately to its
//! default; callers never need to special-case that themselves.

use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// One selectable answer in a prompt.
#[derive(Debug, Clone)]
pub struct PromptOption {
    /// The short answer the user types, e.g. "a" or "r".
    pub answer: String,
    /// Help text shown on request.
    pub help: String,
}

/// An ordered, bounded list of prompt answers plus a default index.
#[derive(Debug, Clone)]
pub struct PromptOptions {
    options: Vec<PromptOption>,
    default: usize,
    shown: usize,
}

impl PromptOptions {
    /// Create an empty option set whose default is `default`.
    pub fn new(default: usize) -> Self {
        Self {
            options: Vec::new(),
            default,
            shown: usize::MAX,
        }
    }

    /// Append an option.
    pub fn push(&mut self, answer: &str, help: &str) {
        self.options.push(PromptOption {
            answer: answer.to_string(),
            help: help.to_string(),
        });
    }

    /// Hide options beyond the first `count` from the inline answer list.
    /// Hidden options are still accepted as input.
    pub fn set_shown_count(&mut self, count: usize) {
        self.shown = count;
    }

    pub fn default_index(&self) -> usize {
        self.default
    }

    pub fn options(&self) -> &[PromptOption] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// The default option's answer string, if any.
    pub fn default_answer(&self) -> &str {
        self.options
            .get(self.default)
            .map(|o| o.answer.as_str())
            .unwrap_or("")
    }

    /// All answers joined with '/', e.g. "a/r/i/u/s".
    pub fn answer_summary(&self) -> String {
        let answers: Vec<&str> = self.options.iter().map(|o| o.answer.as_str()).collect();
        answers.join("/")
    }

    /// The inline answer list shown in the prompt line. Hidden options are
    /// replaced by "?", which prints the full help.
    fn inline_answers(&self) -> String {
        let shown = self.shown.min(self.options.len());
        let mut answers: Vec<&str> = self.options[..shown]
            .iter()
            .map(|o| o.answer.as_str())
            .collect();
        if shown < self.options.len() {
            answers.push("?");
        }
        answers.join("/")
    }

    /// Match trimmed user input against the options. Empty input selects
    /// the default.
    pub fn match_reply(&self, input: &str) -> Option<usize> {
        let input = input.trim();
        if input.is_empty() {
            return Some(self.default);
        }
        self.options
            .iter()
            .position(|o| o.answer.eq_ignore_ascii_case(input))
    }
}

/// The seam between decision logic and the operator.
///
/// Implementations must never block forever when non-interactive: every
/// method has a well-defined default outcome.
pub trait Terminal {
    /// Present `options` and block for a selection.
    fn select(&mut self, text: &str, options: &PromptOptions) -> usize;

    /// Like [`Terminal::select`], but give up after `timeout` and return
    /// the default. This is the only bounded wait in the crate.
    fn select_timed(&mut self, text: &str, options: &PromptOptions, timeout: Duration) -> usize;

    /// Ask a yes/no question.
    fn confirm(&mut self, question: &str, default: bool) -> bool;

    /// Read a free-form line, offering `default` for empty input.
    fn prompt_line(&mut self, label: &str, default: &str) -> String;

    /// Tell the operator something and wait for ENTER.
    fn pause(&mut self, message: &str);

    fn info(&mut self, message: &str);
    fn warning(&mut self, message: &str);
    fn error(&mut self, message: &str);
}

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

/// Terminal implementation over stdin/stdout.
pub struct Console {
    non_interactive: bool,
}

impl Console {
    pub fn new(non_interactive: bool) -> Self {
        Self { non_interactive }
    }

    /// Non-interactive when stdout is not a terminal.
    pub fn detect() -> Self {
        Self {
            non_interactive: !io::stdout().is_terminal(),
        }
    }

    /// Read one line from stdin. Returns None on EOF or error, so prompts
    /// degrade to their defaults instead of spinning on a closed stream.
    fn read_line(&self) -> Option<String> {
        let mut input = String::new();
        match io::stdin().lock().read_line(&mut input) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(input.trim().to_string()),
        }
    }

    fn print_help(&self, options: &PromptOptions) {
        for option in options.options() {
            println!("  {} - {}", option.answer, option.help);
        }
    }

    fn prompt_line_text(text: &str, options: &PromptOptions) -> String {
        format!(
            "{} [{}] ({}): ",
            text,
            options.inline_answers(),
            options.default_answer()
        )
    }
}

impl Terminal for Console {
    fn select(&mut self, text: &str, options: &PromptOptions) -> usize {
        let prompt = Self::prompt_line_text(text, options);
        if self.non_interactive {
            println!("{}{}", prompt, options.default_answer());
            return options.default_index();
        }
        loop {
            print!("{}", prompt);
            let _ = io::stdout().flush();
            let Some(input) = self.read_line() else {
                return options.default_index();
            };
            if input == "?" {
                self.print_help(options);
                continue;
            }
            match options.match_reply(&input) {
                Some(index) => return index,
                None => println!("Invalid answer '{}'.", input),
            }
        }
    }

    fn select_timed(&mut self, text: &str, options: &PromptOptions, timeout: Duration) -> usize {
        let prompt = Self::prompt_line_text(text, options);
        if self.non_interactive {
            println!("{}{}", prompt, options.default_answer());
            return options.default_index();
        }
        print!("{}", prompt);
        let _ = io::stdout().flush();

        // A detached thread does the blocking read; a line typed after the
        // deadline is discarded together with the thread.
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut input = String::new();
            if io::stdin().lock().read_line(&mut input).is_ok() {
                let _ = tx.send(input.trim().to_string());
            }
        });

        match rx.recv_timeout(timeout) {
            Ok(input) => match options.match_reply(&input) {
                Some(index) => index,
                None => {
                    println!(
                        "Invalid answer '{}', choosing '{}'.",
                        input,
                        options.default_answer()
                    );
                    options.default_index()
                }
            },
            Err(_) => {
                println!();
                println!("No answer within {}s, choosing '{}'.", timeout.as_secs(), options.default_answer());
                options.default_index()
            }
        }
    }

    fn confirm(&mut self, question: &str, default: bool) -> bool {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        if self.non_interactive {
            println!("{} {} {}", question, hint, if default { "y" } else { "n" });
            return default;
        }
        loop {
            print!("{} {}: ", question, hint);
            let _ = io::stdout().flush();
            let Some(input) = self.read_line() else {
                return default;
            };
            match input.to_lowercase().as_str() {
                "" => return default,
                "y" | "yes" => return true,
                "n" | "no" => return false,
                other => println!("Invalid answer '{}'.", other),
            }
        }
    }

    fn prompt_line(&mut self, label: &str, default: &str) -> String {
        if self.non_interactive {
            return default.to_string();
        }
        print!("{} [{}]: ", label, default);
        let _ = io::stdout().flush();
        match self.read_line() {
            Some(input) if !input.is_empty() => input,
            _ => default.to_string(),
        }
    }

    fn pause(&mut self, message: &str) {
        println!("{}", message);
        if !self.non_interactive {
            let _ = self.read_line();
        }
    }

    fn info(&mut self, message: &str) {
        println!("{}", message);
    }

    fn warning(&mut self, message: &str) {
        eprintln!("Warning: {}", message);
    }

    fn error(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}

// ---------------------------------------------------------------------------
// Scripted
// ---------------------------------------------------------------------------

/// Shared view of everything a [`Scripted`] terminal printed.
///
/// Clone a handle before boxing the terminal into a session; lines are
/// recorded as "tag: text" with tags prompt, confirm, line, pause, info,
/// warning, and error.
#[derive(Debug, Clone, Default)]
pub struct Transcript(Arc<Mutex<Vec<String>>>);

impl Transcript {
    pub fn lines(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Number of recorded lines carrying `tag`.
    pub fn count_tagged(&self, tag: &str) -> usize {
        let prefix = format!("{}: ", tag);
        self.lock().iter().filter(|l| l.starts_with(&prefix)).count()
    }

    /// Whether any recorded line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lock().iter().any(|l| l.contains(needle))
    }

    fn record(&self, tag: &str, text: &str) {
        self.lock().push(format!("{}: {}", tag, text));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Deterministic terminal: canned replies are consumed in order and all
/// output is recorded in a [`Transcript`].
///
/// Replies are matched like console input; a purely numeric reply that
/// matches no answer is passed through as a raw index so callers'
/// unknown-selection handling can be exercised. When the reply queue runs
/// dry every prompt resolves to its default, which also models the timed
/// prompt expiring.
#[derive(Debug, Default)]
pub struct Scripted {
    replies: VecDeque<String>,
    transcript: Transcript,
}

impl Scripted {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            transcript: Transcript::default(),
        }
    }

    /// A handle onto the recorded output, valid after the terminal is
    /// boxed away into a session.
    pub fn transcript(&self) -> Transcript {
        self.transcript.clone()
    }

    fn next_reply(&mut self) -> Option<String> {
        self.replies.pop_front()
    }

    fn pick(&mut self, options: &PromptOptions) -> usize {
        match self.next_reply() {
            Some(reply) => match options.match_reply(&reply) {
                Some(index) => index,
                None => reply.parse().unwrap_or(options.default_index()),
            },
            None => options.default_index(),
        }
    }
}

impl Terminal for Scripted {
    fn select(&mut self, text: &str, options: &PromptOptions) -> usize {
        self.transcript
            .record("prompt", &format!("{} [{}]", text, options.answer_summary()));
        self.pick(options)
    }

    fn select_timed(&mut self, text: &str, options: &PromptOptions, timeout: Duration) -> usize {
        debug!("timed prompt, deadline {:?}", timeout);
        self.transcript
            .record("prompt", &format!("{} [{}]", text, options.answer_summary()));
        self.pick(options)
    }

    fn confirm(&mut self, question: &str, default: bool) -> bool {
        self.transcript.record("confirm", question);
        match self.next_reply().as_deref() {
            Some("y") | Some("yes") => true,
            Some("n") | Some("no") => false,
            _ => default,
        }
    }

    fn prompt_line(&mut self, label: &str, default: &str) -> String {
        self.transcript.record("line", label);
        match self.next_reply() {
            Some(reply) if !reply.is_empty() => reply,
            _ => default.to_string(),
        }
    }

    fn pause(&mut self, message: &str) {
        self.transcript.record("pause", message);
    }

    fn info(&mut self, message: &str) {
        self.transcript.record("info", message);
    }

    fn warning(&mut self, message: &str) {
        self.transcript.record("warning", message);
    }

    fn error(&mut self, message: &str) {
        self.transcript.record("error", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ari_options() -> PromptOptions {
        let mut opts = PromptOptions::new(0);
        opts.push("a", "Abort.");
        opts.push("r", "Retry.");
        opts.push("i", "Ignore.");
        opts
    }

    #[test]
    fn test_match_reply() {
        let opts = ari_options();
        assert_eq!(opts.match_reply("r"), Some(1));
        assert_eq!(opts.match_reply("R"), Some(1));
        assert_eq!(opts.match_reply(""), Some(0));
        assert_eq!(opts.match_reply("x"), None);
    }

    #[test]
    fn test_inline_answers_hides_tail() {
        let mut opts = ari_options();
        opts.push("u", "Change URI.");
        opts.set_shown_count(3);
        assert_eq!(opts.inline_answers(), "a/r/i/?");
        assert_eq!(opts.answer_summary(), "a/r/i/u");
    }

    #[test]
    fn test_scripted_select_and_fallback() {
        let mut term = Scripted::new(["i", "bogus"]);
        let opts = ari_options();
        assert_eq!(term.select("choose", &opts), 2);
        // unknown non-numeric reply falls back to the default
        assert_eq!(term.select("choose", &opts), 0);
        // exhausted queue resolves to the default
        assert_eq!(term.select("choose", &opts), 0);
    }

    #[test]
    fn test_scripted_numeric_passthrough() {
        let mut term = Scripted::new(["7"]);
        let opts = ari_options();
        assert_eq!(term.select("choose", &opts), 7);
    }

    #[test]
    fn test_scripted_confirm_default() {
        let mut term = Scripted::new(Vec::<String>::new());
        assert!(!term.confirm("sure?", false));
        assert!(term.confirm("sure?", true));
    }

    #[test]
    fn test_transcript_records_output() {
        let mut term = Scripted::new(Vec::<String>::new());
        let transcript = term.transcript();
        term.info("hello");
        term.warning("careful");
        assert_eq!(transcript.count_tagged("info"), 1);
        assert_eq!(transcript.count_tagged("warning"), 1);
        assert!(transcript.contains("careful"));
    }
}
