//! Console port (driving collaborator)
//!
//! Providers talk to the operator only through this trait. Rendering,
//! colours and timestamps are entirely the implementation's concern.

use std::fmt;

/// Severity of an operator-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
    /// An instruction the operator is expected to follow
    Tip,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Info => "info",
            LogLevel::Success => "success",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Tip => "tip",
        };
        f.write_str(label)
    }
}

/// Operator interaction: blocking prompts and a structured log sink
pub trait Console: Send + Sync {
    /// Shows `text` and blocks until the operator answers one line
    ///
    /// The returned answer has its trailing newline removed.
    fn prompt(&self, text: &str) -> String;

    /// Emits one operator-facing message
    fn log(&self, level: LogLevel, text: &str);

    /// Prints the start-up banner
    fn welcome(&self, name: &str, version: &str);

    /// Reports a fatal error, waits for acknowledgment, then ends the process
    fn confirm_and_exit(&self, text: &str) -> !;
}

/// Prompts until the operator gives a non-blank answer
///
/// There is no retry limit: the caller cannot continue without a value.
pub fn prompt_required(console: &dyn Console, text: &str) -> String {
    loop {
        let answer = console.prompt(text);
        let answer = answer.trim();
        if !answer.is_empty() {
            return answer.to_string();
        }
        console.log(LogLevel::Warning, "A value is required.");
    }
}

/// Prompts until the operator answers yes or no
pub fn prompt_yes_no(console: &dyn Console, text: &str) -> bool {
    loop {
        let answer = console.prompt(text);
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return true,
            "n" | "no" => return false,
            _ => console.log(LogLevel::Warning, "Please answer 'y' or 'n'."),
        }
    }
}
