//! Terminal implementation of the [`Console`] port
//!
//! Every log line carries a local timestamp and a level glyph. Prompts read
//! one line from stdin.

use std::io::{self, BufRead, Write};

use chrono::{DateTime, Local};
use kdbxsync_core::ports::{Console, LogLevel};

/// Format of the timestamp prefixed to every log line
const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// Console backed by stdin/stdout/stderr
pub struct TerminalConsole;

fn glyph(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Info => "\u{2139}",
        LogLevel::Success => "\u{2713}",
        LogLevel::Warning => "\u{26a0}",
        LogLevel::Error => "\u{2717}",
        LogLevel::Tip => "\u{2192}",
    }
}

/// One rendered log line, without the trailing newline
pub fn render_line(level: LogLevel, text: &str, at: DateTime<Local>) -> String {
    format!("[{}] {} {}", at.format(TIMESTAMP_FORMAT), glyph(level), text)
}

/// Removes the line terminator left by `read_line`
fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

impl Console for TerminalConsole {
    fn prompt(&self, text: &str) -> String {
        let mut stdout = io::stdout();
        let _ = write!(stdout, "{text}");
        let _ = stdout.flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => {
                // Nobody is left to answer; waiting would loop forever.
                eprintln!();
                let line = render_line(LogLevel::Error, "Input closed, exiting.", Local::now());
                eprintln!("{line}");
                std::process::exit(1);
            }
            Ok(_) => strip_line_ending(&line).to_string(),
        }
    }

    fn log(&self, level: LogLevel, text: &str) {
        let line = render_line(level, text, Local::now());
        match level {
            LogLevel::Warning | LogLevel::Error => eprintln!("{line}"),
            _ => println!("{line}"),
        }
    }

    fn welcome(&self, name: &str, version: &str) {
        println!("{name} {version}");
        println!("Uploads a KeePass database to every configured cloud storage.");
        println!();
    }

    fn confirm_and_exit(&self, text: &str) -> ! {
        self.log(LogLevel::Error, text);
        let mut stdout = io::stdout();
        let _ = write!(stdout, "Press Enter to exit...");
        let _ = stdout.flush();

        let mut line = String::new();
        let _ = io::stdin().lock().read_line(&mut line);
        std::process::exit(1);
    }
}
