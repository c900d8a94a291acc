//! Console reporting capability
//!
//! User-facing output goes through an injected `Reporter` rather than
//! free-standing print calls, so callers can substitute a silent
//! implementation for `--quiet` runs and tests.

use colored::Colorize;

/// Severity-tagged console output.
pub trait Reporter: Send + Sync {
    fn info(&self, message: &str);
    fn success(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
}

/// Colored terminal reporter.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        println!("{}", format!("> {message}").blue());
    }

    fn success(&self, message: &str) {
        println!("{}", format!("+ {message}").green());
    }

    fn warning(&self, message: &str) {
        println!("{}", format!("! {message}").yellow());
    }

    fn error(&self, message: &str) {
        eprintln!("{}", format!("X {message}").red());
    }
}

/// Reporter that swallows all output.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn info(&self, _message: &str) {}
    fn success(&self, _message: &str) {}
    fn warning(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}
