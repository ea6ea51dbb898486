//! Handles all user-facing output for the CLI.
//!
//! This module is responsible for pretty-printing, colorizing output,
//! formatting validation reports, and generating JSON. Parse traces are
//! written to stderr so they never mix with a result on stdout.

use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::engine::{TraceEvent, TraceSink};
use crate::validate::GrammarReport;
use crate::value::Value;

/// Colors only when stdout is a terminal.
pub fn color_choice() -> ColorChoice {
    if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

fn stderr_color_choice() -> ColorChoice {
    if atty::is(atty::Stream::Stderr) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

// ============================================================================
// TRACE SINK: colored stderr trace for `--trace`
// ============================================================================

/// StderrTrace: writes trace events to stderr, START in cyan and END in
/// green or red depending on the outcome.
pub struct StderrTrace {
    stream: StandardStream,
}

impl StderrTrace {
    pub fn new() -> Self {
        Self {
            stream: StandardStream::stderr(stderr_color_choice()),
        }
    }
}

impl Default for StderrTrace {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceSink for StderrTrace {
    fn emit(&mut self, event: &TraceEvent) {
        let color = match event {
            TraceEvent::Start { .. } => Color::Cyan,
            TraceEvent::End { result: Some(_), .. } => Color::Green,
            TraceEvent::End { result: None, .. } => Color::Red,
        };
        let _ = self.stream.set_color(ColorSpec::new().set_fg(Some(color)));
        let _ = writeln!(self.stream, "{event}");
        let _ = self.stream.reset();
    }
}

// ============================================================================
// CORE OUTPUT FUNCTIONS: User-facing CLI output utilities
// ============================================================================

/// Prints a parse result, as JSON or as a colored `Result:` line.
pub fn print_value(value: &Value, json: bool) -> serde_json::Result<()> {
    if json {
        println!("{}", serde_json::to_string(value)?);
        return Ok(());
    }
    let mut stdout = StandardStream::stdout(color_choice());
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = write!(stdout, "Result:");
    let _ = stdout.reset();
    let _ = writeln!(stdout, " {value}");
    Ok(())
}

/// Prints a grammar listing.
pub fn print_listing(listing: &str) {
    println!("{listing}");
}

/// Prints a validation report section by section.
pub fn print_report(report: &GrammarReport) {
    let mut stdout = StandardStream::stdout(color_choice());
    print_section(&mut stdout, &report.errors, Color::Red, "errors");
    print_section(&mut stdout, &report.warnings, Color::Yellow, "warnings");
    print_section(&mut stdout, &report.suggestions, Color::Cyan, "suggestions");

    if report.is_clean() {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
        let _ = writeln!(stdout, "grammar check passed: no issues found");
        let _ = stdout.reset();
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn print_section(stdout: &mut StandardStream, items: &[String], color: Color, title: &str) {
    if items.is_empty() {
        return;
    }
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = writeln!(stdout, "{title}:");
    let _ = stdout.reset();
    for item in items {
        let _ = writeln!(stdout, "  - {item}");
    }
}
