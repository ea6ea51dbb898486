//! The rdparse Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions. Every failure is rendered through `miette` and
//! exits with status 1.

use std::process;
use std::sync::Arc;

use clap::Parser;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::cli::args::{Command, GrammarArg, ParseOptions, RdArgs};
use crate::engine::{Engine, EngineKind, MatchResult, PackratEngine, SimpleEngine};
use crate::errors::{print_error, GrammarError, ParseError};
use crate::grammar::Grammar;
use crate::grammars::{arith, list};
use crate::symbol::SymbolId;
use crate::value::Value;

pub mod args;
pub mod output;

use output::StderrTrace;

/// Everything a subcommand can fail with.
#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Grammar(#[from] GrammarError),

    #[error("no match")]
    #[diagnostic(code(rdparse::cli::no_match))]
    NoMatch,

    #[error("input not fully consumed")]
    #[diagnostic(
        code(rdparse::cli::trailing_input),
        help("the grammar matched a prefix of the input only")
    )]
    TrailingInput {
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("parsing stopped here")]
        span: SourceSpan,
    },

    #[error("grammar check found {count} error(s)")]
    #[diagnostic(code(rdparse::cli::check_failed))]
    CheckFailed { count: usize },

    #[error("could not encode result as JSON")]
    #[diagnostic(code(rdparse::cli::json))]
    Json(#[from] serde_json::Error),
}

/// The main entry point for the CLI.
pub fn run() {
    let args = RdArgs::parse();

    let result = match args.command {
        Command::Calc {
            expr,
            engine,
            options,
        } => handle_calc(&expr, engine.into(), &options),
        Command::List { input, options } => handle_list(&input, &options),
        Command::Dump { grammar } => handle_dump(grammar),
        Command::Check { grammar } => handle_check(grammar),
    };

    if let Err(e) = result {
        if let CliError::Parse(parse_error) = &e {
            if let Some(excerpt) = parse_error.render_excerpt() {
                eprint!("{excerpt}");
            }
        }
        print_error(e);
        process::exit(1);
    }
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn handle_calc(expr: &str, kind: EngineKind, options: &ParseOptions) -> Result<(), CliError> {
    let (grammar, entry) = arith::for_engine(kind)?;
    let value = parse_all(&grammar, entry, expr, kind, options)?;
    output::print_value(&value, options.json)?;
    Ok(())
}

fn handle_list(input: &str, options: &ParseOptions) -> Result<(), CliError> {
    let grammar = list::grammar()?;
    let value = parse_all(&grammar, list::ENTRY, input, EngineKind::Packrat, options)?;
    output::print_value(&value, options.json)?;
    if !options.json {
        println!("{} item(s)", list::count_items(&value));
    }
    Ok(())
}

fn handle_dump(grammar: GrammarArg) -> Result<(), CliError> {
    let grammar = grammar.build()?;
    output::print_listing(&grammar.dump());
    Ok(())
}

fn handle_check(grammar: GrammarArg) -> Result<(), CliError> {
    let report = grammar.build()?.validate();
    output::print_report(&report);
    if report.is_valid() {
        Ok(())
    } else {
        Err(CliError::CheckFailed {
            count: report.errors.len(),
        })
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

/// Parses `text` from `entry` and requires the whole input to be consumed.
fn parse_all(
    grammar: &Grammar,
    entry: &str,
    text: &str,
    kind: EngineKind,
    options: &ParseOptions,
) -> Result<Value, CliError> {
    let body = grammar.body(entry).ok_or_else(|| ParseError::UndefinedRule {
        name: entry.to_string(),
    })?;
    let config = options.config();

    let (result, stopped_at) = match kind {
        EngineKind::Simple => {
            let mut engine = SimpleEngine::new(grammar, text).with_config(config);
            if options.trace {
                engine = engine.with_trace(StderrTrace::new());
            }
            drive(&mut engine, body)
        }
        EngineKind::Packrat => {
            let mut engine = PackratEngine::new(grammar, text).with_config(config);
            if options.trace {
                engine = engine.with_trace(StderrTrace::new());
            }
            drive(&mut engine, body)
        }
    };

    let value = result?.ok_or(CliError::NoMatch)?;
    if stopped_at < text.len() {
        return Err(CliError::TrailingInput {
            src: Arc::new(NamedSource::new("input", text.to_string())),
            span: (stopped_at, text.len() - stopped_at).into(),
        });
    }
    Ok(value)
}

fn drive<'a, E: Engine<'a>>(engine: &mut E, body: SymbolId) -> (MatchResult, usize) {
    let result = engine.parse(body);
    (result, engine.cursor().index())
}
