//! Defines the command-line arguments and subcommands for the rdparse CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand, ValueEnum};

use crate::engine::{EngineConfig, EngineKind};
use crate::errors::GrammarError;
use crate::grammar::Grammar;
use crate::grammars::{arith, list};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "rdparse",
    version,
    about = "Recursive-descent parsing with packrat memoization and left recursion."
)]
pub struct RdArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate an arithmetic expression.
    Calc {
        /// The expression, e.g. "(1+5-4)*(2/(2-1))".
        #[arg(required = true)]
        expr: String,
        /// The simple engine runs the iterative grammar, the packrat engine
        /// the left-recursive one.
        #[arg(long, value_enum, default_value_t = EngineArg::Packrat)]
        engine: EngineArg,
        #[command(flatten)]
        options: ParseOptions,
    },
    /// Parse a comma list of `a` items with the left-recursive list grammar.
    List {
        /// The input, e.g. "a,a,a".
        #[arg(required = true)]
        input: String,
        #[command(flatten)]
        options: ParseOptions,
    },
    /// Print the listing of a built-in grammar.
    Dump {
        #[arg(value_enum)]
        grammar: GrammarArg,
    },
    /// Run the static checks on a built-in grammar and print the report.
    Check {
        #[arg(value_enum)]
        grammar: GrammarArg,
    },
}

/// Flags shared by the parsing subcommands.
#[derive(Debug, Clone, clap::Args)]
pub struct ParseOptions {
    /// Print every parse step to stderr.
    #[arg(long)]
    pub trace: bool,
    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
    /// Maximum parse depth before giving up.
    #[arg(long, default_value_t = EngineConfig::default().max_depth)]
    pub max_depth: usize,
}

impl ParseOptions {
    pub fn config(&self) -> EngineConfig {
        EngineConfig::default().with_max_depth(self.max_depth)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineArg {
    Simple,
    Packrat,
}

impl From<EngineArg> for EngineKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Simple => EngineKind::Simple,
            EngineArg::Packrat => EngineKind::Packrat,
        }
    }
}

/// The built-in grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GrammarArg {
    /// Iterative arithmetic.
    Calc,
    /// Left-recursive arithmetic.
    CalcLeft,
    /// The left-recursive comma list.
    List,
}

impl GrammarArg {
    pub fn build(self) -> Result<Grammar, GrammarError> {
        match self {
            GrammarArg::Calc => arith::iterative(),
            GrammarArg::CalcLeft => arith::left_recursive(),
            GrammarArg::List => list::grammar(),
        }
    }
}
