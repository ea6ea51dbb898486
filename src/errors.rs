//! rdparse error handling
//!
//! Two failure channels exist and are never conflated:
//!
//! - **Soft failure** is `Ok(None)` from a match or parse. It is the ordinary
//!   backtracking signal and never appears in this module.
//! - **Hard failure** is a `ParseError`. It unwinds the whole parse through `?`
//!   and is rendered with `miette`.
//!
//! Grammar construction problems are reported separately as `GrammarError`.

use std::sync::Arc;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;
use unicode_width::UnicodeWidthStr;

// ============================================================================
// PARSE ERRORS
// ============================================================================

/// A hard failure that aborts a parse.
#[derive(Error, Diagnostic, Debug)]
pub enum ParseError {
    /// A `Fail` node was reached.
    #[error("{message}")]
    #[diagnostic(code(rdparse::parse::fatal))]
    Fatal {
        message: String,
        /// Frames active at the failure point, outermost first.
        trail: Vec<String>,
        /// Input excerpt immediately before the failure offset.
        before: String,
        /// Input excerpt starting at the failure offset.
        after: String,
        offset: usize,
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("parse stopped here")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
    },

    #[error("undefined rule '{name}'")]
    #[diagnostic(
        code(rdparse::grammar::undefined_rule),
        help("define the rule before parsing, or check its spelling")
    )]
    UndefinedRule { name: String },

    #[error("recursion limit of {depth} frames exceeded at offset {offset}")]
    #[diagnostic(
        code(rdparse::parse::recursion_limit),
        help("the grammar is probably left-recursive; parse it with the packrat engine")
    )]
    RecursionLimit { depth: usize, offset: usize },

    /// A stock grammar failed to build before parsing started.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Grammar(#[from] GrammarError),

    /// Left-recursion bookkeeping went wrong. This is an engine bug.
    #[error("internal engine error: {message}")]
    #[diagnostic(
        code(rdparse::internal),
        help("This is an internal engine error. Please report this as a bug.")
    )]
    Internal { message: String },
}

impl ParseError {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        ParseError::Internal {
            message: message.into(),
        }
    }

    /// Returns true for errors raised by a `Fail` node in the grammar.
    pub fn is_fatal_node(&self) -> bool {
        matches!(self, ParseError::Fatal { .. })
    }

    /// The frame trail of a `Fail` error, outermost first.
    pub fn trail(&self) -> &[String] {
        match self {
            ParseError::Fatal { trail, .. } => trail,
            _ => &[],
        }
    }

    /// Renders the plain-text excerpt of a `Fail` error.
    ///
    /// The layout is the frame stack, one frame per line and indented by
    /// depth, then the excerpt line, then a caret under the failure offset
    /// followed by the message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rdparse::{fail, pattern, Grammar, EngineKind};
    /// let mut g = Grammar::new();
    /// g.define("Start", (pattern("[0-9]+"), fail("unexpected token"))).unwrap();
    /// let err = g.parse("Start", "12", EngineKind::Simple).unwrap_err();
    /// let excerpt = err.render_excerpt().unwrap();
    /// assert!(excerpt.ends_with("12\n  ^unexpected token\n"));
    /// ```
    pub fn render_excerpt(&self) -> Option<String> {
        let ParseError::Fatal {
            message,
            trail,
            before,
            after,
            ..
        } = self
        else {
            return None;
        };

        let mut out = String::from("ParserStack(Name: Symbol)\n");
        for (depth, frame) in trail.iter().enumerate() {
            out.push_str(&"    ".repeat(depth));
            out.push_str(frame);
            out.push('\n');
        }
        out.push_str(before);
        out.push_str(after);
        out.push('\n');
        out.push_str(&" ".repeat(before.width()));
        out.push('^');
        out.push_str(message);
        out.push('\n');
        Some(out)
    }
}

// ============================================================================
// GRAMMAR ERRORS
// ============================================================================

/// A problem found while building a grammar.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("invalid pattern '{pattern}': {reason}")]
    #[diagnostic(code(rdparse::grammar::invalid_pattern))]
    InvalidPattern { pattern: String, reason: String },

    #[error("repetition bounds ({min},{max}) are empty")]
    #[diagnostic(
        code(rdparse::grammar::invalid_bounds),
        help("the minimum count must not exceed the maximum")
    )]
    InvalidBounds { min: usize, max: usize },
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints an error with full miette diagnostics to stderr.
pub fn print_error<E>(error: E)
where
    E: Diagnostic + Send + Sync + 'static,
{
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}

/// Escapes newlines so an excerpt stays on one line.
pub(crate) fn one_line(text: &str) -> String {
    text.replace('\n', r"\n")
}
