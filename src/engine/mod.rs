//! Parsing engines.
//!
//! Both engines share the match semantics of the symbol algebra, implemented
//! once in [`apply`]. They differ only in what happens around each step:
//!
//! - [`SimpleEngine`] backtracks naively and keeps a call stack for
//!   diagnostics.
//! - [`PackratEngine`] memoizes every `(symbol, position)` result and grows
//!   seeds to resolve left recursion.
//!
//! Every match reports one of three outcomes through [`MatchResult`]:
//! `Ok(Some(value))` on a match, `Ok(None)` on a soft failure that leaves the
//! cursor where it was, and `Err(_)` on a fatal failure that aborts the parse.

use std::sync::Arc;

use miette::NamedSource;

use crate::cursor::Cursor;
use crate::errors::{one_line, ParseError};
use crate::grammar::Grammar;
use crate::symbol::{Failure, SymbolId, SymbolKind};
use crate::value::Value;

pub mod packrat;
pub mod simple;
pub mod trace;

pub use packrat::PackratEngine;
pub use simple::SimpleEngine;
pub use trace::{TraceBuffer, TraceEvent, TraceSink};

/// Matched, no match, or fatal.
pub type MatchResult = Result<Option<Value>, ParseError>;

/// Free native stack below which a step moves onto a new segment.
const STACK_RED_ZONE: usize = 256 * 1024;
/// Size of each new native stack segment.
const STACK_SEGMENT: usize = 4 * 1024 * 1024;

/// Runs one recursive step, growing the native stack first when it runs low.
///
/// Every `parse` frame goes through here, so the depth limit in
/// [`EngineConfig`] is what ends runaway recursion, whatever the size of the
/// calling thread's stack.
pub(crate) fn with_stack<R>(step: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, step)
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Tunables shared by both engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of nested `parse` frames before the parse is aborted
    /// with [`ParseError::RecursionLimit`].
    pub max_depth: usize,
    /// Characters of context shown on each side of a failure point and in
    /// trace lines.
    pub excerpt_width: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 1000,
            excerpt_width: 40,
        }
    }
}

impl EngineConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_excerpt_width(mut self, excerpt_width: usize) -> Self {
        self.excerpt_width = excerpt_width;
        self
    }
}

/// Engine selector for [`Grammar::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineKind {
    Simple,
    #[default]
    Packrat,
}

// ============================================================================
// ENGINE TRAIT
// ============================================================================

/// The state a symbol match needs from an engine.
///
/// `parse` is the recursive entry point: composite symbols call it for each
/// child, which is where an engine hooks in its call stack, tracing and
/// memoization.
pub trait Engine<'a> {
    fn grammar(&self) -> &'a Grammar;
    fn cursor(&self) -> &Cursor<'a>;
    fn cursor_mut(&mut self) -> &mut Cursor<'a>;
    /// Frames currently being parsed, outermost first.
    fn call_stack(&self) -> &[SymbolId];
    fn config(&self) -> &EngineConfig;
    fn parse(&mut self, id: SymbolId) -> MatchResult;
    /// Rewinds the cursor and drops all per-parse state.
    fn reset(&mut self);
}

/// Matches `id` at the cursor and applies its transform.
///
/// References are followed to the rule body first, so the body's transform
/// (the rule action) is the one applied. On a soft failure the cursor is put
/// back where it started.
pub(crate) fn apply<'a, E>(engine: &mut E, id: SymbolId) -> MatchResult
where
    E: Engine<'a> + ?Sized,
{
    let grammar = engine.grammar();
    let target = grammar.resolve(id)?;
    let node = grammar.node(target);
    let start = engine.cursor().index();

    match match_kind(engine, target, node.kind())? {
        Some(raw) => Ok(Some(node.apply_transform(raw))),
        None => {
            engine.cursor_mut().seek(start);
            Ok(None)
        }
    }
}

fn match_kind<'a, E>(engine: &mut E, id: SymbolId, kind: &'a SymbolKind) -> MatchResult
where
    E: Engine<'a> + ?Sized,
{
    match kind {
        SymbolKind::Literal(text) => {
            if engine.cursor().remaining().starts_with(text.as_str()) {
                engine.cursor_mut().advance(text.len());
                Ok(Some(Value::Text(text.clone())))
            } else {
                Ok(None)
            }
        }

        SymbolKind::Pattern(pattern) => {
            let cursor = engine.cursor();
            let start = cursor.index();
            match pattern.match_at(cursor.text(), start, cursor.end()) {
                Some(end) => {
                    let matched = cursor.text()[start..end].to_string();
                    engine.cursor_mut().seek(end);
                    Ok(Some(Value::Text(matched)))
                }
                None => Ok(None),
            }
        }

        SymbolKind::Empty => Ok(Some(Value::Text(String::new()))),

        SymbolKind::Sequence(children) => {
            let start = engine.cursor().index();
            let mut items = Vec::with_capacity(children.len());
            for &child in children {
                match engine.parse(child)? {
                    Some(value) => items.push(value),
                    None => {
                        engine.cursor_mut().seek(start);
                        return Ok(None);
                    }
                }
            }
            Ok(Some(Value::List(items)))
        }

        SymbolKind::Alternation(children) => {
            let start = engine.cursor().index();
            for &child in children {
                if let Some(value) = engine.parse(child)? {
                    return Ok(Some(value));
                }
                engine.cursor_mut().seek(start);
            }
            Ok(None)
        }

        SymbolKind::Repeat { inner, bounds } => {
            let start = engine.cursor().index();
            let mut items = Vec::new();
            while bounds.admits_more(items.len()) {
                let before = engine.cursor().index();
                match engine.parse(*inner)? {
                    Some(value) => {
                        items.push(value);
                        // a zero-width item would match forever
                        if engine.cursor().index() == before {
                            break;
                        }
                    }
                    None => {
                        engine.cursor_mut().seek(before);
                        break;
                    }
                }
            }
            if bounds.is_satisfied(items.len()) {
                Ok(Some(Value::List(items)))
            } else {
                engine.cursor_mut().seek(start);
                Ok(None)
            }
        }

        SymbolKind::Fail(failure) => Err(fatal(engine, id, failure)),

        SymbolKind::Reference(name) => Err(ParseError::internal(format!(
            "reference to '{name}' survived resolution"
        ))),
    }
}

/// Builds the diagnostic for a `Fail` node reached at the cursor.
fn fatal<'a, E>(engine: &E, id: SymbolId, failure: &Failure) -> ParseError
where
    E: Engine<'a> + ?Sized,
{
    let grammar = engine.grammar();
    let cursor = engine.cursor();
    let width = engine.config().excerpt_width;

    let mut frames = engine.call_stack();
    if let Some((&last, rest)) = frames.split_last() {
        if grammar.resolve(last).ok() == Some(id) {
            frames = rest;
        }
    }
    let trail: Vec<String> = frames.iter().map(|&frame| grammar.frame_label(frame)).collect();
    let help = trail.last().map(|frame| format!("raised while parsing {frame}"));
    let offset = cursor.index();

    ParseError::Fatal {
        message: failure.message().to_string(),
        trail,
        before: one_line(cursor.front(width)),
        after: one_line(cursor.behind(width)),
        offset,
        src: Arc::new(NamedSource::new("input", cursor.text().to_string())),
        span: (offset, 0).into(),
        help,
    }
}
