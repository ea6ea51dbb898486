//! The symbol algebra.
//!
//! Grammars are cyclic graphs: rules refer to themselves and to each other.
//! Nodes therefore live in an arena owned by [`Grammar`](crate::Grammar) and
//! are addressed by [`SymbolId`]. A `Reference` holds a rule name rather than
//! a pointer and is resolved when it is matched.

use std::fmt;
use std::ops::{RangeFrom, RangeInclusive};
use std::rc::Rc;

use regex_automata::{meta, Anchored, Input};

use crate::errors::GrammarError;
use crate::value::Value;

/// A semantic action applied to a successful raw match.
pub type Transform = Rc<dyn Fn(Value) -> Value>;

/// A stable handle to a node in a grammar's arena.
///
/// Handles double as identities: memoization keys on the handle of the node
/// a reference resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub(crate) usize);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// REPETITION BOUNDS
// ============================================================================

/// Bounds of a `Repeat` node. `max == None` means unbounded.
///
/// Converts from `n` (exactly n), `(min, max)`, `min..=max` and `min..`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repetition {
    pub min: usize,
    pub max: Option<usize>,
}

impl Repetition {
    pub fn exactly(count: usize) -> Self {
        Self {
            min: count,
            max: Some(count),
        }
    }

    pub fn between(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    /// Whether another item may be matched after `count` items.
    pub fn admits_more(&self, count: usize) -> bool {
        self.max.map_or(true, |max| count < max)
    }

    pub fn is_satisfied(&self, count: usize) -> bool {
        count >= self.min
    }

    pub(crate) fn check(&self) -> Result<(), GrammarError> {
        match self.max {
            Some(max) if max < self.min => Err(GrammarError::InvalidBounds { min: self.min, max }),
            _ => Ok(()),
        }
    }
}

impl From<usize> for Repetition {
    fn from(count: usize) -> Self {
        Repetition::exactly(count)
    }
}

impl From<(usize, usize)> for Repetition {
    fn from((min, max): (usize, usize)) -> Self {
        Repetition::between(min, max)
    }
}

impl From<RangeInclusive<usize>> for Repetition {
    fn from(range: RangeInclusive<usize>) -> Self {
        Repetition::between(*range.start(), *range.end())
    }
}

impl From<RangeFrom<usize>> for Repetition {
    fn from(range: RangeFrom<usize>) -> Self {
        Repetition::at_least(range.start)
    }
}

impl fmt::Display for Repetition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "({},{})", self.min, max),
            None => write!(f, "({},...)", self.min),
        }
    }
}

// ============================================================================
// TERMINAL PAYLOADS
// ============================================================================

/// A compiled regular expression matched anchored at the cursor.
#[derive(Clone)]
pub struct Pattern {
    regex: meta::Regex,
    source: String,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, GrammarError> {
        let regex = meta::Regex::new(source).map_err(|e| GrammarError::InvalidPattern {
            pattern: source.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            regex,
            source: source.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Matches at exactly `start`, treating `end` as the end of the haystack.
    /// Returns the end offset of the match.
    pub fn match_at(&self, text: &str, start: usize, end: usize) -> Option<usize> {
        let input = Input::new(&text[..end])
            .range(start..)
            .anchored(Anchored::Yes);
        self.regex.search(&input).map(|m| m.end())
    }

    /// Whether the pattern can match the empty string.
    pub fn is_nullable(&self) -> bool {
        regex_syntax::parse(&self.source)
            .map(|hir| hir.properties().minimum_len() == Some(0))
            .unwrap_or(false)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

/// The payload of a `Fail` node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    message: String,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// ============================================================================
// NODES
// ============================================================================

/// The closed set of grammar node kinds.
#[derive(Debug, Clone)]
pub enum SymbolKind {
    Literal(String),
    Pattern(Pattern),
    Empty,
    Sequence(Vec<SymbolId>),
    Alternation(Vec<SymbolId>),
    Repeat { inner: SymbolId, bounds: Repetition },
    Reference(String),
    Fail(Failure),
}

impl SymbolKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            SymbolKind::Literal(_) => "Literal",
            SymbolKind::Pattern(_) => "Pattern",
            SymbolKind::Empty => "Empty",
            SymbolKind::Sequence(_) => "Sequence",
            SymbolKind::Alternation(_) => "Alternation",
            SymbolKind::Repeat { .. } => "Repeat",
            SymbolKind::Reference(_) => "Reference",
            SymbolKind::Fail(_) => "Fail",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SymbolKind::Literal(_) | SymbolKind::Pattern(_) | SymbolKind::Empty | SymbolKind::Fail(_)
        )
    }
}

/// One arena slot: a kind plus its optional transform and display name.
#[derive(Clone)]
pub struct SymbolNode {
    pub(crate) kind: SymbolKind,
    pub(crate) transform: Option<Transform>,
    pub(crate) name: Option<String>,
}

impl SymbolNode {
    pub(crate) fn new(kind: SymbolKind) -> Self {
        Self {
            kind,
            transform: None,
            name: None,
        }
    }

    pub fn kind(&self) -> &SymbolKind {
        &self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn has_transform(&self) -> bool {
        self.transform.is_some()
    }

    /// Applies the node's transform, or returns `raw` unchanged.
    pub(crate) fn apply_transform(&self, raw: Value) -> Value {
        match &self.transform {
            Some(transform) => transform(raw),
            None => raw,
        }
    }
}

impl fmt::Debug for SymbolNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolNode")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("transform", &self.transform.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
