//! Grammar expressions: the construction-time surface of the symbol algebra.
//!
//! An [`Expr`] is a plain description that [`Grammar::add`](crate::Grammar::add)
//! lowers into arena nodes. Ordinary Rust values convert into it the same way
//! grammar fragments are normalized everywhere in this crate:
//!
//! | value                         | symbol      |
//! |-------------------------------|-------------|
//! | `&str`, `String`              | Literal     |
//! | `regex::Regex`, [`pattern`]   | Pattern     |
//! | `()`, `None`, [`empty`]       | Empty       |
//! | tuples, [`seq!`](crate::seq)  | Sequence    |
//! | `Vec`, arrays, [`alt!`](crate::alt) | Alternation |
//! | `SymbolId`                    | itself      |
//! | `Failure`, [`fail`]           | Fail        |
//! | [`rule`]                      | Reference   |
//!
//! A `regex::Regex` keeps its inline flags only; see its `From` impl.
//!
//! `|` appends an alternative and `*` repeats:
//!
//! ```rust
//! use rdparse::{rule, Expr, Grammar, IntoExpr};
//! let mut g = Grammar::new();
//! let list = Expr::from(("a", (",", "a").into_expr() * (0..)));
//! g.define("List", list | rule("Other")).unwrap();
//! g.define("Other", "b").unwrap();
//! assert_eq!(g.dump(), "List->[('a',(',','a')*(0,...))|Other]\nOther->'b'");
//! ```

use std::fmt;
use std::ops::{BitOr, Mul};
use std::rc::Rc;

use crate::symbol::{Failure, Repetition, SymbolId, Transform};
use crate::value::Value;

/// A grammar expression awaiting lowering into a [`Grammar`](crate::Grammar).
#[derive(Clone)]
pub enum Expr {
    Symbol(SymbolId),
    Literal(String),
    Pattern(String),
    Regex(regex::Regex),
    Empty,
    Sequence(Vec<Expr>),
    Alternation(Vec<Expr>),
    Repeat(Box<Expr>, Repetition),
    Rule(String),
    Fail(Failure),
    Named(Box<Expr>, String),
    Mapped(Box<Expr>, Transform),
}

// ============================================================================
// BUILDERS
// ============================================================================

/// A reference to the rule `name`, resolved when it is matched.
pub fn rule(name: impl Into<String>) -> Expr {
    Expr::Rule(name.into())
}

/// A regular expression anchored at the cursor. Compiled when lowered.
pub fn pattern(source: impl Into<String>) -> Expr {
    Expr::Pattern(source.into())
}

/// Matches the empty string.
pub fn empty() -> Expr {
    Expr::Empty
}

/// Aborts the whole parse with `message` when reached.
pub fn fail(message: impl Into<String>) -> Expr {
    Expr::Fail(Failure::new(message))
}

/// Builds a sequence from expressions of different types.
#[macro_export]
macro_rules! seq {
    ($($item:expr),* $(,)?) => {
        $crate::Expr::Sequence(vec![$($crate::Expr::from($item)),*])
    };
}

/// Builds an ordered alternation from expressions of different types.
#[macro_export]
macro_rules! alt {
    ($($item:expr),* $(,)?) => {
        $crate::Expr::Alternation(vec![$($crate::Expr::from($item)),*])
    };
}

/// Conversion helper for values that would otherwise need a type annotation.
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl<T: Into<Expr>> IntoExpr for T {
    fn into_expr(self) -> Expr {
        self.into()
    }
}

impl Expr {
    /// Sets the display name used in dumps and diagnostics.
    pub fn named(self, name: impl Into<String>) -> Self {
        Expr::Named(Box::new(self), name.into())
    }

    /// Attaches a transform. On a rule reference this installs the rule's
    /// action instead.
    pub fn map<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Value + 'static,
    {
        Expr::Mapped(Box::new(self), Rc::new(f))
    }

    pub fn repeat(self, bounds: impl Into<Repetition>) -> Self {
        Expr::Repeat(Box::new(self), bounds.into())
    }

    /// Appends an alternative. An alternation on the left is extended rather
    /// than nested.
    pub fn or(self, other: impl Into<Expr>) -> Self {
        match self {
            Expr::Alternation(mut items) => {
                items.push(other.into());
                Expr::Alternation(items)
            }
            first => Expr::Alternation(vec![first, other.into()]),
        }
    }
}

impl<T: Into<Expr>> BitOr<T> for Expr {
    type Output = Expr;

    fn bitor(self, other: T) -> Expr {
        self.or(other)
    }
}

impl<R: Into<Repetition>> Mul<R> for Expr {
    type Output = Expr;

    fn mul(self, bounds: R) -> Expr {
        self.repeat(bounds)
    }
}

impl<T: Into<Expr>> BitOr<T> for SymbolId {
    type Output = Expr;

    fn bitor(self, other: T) -> Expr {
        Expr::Symbol(self).or(other)
    }
}

impl<R: Into<Repetition>> Mul<R> for SymbolId {
    type Output = Expr;

    fn mul(self, bounds: R) -> Expr {
        Expr::Symbol(self).repeat(bounds)
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<SymbolId> for Expr {
    fn from(id: SymbolId) -> Self {
        Expr::Symbol(id)
    }
}

impl From<&str> for Expr {
    fn from(text: &str) -> Self {
        Expr::Literal(text.to_string())
    }
}

impl From<String> for Expr {
    fn from(text: String) -> Self {
        Expr::Literal(text)
    }
}

impl From<&String> for Expr {
    fn from(text: &String) -> Self {
        Expr::Literal(text.clone())
    }
}

/// The pattern is rebuilt from [`regex::Regex::as_str`], so only flags
/// written inline (`(?i)`, `(?m)`) carry over. Options set through
/// `regex::RegexBuilder` are not part of the source text and are lost.
impl From<regex::Regex> for Expr {
    fn from(regex: regex::Regex) -> Self {
        Expr::Regex(regex)
    }
}

impl From<()> for Expr {
    fn from(_: ()) -> Self {
        Expr::Empty
    }
}

impl<T: Into<Expr>> From<Option<T>> for Expr {
    fn from(value: Option<T>) -> Self {
        value.map_or(Expr::Empty, Into::into)
    }
}

impl From<Failure> for Expr {
    fn from(failure: Failure) -> Self {
        Expr::Fail(failure)
    }
}

impl<T: Into<Expr>> From<Vec<T>> for Expr {
    fn from(items: Vec<T>) -> Self {
        Expr::Alternation(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Expr>, const N: usize> From<[T; N]> for Expr {
    fn from(items: [T; N]) -> Self {
        Expr::Alternation(items.into_iter().map(Into::into).collect())
    }
}

macro_rules! impl_sequence_tuple {
    ($($name:ident),+) => {
        impl<$($name: Into<Expr>),+> From<($($name,)+)> for Expr {
            #[allow(non_snake_case)]
            fn from(($($name,)+): ($($name,)+)) -> Self {
                Expr::Sequence(vec![$($name.into()),+])
            }
        }
    };
}

impl_sequence_tuple!(A);
impl_sequence_tuple!(A, B);
impl_sequence_tuple!(A, B, C);
impl_sequence_tuple!(A, B, C, D);
impl_sequence_tuple!(A, B, C, D, E);
impl_sequence_tuple!(A, B, C, D, E, F);
impl_sequence_tuple!(A, B, C, D, E, F, G);
impl_sequence_tuple!(A, B, C, D, E, F, G, H);
impl_sequence_tuple!(A, B, C, D, E, F, G, H, I);
impl_sequence_tuple!(A, B, C, D, E, F, G, H, I, J);

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Symbol(id) => write!(f, "Symbol({id})"),
            Expr::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Expr::Pattern(source) => f.debug_tuple("Pattern").field(source).finish(),
            Expr::Regex(regex) => f.debug_tuple("Regex").field(&regex.as_str()).finish(),
            Expr::Empty => write!(f, "Empty"),
            Expr::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
            Expr::Alternation(items) => f.debug_tuple("Alternation").field(items).finish(),
            Expr::Repeat(inner, bounds) => write!(f, "Repeat({inner:?}, {bounds})"),
            Expr::Rule(name) => f.debug_tuple("Rule").field(name).finish(),
            Expr::Fail(failure) => f.debug_tuple("Fail").field(&failure.message()).finish(),
            Expr::Named(inner, name) => write!(f, "Named({inner:?}, {name:?})"),
            Expr::Mapped(inner, _) => write!(f, "Mapped({inner:?}, <fn>)"),
        }
    }
}
