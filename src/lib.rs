//! rdparse: a recursive-descent parsing engine.
//!
//! Grammars are written in a small symbol algebra (literals, patterns,
//! sequences, ordered choice, bounded repetition, rule references and fatal
//! `Fail` nodes) and interpreted directly at parse time by one of two
//! engines:
//!
//! - [`SimpleEngine`] backtracks without memoization.
//! - [`PackratEngine`] memoizes every `(symbol, position)` result and resolves
//!   direct and indirect left recursion by growing seeds.
//!
//! ```rust
//! use rdparse::{pattern, rule, EngineKind, Expr, Grammar, Value};
//!
//! let mut g = Grammar::new();
//! g.define("Sum", Expr::from((rule("Sum"), "+", rule("Num"))) | rule("Num")).unwrap();
//! g.define("Num", pattern("[0-9]+")).unwrap();
//! g.action("Num", |v| Value::Number(v.as_text().and_then(|t| t.parse().ok()).unwrap_or(0.0)));
//! g.action("Sum", |v| match v.as_list() {
//!     Some([lhs, _, rhs]) => Value::Number(lhs.as_number().unwrap_or(0.0) + rhs.as_number().unwrap_or(0.0)),
//!     _ => v,
//! });
//!
//! let value = g.parse("Sum", "1+2+39", EngineKind::Packrat).unwrap();
//! assert_eq!(value, Some(Value::Number(42.0)));
//! ```

pub mod cli;
pub mod cursor;
pub mod engine;
pub mod errors;
pub mod expr;
pub mod grammar;
pub mod grammars;
pub mod symbol;
pub mod validate;
pub mod value;

pub use crate::cursor::Cursor;
pub use crate::engine::{
    Engine, EngineConfig, EngineKind, MatchResult, PackratEngine, SimpleEngine, TraceBuffer,
    TraceEvent, TraceSink,
};
pub use crate::errors::{print_error, GrammarError, ParseError};
pub use crate::expr::{empty, fail, pattern, rule, Expr, IntoExpr};
pub use crate::grammar::Grammar;
pub use crate::symbol::{Failure, Repetition, SymbolId, SymbolKind, SymbolNode, Transform};
pub use crate::validate::{GrammarReport, ValidationReporter};
pub use crate::value::Value;
