//! Arithmetic over `+ - * /`, integers and parentheses.
//!
//! Two grammars evaluate the same language:
//!
//! - [`iterative`] expresses precedence with repetitions and runs on either
//!   engine. A factor that is neither a number nor a parenthesized expression
//!   aborts the parse with `unexpected token`.
//! - [`left_recursive`] uses the textbook left-recursive rules and needs the
//!   packrat engine.

use crate::engine::{EngineKind, MatchResult};
use crate::errors::GrammarError;
use crate::alt;
use crate::expr::{fail, pattern, rule, Expr};
use crate::grammar::Grammar;
use crate::symbol::SymbolId;
use crate::value::Value;

/// Entry rule of [`iterative`].
pub const ITERATIVE_ENTRY: &str = "Start";
/// Entry rule of [`left_recursive`].
pub const LEFT_RECURSIVE_ENTRY: &str = "S";

/// Optional whitespace and decimal integers, shared by both grammars.
fn terminals(g: &mut Grammar) -> Result<(SymbolId, SymbolId), GrammarError> {
    let ends = g.add(pattern(r"\s*").named("ends"))?;
    let integer = g.add(pattern("[0-9]+").named("integer").map(to_number))?;
    Ok((ends, integer))
}

/// The precedence-by-repetition grammar.
///
/// ```text
/// Start -> ends Expr ends
/// Expr  -> Term (ends ['+'|'-'] ends Term)*
/// Term  -> Fact (ends ['*'|'/'] ends Fact)*
/// Fact  -> '(' ends Expr ends ')' | integer | Fail('unexpected token')
/// ```
pub fn iterative() -> Result<Grammar, GrammarError> {
    let mut g = Grammar::new();
    let (ends, integer) = terminals(&mut g)?;

    g.define(ITERATIVE_ENTRY, (ends, rule("Expr"), ends))?;
    g.define(
        "Expr",
        (rule("Term"), Expr::from((ends, ["+", "-"], ends, rule("Term"))) * (0..)),
    )?;
    g.define(
        "Term",
        (rule("Fact"), Expr::from((ends, ["*", "/"], ends, rule("Fact"))) * (0..)),
    )?;
    g.define(
        "Fact",
        alt![("(", ends, rule("Expr"), ends, ")"), integer, fail("unexpected token")],
    )?;

    g.action(ITERATIVE_ENTRY, |v| nth(v, 1));
    g.action("Expr", fold_operations);
    g.action("Term", fold_operations);
    g.action("Fact", |v| match v {
        Value::List(_) => nth(v, 2),
        other => other,
    });
    Ok(g)
}

/// The left-recursive grammar.
///
/// ```text
/// S -> ends E ends
/// E -> E ends ['+'|'-'] ends T | T
/// T -> T ends ['*'|'/'] ends F | F
/// F -> '(' S ')' | integer
/// ```
pub fn left_recursive() -> Result<Grammar, GrammarError> {
    let mut g = Grammar::new();
    let (ends, integer) = terminals(&mut g)?;

    g.define(LEFT_RECURSIVE_ENTRY, (ends, rule("E"), ends))?;
    g.define("E", Expr::from((rule("E"), ends, ["+", "-"], ends, rule("T"))) | rule("T"))?;
    g.define("T", Expr::from((rule("T"), ends, ["*", "/"], ends, rule("F"))) | rule("F"))?;
    g.define("F", Expr::from(("(", rule("S"), ")")) | integer)?;

    g.action(LEFT_RECURSIVE_ENTRY, |v| nth(v, 1));
    g.action("E", binary_step);
    g.action("T", binary_step);
    g.action("F", |v| match v {
        Value::List(_) => nth(v, 1),
        other => other,
    });
    Ok(g)
}

/// Evaluates `text`: the simple engine runs the iterative grammar and the
/// packrat engine the left-recursive one.
///
/// # Examples
///
/// ```rust
/// use rdparse::grammars::arith;
/// use rdparse::{EngineKind, Value};
/// let value = arith::evaluate(" (1+5-4)*(2/(2-1)) ", EngineKind::Packrat).unwrap();
/// assert_eq!(value, Some(Value::Number(4.0)));
/// ```
pub fn evaluate(text: &str, kind: EngineKind) -> MatchResult {
    let (grammar, entry) = for_engine(kind)?;
    grammar.parse(entry, text, kind)
}

/// The grammar and entry rule [`evaluate`] uses for `kind`.
pub fn for_engine(kind: EngineKind) -> Result<(Grammar, &'static str), GrammarError> {
    match kind {
        EngineKind::Simple => Ok((iterative()?, ITERATIVE_ENTRY)),
        EngineKind::Packrat => Ok((left_recursive()?, LEFT_RECURSIVE_ENTRY)),
    }
}

// ============================================================================
// ACTIONS
// ============================================================================

fn to_number(v: Value) -> Value {
    match v.as_text().and_then(|t| t.parse::<f64>().ok()) {
        Some(n) => Value::Number(n),
        None => Value::Nil,
    }
}

fn nth(v: Value, index: usize) -> Value {
    v.into_list()
        .and_then(|items| items.into_iter().nth(index))
        .unwrap_or_default()
}

fn apply_operator(lhs: &Value, op: &Value, rhs: &Value) -> Value {
    let (Some(lhs), Some(op), Some(rhs)) = (lhs.as_number(), op.as_text(), rhs.as_number()) else {
        return Value::Nil;
    };
    match op {
        "+" => Value::Number(lhs + rhs),
        "-" => Value::Number(lhs - rhs),
        "*" => Value::Number(lhs * rhs),
        "/" => Value::Number(lhs / rhs),
        _ => Value::Nil,
    }
}

/// `[first, [[ends, op, ends, operand], ...]]` folded left to right.
fn fold_operations(v: Value) -> Value {
    let Some(mut items) = v.into_list() else {
        return Value::Nil;
    };
    let rest = items.pop().and_then(Value::into_list).unwrap_or_default();
    let mut acc = items.pop().unwrap_or_default();
    for step in rest {
        let Some(step) = step.as_list() else {
            return Value::Nil;
        };
        if let [_, op, _, operand] = step {
            acc = apply_operator(&acc, op, operand);
        }
    }
    acc
}

/// `[lhs, ends, op, ends, rhs]`, or a lone operand passed through.
fn binary_step(v: Value) -> Value {
    match v.as_list() {
        Some([lhs, _, op, _, rhs]) => apply_operator(lhs, op, rhs),
        Some(_) => Value::Nil,
        None => v,
    }
}

#[cfg(test)]
mod arith_tests {
    use super::*;

    fn eval(text: &str, kind: EngineKind) -> Option<f64> {
        evaluate(text, kind).unwrap().and_then(|v| v.as_number())
    }

    #[test]
    fn test_precedence_both_grammars() {
        for kind in [EngineKind::Simple, EngineKind::Packrat] {
            assert_eq!(eval("1+2*3", kind), Some(7.0));
            assert_eq!(eval("(1+2)*3", kind), Some(9.0));
            assert_eq!(eval("8/2/2", kind), Some(2.0));
            assert_eq!(eval("10-4-3", kind), Some(3.0));
        }
    }

    #[test]
    fn test_iterative_runs_on_packrat_too() {
        let g = iterative().unwrap();
        let value = g.parse(ITERATIVE_ENTRY, " 6 / 3 ", EngineKind::Packrat).unwrap();
        assert_eq!(value, Some(Value::Number(2.0)));
    }

    #[test]
    fn test_dumps() {
        let g = iterative().unwrap();
        let dump = g.dump();
        assert!(dump.starts_with("Start->(ends,Expr,ends)\n"));
        assert!(dump.contains("Fact->[('(',ends,Expr,ends,')')|integer|Fail('unexpected token')]"));

        let g = left_recursive().unwrap();
        assert_eq!(
            g.dump(),
            "S->(ends,E,ends)\n\
             E->[(E,ends,['+'|'-'],ends,T)|T]\n\
             T->[(T,ends,['*'|'/'],ends,F)|F]\n\
             F->[('(',S,')')|integer]"
        );
    }

    #[test]
    fn test_binary_step_passthrough() {
        assert_eq!(binary_step(Value::Number(2.0)), Value::Number(2.0));
        let list = Value::List(vec![
            Value::Number(6.0),
            Value::from(""),
            Value::from("*"),
            Value::from(""),
            Value::Number(7.0),
        ]);
        assert_eq!(binary_step(list), Value::Number(42.0));
    }
}
