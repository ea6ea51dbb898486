//! The comma list `A -> A ',' 'a' | 'a'`.
//!
//! Directly left-recursive, so it only parses on the packrat engine. A list
//! of n items nests n - 1 levels deep: `"a,a,a"` yields
//! `[["a", ",", "a"], ",", "a"]`.

use crate::errors::GrammarError;
use crate::expr::{rule, Expr};
use crate::grammar::Grammar;
use crate::value::Value;

pub const ENTRY: &str = "A";

pub fn grammar() -> Result<Grammar, GrammarError> {
    let mut g = Grammar::new();
    g.define(ENTRY, Expr::from((rule(ENTRY), ",", "a")) | "a")?;
    Ok(g)
}

/// Number of `a` items in a parsed list.
pub fn count_items(value: &Value) -> usize {
    match value {
        Value::List(items) => items.first().map_or(0, count_items) + 1,
        Value::Text(_) => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod list_tests {
    use super::*;
    use crate::engine::EngineKind;

    #[test]
    fn test_dump() {
        assert_eq!(grammar().unwrap().dump(), "A->[(A,',','a')|'a']");
    }

    #[test]
    fn test_count_items() {
        let g = grammar().unwrap();
        let value = g.parse(ENTRY, "a,a,a,a", EngineKind::Packrat).unwrap().unwrap();
        assert_eq!(count_items(&value), 4);
        assert_eq!(count_items(&Value::from("a")), 1);
    }
}
