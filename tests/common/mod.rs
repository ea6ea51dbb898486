// Shared helpers for the integration tests.
#![allow(dead_code)]

use rdparse::{Engine, MatchResult, SymbolId, Value};

/// Parses `id` and returns the result together with where the cursor ended.
pub fn parse_at<'a, E: Engine<'a> + ?Sized>(engine: &mut E, id: SymbolId) -> (MatchResult, usize) {
    let result = engine.parse(id);
    (result, engine.cursor().index())
}

/// Parses `id` and unwraps a successful match.
pub fn matched<'a, E: Engine<'a> + ?Sized>(engine: &mut E, id: SymbolId) -> Value {
    engine
        .parse(id)
        .expect("parse should not abort")
        .expect("parse should match")
}

/// The value of a left-recursive comma list of `n` items:
/// `[["a", ",", "a"], ",", "a"]` for three.
pub fn nested_list(n: usize) -> Value {
    let mut value = Value::from("a");
    for _ in 1..n {
        value = Value::List(vec![value, Value::from(","), Value::from("a")]);
    }
    value
}
