// tests/symbol_tests.rs
//
// Match semantics of each symbol kind, checked on both engines.

mod common;

use common::{matched, parse_at};
use rdparse::{pattern, rule, Engine, Expr, Grammar, PackratEngine, SimpleEngine, SymbolId, Value};

fn engines<'a>(g: &'a Grammar, text: &'a str) -> Vec<Box<dyn Engine<'a> + 'a>> {
    vec![
        Box::new(SimpleEngine::new(g, text)),
        Box::new(PackratEngine::new(g, text)),
    ]
}

#[test]
fn test_literal_advances_by_its_length() {
    let mut g = Grammar::new();
    let hello = g.add("hello").unwrap();
    for mut engine in engines(&g, "hello world") {
        assert_eq!(matched(engine.as_mut(), hello), Value::from("hello"));
        assert_eq!(engine.cursor().index(), 5);
    }
}

#[test]
fn test_literal_respects_utf8_boundaries() {
    let mut g = Grammar::new();
    let word = g.add("héllo").unwrap();
    let mut engine = SimpleEngine::new(&g, "héllo!");
    assert_eq!(matched(&mut engine, word), Value::from("héllo"));
    assert_eq!(engine.cursor().index(), "héllo".len());
}

#[test]
fn test_failed_match_leaves_cursor_unchanged() {
    let mut g = Grammar::new();
    g.define("Yzq", ("y", "z", "q")).unwrap();
    let candidates: Vec<SymbolId> = vec![
        g.add("q").unwrap(),
        g.add(pattern("[0-9]+")).unwrap(),
        g.add(("y", "q")).unwrap(),
        g.add(["q", "w"]).unwrap(),
        g.add(Expr::from("y") * (2, 3)).unwrap(),
        g.add(rule("Yzq")).unwrap(),
    ];

    for mut engine in engines(&g, "xyz") {
        for &id in &candidates {
            engine.cursor_mut().seek(1);
            let (result, index) = parse_at(engine.as_mut(), id);
            assert_eq!(result.unwrap(), None, "{}", g.describe(id));
            assert_eq!(index, 1, "{} moved the cursor", g.describe(id));
        }
    }
}

#[test]
fn test_alternation_prefers_first_success() {
    let mut g = Grammar::new();
    let choice = g.add(Expr::from("a") | ("a", "b")).unwrap();
    for mut engine in engines(&g, "ab") {
        assert_eq!(matched(engine.as_mut(), choice), Value::from("a"));
        assert_eq!(engine.cursor().index(), 1);
    }
}

#[test]
fn test_alternation_falls_through_to_later_choice() {
    let mut g = Grammar::new();
    let choice = g.add(Expr::from(("a", "c")) | ("a", "b")).unwrap();
    for mut engine in engines(&g, "ab") {
        let value = matched(engine.as_mut(), choice);
        assert_eq!(value, Value::List(vec![Value::from("a"), Value::from("b")]));
        assert!(engine.cursor().eof());
    }
}

#[test]
fn test_bounded_repeat() {
    let mut g = Grammar::new();
    let xs = g.add(Expr::from("x") * (2, 3)).unwrap();

    for (text, expected) in [("xx", Some(2)), ("xxxx", Some(3)), ("x", None), ("", None)] {
        for mut engine in engines(&g, text) {
            let (result, index) = parse_at(engine.as_mut(), xs);
            let count = result.unwrap().and_then(Value::into_list).map(|items| items.len());
            assert_eq!(count, expected, "input {text:?}");
            assert_eq!(index, expected.unwrap_or(0), "input {text:?}");
        }
    }
}

#[test]
fn test_pattern_is_anchored_and_greedy() {
    let mut g = Grammar::new();
    let digits = g.add(pattern("[0-9]+")).unwrap();
    for mut engine in engines(&g, "a123") {
        assert_eq!(parse_at(engine.as_mut(), digits).0.unwrap(), None);
        engine.cursor_mut().seek(1);
        assert_eq!(matched(engine.as_mut(), digits), Value::from("123"));
    }
}

#[test]
fn test_window_bounds_the_input() {
    let mut g = Grammar::new();
    let digits = g.add(pattern("[0-9]+")).unwrap();
    let mut engine = PackratEngine::with_window(&g, "ab1234cd", 2, Some(4));
    assert_eq!(matched(&mut engine, digits), Value::from("12"));
    assert!(engine.cursor().eof());
}

#[test]
fn test_empty_and_option() {
    let mut g = Grammar::new();
    let maybe_sign = g.add(Expr::from(["-", "+"]) | ()).unwrap();
    let mut engine = SimpleEngine::new(&g, "7");
    assert_eq!(matched(&mut engine, maybe_sign), Value::from(""));
    assert_eq!(engine.cursor().index(), 0);
}

#[test]
fn test_transform_applies_to_raw_match() {
    let mut g = Grammar::new();
    let len = g
        .add(pattern("[a-z]+").map(|v| Value::Number(v.as_text().map_or(0, str::len) as f64)))
        .unwrap();
    let mut engine = SimpleEngine::new(&g, "abc");
    assert_eq!(matched(&mut engine, len), Value::Number(3.0));
}
