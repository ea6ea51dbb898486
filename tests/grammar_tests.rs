// tests/grammar_tests.rs
//
// Symbol table construction, actions, dumps and static validation.

use std::rc::Rc;

use rdparse::grammars::{arith, list};
use rdparse::{
    empty, fail, pattern, rule, Engine, EngineKind, Expr, Failure, Grammar, GrammarError,
    ParseError, Repetition, SimpleEngine, Transform, Value,
};

#[test]
fn test_dump_formats_every_kind() {
    let mut g = Grammar::new();
    let ws = g.add(pattern(r"\s*").named("ws")).unwrap();
    g.define(
        "All",
        (
            "lit",
            pattern("[0-9]+"),
            empty(),
            Expr::from("r") * (2, 3),
            Expr::from("s") * (1..),
            ["x", "y"],
            rule("Other"),
            Failure::new("boom"),
            ws,
        ),
    )
    .unwrap();
    g.define("Other", fail("it is over")).unwrap();

    assert_eq!(
        g.dump(),
        "All->('lit',re'[0-9]+','','r'*(2,3),'s'*(1,...),['x'|'y'],Other,Fail('boom'),ws)\n\
         Other->Fail('it is over')"
    );
}

#[test]
fn test_regex_keeps_inline_flags_only() {
    let mut g = Grammar::new();
    let inline = regex::Regex::new("(?i)abc").unwrap();
    g.define("Inline", inline).unwrap();
    let built = regex::RegexBuilder::new("abc")
        .case_insensitive(true)
        .build()
        .unwrap();
    g.define("Built", built).unwrap();

    let value = g.parse("Inline", "ABC", EngineKind::Simple).unwrap();
    assert_eq!(value, Some(Value::from("ABC")));
    assert_eq!(g.parse("Built", "ABC", EngineKind::Simple).unwrap(), None);
    assert_eq!(g.parse("Built", "abc", EngineKind::Simple).unwrap(), Some(Value::from("abc")));
}

#[test]
fn test_parse_matches_a_prefix() {
    let mut g = Grammar::new();
    g.define("Word", pattern("[a-z]+")).unwrap();
    let mut engine = SimpleEngine::new(&g, "abc def");
    let body = g.body("Word").unwrap();
    assert_eq!(engine.parse(body).unwrap(), Some(Value::from("abc")));
    assert_eq!(engine.cursor().index(), 3);

    for kind in [EngineKind::Simple, EngineKind::Packrat] {
        let value = g.parse("Word", "abc def", kind).unwrap();
        assert_eq!(value, Some(Value::from("abc")));
    }
}

#[test]
fn test_or_extends_an_existing_alternation() {
    let mut g = Grammar::new();
    let choice = g.add(Expr::from(["a", "b"]) | "c").unwrap();
    assert_eq!(g.describe(choice), "['a'|'b'|'c']");

    let nested = g.add(Expr::from(("a", "b")) | "c").unwrap();
    assert_eq!(g.describe(nested), "[('a','b')|'c']");
}

#[test]
fn test_node_builders() {
    let mut g = Grammar::new();
    let a = g.literal("a");
    let b = g.literal("b");
    let pair = g.seq([a, b]);
    let either = g.alt([pair, a]);
    let many = g.repeat(either, 1..=4).unwrap();
    let named = g.named(many, "Items");
    g.with_transform(named, |v| Value::Number(v.as_list().map_or(0, <[Value]>::len) as f64));
    g.define("Start", named).unwrap();

    assert_eq!(g.describe(named), "Items");
    assert_eq!(g.dump_expr(named), "[('a','b')|'a']*(1,4)");
    let value = g.parse("Start", "abaab", EngineKind::Packrat).unwrap();
    assert_eq!(value, Some(Value::Number(3.0)));
}

#[test]
fn test_invalid_constructions_are_rejected() {
    let mut g = Grammar::new();
    assert!(matches!(
        g.pattern("[unclosed"),
        Err(GrammarError::InvalidPattern { .. })
    ));
    let x = g.literal("x");
    assert_eq!(
        g.repeat(x, Repetition::between(4, 2)),
        Err(GrammarError::InvalidBounds { min: 4, max: 2 })
    );
    assert!(g.define("Bad", pattern("(")).is_err());
    assert!(g.body("Bad").is_none());
}

#[test]
fn test_actions_from_a_map() {
    let to_number: Transform = Rc::new(|v: Value| {
        Value::Number(v.as_text().and_then(|t| t.parse().ok()).unwrap_or(f64::NAN))
    });
    let negate: Transform = Rc::new(|v: Value| match v.as_list() {
        Some([_, n]) => Value::Number(-n.as_number().unwrap_or(0.0)),
        _ => v,
    });

    let mut g = Grammar::new().with_actions([("Num", to_number), ("Neg", negate)]);
    g.define("Neg", ("-", rule("Num"))).unwrap();
    g.define("Num", pattern("[0-9]+")).unwrap();

    let value = g.parse("Neg", "-12", EngineKind::Simple).unwrap();
    assert_eq!(value, Some(Value::Number(-12.0)));
}

#[test]
fn test_alias_rule_keeps_its_own_action() {
    let mut g = Grammar::new();
    g.define("Inner", "a").unwrap();
    g.define("Alias", rule("Inner")).unwrap();
    g.action("Inner", |_| Value::Number(1.0));
    g.action("Alias", |v| Value::List(vec![v]));

    for kind in [EngineKind::Simple, EngineKind::Packrat] {
        let value = g.parse("Alias", "a", kind).unwrap();
        assert_eq!(value, Some(Value::List(vec![Value::Number(1.0)])));
        let value = g.parse("Inner", "a", kind).unwrap();
        assert_eq!(value, Some(Value::Number(1.0)));
    }
    assert_eq!(g.dump(), "Inner->'a'\nAlias->[Inner]");
}

#[test]
fn test_unknown_entry_rule() {
    let g = Grammar::new();
    let err = g.parse("Nope", "", EngineKind::Packrat).unwrap_err();
    assert!(matches!(err, ParseError::UndefinedRule { ref name } if name == "Nope"));
}

#[test]
fn test_validate_reports_undefined_references() {
    let mut g = Grammar::new();
    g.define("Start", (rule("Expr"), rule("Tail"))).unwrap();
    g.define("Expr", "e").unwrap();
    let report = g.validate();
    assert!(!report.is_valid());
    assert_eq!(report.errors, vec!["rule 'Tail' is referenced but never defined".to_string()]);
}

#[test]
fn test_stock_grammars_validate() {
    let report = arith::iterative().unwrap().validate();
    assert!(report.is_clean(), "{report:?}");

    let report = arith::left_recursive().unwrap().validate();
    assert!(report.is_valid());
    assert_eq!(report.suggestions.len(), 2);

    let report = list::grammar().unwrap().validate();
    assert_eq!(
        report.suggestions,
        vec!["rule 'A' is left-recursive; parse it with the packrat engine".to_string()]
    );
}
