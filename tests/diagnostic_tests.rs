// tests/diagnostic_tests.rs
//
// Fatal `Fail` diagnostics: message, frame trail, excerpts and rendering.

use rdparse::grammars::arith;
use rdparse::{fail, pattern, Engine, EngineConfig, EngineKind, Grammar, PackratEngine, ParseError};

fn integer_then_fail() -> Grammar {
    let mut g = Grammar::new();
    g.define(
        "Start",
        (
            pattern("[0-9]+").named("integer"),
            pattern(r"\s*").named("ends"),
            fail("unexpected token"),
        ),
    )
    .unwrap();
    g
}

#[test]
fn test_fail_reports_excerpt_and_message() {
    let g = integer_then_fail();
    for kind in [EngineKind::Simple, EngineKind::Packrat] {
        let err = g.parse("Start", "12345 ", kind).unwrap_err();
        match &err {
            ParseError::Fatal {
                message,
                trail,
                before,
                after,
                offset,
                ..
            } => {
                assert_eq!(message, "unexpected token");
                assert_eq!(before, "12345 ");
                assert_eq!(after, "");
                assert_eq!(*offset, 6);
                assert_eq!(trail, &vec!["Start: (integer,ends,Fail('unexpected token'))".to_string()]);
            }
            other => panic!("expected a fatal error, got {other:?}"),
        }
        assert_eq!(err.to_string(), "unexpected token");

        let excerpt = err.render_excerpt().unwrap();
        assert!(excerpt.contains("12345 "));
        assert!(excerpt.ends_with("12345 \n      ^unexpected token\n"));
    }
}

#[test]
fn test_fail_is_not_caught_by_alternation() {
    let mut g = Grammar::new();
    g.define("Start", rdparse::Expr::from(fail("stop")) | "x").unwrap();
    let err = g.parse("Start", "x", EngineKind::Packrat).unwrap_err();
    assert!(err.is_fatal_node());
}

#[test]
fn test_iterative_calculator_trail() {
    let err = arith::evaluate(" 12345 + ", EngineKind::Simple).unwrap_err();
    let trail = err.trail();
    assert_eq!(trail.first().map(String::as_str), Some("Start: (ends,Expr,ends)"));
    assert_eq!(trail.last().map(String::as_str), Some("Fact"));
    assert!(trail.iter().any(|frame| frame == "Term"));

    let excerpt = err.render_excerpt().unwrap();
    assert!(excerpt.starts_with("ParserStack(Name: Symbol)\nStart: (ends,Expr,ends)\n    Expr\n"));
    assert!(excerpt.ends_with(" 12345 + \n         ^unexpected token\n"));
}

#[test]
fn test_excerpt_width_and_newlines() {
    let g = integer_then_fail();
    let text = "123456789\n";
    let config = EngineConfig::default().with_excerpt_width(4);
    let body = g.body("Start").unwrap();
    let mut engine = PackratEngine::new(&g, text).with_config(config);
    let err = engine.parse(body).unwrap_err();
    match err {
        ParseError::Fatal { before, offset, .. } => {
            assert_eq!(before, "789\\n");
            assert_eq!(offset, text.len());
        }
        other => panic!("expected a fatal error, got {other:?}"),
    }
}

#[test]
fn test_miette_report_carries_code_and_help() {
    let soft = arith::evaluate("(1 + ", EngineKind::Packrat).unwrap();
    // the left-recursive grammar has no Fail node, so this is a soft failure
    assert_eq!(soft, None);

    let err = arith::evaluate("(1 + ", EngineKind::Simple).unwrap_err();
    let report = format!("{:?}", miette::Report::new(err));
    assert!(report.contains("rdparse::parse::fatal"));
    assert!(report.contains("unexpected token"));
    assert!(report.contains("raised while parsing Fact"));
}
