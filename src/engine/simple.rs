//! The simple backtracking engine.
//!
//! No memoization: every attempt re-runs its match, so ambiguous grammars can
//! take exponential time. Left-recursive grammars recurse without consuming
//! input and are stopped by the depth limit.

use crate::cursor::Cursor;
use crate::errors::ParseError;
use crate::grammar::Grammar;
use crate::symbol::SymbolId;

use super::trace::{TraceSink, Tracer};
use super::{apply, with_stack, Engine, EngineConfig, MatchResult};

pub struct SimpleEngine<'a> {
    grammar: &'a Grammar,
    cursor: Cursor<'a>,
    stack: Vec<SymbolId>,
    config: EngineConfig,
    tracer: Tracer<'a>,
}

impl<'a> SimpleEngine<'a> {
    /// An engine over the whole of `text`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rdparse::{Engine, Grammar, SimpleEngine, Value};
    /// let mut g = Grammar::new();
    /// let greeting = g.define("Greeting", ("hello", " ", "world")).unwrap();
    /// let mut engine = SimpleEngine::new(&g, "hello world");
    /// let value = engine.parse(greeting).unwrap().unwrap();
    /// assert_eq!(value.as_list().map(|items| items.len()), Some(3));
    /// assert!(engine.cursor().eof());
    /// ```
    pub fn new(grammar: &'a Grammar, text: &'a str) -> Self {
        Self::with_window(grammar, text, 0, None)
    }

    /// An engine over `text[begin..end)`.
    pub fn with_window(grammar: &'a Grammar, text: &'a str, begin: usize, end: Option<usize>) -> Self {
        Self {
            grammar,
            cursor: Cursor::with_window(text, begin, end),
            stack: Vec::new(),
            config: EngineConfig::default(),
            tracer: Tracer::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_trace(mut self, sink: impl TraceSink + 'a) -> Self {
        self.tracer.attach(sink);
        self
    }
}

impl<'a> Engine<'a> for SimpleEngine<'a> {
    fn grammar(&self) -> &'a Grammar {
        self.grammar
    }

    fn cursor(&self) -> &Cursor<'a> {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut Cursor<'a> {
        &mut self.cursor
    }

    fn call_stack(&self) -> &[SymbolId] {
        &self.stack
    }

    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn parse(&mut self, id: SymbolId) -> MatchResult {
        let depth = self.stack.len();
        if depth >= self.config.max_depth {
            return Err(ParseError::RecursionLimit {
                depth: self.config.max_depth,
                offset: self.cursor.index(),
            });
        }

        let grammar = self.grammar;
        let width = self.config.excerpt_width;
        self.tracer
            .start(depth, || grammar.describe(id), self.cursor.behind(width));

        self.stack.push(id);
        let result = with_stack(|| apply(self, id));
        self.stack.pop();

        if let Ok(value) = &result {
            self.tracer.end(
                depth,
                || grammar.describe(id),
                value.as_ref(),
                self.cursor.behind(width),
            );
        }
        result
    }

    fn reset(&mut self) {
        self.cursor.reset();
        self.stack.clear();
    }
}

#[cfg(test)]
mod simple_tests {
    use super::*;
    use crate::engine::TraceBuffer;
    use crate::expr::rule;

    #[test]
    fn test_left_recursion_hits_depth_limit() {
        let mut g = Grammar::new();
        let a = g.define("A", alt_left_recursive()).unwrap();
        let mut engine = SimpleEngine::new(&g, "a,a").with_config(EngineConfig::default().with_max_depth(50));
        let err = engine.parse(a).unwrap_err();
        assert!(matches!(err, ParseError::RecursionLimit { depth: 50, offset: 0 }));
    }

    fn alt_left_recursive() -> crate::Expr {
        crate::Expr::from((rule("A"), ",", "a")) | "a"
    }

    #[test]
    fn test_trace_records_start_and_end() {
        let mut g = Grammar::new();
        let s = g.define("S", ("a", "b")).unwrap();
        let mut buffer = TraceBuffer::new();
        {
            let mut engine = SimpleEngine::new(&g, "ab").with_trace(&mut buffer);
            engine.parse(s).unwrap();
        }
        let lines: Vec<&str> = buffer.as_str().lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "   0 START S << \"ab\"");
        assert_eq!(lines[1], "   1   START 'a' << \"ab\"");
        assert_eq!(lines[5], "   0 END S -> [\"a\", \"b\"] << \"\"");
    }

    #[test]
    fn test_reset_rewinds() {
        let mut g = Grammar::new();
        let s = g.define("S", "ab").unwrap();
        let mut engine = SimpleEngine::new(&g, "ab");
        engine.parse(s).unwrap();
        assert!(engine.cursor().eof());
        engine.reset();
        assert_eq!(engine.cursor().index(), 0);
    }
}
