//! The packrat engine: memoized recursive descent with left-recursion
//! support.
//!
//! ## Memoization
//! Every `(symbol, position)` result is stored, failures included, keyed on
//! the body a symbol resolves to. A repeated attempt seeks straight to the
//! stored end without re-running the match or its transform.
//!
//! ## Left recursion
//! Evaluating a key first stores a `Seed`. A recursive hit on a seed fails
//! softly and is logged, which makes the key grow: it is re-evaluated with
//! the previous result in its memo slot until the match stops getting longer.
//! The longest result wins; on a tie the earlier derivation is kept.
//!
//! Hits on seeds and on keys still growing go to a dependency log. A result
//! whose evaluation hit some *other* unsettled key was computed against a
//! provisional value, so it is returned but not memoized. This keeps indirect
//! and nested recursion sound: the outer key re-evaluates it on its next
//! growth round.

use std::collections::{HashMap, HashSet};

use crate::cursor::Cursor;
use crate::errors::ParseError;
use crate::grammar::Grammar;
use crate::symbol::SymbolId;
use crate::value::Value;

use super::trace::{TraceSink, Tracer};
use super::{apply, with_stack, Engine, EngineConfig, MatchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MemoKey {
    symbol: SymbolId,
    start: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Memo {
    /// Evaluation in progress; recursive hits fail.
    Seed,
    Resolved { value: Option<Value>, end: usize },
}

impl Memo {
    /// Ordering used to decide whether a growth round made progress: a seed
    /// ranks below a failure, which ranks below any match, and longer matches
    /// rank higher.
    fn progress(&self) -> (u8, usize) {
        match self {
            Memo::Seed => (0, 0),
            Memo::Resolved { value: None, .. } => (1, 0),
            Memo::Resolved { value: Some(_), end } => (2, *end),
        }
    }
}

pub struct PackratEngine<'a> {
    grammar: &'a Grammar,
    cursor: Cursor<'a>,
    stack: Vec<SymbolId>,
    memo: HashMap<MemoKey, Memo>,
    /// Hits on seeds and growing keys not yet absorbed by their owner.
    unsettled: Vec<MemoKey>,
    growing: HashSet<MemoKey>,
    config: EngineConfig,
    tracer: Tracer<'a>,
}

impl<'a> PackratEngine<'a> {
    /// An engine over the whole of `text`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rdparse::{rule, Engine, Expr, Grammar, PackratEngine, Value};
    /// let mut g = Grammar::new();
    /// let list = g.define("List", Expr::from((rule("List"), ",", "a")) | "a").unwrap();
    /// let mut engine = PackratEngine::new(&g, "a,a");
    /// let value = engine.parse(list).unwrap().unwrap();
    /// assert_eq!(value.to_string(), r#"["a", ",", "a"]"#);
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
            memo: HashMap::new(),
            unsettled: Vec::new(),
            growing: HashSet::new(),
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

    /// Number of memoized `(symbol, position)` entries.
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }

    fn parse_frame(&mut self, id: SymbolId) -> MatchResult {
        let depth = self.stack.len();
        if depth >= self.config.max_depth {
            return Err(ParseError::RecursionLimit {
                depth: self.config.max_depth,
                offset: self.cursor.index(),
            });
        }

        let key = MemoKey {
            symbol: self.grammar.resolve(id)?,
            start: self.cursor.index(),
        };
        match self.memo.get(&key) {
            Some(Memo::Seed) => {
                self.unsettled.push(key);
                return Ok(None);
            }
            Some(Memo::Resolved { value, end }) => {
                let (value, end) = (value.clone(), *end);
                if self.growing.contains(&key) {
                    self.unsettled.push(key);
                }
                self.cursor.seek(end);
                return Ok(value);
            }
            None if self.growing.contains(&key) => {
                return Err(ParseError::internal(format!(
                    "growing rule {} at offset {} has no memo record",
                    self.grammar.describe(key.symbol),
                    key.start
                )));
            }
            None => {}
        }

        let grammar = self.grammar;
        let width = self.config.excerpt_width;
        self.tracer
            .start(depth, || grammar.describe(id), self.cursor.behind(width));

        self.stack.push(id);
        let result = with_stack(|| self.grow(id, key));
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

    /// Evaluates `key` until its match stops getting longer.
    fn grow(&mut self, id: SymbolId, key: MemoKey) -> MatchResult {
        let mut best = Memo::Seed;
        let mut provisional = false;
        self.memo.insert(key, Memo::Seed);

        loop {
            self.cursor.seek(key.start);
            let mark = self.unsettled.len();
            let value = apply(self, id)?;
            let end = self.cursor.index();

            let involved = self.unsettled.split_off(mark);
            let recursed = involved.contains(&key);
            let outer: Vec<MemoKey> = involved.into_iter().filter(|k| *k != key).collect();
            provisional |= !outer.is_empty();
            self.unsettled.extend(outer);

            let attempt = Memo::Resolved { value, end };

            if !recursed && !self.growing.contains(&key) {
                self.settle(key, &attempt, provisional);
                return Ok(Self::into_value(attempt));
            }

            self.growing.insert(key);
            if attempt.progress() <= best.progress() {
                self.growing.remove(&key);
                if let Memo::Resolved { end, .. } = &best {
                    self.cursor.seek(*end);
                }
                self.settle(key, &best, provisional);
                return Ok(Self::into_value(best));
            }
            self.memo.insert(key, attempt.clone());
            best = attempt;
        }
    }

    fn settle(&mut self, key: MemoKey, record: &Memo, provisional: bool) {
        if provisional {
            self.memo.remove(&key);
        } else {
            self.memo.insert(key, record.clone());
        }
    }

    fn into_value(record: Memo) -> Option<Value> {
        match record {
            Memo::Resolved { value, .. } => value,
            Memo::Seed => None,
        }
    }

    fn clear_state(&mut self) {
        self.memo.clear();
        self.stack.clear();
        self.unsettled.clear();
        self.growing.clear();
    }
}

impl<'a> Engine<'a> for PackratEngine<'a> {
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
        let top_level = self.stack.is_empty();
        let result = self.parse_frame(id);
        if !top_level {
            return result;
        }

        match result {
            Err(err) => {
                self.clear_state();
                Err(err)
            }
            Ok(_) if !self.unsettled.is_empty() || !self.growing.is_empty() => {
                let message = format!(
                    "{} unsettled recursion heads after a top-level parse",
                    self.unsettled.len() + self.growing.len()
                );
                self.clear_state();
                Err(ParseError::internal(message))
            }
            ok => ok,
        }
    }

    fn reset(&mut self) {
        self.cursor.reset();
        self.clear_state();
    }
}
