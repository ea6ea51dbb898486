//! The grammar: a symbol arena plus the rule table.
//!
//! ## Lifecycle
//! A `Grammar` is built once, then borrowed immutably by any number of
//! engines. Nothing in it changes while a parse runs; engines keep their own
//! memo tables and cursors.
//!
//! ## Rules and actions
//! `define` stores a rule body and `rule(name)` expressions lower to
//! `Reference` nodes that are resolved at match time, so rules may refer to
//! rules that are not defined yet, including themselves. Semantic actions are
//! registered explicitly by rule name with [`Grammar::action`] and become the
//! transform of the rule's body.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::engine::{Engine, EngineKind, MatchResult, PackratEngine, SimpleEngine};
use crate::errors::{GrammarError, ParseError};
use crate::expr::Expr;
use crate::symbol::{Failure, Pattern, Repetition, SymbolId, SymbolKind, SymbolNode, Transform};
use crate::value::Value;

#[derive(Default)]
pub struct Grammar {
    nodes: Vec<SymbolNode>,
    /// Rule bodies in first-definition order.
    rules: Vec<(String, SymbolId)>,
    slots: HashMap<String, usize>,
    references: HashMap<String, SymbolId>,
    actions: HashMap<String, Transform>,
    redefined: Vec<String>,
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("nodes", &self.nodes.len())
            .field("rules", &self.rules)
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers actions by rule name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::rc::Rc;
    /// use rdparse::{pattern, EngineKind, Grammar, Transform, Value};
    /// let double: Transform = Rc::new(|v: Value| {
    ///     let n: f64 = v.as_text().and_then(|t| t.parse().ok()).unwrap_or(0.0);
    ///     Value::Number(n * 2.0)
    /// });
    /// let mut g = Grammar::new().with_actions([("Num", double)]);
    /// g.define("Num", pattern("[0-9]+")).unwrap();
    /// let value = g.parse("Num", "21", EngineKind::Packrat).unwrap();
    /// assert_eq!(value, Some(Value::Number(42.0)));
    /// ```
    pub fn with_actions<S, I>(mut self, actions: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Transform)>,
    {
        for (name, transform) in actions {
            self.install_action(name.into(), transform);
        }
        self
    }

    // ========================================================================
    // NODE CONSTRUCTION
    // ========================================================================

    fn push(&mut self, kind: SymbolKind) -> SymbolId {
        let id = SymbolId(self.nodes.len());
        self.nodes.push(SymbolNode::new(kind));
        id
    }

    /// Lowers an expression into arena nodes and returns the root.
    pub fn add(&mut self, expr: impl Into<Expr>) -> Result<SymbolId, GrammarError> {
        self.lower(expr.into())
    }

    fn lower(&mut self, expr: Expr) -> Result<SymbolId, GrammarError> {
        let id = match expr {
            Expr::Symbol(id) => id,
            Expr::Literal(text) => self.literal(text),
            Expr::Pattern(source) => self.pattern(&source)?,
            Expr::Regex(regex) => self.pattern(regex.as_str())?,
            Expr::Empty => self.empty(),
            Expr::Sequence(items) => {
                let children = self.lower_all(items)?;
                self.seq(children)
            }
            Expr::Alternation(items) => {
                let children = self.lower_all(items)?;
                self.alt(children)
            }
            Expr::Repeat(inner, bounds) => {
                let inner = self.lower(*inner)?;
                self.repeat(inner, bounds)?
            }
            Expr::Rule(name) => self.reference(name),
            Expr::Fail(failure) => self.push(SymbolKind::Fail(failure)),
            Expr::Named(inner, name) => {
                let id = self.lower(*inner)?;
                self.set_name(id, name);
                id
            }
            Expr::Mapped(inner, transform) => {
                let id = self.lower(*inner)?;
                self.set_transform(id, transform);
                id
            }
        };
        Ok(id)
    }

    fn lower_all(&mut self, items: Vec<Expr>) -> Result<Vec<SymbolId>, GrammarError> {
        items.into_iter().map(|item| self.lower(item)).collect()
    }

    pub fn literal(&mut self, text: impl Into<String>) -> SymbolId {
        self.push(SymbolKind::Literal(text.into()))
    }

    pub fn pattern(&mut self, source: &str) -> Result<SymbolId, GrammarError> {
        let pattern = Pattern::new(source)?;
        Ok(self.push(SymbolKind::Pattern(pattern)))
    }

    pub fn empty(&mut self) -> SymbolId {
        self.push(SymbolKind::Empty)
    }

    pub fn seq(&mut self, children: impl IntoIterator<Item = SymbolId>) -> SymbolId {
        self.push(SymbolKind::Sequence(children.into_iter().collect()))
    }

    pub fn alt(&mut self, children: impl IntoIterator<Item = SymbolId>) -> SymbolId {
        self.push(SymbolKind::Alternation(children.into_iter().collect()))
    }

    pub fn repeat(
        &mut self,
        inner: SymbolId,
        bounds: impl Into<Repetition>,
    ) -> Result<SymbolId, GrammarError> {
        let bounds = bounds.into();
        bounds.check()?;
        Ok(self.push(SymbolKind::Repeat { inner, bounds }))
    }

    pub fn fail(&mut self, message: impl Into<String>) -> SymbolId {
        self.push(SymbolKind::Fail(Failure::new(message)))
    }

    /// The reference node for the rule `name`. One name always yields the
    /// same node.
    pub fn reference(&mut self, name: impl Into<String>) -> SymbolId {
        let name = name.into();
        if let Some(&id) = self.references.get(&name) {
            return id;
        }
        let id = self.push(SymbolKind::Reference(name.clone()));
        self.references.insert(name, id);
        id
    }

    pub fn set_name(&mut self, id: SymbolId, name: impl Into<String>) {
        self.nodes[id.0].name = Some(name.into());
    }

    /// Sets the transform of `id`. On a reference this installs the action
    /// of the referenced rule.
    pub fn set_transform(&mut self, id: SymbolId, transform: Transform) {
        if let SymbolKind::Reference(name) = &self.nodes[id.0].kind {
            let name = name.clone();
            self.install_action(name, transform);
        } else {
            self.nodes[id.0].transform = Some(transform);
        }
    }

    /// Builder form of [`set_transform`](Self::set_transform).
    pub fn with_transform<F>(&mut self, id: SymbolId, f: F) -> SymbolId
    where
        F: Fn(Value) -> Value + 'static,
    {
        self.set_transform(id, Rc::new(f));
        id
    }

    /// Builder form of [`set_name`](Self::set_name).
    pub fn named(&mut self, id: SymbolId, name: impl Into<String>) -> SymbolId {
        self.set_name(id, name);
        id
    }

    // ========================================================================
    // RULES
    // ========================================================================

    /// Defines (or redefines) the rule `name` and returns its body.
    ///
    /// A body that is itself a bare reference is wrapped in a one-armed
    /// alternation so the alias can carry its own action. Unnamed bodies take
    /// the rule's name for display.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        expr: impl Into<Expr>,
    ) -> Result<SymbolId, GrammarError> {
        let name = name.into();
        let mut body = self.lower(expr.into())?;
        if matches!(self.nodes[body.0].kind, SymbolKind::Reference(_)) {
            body = self.alt([body]);
        }
        if self.nodes[body.0].name.is_none() {
            self.nodes[body.0].name = Some(name.clone());
        }
        if let Some(action) = self.actions.get(&name) {
            self.nodes[body.0].transform = Some(Rc::clone(action));
        }

        match self.slots.get(&name) {
            Some(&slot) => {
                self.rules[slot].1 = body;
                self.redefined.push(name);
            }
            None => {
                self.slots.insert(name.clone(), self.rules.len());
                self.rules.push((name, body));
            }
        }
        Ok(body)
    }

    /// Registers the semantic action of the rule `name`.
    pub fn action<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(Value) -> Value + 'static,
    {
        self.install_action(name.into(), Rc::new(f));
    }

    fn install_action(&mut self, name: String, transform: Transform) {
        if let Some(body) = self.body(&name) {
            self.nodes[body.0].transform = Some(Rc::clone(&transform));
        }
        self.actions.insert(name, transform);
    }

    /// The body of the rule `name`, if defined.
    pub fn body(&self, name: &str) -> Option<SymbolId> {
        self.slots.get(name).map(|&slot| self.rules[slot].1)
    }

    /// Rules in definition order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, SymbolId)> + '_ {
        self.rules.iter().map(|(name, body)| (name.as_str(), *body))
    }

    pub(crate) fn redefined(&self) -> &[String] {
        &self.redefined
    }

    // ========================================================================
    // LOOKUP
    // ========================================================================

    /// The node behind `id`.
    ///
    /// # Panics
    /// Panics if `id` was not produced by this grammar.
    pub fn node(&self, id: SymbolId) -> &SymbolNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: SymbolId) -> Option<&SymbolNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = SymbolId> {
        (0..self.nodes.len()).map(SymbolId)
    }

    /// Follows a reference to the body it names. Other nodes resolve to
    /// themselves.
    pub fn resolve(&self, id: SymbolId) -> Result<SymbolId, ParseError> {
        match &self.node(id).kind {
            SymbolKind::Reference(name) => self
                .body(name)
                .ok_or_else(|| ParseError::UndefinedRule { name: name.clone() }),
            _ => Ok(id),
        }
    }

    // ========================================================================
    // DISPLAY
    // ========================================================================

    /// The display name of `id`, or its expression when it has none.
    pub fn describe(&self, id: SymbolId) -> String {
        match self.node(id).name() {
            Some(name) => name.to_string(),
            None => self.dump_expr(id),
        }
    }

    /// The structural expression of `id`; children show their display names.
    pub fn dump_expr(&self, id: SymbolId) -> String {
        let join = |children: &[SymbolId], sep: &str| {
            children
                .iter()
                .map(|&child| self.describe(child))
                .collect::<Vec<_>>()
                .join(sep)
        };
        match &self.node(id).kind {
            SymbolKind::Literal(text) => format!("'{}'", text.escape_debug()),
            SymbolKind::Pattern(pattern) => format!("re'{}'", pattern.as_str()),
            SymbolKind::Empty => "''".to_string(),
            SymbolKind::Sequence(children) => format!("({})", join(children, ",")),
            SymbolKind::Alternation(children) => format!("[{}]", join(children, "|")),
            SymbolKind::Repeat { inner, bounds } => format!("{}*{}", self.describe(*inner), bounds),
            SymbolKind::Reference(name) => name.clone(),
            SymbolKind::Fail(failure) => format!("Fail('{}')", failure.message().escape_debug()),
        }
    }

    /// One call-stack frame as shown in a `Fail` diagnostic.
    pub(crate) fn frame_label(&self, id: SymbolId) -> String {
        let node = self.node(id);
        match (&node.kind, node.name()) {
            (SymbolKind::Reference(name), _) => name.clone(),
            (_, Some(name)) => format!("{name}: {}", self.dump_expr(id)),
            (_, None) => self.dump_expr(id),
        }
    }

    /// The grammar listing, one `rule->expression` line per rule.
    pub fn dump(&self) -> String {
        self.rules
            .iter()
            .map(|(name, body)| format!("{name}->{}", self.dump_expr(*body)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ========================================================================
    // PARSING
    // ========================================================================

    /// Parses a prefix of `text` from the rule `entry` with a fresh engine.
    ///
    /// The longest match wins and any trailing input is left unread; callers
    /// that need the whole input consumed check the engine cursor themselves.
    pub fn parse(&self, entry: &str, text: &str, kind: EngineKind) -> MatchResult {
        let body = self.body(entry).ok_or_else(|| ParseError::UndefinedRule {
            name: entry.to_string(),
        })?;
        match kind {
            EngineKind::Simple => SimpleEngine::new(self, text).parse(body),
            EngineKind::Packrat => PackratEngine::new(self, text).parse(body),
        }
    }
}

#[cfg(test)]
mod grammar_tests {
    use super::*;
    use crate::expr::{pattern, rule};

    #[test]
    fn test_forward_reference_resolves_after_define() {
        let mut g = Grammar::new();
        let start = g.define("Start", rule("Later")).unwrap();
        let reference = match &g.node(start).kind {
            SymbolKind::Alternation(children) => children[0],
            other => panic!("expected alias wrapper, got {other:?}"),
        };
        assert!(matches!(g.resolve(reference), Err(ParseError::UndefinedRule { .. })));
        let later = g.define("Later", "x").unwrap();
        assert_eq!(g.resolve(reference).unwrap(), later);
    }

    #[test]
    fn test_references_are_shared_per_name() {
        let mut g = Grammar::new();
        let first = g.reference("Expr");
        let second = g.add(rule("Expr")).unwrap();
        assert_eq!(first, second);
        assert_ne!(first, g.reference("Term"));
    }

    #[test]
    fn test_action_installed_before_or_after_define() {
        let mut g = Grammar::new();
        g.action("A", |_| Value::Bool(true));
        let a = g.define("A", "a").unwrap();
        let b = g.define("B", "b").unwrap();
        g.action("B", |_| Value::Bool(false));
        assert!(g.node(a).has_transform());
        assert!(g.node(b).has_transform());
    }

    #[test]
    fn test_mapping_a_reference_installs_rule_action() {
        let mut g = Grammar::new();
        g.define("Num", pattern("[0-9]+")).unwrap();
        g.add(rule("Num").map(|_| Value::Nil)).unwrap();
        let body = g.body("Num").unwrap();
        assert!(g.node(body).has_transform());
    }

    #[test]
    fn test_redefinition_keeps_order_and_is_recorded() {
        let mut g = Grammar::new();
        g.define("A", "a").unwrap();
        g.define("B", "b").unwrap();
        g.define("A", "c").unwrap();
        let names: Vec<_> = g.rules().map(|(name, _)| name).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(g.redefined(), ["A".to_string()]);
        assert_eq!(g.dump(), "A->'c'\nB->'b'");
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let mut g = Grammar::new();
        let err = g.add(crate::Expr::from("a") * (3, 1)).unwrap_err();
        assert_eq!(err, GrammarError::InvalidBounds { min: 3, max: 1 });
    }

    #[test]
    fn test_named_nodes_describe_by_name() {
        let mut g = Grammar::new();
        let ends = g.add(pattern(r"\s*").named("ends")).unwrap();
        g.define("S", (ends, "x", ends)).unwrap();
        assert_eq!(g.describe(ends), "ends");
        assert_eq!(g.dump(), "S->(ends,'x',ends)");
    }
}
