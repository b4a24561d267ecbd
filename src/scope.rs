//! Scope stack for the evaluator (spec §3, §4.4).
//!
//! `IF`, `WHILE`, `FOR` and `FOREACH` push a scope on first entry; their
//! matching terminators pop it. Iterator state (the `FOR` counter, the
//! `FOREACH` index) lives in the scope keyed by the opening node's
//! [`NodeId`], which is how the evaluator tells a fresh loop entry from a
//! re-entry on the next tick (Design Note §9).

use std::collections::HashMap;

use crate::argument::Argument;
use crate::ast::NodeId;

/// A single entry on the scope stack.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    /// Identity of the `IF`/`WHILE`/`FOR`/`FOREACH` node that opened this
    /// scope. `None` only for the implicit root scope.
    pub start_node: Option<NodeId>,
    pub bindings: HashMap<String, Argument>,
    /// `FOR`'s iteration counter.
    pub for_counter: i64,
    /// `FOREACH`'s iteration index into its list.
    pub foreach_index: usize,
}

impl Scope {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn for_node(start_node: NodeId) -> Self {
        Self {
            start_node: Some(start_node),
            ..Self::default()
        }
    }
}

/// Stack of [`Scope`]s rooted at the script start.
#[derive(Clone, Debug)]
pub struct ScopeStack {
    stack: Vec<Scope>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self {
            stack: vec![Scope::root()],
        }
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Depth of currently entered control constructs (root excluded).
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    pub fn push(&mut self, scope: Scope) {
        self.stack.push(scope);
    }

    /// Pops the innermost scope. Never pops the root scope.
    pub fn pop(&mut self) -> Option<Scope> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    pub fn current(&self) -> &Scope {
        self.stack.last().expect("root scope is never popped")
    }

    pub fn current_mut(&mut self) -> &mut Scope {
        self.stack.last_mut().expect("root scope is never popped")
    }

    /// `true` when the innermost scope was opened by `node` — i.e. this is
    /// a re-entry into an already-running loop rather than a first visit.
    pub fn is_reentry(&self, node: NodeId) -> bool {
        self.current().start_node == Some(node)
    }

    pub fn bind(&mut self, name: &str, value: Argument) {
        self.current_mut().bindings.insert(name.to_lowercase(), value);
    }

    /// Walks from the innermost scope outward looking for `name`.
    pub fn lookup(&self, name: &str) -> Option<&Argument> {
        let name = name.to_lowercase();
        self.stack
            .iter()
            .rev()
            .find_map(|scope| scope.bindings.get(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::Argument;

    #[test]
    fn push_pop_restores_depth() {
        let mut stack = ScopeStack::new();
        assert_eq!(stack.depth(), 0);
        stack.push(Scope::for_node(NodeId(1)));
        assert_eq!(stack.depth(), 1);
        stack.pop();
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn inner_binding_shadows_outer() {
        let mut stack = ScopeStack::new();
        stack.bind("v", Argument::literal("outer"));
        stack.push(Scope::for_node(NodeId(1)));
        stack.bind("v", Argument::literal("inner"));
        assert_eq!(stack.lookup("v").unwrap().lexeme, "inner");
        stack.pop();
        assert_eq!(stack.lookup("v").unwrap().lexeme, "outer");
    }

    #[test]
    fn reentry_detection_by_node_identity() {
        let mut stack = ScopeStack::new();
        stack.push(Scope::for_node(NodeId(5)));
        assert!(stack.is_reentry(NodeId(5)));
        assert!(!stack.is_reentry(NodeId(6)));
    }
}
