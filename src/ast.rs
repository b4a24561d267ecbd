//! The abstract syntax tree consumed by the evaluator (spec §3).
//!
//! The parser that produces this tree is an external collaborator (spec
//! §1); this module only defines the read-only shape the evaluator walks.
//! Nodes live in a flat arena and are addressed by [`NodeId`] — a stable
//! integer assigned at parse time — rather than by pointer, per Design
//! Note §9 ("Scope & iterator variables keyed by node identity").

use std::fmt;

/// Stable identity of an AST node, used as the key for scope/iterator
/// bindings so that re-entering a loop node is recognised across ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// The tag carried by every node (spec §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Statement,
    If,
    ElseIf,
    Else,
    EndIf,
    While,
    EndWhile,
    For,
    Foreach,
    EndFor,
    Break,
    Continue,
    Stop,
    Replay,
    Quiet,
    Force,
    Not,
    Command,
    Operand,
    And,
    Or,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    UnaryExpression,
    BinaryExpression,
    LogicalExpression,
    Integer,
    Serial,
    String,
    Double,
}

impl NodeKind {
    /// `true` for the four constructs that open a scope (spec §3, §4.4).
    pub fn opens_scope(self) -> bool {
        matches!(self, Self::If | Self::While | Self::For | Self::Foreach)
    }

    /// The terminator that matches this opener, if any.
    pub fn matching_terminator(self) -> Option<NodeKind> {
        match self {
            Self::If => Some(Self::EndIf),
            Self::While => Some(Self::EndWhile),
            Self::For | Self::Foreach => Some(Self::EndFor),
            _ => None,
        }
    }
}

/// A single, immutable AST node.
#[derive(Clone, Debug)]
pub struct AstNode {
    pub kind: NodeKind,
    pub lexeme: Option<String>,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
}

/// The parsed program: a flat arena of [`AstNode`]s plus the id of the
/// root `STATEMENT` node the evaluator starts from.
#[derive(Clone, Debug, Default)]
pub struct Ast {
    nodes: Vec<AstNode>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn node(&self, id: NodeId) -> &AstNode {
        &self.nodes[id.0 as usize]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn lexeme(&self, id: NodeId) -> Option<&str> {
        self.node(id).lexeme.as_deref()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Children of `id`, left to right.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut cur = self.first_child(id);
        std::iter::from_fn(move || {
            let n = cur?;
            cur = self.next_sibling(n);
            Some(n)
        })
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Builds an [`Ast`] programmatically. The real parser is out of scope
/// (spec §1); this builder exists so the evaluator, dispatcher and tests
/// in this crate can construct fixture trees without depending on one.
#[derive(Default)]
pub struct AstBuilder {
    nodes: Vec<AstNode>,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: NodeKind, lexeme: Option<String>, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(AstNode {
            kind,
            lexeme,
            parent,
            first_child: None,
            next_sibling: None,
            prev_sibling: None,
        });
        if let Some(parent) = parent {
            self.link_child(parent, id);
        }
        id
    }

    fn link_child(&mut self, parent: NodeId, child: NodeId) {
        let last_child = {
            let mut cur = self.nodes[parent.0 as usize].first_child;
            let mut last = None;
            while let Some(n) = cur {
                last = Some(n);
                cur = self.nodes[n.0 as usize].next_sibling;
            }
            last
        };
        match last_child {
            Some(last) => {
                self.nodes[last.0 as usize].next_sibling = Some(child);
                self.nodes[child.0 as usize].prev_sibling = Some(last);
            }
            None => {
                self.nodes[parent.0 as usize].first_child = Some(child);
            }
        }
    }

    /// Appends a bare statement-level node with no lexeme (e.g. `ENDIF`).
    pub fn node(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        self.push(kind, None, Some(parent))
    }

    /// Appends a statement-level node carrying a lexeme (e.g. `FOR` with its
    /// iteration count, or an `OPERAND`).
    pub fn leaf(&mut self, parent: NodeId, kind: NodeKind, lexeme: impl Into<String>) -> NodeId {
        self.push(kind, Some(lexeme.into()), Some(parent))
    }

    /// Appends a `COMMAND` node plus its `OPERAND` argument children.
    pub fn command(&mut self, parent: NodeId, keyword: &str, args: &[&str]) -> NodeId {
        let cmd = self.push(NodeKind::Command, Some(keyword.to_string()), Some(parent));
        for arg in args {
            self.leaf(cmd, NodeKind::Operand, *arg);
        }
        cmd
    }

    /// Starts a fresh tree, returning the root `STATEMENT` node id.
    pub fn root(&mut self) -> NodeId {
        self.push(NodeKind::Statement, None, None)
    }

    pub fn build(self) -> Ast {
        let root = if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId(0))
        };
        Ast {
            nodes: self.nodes,
            root,
        }
    }
}
