//! Closed node model for query structure
//!
//! The engine never walks the upstream parser's AST directly. Lowering
//! (see `lower`) produces this closed set of node kinds, held in an arena
//! where every node gets a stable monotonic id at construction time. All
//! "already processed" sets and caches key on `NodeId`, never on
//! structural equality, so two identical subtrees are never conflated.

use serde::Serialize;
use std::fmt;

/// Stable identity of one node in a [`SqlAst`] arena.
///
/// Assigned once, in allocation order; ids are only meaningful within the
/// arena that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Join type of a single join clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    /// Uppercase rendering used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
            JoinType::Full => "FULL",
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One SELECT scope: its FROM target and join clauses
#[derive(Debug, Clone, Default)]
pub struct SelectNode {
    /// FROM target (a Table or Subquery node), if any
    pub from: Option<NodeId>,
    /// Join clauses in source order
    pub joins: Vec<NodeId>,
}

/// A named common table expression and its defining SELECT
#[derive(Debug, Clone)]
pub struct CteNode {
    /// Name as written; resolution normalizes to lowercase
    pub name: String,
    /// Defining SELECT when the body is a plain SELECT; `None` for
    /// set-operation bodies (their inner SELECTs are still collected)
    pub body: Option<NodeId>,
}

/// A table reference in a FROM or JOIN target
#[derive(Debug, Clone)]
pub struct TableNode {
    /// Unqualified table name (last path component)
    pub name: String,
    /// Alias as written, if any
    pub alias: Option<String>,
}

/// A derived table (subquery) in a FROM or JOIN target
#[derive(Debug, Clone)]
pub struct SubqueryNode {
    /// Inner SELECT when the subquery body is a plain SELECT
    pub body: Option<NodeId>,
    /// Alias as written; an unaliased subquery is not addressable
    pub alias: Option<String>,
}

/// One join clause: target relation, type, and ON expression
#[derive(Debug, Clone)]
pub struct JoinNode {
    /// Joined relation (a Table or Subquery node)
    pub target: NodeId,
    pub join_type: JoinType,
    /// Lowered ON expression; `None` for USING/NATURAL/constraint-free joins
    pub on: Option<NodeId>,
}

/// A column reference inside a join condition
#[derive(Debug, Clone)]
pub struct ColumnNode {
    /// Table qualifier as written (`t` in `t.id`), if any
    pub qualifier: Option<String>,
    /// Column name
    pub name: String,
}

/// Equality predicate between two operand expressions
#[derive(Debug, Clone)]
pub struct EqualityNode {
    pub left: NodeId,
    pub right: NodeId,
}

/// AND of two predicate expressions
#[derive(Debug, Clone)]
pub struct ConjunctionNode {
    pub left: NodeId,
    pub right: NodeId,
}

/// Parenthesized expression; unwraps transparently during flattening
#[derive(Debug, Clone)]
pub struct ParenthesizedNode {
    pub inner: NodeId,
}

/// Any expression outside the closed kind set, kept as one atomic predicate.
///
/// Carries the upstream rendering plus the column references found inside
/// it, so the fallback branch can still infer candidate tables from
/// columns buried in function calls or disjunctions.
#[derive(Debug, Clone)]
pub struct OpaqueNode {
    /// Rendered source text of the expression
    pub text: String,
    /// Column nodes discovered anywhere beneath the expression
    pub columns: Vec<NodeId>,
}

/// Closed tagged union over the node kinds the engine understands
#[derive(Debug, Clone)]
pub enum SqlNode {
    Select(SelectNode),
    Cte(CteNode),
    Table(TableNode),
    Subquery(SubqueryNode),
    Join(JoinNode),
    Column(ColumnNode),
    Equality(EqualityNode),
    Conjunction(ConjunctionNode),
    Parenthesized(ParenthesizedNode),
    Opaque(OpaqueNode),
}

/// Arena of [`SqlNode`]s with identity-assigning allocation
#[derive(Debug, Default)]
pub struct SqlAst {
    nodes: Vec<SqlNode>,
}

impl SqlAst {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node, assigning the next monotonic id
    pub fn push(&mut self, node: SqlNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Replace the node stored at `id`. Used by lowering to allocate a
    /// scope's id before its children so ids follow document order.
    pub(crate) fn replace(&mut self, id: NodeId, node: SqlNode) {
        self.nodes[id.index()] = node;
    }

    pub fn node(&self, id: NodeId) -> &SqlNode {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn as_select(&self, id: NodeId) -> Option<&SelectNode> {
        match self.node(id) {
            SqlNode::Select(select) => Some(select),
            _ => None,
        }
    }

    pub fn as_cte(&self, id: NodeId) -> Option<&CteNode> {
        match self.node(id) {
            SqlNode::Cte(cte) => Some(cte),
            _ => None,
        }
    }

    pub fn as_table(&self, id: NodeId) -> Option<&TableNode> {
        match self.node(id) {
            SqlNode::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_subquery(&self, id: NodeId) -> Option<&SubqueryNode> {
        match self.node(id) {
            SqlNode::Subquery(subquery) => Some(subquery),
            _ => None,
        }
    }

    pub fn as_join(&self, id: NodeId) -> Option<&JoinNode> {
        match self.node(id) {
            SqlNode::Join(join) => Some(join),
            _ => None,
        }
    }

    pub fn as_column(&self, id: NodeId) -> Option<&ColumnNode> {
        match self.node(id) {
            SqlNode::Column(column) => Some(column),
            _ => None,
        }
    }

    /// Render a condition expression back to text from its structure
    pub fn render_expr(&self, id: NodeId) -> String {
        match self.node(id) {
            SqlNode::Column(col) => match &col.qualifier {
                Some(q) => format!("{}.{}", q, col.name),
                None => col.name.clone(),
            },
            SqlNode::Equality(eq) => format!(
                "{} = {}",
                self.render_expr(eq.left),
                self.render_expr(eq.right)
            ),
            SqlNode::Conjunction(and) => format!(
                "{} AND {}",
                self.render_expr(and.left),
                self.render_expr(and.right)
            ),
            SqlNode::Parenthesized(paren) => format!("({})", self.render_expr(paren.inner)),
            SqlNode::Opaque(opaque) => opaque.text.clone(),
            SqlNode::Table(table) => table.name.clone(),
            _ => String::new(),
        }
    }

    /// Collect every Column node reachable inside an expression subtree,
    /// including columns recorded on Opaque leaves.
    pub fn collect_columns(&self, id: NodeId, out: &mut Vec<NodeId>) {
        match self.node(id) {
            SqlNode::Column(_) => out.push(id),
            SqlNode::Equality(eq) => {
                self.collect_columns(eq.left, out);
                self.collect_columns(eq.right, out);
            }
            SqlNode::Conjunction(and) => {
                self.collect_columns(and.left, out);
                self.collect_columns(and.right, out);
            }
            SqlNode::Parenthesized(paren) => self.collect_columns(paren.inner, out),
            SqlNode::Opaque(opaque) => out.extend(opaque.columns.iter().copied()),
            _ => {}
        }
    }
}

/// One lowered statement collection: the arena plus every SELECT and CTE
/// in document order. Traversal order is the only source of output
/// ordering, so both lists are stable across runs.
#[derive(Debug, Default)]
pub struct QueryTree {
    pub ast: SqlAst,
    /// Every SELECT scope, in document order (WITH bodies precede the
    /// statement body; an outer SELECT precedes its nested subqueries)
    pub selects: Vec<NodeId>,
    /// Every CTE definition, in declaration order
    pub ctes: Vec<NodeId>,
}

#[cfg(test)]
#[path = "ast_test.rs"]
mod tests;
