//! Join-condition decomposition into atomic predicates

use crate::ast::{NodeId, SqlAst, SqlNode};

/// Flatten a (possibly nested, parenthesized, AND-joined) condition into
/// atomic predicates, left to right.
///
/// Parentheses unwrap transparently and conjunctions concatenate their
/// flattened operands. Any other expression — including a disjunction —
/// is a single atomic predicate.
pub fn flatten_condition(ast: &SqlAst, expr: Option<NodeId>) -> Vec<NodeId> {
    let mut predicates = Vec::new();
    if let Some(id) = expr {
        flatten_into(ast, id, &mut predicates);
    }
    predicates
}

fn flatten_into(ast: &SqlAst, id: NodeId, out: &mut Vec<NodeId>) {
    match ast.node(id) {
        SqlNode::Parenthesized(paren) => flatten_into(ast, paren.inner, out),
        SqlNode::Conjunction(and) => {
            flatten_into(ast, and.left, out);
            flatten_into(ast, and.right, out);
        }
        _ => out.push(id),
    }
}

/// If the predicate is an equality between two column references, return
/// the column node pair.
pub fn column_equality(ast: &SqlAst, predicate: NodeId) -> Option<(NodeId, NodeId)> {
    let SqlNode::Equality(eq) = ast.node(predicate) else {
        return None;
    };
    ast.as_column(eq.left)?;
    ast.as_column(eq.right)?;
    Some((eq.left, eq.right))
}

/// First equality between two column references found by a left-to-right
/// scan of the flattened predicate list. Additional AND-ed equalities are
/// ignored by the conservative policy.
pub fn first_column_equality(ast: &SqlAst, expr: Option<NodeId>) -> Option<(NodeId, NodeId)> {
    flatten_condition(ast, expr)
        .into_iter()
        .find_map(|predicate| column_equality(ast, predicate))
}

#[cfg(test)]
#[path = "condition_test.rs"]
mod tests;
