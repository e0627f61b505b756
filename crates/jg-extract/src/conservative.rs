//! Conservative join-edge extraction
//!
//! Avoids double-counting derived relations: a join-bearing CTE reports
//! its internal edges from its own SELECT, so any outer join touching
//! that CTE is skipped rather than expanded again at every usage site.
//! Within a retained join only the first column equality is used, and
//! self-edges are dropped.

use crate::alias_map::named_aliases;
use crate::ast::{NodeId, QueryTree, SqlNode};
use crate::condition::first_column_equality;
use crate::edge::JoinEdge;
use crate::resolver::CteResolver;
use std::collections::{BTreeSet, HashSet};

/// Walk every SELECT once and emit edges for joins between base tables
/// and simple (non-join-bearing) CTE chains.
///
/// Returns the edges in traversal order plus the number of join clauses
/// processed. Deduplication happens at the batch level, not here.
pub fn extract_conservative(tree: &QueryTree, resolver: &mut CteResolver) -> (Vec<JoinEdge>, usize) {
    let mut processed: HashSet<NodeId> = HashSet::new();
    let mut edges = Vec::new();
    let mut join_count = 0;

    for &select_id in &tree.selects {
        if !processed.insert(select_id) {
            continue;
        }
        // A scope that merely projects from a simple CTE adds nothing.
        if is_pass_through(tree, select_id, resolver) {
            continue;
        }
        process_select(tree, select_id, resolver, &mut edges, &mut join_count);
    }

    (edges, join_count)
}

/// Name of a relation node when it is a plain table reference
fn relation_name(tree: &QueryTree, relation: NodeId) -> Option<&str> {
    match tree.ast.node(relation) {
        SqlNode::Table(table) => Some(&table.name),
        _ => None,
    }
}

/// A pass-through scope selects from a single non-join-bearing CTE and
/// has no joins of its own.
fn is_pass_through(tree: &QueryTree, select_id: NodeId, resolver: &CteResolver) -> bool {
    let Some(select) = tree.ast.as_select(select_id) else {
        return false;
    };
    if !select.joins.is_empty() {
        return false;
    }
    let Some(from) = select.from else {
        return false;
    };
    let Some(name) = relation_name(tree, from) else {
        return false;
    };
    resolver.sources().is_cte(name) && !resolver.sources().is_join_bearing(name)
}

fn process_select(
    tree: &QueryTree,
    select_id: NodeId,
    resolver: &mut CteResolver,
    edges: &mut Vec<JoinEdge>,
    join_count: &mut usize,
) {
    let Some(select) = tree.ast.as_select(select_id) else {
        return;
    };
    if select.joins.is_empty() {
        return;
    }

    let main_table = select
        .from
        .and_then(|from| relation_name(tree, from))
        .map(str::to_string);
    let aliases = named_aliases(tree, select_id);

    for &join_id in &select.joins {
        let Some(join) = tree.ast.as_join(join_id) else {
            continue;
        };
        *join_count += 1;

        let join_table = relation_name(tree, join.target).map(str::to_string);

        // Either side naming a join-bearing CTE means this join would
        // re-count edges that CTE already reports; skip it entirely.
        let bearing = |name: &Option<String>| {
            name.as_deref()
                .is_some_and(|n| resolver.sources().is_join_bearing(n))
        };
        if bearing(&main_table) || bearing(&join_table) {
            continue;
        }

        let left_tables = match &main_table {
            Some(name) => resolver.resolve_simple(name),
            None => BTreeSet::new(),
        };
        let right_tables = match &join_table {
            Some(name) => resolver.resolve_simple(name),
            None => BTreeSet::new(),
        };
        if left_tables.is_empty() || right_tables.is_empty() {
            continue;
        }

        let Some((left_id, right_id)) = first_column_equality(&tree.ast, join.on) else {
            continue;
        };
        let (Some(left_col), Some(right_col)) =
            (tree.ast.as_column(left_id), tree.ast.as_column(right_id))
        else {
            continue;
        };

        // Map each column's qualifier back to a named target, falling
        // back to the FROM/JOIN tables themselves.
        let left_from_alias = left_col
            .qualifier
            .as_deref()
            .and_then(|q| aliases.get(&q.to_lowercase()))
            .cloned()
            .or_else(|| main_table.clone());
        let right_from_alias = right_col
            .qualifier
            .as_deref()
            .and_then(|q| aliases.get(&q.to_lowercase()))
            .cloned()
            .or_else(|| join_table.clone());

        let left_resolved = match left_from_alias {
            Some(name) => resolver.resolve_simple(&name),
            None => left_tables.clone(),
        };
        let right_resolved = match right_from_alias {
            Some(name) => resolver.resolve_simple(&name),
            None => right_tables.clone(),
        };
        if left_resolved.is_empty() || right_resolved.is_empty() {
            continue;
        }

        for lt in &left_resolved {
            for rt in &right_resolved {
                if lt == rt {
                    continue;
                }
                edges.push(JoinEdge {
                    table1: lt.clone(),
                    table2: rt.clone(),
                    join_type: join.join_type,
                    condition: format!("{}.{} = {}.{}", lt, left_col.name, rt, right_col.name),
                });
            }
        }
    }
}

#[cfg(test)]
#[path = "conservative_test.rs"]
mod tests;
