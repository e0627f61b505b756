//! Exhaustive join-edge extraction
//!
//! Every SELECT scope is visited exactly once (tracked by node identity)
//! and every usage site of a CTE is expanded down to base tables, so a
//! CTE joined in three places contributes edges three times. Equalities
//! that resolve to the same table pair merge into one edge with an
//! AND-joined condition.

use crate::alias_map::AliasMap;
use crate::ast::{ColumnNode, NodeId, QueryTree, SqlNode};
use crate::condition::{column_equality, flatten_condition};
use crate::edge::JoinEdge;
use crate::resolver::CteResolver;
use crate::source_map::{tables_from_select, CollectMode};
use std::collections::{BTreeSet, HashSet};

/// Placeholder emitted when a fallback edge has no candidate table on one
/// side; its presence in a report flags a condition the engine could not
/// decompose.
pub const UNKNOWN_TABLE: &str = "<unknown>";

/// Walk every SELECT once and emit edges for each join clause.
///
/// Returns the edges in traversal order plus the number of join clauses
/// processed.
pub fn extract_exhaustive(tree: &QueryTree, resolver: &mut CteResolver) -> (Vec<JoinEdge>, usize) {
    let mut processed: HashSet<NodeId> = HashSet::new();
    let mut edges = Vec::new();
    let mut join_count = 0;

    for &select_id in &tree.selects {
        if !processed.insert(select_id) {
            continue;
        }
        let aliases = AliasMap::build(tree, select_id, resolver);
        collect_joins(tree, select_id, &aliases, resolver, &mut edges, &mut join_count);
    }

    (edges, join_count)
}

fn collect_joins(
    tree: &QueryTree,
    select_id: NodeId,
    aliases: &AliasMap,
    resolver: &mut CteResolver,
    edges: &mut Vec<JoinEdge>,
    join_count: &mut usize,
) {
    let Some(select) = tree.ast.as_select(select_id) else {
        return;
    };
    for &join_id in &select.joins {
        let Some(join) = tree.ast.as_join(join_id) else {
            continue;
        };
        *join_count += 1;

        // Group per resolved table pair, in first-encounter order.
        let mut pairs: Vec<((String, String), Vec<String>)> = Vec::new();
        for predicate in flatten_condition(&tree.ast, join.on) {
            if let Some((left_id, right_id)) = column_equality(&tree.ast, predicate) {
                let (left, right) = match (tree.ast.as_column(left_id), tree.ast.as_column(right_id))
                {
                    (Some(left), Some(right)) => (left, right),
                    _ => continue,
                };
                add_condition(&mut pairs, aliases, left, right);
            }
        }

        if !pairs.is_empty() {
            for ((table1, table2), conditions) in pairs {
                edges.push(JoinEdge {
                    table1,
                    table2,
                    join_type: join.join_type,
                    condition: conditions.join(" AND "),
                });
            }
        } else {
            // No extractable equality: fall back to the literal ON text
            // and best-effort candidate tables, padding empty sides with
            // the sentinel so a row is still emitted for visibility.
            let condition = join
                .on
                .map(|id| tree.ast.render_expr(id))
                .unwrap_or_default();
            let mut right_tables = tables_from_join_target(tree, join.target, resolver);
            let mut left_tables = infer_left_tables(tree, join.on, aliases);
            if left_tables.is_empty() {
                left_tables.insert(UNKNOWN_TABLE.to_string());
            }
            if right_tables.is_empty() {
                right_tables.insert(UNKNOWN_TABLE.to_string());
            }
            for left in &left_tables {
                for right in &right_tables {
                    edges.push(JoinEdge::new(left, right, join.join_type, &condition));
                }
            }
        }
    }
}

/// Expand one column equality into per-table-pair condition strings.
///
/// Each column's qualifier resolves through the alias map; a qualifier
/// with no entry falls back to itself, and an unqualified column falls
/// back to its own name.
fn add_condition(
    pairs: &mut Vec<((String, String), Vec<String>)>,
    aliases: &AliasMap,
    left: &ColumnNode,
    right: &ColumnNode,
) {
    let left_tables = candidate_tables(aliases, left);
    let right_tables = candidate_tables(aliases, right);
    for lt in &left_tables {
        for rt in &right_tables {
            let rendered = format!("{}.{} = {}.{}", lt, left.name, rt, right.name);
            let key = (lt.clone(), rt.clone());
            match pairs.iter_mut().find(|(pair, _)| *pair == key) {
                Some((_, conditions)) => conditions.push(rendered),
                None => pairs.push((key, vec![rendered])),
            }
        }
    }
}

fn candidate_tables(aliases: &AliasMap, column: &ColumnNode) -> BTreeSet<String> {
    match &column.qualifier {
        Some(qualifier) => match aliases.get(qualifier) {
            Some(tables) => tables.clone(),
            None => BTreeSet::from([qualifier.clone()]),
        },
        None => BTreeSet::from([column.name.clone()]),
    }
}

/// Base tables behind a join target, for the fallback branch
fn tables_from_join_target(
    tree: &QueryTree,
    target: NodeId,
    resolver: &mut CteResolver,
) -> BTreeSet<String> {
    match tree.ast.node(target) {
        SqlNode::Table(table) => resolver.resolve(&table.name),
        SqlNode::Subquery(subquery) => {
            let inner = match subquery.body {
                Some(body) => tables_from_select(tree, body, CollectMode::Deep),
                None => BTreeSet::new(),
            };
            let mut expanded = BTreeSet::new();
            for name in inner {
                expanded.extend(resolver.resolve(&name));
            }
            expanded
        }
        _ => BTreeSet::new(),
    }
}

/// Left-side candidates for the fallback branch: every alias mentioned
/// anywhere in the ON expression that is visible in the current scope.
fn infer_left_tables(
    tree: &QueryTree,
    on: Option<NodeId>,
    aliases: &AliasMap,
) -> BTreeSet<String> {
    let mut tables = BTreeSet::new();
    let Some(on_id) = on else {
        return tables;
    };
    let mut columns = Vec::new();
    tree.ast.collect_columns(on_id, &mut columns);
    for column_id in columns {
        let Some(column) = tree.ast.as_column(column_id) else {
            continue;
        };
        if let Some(qualifier) = &column.qualifier {
            if let Some(resolved) = aliases.get(qualifier) {
                tables.extend(resolved.iter().cloned());
            }
        }
    }
    tables
}

#[cfg(test)]
#[path = "exhaustive_test.rs"]
mod tests;
