//! CTE source map: the direct (non-transitive) relation names each CTE reads

use crate::ast::{NodeId, QueryTree, SqlNode};
use std::collections::{BTreeSet, HashMap};

/// How subquery targets contribute to a CTE's direct source set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectMode {
    /// Descend into subquery targets and record their inner relation
    /// names (exhaustive policy)
    Deep,
    /// Record named targets only; a subquery target contributes nothing
    /// at this level (conservative policy)
    Shallow,
}

/// Per-statement-collection map from CTE name to its direct sources.
///
/// Keys are lower-cased. Duplicate CTE definitions overwrite earlier
/// entries (last writer wins). A CTE whose direct source set is empty is
/// not recorded, so its name resolves to itself downstream.
#[derive(Debug, Default)]
pub struct SourceMap {
    sources: HashMap<String, BTreeSet<String>>,
    join_bearing: HashMap<String, bool>,
}

impl SourceMap {
    /// Scan every CTE definition in the tree and record its direct sources
    pub fn build(tree: &QueryTree, mode: CollectMode) -> Self {
        let mut map = SourceMap::default();
        for &cte_id in &tree.ctes {
            let Some(cte) = tree.ast.as_cte(cte_id) else {
                continue;
            };
            let name = cte.name.to_lowercase();
            if name.is_empty() {
                continue;
            }
            let has_joins = cte
                .body
                .and_then(|body| tree.ast.as_select(body))
                .is_some_and(|select| !select.joins.is_empty());
            map.join_bearing.insert(name.clone(), has_joins);

            let sources = match cte.body {
                Some(body) => tables_from_select(tree, body, mode),
                None => BTreeSet::new(),
            };
            if !sources.is_empty() {
                map.sources.insert(name, sources);
            }
        }
        map
    }

    /// Record an entry directly, bypassing the skip-empty rule of
    /// [`SourceMap::build`]. A present-but-empty source set resolves to
    /// the empty set, the documented degenerate case.
    pub(crate) fn insert_entry(
        &mut self,
        name: &str,
        sources: BTreeSet<String>,
        join_bearing: bool,
    ) {
        let normalized = name.to_lowercase();
        self.join_bearing.insert(normalized.clone(), join_bearing);
        self.sources.insert(normalized, sources);
    }

    /// Direct source set for a lower-cased name, if the name is a CTE
    /// with recorded sources
    pub fn direct(&self, normalized: &str) -> Option<&BTreeSet<String>> {
        self.sources.get(normalized)
    }

    /// Whether the name was declared as a CTE anywhere in the statement
    /// collection (regardless of recorded sources)
    pub fn is_cte(&self, name: &str) -> bool {
        self.join_bearing.contains_key(&name.to_lowercase())
    }

    /// Whether the name is a CTE whose defining SELECT has at least one
    /// join clause
    pub fn is_join_bearing(&self, name: &str) -> bool {
        self.join_bearing
            .get(&name.to_lowercase())
            .copied()
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.join_bearing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.join_bearing.is_empty()
    }
}

/// Relation names appearing in a SELECT's FROM target and every JOIN target
pub fn tables_from_select(tree: &QueryTree, select_id: NodeId, mode: CollectMode) -> BTreeSet<String> {
    let mut sources = BTreeSet::new();
    let Some(select) = tree.ast.as_select(select_id) else {
        return sources;
    };
    if let Some(from) = select.from {
        sources.extend(tables_from_relation(tree, from, mode));
    }
    for &join_id in &select.joins {
        if let Some(join) = tree.ast.as_join(join_id) {
            sources.extend(tables_from_relation(tree, join.target, mode));
        }
    }
    sources
}

fn tables_from_relation(tree: &QueryTree, relation: NodeId, mode: CollectMode) -> BTreeSet<String> {
    match tree.ast.node(relation) {
        SqlNode::Table(table) => BTreeSet::from([table.name.clone()]),
        SqlNode::Subquery(subquery) => match (mode, subquery.body) {
            (CollectMode::Deep, Some(body)) => tables_from_select(tree, body, mode),
            _ => BTreeSet::new(),
        },
        _ => BTreeSet::new(),
    }
}

#[cfg(test)]
#[path = "source_map_test.rs"]
mod tests;
