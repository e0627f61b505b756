//! Scope-local alias resolution for one SELECT
//!
//! An alias map is built fresh for every SELECT scope and discarded once
//! that scope's joins have been processed. The same alias name in sibling
//! or nested scopes is unrelated.

use crate::ast::{NodeId, QueryTree, SqlNode};
use crate::resolver::CteResolver;
use crate::source_map::{tables_from_select, CollectMode};
use std::collections::{BTreeSet, HashMap};

/// Map from alias or bare table name (lower-cased) to resolved base tables
#[derive(Debug, Default)]
pub struct AliasMap {
    entries: HashMap<String, BTreeSet<String>>,
}

impl AliasMap {
    /// Build the map for one SELECT scope from its FROM target and every
    /// JOIN target.
    pub fn build(tree: &QueryTree, select_id: NodeId, resolver: &mut CteResolver) -> Self {
        let mut map = AliasMap::default();
        let Some(select) = tree.ast.as_select(select_id) else {
            return map;
        };
        if let Some(from) = select.from {
            map.register(tree, from, resolver);
        }
        for &join_id in &select.joins {
            if let Some(join) = tree.ast.as_join(join_id) {
                map.register(tree, join.target, resolver);
            }
        }
        map
    }

    fn register(&mut self, tree: &QueryTree, relation: NodeId, resolver: &mut CteResolver) {
        match tree.ast.node(relation) {
            SqlNode::Table(table) => {
                let resolved = resolver.resolve(&table.name);
                self.add(&table.name, &resolved);
                if let Some(alias) = &table.alias {
                    self.add(alias, &resolved);
                }
            }
            SqlNode::Subquery(subquery) => {
                // Only an aliased subquery is addressable from an ON
                // condition; its alias binds to the expansion of the
                // inner FROM/JOIN relation names.
                let Some(alias) = &subquery.alias else {
                    return;
                };
                let inner = match subquery.body {
                    Some(body) => tables_from_select(tree, body, CollectMode::Deep),
                    None => BTreeSet::new(),
                };
                let mut expanded = BTreeSet::new();
                for name in inner {
                    expanded.extend(resolver.resolve(&name));
                }
                self.add(alias, &expanded);
            }
            _ => {}
        }
    }

    fn add(&mut self, key: &str, tables: &BTreeSet<String>) {
        if key.is_empty() {
            return;
        }
        self.entries
            .entry(key.to_lowercase())
            .or_default()
            .extend(tables.iter().cloned());
    }

    /// Resolved base tables for an alias, if the alias is visible in this
    /// scope
    pub fn get(&self, alias: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(&alias.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Alias-to-target-name map used by the conservative policy.
///
/// Records only explicitly aliased, named targets: `orders o` maps `o` to
/// `orders`; subquery targets and unaliased tables contribute nothing.
pub fn named_aliases(tree: &QueryTree, select_id: NodeId) -> HashMap<String, String> {
    let mut aliases = HashMap::new();
    let Some(select) = tree.ast.as_select(select_id) else {
        return aliases;
    };
    let mut targets = Vec::new();
    if let Some(from) = select.from {
        targets.push(from);
    }
    for &join_id in &select.joins {
        if let Some(join) = tree.ast.as_join(join_id) {
            targets.push(join.target);
        }
    }
    for target in targets {
        if let SqlNode::Table(table) = tree.ast.node(target) {
            if let Some(alias) = &table.alias {
                aliases.insert(alias.to_lowercase(), table.name.clone());
            }
        }
    }
    aliases
}

#[cfg(test)]
#[path = "alias_map_test.rs"]
mod tests;
