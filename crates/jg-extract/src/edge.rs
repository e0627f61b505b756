//! Join edge records and deduplication

use crate::ast::JoinType;
use serde::Serialize;
use std::collections::HashSet;

/// One resolved relationship between two base tables
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct JoinEdge {
    /// Left base table
    pub table1: String,
    /// Right base table
    pub table2: String,
    pub join_type: JoinType,
    /// Human-readable column-equality condition, qualified with resolved
    /// table names
    pub condition: String,
}

impl JoinEdge {
    pub fn new(table1: &str, table2: &str, join_type: JoinType, condition: &str) -> Self {
        Self {
            table1: table1.to_string(),
            table2: table2.to_string(),
            join_type,
            condition: condition.to_string(),
        }
    }
}

/// Collapse identical edges, preserving first-occurrence order.
///
/// Two edges are identical when the full (table1, table2, join_type,
/// condition) tuple matches. Returns the surviving edges and the number
/// of removed duplicates.
pub fn dedup_edges(edges: Vec<JoinEdge>) -> (Vec<JoinEdge>, usize) {
    let total = edges.len();
    let mut seen: HashSet<JoinEdge> = HashSet::new();
    let mut unique = Vec::new();
    for edge in edges {
        if seen.insert(edge.clone()) {
            unique.push(edge);
        }
    }
    let removed = total - unique.len();
    (unique, removed)
}

#[cfg(test)]
#[path = "edge_test.rs"]
mod tests;
