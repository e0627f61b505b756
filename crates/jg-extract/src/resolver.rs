//! Transitive CTE resolution with cycle breaking
//!
//! Resolution is a DFS over the name-keyed source map. The visited set is
//! per call chain and cloned into each recursive call, never shared back,
//! so two sibling branches exploring the same name are not falsely treated
//! as cyclic. Results are cached by normalized name after the first full
//! resolution.

use crate::source_map::SourceMap;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Resolves relation names to the physical base tables they denote
#[derive(Debug)]
pub struct CteResolver {
    sources: SourceMap,
    cache: HashMap<String, BTreeSet<String>>,
    simple_cache: HashMap<String, BTreeSet<String>>,
    steps: usize,
}

impl CteResolver {
    pub fn new(sources: SourceMap) -> Self {
        Self {
            sources,
            cache: HashMap::new(),
            simple_cache: HashMap::new(),
            steps: 0,
        }
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    /// Total resolution steps taken. Cycle breaking keeps this bounded by
    /// the number of distinct names per call chain.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Expand a relation name to its base tables.
    ///
    /// A name absent from the source map is a physical table and resolves
    /// to itself. A cyclic reference resolves to the name itself, not an
    /// error.
    pub fn resolve(&mut self, name: &str) -> BTreeSet<String> {
        self.resolve_with(name, &HashSet::new())
    }

    fn resolve_with(&mut self, name: &str, visited: &HashSet<String>) -> BTreeSet<String> {
        self.steps += 1;
        let normalized = name.to_lowercase();
        if let Some(hit) = self.cache.get(&normalized) {
            return hit.clone();
        }
        if visited.contains(&normalized) {
            log::info!("cyclic relation reference at '{name}', resolving to itself");
            let result = BTreeSet::from([name.to_string()]);
            self.cache.insert(normalized, result.clone());
            return result;
        }

        let resolved = match self.sources.direct(&normalized) {
            Some(direct) => {
                let direct: Vec<String> = direct.iter().cloned().collect();
                let mut branch = visited.clone();
                branch.insert(normalized.clone());
                let mut result = BTreeSet::new();
                for source in direct {
                    result.extend(self.resolve_with(&source, &branch));
                }
                result
            }
            None => BTreeSet::from([name.to_string()]),
        };
        self.cache.insert(normalized, resolved.clone());
        resolved
    }

    /// Conservative expansion: only simple CTE chains are followed.
    ///
    /// A join-bearing CTE resolves to the empty set (its own SELECT is
    /// responsible for reporting its internal edges), and a cycle also
    /// resolves to the empty set.
    pub fn resolve_simple(&mut self, name: &str) -> BTreeSet<String> {
        self.resolve_simple_with(name, &HashSet::new())
    }

    fn resolve_simple_with(&mut self, name: &str, visited: &HashSet<String>) -> BTreeSet<String> {
        self.steps += 1;
        let normalized = name.to_lowercase();
        if let Some(hit) = self.simple_cache.get(&normalized) {
            return hit.clone();
        }
        if visited.contains(&normalized) {
            log::info!("cyclic relation reference at '{name}', skipping expansion");
            self.simple_cache.insert(normalized, BTreeSet::new());
            return BTreeSet::new();
        }

        let resolved = match self.sources.direct(&normalized) {
            Some(_) if self.sources.is_join_bearing(&normalized) => BTreeSet::new(),
            Some(direct) => {
                let direct: Vec<String> = direct.iter().cloned().collect();
                let mut branch = visited.clone();
                branch.insert(normalized.clone());
                let mut result = BTreeSet::new();
                for source in direct {
                    result.extend(self.resolve_simple_with(&source, &branch));
                }
                result
            }
            None => BTreeSet::from([name.to_string()]),
        };
        self.simple_cache.insert(normalized, resolved.clone());
        resolved
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
