//! Per-unit extraction pipeline
//!
//! One input unit is one SQL source text (a file may contain several
//! top-level statements). Everything — source map, resolution cache,
//! processed-scope set — is built fresh per unit; nothing persists across
//! units except the caller's accumulated edge list.

use crate::conservative::extract_conservative;
use crate::edge::JoinEdge;
use crate::error::{ExtractError, ExtractResult};
use crate::exhaustive::extract_exhaustive;
use crate::lower::lower_statements;
use crate::resolver::CteResolver;
use crate::source_map::{CollectMode, SourceMap};
use jg_sql::{count_joins_by_pattern, patch_cte_only_sql, strip_placeholders, SqlError, SqlParser};

/// Which extraction policy to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionPolicy {
    /// Expand every CTE usage site down to base tables
    Exhaustive,
    /// Skip joins touching join-bearing CTEs so derived relations are
    /// never double-counted
    #[default]
    Conservative,
}

/// Explicit configuration threaded through the pipeline
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Dialect name passed to the parser (`generic`, `duckdb`, `snowflake`)
    pub dialect: String,
    pub policy: ExtractionPolicy,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            dialect: "generic".to_string(),
            policy: ExtractionPolicy::default(),
        }
    }
}

/// Result of extracting one input unit
#[derive(Debug)]
pub struct Extraction {
    /// Emitted edges, in traversal order (not yet deduplicated)
    pub edges: Vec<JoinEdge>,
    /// Join clauses processed structurally
    pub processed_joins: usize,
    /// Joins found by the textual pattern scan; a coverage diagnostic
    /// only, never used to drive extraction
    pub pattern_joins: usize,
}

/// Run the full pipeline over one SQL text.
///
/// Placeholders are stripped before parsing. If parsing fails, the text
/// is re-tried once with a synthetic `SELECT * FROM <last CTE>` appended
/// (for scripts that consist only of CTE definitions); if that also
/// fails, the original parse error is returned wrapped with
/// `source_name`.
pub fn extract_from_sql(
    sql: &str,
    source_name: &str,
    options: &ExtractOptions,
) -> ExtractResult<Extraction> {
    let parser = match SqlParser::from_dialect_name(&options.dialect) {
        Ok(parser) => parser,
        Err(SqlError::UnknownDialect(name)) => return Err(ExtractError::Dialect { name }),
        Err(err) => {
            return Err(ExtractError::Parse {
                source_name: source_name.to_string(),
                source: err,
            })
        }
    };

    let cleaned = strip_placeholders(sql);
    let pattern_joins = count_joins_by_pattern(&cleaned);

    let statements = match parser.parse(&cleaned) {
        Ok(statements) => statements,
        Err(err) => {
            let patched = patch_cte_only_sql(&cleaned).and_then(|p| parser.parse(&p).ok());
            match patched {
                Some(statements) => {
                    log::info!("{source_name}: patched CTE-only script with a synthetic SELECT");
                    statements
                }
                None => {
                    return Err(ExtractError::Parse {
                        source_name: source_name.to_string(),
                        source: err,
                    })
                }
            }
        }
    };

    let tree = lower_statements(&statements);
    let (edges, processed_joins) = match options.policy {
        ExtractionPolicy::Exhaustive => {
            let sources = SourceMap::build(&tree, CollectMode::Deep);
            let mut resolver = CteResolver::new(sources);
            let result = extract_exhaustive(&tree, &mut resolver);
            log::debug!(
                "{source_name}: resolved {} scopes in {} steps",
                tree.selects.len(),
                resolver.steps()
            );
            result
        }
        ExtractionPolicy::Conservative => {
            let sources = SourceMap::build(&tree, CollectMode::Shallow);
            let mut resolver = CteResolver::new(sources);
            let result = extract_conservative(&tree, &mut resolver);
            log::debug!(
                "{source_name}: resolved {} scopes in {} steps",
                tree.selects.len(),
                resolver.steps()
            );
            result
        }
    };

    Ok(Extraction {
        edges,
        processed_joins,
        pattern_joins,
    })
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
