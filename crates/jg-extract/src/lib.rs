//! jg-extract - join-graph extraction engine for Joingraph
//!
//! Given parsed SQL, this crate resolves every alias and every CTE
//! transitively down to the physical base tables they denote and emits a
//! normalized edge list describing which base tables are joined, by what
//! join type, and under what column-equality condition. Two extraction
//! policies are provided: exhaustive (expand every usage site) and
//! conservative (never double-count join-bearing CTEs).

pub mod alias_map;
pub mod ast;
pub mod condition;
pub mod conservative;
pub mod edge;
pub mod error;
pub mod exhaustive;
pub mod extract;
pub mod lower;
pub mod report;
pub mod resolver;
pub mod source_map;

pub use ast::{JoinType, NodeId, QueryTree, SqlAst};
pub use edge::{dedup_edges, JoinEdge};
pub use error::ExtractError;
pub use extract::{extract_from_sql, ExtractOptions, Extraction, ExtractionPolicy};
pub use report::{render_report, ReportHeader};
pub use resolver::CteResolver;
pub use source_map::SourceMap;
