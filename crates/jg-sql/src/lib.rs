//! jg-sql - SQL parse boundary for Joingraph
//!
//! This crate wraps sqlparser-rs behind a dialect trait and owns the
//! text-level work that happens around parsing: placeholder stripping,
//! patching of CTE-only scripts, and the regex join counter used for
//! coverage diagnostics.

pub mod dialect;
pub mod error;
pub mod parser;
pub mod preprocess;

pub use dialect::{DuckDbDialect, GenericDialect, SnowflakeDialect, SqlDialect};
pub use error::SqlError;
pub use parser::SqlParser;
pub use preprocess::{count_joins_by_pattern, patch_cte_only_sql, strip_placeholders};
