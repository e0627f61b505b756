//! Error types for jg-extract

use jg_sql::SqlError;
use thiserror::Error;

/// Extraction errors
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Input unit failed to parse even after the CTE-only patch (X001)
    #[error("[X001] failed to parse SQL in {source_name}: {source}")]
    Parse {
        source_name: String,
        #[source]
        source: SqlError,
    },

    /// Unknown dialect requested in the options (X002)
    #[error("[X002] unknown SQL dialect: {name}")]
    Dialect { name: String },
}

/// Result type alias for ExtractError
pub type ExtractResult<T> = Result<T, ExtractError>;
