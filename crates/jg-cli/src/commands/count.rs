//! Count command implementation

use anyhow::{Context, Result};
use jg_sql::count_joins_by_pattern;
use std::fs;

use crate::cli::CountArgs;

/// Execute the count command: a raw keyword scan with no parsing, useful
/// as a quick coverage check against the extract report.
pub fn execute(args: &CountArgs) -> Result<()> {
    let mut total = 0;
    for path in &args.paths {
        if !path.exists() {
            log::warn!("input file {} not found, skipping", path.display());
            continue;
        }
        let sql = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let count = count_joins_by_pattern(&sql);
        total += count;
        println!("{}: {}", path.display(), count);
    }
    if args.paths.len() > 1 {
        println!("total: {total}");
    }
    Ok(())
}
