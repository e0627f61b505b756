//! Extract command implementation

use anyhow::{Context, Result};
use jg_extract::{
    dedup_edges, extract_from_sql, render_report, ExtractOptions, JoinEdge, ReportHeader,
};
use std::fs;

use crate::cli::{ExtractArgs, GlobalArgs, OutputFormat, PolicyArg};

/// Execute the extract command
pub fn execute(args: &ExtractArgs, global: &GlobalArgs) -> Result<()> {
    let options = ExtractOptions {
        dialect: global.dialect.clone(),
        policy: args.policy.into(),
    };

    let mut rows: Vec<JoinEdge> = Vec::new();
    let mut pattern_total = 0;
    let mut processed_total = 0;
    let mut failed_units = 0;

    for path in &args.paths {
        if !path.exists() {
            log::warn!("input file {} not found, skipping", path.display());
            continue;
        }
        let sql = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if global.verbose {
            eprintln!("[verbose] extracting {}", path.display());
        }
        match extract_from_sql(&sql, &path.display().to_string(), &options) {
            Ok(extraction) => {
                pattern_total += extraction.pattern_joins;
                processed_total += extraction.processed_joins;
                rows.extend(extraction.edges);
            }
            Err(err) => {
                // an unparseable unit is reported and skipped; the rest
                // of the batch still runs
                log::error!("{err}");
                failed_units += 1;
            }
        }
    }

    let (rows, duplicates) = match args.policy {
        PolicyArg::Conservative => dedup_edges(rows),
        PolicyArg::Exhaustive => (rows, 0),
    };

    match args.format {
        OutputFormat::Csv => {
            let header = if args.legacy_header {
                ReportHeader::Legacy
            } else {
                ReportHeader::Standard
            };
            let report = render_report(&rows, header);
            fs::write(&args.output, report)
                .with_context(|| format!("Failed to write {}", args.output.display()))?;
            println!("Done. Report written to {}", args.output.display());
            print_summary(
                pattern_total,
                processed_total,
                rows.len(),
                duplicates,
                failed_units,
            );
        }
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&rows).context("Failed to serialize to JSON")?;
            println!("{json}");
        }
        OutputFormat::Pretty => {
            for edge in &rows {
                println!(
                    "{} -> {} [{}] {}",
                    edge.table1, edge.table2, edge.join_type, edge.condition
                );
            }
        }
    }

    Ok(())
}

/// Coverage statistics printed after the CSV report. The pattern count is
/// informational only and never drives extraction.
fn print_summary(
    pattern_total: usize,
    processed_total: usize,
    emitted: usize,
    duplicates: usize,
    failed_units: usize,
) {
    println!();
    println!("{}", "=".repeat(60));
    println!("Join extraction summary");
    println!("{}", "=".repeat(60));
    println!("Joins found by pattern scan:  {pattern_total}");
    println!("Joins processed structurally: {processed_total}");
    if pattern_total > 0 {
        let coverage = processed_total as f64 / pattern_total as f64 * 100.0;
        println!("Coverage: {coverage:.2}%");
    }
    println!("Edges in report: {emitted}");
    if duplicates > 0 {
        println!("Duplicate rows removed: {duplicates}");
    }
    if failed_units > 0 {
        println!("Units skipped on parse failure: {failed_units}");
    }
    println!("{}", "=".repeat(60));
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
