//! Text-level preprocessing applied before SQL parsing

use regex::Regex;
use std::sync::OnceLock;

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
static JOIN_RE: OnceLock<Regex> = OnceLock::new();
static CTE_HEAD_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{([^}]+)\}").expect("valid regex"))
}

fn join_re() -> &'static Regex {
    JOIN_RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:INNER\s+)?JOIN\b|\bLEFT\s+(?:OUTER\s+)?JOIN\b|\bRIGHT\s+(?:OUTER\s+)?JOIN\b|\bFULL\s+(?:OUTER\s+)?JOIN\b",
        )
        .expect("valid regex")
    })
}

fn cte_head_re() -> &'static Regex {
    CTE_HEAD_RE.get_or_init(|| Regex::new(r"(?i)\b([A-Z0-9_]+)\s+AS\s*\(").expect("valid regex"))
}

/// Rewrite `{identifier}` placeholder tokens to bare `identifier` so the
/// parser accepts templated scripts.
pub fn strip_placeholders(sql: &str) -> String {
    placeholder_re().replace_all(sql, "$1").into_owned()
}

/// Count JOIN keywords in raw SQL text, case-insensitively.
///
/// Matches `JOIN`, `INNER JOIN`, and the LEFT/RIGHT/FULL variants with an
/// optional `OUTER`. The count is a coverage diagnostic only and never
/// drives extraction.
pub fn count_joins_by_pattern(sql: &str) -> usize {
    join_re().find_iter(sql).count()
}

/// Last CTE name found by a textual scan of `<name> AS (` patterns.
pub fn last_cte_name(sql: &str) -> Option<String> {
    cte_head_re()
        .captures_iter(sql)
        .last()
        .map(|caps| caps[1].to_string())
}

/// Patch a script that consists only of CTE definitions by appending a
/// `SELECT * FROM <last CTE>` so the parser sees a complete statement.
///
/// Best effort: returns `None` when no CTE head is found, and the patched
/// text is not guaranteed to parse for every dialect shape.
pub fn patch_cte_only_sql(sql: &str) -> Option<String> {
    let last_cte = last_cte_name(sql)?;
    Some(format!("{sql}\nSELECT * FROM {last_cte}"))
}

#[cfg(test)]
#[path = "preprocess_test.rs"]
mod tests;
