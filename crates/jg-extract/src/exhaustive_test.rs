use super::*;
use crate::ast::JoinType;
use crate::lower::lower_statements;
use crate::source_map::SourceMap;
use jg_sql::SqlParser;

fn extract(sql: &str) -> (Vec<JoinEdge>, usize) {
    let parser = SqlParser::generic();
    let statements = parser.parse(sql).unwrap();
    let tree = lower_statements(&statements);
    let sources = SourceMap::build(&tree, CollectMode::Deep);
    let mut resolver = CteResolver::new(sources);
    extract_exhaustive(&tree, &mut resolver)
}

#[test]
fn test_direct_join_between_tables() {
    let (edges, joins) = extract("SELECT * FROM t1 JOIN t2 ON t1.id = t2.id");
    assert_eq!(joins, 1);
    assert_eq!(
        edges,
        vec![JoinEdge::new("t1", "t2", JoinType::Inner, "t1.id = t2.id")]
    );
}

#[test]
fn test_anded_equalities_merge_into_one_edge() {
    let (edges, _) = extract("SELECT * FROM t1 JOIN t2 ON t1.a = t2.a AND t1.b = t2.b");
    assert_eq!(
        edges,
        vec![JoinEdge::new(
            "t1",
            "t2",
            JoinType::Inner,
            "t1.a = t2.a AND t1.b = t2.b"
        )]
    );
}

#[test]
fn test_join_bearing_cte_expands_at_every_usage_site() {
    let (edges, joins) = extract(
        "WITH x AS (SELECT * FROM t1 JOIN t2 ON t1.id = t2.id) \
         SELECT * FROM x JOIN t3 ON x.id = t3.id",
    );
    assert_eq!(joins, 2);
    assert_eq!(
        edges,
        vec![
            JoinEdge::new("t1", "t2", JoinType::Inner, "t1.id = t2.id"),
            JoinEdge::new("t1", "t3", JoinType::Inner, "t1.id = t3.id"),
            JoinEdge::new("t2", "t3", JoinType::Inner, "t2.id = t3.id"),
        ]
    );
}

#[test]
fn test_each_scope_is_processed_exactly_once() {
    let parser = SqlParser::generic();
    let statements = parser
        .parse("SELECT * FROM t1 JOIN t2 ON t1.a = t2.a")
        .unwrap();
    let mut tree = lower_statements(&statements);
    // simulate the same scope being reachable via a second traversal path
    tree.selects.push(tree.selects[0]);

    let sources = SourceMap::build(&tree, CollectMode::Deep);
    let mut resolver = CteResolver::new(sources);
    let (edges, joins) = extract_exhaustive(&tree, &mut resolver);
    assert_eq!(edges.len(), 1);
    assert_eq!(joins, 1);
}

#[test]
fn test_alias_resolution_in_conditions() {
    let (edges, _) = extract(
        "WITH stage AS (SELECT * FROM raw_orders) \
         SELECT * FROM stage s JOIN customers c ON s.cust_id = c.id",
    );
    assert_eq!(
        edges,
        vec![JoinEdge::new(
            "raw_orders",
            "customers",
            JoinType::Inner,
            "raw_orders.cust_id = customers.id"
        )]
    );
}

#[test]
fn test_left_join_type_preserved() {
    let (edges, _) = extract("SELECT * FROM a LEFT JOIN b ON a.x = b.x");
    assert_eq!(edges[0].join_type, JoinType::Left);
}

#[test]
fn test_aliased_subquery_expansion() {
    let (edges, _) = extract(
        "SELECT * FROM (SELECT * FROM raw1 JOIN raw2 ON raw1.k = raw2.k) s \
         JOIN t3 ON s.id = t3.id",
    );
    assert_eq!(edges.len(), 3);
    // the outer scope is visited first, expanding s to both inner tables
    assert_eq!(
        edges[0],
        JoinEdge::new("raw1", "t3", JoinType::Inner, "raw1.id = t3.id")
    );
    assert_eq!(
        edges[1],
        JoinEdge::new("raw2", "t3", JoinType::Inner, "raw2.id = t3.id")
    );
    assert_eq!(
        edges[2],
        JoinEdge::new("raw1", "raw2", JoinType::Inner, "raw1.k = raw2.k")
    );
}

#[test]
fn test_fallback_keeps_literal_condition_and_infers_tables() {
    let (edges, _) = extract("SELECT * FROM t1 JOIN t2 ON UPPER(t1.x) = UPPER(t2.x)");
    // both aliases appear in the ON text, so both are left candidates
    assert_eq!(
        edges,
        vec![
            JoinEdge::new("t1", "t2", JoinType::Inner, "UPPER(t1.x) = UPPER(t2.x)"),
            JoinEdge::new("t2", "t2", JoinType::Inner, "UPPER(t1.x) = UPPER(t2.x)"),
        ]
    );
}

#[test]
fn test_fallback_emits_sentinel_for_empty_sides() {
    let (edges, _) = extract("SELECT * FROM t1 JOIN t2 ON 1 = 1");
    assert_eq!(
        edges,
        vec![JoinEdge::new(
            UNKNOWN_TABLE,
            "t2",
            JoinType::Inner,
            "1 = 1"
        )]
    );
}

#[test]
fn test_constraint_free_join_emits_sentinel_row() {
    let (edges, _) = extract("SELECT * FROM t1 CROSS JOIN t2");
    assert_eq!(
        edges,
        vec![JoinEdge::new(UNKNOWN_TABLE, "t2", JoinType::Inner, "")]
    );
}
