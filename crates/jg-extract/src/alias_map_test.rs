use super::*;
use crate::lower::lower_statements;
use crate::source_map::SourceMap;
use jg_sql::SqlParser;

fn lower(sql: &str) -> QueryTree {
    let parser = SqlParser::generic();
    let statements = parser.parse(sql).unwrap();
    lower_statements(&statements)
}

fn map_for(tree: &QueryTree, select: NodeId) -> AliasMap {
    let sources = SourceMap::build(tree, CollectMode::Deep);
    let mut resolver = CteResolver::new(sources);
    AliasMap::build(tree, select, &mut resolver)
}

fn names(map: &AliasMap, alias: &str) -> Vec<String> {
    map.get(alias)
        .map(|tables| tables.iter().cloned().collect())
        .unwrap_or_default()
}

#[test]
fn test_table_registered_under_name_and_alias() {
    let tree = lower("SELECT * FROM orders o JOIN customers c ON o.cid = c.id");
    let map = map_for(&tree, tree.selects[0]);
    assert_eq!(names(&map, "orders"), vec!["orders"]);
    assert_eq!(names(&map, "o"), vec!["orders"]);
    assert_eq!(names(&map, "c"), vec!["customers"]);
    // lookups are case-insensitive
    assert_eq!(names(&map, "C"), vec!["customers"]);
}

#[test]
fn test_cte_reference_resolves_to_base_tables() {
    let tree = lower(
        "WITH stage AS (SELECT * FROM raw_t) \
         SELECT * FROM stage s JOIN t2 ON s.id = t2.id",
    );
    // outer statement body is the last collected scope
    let outer = *tree.selects.last().unwrap();
    let map = map_for(&tree, outer);
    assert_eq!(names(&map, "s"), vec!["raw_t"]);
    assert_eq!(names(&map, "stage"), vec!["raw_t"]);
}

#[test]
fn test_aliased_subquery_binds_expanded_inner_tables() {
    let tree = lower(
        "SELECT * FROM (SELECT * FROM t1 JOIN t2 ON t1.a = t2.a) sub \
         JOIN t3 ON sub.x = t3.x",
    );
    let map = map_for(&tree, tree.selects[0]);
    assert_eq!(names(&map, "sub"), vec!["t1", "t2"]);
}

#[test]
fn test_unaliased_subquery_contributes_nothing() {
    let tree = lower("SELECT * FROM (SELECT * FROM t1)");
    let map = map_for(&tree, tree.selects[0]);
    assert!(map.is_empty());
}

#[test]
fn test_sibling_scopes_are_independent() {
    // the alias x means a different relation in each inner scope
    let tree = lower(
        "SELECT * FROM \
           (SELECT * FROM t1 x JOIN t2 ON x.a = t2.a) q1 \
         JOIN \
           (SELECT * FROM t3 x JOIN t4 ON x.b = t4.b) q2 \
         ON q1.a = q2.b",
    );
    assert_eq!(tree.selects.len(), 3);
    let first_inner = map_for(&tree, tree.selects[1]);
    let second_inner = map_for(&tree, tree.selects[2]);
    assert_eq!(names(&first_inner, "x"), vec!["t1"]);
    assert_eq!(names(&second_inner, "x"), vec!["t3"]);
}

#[test]
fn test_named_aliases_records_explicit_aliases_only() {
    let tree = lower("SELECT * FROM orders o JOIN customers ON o.cid = customers.id");
    let aliases = named_aliases(&tree, tree.selects[0]);
    assert_eq!(aliases.get("o").map(String::as_str), Some("orders"));
    assert!(!aliases.contains_key("customers"));
    assert_eq!(aliases.len(), 1);
}
