use super::*;
use jg_sql::SqlParser;

fn lower(sql: &str) -> QueryTree {
    let parser = SqlParser::generic();
    let statements = parser.parse(sql).unwrap();
    lower_statements(&statements)
}

#[test]
fn test_ctes_and_selects_in_document_order() {
    let tree = lower(
        "WITH a AS (SELECT * FROM t1), b AS (SELECT * FROM t2) \
         SELECT * FROM a JOIN b ON a.x = b.x",
    );
    assert_eq!(tree.ctes.len(), 2);
    assert_eq!(tree.selects.len(), 3);

    let first = tree.ast.as_cte(tree.ctes[0]).unwrap();
    let second = tree.ast.as_cte(tree.ctes[1]).unwrap();
    assert_eq!(first.name, "a");
    assert_eq!(second.name, "b");
    // CTE bodies precede the statement body
    assert_eq!(first.body, Some(tree.selects[0]));
    assert_eq!(second.body, Some(tree.selects[1]));
}

#[test]
fn test_join_types_mapped() {
    let tree = lower(
        "SELECT * FROM a \
         JOIN b ON a.x = b.x \
         LEFT JOIN c ON a.x = c.x \
         RIGHT OUTER JOIN d ON a.x = d.x \
         FULL OUTER JOIN e ON a.x = e.x",
    );
    let select = tree.ast.as_select(tree.selects[0]).unwrap();
    let types: Vec<JoinType> = select
        .joins
        .iter()
        .map(|&id| tree.ast.as_join(id).unwrap().join_type)
        .collect();
    assert_eq!(
        types,
        vec![JoinType::Inner, JoinType::Left, JoinType::Right, JoinType::Full]
    );
}

#[test]
fn test_table_aliases_captured() {
    let tree = lower("SELECT * FROM orders o JOIN customers AS c ON o.cid = c.id");
    let select = tree.ast.as_select(tree.selects[0]).unwrap();

    let from = tree.ast.as_table(select.from.unwrap()).unwrap();
    assert_eq!(from.name, "orders");
    assert_eq!(from.alias.as_deref(), Some("o"));

    let join = tree.ast.as_join(select.joins[0]).unwrap();
    let target = tree.ast.as_table(join.target).unwrap();
    assert_eq!(target.name, "customers");
    assert_eq!(target.alias.as_deref(), Some("c"));
}

#[test]
fn test_schema_qualified_name_keeps_tail() {
    let tree = lower("SELECT * FROM raw.orders o JOIN x ON o.a = x.a");
    let select = tree.ast.as_select(tree.selects[0]).unwrap();
    let from = tree.ast.as_table(select.from.unwrap()).unwrap();
    assert_eq!(from.name, "orders");
}

#[test]
fn test_using_constraint_has_no_on_expression() {
    let tree = lower("SELECT * FROM a JOIN b USING(id)");
    let select = tree.ast.as_select(tree.selects[0]).unwrap();
    let join = tree.ast.as_join(select.joins[0]).unwrap();
    assert!(join.on.is_none());
}

#[test]
fn test_cross_join_degrades_to_inner() {
    let tree = lower("SELECT * FROM a CROSS JOIN b");
    let select = tree.ast.as_select(tree.selects[0]).unwrap();
    let join = tree.ast.as_join(select.joins[0]).unwrap();
    assert_eq!(join.join_type, JoinType::Inner);
    assert!(join.on.is_none());
}

#[test]
fn test_comma_separated_from_items_become_inner_joins() {
    let tree = lower("SELECT * FROM a, b WHERE a.id = b.id");
    let select = tree.ast.as_select(tree.selects[0]).unwrap();
    assert_eq!(select.joins.len(), 1);
    let join = tree.ast.as_join(select.joins[0]).unwrap();
    assert_eq!(join.join_type, JoinType::Inner);
    assert!(join.on.is_none());
}

#[test]
fn test_subquery_target_lowered_with_alias() {
    let tree = lower("SELECT * FROM (SELECT * FROM t1) sub JOIN t2 ON sub.id = t2.id");
    // outer scope precedes its nested subquery
    assert_eq!(tree.selects.len(), 2);
    let outer = tree.ast.as_select(tree.selects[0]).unwrap();
    let sub = tree.ast.as_subquery(outer.from.unwrap()).unwrap();
    assert_eq!(sub.alias.as_deref(), Some("sub"));
    assert_eq!(sub.body, Some(tree.selects[1]));
}

#[test]
fn test_union_arms_are_collected() {
    let tree = lower("SELECT * FROM a UNION ALL SELECT * FROM b");
    assert_eq!(tree.selects.len(), 2);
}

#[test]
fn test_where_subquery_is_collected() {
    let tree = lower("SELECT * FROM t1 WHERE EXISTS (SELECT 1 FROM t2 WHERE t2.id = t1.id)");
    assert_eq!(tree.selects.len(), 2);
}

#[test]
fn test_on_condition_lowered_structurally() {
    let tree = lower("SELECT * FROM t1 JOIN t2 ON t1.a = t2.a AND t1.b = t2.b");
    let select = tree.ast.as_select(tree.selects[0]).unwrap();
    let join = tree.ast.as_join(select.joins[0]).unwrap();
    let on = join.on.unwrap();
    assert_eq!(tree.ast.render_expr(on), "t1.a = t2.a AND t1.b = t2.b");
}

#[test]
fn test_function_call_in_on_becomes_opaque_with_columns() {
    let tree = lower("SELECT * FROM a JOIN b ON UPPER(a.x) = UPPER(b.x)");
    let select = tree.ast.as_select(tree.selects[0]).unwrap();
    let join = tree.ast.as_join(select.joins[0]).unwrap();

    let mut columns = Vec::new();
    tree.ast.collect_columns(join.on.unwrap(), &mut columns);
    let names: Vec<String> = columns
        .iter()
        .map(|&id| tree.ast.render_expr(id))
        .collect();
    assert_eq!(names, vec!["a.x", "b.x"]);
}

#[test]
fn test_create_table_as_select_is_lowered() {
    let tree = lower("CREATE TABLE summary AS SELECT * FROM t1 JOIN t2 ON t1.id = t2.id");
    assert_eq!(tree.selects.len(), 1);
    let select = tree.ast.as_select(tree.selects[0]).unwrap();
    assert_eq!(select.joins.len(), 1);
}
