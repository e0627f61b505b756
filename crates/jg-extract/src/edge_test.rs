use super::*;
use crate::ast::JoinType;

fn edge(t1: &str, t2: &str, condition: &str) -> JoinEdge {
    JoinEdge::new(t1, t2, JoinType::Inner, condition)
}

#[test]
fn test_dedup_removes_identical_edges() {
    let edges = vec![
        edge("t1", "t2", "t1.id = t2.id"),
        edge("t2", "t3", "t2.id = t3.id"),
        edge("t1", "t2", "t1.id = t2.id"),
    ];
    let (unique, removed) = dedup_edges(edges);
    assert_eq!(removed, 1);
    assert_eq!(
        unique,
        vec![
            edge("t1", "t2", "t1.id = t2.id"),
            edge("t2", "t3", "t2.id = t3.id"),
        ]
    );
}

#[test]
fn test_dedup_keys_on_the_full_tuple() {
    let edges = vec![
        edge("t1", "t2", "t1.id = t2.id"),
        JoinEdge::new("t1", "t2", JoinType::Left, "t1.id = t2.id"),
        edge("t1", "t2", "t1.other = t2.other"),
    ];
    let (unique, removed) = dedup_edges(edges);
    assert_eq!(removed, 0);
    assert_eq!(unique.len(), 3);
}

#[test]
fn test_dedup_preserves_first_occurrence_order() {
    let edges = vec![
        edge("b", "c", "b.x = c.x"),
        edge("a", "b", "a.x = b.x"),
        edge("b", "c", "b.x = c.x"),
        edge("a", "b", "a.x = b.x"),
    ];
    let (unique, removed) = dedup_edges(edges);
    assert_eq!(removed, 2);
    assert_eq!(unique[0].table1, "b");
    assert_eq!(unique[1].table1, "a");
}

#[test]
fn test_dedup_of_empty_input() {
    let (unique, removed) = dedup_edges(Vec::new());
    assert!(unique.is_empty());
    assert_eq!(removed, 0);
}

#[test]
fn test_edge_serializes_with_uppercase_join_type() {
    let value = serde_json::to_value(edge("t1", "t2", "t1.id = t2.id")).unwrap();
    assert_eq!(value["table1"], "t1");
    assert_eq!(value["join_type"], "INNER");
}
