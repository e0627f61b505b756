//! AST lowering — converts sqlparser statements into the closed node model
//!
//! Lowering walks each statement once and collects every SELECT scope and
//! every CTE definition in document order. Scope ids are allocated before
//! their children so node ids follow the order the scopes appear in the
//! source text.

use crate::ast::{
    ColumnNode, ConjunctionNode, CteNode, EqualityNode, JoinNode, JoinType, NodeId, OpaqueNode,
    ParenthesizedNode, QueryTree, SelectNode, SqlAst, SqlNode, SubqueryNode, TableNode,
};
use sqlparser::ast::{
    BinaryOperator, Expr, FunctionArg, FunctionArgExpr, FunctionArguments, Join, JoinConstraint,
    JoinOperator, ObjectName, Query, Select, SelectItem, SetExpr, Statement, TableFactor,
};

/// Lower a parsed statement collection into a [`QueryTree`]
pub fn lower_statements(statements: &[Statement]) -> QueryTree {
    let mut lowerer = Lowerer::default();
    for stmt in statements {
        lowerer.lower_statement(stmt);
    }
    QueryTree {
        ast: lowerer.ast,
        selects: lowerer.selects,
        ctes: lowerer.ctes,
    }
}

#[derive(Default)]
struct Lowerer {
    ast: SqlAst,
    selects: Vec<NodeId>,
    ctes: Vec<NodeId>,
}

impl Lowerer {
    fn lower_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Query(query) => {
                self.lower_query(query);
            }
            Statement::Insert(insert) => {
                if let Some(source) = &insert.source {
                    self.lower_query(source);
                }
            }
            Statement::CreateTable(create) => {
                if let Some(query) = &create.query {
                    self.lower_query(query);
                }
            }
            Statement::CreateView(create_view) => {
                self.lower_query(&create_view.query);
            }
            other => {
                log::warn!(
                    "skipping statement with no query body: {}",
                    statement_kind(other)
                );
            }
        }
    }

    /// Lower a query; returns the body's SELECT id when the body is a
    /// plain SELECT (possibly through nested parentheses).
    fn lower_query(&mut self, query: &Query) -> Option<NodeId> {
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                let body = self.lower_query(&cte.query);
                let id = self.ast.push(SqlNode::Cte(CteNode {
                    name: cte.alias.name.value.clone(),
                    body,
                }));
                self.ctes.push(id);
            }
        }
        self.lower_set_expr(&query.body)
    }

    fn lower_set_expr(&mut self, set_expr: &SetExpr) -> Option<NodeId> {
        match set_expr {
            SetExpr::Select(select) => Some(self.lower_select(select)),
            SetExpr::Query(query) => self.lower_query(query),
            SetExpr::SetOperation { left, right, .. } => {
                // Both arms contribute scopes, but a set operation has no
                // single defining SELECT.
                self.lower_set_expr(left);
                self.lower_set_expr(right);
                None
            }
            _ => None,
        }
    }

    fn lower_select(&mut self, select: &Select) -> NodeId {
        // Allocate the scope id before its children so it precedes them
        // in document order.
        let id = self.ast.push(SqlNode::Select(SelectNode::default()));
        self.selects.push(id);

        let mut from = None;
        let mut joins = Vec::new();
        if let Some(first) = select.from.first() {
            from = Some(self.lower_table_factor(&first.relation));
            for join in &first.joins {
                joins.push(self.lower_join(join));
            }
        }
        // Comma-separated FROM items surface as constraint-free inner joins.
        for item in select.from.iter().skip(1) {
            let target = self.lower_table_factor(&item.relation);
            joins.push(self.ast.push(SqlNode::Join(JoinNode {
                target,
                join_type: JoinType::Inner,
                on: None,
            })));
            for join in &item.joins {
                joins.push(self.lower_join(join));
            }
        }

        if let Some(selection) = &select.selection {
            self.scan_expr_for_queries(selection);
        }
        if let Some(having) = &select.having {
            self.scan_expr_for_queries(having);
        }
        for item in &select.projection {
            if let SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } = item {
                self.scan_expr_for_queries(expr);
            }
        }

        self.ast.replace(id, SqlNode::Select(SelectNode { from, joins }));
        id
    }

    fn lower_table_factor(&mut self, factor: &TableFactor) -> NodeId {
        match factor {
            TableFactor::Table { name, alias, .. } => self.ast.push(SqlNode::Table(TableNode {
                name: object_name_tail(name),
                alias: alias.as_ref().map(|a| a.name.value.clone()),
            })),
            TableFactor::Derived {
                subquery, alias, ..
            } => {
                let body = self.lower_query(subquery);
                self.ast.push(SqlNode::Subquery(SubqueryNode {
                    body,
                    alias: alias.as_ref().map(|a| a.name.value.clone()),
                }))
            }
            TableFactor::NestedJoin {
                table_with_joins,
                alias,
            } => {
                // Surface a synthetic scope so joins inside the
                // parenthesized group are still visited exactly once.
                let scope = self.ast.push(SqlNode::Select(SelectNode::default()));
                self.selects.push(scope);
                let from = Some(self.lower_table_factor(&table_with_joins.relation));
                let joins = table_with_joins
                    .joins
                    .iter()
                    .map(|join| self.lower_join(join))
                    .collect();
                self.ast
                    .replace(scope, SqlNode::Select(SelectNode { from, joins }));
                self.ast.push(SqlNode::Subquery(SubqueryNode {
                    body: Some(scope),
                    alias: alias.as_ref().map(|a| a.name.value.clone()),
                }))
            }
            other => {
                log::warn!("unrecognized relation in FROM/JOIN target: {other:?}");
                self.ast.push(SqlNode::Subquery(SubqueryNode {
                    body: None,
                    alias: None,
                }))
            }
        }
    }

    fn lower_join(&mut self, join: &Join) -> NodeId {
        let target = self.lower_table_factor(&join.relation);
        let (join_type, constraint) = match &join.join_operator {
            JoinOperator::Join(constraint) | JoinOperator::Inner(constraint) => {
                (JoinType::Inner, Some(constraint))
            }
            JoinOperator::Left(constraint) | JoinOperator::LeftOuter(constraint) => {
                (JoinType::Left, Some(constraint))
            }
            JoinOperator::Right(constraint) | JoinOperator::RightOuter(constraint) => {
                (JoinType::Right, Some(constraint))
            }
            JoinOperator::FullOuter(constraint) => (JoinType::Full, Some(constraint)),
            JoinOperator::CrossJoin(_) => (JoinType::Inner, None),
            other => {
                log::warn!("unrecognized join operator {other:?}, treating as INNER JOIN");
                (JoinType::Inner, None)
            }
        };
        let on = match constraint {
            Some(JoinConstraint::On(expr)) => Some(self.lower_condition(expr)),
            _ => None,
        };
        self.ast.push(SqlNode::Join(JoinNode {
            target,
            join_type,
            on,
        }))
    }

    /// Lower a join condition into the closed predicate kinds
    fn lower_condition(&mut self, expr: &Expr) -> NodeId {
        match expr {
            Expr::Nested(inner) => {
                let inner = self.lower_condition(inner);
                self.ast
                    .push(SqlNode::Parenthesized(ParenthesizedNode { inner }))
            }
            Expr::BinaryOp { left, op, right } => match op {
                BinaryOperator::And => {
                    let left = self.lower_condition(left);
                    let right = self.lower_condition(right);
                    self.ast
                        .push(SqlNode::Conjunction(ConjunctionNode { left, right }))
                }
                BinaryOperator::Eq => {
                    let left = self.lower_operand(left);
                    let right = self.lower_operand(right);
                    self.ast.push(SqlNode::Equality(EqualityNode { left, right }))
                }
                _ => self.lower_opaque(expr),
            },
            _ => self.lower_opaque(expr),
        }
    }

    /// Lower an equality operand: a column reference stays structured,
    /// anything else becomes an opaque leaf.
    fn lower_operand(&mut self, expr: &Expr) -> NodeId {
        match self.lower_column(expr) {
            Some(id) => id,
            None => self.lower_opaque(expr),
        }
    }

    fn lower_column(&mut self, expr: &Expr) -> Option<NodeId> {
        match expr {
            Expr::Identifier(ident) => Some(self.ast.push(SqlNode::Column(ColumnNode {
                qualifier: None,
                name: ident.value.clone(),
            }))),
            Expr::CompoundIdentifier(idents) if idents.len() >= 2 => {
                let name = idents
                    .last()
                    .map(|ident| ident.value.clone())
                    .unwrap_or_default();
                let qualifier = idents[..idents.len() - 1]
                    .iter()
                    .map(|ident| ident.value.clone())
                    .collect::<Vec<_>>()
                    .join(".");
                Some(self.ast.push(SqlNode::Column(ColumnNode {
                    qualifier: Some(qualifier),
                    name,
                })))
            }
            _ => None,
        }
    }

    /// Opaque leaf: keeps the rendered text plus the column references
    /// and nested queries found anywhere beneath the expression.
    fn lower_opaque(&mut self, expr: &Expr) -> NodeId {
        let mut columns = Vec::new();
        self.scan_expr(expr, &mut columns);
        self.ast.push(SqlNode::Opaque(OpaqueNode {
            text: expr.to_string(),
            columns,
        }))
    }

    /// Walk an arbitrary expression, allocating Column nodes for every
    /// column reference and lowering nested queries so their SELECT
    /// scopes are collected.
    fn scan_expr(&mut self, expr: &Expr, columns: &mut Vec<NodeId>) {
        match expr {
            Expr::Identifier(_) | Expr::CompoundIdentifier(_) => {
                if let Some(id) = self.lower_column(expr) {
                    columns.push(id);
                }
            }
            Expr::BinaryOp { left, right, .. } => {
                self.scan_expr(left, columns);
                self.scan_expr(right, columns);
            }
            Expr::UnaryOp { expr: inner, .. }
            | Expr::Nested(inner)
            | Expr::IsNull(inner)
            | Expr::IsNotNull(inner)
            | Expr::Cast { expr: inner, .. } => self.scan_expr(inner, columns),
            Expr::Between {
                expr: inner,
                low,
                high,
                ..
            } => {
                self.scan_expr(inner, columns);
                self.scan_expr(low, columns);
                self.scan_expr(high, columns);
            }
            Expr::InList {
                expr: inner, list, ..
            } => {
                self.scan_expr(inner, columns);
                for item in list {
                    self.scan_expr(item, columns);
                }
            }
            Expr::InSubquery {
                expr: inner,
                subquery,
                ..
            } => {
                self.scan_expr(inner, columns);
                self.lower_query(subquery);
            }
            Expr::Exists { subquery, .. } => {
                self.lower_query(subquery);
            }
            Expr::Subquery(query) => {
                self.lower_query(query);
            }
            Expr::Case {
                operand,
                conditions,
                else_result,
                ..
            } => {
                if let Some(op) = operand {
                    self.scan_expr(op, columns);
                }
                for case_when in conditions {
                    self.scan_expr(&case_when.condition, columns);
                    self.scan_expr(&case_when.result, columns);
                }
                if let Some(else_expr) = else_result {
                    self.scan_expr(else_expr, columns);
                }
            }
            Expr::Function(func) => self.scan_function_args(&func.args, columns),
            _ => {}
        }
    }

    fn scan_function_args(&mut self, args: &FunctionArguments, columns: &mut Vec<NodeId>) {
        match args {
            FunctionArguments::List(list) => {
                for arg in &list.args {
                    let arg_expr = match arg {
                        FunctionArg::Unnamed(e)
                        | FunctionArg::Named { arg: e, .. }
                        | FunctionArg::ExprNamed { arg: e, .. } => e,
                    };
                    if let FunctionArgExpr::Expr(expr) = arg_expr {
                        self.scan_expr(expr, columns);
                    }
                }
            }
            FunctionArguments::Subquery(query) => {
                self.lower_query(query);
            }
            FunctionArguments::None => {}
        }
    }

    /// Find nested queries in non-join expressions (WHERE, HAVING,
    /// projection) so their SELECT scopes are visited too. Column
    /// references outside join conditions are not materialized.
    fn scan_expr_for_queries(&mut self, expr: &Expr) {
        match expr {
            Expr::BinaryOp { left, right, .. } => {
                self.scan_expr_for_queries(left);
                self.scan_expr_for_queries(right);
            }
            Expr::UnaryOp { expr: inner, .. }
            | Expr::Nested(inner)
            | Expr::IsNull(inner)
            | Expr::IsNotNull(inner)
            | Expr::Cast { expr: inner, .. } => self.scan_expr_for_queries(inner),
            Expr::Between {
                expr: inner,
                low,
                high,
                ..
            } => {
                self.scan_expr_for_queries(inner);
                self.scan_expr_for_queries(low);
                self.scan_expr_for_queries(high);
            }
            Expr::InList {
                expr: inner, list, ..
            } => {
                self.scan_expr_for_queries(inner);
                for item in list {
                    self.scan_expr_for_queries(item);
                }
            }
            Expr::InSubquery { subquery, .. } | Expr::Exists { subquery, .. } => {
                self.lower_query(subquery);
            }
            Expr::Subquery(query) => {
                self.lower_query(query);
            }
            Expr::Case {
                operand,
                conditions,
                else_result,
                ..
            } => {
                if let Some(op) = operand {
                    self.scan_expr_for_queries(op);
                }
                for case_when in conditions {
                    self.scan_expr_for_queries(&case_when.condition);
                    self.scan_expr_for_queries(&case_when.result);
                }
                if let Some(else_expr) = else_result {
                    self.scan_expr_for_queries(else_expr);
                }
            }
            Expr::Function(func) => {
                if let FunctionArguments::Subquery(query) = &func.args {
                    self.lower_query(query);
                } else if let FunctionArguments::List(list) = &func.args {
                    for arg in &list.args {
                        let arg_expr = match arg {
                            FunctionArg::Unnamed(e)
                            | FunctionArg::Named { arg: e, .. }
                            | FunctionArg::ExprNamed { arg: e, .. } => e,
                        };
                        if let FunctionArgExpr::Expr(expr) = arg_expr {
                            self.scan_expr_for_queries(expr);
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

/// Unqualified tail of a possibly schema-qualified object name
fn object_name_tail(name: &ObjectName) -> String {
    name.0
        .last()
        .and_then(|part| part.as_ident())
        .map(|ident| ident.value.clone())
        .unwrap_or_else(|| name.to_string())
}

/// Human-readable name for a statement variant
fn statement_kind(stmt: &Statement) -> &'static str {
    match stmt {
        Statement::Update { .. } => "UPDATE",
        Statement::Delete(_) => "DELETE",
        Statement::Drop { .. } => "DROP",
        _ => "unsupported statement",
    }
}

#[cfg(test)]
#[path = "lower_test.rs"]
mod tests;
