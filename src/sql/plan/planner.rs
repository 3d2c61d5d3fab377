use crate::sql::parser::ast;
use crate::sql::plan::Node;
use crate::sql::schema::{self, Table};
use crate::sql::types::Value;
use crate::storage::index::Index;

/// Query planner - converts AST statements into execution plan nodes
///
/// The only planning decision is the access path for SELECT: a WHERE on a
/// column with a covering index becomes a bare IndexLookup, everything else
/// becomes a scan with join and filter nodes stacked on top.
pub struct Planner<'a> {
    index: &'a Index,
}

impl<'a> Planner<'a> {
    pub fn new(index: &'a Index) -> Self {
        Self { index }
    }

    pub fn build_statement(&self, stmt: ast::Statement) -> Node {
        match stmt {
            ast::Statement::CreateTable { name, columns } => Node::CreateTable {
                schema: Table {
                    name,
                    columns: columns
                        .into_iter()
                        .map(|c| schema::Column {
                            name: c.name,
                            datatype: c.datatype,
                            primary_key: c.primary_key,
                            unique: c.unique,
                        })
                        .collect(),
                },
            },
            ast::Statement::Insert { table_name, values } => Node::Insert {
                table_name,
                values: values.into_iter().map(Value::from_expression).collect(),
            },
            ast::Statement::Select {
                table_name,
                join,
                where_clause,
            } => {
                // A covering index on the WHERE column answers the whole
                // query, even when a JOIN was written: the join and the
                // residual filter are dropped from the plan.
                if let Some((column, expr)) = &where_clause {
                    if self.index.has(&table_name, column) {
                        return Node::IndexLookup {
                            table_name,
                            column: column.clone(),
                            value: Value::from_expression(expr.clone()),
                        };
                    }
                }

                let mut node = Node::Scan { table_name };
                if let Some(join) = join {
                    node = Node::NestedLoopJoin {
                        source: Box::new(node),
                        table_name: join.table_name,
                        left_column: join.left_column,
                        right_column: join.right_column,
                    };
                }
                if let Some((column, expr)) = where_clause {
                    node = Node::Filter {
                        source: Box::new(node),
                        column,
                        value: Value::from_expression(expr),
                    };
                }
                node
            }
            ast::Statement::Update {
                table_name,
                column,
                value,
                where_clause,
            } => {
                let (where_column, where_expr) = where_clause;
                Node::Update {
                    table_name,
                    column,
                    value: Value::from_expression(value),
                    where_column,
                    where_value: Value::from_expression(where_expr),
                }
            }
            ast::Statement::Delete {
                table_name,
                where_clause,
            } => {
                let (column, expr) = where_clause;
                Node::Delete {
                    table_name,
                    column,
                    value: Value::from_expression(expr),
                }
            }
            ast::Statement::Begin => Node::Begin,
            ast::Statement::Commit => Node::Commit,
            ast::Statement::Rollback => Node::Rollback,
        }
    }
}
