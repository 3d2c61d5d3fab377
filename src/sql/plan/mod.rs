use crate::error::Result;
use crate::sql::executor::{Context, Executor, ResultSet};
use crate::sql::parser::ast::Statement;
use crate::sql::schema::Table;
use crate::sql::types::Value;
use crate::storage::index::Index;

mod planner;

use planner::Planner;

/// Execution plan node
#[derive(Debug, PartialEq)]
pub enum Node {
    CreateTable {
        schema: Table,
    },
    Insert {
        table_name: String,
        values: Vec<Value>,
    },
    /// Answers a WHERE straight from a covering index; the table file, any
    /// join and any residual filter are skipped entirely
    IndexLookup {
        table_name: String,
        column: String,
        value: Value,
    },
    Scan {
        table_name: String,
    },
    NestedLoopJoin {
        source: Box<Node>,
        table_name: String,
        left_column: String,
        right_column: String,
    },
    Filter {
        source: Box<Node>,
        column: String,
        value: Value,
    },
    Update {
        table_name: String,
        column: String,
        value: Value,
        where_column: String,
        where_value: Value,
    },
    Delete {
        table_name: String,
        column: String,
        value: Value,
    },
    Begin,
    Commit,
    Rollback,
}

/// Execution plan - the root node of the executor tree
#[derive(Debug)]
pub struct Plan(pub Node);

impl Plan {
    /// Plans a parsed statement, consulting the indexes for access paths
    pub fn build(stmt: Statement, index: &Index) -> Plan {
        Plan(Planner::new(index).build_statement(stmt))
    }

    /// Builds the executor tree and runs it
    pub fn execute(self, ctx: &mut Context) -> Result<ResultSet> {
        <dyn Executor>::build(self.0).execute(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::{Node, Plan};
    use crate::error::Result;
    use crate::sql::parser::Parser;
    use crate::sql::schema::{Column, Table};
    use crate::sql::types::{DataType, Row, Value};
    use crate::storage::index::Index;

    fn plan(sql: &str, index: &Index) -> Result<Node> {
        Ok(Plan::build(Parser::new(sql).parse()?, index).0)
    }

    #[test]
    fn test_plan_create_table() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let index = Index::open(dir.path())?;
        let node = plan("CREATE TABLE users (id INT PRIMARY KEY, name TEXT)", &index)?;
        assert_eq!(
            node,
            Node::CreateTable {
                schema: Table {
                    name: "users".to_string(),
                    columns: vec![
                        Column {
                            name: "id".to_string(),
                            datatype: DataType::Integer,
                            primary_key: true,
                            unique: false,
                        },
                        Column {
                            name: "name".to_string(),
                            datatype: DataType::Text,
                            primary_key: false,
                            unique: false,
                        },
                    ],
                },
            }
        );
        Ok(())
    }

    #[test]
    fn test_plan_select_without_index_scans_and_filters() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let index = Index::open(dir.path())?;
        let node = plan("SELECT * FROM users WHERE id = 1", &index)?;
        assert_eq!(
            node,
            Node::Filter {
                source: Box::new(Node::Scan {
                    table_name: "users".to_string(),
                }),
                column: "id".to_string(),
                value: Value::Integer(1),
            }
        );
        Ok(())
    }

    #[test]
    fn test_plan_select_with_index_takes_the_lookup_path() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let index = Index::open(dir.path())?;
        let rows: Vec<Row> = vec![[("id", Value::Integer(1))].into_iter().collect()];
        index.rebuild("users", "id", &rows)?;

        let node = plan("SELECT * FROM users WHERE id = 1", &index)?;
        assert_eq!(
            node,
            Node::IndexLookup {
                table_name: "users".to_string(),
                column: "id".to_string(),
                value: Value::Integer(1),
            }
        );
        Ok(())
    }

    #[test]
    fn test_plan_indexed_where_bypasses_the_join() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let index = Index::open(dir.path())?;
        let rows: Vec<Row> = vec![[("id", Value::Integer(1))].into_iter().collect()];
        index.rebuild("users", "id", &rows)?;

        let node = plan(
            "SELECT * FROM users JOIN orders ON users.id = orders.user_id WHERE id = 1",
            &index,
        )?;
        // The lookup answers the query alone; no join node is planned
        assert_eq!(
            node,
            Node::IndexLookup {
                table_name: "users".to_string(),
                column: "id".to_string(),
                value: Value::Integer(1),
            }
        );
        Ok(())
    }

    #[test]
    fn test_plan_join_with_unindexed_where() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let index = Index::open(dir.path())?;
        let node = plan(
            "SELECT * FROM users JOIN orders ON users.id = orders.user_id WHERE total = 5",
            &index,
        )?;
        assert_eq!(
            node,
            Node::Filter {
                source: Box::new(Node::NestedLoopJoin {
                    source: Box::new(Node::Scan {
                        table_name: "users".to_string(),
                    }),
                    table_name: "orders".to_string(),
                    left_column: "id".to_string(),
                    right_column: "user_id".to_string(),
                }),
                column: "total".to_string(),
                value: Value::Integer(5),
            }
        );
        Ok(())
    }

    #[test]
    fn test_plan_mutations() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let index = Index::open(dir.path())?;

        let node = plan("UPDATE users SET name = 'Bob' WHERE id = 1", &index)?;
        assert_eq!(
            node,
            Node::Update {
                table_name: "users".to_string(),
                column: "name".to_string(),
                value: Value::Text("Bob".to_string()),
                where_column: "id".to_string(),
                where_value: Value::Integer(1),
            }
        );

        let node = plan("DELETE FROM users WHERE id = 1", &index)?;
        assert_eq!(
            node,
            Node::Delete {
                table_name: "users".to_string(),
                column: "id".to_string(),
                value: Value::Integer(1),
            }
        );
        Ok(())
    }
}
