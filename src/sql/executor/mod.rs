use std::fmt::Display;

use crate::error::Result;
use crate::sql::executor::join::NestedLoopJoin;
use crate::sql::executor::mutation::{Delete, Insert, Update};
use crate::sql::executor::query::{Filter, IndexLookup, Scan};
use crate::sql::executor::schema::CreateTable;
use crate::sql::executor::transaction::{Begin, Commit, Rollback};
use crate::sql::plan::Node;
use crate::sql::types::Row;
use crate::storage::index::Index;
use crate::storage::{Storage, Transaction};

mod join;
mod mutation;
mod query;
mod schema;
mod transaction;

/// Everything an executor can reach: the two stores plus the session's
/// transaction handle
pub struct Context<'a> {
    pub storage: &'a Storage,
    pub index: &'a Index,
    pub txn: &'a mut Transaction,
}

/// SQL executor trait
pub trait Executor {
    fn execute(self: Box<Self>, ctx: &mut Context) -> Result<ResultSet>;
}

/// Builds an executor tree from a plan node
impl dyn Executor {
    pub fn build(node: Node) -> Box<dyn Executor> {
        match node {
            Node::CreateTable { schema } => CreateTable::new(schema),
            Node::Insert { table_name, values } => Insert::new(table_name, values),
            Node::IndexLookup {
                table_name,
                column,
                value,
            } => IndexLookup::new(table_name, column, value),
            Node::Scan { table_name } => Scan::new(table_name),
            Node::NestedLoopJoin {
                source,
                table_name,
                left_column,
                right_column,
            } => NestedLoopJoin::new(Self::build(*source), table_name, left_column, right_column),
            Node::Filter {
                source,
                column,
                value,
            } => Filter::new(Self::build(*source), column, value),
            Node::Update {
                table_name,
                column,
                value,
                where_column,
                where_value,
            } => Update::new(table_name, column, value, where_column, where_value),
            Node::Delete {
                table_name,
                column,
                value,
            } => Delete::new(table_name, column, value),
            Node::Begin => Begin::new(),
            Node::Commit => Commit::new(),
            Node::Rollback => Rollback::new(),
        }
    }
}

/// Execution result set
#[derive(Debug, PartialEq)]
pub enum ResultSet {
    CreateTable { table_name: String },
    Insert { count: usize },
    Scan { rows: Vec<Row> },
    Update { count: usize },
    Delete { count: usize },
    Begin,
    Commit,
    Rollback,
}

/// Renders a result the way the shell prints it
///
/// Scan results become a plain text table: headers from the first row, a
/// fixed 20-dash rule, one line per row with " | " separators and a trailing
/// newline each. Rows wider than the header line print all their cells; no
/// padding or truncation is done.
impl Display for ResultSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultSet::CreateTable { table_name } => {
                write!(f, "Table '{}' created.", table_name)
            }
            ResultSet::Insert { count } => write!(f, "Inserted {} row.", count),
            ResultSet::Scan { rows } => {
                if rows.is_empty() {
                    return f.write_str("Empty set.");
                }
                let headers: Vec<&str> = rows[0].columns().collect();
                writeln!(f, "{}", headers.join(" | "))?;
                writeln!(f, "{}", "-".repeat(20))?;
                for row in rows {
                    let cells: Vec<String> = row.values().map(|v| v.to_string()).collect();
                    writeln!(f, "{}", cells.join(" | "))?;
                }
                Ok(())
            }
            ResultSet::Update { count } => write!(f, "Updated {} rows.", count),
            ResultSet::Delete { count } => write!(f, "Deleted {} rows.", count),
            ResultSet::Begin => f.write_str("Transaction Started"),
            ResultSet::Commit => f.write_str("Transaction Committed"),
            ResultSet::Rollback => f.write_str("Transaction Rolled Back"),
        }
    }
}
