use crate::sql::types::DataType;

/// Abstract Syntax Tree (AST) node definitions for SQL statements
#[derive(Debug, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement
    CreateTable {
        name: String,
        columns: Vec<Column>,
    },
    /// INSERT statement (single row)
    Insert {
        table_name: String,
        values: Vec<Expression>,
    },
    /// SELECT statement
    ///
    /// The projection list is consumed by the parser and discarded: every
    /// column of the resulting rows is always returned.
    Select {
        table_name: String,
        join: Option<Join>,
        where_clause: Option<(String, Expression)>,
    },
    /// UPDATE statement - single assignment, single predicate
    Update {
        table_name: String,
        column: String,
        value: Expression,
        where_clause: (String, Expression),
    },
    /// DELETE statement
    Delete {
        table_name: String,
        where_clause: (String, Expression),
    },
    /// Transaction control
    Begin,
    Commit,
    Rollback,
}

/// JOIN clause - inner join on one column pair
///
/// Column qualifiers (the part before the dot) are discarded by the parser;
/// `left_column` applies to the FROM table's rows and `right_column` to the
/// joined table's rows, positionally.
#[derive(Debug, PartialEq)]
pub struct Join {
    pub table_name: String,
    pub left_column: String,
    pub right_column: String,
}

/// Column definition for CREATE TABLE statements
#[derive(Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub datatype: DataType,
    pub primary_key: bool,
    pub unique: bool,
}

/// Expression types (constants only in this subset)
#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    /// Constant value
    Consts(Consts),
}

/// Implements From trait to convert Consts into Expression
impl From<Consts> for Expression {
    fn from(value: Consts) -> Self {
        Self::Consts(value)
    }
}

/// Constant values in SQL expressions
#[derive(Debug, PartialEq, Clone)]
pub enum Consts {
    Boolean(bool),
    Integer(i64),
    String(String),
}
