//! MiniDB - a small embedded relational database
//!
//! This crate provides a line-oriented SQL subset over JSON files:
//! - SQL parsing (lexer, parser, AST)
//! - Query planning with covering-index lookups
//! - File-per-table storage with session-scoped transactions
//!
//! ```no_run
//! use minidb::sql::engine::Database;
//!
//! # fn main() -> minidb::error::Result<()> {
//! let db = Database::open("data")?;
//! let mut session = db.session();
//! session.execute("CREATE TABLE users (id INT PRIMARY KEY, name TEXT)")?;
//! println!("{}", session.query("SELECT * FROM users"));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod sql;
pub mod storage;
