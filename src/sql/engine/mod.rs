use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::sql::executor::{Context, ResultSet};
use crate::sql::parser::Parser;
use crate::sql::plan::Plan;
use crate::storage::index::Index;
use crate::storage::{Storage, Transaction};

/// An embedded database: a data directory holding schemas, tables and
/// indexes
///
/// Clones share the directory. Sessions are not coordinated with each other
/// beyond the atomicity of single file writes.
#[derive(Debug, Clone)]
pub struct Database {
    storage: Storage,
    index: Index,
}

impl Database {
    /// Opens a database under the given directory, creating the layout on
    /// first use
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            storage: Storage::open(dir)?,
            index: Index::open(dir)?,
        })
    }

    /// Starts a session with its own transaction state
    pub fn session(&self) -> Session {
        Session {
            db: self.clone(),
            txn: Transaction::default(),
        }
    }
}

/// SQL session for executing statements
///
/// Each session owns its transaction handle, so BEGIN on one session never
/// affects another.
pub struct Session {
    db: Database,
    txn: Transaction,
}

impl Session {
    /// Parses, plans and executes a single SQL statement
    pub fn execute(&mut self, sql: &str) -> Result<ResultSet> {
        debug!(sql, "executing statement");
        let stmt = Parser::new(sql).parse()?;
        let plan = Plan::build(stmt, &self.db.index);
        plan.execute(&mut Context {
            storage: &self.db.storage,
            index: &self.db.index,
            txn: &mut self.txn,
        })
    }

    /// Executes a statement and renders the outcome the way the shell
    /// prints it
    ///
    /// Failures come back as a string with the "Error: " prefix instead of
    /// as Err.
    pub fn query(&mut self, sql: &str) -> String {
        match self.execute(sql) {
            Ok(result) => result.to_string(),
            Err(err) => format!("Error: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Database;
    use crate::error::Result;

    #[test]
    fn test_create_insert_and_unique_constraint() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let mut session = Database::open(dir.path())?.session();

        assert_eq!(
            session.query("CREATE TABLE users (id INT PRIMARY KEY, name TEXT)"),
            "Table 'users' created."
        );
        assert_eq!(
            session.query("INSERT INTO users VALUES (1, 'Alice')"),
            "Inserted 1 row."
        );
        assert_eq!(
            session.query("INSERT INTO users VALUES (1, 'Bob')"),
            "Error: Constraint Violation: 'id' must be unique. Value '1' exists."
        );
        assert_eq!(
            session.query("SELECT * FROM users WHERE name = 'Bob'"),
            "Empty set."
        );
        Ok(())
    }

    #[test]
    fn test_rollback_discards_staged_insert() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let mut session = Database::open(dir.path())?.session();
        session.query("CREATE TABLE users (id INT PRIMARY KEY, name TEXT)");
        session.query("INSERT INTO users VALUES (1, 'Alice')");

        assert_eq!(session.query("BEGIN"), "Transaction Started");
        assert_eq!(
            session.query("INSERT INTO users VALUES (2,'Carl')"),
            "Inserted 1 row."
        );
        assert_eq!(session.query("ROLLBACK"), "Transaction Rolled Back");
        assert_eq!(
            session.query("SELECT * FROM users"),
            "id | name\n--------------------\n1 | Alice\n"
        );
        Ok(())
    }

    #[test]
    fn test_commit_makes_staged_writes_visible_to_other_sessions() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let db = Database::open(dir.path())?;
        let mut writer = db.session();
        let mut reader = db.session();
        writer.query("CREATE TABLE users (id INT PRIMARY KEY, name TEXT)");

        writer.query("BEGIN");
        writer.query("INSERT INTO users VALUES (1, 'Alice')");
        // Staged rows are private to the writer's session
        assert_eq!(reader.query("SELECT * FROM users"), "Empty set.");
        assert_eq!(
            writer.query("SELECT * FROM users"),
            "id | name\n--------------------\n1 | Alice\n"
        );

        assert_eq!(writer.query("COMMIT"), "Transaction Committed");
        assert_eq!(
            reader.query("SELECT * FROM users"),
            "id | name\n--------------------\n1 | Alice\n"
        );
        Ok(())
    }

    #[test]
    fn test_transaction_state_errors() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let mut session = Database::open(dir.path())?.session();

        assert_eq!(session.query("COMMIT"), "Error: No active transaction.");
        assert_eq!(session.query("ROLLBACK"), "Error: No active transaction.");
        session.query("BEGIN");
        assert_eq!(session.query("BEGIN"), "Error: Transaction already active.");
        Ok(())
    }

    #[test]
    fn test_indexed_select_matches_full_scan() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let mut session = Database::open(dir.path())?.session();
        // Same rows, one table indexed on id and one not
        session.query("CREATE TABLE indexed (id INT PRIMARY KEY, name TEXT)");
        session.query("CREATE TABLE plain (id INT, name TEXT)");
        for table in ["indexed", "plain"] {
            session.query(&format!("INSERT INTO {} VALUES (1, 'Alice')", table));
            session.query(&format!("INSERT INTO {} VALUES (2, 'Bob')", table));
        }

        let via_index = session.query("SELECT * FROM indexed WHERE id = 1");
        let via_scan = session.query("SELECT * FROM plain WHERE id = 1");
        assert_eq!(via_index, via_scan);
        assert_eq!(via_index, "id | name\n--------------------\n1 | Alice\n");
        Ok(())
    }

    #[test]
    fn test_delete_leaves_the_index_stale() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let mut session = Database::open(dir.path())?.session();
        session.query("CREATE TABLE users (id INT PRIMARY KEY, name TEXT)");
        session.query("INSERT INTO users VALUES (1, 'Alice')");

        assert_eq!(
            session.query("DELETE FROM users WHERE id = 1"),
            "Deleted 1 rows."
        );
        // The table is empty, but the indexed path still serves the old row
        assert_eq!(session.query("SELECT * FROM users"), "Empty set.");
        assert_eq!(
            session.query("SELECT * FROM users WHERE id = 1"),
            "id | name\n--------------------\n1 | Alice\n"
        );
        Ok(())
    }

    #[test]
    fn test_join_merges_rows_pairwise() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let mut session = Database::open(dir.path())?.session();
        session.query("CREATE TABLE users (id INT PRIMARY KEY, name TEXT)");
        session.query("CREATE TABLE orders (oid INT, user_id INT, total INT)");
        session.query("INSERT INTO users VALUES (1, 'Alice')");
        session.query("INSERT INTO users VALUES (2, 'Bob')");
        session.query("INSERT INTO orders VALUES (10, 1, 50)");
        session.query("INSERT INTO orders VALUES (11, 1, 70)");
        session.query("INSERT INTO orders VALUES (12, 2, 20)");

        assert_eq!(
            session.query("SELECT * FROM orders JOIN users ON orders.user_id = users.id"),
            "oid | user_id | total | id | name\n\
             --------------------\n\
             10 | 1 | 50 | 1 | Alice\n\
             11 | 1 | 70 | 1 | Alice\n\
             12 | 2 | 20 | 2 | Bob\n"
        );
        Ok(())
    }

    #[test]
    fn test_join_overwrites_same_named_columns() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let mut session = Database::open(dir.path())?.session();
        session.query("CREATE TABLE left_side (id INT, name TEXT)");
        session.query("CREATE TABLE right_side (rid INT, name TEXT)");
        session.query("INSERT INTO left_side VALUES (1, 'left')");
        session.query("INSERT INTO right_side VALUES (1, 'right')");

        // The shared `name` column takes the join side's value
        assert_eq!(
            session
                .query("SELECT * FROM left_side JOIN right_side ON left_side.id = right_side.rid"),
            "id | name | rid\n--------------------\n1 | right | 1\n"
        );
        Ok(())
    }

    #[test]
    fn test_indexed_where_bypasses_join_and_filter() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let mut session = Database::open(dir.path())?.session();
        session.query("CREATE TABLE users (id INT PRIMARY KEY, name TEXT)");
        session.query("CREATE TABLE orders (oid INT, user_id INT, total INT)");
        session.query("INSERT INTO users VALUES (1, 'Alice')");
        session.query("INSERT INTO orders VALUES (10, 1, 50)");

        // id is indexed, so the join never runs: the result carries no
        // order columns at all
        assert_eq!(
            session
                .query("SELECT * FROM users JOIN orders ON users.id = orders.user_id WHERE id = 1"),
            "id | name\n--------------------\n1 | Alice\n"
        );
        Ok(())
    }

    #[test]
    fn test_error_surface_strings() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let mut session = Database::open(dir.path())?.session();
        session.query("CREATE TABLE users (id INT PRIMARY KEY, name TEXT)");

        assert_eq!(session.query("HELLO"), "Error: Unknown command.");
        assert_eq!(session.query(""), "Error: Unknown command.");
        assert_eq!(
            session.query("CREATE TABLE users id INT"),
            "Error: Syntax Error in CREATE TABLE"
        );
        assert_eq!(
            session.query("SELECT * FROM ghost"),
            "Error: Table 'ghost' does not exist."
        );
        assert_eq!(
            session.query("INSERT INTO users VALUES (1)"),
            "Error: Column count mismatch."
        );
        assert_eq!(
            session.query("INSERT INTO users VALUES ('abc', 'Bob')"),
            "Error: Column 'id' must be INT"
        );
        assert_eq!(
            session.query("UPDATE users SET id = 'abc' WHERE name = 'Alice'"),
            "Error: Type Error: id must be INT"
        );
        Ok(())
    }

    #[test]
    fn test_keywords_are_case_insensitive() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let mut session = Database::open(dir.path())?.session();

        assert_eq!(
            session.query("create table pets (id int primary key, name text)"),
            "Table 'pets' created."
        );
        assert_eq!(
            session.query("insert into pets values (1, 'Rex')"),
            "Inserted 1 row."
        );
        assert_eq!(
            session.query("select * from pets where id = 1"),
            "id | name\n--------------------\n1 | Rex\n"
        );
        assert_eq!(session.query("begin"), "Transaction Started");
        assert_eq!(session.query("commit"), "Transaction Committed");
        Ok(())
    }

    #[test]
    fn test_boolean_coercion_at_the_input_boundary() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let mut session = Database::open(dir.path())?.session();
        session.query("CREATE TABLE flags (id INT PRIMARY KEY, active BOOLEAN)");
        session.query("INSERT INTO flags VALUES (1, 'yes')");
        session.query("INSERT INTO flags VALUES (2, 'nope')");
        session.query("INSERT INTO flags VALUES (3, true)");

        assert_eq!(
            session.query("SELECT * FROM flags"),
            "id | active\n--------------------\n1 | true\n2 | false\n3 | true\n"
        );
        Ok(())
    }

    #[test]
    fn test_update_all_matching_rows() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let mut session = Database::open(dir.path())?.session();
        session.query("CREATE TABLE users (id INT PRIMARY KEY, name TEXT, age INT)");
        session.query("INSERT INTO users VALUES (1, 'Alice', 30)");
        session.query("INSERT INTO users VALUES (2, 'Bob', 30)");

        assert_eq!(
            session.query("UPDATE users SET age = 31 WHERE age = 30"),
            "Updated 2 rows."
        );
        assert_eq!(
            session.query("UPDATE users SET age = 99 WHERE id = 7"),
            "Updated 0 rows."
        );
        assert_eq!(
            session.query("SELECT * FROM users WHERE age = 31"),
            "id | name | age\n--------------------\n1 | Alice | 31\n2 | Bob | 31\n"
        );
        Ok(())
    }
}
