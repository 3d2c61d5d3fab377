use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::sql::schema::Table;
use crate::sql::types::Row;

pub mod index;

/// Writes a file atomically: write a `.tmp` sibling, then rename over
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Staging buffer for an explicit transaction, owned by the session
///
/// While active, whole-table writes land here instead of on disk; a table's
/// staged copy then shadows its file for reads. Commit flushes each staged
/// table, rollback discards the buffer.
#[derive(Debug, Default)]
pub struct Transaction {
    active: bool,
    staged: BTreeMap<String, Vec<Row>>,
}

impl Transaction {
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// File-per-table storage under a data directory
///
/// Schemas live in `<dir>/schemas/<table>.json`, rows in
/// `<dir>/tables/<table>.json`, both pretty-printed so the files can be
/// inspected and diffed by hand.
#[derive(Debug, Clone)]
pub struct Storage {
    schema_dir: PathBuf,
    table_dir: PathBuf,
}

impl Storage {
    /// Opens the data directory, creating the layout if it is missing
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let schema_dir = dir.join("schemas");
        let table_dir = dir.join("tables");
        fs::create_dir_all(&schema_dir)?;
        fs::create_dir_all(&table_dir)?;
        debug!(dir = %dir.display(), "opened data directory");
        Ok(Self {
            schema_dir,
            table_dir,
        })
    }

    fn schema_path(&self, table: &str) -> PathBuf {
        self.schema_dir.join(format!("{}.json", table))
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.table_dir.join(format!("{}.json", table))
    }

    /// Persists a table schema, overwriting any previous definition
    pub fn save_schema(&self, table: &Table) -> Result<()> {
        let json = serde_json::to_string_pretty(table)?;
        write_atomic(&self.schema_path(&table.name), &json)?;
        debug!(table = %table.name, "saved schema");
        Ok(())
    }

    /// Loads a table schema from disk
    pub fn load_schema(&self, table: &str) -> Result<Table> {
        let path = self.schema_path(table);
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "Table '{}' does not exist.",
                table
            )));
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    /// Reads all rows of a table
    ///
    /// An active transaction's staged copy shadows the file; a table with no
    /// rows file yet reads as empty.
    pub fn scan(&self, table: &str, txn: &Transaction) -> Result<Vec<Row>> {
        if txn.active {
            if let Some(rows) = txn.staged.get(table) {
                return Ok(rows.clone());
            }
        }
        let path = self.table_path(table);
        if !path.exists() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    /// Replaces a table's rows, staging instead when a transaction is active
    pub fn save_rows(&self, table: &str, rows: Vec<Row>, txn: &mut Transaction) -> Result<()> {
        if txn.active {
            txn.staged.insert(table.to_string(), rows);
            return Ok(());
        }
        self.save_table_to_disk(table, &rows)
    }

    /// Writes a table's rows straight to disk, bypassing any staging
    pub fn save_table_to_disk(&self, table: &str, rows: &[Row]) -> Result<()> {
        let json = serde_json::to_string_pretty(rows)?;
        write_atomic(&self.table_path(table), &json)?;
        debug!(table, rows = rows.len(), "saved table");
        Ok(())
    }

    /// Starts an explicit transaction on the session's handle
    pub fn begin(&self, txn: &mut Transaction) -> Result<()> {
        if txn.active {
            return Err(Error::TransactionState(
                "Transaction already active.".to_string(),
            ));
        }
        txn.active = true;
        Ok(())
    }

    /// Flushes every staged table to disk and ends the transaction
    ///
    /// Tables flush one file at a time; a crash mid-commit can leave some
    /// tables written and others not.
    pub fn commit(&self, txn: &mut Transaction) -> Result<()> {
        if !txn.active {
            return Err(Error::TransactionState(
                "No active transaction.".to_string(),
            ));
        }
        let staged = std::mem::take(&mut txn.staged);
        for (table, rows) in staged {
            self.save_table_to_disk(&table, &rows)?;
        }
        txn.active = false;
        debug!("transaction committed");
        Ok(())
    }

    /// Discards all staged writes and ends the transaction
    pub fn rollback(&self, txn: &mut Transaction) -> Result<()> {
        if !txn.active {
            return Err(Error::TransactionState(
                "No active transaction.".to_string(),
            ));
        }
        txn.staged.clear();
        txn.active = false;
        debug!("transaction rolled back");
        Ok(())
    }
}
