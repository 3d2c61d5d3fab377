use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::sql::types::{Row, Value};

use super::write_atomic;

/// Covering indexes, one file per (table, column) pair
///
/// An index file maps each distinct value, in its canonical string form, to
/// the full rows carrying it. Files are compact JSON named
/// `<table>_<column>.json`; a lookup hit can answer a query without touching
/// the table file at all.
#[derive(Debug, Clone)]
pub struct Index {
    dir: PathBuf,
}

impl Index {
    /// Opens the index directory, creating it if missing
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().join("indexes");
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, table: &str, column: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.json", table, column))
    }

    /// Whether a covering index exists for the column
    pub fn has(&self, table: &str, column: &str) -> bool {
        self.path(table, column).exists()
    }

    /// Rows indexed under the value's canonical key
    ///
    /// Lookups are exact on the canonical string: `'01'` does not hit the
    /// entry for `1`. A missing key or missing index file reads as no rows.
    pub fn get(&self, table: &str, column: &str, value: &Value) -> Result<Vec<Row>> {
        let path = self.path(table, column);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let entries: BTreeMap<String, Vec<Row>> =
            serde_json::from_str(&fs::read_to_string(path)?)?;
        Ok(entries.get(&value.to_string()).cloned().unwrap_or_default())
    }

    /// Recomputes a column's index from the full row set
    ///
    /// Rows missing the column are skipped. Keys are written in sorted order,
    /// so rebuilding from the same rows produces a byte-identical file.
    pub fn rebuild(&self, table: &str, column: &str, rows: &[Row]) -> Result<()> {
        let mut entries: BTreeMap<String, Vec<Row>> = BTreeMap::new();
        for row in rows {
            if let Some(value) = row.get(column) {
                entries
                    .entry(value.to_string())
                    .or_default()
                    .push(row.clone());
            }
        }
        let json = serde_json::to_string(&entries)?;
        write_atomic(&self.path(table, column), &json)?;
        debug!(table, column, keys = entries.len(), "rebuilt index");
        Ok(())
    }
}
