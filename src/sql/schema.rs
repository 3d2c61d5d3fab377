use serde::{Deserialize, Serialize};

use crate::sql::types::DataType;

/// Table schema definition, persisted as a pretty-printed JSON document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    /// Returns the column with the given name, if the schema has one
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns that carry a covering index: PRIMARY KEY or UNIQUE
    ///
    /// PRIMARY KEY implies unique; uniqueness checks and index maintenance
    /// both walk this same set.
    pub fn indexed_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.primary_key || c.unique)
    }
}

/// Column schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub datatype: DataType,
    /// Whether this column is the primary key
    pub primary_key: bool,
    /// Whether this column carries a UNIQUE constraint
    pub unique: bool,
}

#[cfg(test)]
mod tests {
    use super::{Column, Table};
    use crate::error::Result;
    use crate::sql::types::DataType;

    fn users_table() -> Table {
        Table {
            name: "users".to_string(),
            columns: vec![
                Column {
                    name: "id".to_string(),
                    datatype: DataType::Integer,
                    primary_key: true,
                    unique: false,
                },
                Column {
                    name: "email".to_string(),
                    datatype: DataType::Text,
                    primary_key: false,
                    unique: true,
                },
                Column {
                    name: "active".to_string(),
                    datatype: DataType::Boolean,
                    primary_key: false,
                    unique: false,
                },
            ],
        }
    }

    #[test]
    fn test_indexed_columns() {
        let table = users_table();
        let indexed: Vec<_> = table.indexed_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(indexed, vec!["id", "email"]);
    }

    #[test]
    fn test_find_column() {
        let table = users_table();
        assert_eq!(
            table.find_column("active").map(|c| &c.datatype),
            Some(&DataType::Boolean)
        );
        assert!(table.find_column("missing").is_none());
    }

    #[test]
    fn test_schema_round_trips_through_json() -> Result<()> {
        let table = users_table();
        let json = serde_json::to_string_pretty(&table)?;
        let back: Table = serde_json::from_str(&json)?;
        assert_eq!(back, table);
        Ok(())
    }
}
