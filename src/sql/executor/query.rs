use crate::error::{Error, Result};
use crate::sql::executor::{Context, Executor, ResultSet};
use crate::sql::types::Value;

/// Full table scan executor
pub struct Scan {
    table_name: String,
}

impl Scan {
    pub fn new(table_name: String) -> Box<Self> {
        Box::new(Self { table_name })
    }
}

impl Executor for Scan {
    fn execute(self: Box<Self>, ctx: &mut Context) -> Result<ResultSet> {
        // The schema load is what reports a missing table; a missing rows
        // file alone reads as empty.
        ctx.storage.load_schema(&self.table_name)?;
        let rows = ctx.storage.scan(&self.table_name, ctx.txn)?;
        Ok(ResultSet::Scan { rows })
    }
}

/// Covering-index lookup executor
///
/// The index stores full rows, so a hit answers the query without reading
/// the table file. The lookup key is exact; loose equality does not apply
/// on this path.
pub struct IndexLookup {
    table_name: String,
    column: String,
    value: Value,
}

impl IndexLookup {
    pub fn new(table_name: String, column: String, value: Value) -> Box<Self> {
        Box::new(Self {
            table_name,
            column,
            value,
        })
    }
}

impl Executor for IndexLookup {
    fn execute(self: Box<Self>, ctx: &mut Context) -> Result<ResultSet> {
        ctx.storage.load_schema(&self.table_name)?;
        let rows = ctx.index.get(&self.table_name, &self.column, &self.value)?;
        Ok(ResultSet::Scan { rows })
    }
}

/// WHERE filter executor
pub struct Filter {
    source: Box<dyn Executor>,
    column: String,
    value: Value,
}

impl Filter {
    pub fn new(source: Box<dyn Executor>, column: String, value: Value) -> Box<Self> {
        Box::new(Self {
            source,
            column,
            value,
        })
    }
}

impl Executor for Filter {
    fn execute(self: Box<Self>, ctx: &mut Context) -> Result<ResultSet> {
        match self.source.execute(ctx)? {
            ResultSet::Scan { rows } => {
                // Rows without the column never match
                let rows = rows
                    .into_iter()
                    .filter(|row| {
                        row.get(&self.column)
                            .map_or(false, |v| v.loosely_equals(&self.value))
                    })
                    .collect();
                Ok(ResultSet::Scan { rows })
            }
            _ => Err(Error::Internal("Unexpected result set".into())),
        }
    }
}
