use crate::error::Result;
use crate::sql::executor::{Context, Executor, ResultSet};
use crate::sql::schema::Table;

/// CREATE TABLE executor
///
/// Re-creating an existing table silently overwrites its schema, rows and
/// indexes. The schema, the empty rows file and the empty index files are
/// all written straight to disk, even inside a transaction.
pub struct CreateTable {
    schema: Table,
}

impl CreateTable {
    pub fn new(schema: Table) -> Box<Self> {
        Box::new(Self { schema })
    }
}

impl Executor for CreateTable {
    fn execute(self: Box<Self>, ctx: &mut Context) -> Result<ResultSet> {
        let table = self.schema;
        ctx.storage.save_schema(&table)?;
        ctx.storage.save_table_to_disk(&table.name, &[])?;
        for column in table.indexed_columns() {
            ctx.index.rebuild(&table.name, &column.name, &[])?;
        }
        Ok(ResultSet::CreateTable {
            table_name: table.name,
        })
    }
}
