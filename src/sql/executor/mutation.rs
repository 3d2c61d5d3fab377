use crate::error::{Error, Result};
use crate::sql::executor::{Context, Executor, ResultSet};
use crate::sql::schema::Table;
use crate::sql::types::{Row, Value};

/// Rebuilds every index file that exists for the table from the given rows
///
/// Rebuilds write straight to disk even when the rows are only staged in a
/// transaction, so after a rollback the index files run ahead of the table
/// until the next rebuild.
fn refresh_indexes(ctx: &Context, table: &Table, rows: &[Row]) -> Result<()> {
    for column in &table.columns {
        if ctx.index.has(&table.name, &column.name) {
            ctx.index.rebuild(&table.name, &column.name, rows)?;
        }
    }
    Ok(())
}

/// INSERT executor
///
/// Values are matched to columns by position and coerced to the column type
/// before any constraint check runs.
pub struct Insert {
    table_name: String,
    values: Vec<Value>,
}

impl Insert {
    pub fn new(table_name: String, values: Vec<Value>) -> Box<Self> {
        Box::new(Self { table_name, values })
    }
}

impl Executor for Insert {
    fn execute(self: Box<Self>, ctx: &mut Context) -> Result<ResultSet> {
        let Insert { table_name, values } = *self;
        let table = ctx.storage.load_schema(&table_name)?;
        if values.len() != table.columns.len() {
            return Err(Error::ColumnCountMismatch);
        }

        let mut row = Row::new();
        for (column, value) in table.columns.iter().zip(values) {
            let coerced = value
                .coerce(&column.datatype)
                .ok_or_else(|| Error::TypeError(format!("Column '{}' must be INT", column.name)))?;
            row.set(&column.name, coerced);
        }

        let mut rows = ctx.storage.scan(&table_name, ctx.txn)?;
        for column in table.indexed_columns() {
            if let Some(new_value) = row.get(&column.name) {
                let taken = rows.iter().any(|existing| {
                    existing
                        .get(&column.name)
                        .map_or(false, |v| v.loosely_equals(new_value))
                });
                if taken {
                    return Err(Error::ConstraintViolation(format!(
                        "Constraint Violation: '{}' must be unique. Value '{}' exists.",
                        column.name, new_value
                    )));
                }
            }
        }

        rows.push(row);
        ctx.storage.save_rows(&table_name, rows.clone(), ctx.txn)?;
        refresh_indexes(ctx, &table, &rows)?;
        Ok(ResultSet::Insert { count: 1 })
    }
}

/// UPDATE executor - single SET column, mandatory WHERE
///
/// The uniqueness check runs per matching row against the live row set, so
/// updating several rows to the same unique value trips on the second row
/// and aborts before anything is persisted.
pub struct Update {
    table_name: String,
    column: String,
    value: Value,
    where_column: String,
    where_value: Value,
}

impl Update {
    pub fn new(
        table_name: String,
        column: String,
        value: Value,
        where_column: String,
        where_value: Value,
    ) -> Box<Self> {
        Box::new(Self {
            table_name,
            column,
            value,
            where_column,
            where_value,
        })
    }
}

impl Executor for Update {
    fn execute(self: Box<Self>, ctx: &mut Context) -> Result<ResultSet> {
        let Update {
            table_name,
            column,
            value,
            where_column,
            where_value,
        } = *self;
        let table = ctx.storage.load_schema(&table_name)?;
        let (datatype, unique) = match table.find_column(&column) {
            Some(c) => (c.datatype.clone(), c.primary_key || c.unique),
            None => {
                return Err(Error::NotFound(format!(
                    "Column '{}' does not exist.",
                    column
                )))
            }
        };

        // Type checked up front, before we know whether anything matches
        let value = value
            .coerce(&datatype)
            .ok_or_else(|| Error::TypeError(format!("Type Error: {} must be INT", column)))?;

        let mut rows = ctx.storage.scan(&table_name, ctx.txn)?;
        let mut count = 0;
        for k in 0..rows.len() {
            let matches = rows[k]
                .get(&where_column)
                .map_or(false, |v| v.loosely_equals(&where_value));
            if !matches {
                continue;
            }
            if unique {
                for (j, other) in rows.iter().enumerate() {
                    if j != k && other.get(&column).map_or(false, |v| v.loosely_equals(&value)) {
                        return Err(Error::ConstraintViolation(format!(
                            "Constraint Violation: {} must be unique. '{}' already exists.",
                            column, value
                        )));
                    }
                }
            }
            rows[k].set(&column, value.clone());
            count += 1;
        }

        if count > 0 {
            ctx.storage.save_rows(&table_name, rows.clone(), ctx.txn)?;
            refresh_indexes(ctx, &table, &rows)?;
        }
        Ok(ResultSet::Update { count })
    }
}

/// DELETE executor - mandatory WHERE
///
/// No schema check: deleting from an unknown table reports zero rows and
/// still writes its (empty) rows file. Indexes are not rebuilt here; they
/// stay stale until the next insert or update.
pub struct Delete {
    table_name: String,
    column: String,
    value: Value,
}

impl Delete {
    pub fn new(table_name: String, column: String, value: Value) -> Box<Self> {
        Box::new(Self {
            table_name,
            column,
            value,
        })
    }
}

impl Executor for Delete {
    fn execute(self: Box<Self>, ctx: &mut Context) -> Result<ResultSet> {
        let Delete {
            table_name,
            column,
            value,
        } = *self;
        let rows = ctx.storage.scan(&table_name, ctx.txn)?;
        let before = rows.len();
        let kept: Vec<Row> = rows
            .into_iter()
            .filter(|row| !row.get(&column).map_or(false, |v| v.loosely_equals(&value)))
            .collect();
        let count = before - kept.len();
        ctx.storage.save_rows(&table_name, kept, ctx.txn)?;
        Ok(ResultSet::Delete { count })
    }
}
