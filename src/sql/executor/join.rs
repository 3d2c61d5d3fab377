use crate::error::{Error, Result};
use crate::sql::executor::{Context, Executor, ResultSet};

/// Nested-loop JOIN executor
///
/// Pairs source rows with the join table's rows on loose column equality and
/// merges each matching pair. Same-named columns take the join side's value;
/// the merge is lossy, matching positionally on the named columns with any
/// table qualifiers already discarded by the parser.
pub struct NestedLoopJoin {
    source: Box<dyn Executor>,
    table_name: String,
    left_column: String,
    right_column: String,
}

impl NestedLoopJoin {
    pub fn new(
        source: Box<dyn Executor>,
        table_name: String,
        left_column: String,
        right_column: String,
    ) -> Box<Self> {
        Box::new(Self {
            source,
            table_name,
            left_column,
            right_column,
        })
    }
}

impl Executor for NestedLoopJoin {
    fn execute(self: Box<Self>, ctx: &mut Context) -> Result<ResultSet> {
        match self.source.execute(ctx)? {
            ResultSet::Scan { rows } => {
                // No schema check on the join table: missing reads as empty
                // and the join simply produces no rows.
                let right_rows = ctx.storage.scan(&self.table_name, ctx.txn)?;
                let mut joined = Vec::new();
                for left in &rows {
                    for right in &right_rows {
                        let hit = match (
                            left.get(&self.left_column),
                            right.get(&self.right_column),
                        ) {
                            (Some(l), Some(r)) => l.loosely_equals(r),
                            _ => false,
                        };
                        if hit {
                            joined.push(left.merge(right));
                        }
                    }
                }
                Ok(ResultSet::Scan { rows: joined })
            }
            _ => Err(Error::Internal("Unexpected result set".into())),
        }
    }
}
