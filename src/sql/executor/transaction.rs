use crate::error::Result;
use crate::sql::executor::{Context, Executor, ResultSet};

/// BEGIN executor
pub struct Begin;

impl Begin {
    pub fn new() -> Box<Self> {
        Box::new(Self)
    }
}

impl Executor for Begin {
    fn execute(self: Box<Self>, ctx: &mut Context) -> Result<ResultSet> {
        ctx.storage.begin(ctx.txn)?;
        Ok(ResultSet::Begin)
    }
}

/// COMMIT executor
pub struct Commit;

impl Commit {
    pub fn new() -> Box<Self> {
        Box::new(Self)
    }
}

impl Executor for Commit {
    fn execute(self: Box<Self>, ctx: &mut Context) -> Result<ResultSet> {
        ctx.storage.commit(ctx.txn)?;
        Ok(ResultSet::Commit)
    }
}

/// ROLLBACK executor
pub struct Rollback;

impl Rollback {
    pub fn new() -> Box<Self> {
        Box::new(Self)
    }
}

impl Executor for Rollback {
    fn execute(self: Box<Self>, ctx: &mut Context) -> Result<ResultSet> {
        ctx.storage.rollback(ctx.txn)?;
        Ok(ResultSet::Rollback)
    }
}
