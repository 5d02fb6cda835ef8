//! The database capability consumed by queries and locks.

use std::collections::HashMap;

use strata_schema::{DialectKind, SqlValue};

use crate::error::ExecError;

/// A fetched row, keyed by column name.
pub type Row = HashMap<String, SqlValue>;

/// Outcome of a statement that does not return rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    /// Rows inserted, updated or deleted.
    pub rows_affected: u64,
    /// Id generated by the last insert, where the driver reports one.
    pub last_insert_id: Option<i64>,
}

/// Runs SQL with positional `?` parameters.
///
/// Implementations own connections and transactions; this crate only builds
/// statements and interprets their outcome.
#[allow(async_fn_in_trait)]
pub trait Executor {
    /// Dialect statements must be written in.
    fn dialect(&self) -> DialectKind;

    /// Executes a statement.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome, ExecError>;

    /// Executes a query and returns all rows.
    async fn fetch(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, ExecError>;
}
