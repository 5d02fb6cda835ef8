//! Row locks with an optional cross-check of a second column.

use std::sync::Arc;

use strata_schema::{SqlValue, Table};
use tracing::{debug, warn};

use crate::error::{OrmError, Result};
use crate::executor::Executor;
use crate::model::Model;
use crate::record::Record;

/// Locks the row of a record inside the caller's transaction.
///
/// The lock keeps a copy of the record's identity, so the record stays free
/// to be modified and written while the lock is held.
///
/// ```rust,ignore
/// let mut lock = Lock::new(&account)?;
/// lock.obtain(&tx, Some(("version", SqlValue::Int(3)))).await?;
/// assert!(lock.status());
/// ```
#[derive(Debug, Clone)]
pub struct Lock {
    table: Arc<Table>,
    column: String,
    value: SqlValue,
    obtained: bool,
}

impl Lock {
    /// Prepares a lock on the row identified by the record's primary or
    /// unique column.
    pub fn new<M: Model>(record: &Record<M>) -> Result<Self> {
        let table = Arc::clone(record.table());
        let Some(column) = record.primary_column() else {
            return Err(OrmError::lock(
                table.name(),
                "cannot obtain a lock, the table has no PRIMARY/UNIQUE key",
            ));
        };
        let value = record.current(column);
        if value.is_blank() {
            return Err(record.bad_value(column, "cannot be empty/NULL for a lock"));
        }
        if let Some(definition) = table.column(column) {
            definition
                .check_value(&value)
                .map_err(|message| record.bad_value(column, message))?;
        }
        Ok(Self {
            column: column.to_string(),
            table,
            value,
            obtained: false,
        })
    }

    /// Selects the row for update and, when `crosscheck` is given, verifies
    /// that the named column holds the expected value.
    ///
    /// A missing row fails the lock.
    pub async fn obtain<E: Executor>(
        &mut self,
        executor: &E,
        crosscheck: Option<(&str, SqlValue)>,
    ) -> Result<&mut Self> {
        self.obtained = false;
        let check = match crosscheck {
            Some((column, expected)) => {
                let definition = self.table.column(column).ok_or_else(|| {
                    OrmError::lock(
                        self.table.name(),
                        format!("cannot cross-check with undefined column \"{column}\""),
                    )
                })?;
                definition
                    .check_value(&expected)
                    .map_err(|message| self.bad_value(column, message))?;
                let expected = definition
                    .coerce(expected)
                    .map_err(|message| self.bad_value(column, message))?;
                Some((definition, expected))
            }
            None => None,
        };

        let dialect = executor.dialect().dialect();
        let key = dialect.quote_identifier(&self.column);
        let selected = match &check {
            Some((definition, _)) => {
                format!("{key}, {}", dialect.quote_identifier(definition.name()))
            }
            None => key.clone(),
        };
        let sql = format!(
            "SELECT {selected} FROM {} WHERE {key}=?{}",
            dialect.quote_identifier(self.table.name()),
            dialect.row_lock_suffix()
        );
        debug!(sql = %sql, table = %self.table.name(), "Obtaining row lock");

        let rows = executor
            .fetch(&sql, std::slice::from_ref(&self.value))
            .await
            .map_err(|e| OrmError::lock(self.table.name(), format!("SELECT failed: {e}")))?;
        let Some(mut row) = rows.into_iter().next() else {
            return Err(OrmError::lock(
                self.table.name(),
                format!("no row with \"{}\" = {}", self.column, self.value),
            ));
        };

        if let Some((definition, expected)) = check {
            let found = row.remove(definition.name()).unwrap_or(SqlValue::Null);
            let found = definition
                .coerce(found)
                .map_err(|message| self.bad_value(definition.name(), message))?;
            if found != expected {
                warn!(
                    table = %self.table.name(),
                    column = %definition.name(),
                    expected = %expected,
                    found = %found,
                    "Lock cross-check failed"
                );
                return Err(OrmError::lock(
                    self.table.name(),
                    format!("cross-checking \"{}\" failed", definition.name()),
                ));
            }
        }

        self.obtained = true;
        Ok(self)
    }

    /// Whether the last [`Self::obtain`] succeeded.
    #[must_use]
    pub const fn status(&self) -> bool {
        self.obtained
    }

    /// Column the locked row is matched on.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Value the locked row is matched on.
    #[must_use]
    pub const fn value(&self) -> &SqlValue {
        &self.value
    }

    fn bad_value(&self, column: &str, message: impl Into<String>) -> OrmError {
        OrmError::BadValue {
            model: self.table.model().unwrap_or_else(|| self.table.name()).to_string(),
            property: column.to_string(),
            message: message.into(),
        }
    }
}
