//! Diff-driven INSERT, upsert, UPDATE and DELETE statements for a record.

use std::fmt;

use serde::{Deserialize, Serialize};
use strata_schema::{Dialect, DialectKind, SqlValue, ToSqlValue};
use tracing::debug;

use crate::error::{OrmError, Result};
use crate::executor::Executor;
use crate::model::Model;
use crate::record::{Changes, Record};

/// Statement kind run by a [`Query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryVerb {
    /// Plain `INSERT`.
    Insert,
    /// `INSERT` that updates the existing row on a key conflict.
    Save,
    /// `UPDATE` keyed on the match column.
    Update,
    /// `DELETE` keyed on the match column.
    Delete,
}

impl QueryVerb {
    /// Upper-case verb name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Save => "SAVE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for QueryVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a query ran and what the database reported.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Statement kind.
    pub verb: QueryVerb,
    /// SQL text with `?` placeholders.
    pub sql: String,
    /// Bound parameters, in placeholder order.
    pub params: Vec<SqlValue>,
    /// Rows inserted, updated or deleted.
    pub rows_affected: u64,
    /// Id generated by an insert, where the driver reports one.
    pub last_insert_id: Option<i64>,
}

/// A single write of one record.
///
/// The diff is taken when the query is created. Each instance runs at most
/// one verb; a second call fails with [`OrmError::QueryReused`].
///
/// ```rust,ignore
/// let mut query = user.query(&executor)?;
/// let written = query.update().await?;
/// ```
pub struct Query<'r, M: Model, E: Executor> {
    record: &'r mut Record<M>,
    executor: &'r E,
    changes: Changes,
    match_column: Option<String>,
    match_value: SqlValue,
    match_overridden: bool,
    executed: bool,
}

impl<'r, M: Model, E: Executor> Query<'r, M, E> {
    /// Computes the record's diff and its default match: the identity
    /// column's original value, or its current value on a fresh record.
    pub fn new(record: &'r mut Record<M>, executor: &'r E) -> Result<Self> {
        let changes = record.difference()?;
        let match_column = record.primary_column().map(str::to_string);
        let match_value = match_column
            .as_deref()
            .map_or(SqlValue::Null, |column| {
                record
                    .original(column)
                    .cloned()
                    .unwrap_or_else(|| record.current(column))
            });
        Ok(Self {
            record,
            executor,
            changes,
            match_column,
            match_value,
            match_overridden: false,
            executed: false,
        })
    }

    /// Matches the row on another primary or unique column.
    pub fn where_column(mut self, column: &str, value: impl ToSqlValue) -> Result<Self> {
        let table = self.record.table();
        if !table.is_key_column(column) {
            return Err(self.record.bad_value(column, "is not a PRIMARY/UNIQUE column"));
        }
        let value = value.to_sql_value();
        if let Some(definition) = table.column(column) {
            definition
                .check_value(&value)
                .map_err(|message| self.record.bad_value(column, message))?;
        }
        self.match_column = Some(column.to_string());
        self.match_value = value;
        self.match_overridden = true;
        Ok(self)
    }

    /// Pending column values.
    #[must_use]
    pub fn changes(&self) -> &Changes {
        &self.changes
    }

    /// Column and value the row is matched on.
    #[must_use]
    pub fn match_clause(&self) -> Option<(&str, &SqlValue)> {
        self.match_column
            .as_deref()
            .map(|column| (column, &self.match_value))
    }

    /// Inserts a record that has never been loaded or persisted.
    ///
    /// Afterwards the original values hold only the written columns and a
    /// generated identity. Columns left to database defaults keep no
    /// original value until the record is loaded again.
    pub async fn insert(&mut self) -> Result<bool> {
        self.insert_with(|_| {}).await
    }

    /// [`Self::insert`], then hands the outcome to `callback`.
    pub async fn insert_with<F: FnOnce(&QueryResult)>(&mut self, callback: F) -> Result<bool> {
        let verb = QueryVerb::Insert;
        self.begin(verb)?;
        if !self.record.is_fresh() {
            return Err(self.error(verb, "cannot be used on an already existing row"));
        }

        let dialect = self.dialect();
        let table = dialect.quote_identifier(self.record.table().name());
        let sql = if self.changes.is_empty() {
            match dialect.kind() {
                DialectKind::MySql => format!("INSERT INTO {table} () VALUES ()"),
                DialectKind::Sqlite => format!("INSERT INTO {table} DEFAULT VALUES"),
            }
        } else {
            let names: Vec<String> = self.changes.iter().map(|(c, _)| c.clone()).collect();
            format!(
                "INSERT INTO {table} ({}) VALUES ({})",
                dialect.column_list(&names),
                placeholders(names.len())
            )
        };
        let params = self.changes.iter().map(|(_, v)| v.clone()).collect();

        let result = self.run(verb, sql, params).await?;
        let mut written = std::mem::take(&mut self.changes);
        if let (Some(id), Some(column)) = (result.last_insert_id, self.generated_identity()) {
            self.record.write(&column, SqlValue::Int(id))?;
            written.push((column, SqlValue::Int(id)));
        }
        self.record.absorb(written);
        Ok(self.finish(verb, &result, callback))
    }

    /// Inserts the record, or updates the row already holding its match
    /// value.
    pub async fn save(&mut self) -> Result<bool> {
        self.save_with(|_| {}).await
    }

    /// [`Self::save`], then hands the outcome to `callback`.
    pub async fn save_with<F: FnOnce(&QueryResult)>(&mut self, callback: F) -> Result<bool> {
        let verb = QueryVerb::Save;
        self.begin(verb)?;
        let match_column = self.require_match(verb)?;

        let mut inserted = self.changes.clone();
        let appended_match = !inserted.iter().any(|(c, _)| *c == match_column);
        if appended_match {
            inserted.push((match_column.clone(), self.match_value.clone()));
        }
        let updated: Vec<&(String, SqlValue)> = self
            .changes
            .iter()
            .filter(|(c, _)| *c != match_column)
            .collect();

        let dialect = self.dialect();
        let names: Vec<String> = inserted.iter().map(|(c, _)| c.clone()).collect();
        let updated_names: Vec<&str> = updated.iter().map(|(c, _)| c.as_str()).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}){}",
            dialect.quote_identifier(self.record.table().name()),
            dialect.column_list(&names),
            placeholders(names.len()),
            dialect.upsert_clause(&match_column, &updated_names)
        );
        let mut params: Vec<SqlValue> = inserted.iter().map(|(_, v)| v.clone()).collect();
        if dialect.upsert_rebinds_values() {
            params.extend(updated.iter().map(|(_, v)| v.clone()));
        }

        let result = self.run(verb, sql, params).await?;
        let mut written = std::mem::take(&mut self.changes);
        // A `where_column` value only addresses the row; it is not the record's.
        if appended_match && !self.match_overridden {
            written.push((match_column, self.match_value.clone()));
        }
        self.record.absorb(written);
        Ok(self.finish(verb, &result, callback))
    }

    /// Updates the changed columns of the matched row.
    pub async fn update(&mut self) -> Result<bool> {
        self.update_with(|_| {}).await
    }

    /// [`Self::update`], then hands the outcome to `callback`.
    pub async fn update_with<F: FnOnce(&QueryResult)>(&mut self, callback: F) -> Result<bool> {
        let verb = QueryVerb::Update;
        self.begin(verb)?;
        let match_column = self.require_match(verb)?;
        if self.changes.is_empty() {
            return Err(self.error(verb, "there are no changes to write"));
        }

        let dialect = self.dialect();
        let sets: Vec<String> = self
            .changes
            .iter()
            .map(|(c, _)| format!("{}=?", dialect.quote_identifier(c)))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {}=?",
            dialect.quote_identifier(self.record.table().name()),
            sets.join(", "),
            dialect.quote_identifier(&match_column)
        );
        let mut params: Vec<SqlValue> = self.changes.iter().map(|(_, v)| v.clone()).collect();
        params.push(self.match_value.clone());

        let result = self.run(verb, sql, params).await?;
        let written = std::mem::take(&mut self.changes);
        self.record.absorb(written);
        Ok(self.finish(verb, &result, callback))
    }

    /// Deletes the matched row.
    pub async fn delete(&mut self) -> Result<bool> {
        self.delete_with(|_| {}).await
    }

    /// [`Self::delete`], then hands the outcome to `callback`.
    pub async fn delete_with<F: FnOnce(&QueryResult)>(&mut self, callback: F) -> Result<bool> {
        let verb = QueryVerb::Delete;
        self.begin(verb)?;
        let match_column = self.require_match(verb)?;

        let dialect = self.dialect();
        let sql = format!(
            "DELETE FROM {} WHERE {}=?",
            dialect.quote_identifier(self.record.table().name()),
            dialect.quote_identifier(&match_column)
        );
        let params = vec![self.match_value.clone()];

        let result = self.run(verb, sql, params).await?;
        self.record.forget();
        Ok(self.finish(verb, &result, callback))
    }

    fn dialect(&self) -> &'static dyn Dialect {
        self.executor.dialect().dialect()
    }

    fn begin(&mut self, verb: QueryVerb) -> Result<()> {
        if self.executed {
            return Err(OrmError::QueryReused(self.record.table().name().to_string()));
        }
        self.executed = true;
        debug!(verb = %verb, table = %self.record.table().name(), "Preparing query");
        Ok(())
    }

    fn require_match(&self, verb: QueryVerb) -> Result<String> {
        let Some(column) = self.match_column.clone() else {
            return Err(self.error(verb, "requires a PRIMARY/UNIQUE column"));
        };
        if self.match_value.is_blank() {
            return Err(self.error(verb, format!("\"{column}\" cannot be empty/NULL")));
        }
        Ok(column)
    }

    /// The auto-increment identity column, when its value is still unset.
    fn generated_identity(&self) -> Option<String> {
        let column = self.record.primary_column()?;
        let definition = self.record.table().column(column)?;
        (definition.is_auto_increment() && self.record.current(column).is_null())
            .then(|| column.to_string())
    }

    async fn run(
        &mut self,
        verb: QueryVerb,
        sql: String,
        params: Vec<SqlValue>,
    ) -> Result<QueryResult> {
        self.record.model_mut().before_query(verb);
        debug!(sql = %sql, params = params.len(), "Executing SQL");
        let outcome = self
            .executor
            .execute(&sql, &params)
            .await
            .map_err(|source| OrmError::QueryFailed {
                verb,
                table: self.record.table().name().to_string(),
                source,
            })?;
        Ok(QueryResult {
            verb,
            sql,
            params,
            rows_affected: outcome.rows_affected,
            last_insert_id: outcome.last_insert_id,
        })
    }

    fn finish<F: FnOnce(&QueryResult)>(
        &mut self,
        verb: QueryVerb,
        result: &QueryResult,
        callback: F,
    ) -> bool {
        self.record.model_mut().after_query(verb);
        callback(result);
        result.rows_affected >= 1
    }

    fn error(&self, verb: QueryVerb, message: impl Into<String>) -> OrmError {
        OrmError::query(verb, self.record.table().name(), message)
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_names() {
        assert_eq!(QueryVerb::Insert.to_string(), "INSERT");
        assert_eq!(QueryVerb::Save.to_string(), "SAVE");
        assert_eq!(
            serde_json::to_string(&QueryVerb::Delete).unwrap(),
            "\"DELETE\""
        );
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(0), "");
        assert_eq!(placeholders(3), "?, ?, ?");
    }
}
