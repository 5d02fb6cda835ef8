//! Table-bound records with dirty tracking.

use std::any::type_name;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use strata_schema::{Column, FromSqlValue, SqlValue, Table, ToSqlValue};

use crate::error::{OrmError, Result};
use crate::executor::{Executor, Row};
use crate::model::{FieldWrite, Model};
use crate::query::Query;

/// Pending writes of a record, in column declaration order.
pub type Changes = Vec<(String, SqlValue)>;

/// One row of a [`Table`]: the typed model, values the model has no field
/// for, and the values last loaded or persisted.
///
/// ```rust
/// use std::sync::Arc;
/// use strata_orm::Record;
/// use strata_schema::{SqlValue, Table};
///
/// let table = Arc::new(Table::declare("tags")?.build(|cols, _| {
///     cols.int("id")?;
///     cols.string("label")?.length(32)?;
///     cols.primary_key("id")?;
///     Ok(())
/// })?);
///
/// let row = [
///     ("id".to_string(), SqlValue::Int(1)),
///     ("label".to_string(), SqlValue::Text("rust".into())),
/// ]
/// .into_iter()
/// .collect();
///
/// let mut tag: Record = Record::new(table, Some(row))?;
/// assert!(tag.difference()?.is_empty());
///
/// tag.set("label", "sql")?;
/// assert_eq!(tag.difference()?, vec![("label".to_string(), SqlValue::Text("sql".into()))]);
/// # Ok::<(), strata_orm::OrmError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Record<M: Model = ()> {
    table: Arc<Table>,
    model: M,
    props: HashMap<String, SqlValue>,
    original: Option<HashMap<String, SqlValue>>,
    identity: OnceLock<Option<String>>,
}

impl<M: Model> Record<M> {
    /// Binds a new record to `table`, loading `row` when given.
    pub fn new(table: Arc<Table>, row: Option<Row>) -> Result<Self> {
        let mut record = Self::bind(table)?;
        if let Some(row) = row {
            record.load(row)?;
        }
        record.model.on_load();
        Ok(record)
    }

    /// Binds an empty record after checking the table's record type.
    pub(crate) fn bind(table: Arc<Table>) -> Result<Self> {
        if let Some(expected) = table.model() {
            let found = type_name::<M>();
            if expected != found {
                return Err(OrmError::ModelMismatch {
                    table: table.name().to_string(),
                    expected: expected.to_string(),
                    found: found.to_string(),
                });
            }
        }
        Ok(Self {
            table,
            model: M::default(),
            props: HashMap::new(),
            original: None,
            identity: OnceLock::new(),
        })
    }

    /// Replaces the record's values with a row read from the database.
    ///
    /// Every column must be present; unknown keys are ignored. Values are
    /// coerced to their column's scalar kind and become the original values.
    pub fn load(&mut self, mut row: Row) -> Result<()> {
        let mut values = Vec::with_capacity(self.table.columns().len());
        for column in self.table.columns() {
            let raw = row.remove(column.name()).ok_or_else(|| OrmError::MissingColumn {
                table: self.table.name().to_string(),
                column: column.name().to_string(),
            })?;
            let value = column
                .coerce(raw)
                .map_err(|message| self.bad_value(column.name(), message))?;
            values.push((column.name().to_string(), value));
        }

        // A rejected value must leave this record untouched.
        let mut scratch = M::default();
        for (name, value) in &values {
            if let FieldWrite::Rejected(message) = scratch.set_field(name, value) {
                return Err(self.bad_value(name, message));
            }
        }

        let mut original = HashMap::with_capacity(values.len());
        for (name, value) in values {
            self.write(&name, value.clone())?;
            original.insert(name, value);
        }
        self.original = Some(original);
        Ok(())
    }

    /// Assigns a column value.
    ///
    /// The value is checked against the column when the diff is computed,
    /// not here.
    pub fn set(&mut self, column: &str, value: impl ToSqlValue) -> Result<()> {
        if self.table.column(column).is_none() {
            return Err(self.bad_value(column, "is not a column of this table"));
        }
        self.write(column, value.to_sql_value())
    }

    /// Current value of a column, `None` when the table has no such column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<SqlValue> {
        self.table.column(column)?;
        Some(self.current(column))
    }

    /// Current value of a column converted to `T`.
    pub fn get_as<T: FromSqlValue>(&self, column: &str) -> Result<T> {
        let value = self
            .get(column)
            .ok_or_else(|| self.bad_value(column, "is not a column of this table"))?;
        T::from_sql_value(&value).ok_or_else(|| {
            self.bad_value(
                column,
                format!("cannot be read as {} from {}", type_name::<T>(), value.type_name()),
            )
        })
    }

    /// Value of a column when the record was last loaded or persisted.
    #[must_use]
    pub fn original(&self, column: &str) -> Option<&SqlValue> {
        self.original.as_ref()?.get(column)
    }

    /// Whether the record has no loaded or persisted state.
    #[must_use]
    pub const fn is_fresh(&self) -> bool {
        self.original.is_none()
    }

    /// The table this record belongs to.
    #[must_use]
    pub const fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// The typed model.
    #[must_use]
    pub const fn model(&self) -> &M {
        &self.model
    }

    /// Mutable access to the typed model.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Name of the column identifying this record: the primary key, else the
    /// first unique column.
    #[must_use]
    pub fn primary_column(&self) -> Option<&str> {
        self.identity
            .get_or_init(|| self.table.identity_column().map(|c| c.name().to_string()))
            .as_deref()
    }

    /// Columns whose current value differs from the original one.
    ///
    /// Every current value is validated first. Columns the database fills in
    /// (auto-increment or with a default) may stay NULL until a value for
    /// them was loaded or persisted; they are left out.
    pub fn difference(&self) -> Result<Changes> {
        let mut changes = Changes::new();
        for column in self.table.columns() {
            let value = self.current(column.name());
            let original = self.original(column.name());
            if !(value.is_null() && original.is_none() && database_filled(column)) {
                column
                    .check_value(&value)
                    .map_err(|message| self.bad_value(column.name(), message))?;
            }
            let changed = match original {
                None => !value.is_null(),
                Some(original) => *original != value,
            };
            if changed {
                changes.push((column.name().to_string(), value));
            }
        }
        Ok(changes)
    }

    /// Starts a query writing this record through `executor`.
    pub fn query<'r, E: Executor>(&'r mut self, executor: &'r E) -> Result<Query<'r, M, E>> {
        Query::new(self, executor)
    }

    /// Record type name used in error messages: the bound model, else the
    /// table name.
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.table.model().unwrap_or_else(|| self.table.name())
    }

    pub(crate) fn current(&self, column: &str) -> SqlValue {
        self.model
            .field(column)
            .or_else(|| self.props.get(column).cloned())
            .unwrap_or(SqlValue::Null)
    }

    pub(crate) fn write(&mut self, column: &str, value: SqlValue) -> Result<()> {
        match self.model.set_field(column, &value) {
            FieldWrite::Stored => {
                self.props.remove(column);
                Ok(())
            }
            FieldWrite::NotAField => {
                self.props.insert(column.to_string(), value);
                Ok(())
            }
            FieldWrite::Rejected(message) => Err(self.bad_value(column, message)),
        }
    }

    /// Merges persisted values into the original snapshot.
    pub(crate) fn absorb(&mut self, written: impl IntoIterator<Item = (String, SqlValue)>) {
        self.original.get_or_insert_with(HashMap::new).extend(written);
    }

    pub(crate) fn forget(&mut self) {
        self.original = None;
    }

    pub(crate) fn set_original(&mut self, original: Option<HashMap<String, SqlValue>>) {
        self.original = original;
    }

    pub(crate) fn originals(&self) -> Option<&HashMap<String, SqlValue>> {
        self.original.as_ref()
    }

    pub(crate) fn bad_value(&self, column: &str, message: impl Into<String>) -> OrmError {
        OrmError::BadValue {
            model: self.model_name().to_string(),
            property: column.to_string(),
            message: message.into(),
        }
    }
}

fn database_filled(column: &Column) -> bool {
    column.is_auto_increment() || column.has_default()
}
