//! Finalized table definitions.

use crate::column::{Column, ColumnKind};
use crate::columns::Columns;
use crate::constraint::{Constraint, Constraints};
use crate::error::{Result, SchemaError};
use crate::ident::{check_engine, check_identifier};

/// Storage engine used when none is given.
pub const DEFAULT_ENGINE: &str = "InnoDB";

/// A table definition: name, engine, columns and constraints.
///
/// Built once through [`Table::declare`] and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    engine: String,
    model: Option<&'static str>,
    columns: Columns,
    constraints: Constraints,
}

/// Table settings collected before the schema callback runs.
#[derive(Debug, Clone)]
pub struct TableDeclaration {
    name: String,
    engine: String,
    model: Option<&'static str>,
}

impl TableDeclaration {
    /// Sets the storage engine (alphabetic only).
    pub fn engine(mut self, engine: &str) -> Result<Self> {
        check_engine(engine)?;
        self.engine = engine.to_string();
        Ok(self)
    }

    /// Binds the record type whose instances represent rows of this table.
    #[must_use]
    pub fn model<M: ?Sized + 'static>(mut self) -> Self {
        self.model = Some(std::any::type_name::<M>());
        self
    }

    /// Runs `schema` once and validates the result.
    pub fn build<F>(self, schema: F) -> Result<Table>
    where
        F: FnOnce(&mut Columns, &mut Constraints) -> Result<()>,
    {
        let mut columns = Columns::new(&self.name);
        let mut constraints = Constraints::new();
        schema(&mut columns, &mut constraints)?;

        let table = Table {
            name: self.name,
            engine: self.engine,
            model: self.model,
            columns,
            constraints,
        };
        table.check_columns()?;
        table.check_constraints()?;
        Ok(table)
    }
}

impl Table {
    /// Starts declaring a table named `name`.
    pub fn declare(name: &str) -> Result<TableDeclaration> {
        check_identifier("table", name)?;
        Ok(TableDeclaration {
            name: name.to_string(),
            engine: DEFAULT_ENGINE.to_string(),
            model: None,
        })
    }

    /// Rejects columns whose type settings are incomplete.
    pub(crate) fn check_columns(&self) -> Result<()> {
        for column in self.columns.iter() {
            if matches!(column.kind(), ColumnKind::Enum(options) if options.is_empty()) {
                return Err(SchemaError::column(
                    column.name(),
                    "Enum requires at least one option",
                ));
            }
        }
        Ok(())
    }

    fn check_constraints(&self) -> Result<()> {
        for constraint in self.constraints.iter() {
            match constraint {
                Constraint::Unique(key) => {
                    if key.columns().is_empty() {
                        return Err(SchemaError::constraint(key.name(), "has no columns"));
                    }
                    for column in key.columns() {
                        self.require_column(column)?;
                    }
                }
                Constraint::ForeignKey(fk) => {
                    self.require_column(fk.column())?;
                    if fk.table().is_none() || fk.referenced_column().is_none() {
                        return Err(SchemaError::constraint(
                            fk.column(),
                            "foreign key has no referenced table",
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn require_column(&self, column: &str) -> Result<()> {
        if self.columns.contains(column) {
            Ok(())
        } else {
            Err(SchemaError::UndefinedColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn engine(&self) -> &str {
        &self.engine
    }

    /// Type name of the bound record type, if any.
    #[must_use]
    pub const fn model(&self) -> Option<&'static str> {
        self.model
    }

    #[must_use]
    pub const fn columns(&self) -> &Columns {
        &self.columns
    }

    #[must_use]
    pub const fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// The column identifying a row: the primary key, else the first column
    /// declared unique.
    #[must_use]
    pub fn identity_column(&self) -> Option<&Column> {
        self.columns
            .primary_key_column()
            .or_else(|| self.columns.iter().find(|c| c.is_unique()))
    }

    /// Whether `name` is the primary key or a unique column.
    #[must_use]
    pub fn is_key_column(&self, name: &str) -> bool {
        self.columns.is_primary_key(name) || self.column(name).is_some_and(Column::is_unique)
    }
}
