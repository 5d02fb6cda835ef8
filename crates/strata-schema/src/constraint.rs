//! Table-level constraints: composite unique keys and foreign keys.

use crate::error::{Result, SchemaError};
use crate::ident::{check_constraint_name, check_identifier};

/// A named unique key over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueKey {
    name: String,
    columns: Vec<String>,
}

impl UniqueKey {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Covered columns, in key order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// A foreign key from a local column to a column of another table.
///
/// The constraint is named after its local column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    column: String,
    table: Option<String>,
    referenced_column: Option<String>,
    database: Option<String>,
}

impl ForeignKey {
    /// Local column.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Referenced table, once set.
    #[must_use]
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Referenced column, once set.
    #[must_use]
    pub fn referenced_column(&self) -> Option<&str> {
        self.referenced_column.as_deref()
    }

    /// Database qualifying the referenced table.
    #[must_use]
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }
}

/// A table constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Composite unique key.
    Unique(UniqueKey),
    /// Foreign key.
    ForeignKey(ForeignKey),
}

impl Constraint {
    /// Constraint name; a foreign key is named after its column.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Unique(key) => &key.name,
            Self::ForeignKey(fk) => &fk.column,
        }
    }
}

/// Handle returned by [`Constraints::unique_key`].
#[derive(Debug)]
pub struct UniqueKeyBuilder<'a>(&'a mut UniqueKey);

impl UniqueKeyBuilder<'_> {
    /// Sets the covered columns.
    pub fn columns<S: AsRef<str>>(self, columns: &[S]) -> Result<Self> {
        let mut list = Vec::with_capacity(columns.len());
        for column in columns {
            let column = column.as_ref();
            check_identifier("column", column)?;
            if !list.iter().any(|c| c == column) {
                list.push(column.to_string());
            }
        }
        self.0.columns = list;
        Ok(self)
    }
}

/// Handle returned by [`Constraints::foreign_key`].
#[derive(Debug)]
pub struct ForeignKeyBuilder<'a>(&'a mut ForeignKey);

impl ForeignKeyBuilder<'_> {
    /// Sets the referenced table and column.
    pub fn table(self, table: &str, column: &str) -> Result<Self> {
        check_identifier("table", table)?;
        check_identifier("column", column)?;
        self.0.table = Some(table.to_string());
        self.0.referenced_column = Some(column.to_string());
        Ok(self)
    }

    /// Qualifies the referenced table with a database name (MySQL only).
    pub fn database(self, database: &str) -> Result<Self> {
        check_identifier("database", database)?;
        self.0.database = Some(database.to_string());
        Ok(self)
    }
}

/// The constraints of one table, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraints {
    constraints: Vec<Constraint>,
}

impl Constraints {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn check_new_name(&self, name: &str) -> Result<()> {
        check_constraint_name(name)?;
        if self.get(name).is_some() {
            return Err(SchemaError::DuplicateConstraint(name.to_string()));
        }
        Ok(())
    }

    /// Declares a named unique key; add columns with
    /// [`UniqueKeyBuilder::columns`].
    pub fn unique_key(&mut self, name: &str) -> Result<UniqueKeyBuilder<'_>> {
        self.check_new_name(name)?;
        self.constraints.push(Constraint::Unique(UniqueKey {
            name: name.to_string(),
            columns: Vec::new(),
        }));
        match self.constraints.last_mut() {
            Some(Constraint::Unique(key)) => Ok(UniqueKeyBuilder(key)),
            _ => Err(SchemaError::constraint(name, "could not be declared")),
        }
    }

    /// Declares a foreign key on local column `column`.
    pub fn foreign_key(&mut self, column: &str) -> Result<ForeignKeyBuilder<'_>> {
        check_identifier("column", column)?;
        self.check_new_name(column)?;
        self.constraints.push(Constraint::ForeignKey(ForeignKey {
            column: column.to_string(),
            table: None,
            referenced_column: None,
            database: None,
        }));
        match self.constraints.last_mut() {
            Some(Constraint::ForeignKey(fk)) => Ok(ForeignKeyBuilder(fk)),
            _ => Err(SchemaError::constraint(column, "could not be declared")),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_key_columns() {
        let mut constraints = Constraints::new();
        constraints
            .unique_key("uk_name")
            .unwrap()
            .columns(&["first", "last", "first"])
            .unwrap();
        let Some(Constraint::Unique(key)) = constraints.get("uk_name") else {
            panic!("unique key missing");
        };
        assert_eq!(key.columns(), ["first", "last"]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut constraints = Constraints::new();
        constraints.unique_key("uk").unwrap();
        assert_eq!(
            constraints.unique_key("uk").unwrap_err(),
            SchemaError::DuplicateConstraint("uk".to_string())
        );
    }

    #[test]
    fn test_foreign_key_named_after_column() {
        let mut constraints = Constraints::new();
        constraints
            .foreign_key("user_id")
            .unwrap()
            .table("users", "id")
            .unwrap()
            .database("accounts")
            .unwrap();
        let Some(Constraint::ForeignKey(fk)) = constraints.get("user_id") else {
            panic!("foreign key missing");
        };
        assert_eq!(fk.table(), Some("users"));
        assert_eq!(fk.referenced_column(), Some("id"));
        assert_eq!(fk.database(), Some("accounts"));
    }

    #[test]
    fn test_invalid_names() {
        let mut constraints = Constraints::new();
        assert!(constraints.unique_key("uk name").is_err());
        assert!(constraints.foreign_key("user-id").is_err());
    }
}
