//! Named table definitions shared by the records built from them.

use std::collections::BTreeMap;
use std::sync::Arc;

use strata_schema::Table;
use tracing::info;

use crate::error::{OrmError, Result};
use crate::executor::Row;
use crate::model::Model;
use crate::record::Record;

/// Tables by name, built once at startup and passed to whoever creates
/// records.
#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    tables: BTreeMap<String, Arc<Table>>,
}

impl TableRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table. Names are unique.
    pub fn register(&mut self, table: Table) -> Result<Arc<Table>> {
        if self.tables.contains_key(table.name()) {
            return Err(OrmError::DuplicateTable(table.name().to_string()));
        }
        info!(
            table = %table.name(),
            columns = table.columns().len(),
            "Registered table"
        );
        let table = Arc::new(table);
        self.tables
            .insert(table.name().to_string(), Arc::clone(&table));
        Ok(table)
    }

    /// Looks up a table by name.
    pub fn get(&self, name: &str) -> Result<Arc<Table>> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| OrmError::TableNotFound(name.to_string()))
    }

    /// Whether a table is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Creates a record of the named table, loading `row` when given.
    pub fn record<M: Model>(&self, name: &str, row: Option<Row>) -> Result<Record<M>> {
        Record::new(self.get(name)?, row)
    }

    /// Registered tables in name order.
    pub fn tables(&self) -> impl Iterator<Item = &Arc<Table>> {
        self.tables.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str) -> Table {
        Table::declare(name)
            .unwrap()
            .build(|cols, _| {
                cols.int("id")?;
                cols.primary_key("id")?;
                Ok(())
            })
            .unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = TableRegistry::new();
        registry.register(table("users")).unwrap();
        registry.register(table("teams")).unwrap();

        assert!(registry.contains("users"));
        assert_eq!(registry.get("teams").unwrap().name(), "teams");
        let names: Vec<&str> = registry.tables().map(|t| t.name()).collect();
        assert_eq!(names, vec!["teams", "users"]);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = TableRegistry::new();
        registry.register(table("users")).unwrap();
        assert!(matches!(
            registry.register(table("users")),
            Err(OrmError::DuplicateTable(name)) if name == "users"
        ));
    }

    #[test]
    fn test_unknown_table() {
        let registry = TableRegistry::new();
        assert!(matches!(
            registry.record::<()>("ghost", None),
            Err(OrmError::TableNotFound(_))
        ));
    }

    #[test]
    fn test_record_from_registry() {
        let mut registry = TableRegistry::new();
        registry.register(table("users")).unwrap();
        let row = [("id".to_string(), strata_schema::SqlValue::Int(3))]
            .into_iter()
            .collect();
        let record = registry.record::<()>("users", Some(row)).unwrap();
        assert_eq!(record.get_as::<i64>("id").unwrap(), 3);
    }
}
