//! The record type capability.
//!
//! A [`Model`] is the typed payload of a [`crate::Record`]. It may expose some
//! columns as its own fields and react to lifecycle events; every method has
//! a no-op default, so `impl Model for MyType {}` is enough to start with.
//!
//! ```rust
//! use strata_orm::{FieldWrite, Model};
//! use strata_schema::{SqlValue, ToSqlValue};
//!
//! #[derive(Default)]
//! struct User {
//!     email: Option<String>,
//! }
//!
//! impl Model for User {
//!     fn field(&self, column: &str) -> Option<SqlValue> {
//!         match column {
//!             "email" => Some(self.email.clone().to_sql_value()),
//!             _ => None,
//!         }
//!     }
//!
//!     fn set_field(&mut self, column: &str, value: &SqlValue) -> FieldWrite {
//!         match (column, value) {
//!             ("email", SqlValue::Text(s)) => {
//!                 self.email = Some(s.clone());
//!                 FieldWrite::Stored
//!             }
//!             ("email", SqlValue::Null) => {
//!                 self.email = None;
//!                 FieldWrite::Stored
//!             }
//!             ("email", other) => FieldWrite::Rejected(format!("cannot hold {other}")),
//!             _ => FieldWrite::NotAField,
//!         }
//!     }
//! }
//! ```

use strata_schema::SqlValue;

use crate::query::QueryVerb;

/// Result of offering a value to a model field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldWrite {
    /// The model stored the value in its own field.
    Stored,
    /// The model has no field for this column; the record keeps the value.
    NotAField,
    /// The model has the field but refuses the value.
    Rejected(String),
}

/// Typed payload and lifecycle hooks of a record.
pub trait Model: Default {
    /// Whether records of this type may be snapshotted and restored.
    const SERIALIZABLE: bool = false;

    /// Current value of `column` when the model holds it in a field.
    fn field(&self, _column: &str) -> Option<SqlValue> {
        None
    }

    /// Offers a value for `column` to the model's own field.
    fn set_field(&mut self, _column: &str, _value: &SqlValue) -> FieldWrite {
        FieldWrite::NotAField
    }

    /// Called once the record was constructed and its row loaded.
    fn on_load(&mut self) {}

    /// Called before a query verb executes.
    fn before_query(&mut self, _verb: QueryVerb) {}

    /// Called after a query verb executed successfully.
    fn after_query(&mut self, _verb: QueryVerb) {}

    /// Called before a snapshot of the record is taken.
    fn before_snapshot(&self) {}

    /// Called after a record was restored from a snapshot.
    fn on_restore(&mut self) {}
}

/// Untyped records keep every value in the record's own store.
impl Model for () {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_model_has_no_fields() {
        let mut unit = ();
        assert_eq!(unit.field("id"), None);
        assert_eq!(unit.set_field("id", &SqlValue::Int(1)), FieldWrite::NotAField);
        assert!(!<() as Model>::SERIALIZABLE);
    }
}
