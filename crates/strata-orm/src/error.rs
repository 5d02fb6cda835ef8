//! Error types for records, queries and locks.

use strata_schema::SchemaError;
use thiserror::Error;

use crate::query::QueryVerb;

/// Boxed error returned by an [`crate::Executor`].
pub type ExecError = Box<dyn std::error::Error + Send + Sync>;

/// ORM-specific errors.
#[derive(Debug, Error)]
pub enum OrmError {
    /// Table or column declaration error.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A value does not fit the column it is assigned to.
    #[error("Property \"{property}\" of model \"{model}\" {message}")]
    BadValue {
        /// Record type or table name.
        model: String,
        /// Column or property name.
        property: String,
        /// What is wrong with the value.
        message: String,
    },

    /// A loaded row lacks a column of its table.
    #[error("Missing column \"{column}\" in row loaded for table \"{table}\"")]
    MissingColumn {
        /// Table name.
        table: String,
        /// Missing column.
        column: String,
    },

    /// A query cannot be compiled for this record.
    #[error("{verb} query on \"{table}\": {message}")]
    Query {
        /// Statement kind.
        verb: QueryVerb,
        /// Table name.
        table: String,
        /// What went wrong.
        message: String,
    },

    /// The executor reported a failure.
    #[error("\"{verb}\" query failed on \"{table}\" table: {source}")]
    QueryFailed {
        /// Statement kind.
        verb: QueryVerb,
        /// Table name.
        table: String,
        /// Underlying error.
        source: ExecError,
    },

    /// A query instance runs a single statement.
    #[error("Query on \"{0}\" was already executed")]
    QueryReused(String),

    /// Lock could not be obtained.
    #[error("Lock on \"{table}\": {message}")]
    Lock {
        /// Table name.
        table: String,
        /// What went wrong.
        message: String,
    },

    /// No table registered under this name.
    #[error("Table \"{0}\" is not registered")]
    TableNotFound(String),

    /// A table was registered twice.
    #[error("Table \"{0}\" is already registered")]
    DuplicateTable(String),

    /// The record type does not match the table's bound type.
    #[error("Table \"{table}\" is bound to {expected}, not {found}")]
    ModelMismatch {
        /// Table name.
        table: String,
        /// Bound record type.
        expected: String,
        /// Requested record type.
        found: String,
    },

    /// The record type does not allow snapshots.
    #[error("Records of {0} cannot be snapshotted")]
    NotSerializable(String),

    /// Snapshot could not be restored.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OrmError {
    pub(crate) fn query(verb: QueryVerb, table: &str, message: impl Into<String>) -> Self {
        Self::Query {
            verb,
            table: table.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn lock(table: &str, message: impl Into<String>) -> Self {
        Self::Lock {
            table: table.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for ORM operations.
pub type Result<T> = std::result::Result<T, OrmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_failed_names_verb_and_table() {
        let err = OrmError::QueryFailed {
            verb: QueryVerb::Update,
            table: "users".to_string(),
            source: "disk full".into(),
        };
        assert_eq!(
            err.to_string(),
            "\"UPDATE\" query failed on \"users\" table: disk full"
        );
    }

    #[test]
    fn test_schema_errors_convert() {
        let err: OrmError = SchemaError::DuplicateColumn("id".to_string()).into();
        assert!(matches!(err, OrmError::Schema(_)));
        assert_eq!(err.to_string(), "Column \"id\" is already declared");
    }
}
