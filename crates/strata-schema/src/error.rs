//! Error types for schema declaration and DDL compilation.

use thiserror::Error;

/// Errors raised while declaring or compiling a table schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A column rejected one of its own settings.
    #[error("{message} for column \"{column}\"")]
    Column {
        /// Column name.
        column: String,
        /// What went wrong.
        message: String,
    },

    /// A table, column or constraint name is not a valid identifier.
    #[error("Invalid {kind} name \"{name}\"")]
    InvalidIdentifier {
        /// What the identifier names (table, column, constraint).
        kind: &'static str,
        /// The rejected name.
        name: String,
    },

    /// The storage engine name is not alphabetic.
    #[error("Invalid engine \"{0}\"")]
    InvalidEngine(String),

    /// A column with this name was already declared.
    #[error("Column \"{0}\" is already declared")]
    DuplicateColumn(String),

    /// A constraint with this name was already declared.
    #[error("Constraint \"{0}\" is already declared")]
    DuplicateConstraint(String),

    /// A reference to a column that was never declared.
    #[error("Column \"{column}\" is not declared in table \"{table}\"")]
    UndefinedColumn {
        /// Table being declared.
        table: String,
        /// Missing column.
        column: String,
    },

    /// A constraint is incomplete or cannot be expressed.
    #[error("Constraint \"{name}\": {message}")]
    Constraint {
        /// Constraint name.
        name: String,
        /// What went wrong.
        message: String,
    },

    /// No dialect is registered under this driver name.
    #[error("Unsupported dialect \"{0}\"")]
    UnsupportedDialect(String),

    /// Only `\n` and `\r\n` are accepted line endings.
    #[error("Invalid line ending {0:?}")]
    InvalidLineEnding(String),

    /// Unknown text/blob size class.
    #[error("Invalid size class \"{0}\"")]
    InvalidSizeClass(String),
}

impl SchemaError {
    /// Builds a column-scoped error.
    pub fn column(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Column {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Builds a constraint-scoped error.
    pub fn constraint(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Constraint {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_error_names_column() {
        let err = SchemaError::column("email", "Length must be between 1 and 65535");
        assert_eq!(
            err.to_string(),
            "Length must be between 1 and 65535 for column \"email\""
        );
    }

    #[test]
    fn test_undefined_column_message() {
        let err = SchemaError::UndefinedColumn {
            table: "users".to_string(),
            column: "id".to_string(),
        };
        assert!(err.to_string().contains("\"users\""));
        assert!(err.to_string().contains("\"id\""));
    }
}
