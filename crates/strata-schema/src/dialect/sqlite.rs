//! SQLite dialect.

use super::{referenced_table, Dialect, DialectKind};
use crate::column::{Column, ColumnKind};
use crate::constraint::{ForeignKey, UniqueKey};
use crate::error::{Result, SchemaError};
use crate::table::Table;
use crate::value::quote_literal;

/// SQLite dialect for SQL generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Sqlite
    }

    fn quote_char(&self) -> char {
        '"'
    }

    fn column_type(&self, column: &Column) -> String {
        // SQLite has dynamic typing with type affinity
        match column.kind() {
            ColumnKind::Integer { .. } => "integer".to_string(),
            ColumnKind::String { .. } | ColumnKind::Text(_) => "TEXT".to_string(),
            ColumnKind::Binary { .. } | ColumnKind::Blob(_) => "BLOB".to_string(),
            ColumnKind::Decimal(_) => "NUMERIC".to_string(),
            ColumnKind::Float(_) | ColumnKind::Double(_) => "REAL".to_string(),
            ColumnKind::Enum(options) => {
                let list: Vec<String> = options.iter().map(|o| quote_literal(o)).collect();
                format!(
                    "TEXT CHECK({} IN ({}))",
                    self.quote_identifier(column.name()),
                    list.join(",")
                )
            }
        }
    }

    fn autoincrement_keyword(&self) -> &'static str {
        " AUTOINCREMENT"
    }

    // AUTOINCREMENT is only accepted on a bare `integer PRIMARY KEY`.
    fn writes_unsigned(&self, column: &Column) -> bool {
        column.is_unsigned() && !column.is_auto_increment()
    }

    fn inline_unique(&self) -> bool {
        true
    }

    fn unique_key(&self, key: &UniqueKey) -> String {
        format!(
            "CONSTRAINT {} UNIQUE ({})",
            self.quote_identifier(key.name()),
            self.column_list(key.columns())
        )
    }

    fn foreign_key(&self, fk: &ForeignKey) -> Result<String> {
        if let Some(db) = fk.database() {
            return Err(SchemaError::constraint(
                fk.column(),
                format!("SQLite cannot reference a table in database \"{db}\""),
            ));
        }
        Ok(format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}",
            self.quote_identifier(&format!("cnstrnt_{}_frgn", fk.column())),
            self.quote_identifier(fk.column()),
            referenced_table(self, fk)?
        ))
    }

    fn table_suffix(&self, _table: &Table) -> String {
        String::from(");")
    }

    fn upsert_clause(&self, conflict_column: &str, columns: &[&str]) -> String {
        let key = self.quote_identifier(conflict_column);
        if columns.is_empty() {
            return format!(" ON CONFLICT({key}) DO NOTHING");
        }
        let sets: Vec<String> = columns
            .iter()
            .map(|c| {
                let c = self.quote_identifier(c);
                format!("{c}=excluded.{c}")
            })
            .collect();
        format!(" ON CONFLICT({key}) DO UPDATE SET {}", sets.join(", "))
    }

    fn upsert_rebinds_values(&self) -> bool {
        false
    }

    // SQLite has no row locks; exclusion comes from the enclosing transaction.
    fn row_lock_suffix(&self) -> &'static str {
        ""
    }
}
