//! Dialect-specific SQL generation.
//!
//! Each supported database family implements [`Dialect`]; [`DialectKind`]
//! names them and resolves driver names.

mod mysql;
mod sqlite;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use mysql::MySqlDialect;
pub use sqlite::SqliteDialect;

use crate::column::Column;
use crate::constraint::{ForeignKey, UniqueKey};
use crate::error::{Result, SchemaError};
use crate::table::Table;

/// The supported database families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DialectKind {
    /// MySQL and MariaDB.
    #[default]
    MySql,
    /// SQLite.
    Sqlite,
}

impl DialectKind {
    /// Returns the SQL generator for this dialect.
    #[must_use]
    pub fn dialect(self) -> &'static dyn Dialect {
        static MYSQL: MySqlDialect = MySqlDialect::new();
        static SQLITE: SqliteDialect = SqliteDialect::new();
        match self {
            Self::MySql => &MYSQL,
            Self::Sqlite => &SQLITE,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }
}

impl FromStr for DialectKind {
    type Err = SchemaError;

    /// Accepts `mysql`, `mariadb`, `sqlite` and `sqlite3`, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            _ => Err(SchemaError::UnsupportedDialect(s.to_string())),
        }
    }
}

impl TryFrom<String> for DialectKind {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DialectKind> for String {
    fn from(kind: DialectKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SQL generation that differs between database families.
pub trait Dialect: Send + Sync {
    /// Which family this is.
    fn kind(&self) -> DialectKind;

    /// Identifier quote character.
    fn quote_char(&self) -> char;

    /// Quotes an identifier, doubling embedded quote characters.
    fn quote_identifier(&self, name: &str) -> String {
        let q = self.quote_char();
        let escaped = name.replace(q, &format!("{q}{q}"));
        format!("{q}{escaped}{q}")
    }

    /// Type clause of a column definition.
    fn column_type(&self, column: &Column) -> String;

    /// Keyword appended to auto-increment columns, with leading space.
    fn autoincrement_keyword(&self) -> &'static str;

    /// Whether `UNSIGNED` is written for this column.
    fn writes_unsigned(&self, column: &Column) -> bool {
        column.is_unsigned()
    }

    /// Single-column unique keys are written on the column line when true,
    /// and as trailing `UNIQUE KEY` lines when false.
    fn inline_unique(&self) -> bool;

    /// Charset/collation clause of a column definition, with leading space.
    fn charset_clause(&self, _column: &Column) -> String {
        String::new()
    }

    /// Trailing line for a column declared unique, when not written inline.
    fn unique_column_key(&self, column: &Column) -> String {
        format!("UNIQUE KEY ({})", self.quote_identifier(column.name()))
    }

    /// Definition of a composite unique key.
    fn unique_key(&self, key: &UniqueKey) -> String;

    /// Definition of a foreign key.
    fn foreign_key(&self, fk: &ForeignKey) -> Result<String>;

    /// Text closing the CREATE TABLE body.
    fn table_suffix(&self, table: &Table) -> String;

    /// Comma-separated quoted column list.
    fn column_list(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Tail of an `INSERT` turning it into an upsert keyed on
    /// `conflict_column`, updating `columns` on conflict.
    fn upsert_clause(&self, conflict_column: &str, columns: &[&str]) -> String;

    /// Whether the upsert clause binds the updated values a second time.
    fn upsert_rebinds_values(&self) -> bool;

    /// Suffix making a `SELECT` take a row lock, with leading space.
    fn row_lock_suffix(&self) -> &'static str;
}

/// Writes a referenced table, optionally qualified by database.
pub(crate) fn referenced_table(dialect: &dyn Dialect, fk: &ForeignKey) -> Result<String> {
    let table = fk
        .table()
        .ok_or_else(|| SchemaError::constraint(fk.column(), "foreign key has no referenced table"))?;
    let column = fk
        .referenced_column()
        .ok_or_else(|| SchemaError::constraint(fk.column(), "foreign key has no referenced column"))?;
    let qualified = match fk.database() {
        Some(db) => format!(
            "{}.{}",
            dialect.quote_identifier(db),
            dialect.quote_identifier(table)
        ),
        None => dialect.quote_identifier(table),
    };
    Ok(format!("{qualified}({})", dialect.quote_identifier(column)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_driver_names() {
        assert_eq!("MySQL".parse::<DialectKind>().unwrap(), DialectKind::MySql);
        assert_eq!("mariadb".parse::<DialectKind>().unwrap(), DialectKind::MySql);
        assert_eq!("sqlite3".parse::<DialectKind>().unwrap(), DialectKind::Sqlite);
    }

    #[test]
    fn test_unknown_driver_fails_fast() {
        assert_eq!(
            "pgsql".parse::<DialectKind>().unwrap_err(),
            SchemaError::UnsupportedDialect("pgsql".to_string())
        );
    }

    #[test]
    fn test_dialect_lookup() {
        assert_eq!(DialectKind::Sqlite.dialect().kind(), DialectKind::Sqlite);
        assert_eq!(DialectKind::MySql.dialect().kind(), DialectKind::MySql);
    }

    #[test]
    fn test_serde_uses_driver_names() {
        let kind: DialectKind = serde_json::from_str("\"sqlite\"").unwrap();
        assert_eq!(kind, DialectKind::Sqlite);
        assert!(serde_json::from_str::<DialectKind>("\"oracle\"").is_err());
        assert_eq!(serde_json::to_string(&DialectKind::MySql).unwrap(), "\"mysql\"");
    }
}
