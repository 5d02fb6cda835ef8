//! CREATE TABLE compiler.
//!
//! ```rust
//! use strata_schema::{DialectKind, Table, TableBuilder};
//!
//! let table = Table::declare("users")?.build(|cols, _| {
//!     cols.int("id")?.auto_increment();
//!     cols.string("email")?.unique();
//!     cols.primary_key("id")
//! })?;
//!
//! let sql = TableBuilder::new(&table)
//!     .dialect(DialectKind::Sqlite)
//!     .if_not_exists()
//!     .compile()?;
//! assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"users\" ("));
//! # Ok::<(), strata_schema::SchemaError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::column::Column;
use crate::constraint::Constraint;
use crate::dialect::{Dialect, DialectKind};
use crate::error::{Result, SchemaError};
use crate::table::Table;
use crate::value::quote_literal;

/// Line terminator used between statement lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

impl FromStr for LineEnding {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "\n" => Ok(Self::Lf),
            "\r\n" => Ok(Self::CrLf),
            other => Err(SchemaError::InvalidLineEnding(other.to_string())),
        }
    }
}

impl TryFrom<String> for LineEnding {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<LineEnding> for String {
    fn from(eol: LineEnding) -> Self {
        eol.as_str().to_string()
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiler settings, loadable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Emit `DROP TABLE IF EXISTS` first.
    pub drop_existing: bool,
    /// Emit `CREATE TABLE IF NOT EXISTS`.
    pub if_not_exists: bool,
    pub line_ending: LineEnding,
    pub dialect: DialectKind,
}

/// Compiles `table` with `options`.
pub fn compile(table: &Table, options: &CompileOptions) -> Result<String> {
    TableBuilder::new(table).options(*options).compile()
}

/// Builds the CREATE TABLE text for one table.
#[derive(Debug, Clone)]
pub struct TableBuilder<'a> {
    table: &'a Table,
    options: CompileOptions,
}

impl<'a> TableBuilder<'a> {
    /// Starts a MySQL compilation with `\n` line endings.
    #[must_use]
    pub fn new(table: &'a Table) -> Self {
        Self {
            table,
            options: CompileOptions::default(),
        }
    }

    #[must_use]
    pub const fn options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub const fn dialect(mut self, dialect: DialectKind) -> Self {
        self.options.dialect = dialect;
        self
    }

    #[must_use]
    pub const fn drop_existing(mut self) -> Self {
        self.options.drop_existing = true;
        self
    }

    #[must_use]
    pub const fn if_not_exists(mut self) -> Self {
        self.options.if_not_exists = true;
        self
    }

    #[must_use]
    pub const fn line_ending(mut self, eol: LineEnding) -> Self {
        self.options.line_ending = eol;
        self
    }

    /// Produces the statement text.
    pub fn compile(&self) -> Result<String> {
        self.table.check_columns()?;
        let dialect = self.options.dialect.dialect();
        let eol = self.options.line_ending.as_str();
        let name = dialect.quote_identifier(self.table.name());

        let mut sql = String::new();
        if self.options.drop_existing {
            sql.push_str(&format!("DROP TABLE IF EXISTS {name};{eol}"));
        }
        sql.push_str("CREATE TABLE ");
        if self.options.if_not_exists {
            sql.push_str("IF NOT EXISTS ");
        }
        sql.push_str(&name);
        sql.push_str(" (");
        sql.push_str(eol);

        let columns = self.table.columns();
        let mut lines: Vec<String> = columns
            .iter()
            .map(|c| self.column_definition(dialect, c))
            .collect();

        if !dialect.inline_unique() {
            lines.extend(
                columns
                    .iter()
                    .filter(|c| c.is_unique())
                    .map(|c| dialect.unique_column_key(c)),
            );
        }

        for constraint in self.table.constraints().iter() {
            lines.push(match constraint {
                Constraint::Unique(key) => dialect.unique_key(key),
                Constraint::ForeignKey(fk) => dialect.foreign_key(fk)?,
            });
        }

        let body: Vec<String> = lines.iter().map(|l| format!("  {l}")).collect();
        sql.push_str(&body.join(format!(",{eol}").as_str()));
        sql.push_str(eol);
        sql.push_str(&dialect.table_suffix(self.table));

        debug!(
            table = %self.table.name(),
            dialect = %self.options.dialect,
            "Compiled CREATE TABLE"
        );
        Ok(sql)
    }

    fn column_definition(&self, dialect: &dyn Dialect, column: &Column) -> String {
        let mut def = format!(
            "{} {}",
            dialect.quote_identifier(column.name()),
            dialect.column_type(column)
        );
        if dialect.writes_unsigned(column) {
            def.push_str(" UNSIGNED");
        }
        if self.table.columns().is_primary_key(column.name()) {
            def.push_str(" PRIMARY KEY");
        }
        if column.is_auto_increment() {
            def.push_str(dialect.autoincrement_keyword());
        }
        if column.is_unique() && dialect.inline_unique() {
            def.push_str(" UNIQUE");
        }
        def.push_str(&dialect.charset_clause(column));
        if !column.is_nullable() {
            def.push_str(" NOT NULL");
        }
        match column.default_value() {
            Some(value) if !value.is_null() => {
                def.push_str(" DEFAULT ");
                if column.kind().quotes_default() {
                    def.push_str(&quote_literal(&value.to_string()));
                } else {
                    def.push_str(&value.to_sql_inline());
                }
            }
            _ if column.is_nullable() => def.push_str(" DEFAULT NULL"),
            _ => {}
        }
        def
    }
}
