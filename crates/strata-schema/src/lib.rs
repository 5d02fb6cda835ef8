//! # strata-schema
//!
//! Typed table declarations and their compilation to CREATE TABLE statements
//! for MySQL and SQLite.
//!
//! A table is declared once through a schema callback that receives the
//! column and constraint containers:
//!
//! ```rust
//! use strata_schema::{Table, TableBuilder};
//!
//! let users = Table::declare("users")?.build(|cols, constraints| {
//!     cols.int("id")?.size(8, None)?.unsigned()?.auto_increment();
//!     cols.string("email")?.length(190)?.unique();
//!     cols.int("team_id")?.nullable();
//!     cols.primary_key("id")?;
//!     constraints.foreign_key("team_id")?.table("teams", "id")?;
//!     Ok(())
//! })?;
//!
//! let sql = TableBuilder::new(&users).compile()?;
//! assert!(sql.contains("`id` bigint UNSIGNED PRIMARY KEY auto_increment NOT NULL"));
//! assert!(sql.ends_with(") ENGINE=InnoDB;"));
//! # Ok::<(), strata_schema::SchemaError>(())
//! ```

pub mod column;
pub mod columns;
pub mod constraint;
pub mod dialect;
pub mod error;
mod ident;
pub mod table;
pub mod table_builder;
pub mod value;

pub use column::{Column, ColumnKind, Precision, ScalarKind, SizeClass};
pub use columns::Columns;
pub use constraint::{Constraint, Constraints, ForeignKey, UniqueKey};
pub use dialect::{Dialect, DialectKind, MySqlDialect, SqliteDialect};
pub use error::{Result, SchemaError};
pub use ident::is_identifier;
pub use table::{Table, TableDeclaration};
pub use table_builder::{compile, CompileOptions, LineEnding, TableBuilder};
pub use value::{FromSqlValue, SqlValue, ToSqlValue};
