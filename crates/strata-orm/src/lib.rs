//! # strata-orm
//!
//! Records bound to [`strata_schema::Table`] definitions, written back to the
//! database through diff-driven statements.
//!
//! This crate provides:
//! - `Record` with typed accessors and dirty tracking against the values
//!   last loaded or persisted
//! - `Query` turning a record's diff into `INSERT`, upsert, `UPDATE` or
//!   `DELETE`
//! - `Lock` selecting a row for update with an optional cross-check
//! - `TableRegistry` sharing table definitions by name
//! - `Executor`, the database capability, with a `sqlx` SQLite implementation
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use strata_orm::{Record, SqliteExecutor};
//! use strata_schema::Table;
//!
//! let users = Arc::new(Table::declare("users")?.build(|cols, _| {
//!     cols.int("id")?.auto_increment();
//!     cols.string("email")?.unique();
//!     cols.primary_key("id")?;
//!     Ok(())
//! })?);
//!
//! let db = SqliteExecutor::connect("sqlite::memory:", 1).await?;
//!
//! let mut user: Record = Record::new(Arc::clone(&users), None)?;
//! user.set("email", "ada@example.com")?;
//! user.query(&db)?.insert().await?;
//!
//! user.set("email", "ada@lovelace.dev")?;
//! user.query(&db)?.update().await?;
//! ```

pub mod error;
pub mod executor;
pub mod lock;
pub mod model;
pub mod query;
pub mod record;
pub mod registry;
pub mod snapshot;
pub mod sqlite;

pub use error::{ExecError, OrmError, Result};
pub use executor::{ExecOutcome, Executor, Row};
pub use lock::Lock;
pub use model::{FieldWrite, Model};
pub use query::{Query, QueryResult, QueryVerb};
pub use record::{Changes, Record};
pub use registry::TableRegistry;
pub use snapshot::RecordSnapshot;
pub use sqlite::SqliteExecutor;
