//! Identifier rules for tables, columns, constraints and engines.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, SchemaError};

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("identifier pattern"));

static CONSTRAINT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-]+$").expect("constraint name pattern"));

static ENGINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+$").expect("engine pattern"));

/// Returns true when `name` is usable as a table or column name.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Fails with [`SchemaError::InvalidIdentifier`] unless `name` is an identifier.
pub fn check_identifier(kind: &'static str, name: &str) -> Result<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier {
            kind,
            name: name.to_string(),
        })
    }
}

/// Constraint names additionally allow dashes.
pub fn check_constraint_name(name: &str) -> Result<()> {
    if CONSTRAINT_NAME.is_match(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier {
            kind: "constraint",
            name: name.to_string(),
        })
    }
}

/// Engines are purely alphabetic (`InnoDB`, `MyISAM`, `MEMORY`).
pub fn check_engine(engine: &str) -> Result<()> {
    if ENGINE.is_match(engine) {
        Ok(())
    } else {
        Err(SchemaError::InvalidEngine(engine.to_string()))
    }
}
