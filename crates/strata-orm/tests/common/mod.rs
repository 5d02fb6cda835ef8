#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use strata_orm::{ExecError, ExecOutcome, Executor, Row};
use strata_schema::{DialectKind, SqlValue, Table};

/// A statement seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Records statements and answers with queued outcomes.
#[derive(Debug, Default)]
pub struct MockExecutor {
    dialect: DialectKind,
    calls: Mutex<Vec<Call>>,
    outcomes: Mutex<VecDeque<Result<ExecOutcome, String>>>,
    rows: Mutex<VecDeque<Vec<Row>>>,
}

impl MockExecutor {
    pub fn new(dialect: DialectKind) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    pub fn mysql() -> Self {
        Self::new(DialectKind::MySql)
    }

    pub fn sqlite() -> Self {
        Self::new(DialectKind::Sqlite)
    }

    /// Queues the outcome of the next `execute`; one affected row otherwise.
    pub fn will_affect(&self, rows_affected: u64, last_insert_id: Option<i64>) {
        self.outcomes.lock().unwrap().push_back(Ok(ExecOutcome {
            rows_affected,
            last_insert_id,
        }));
    }

    /// Makes the next `execute` fail.
    pub fn will_fail(&self, message: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    /// Queues the rows returned by the next `fetch`; none otherwise.
    pub fn will_return(&self, rows: Vec<Row>) {
        self.rows.lock().unwrap().push_back(rows);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last(&self) -> Call {
        self.calls().pop().expect("no statement was run")
    }

    fn record(&self, sql: &str, params: &[SqlValue]) {
        self.calls.lock().unwrap().push(Call {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
    }
}

impl Executor for MockExecutor {
    fn dialect(&self) -> DialectKind {
        self.dialect
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome, ExecError> {
        self.record(sql, params);
        match self.outcomes.lock().unwrap().pop_front() {
            Some(Ok(outcome)) => Ok(outcome),
            Some(Err(message)) => Err(message.into()),
            None => Ok(ExecOutcome {
                rows_affected: 1,
                last_insert_id: None,
            }),
        }
    }

    async fn fetch(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, ExecError> {
        self.record(sql, params);
        Ok(self.rows.lock().unwrap().pop_front().unwrap_or_default())
    }
}

/// `users`: auto-increment primary key, unique email, nullable name, and a
/// version counter with a default.
pub fn users() -> Arc<Table> {
    Arc::new(
        Table::declare("users")
            .unwrap()
            .build(|cols, _| {
                cols.int("id")?.size(8, None)?.unsigned()?.auto_increment();
                cols.string("email")?.length(190)?.unique();
                cols.string("name")?.length(64)?.nullable();
                cols.int("version")?.unsigned()?.default(Some(1))?;
                cols.primary_key("id")?;
                Ok(())
            })
            .unwrap(),
    )
}

/// A table without any primary or unique column.
pub fn events() -> Arc<Table> {
    Arc::new(
        Table::declare("events")
            .unwrap()
            .build(|cols, _| {
                cols.string("kind")?;
                cols.text("payload")?.nullable();
                Ok(())
            })
            .unwrap(),
    )
}

pub fn user_row(id: i64, email: &str, name: Option<&str>, version: i64) -> Row {
    [
        ("id", SqlValue::Int(id)),
        ("email", SqlValue::Text(email.to_string())),
        (
            "name",
            name.map_or(SqlValue::Null, |n| SqlValue::Text(n.to_string())),
        ),
        ("version", SqlValue::Int(version)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}
