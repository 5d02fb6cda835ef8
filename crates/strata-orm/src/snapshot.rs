//! Serializable record state.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strata_schema::{SqlValue, Table};

use crate::error::{OrmError, Result};
use crate::model::Model;
use crate::record::Record;

/// Current and original values of a record, by column.
///
/// Only records whose model sets [`Model::SERIALIZABLE`] can be captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSnapshot {
    /// Table the record belongs to.
    pub table: String,
    /// Values last loaded or persisted; absent for a fresh record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<BTreeMap<String, SqlValue>>,
    /// Current values.
    pub current: BTreeMap<String, SqlValue>,
}

impl RecordSnapshot {
    /// Serializes the snapshot to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reads a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<M: Model> Record<M> {
    /// Captures the record's state.
    pub fn snapshot(&self) -> Result<RecordSnapshot> {
        if !M::SERIALIZABLE {
            return Err(OrmError::NotSerializable(self.model_name().to_string()));
        }
        self.model().before_snapshot();
        let current = self
            .table()
            .columns()
            .names()
            .map(|name| (name.to_string(), self.current(name)))
            .collect();
        let original = self
            .originals()
            .map(|values| values.iter().map(|(k, v)| (k.clone(), v.clone())).collect());
        Ok(RecordSnapshot {
            table: self.table().name().to_string(),
            original,
            current,
        })
    }

    /// Rebuilds a record of `table` from a snapshot.
    pub fn restore(table: Arc<Table>, snapshot: RecordSnapshot) -> Result<Self> {
        if snapshot.table != table.name() {
            return Err(OrmError::Snapshot(format!(
                "snapshot of \"{}\" cannot be restored into \"{}\"",
                snapshot.table,
                table.name()
            )));
        }
        let mut record = Self::bind(table)?;
        if !M::SERIALIZABLE {
            return Err(OrmError::NotSerializable(record.model_name().to_string()));
        }

        let columns = record.table().columns();
        let unknown = snapshot
            .current
            .keys()
            .chain(snapshot.original.iter().flat_map(BTreeMap::keys))
            .find(|name| !columns.contains(name));
        if let Some(name) = unknown {
            return Err(OrmError::Snapshot(format!(
                "unknown column \"{name}\" in snapshot of \"{}\"",
                snapshot.table
            )));
        }

        for (name, value) in snapshot.current {
            record.write(&name, value)?;
        }
        record.set_original(
            snapshot
                .original
                .map(|values| values.into_iter().collect::<HashMap<_, _>>()),
        );
        record.model_mut().on_restore();
        Ok(record)
    }
}
