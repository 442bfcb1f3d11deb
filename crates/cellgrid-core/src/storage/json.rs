//! JSON-file-backed expression store.
//!
//! One file per sheet, holding an ordered array of
//! `{ "cell": "a1", "expr": "b1+1" }` records. Every mutation writes the
//! whole file back; at grid scale that is simpler and safer than partial
//! updates.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use cellgrid_engine::engine::CellId;

use super::ExprStore;
use crate::error::StorageError;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Record {
    cell: CellId,
    expr: String,
}

/// Write-through JSON store. Records keep insertion order for replay.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    records: Vec<Record>,
}

impl JsonStore {
    /// Open a store file, creating an empty store if the file does not
    /// exist yet. A malformed file is a [`StorageError::Format`].
    pub fn open(path: impl Into<PathBuf>) -> Result<JsonStore, StorageError> {
        let path = path.into();
        let records = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            Vec::new()
        };
        Ok(JsonStore { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        let body = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.path, body + "\n")?;
        Ok(())
    }
}

impl ExprStore for JsonStore {
    fn get(&self, cell_id: &CellId) -> Result<Option<String>, StorageError> {
        Ok(self
            .records
            .iter()
            .find(|r| &r.cell == cell_id)
            .map(|r| r.expr.clone()))
    }

    fn put(&mut self, cell_id: &CellId, expr: &str) -> Result<(), StorageError> {
        match self.records.iter_mut().find(|r| &r.cell == cell_id) {
            Some(record) => record.expr = expr.to_string(),
            None => self.records.push(Record {
                cell: cell_id.clone(),
                expr: expr.to_string(),
            }),
        }
        self.flush()
    }

    fn delete(&mut self, cell_id: &CellId) -> Result<(), StorageError> {
        self.records.retain(|r| &r.cell != cell_id);
        self.flush()
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.records.clear();
        self.flush()
    }

    fn list_all(&self) -> Result<Vec<(CellId, String)>, StorageError> {
        Ok(self
            .records
            .iter()
            .map(|r| (r.cell.clone(), r.expr.clone()))
            .collect())
    }
}
