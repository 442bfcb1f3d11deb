//! In-memory expression store, for tests and ephemeral sessions.

use cellgrid_engine::engine::CellId;

use super::ExprStore;
use crate::error::StorageError;

/// Insertion-ordered in-memory store. Linear scans are fine at grid
/// scale.
#[derive(Clone, Debug, Default)]
pub struct MemStore {
    entries: Vec<(CellId, String)>,
}

impl MemStore {
    pub fn new() -> MemStore {
        MemStore::default()
    }
}

impl ExprStore for MemStore {
    fn get(&self, cell_id: &CellId) -> Result<Option<String>, StorageError> {
        Ok(self
            .entries
            .iter()
            .find(|(id, _)| id == cell_id)
            .map(|(_, expr)| expr.clone()))
    }

    fn put(&mut self, cell_id: &CellId, expr: &str) -> Result<(), StorageError> {
        match self.entries.iter_mut().find(|(id, _)| id == cell_id) {
            Some((_, existing)) => *existing = expr.to_string(),
            None => self.entries.push((cell_id.clone(), expr.to_string())),
        }
        Ok(())
    }

    fn delete(&mut self, cell_id: &CellId) -> Result<(), StorageError> {
        self.entries.retain(|(id, _)| id != cell_id);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<(CellId, String)>, StorageError> {
        Ok(self.entries.clone())
    }
}
