//! Persistence for `(cell id, expression text)` pairs.
//!
//! The store is a write-behind sidecar: the sheet never consults it
//! during evaluation. Callers replay [`ExprStore::list_all`] through the
//! sheet at startup and persist changed pairs after each successful
//! mutation.

mod json;
mod mem;

pub use json::JsonStore;
pub use mem::MemStore;

use cellgrid_engine::engine::CellId;

use crate::error::StorageError;

/// A persistent map from cell id to expression text for one named sheet.
///
/// Implementations preserve insertion order in [`ExprStore::list_all`] so
/// a startup replay sees expressions in the order they were written.
pub trait ExprStore {
    /// Expression text for a cell, or None for an empty/unknown cell.
    fn get(&self, cell_id: &CellId) -> Result<Option<String>, StorageError>;

    /// Set or replace the expression for a cell.
    fn put(&mut self, cell_id: &CellId, expr: &str) -> Result<(), StorageError>;

    /// Remove all stored info for a cell.
    fn delete(&mut self, cell_id: &CellId) -> Result<(), StorageError>;

    /// Drop every stored pair.
    fn clear(&mut self) -> Result<(), StorageError>;

    /// Every stored `(cell id, expression)` pair, in insertion order.
    fn list_all(&self) -> Result<Vec<(CellId, String)>, StorageError>;
}
