//! cellgrid-core - UI-agnostic spreadsheet store + persistence.

pub mod error;
pub mod sheet;
pub mod storage;

pub use error::{Error, Result, StorageError};
pub use sheet::{CellSnapshot, SheetDims, Spreadsheet};
pub use storage::{ExprStore, JsonStore, MemStore};

pub use cellgrid_engine::engine::CellId;
