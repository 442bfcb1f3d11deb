//! Error types for cellgrid core.

use thiserror::Error;

use cellgrid_engine::engine::{CellId, ParseError};

/// Errors from the spreadsheet store. Every rejection leaves the
/// in-memory sheet exactly as it was, so callers may retry with
/// corrected input without re-synchronizing.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Syntax(#[from] ParseError),

    #[error("circular reference detected at {cell}")]
    CircularRef { cell: CellId },

    #[error("bad cell id: '{id}'")]
    BadCellId { id: String },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from the persistence collaborator. The sheet's in-memory
/// state stays valid regardless of persistence outcome.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed store file: {0}")]
    Format(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
