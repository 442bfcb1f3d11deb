//! Spreadsheet store: cell table, dependency graph, and the public
//! operation set (set / remove / copy / query / clear / dump / load).

mod ops;
mod state;

pub use state::{CellSnapshot, SheetDims, Spreadsheet};
