//! Spreadsheet computation engine.
//!
//! This module provides the pure, I/O-free core of the spreadsheet:
//!
//! - [`CellId`] - Cell identifier parsing (a1 notation ↔ row/col indices)
//! - [`Expr`] - Parsed formula expression trees
//! - [`parse`] - Formula text → expression tree
//! - [`referenced_cells`] - Collect the cells a formula reads
//! - [`evaluate`] - Structural evaluation against a value lookup
//! - [`DepGraph`] - Precedent/dependent edges, cycle detection, cascade order

mod ast;
mod cell_id;
mod eval;
mod graph;
mod parser;

pub use ast::{BinaryOp, Expr, UnaryOp, referenced_cells};
pub use cell_id::CellId;
pub use eval::evaluate;
pub use graph::DepGraph;
pub use parser::{ParseError, parse};
