use std::collections::BTreeMap;

use cellgrid_engine::engine::{CellId, DepGraph, Expr};

use crate::error::{Error, Result};

/// Grid bounds, fixed at spreadsheet construction. The original system
/// exposes a 10x10 grid (`a1`..`j10`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SheetDims {
    pub rows: usize,
    pub cols: usize,
}

impl Default for SheetDims {
    fn default() -> Self {
        SheetDims { rows: 10, cols: 10 }
    }
}

impl SheetDims {
    pub fn contains(&self, id: &CellId) -> bool {
        id.row < self.rows && id.col < self.cols
    }
}

/// A non-empty cell: its source text, parsed tree, and current value.
/// Values are kept consistent with expressions by the cascade; they are
/// never left stale after a committed mutation.
#[derive(Clone, Debug)]
pub(crate) struct CellState {
    pub expr: String,
    pub tree: Expr,
    pub value: f64,
}

/// Read-only snapshot of one cell. An empty or never-set cell reads as
/// `{ "", 0.0 }`.
#[derive(Clone, Debug, PartialEq)]
pub struct CellSnapshot {
    pub expr: String,
    pub value: f64,
}

/// One named spreadsheet: the sole owner and mutator of all cell state.
///
/// Mutations are serialized by `&mut self`; callers sharing a sheet
/// across threads wrap it in an exclusive lock. No operation here blocks
/// or performs I/O; persistence is the caller's job after a successful
/// mutation.
pub struct Spreadsheet {
    name: String,
    dims: SheetDims,
    pub(crate) cells: BTreeMap<CellId, CellState>,
    pub(crate) graph: DepGraph,
}

impl Spreadsheet {
    pub fn new(name: impl Into<String>, dims: SheetDims) -> Spreadsheet {
        Spreadsheet {
            name: name.into(),
            dims,
            cells: BTreeMap::new(),
            graph: DepGraph::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dims(&self) -> SheetDims {
        self.dims
    }

    /// Current value of a cell; empty and never-set cells are 0.
    pub(crate) fn value_of(&self, id: &CellId) -> f64 {
        self.cells.get(id).map(|c| c.value).unwrap_or(0.0)
    }

    /// Parse and bounds-check a mutation target id.
    pub(crate) fn target(&self, cell_id: &str) -> Result<CellId> {
        CellId::parse(cell_id)
            .filter(|id| self.dims.contains(id))
            .ok_or_else(|| Error::BadCellId {
                id: cell_id.to_string(),
            })
    }
}
