use std::collections::BTreeMap;

use cellgrid_engine::engine::{CellId, evaluate, parse, referenced_cells};
use tracing::{debug, warn};

use super::state::{CellSnapshot, CellState, Spreadsheet};
use crate::error::{Error, Result};
use crate::storage::ExprStore;

impl Spreadsheet {
    /// Set a cell to the result of evaluating `expr`, then recompute every
    /// cell that directly or indirectly depends on it. Returns a map from
    /// each recomputed cell (the target plus all affected dependents) to
    /// its new value.
    ///
    /// Rejections ([`Error::Syntax`], [`Error::CircularRef`],
    /// [`Error::BadCellId`]) leave the sheet untouched: validation happens
    /// before any state is written, never as mutate-then-undo.
    ///
    /// An all-whitespace expression takes the remove path.
    pub fn set_cell(&mut self, cell_id: &str, expr: &str) -> Result<BTreeMap<CellId, f64>> {
        let id = self.target(cell_id)?;
        self.apply(id, expr)
    }

    /// Reset a cell to empty. Equivalent to `set_cell(cell_id, "")`:
    /// outgoing edges are dropped, the value becomes 0, and dependents
    /// cascade exactly as for a set.
    pub fn remove_cell(&mut self, cell_id: &str) -> Result<BTreeMap<CellId, f64>> {
        self.set_cell(cell_id, "")
    }

    /// Duplicate the source cell's current expression text into the
    /// destination, verbatim: no reference rewriting. Copying an empty
    /// source empties the destination.
    pub fn copy_cell(&mut self, dest_id: &str, src_id: &str) -> Result<BTreeMap<CellId, f64>> {
        let dest = self.target(dest_id)?;
        let src = self.target(src_id)?;
        let expr = self
            .cells
            .get(&src)
            .map(|c| c.expr.clone())
            .unwrap_or_default();
        self.apply(dest, &expr)
    }

    /// Read-only snapshot of one cell; an empty or never-set cell reads
    /// as `{ "", 0.0 }`.
    pub fn query_cell(&self, cell_id: &str) -> Result<CellSnapshot> {
        let id = self.target(cell_id)?;
        Ok(self
            .cells
            .get(&id)
            .map(|c| CellSnapshot {
                expr: c.expr.clone(),
                value: c.value,
            })
            .unwrap_or(CellSnapshot {
                expr: String::new(),
                value: 0.0,
            }))
    }

    /// Reset every cell to empty and drop all dependency edges.
    pub fn clear(&mut self) {
        debug!(sheet = self.name(), "clearing all cells");
        self.cells.clear();
        self.graph.clear();
    }

    /// Every non-empty cell as `(id, expression text, value)`, in
    /// deterministic `CellId` order.
    pub fn dump(&self) -> Vec<(CellId, String, f64)> {
        self.cells
            .iter()
            .map(|(id, c)| (id.clone(), c.expr.clone(), c.value))
            .collect()
    }

    /// Rebuild in-memory state by replaying everything the store holds,
    /// in stored order; the cascade self-corrects forward references.
    /// Entries that no longer replay (corrupt text, out-of-grid ids) are
    /// skipped with a warning rather than failing the whole load.
    pub fn load_from(&mut self, store: &dyn ExprStore) -> Result<()> {
        for (id, expr) in store.list_all().map_err(Error::Storage)? {
            if let Err(err) = self.set_cell(&id.to_string(), &expr) {
                warn!(cell = %id, %err, "skipping stored expression that does not replay");
            }
        }
        Ok(())
    }

    /// Parse -> cycle-check -> commit -> evaluate -> cascade.
    fn apply(&mut self, id: CellId, expr: &str) -> Result<BTreeMap<CellId, f64>> {
        let text = expr.trim();
        if text.is_empty() {
            return Ok(self.apply_empty(id));
        }

        let tree = parse(text)?;
        let refs = referenced_cells(&tree);
        if self.graph.would_cycle(&id, &refs) {
            debug!(cell = %id, expr = text, "rejected circular reference");
            return Err(Error::CircularRef { cell: id });
        }

        self.graph.commit_edges(&id, refs);
        let value = evaluate(&tree, &|r| self.value_of(r));
        self.cells.insert(
            id.clone(),
            CellState {
                expr: text.to_string(),
                tree,
                value,
            },
        );
        debug!(cell = %id, value, "committed expression");

        let mut updates = BTreeMap::new();
        updates.insert(id.clone(), value);
        self.cascade(&id, &mut updates);
        Ok(updates)
    }

    fn apply_empty(&mut self, id: CellId) -> BTreeMap<CellId, f64> {
        self.graph.commit_edges(&id, Default::default());
        self.cells.remove(&id);
        debug!(cell = %id, "cleared cell");

        let mut updates = BTreeMap::new();
        updates.insert(id.clone(), 0.0);
        self.cascade(&id, &mut updates);
        updates
    }

    /// Recompute all transitive dependents of `id` in topological order,
    /// so no recomputation ever reads a stale value.
    fn cascade(&mut self, id: &CellId, updates: &mut BTreeMap<CellId, f64>) {
        for dep in self.graph.transitive_dependents(id) {
            let Some(tree) = self.cells.get(&dep).map(|c| c.tree.clone()) else {
                continue;
            };
            let value = evaluate(&tree, &|r| self.value_of(r));
            if let Some(state) = self.cells.get_mut(&dep) {
                state.value = value;
            }
            updates.insert(dep, value);
        }
    }
}
