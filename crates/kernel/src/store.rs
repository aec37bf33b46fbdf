use std::collections::BTreeMap;

use roadworld_common::CellCoord;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;

/// Coordinate → cell map.
///
/// Uses BTreeMap so iteration (and therefore world hashing) is identical on
/// every platform. A coordinate holds at most one cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Cell>", into = "Vec<Cell>")]
pub struct CellStore {
    cells: BTreeMap<CellCoord, Cell>,
}

impl CellStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        self.cells.contains_key(&coord)
    }

    pub fn get(&self, coord: CellCoord) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    /// Insert a cell under its own coordinate.
    ///
    /// An occupied coordinate keeps its existing cell; the new one is dropped.
    /// Returns the resident cell either way.
    pub fn insert(&mut self, cell: Cell) -> &Cell {
        self.cells.entry(cell.coord).or_insert(cell)
    }

    /// Return the resident cell, building it with `build` first if absent.
    ///
    /// `build` sees the store as it is before insertion, so it can inspect
    /// neighbors.
    pub fn get_or_insert_with(
        &mut self,
        coord: CellCoord,
        build: impl FnOnce(&CellStore) -> Cell,
    ) -> &Cell {
        if !self.cells.contains_key(&coord) {
            let cell = build(self);
            self.cells.insert(coord, cell);
        }
        &self.cells[&coord]
    }

    pub fn remove(&mut self, coord: CellCoord) -> Option<Cell> {
        self.cells.remove(&coord)
    }

    /// Cells in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    pub fn coords(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.keys().copied()
    }
}

impl From<Vec<Cell>> for CellStore {
    fn from(cells: Vec<Cell>) -> Self {
        let mut store = Self::new();
        for cell in cells {
            store.insert(cell);
        }
        store
    }
}

impl From<CellStore> for Vec<Cell> {
    fn from(store: CellStore) -> Self {
        store.cells.into_values().collect()
    }
}
