use rand::Rng;
use roadworld_common::{CellCoord, CellType, CellTypeSet};
use serde::{Deserialize, Serialize};

use crate::store::CellStore;

/// Which cell types may sit on an axis-adjacent coordinate of each type.
///
/// Indexed by [`CellType::index`]. Every row of the default table contains
/// Highway, so Highway connects to everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyTable {
    allowed: [CellTypeSet; 6],
}

impl Default for AdjacencyTable {
    fn default() -> Self {
        use CellType::*;
        Self {
            allowed: [
                CellTypeSet::ALL,
                CellTypeSet::of(&[Highway, Commercial]),
                CellTypeSet::of(&[Highway, City]),
                CellTypeSet::of(&[Highway, Desert]),
                CellTypeSet::of(&[Highway, Forest]),
                CellTypeSet::of(&[Highway, Snow]),
            ],
        }
    }
}

impl AdjacencyTable {
    pub fn new(allowed: [CellTypeSet; 6]) -> Self {
        Self { allowed }
    }

    pub fn allowed(&self, t: CellType) -> CellTypeSet {
        self.allowed[t.index()]
    }

    /// Whether `neighbor` may sit next to a cell of type `t`.
    pub fn permits(&self, t: CellType, neighbor: CellType) -> bool {
        self.allowed(t).contains(neighbor)
    }

    pub fn is_symmetric(&self) -> bool {
        CellType::ALL.iter().all(|&a| {
            CellType::ALL
                .iter()
                .all(|&b| self.permits(a, b) == self.permits(b, a))
        })
    }
}

/// How a cell's type was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    /// The origin cell is always Highway, regardless of its neighbors.
    Spawn,
    /// No neighbor existed; uniform over all types.
    Unconstrained,
    /// Uniform over the intersection of the neighbors' allowed sets.
    Constrained,
    /// The intersection was empty; Highway was used.
    Fallback,
    /// Content generation failed; an empty Highway cell was committed.
    Recovered,
}

/// Pick a type for `coord` given whatever neighbors are already in `store`.
///
/// One-step local consistency: committed neighbors are never revisited, so
/// the result depends on generation order. An empty intersection resolves to
/// Highway instead of backtracking, which guarantees the grid never gets stuck.
pub fn resolve_type<R: Rng + ?Sized>(
    coord: CellCoord,
    store: &CellStore,
    table: &AdjacencyTable,
    rng: &mut R,
) -> (CellType, Resolution) {
    let mut allowed = CellTypeSet::ALL;
    let mut constrained = false;
    for neighbor in coord.neighbors() {
        let neighbor = match neighbor {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(%coord, error = %e, "skipping neighbor outside the grid");
                continue;
            }
        };
        if let Some(cell) = store.get(neighbor) {
            allowed = allowed.intersection(table.allowed(cell.cell_type));
            constrained = true;
        }
    }

    if !constrained {
        let pick = rng.random_range(0..CellType::ALL.len());
        return (CellType::ALL[pick], Resolution::Unconstrained);
    }
    if allowed.is_empty() {
        return (CellType::Highway, Resolution::Fallback);
    }
    match allowed.nth(rng.random_range(0..allowed.len())) {
        Some(t) => (t, Resolution::Constrained),
        None => (CellType::Highway, Resolution::Fallback),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use roadworld_common::RoadType;
    use std::collections::HashSet;

    fn cell_of(coord: CellCoord, cell_type: CellType) -> Cell {
        Cell {
            coord,
            cell_type,
            road_type: RoadType::Normal,
            resolution: Resolution::Constrained,
            roads: Vec::new(),
            content: Vec::new(),
        }
    }

    #[test]
    fn default_table_is_symmetric_and_highway_is_universal() {
        let table = AdjacencyTable::default();
        assert!(table.is_symmetric());
        assert_eq!(table.allowed(CellType::Highway), CellTypeSet::ALL);
        for t in CellType::ALL {
            assert!(table.permits(t, CellType::Highway));
        }
        assert!(!table.permits(CellType::City, CellType::City));
        assert!(table.permits(CellType::Desert, CellType::Desert));
    }

    #[test]
    fn no_neighbors_is_unconstrained_and_covers_all_types() {
        let store = CellStore::new();
        let table = AdjacencyTable::default();
        let mut seen = HashSet::new();
        for seed in 0..200 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (t, res) = resolve_type(CellCoord::new(7, 7), &store, &table, &mut rng);
            assert_eq!(res, Resolution::Unconstrained);
            seen.insert(t);
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn highway_neighbor_allows_every_type() {
        let mut store = CellStore::new();
        store.insert(cell_of(CellCoord::ORIGIN, CellType::Highway));
        let table = AdjacencyTable::default();
        let mut seen = HashSet::new();
        for seed in 0..200 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (t, res) = resolve_type(CellCoord::new(1, 0), &store, &table, &mut rng);
            assert_eq!(res, Resolution::Constrained);
            seen.insert(t);
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn city_neighbor_restricts_to_highway_or_commercial() {
        let mut store = CellStore::new();
        store.insert(cell_of(CellCoord::new(0, 1), CellType::City));
        let table = AdjacencyTable::default();
        for seed in 0..100 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (t, _) = resolve_type(CellCoord::new(1, 1), &store, &table, &mut rng);
            assert!(matches!(t, CellType::Highway | CellType::Commercial), "{t}");
        }
    }

    #[test]
    fn intersection_over_several_neighbors() {
        let mut store = CellStore::new();
        store.insert(cell_of(CellCoord::new(-1, 0), CellType::City));
        store.insert(cell_of(CellCoord::new(1, 0), CellType::Desert));
        let table = AdjacencyTable::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let (t, res) = resolve_type(CellCoord::new(0, 0), &store, &table, &mut rng);
        assert_eq!(t, CellType::Highway);
        assert_eq!(res, Resolution::Constrained);
    }

    #[test]
    fn empty_intersection_falls_back_to_highway() {
        use CellType::*;
        // No row contains Highway, so City next to Desert is a contradiction.
        let table = AdjacencyTable::new([
            CellTypeSet::of(&[City, Commercial, Desert, Forest, Snow]),
            CellTypeSet::of(&[Commercial]),
            CellTypeSet::of(&[City]),
            CellTypeSet::of(&[Desert]),
            CellTypeSet::of(&[Forest]),
            CellTypeSet::of(&[Snow]),
        ]);
        let mut store = CellStore::new();
        store.insert(cell_of(CellCoord::new(0, -1), City));
        store.insert(cell_of(CellCoord::new(0, 1), Desert));
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let (t, res) = resolve_type(CellCoord::new(0, 0), &store, &table, &mut rng);
        assert_eq!(t, Highway);
        assert_eq!(res, Resolution::Fallback);
    }

    #[test]
    fn same_rng_stream_gives_same_choice() {
        let mut store = CellStore::new();
        store.insert(cell_of(CellCoord::ORIGIN, CellType::Highway));
        let table = AdjacencyTable::default();
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        assert_eq!(
            resolve_type(CellCoord::new(0, 1), &store, &table, &mut a),
            resolve_type(CellCoord::new(0, 1), &store, &table, &mut b)
        );
    }

    #[test]
    fn grid_edge_neighbors_are_skipped() {
        let store = CellStore::new();
        let table = AdjacencyTable::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let (_, res) = resolve_type(CellCoord::new(i32::MAX, i32::MIN), &store, &table, &mut rng);
        assert_eq!(res, Resolution::Unconstrained);
    }
}
