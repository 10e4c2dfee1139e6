//! Grid support for the overlay renderer: viewport cell cover and per-cell
//! resource scores.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::cell::CellId;
use crate::geo::LatLngBounds;
use crate::group::CellBuckets;

/// The 8-neighborhood deltas, in the ring order the cover walk expands them.
pub const RING_DELTAS: [(i64, i64); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

/// All cells at `level` whose footprint intersects `screen`.
///
/// Breadth-first worklist from the cell under the viewport center, expanding
/// the 8-neighborhood of every on-screen cell, with an explicit visited set.
/// Returns cells in discovery order; terminates because only on-screen cells
/// expand and the visited set blocks revisits.
pub fn cover_screen(screen: &LatLngBounds, level: u8) -> Vec<CellId> {
    let Some(start) = CellId::from_geo(screen.center(), level) else {
        return Vec::new();
    };

    let mut cover = Vec::new();
    let mut visited = FxHashSet::default();
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        if !screen.intersects(&cell.bounds()) {
            continue;
        }
        cover.push(cell);
        for neighbor in cell.neighbors_with(&RING_DELTAS) {
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }
    cover
}

/// Desirability score of a cell, drawn as a grid label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellScore {
    /// Own resource count plus the mean resource count of the 8-neighborhood
    /// cells that hold any resources.
    pub score: f64,
    /// Unclassified points in the cell or its neighborhood: the score may be
    /// an undercount.
    pub has_unknown: bool,
}

/// Score every bucketed cell with at least one resource in reach.
///
/// Neighbors are looked up in the same bucket map; cells absent from it
/// contribute nothing.
pub fn cell_scores(buckets: &CellBuckets) -> FxHashMap<CellId, CellScore> {
    let mut scores = FxHashMap::default();

    for bucket in buckets.iter() {
        let mut cells_with_resources = 0usize;
        let mut total_resources = 0usize;
        let mut has_unknown = !bucket.not_classified.is_empty();

        for neighbor in bucket.cell.neighbors_with(&RING_DELTAS) {
            let Some(data) = buckets.get(&neighbor) else {
                continue;
            };
            if !data.resources.is_empty() {
                cells_with_resources += 1;
                total_resources += data.resources.len();
            }
            if !data.not_classified.is_empty() {
                has_unknown = true;
            }
        }

        let mut score = bucket.resources.len() as f64;
        if total_resources > 0 {
            score += total_resources as f64 / cells_with_resources as f64;
        }
        if score > 0.0 {
            scores.insert(bucket.cell, CellScore { score, has_unknown });
        }
    }
    scores
}
