//! Spatial grouping: bucket tracked points into cells at a chosen level.

use rustc_hash::FxHashMap;

use crate::cell::CellId;
use crate::geo::LatLngBounds;
use crate::store::{Category, PointId, TrackedPoint, TrackedPointStore};

/// Points sharing one cell, grouped by classification. Ephemeral: built per
/// grouping call, discarded after consumption.
#[derive(Debug, Clone)]
pub struct CellBucket {
    pub cell: CellId,
    pub resources: Vec<PointId>,
    pub settlements: Vec<PointId>,
    pub not_game: Vec<PointId>,
    /// Observed on the live feed but not yet classified.
    pub not_classified: Vec<PointId>,
}

impl CellBucket {
    fn new(cell: CellId) -> Self {
        Self {
            cell,
            resources: Vec::new(),
            settlements: Vec::new(),
            not_game: Vec::new(),
            not_classified: Vec::new(),
        }
    }

    pub fn has_classified(&self) -> bool {
        !self.resources.is_empty() || !self.settlements.is_empty()
    }
}

/// Bucket map preserving first-touch order, so downstream queues built from
/// it are deterministic for a fixed input set.
#[derive(Debug, Default)]
pub struct CellBuckets {
    order: Vec<CellId>,
    map: FxHashMap<CellId, CellBucket>,
}

impl CellBuckets {
    pub fn get(&self, cell: &CellId) -> Option<&CellBucket> {
        self.map.get(cell)
    }

    /// Buckets in the order their cells were first seen.
    pub fn iter(&self) -> impl Iterator<Item = &CellBucket> {
        self.order.iter().filter_map(|cell| self.map.get(cell))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn entry(&mut self, cell: CellId) -> &mut CellBucket {
        self.map.entry(cell).or_insert_with(|| {
            self.order.push(cell);
            CellBucket::new(cell)
        })
    }

    /// Keep buckets whose footprint intersects `screen`. Used for rendering:
    /// partially visible cells are still drawn.
    pub fn retain_within_screen(self, screen: &LatLngBounds) -> Self {
        self.retain(|cell| screen.intersects(&cell.bounds()))
    }

    /// Keep buckets whose footprint lies fully inside `screen`. Used for
    /// reconciliation: the live feed may not have delivered all members of a
    /// partially visible cell yet, so those are excluded.
    pub fn retain_inside_screen(self, screen: &LatLngBounds) -> Self {
        self.retain(|cell| screen.contains(&cell.bounds()))
    }

    fn retain(mut self, keep: impl Fn(&CellId) -> bool) -> Self {
        self.order.retain(&keep);
        self.map.retain(|cell, _| keep(cell));
        self
    }
}

fn classify_group<'a>(
    buckets: &mut CellBuckets,
    points: impl Iterator<Item = &'a mut TrackedPoint>,
    level: u8,
    select: fn(&mut CellBucket) -> &mut Vec<PointId>,
) {
    for point in points {
        // Malformed coordinates: excluded, no mutation.
        let Some(cell) = point.cell_at(level) else {
            continue;
        };
        select(buckets.entry(cell)).push(point.id.clone());
    }
}

/// Group every classified point plus the unclassified `observed` set into
/// cells at `level`. Linear in total point count; member order within a
/// category follows iteration order of the inputs.
pub fn group_by_cell(
    store: &mut TrackedPointStore,
    observed: &mut FxHashMap<PointId, TrackedPoint>,
    level: u8,
) -> CellBuckets {
    let mut buckets = CellBuckets::default();
    classify_group(&mut buckets, store.points_mut(Category::Resource), level, |b| {
        &mut b.resources
    });
    classify_group(
        &mut buckets,
        store.points_mut(Category::Settlement),
        level,
        |b| &mut b.settlements,
    );
    classify_group(&mut buckets, observed.values_mut(), level, |b| {
        &mut b.not_classified
    });
    classify_group(&mut buckets, store.points_mut(Category::NotGame), level, |b| {
        &mut b.not_game
    });
    buckets
}
