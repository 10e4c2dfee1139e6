//! Tracked points and the classified point store.
//!
//! A point belongs to at most one category at a time; the store's add,
//! remove and move operations enforce that, so reconciliation never has to
//! deal with a duplicate id mapped to two categories.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cell::CellId;
use crate::geo::GeoPoint;

/// Opaque identity of a tracked point (the live feed's stable key).
pub type PointId = String;

/// Closed set of classifications a point can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// A harvestable resource node.
    Resource,
    /// A settlement site.
    Settlement,
    /// Confirmed present on the map but not part of the game data.
    NotGame,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Resource, Category::Settlement, Category::NotGame];
}

/// A geo-located point of interest under reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedPoint {
    pub id: PointId,
    pub lat: f64,
    pub lng: f64,
    pub name: Option<String>,
    /// Resource subtype, meaningful only for [`Category::Resource`].
    pub rtype: Option<String>,
    /// Seen in the current live-set sweep.
    pub exists_in_live_set: bool,
    /// Per-level cell memo. Never invalidated here; cleared explicitly when
    /// the coordinates change.
    cells: FxHashMap<u8, CellId>,
}

impl TrackedPoint {
    pub fn new(id: impl Into<PointId>, lat: f64, lng: f64, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            lat,
            lng,
            name,
            rtype: None,
            exists_in_live_set: false,
            cells: FxHashMap::default(),
        }
    }

    pub fn geo(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    /// Cell containing this point at `level`, computed once per level.
    ///
    /// `None` for non-finite coordinates; such points are excluded from
    /// grouping rather than treated as an error.
    pub fn cell_at(&mut self, level: u8) -> Option<CellId> {
        if let Some(cell) = self.cells.get(&level) {
            return Some(*cell);
        }
        let cell = CellId::from_geo(self.geo(), level)?;
        self.cells.insert(level, cell);
        Some(cell)
    }

    /// Drop all memoized cells. Must be called whenever `lat`/`lng` change.
    pub fn clear_cell_cache(&mut self) {
        self.cells.clear();
    }
}

/// The classified point sets, one map per category.
#[derive(Debug, Default)]
pub struct TrackedPointStore {
    categories: [FxHashMap<PointId, TrackedPoint>; 3],
}

fn slot(category: Category) -> usize {
    match category {
        Category::Resource => 0,
        Category::Settlement => 1,
        Category::NotGame => 2,
    }
}

impl TrackedPointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `point` under `category`, replacing any previous
    /// classification of the same id.
    pub fn add(&mut self, category: Category, point: TrackedPoint) {
        self.remove(&point.id);
        self.categories[slot(category)].insert(point.id.clone(), point);
    }

    /// Remove a point from whichever category holds it.
    pub fn remove(&mut self, id: &str) -> Option<(Category, TrackedPoint)> {
        for category in Category::ALL {
            if let Some(point) = self.categories[slot(category)].remove(id) {
                return Some((category, point));
            }
        }
        None
    }

    pub fn category_of(&self, id: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|&c| self.categories[slot(c)].contains_key(id))
    }

    pub fn get(&self, id: &str) -> Option<&TrackedPoint> {
        self.categories.iter().find_map(|m| m.get(id))
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut TrackedPoint> {
        self.categories.iter_mut().find_map(|m| m.get_mut(id))
    }

    pub fn points(&self, category: Category) -> impl Iterator<Item = &TrackedPoint> {
        self.categories[slot(category)].values()
    }

    pub(crate) fn points_mut(
        &mut self,
        category: Category,
    ) -> impl Iterator<Item = &mut TrackedPoint> {
        self.categories[slot(category)].values_mut()
    }

    pub fn len(&self) -> usize {
        self.categories.iter().map(|m| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.iter().all(|m| m.is_empty())
    }

    /// Relocate a stored point, invalidating its cell cache.
    ///
    /// The point is marked as present in the live set: a move is only ever
    /// confirmed from a live observation.
    pub fn move_point(&mut self, id: &str, to: GeoPoint) -> bool {
        match self.get_mut(id) {
            Some(point) => {
                point.lat = to.lat;
                point.lng = to.lng;
                point.clear_cell_cache();
                point.exists_in_live_set = true;
                true
            }
            None => false,
        }
    }

    /// Forget live-set presence for every point, at the start of a full
    /// live refresh.
    pub fn clear_live_flags(&mut self) {
        for m in &mut self.categories {
            for point in m.values_mut() {
                point.exists_in_live_set = false;
            }
        }
    }
}
