//! Cube-face cell indexing on the sphere, plus cell-based reconciliation of
//! tracked points of interest against a live map feed.
//!
//! The sphere is projected onto the six faces of an inscribed cube. Each face
//! is subdivided into a `2^level × 2^level` grid after a quadratic warp that
//! keeps cell areas roughly equal across a face. A [`CellId`] addresses one
//! square of that grid; cells at the same level tile the sphere with no gaps
//! or overlaps.
//!
//! On top of the grid, [`group_by_cell`] buckets tracked points per cell and
//! [`ReconciliationState`] compares a classified data set against points
//! observed on a live feed: duplicate candidates sharing a cell with a known
//! point are dropped, cells holding several unknown points are queued for a
//! manual decision, and classified points that vanished from the feed are
//! flagged as missing unless a same-name point in the same cell shows they
//! merely moved.
//!
//! # Example
//!
//! ```
//! use geocell::{CellId, GeoPoint};
//!
//! let p = GeoPoint::new(47.6062, -122.3321);
//! let cell = CellId::from_geo(p, 17).unwrap();
//!
//! // A point a few centimeters away lands in the same level-17 cell.
//! let q = GeoPoint::new(47.6062001, -122.3321001);
//! assert_eq!(cell, CellId::from_geo(q, 17).unwrap());
//! ```

mod cell;
mod error;
mod geo;
mod projection;
mod util;

pub mod export;
pub mod grid;
pub mod group;
pub mod reconcile;
pub mod settings;
pub mod store;

pub use cell::{CellId, EDGE_DELTAS, MAX_LEVEL};
pub use error::ImportError;
pub use geo::{GeoPoint, LatLngBounds};
pub use group::{group_by_cell, CellBucket, CellBuckets};
pub use reconcile::{AmbiguousCluster, MovedPair, ReconciliationState, RefreshDebounce};
pub use settings::Settings;
pub use store::{Category, PointId, TrackedPoint, TrackedPointStore};
