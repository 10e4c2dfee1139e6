//! Cell-based reconciliation of classified data against the live feed.
//!
//! The engine keeps three kinds of findings, all surfaced as data rather
//! than errors: ambiguous clusters (a fine cell holding several unclassified
//! points and no classified one), believed-missing points (classified but
//! never observed in the current sweep), and moved pairs (a classified point
//! whose observed coordinates drifted from the stored ones). The moved check
//! always wins over the missing check.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::cell::CellId;
use crate::geo::{GeoPoint, LatLngBounds};
use crate::group::{group_by_cell, CellBuckets};
use crate::store::{Category, PointId, TrackedPoint, TrackedPointStore};
use crate::util::Timed;

/// Coordinate deltas below this (in degrees) are floating-point noise, not a
/// move. Roughly 0.1mm at the equator.
pub const COORD_EPSILON: f64 = 1e-9;

/// A classified point whose stored location no longer matches the live feed.
#[derive(Debug, Clone)]
pub struct MovedPair {
    /// Id of the stored, classified point.
    pub stored: PointId,
    /// The observation that contradicted it.
    pub observed: TrackedPoint,
}

/// Two or more unclassified points sharing one cell, awaiting a manual
/// decision. Exactly one member ends up classified; the rest are discarded.
#[derive(Debug, Clone)]
pub struct AmbiguousCluster {
    pub cell: CellId,
    /// Members in display order: unnamed first, then alphabetical by name,
    /// ties broken by id.
    pub members: Vec<TrackedPoint>,
}

/// Process-scoped reconciliation state. One instance per session; no hidden
/// globals. All mutation happens through `&mut self`, so a multi-threaded
/// caller serializes access behind one lock.
#[derive(Debug, Default)]
pub struct ReconciliationState {
    /// Live observations not yet classified.
    observed: FxHashMap<PointId, TrackedPoint>,
    /// Points the user declined to classify, or that were dropped as
    /// duplicates of a classified point. Never re-enqueued.
    skipped: FxHashSet<PointId>,
    /// Classified points believed gone from the live set.
    missing: FxHashSet<PointId>,
    moved: Vec<MovedPair>,
    /// Ids present in `moved`, to suppress duplicate pairs across sweeps.
    moved_ids: FxHashSet<PointId>,
    /// Ambiguous clusters in first-enqueued order.
    pending: VecDeque<AmbiguousCluster>,
}

impl ReconciliationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intake for one live-feed event.
    ///
    /// A classified point is marked present; on its first observation of the
    /// sweep a coordinate drift beyond [`COORD_EPSILON`] records a moved
    /// pair, and a stored point without a name picks the observed one up.
    /// An unknown point joins the unclassified set unless previously
    /// skipped.
    pub fn observe_live_point(&mut self, store: &mut TrackedPointStore, observed: TrackedPoint) {
        if let Some(item) = store.get_mut(&observed.id) {
            if !item.exists_in_live_set {
                item.exists_in_live_set = true;
                self.missing.remove(&item.id);

                let drifted = (item.lat - observed.lat).abs() > COORD_EPSILON
                    || (item.lng - observed.lng).abs() > COORD_EPSILON;
                if drifted && self.moved_ids.insert(item.id.clone()) {
                    self.moved.push(MovedPair {
                        stored: item.id.clone(),
                        observed: observed.clone(),
                    });
                }
            }
            if item.name.is_none() && observed.name.is_some() {
                item.name = observed.name;
            }
            return;
        }

        if self.skipped.contains(&observed.id) {
            return;
        }
        self.observed.insert(observed.id.clone(), observed);
    }

    /// Run a full reconciliation pass over everything inside `screen`.
    ///
    /// Groups all points at `level` (the finest grouping level, 17 in the
    /// default settings), keeps only cells fully inside the viewport so the
    /// incomplete edge of the feed cannot produce false findings, then runs
    /// missing detection and ambiguous-cluster detection.
    pub fn sweep(&mut self, store: &mut TrackedPointStore, level: u8, screen: &LatLngBounds) {
        let _t = Timed::debug("reconciliation sweep");
        let buckets =
            group_by_cell(store, &mut self.observed, level).retain_inside_screen(screen);
        self.detect_missing(store, &buckets);
        self.detect_ambiguous_clusters(&buckets);
        log::debug!(
            "sweep: {} pending clusters, {} missing, {} moved",
            self.pending.len(),
            self.missing.len(),
            self.moved.len()
        );
    }

    /// Classify each bucket holding unclassified points.
    ///
    /// A bucket that also holds a classified point treats its unclassified
    /// members as redundant duplicates: they are dropped and marked skipped.
    /// Exactly one unclassified member is left alone (a simpler heuristic
    /// may classify it). Two or more become one ambiguous cluster, enqueued
    /// in bucket order; the pending queue is rebuilt on every call.
    pub fn detect_ambiguous_clusters(&mut self, buckets: &CellBuckets) {
        self.pending.clear();

        for bucket in buckets.iter() {
            if bucket.not_classified.is_empty() {
                continue;
            }

            if bucket.has_classified() {
                for id in &bucket.not_classified {
                    self.skipped.insert(id.clone());
                    self.observed.remove(id);
                }
                continue;
            }

            if bucket.not_classified.len() < 2 {
                continue;
            }

            let mut members: Vec<TrackedPoint> = bucket
                .not_classified
                .iter()
                .filter_map(|id| self.observed.get(id).cloned())
                .collect();
            members.sort_by(display_order);
            self.pending.push_back(AmbiguousCluster {
                cell: bucket.cell,
                members,
            });
        }
    }

    /// Flag classified points that vanished from the live set.
    ///
    /// A point is believed missing when it was never observed this sweep and
    /// no unclassified point with the same name shares its cell. A same-name
    /// match means the entity moved: it produces a moved pair instead and
    /// clears any missing flag.
    pub fn detect_missing(&mut self, store: &TrackedPointStore, buckets: &CellBuckets) {
        for bucket in buckets.iter() {
            for id in bucket.resources.iter().chain(&bucket.settlements) {
                let Some(item) = store.get(id) else {
                    continue;
                };
                if item.exists_in_live_set || self.moved_ids.contains(id) {
                    continue;
                }

                let successor = bucket
                    .not_classified
                    .iter()
                    .find(|nc| {
                        *nc != id
                            && self
                                .observed
                                .get(nc.as_str())
                                .is_some_and(|p| p.name == item.name)
                    })
                    .cloned();
                match successor {
                    Some(nc) => {
                        let observed = self.observed.remove(&nc).expect("bucket member");
                        self.moved_ids.insert(id.clone());
                        self.moved.push(MovedPair {
                            stored: id.clone(),
                            observed,
                        });
                        self.missing.remove(id);
                    }
                    None => {
                        self.missing.insert(id.clone());
                    }
                }
            }
        }
    }

    /// Next ambiguous cluster to resolve, in first-enqueued order.
    pub fn next_cluster(&mut self) -> Option<AmbiguousCluster> {
        self.pending.pop_front()
    }

    /// Resolve a cluster: classify `chosen` under `category`, discard every
    /// member from the unclassified set.
    pub fn resolve_cluster(
        &mut self,
        store: &mut TrackedPointStore,
        cluster: &AmbiguousCluster,
        chosen: &str,
        category: Category,
    ) {
        for member in &cluster.members {
            self.observed.remove(&member.id);
            if member.id == chosen {
                let mut point = member.clone();
                point.exists_in_live_set = true;
                store.add(category, point);
            }
        }
    }

    /// Decline a cluster: every member is dropped and never asked about
    /// again.
    pub fn skip_cluster(&mut self, cluster: &AmbiguousCluster) {
        for member in &cluster.members {
            self.observed.remove(&member.id);
            self.skipped.insert(member.id.clone());
        }
    }

    /// Accept a move: relocate the stored point (invalidating its cell
    /// cache) and drop the pair from the moved set.
    pub fn resolve_move(
        &mut self,
        store: &mut TrackedPointStore,
        stored: &str,
        to: GeoPoint,
    ) -> bool {
        let Some(idx) = self.moved.iter().position(|pair| pair.stored == stored) else {
            return false;
        };
        self.moved.remove(idx);
        self.moved_ids.remove(stored);
        self.missing.remove(stored);
        store.move_point(stored, to)
    }

    /// Reset per-refresh findings at the start of a full live-set refresh.
    /// Skipped ids survive; they reflect user decisions, not feed state.
    pub fn begin_live_refresh(&mut self, store: &mut TrackedPointStore) {
        store.clear_live_flags();
        self.observed.clear();
        self.missing.clear();
        self.moved.clear();
        self.moved_ids.clear();
        self.pending.clear();
    }

    pub fn observed_unclassified(&self) -> impl Iterator<Item = &TrackedPoint> {
        self.observed.values()
    }

    /// Bucket the classified sets plus the unclassified observations at
    /// `level`, without any viewport filter. Feeds rendering and scoring.
    pub fn group_all(&mut self, store: &mut TrackedPointStore, level: u8) -> CellBuckets {
        group_by_cell(store, &mut self.observed, level)
    }

    pub fn is_skipped(&self, id: &str) -> bool {
        self.skipped.contains(id)
    }

    pub fn missing_ids(&self) -> impl Iterator<Item = &PointId> {
        self.missing.iter()
    }

    pub fn is_missing(&self, id: &str) -> bool {
        self.missing.contains(id)
    }

    pub fn moved_pairs(&self) -> &[MovedPair] {
        &self.moved
    }

    pub fn pending_clusters(&self) -> usize {
        self.pending.len()
    }
}

/// Total display order for cluster members: unnamed entries sort before all
/// named ones, named ones alphabetically, ids break ties. Replaces the
/// asymmetric name comparator of older tooling with a consistent ordering.
fn display_order(a: &TrackedPoint, b: &TrackedPoint) -> std::cmp::Ordering {
    match (&a.name, &b.name) {
        (None, None) => a.id.cmp(&b.id),
        (None, Some(_)) => std::cmp::Ordering::Less,
        (Some(_), None) => std::cmp::Ordering::Greater,
        (Some(x), Some(y)) => x.cmp(y).then_with(|| a.id.cmp(&b.id)),
    }
}

/// Cancel-and-reschedule quiet-period timer for batched recomputation.
///
/// Scheduling while a deadline is pending supersedes it. Purely value-based:
/// the caller supplies `Instant`s and decides when to poll, so no threads or
/// timers are involved and tests can feed synthetic clocks.
#[derive(Debug, Clone)]
pub struct RefreshDebounce {
    delay: Duration,
    due: Option<Instant>,
}

impl RefreshDebounce {
    pub fn new(delay: Duration) -> Self {
        Self { delay, due: None }
    }

    /// Schedule (or reschedule) the deadline `delay` after `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.due = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    /// True once per elapsed deadline; clears the schedule.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_order_is_total() {
        let named = |id: &str, name: &str| {
            TrackedPoint::new(id, 0.0, 0.0, Some(name.to_string()))
        };
        let unnamed = |id: &str| TrackedPoint::new(id, 0.0, 0.0, None);

        let mut points = vec![
            named("3", "Borehole"),
            unnamed("2"),
            named("4", "Anvil"),
            unnamed("1"),
        ];
        points.sort_by(display_order);
        let ids: Vec<&str> = points.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "4", "3"]);
    }

    #[test]
    fn test_debounce_supersedes_and_fires_once() {
        let start = Instant::now();
        let mut debounce = RefreshDebounce::new(Duration::from_secs(1));
        assert!(!debounce.fire(start));

        debounce.schedule(start);
        // A burst of events keeps pushing the deadline out.
        debounce.schedule(start + Duration::from_millis(500));
        assert!(!debounce.fire(start + Duration::from_millis(1200)));
        assert!(debounce.fire(start + Duration::from_millis(1500)));
        // Cleared after firing.
        assert!(!debounce.fire(start + Duration::from_secs(10)));
        assert!(!debounce.is_pending());
    }
}
