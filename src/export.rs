//! Flat import/export records for the persistence collaborator.
//!
//! The core does not dictate a storage location, only the record shape: a
//! reloaded record must land in the same cell at the same level as the point
//! it was saved from. JSON carries the full data set; CSV is a lossy
//! spreadsheet view of the classified sets.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cell::CellId;
use crate::error::ImportError;
use crate::geo::LatLngBounds;
use crate::store::{Category, TrackedPoint, TrackedPointStore};
use crate::util::Timed;

/// One persisted point. Only the minimum survives a save; runtime state
/// (live flags, cell memos) is rebuilt after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub guid: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtype: Option<String>,
}

impl PointRecord {
    fn from_point(point: &TrackedPoint) -> Self {
        Self {
            guid: point.id.clone(),
            lat: point.lat,
            lng: point.lng,
            name: point.name.clone(),
            rtype: point.rtype.clone(),
        }
    }

    fn into_point(self) -> TrackedPoint {
        let mut point = TrackedPoint::new(self.guid, self.lat, self.lng, self.name);
        point.rtype = self.rtype;
        point
    }
}

/// The full data set, one record map per category.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ExportData {
    #[serde(default)]
    pub resources: FxHashMap<String, PointRecord>,
    #[serde(default)]
    pub settlements: FxHashMap<String, PointRecord>,
    #[serde(default, rename = "notgame")]
    pub not_game: FxHashMap<String, PointRecord>,
}

fn category_records(
    store: &TrackedPointStore,
    category: Category,
    screen: Option<&LatLngBounds>,
) -> FxHashMap<String, PointRecord> {
    store
        .points(category)
        .filter(|p| screen.map_or(true, |b| b.contains_point(p.geo())))
        .map(|p| (p.id.clone(), PointRecord::from_point(p)))
        .collect()
}

/// Snapshot the store, optionally restricted to points inside `screen`.
pub fn export_data(store: &TrackedPointStore, screen: Option<&LatLngBounds>) -> ExportData {
    ExportData {
        resources: category_records(store, Category::Resource, screen),
        settlements: category_records(store, Category::Settlement, screen),
        not_game: category_records(store, Category::NotGame, screen),
    }
}

pub fn export_json(store: &TrackedPointStore, screen: Option<&LatLngBounds>) -> String {
    serde_json::to_string(&export_data(store, screen)).expect("export serialize")
}

/// Merge previously exported JSON into the store. Records whose id is
/// already classified are left untouched. Returns the number of points
/// added.
pub fn import_json(store: &mut TrackedPointStore, json: &str) -> Result<usize, ImportError> {
    let _t = Timed::info("import point data");
    let data: ExportData = serde_json::from_str(json)?;

    let mut added = 0;
    let sets = [
        (Category::Resource, data.resources),
        (Category::Settlement, data.settlements),
        (Category::NotGame, data.not_game),
    ];
    for (category, records) in sets {
        for (_, record) in records {
            if !record.lat.is_finite() || !record.lng.is_finite() {
                return Err(ImportError::BadRecord { id: record.guid });
            }
            if store.category_of(&record.guid).is_some() {
                continue;
            }
            store.add(category, record.into_point());
            added += 1;
        }
    }
    log::info!("import: {} points added", added);
    Ok(added)
}

fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn csv_rows(
    store: &TrackedPointStore,
    category: Category,
    label: &str,
    screen: Option<&LatLngBounds>,
    out: &mut Vec<String>,
) {
    for p in store.points(category) {
        if let Some(bounds) = screen {
            if !bounds.contains_point(p.geo()) {
                continue;
            }
        }
        let row = [
            escape_csv(p.name.as_deref().unwrap_or("")),
            p.lat.to_string(),
            p.lng.to_string(),
            label.to_string(),
            escape_csv(p.rtype.as_deref().unwrap_or("")),
        ];
        out.push(row.join(","));
    }
}

/// CSV rows `name,lat,lng,type,rtype` for the resource and settlement sets.
pub fn export_csv(store: &TrackedPointStore, screen: Option<&LatLngBounds>) -> String {
    let mut rows = Vec::new();
    csv_rows(store, Category::Resource, "resource", screen, &mut rows);
    csv_rows(store, Category::Settlement, "settlement", screen, &mut rows);
    rows.join("\n")
}

/// Classified members of one cell, keyed by the cell token in the summary.
#[derive(Debug, Default, Serialize)]
pub struct CellSummary {
    pub resources: Vec<PointRecord>,
    pub settlements: Vec<PointRecord>,
}

/// Per-cell summary of classified data at `level`, for sharing aggregated
/// grid state. Cells without classified members are omitted.
pub fn export_cell_summary(
    store: &mut TrackedPointStore,
    level: u8,
    screen: Option<&LatLngBounds>,
) -> FxHashMap<String, CellSummary> {
    let mut cells: FxHashMap<CellId, CellSummary> = FxHashMap::default();

    for category in [Category::Resource, Category::Settlement] {
        let records: Vec<PointRecord> = store
            .points(category)
            .map(PointRecord::from_point)
            .collect();
        for record in records {
            let Some(point) = store.get_mut(&record.guid) else {
                continue;
            };
            let Some(cell) = point.cell_at(level) else {
                continue;
            };
            if let Some(bounds) = screen {
                if !bounds.contains(&cell.bounds()) {
                    continue;
                }
            }
            let summary = cells.entry(cell).or_default();
            match category {
                Category::Resource => summary.resources.push(record),
                _ => summary.settlements.push(record),
            }
        }
    }

    cells
        .into_iter()
        .map(|(cell, summary)| (cell.to_string(), summary))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> TrackedPointStore {
        let mut store = TrackedPointStore::new();
        let mut ore = TrackedPoint::new("r1", 47.6, -122.3, Some("North Quarry".to_string()));
        ore.rtype = Some("Ore".to_string());
        store.add(Category::Resource, ore);
        store.add(
            Category::Settlement,
            TrackedPoint::new("s1", 47.61, -122.31, Some("Old, \"Town\"".to_string())),
        );
        store.add(
            Category::NotGame,
            TrackedPoint::new("n1", -10.0, 30.0, None),
        );
        store
    }

    #[test]
    fn test_json_round_trip_preserves_cells() {
        let mut store = sample_store();
        let json = export_json(&store, None);

        let mut reloaded = TrackedPointStore::new();
        let added = import_json(&mut reloaded, &json).unwrap();
        assert_eq!(added, 3);

        for id in ["r1", "s1", "n1"] {
            let before = store.get_mut(id).unwrap().cell_at(17).unwrap();
            let after = reloaded.get_mut(id).unwrap().cell_at(17).unwrap();
            assert_eq!(before, after, "cell drifted across save/load for {}", id);
        }
        assert_eq!(
            reloaded.get("r1").unwrap().rtype.as_deref(),
            Some("Ore")
        );
        assert_eq!(reloaded.category_of("n1"), Some(Category::NotGame));
    }

    #[test]
    fn test_import_skips_known_ids() {
        let mut store = sample_store();
        let json = export_json(&store, None);
        let added = import_json(&mut store, &json).unwrap();
        assert_eq!(added, 0);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_import_rejects_garbage() {
        let mut store = TrackedPointStore::new();
        assert!(matches!(
            import_json(&mut store, "[[["),
            Err(ImportError::Parse(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_viewport_restricted_export() {
        let store = sample_store();
        let screen = LatLngBounds::new(47.0, -123.0, 48.0, -122.0);
        let data = export_data(&store, Some(&screen));
        assert_eq!(data.resources.len(), 1);
        assert_eq!(data.settlements.len(), 1);
        assert!(data.not_game.is_empty());
    }

    #[test]
    fn test_csv_quoting() {
        let store = sample_store();
        let csv = export_csv(&store, None);
        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("North Quarry,47.6,-122.3,resource,Ore"));
        assert!(rows[1].starts_with("\"Old, \"\"Town\"\"\",47.61,-122.31,settlement,"));
    }

    #[test]
    fn test_cell_summary_groups_classified_only() {
        let mut store = sample_store();
        let summary = export_cell_summary(&mut store, 15, None);
        // Resource and settlement are ~1.2km apart: distinct level-15 cells.
        assert_eq!(summary.len(), 2);
        for (token, cell) in &summary {
            assert!(token.starts_with('F'));
            assert_eq!(cell.resources.len() + cell.settlements.len(), 1);
        }
        // The not-game point contributes nothing.
        let all: usize = summary
            .values()
            .map(|c| c.resources.len() + c.settlements.len())
            .sum();
        assert_eq!(all, 2);

        let nowhere = LatLngBounds::new(0.0, 0.0, 1.0, 1.0);
        assert!(export_cell_summary(&mut store, 15, Some(&nowhere)).is_empty());
    }
}
