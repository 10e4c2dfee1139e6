//! Session settings consumed by the grid and reconciliation layers.

use serde::{Deserialize, Serialize};

/// One grid overlay the renderer should draw. Level 0 disables the entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDisplay {
    pub level: u8,
    pub width: u32,
    pub color: String,
    pub opacity: f64,
}

/// Tunable knobs, serialized alongside the point data.
///
/// Higher levels mean finer cells: stricter duplicate detection, more
/// ambiguous clusters, and a smaller missing-detection blast radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Grid overlays to draw, coarse to fine.
    pub grids: Vec<GridDisplay>,
    /// Finest grouping level, used for duplicate and cluster detection.
    pub group_level: u8,
    /// Level used for cell scores and the cell export summary.
    pub score_level: u8,
    /// Run missing/moved analysis on live-feed updates.
    pub analyze_missing: bool,
    /// Quiet period before recomputing after a burst of live events.
    pub debounce_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grids: vec![
                GridDisplay {
                    level: 14,
                    width: 5,
                    color: "#004D40".to_string(),
                    opacity: 0.5,
                },
                GridDisplay {
                    level: 0,
                    width: 2,
                    color: "#388E3C".to_string(),
                    opacity: 0.5,
                },
            ],
            group_level: 17,
            score_level: 15,
            analyze_missing: true,
            debounce_ms: 1000,
        }
    }
}

impl Settings {
    /// Parse stored settings, falling back to defaults when the payload is
    /// absent or malformed (stale persisted settings must never brick a
    /// session).
    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_default()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("settings serialize")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut settings = Settings::default();
        settings.group_level = 16;
        settings.analyze_missing = false;
        let back = Settings::from_json(&settings.to_json());
        assert_eq!(back, settings);
    }

    #[test]
    fn test_malformed_json_falls_back_to_defaults() {
        assert_eq!(Settings::from_json("not json"), Settings::default());
        assert_eq!(Settings::from_json("{}"), Settings::default());
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let settings = Settings::from_json(r#"{"group_level": 15}"#);
        assert_eq!(settings.group_level, 15);
        assert_eq!(settings.score_level, Settings::default().score_level);
        assert!(settings.analyze_missing);
    }
}
