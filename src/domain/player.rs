// Player domain model
use serde::Serialize;

use super::telemetry::TimeSeriesPoint;

const PLAYER_PALETTE: [&str; 8] = [
    "#2563eb", "#dc2626", "#16a34a", "#9333ea", "#ea580c", "#0891b2", "#4f46e5", "#db2777",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub name: String,
    pub color: String,
}

impl Player {
    /// `index` is the player's position in the current selection.
    pub fn new(name: String, index: usize) -> Self {
        let color = PLAYER_PALETTE[index % PLAYER_PALETTE.len()].to_string();
        Self { name, color }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub average_fps: f64,
    pub min_fps: f64,
    pub max_fps: f64,
    pub sample_count: usize,
}

impl PlayerStats {
    pub fn from_series(points: &[TimeSeriesPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let (sum, min, max) = points.iter().fold(
            (0.0, f64::INFINITY, f64::NEG_INFINITY),
            |(sum, min, max), p| (sum + p.value, min.min(p.value), max.max(p.value)),
        );

        Some(Self {
            average_fps: sum / points.len() as f64,
            min_fps: min,
            max_fps: max,
            sample_count: points.len(),
        })
    }
}
