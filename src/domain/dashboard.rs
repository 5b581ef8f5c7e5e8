// Dashboard view models handed to a rendering layer
use serde::Serialize;

use super::player::{Player, PlayerStats};
use super::telemetry::{AggregatePoint, ChartDomain, CounterPoint, TimeSeriesPoint, TrendSegment};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSeries {
    pub player: Player,
    pub points: Vec<TimeSeriesPoint>,
    pub trend: Option<TrendSegment>,
    pub stats: Option<PlayerStats>,
}

/// Per-player chart: every selected player on shared axes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualView {
    pub series: Vec<PlayerSeries>,
    pub domain: ChartDomain,
    pub reference_lines: Vec<f64>,
}

/// Running average across the selected players.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateView {
    pub window_ms: u64,
    pub smoothing_radius: usize,
    pub points: Vec<AggregatePoint>,
    pub trend: Option<TrendSegment>,
    pub domain: ChartDomain,
    pub counter: Vec<CounterPoint>,
    pub counter_max: Option<u32>,
    pub reference_lines: Vec<f64>,
}

impl AggregateView {
    pub fn empty(window_ms: u64, smoothing_radius: usize) -> Self {
        Self {
            window_ms,
            smoothing_radius,
            points: Vec::new(),
            trend: None,
            domain: ChartDomain::DEFAULT,
            counter: Vec::new(),
            counter_max: None,
            reference_lines: ChartDomain::DEFAULT.reference_lines(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
