// Time series domain models
use serde::Serialize;

/// FPS reference thresholds drawn across charts.
pub const REFERENCE_FPS: [f64; 3] = [45.0, 30.0, 15.0];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub time: String,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(time: impl Into<String>, value: f64) -> Self {
        Self {
            time: time.into(),
            value,
        }
    }
}

/// A fitted straight line expressed by its two endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TrendSegment {
    pub points: [TimeSeriesPoint; 2],
}

impl TrendSegment {
    pub fn new(start: TimeSeriesPoint, end: TimeSeriesPoint) -> Self {
        Self {
            points: [start, end],
        }
    }

    pub fn start(&self) -> &TimeSeriesPoint {
        &self.points[0]
    }

    pub fn end(&self) -> &TimeSeriesPoint {
        &self.points[1]
    }
}

/// One sample of the windowed running average.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatePoint {
    pub time_center: f64,
    /// ISO-8601 rendering of `time_center`.
    pub time: String,
    /// Displayed value; equals `raw_average_value` unless smoothing ran.
    pub average_value: f64,
    pub raw_average_value: f64,
    pub contributing_player_count: usize,
    pub contributing_point_count: usize,
    pub contributing_players: Vec<String>,
}

/// Secondary counter sample re-timestamped onto the numeric time axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterPoint {
    pub time_ms: f64,
    pub time: String,
    pub count: u32,
}

/// Axis bounds for a chart, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartDomain {
    pub time: [f64; 2],
    pub value: [f64; 2],
}

impl ChartDomain {
    pub const DEFAULT: ChartDomain = ChartDomain {
        time: [0.0, 1.0],
        value: [0.0, 60.0],
    };

    /// Pad raw extents: 2% on the time axis, 10% on the value axis.
    ///
    /// A zero value span is widened to 10 so a flat series still gets
    /// breathing room, and the value floor never drops below 0.
    pub fn padded(time_min: f64, time_max: f64, value_min: f64, value_max: f64) -> Self {
        let time_range = time_max - time_min;
        let value_range = match value_max - value_min {
            r if r == 0.0 || r.is_nan() => 10.0,
            r => r,
        };

        Self {
            time: [time_min - time_range * 0.02, time_max + time_range * 0.02],
            value: [
                (value_min - value_range * 0.1).max(0.0),
                value_max + value_range * 0.1,
            ],
        }
    }

    /// Reference thresholds that fall inside the value axis.
    pub fn reference_lines(&self) -> Vec<f64> {
        REFERENCE_FPS
            .iter()
            .copied()
            .filter(|fps| *fps >= self.value[0] && *fps <= self.value[1])
            .collect()
    }
}

impl Default for ChartDomain {
    fn default() -> Self {
        Self::DEFAULT
    }
}
