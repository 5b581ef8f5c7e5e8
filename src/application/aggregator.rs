// Aggregator - Windowed running average across several players' FPS series
//
// Pooled samples are averaged inside a symmetric window that slides over
// regularly spaced sample centers, at most MAX_SAMPLE_CENTERS of them.
// An optional smoothing pass re-weights each point with its neighbours.

use serde::{Deserialize, Serialize};

use crate::application::trend_fitter::fit_trend;
use crate::domain::dashboard::AggregateView;
use crate::domain::log_event::PlayerCountSample;
use crate::domain::telemetry::{AggregatePoint, ChartDomain, CounterPoint, TimeSeriesPoint};
use crate::domain::timestamp;

/// Upper bound on the number of sample centers per aggregation.
pub const MAX_SAMPLE_CENTERS: usize = 200;

/// Largest distance between neighbouring sample centers before the cap kicks in.
pub const MAX_SAMPLE_STEP_MS: f64 = 2000.0;

pub const DEFAULT_WINDOW_MS: u64 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationParams {
    pub window_ms: u64,
    pub smoothing_radius: usize,
}

impl Default for AggregationParams {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            smoothing_radius: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PooledPoint<'a> {
    timestamp_ms: f64,
    value: f64,
    player: &'a str,
}

/// Build the running-average view for `players`.
///
/// # Parameters
///
/// * `players` - Selected players, in selection order
/// * `get_series` - Data access for one player's points
/// * `counter` - Optional secondary series (concurrent player counts)
/// * `params` - Window size and smoothing radius
///
/// # Returns
///
/// An empty view with the default domain when no points were pooled.
pub fn aggregate<F>(
    players: &[String],
    get_series: F,
    counter: Option<&[PlayerCountSample]>,
    params: AggregationParams,
) -> AggregateView
where
    F: Fn(&str) -> Vec<TimeSeriesPoint>,
{
    let pool = pool_points(players, get_series);
    let (Some(first), Some(last)) = (pool.first(), pool.last()) else {
        tracing::debug!("No points pooled for {} players", players.len());
        return AggregateView::empty(params.window_ms, params.smoothing_radius);
    };

    let window_ms = params.window_ms as f64;
    let centers = sample_centers(first.timestamp_ms, last.timestamp_ms, window_ms);
    let sampled = centers.len();

    let raw: Vec<AggregatePoint> = centers
        .into_iter()
        .filter_map(|center| average_window(&pool, center, window_ms / 2.0))
        .collect();

    let points = if params.smoothing_radius > 0 {
        smooth(&raw, params.smoothing_radius)
    } else {
        raw
    };

    tracing::debug!(
        "Aggregated {} pooled points into {} of {} sample centers (window {}ms, smoothing {})",
        pool.len(),
        points.len(),
        sampled,
        params.window_ms,
        params.smoothing_radius
    );

    let trend_input: Vec<TimeSeriesPoint> = points
        .iter()
        .map(|p| TimeSeriesPoint::new(p.time.clone(), p.average_value))
        .collect();
    let trend = fit_trend(&trend_input);

    let counter = align_counter(counter.unwrap_or_default());
    let counter_max = counter.iter().map(|c| c.count).max();
    let domain = aggregate_domain(&points, &counter);

    AggregateView {
        window_ms: params.window_ms,
        smoothing_radius: params.smoothing_radius,
        points,
        trend,
        reference_lines: domain.reference_lines(),
        domain,
        counter,
        counter_max,
    }
}

fn pool_points<'a, F>(players: &'a [String], get_series: F) -> Vec<PooledPoint<'a>>
where
    F: Fn(&str) -> Vec<TimeSeriesPoint>,
{
    let mut pool = Vec::new();
    for player in players {
        for point in get_series(player) {
            let timestamp_ms = timestamp::epoch_ms(&point.time);
            if !timestamp_ms.is_finite() {
                tracing::warn!("Skipping point with unparseable time {:?} for {}", point.time, player);
                continue;
            }
            pool.push(PooledPoint {
                timestamp_ms,
                value: point.value,
                player: player.as_str(),
            });
        }
    }

    pool.sort_by(|a, b| a.timestamp_ms.total_cmp(&b.timestamp_ms));
    pool
}

/// Regularly spaced centers from `start` to `end`, never more than the cap.
fn sample_centers(start: f64, end: f64, window_ms: f64) -> Vec<f64> {
    let range = end - start;
    if range <= 0.0 {
        return vec![start];
    }

    let step = (window_ms / 4.0)
        .min(MAX_SAMPLE_STEP_MS)
        .max(range / (MAX_SAMPLE_CENTERS - 1) as f64);
    let count = ((range / step).floor() as usize + 1).min(MAX_SAMPLE_CENTERS);

    (0..count).map(|i| start + step * i as f64).collect()
}

/// Average of every pooled point in `[center - half, center + half]`.
fn average_window(pool: &[PooledPoint<'_>], center: f64, half: f64) -> Option<AggregatePoint> {
    let lo = pool.partition_point(|p| p.timestamp_ms < center - half);
    let hi = pool.partition_point(|p| p.timestamp_ms <= center + half);
    let window = pool.get(lo..hi).filter(|w| !w.is_empty())?;

    let mut players: Vec<&str> = Vec::new();
    for point in window {
        if !players.contains(&point.player) {
            players.push(point.player);
        }
    }

    let average = window.iter().map(|p| p.value).sum::<f64>() / window.len() as f64;

    Some(AggregatePoint {
        time_center: center,
        time: timestamp::iso_from_epoch_ms(center),
        average_value: average,
        raw_average_value: average,
        contributing_player_count: players.len(),
        contributing_point_count: window.len(),
        contributing_players: players.into_iter().map(str::to_string).collect(),
    })
}

/// Distance-weighted mean of raw averages within `radius` positions.
fn smooth(points: &[AggregatePoint], radius: usize) -> Vec<AggregatePoint> {
    points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let lo = i.saturating_sub(radius);
            let hi = i.saturating_add(radius).min(points.len() - 1);

            let (weighted, total_weight) = points[lo..=hi].iter().enumerate().fold(
                (0.0, 0.0),
                |(weighted, total), (offset, neighbour)| {
                    let weight = 1.0 / ((lo + offset).abs_diff(i) as f64 + 1.0);
                    (weighted + neighbour.raw_average_value * weight, total + weight)
                },
            );

            AggregatePoint {
                average_value: weighted / total_weight,
                ..point.clone()
            }
        })
        .collect()
}

fn align_counter(samples: &[PlayerCountSample]) -> Vec<CounterPoint> {
    samples
        .iter()
        .map(|s| CounterPoint {
            time_ms: s.timestamp_ms as f64,
            time: s.time.clone(),
            count: s.count,
        })
        .collect()
}

fn aggregate_domain(points: &[AggregatePoint], counter: &[CounterPoint]) -> ChartDomain {
    let values = points.iter().map(|p| p.average_value).filter(|v| v.is_finite());
    let (value_min, value_max) = min_max(values);
    if !value_min.is_finite() || !value_max.is_finite() {
        return ChartDomain::DEFAULT;
    }

    let times = points
        .iter()
        .map(|p| p.time_center)
        .chain(counter.iter().map(|c| c.time_ms))
        .filter(|t| t.is_finite());
    let (time_min, time_max) = min_max(times);

    ChartDomain::padded(time_min, time_max, value_min, value_max)
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
        (min.min(v), max.max(v))
    })
}
