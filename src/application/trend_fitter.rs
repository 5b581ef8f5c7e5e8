// Least-squares trend line over a time series
use crate::domain::telemetry::{TimeSeriesPoint, TrendSegment};
use crate::domain::timestamp;

/// Fit an ordinary least-squares line through `points`.
///
/// Returns `None` for fewer than two points or when every point shares
/// the same timestamp. The segment endpoints sit at the first and last
/// input points and reuse their time strings verbatim.
///
/// Times that do not parse become `NaN`; that is a caller contract
/// violation and it propagates into the endpoint values.
pub fn fit_trend(points: &[TimeSeriesPoint]) -> Option<TrendSegment> {
    let (first, last) = match points {
        [first, .., last] => (first, last),
        _ => return None,
    };

    let xs: Vec<f64> = points.iter().map(|p| timestamp::epoch_ms(&p.time)).collect();

    // Work relative to the first timestamp: epoch milliseconds squared
    // exceed f64 precision and the normal equations would cancel to noise.
    let origin = xs[0];
    let n = points.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (x, point) in xs.iter().zip(points) {
        let x = x - origin;
        sum_x += x;
        sum_y += point.value;
        sum_xy += x * point.value;
        sum_xx += x * x;
    }

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    let at = |x: f64| slope * (x - origin) + intercept;

    Some(TrendSegment::new(
        TimeSeriesPoint::new(first.time.clone(), at(xs[0])),
        TimeSeriesPoint::new(last.time.clone(), at(xs[xs.len() - 1])),
    ))
}
