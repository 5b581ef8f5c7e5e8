// Dashboard service - Builds chart views from a parsed log
use crate::application::aggregator::{AggregationParams, aggregate};
use crate::application::trend_fitter::fit_trend;
use crate::domain::dashboard::{AggregateView, IndividualView, PlayerSeries};
use crate::domain::log_event::ParsedLog;
use crate::domain::player::{Player, PlayerStats};
use crate::domain::telemetry::{ChartDomain, TimeSeriesPoint};
use crate::domain::timestamp;
use std::sync::Arc;

/// Time span used for the individual chart when every point shares one instant.
const SINGLE_INSTANT_SPAN_MS: f64 = 60.0 * 60.0 * 1000.0;

#[derive(Clone)]
pub struct DashboardService {
    log: Arc<ParsedLog>,
}

impl DashboardService {
    pub fn new(log: Arc<ParsedLog>) -> Self {
        Self { log }
    }

    pub fn log(&self) -> &ParsedLog {
        &self.log
    }

    pub fn player_series(&self, player: &str) -> Vec<TimeSeriesPoint> {
        self.log.player_series(player)
    }

    pub fn player_stats(&self, player: &str) -> Option<PlayerStats> {
        PlayerStats::from_series(&self.log.player_series(player))
    }

    /// One series per selected player with its own trend, on shared axes.
    pub fn individual_view(&self, players: &[String]) -> IndividualView {
        let series: Vec<PlayerSeries> = players
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let points = self.log.player_series(name);
                PlayerSeries {
                    player: Player::new(name.clone(), index),
                    trend: fit_trend(&points),
                    stats: PlayerStats::from_series(&points),
                    points,
                }
            })
            .collect();

        let domain = individual_domain(&series);
        tracing::debug!(
            "Built individual view for {} players ({} points)",
            series.len(),
            series.iter().map(|s| s.points.len()).sum::<usize>()
        );

        IndividualView {
            reference_lines: domain.reference_lines(),
            series,
            domain,
        }
    }

    /// Running average across the selected players, with player counts overlaid.
    pub fn aggregate_view(&self, players: &[String], params: AggregationParams) -> AggregateView {
        let counts = self.log.player_count_samples();
        let counter = self.log.has_player_count.then_some(counts.as_slice());

        aggregate(players, |player| self.log.player_series(player), counter, params)
    }
}

fn individual_domain(series: &[PlayerSeries]) -> ChartDomain {
    let (mut time_min, mut time_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut value_min, mut value_max) = (f64::INFINITY, f64::NEG_INFINITY);

    for point in series.iter().flat_map(|s| &s.points) {
        let t = timestamp::epoch_ms(&point.time);
        if t.is_finite() {
            time_min = time_min.min(t);
            time_max = time_max.max(t);
        }
        value_min = value_min.min(point.value);
        value_max = value_max.max(point.value);
    }

    if !time_min.is_finite() || !value_min.is_finite() {
        return ChartDomain::DEFAULT;
    }

    let mut domain = ChartDomain::padded(time_min, time_max, value_min, value_max);
    if time_max == time_min {
        let pad = SINGLE_INSTANT_SPAN_MS * 0.02;
        domain.time = [time_min - pad, time_max + pad];
    }
    domain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::log_parser::parse_log;

    const LOG: &str = "\
2025.04.04 23:42:10 Debug - [MWG_PlayerCount] 2
2025.04.04 23:42:10 Debug - [MWG_FPS] Alice FPS: 40
2025.04.04 23:42:11 Debug - [MWG_FPS] Bob FPS: 60
2025.04.04 23:42:12 Debug - [MWG_FPS] Alice FPS: 50
2025.04.04 23:42:20 Debug - [MWG_PlayerCount] 3
";

    fn service() -> DashboardService {
        DashboardService::new(Arc::new(parse_log(LOG, "MWG_")))
    }

    fn names(players: &[&str]) -> Vec<String> {
        players.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_individual_view() {
        let view = service().individual_view(&names(&["Alice", "Bob"]));

        assert_eq!(view.series.len(), 2);
        let alice = &view.series[0];
        assert_eq!(alice.player.name, "Alice");
        assert_eq!(alice.points.len(), 2);
        assert!(alice.trend.is_some());
        assert_eq!(alice.stats.as_ref().unwrap().average_fps, 45.0);

        // A single sample cannot carry a trend
        let bob = &view.series[1];
        assert!(bob.trend.is_none());
        assert_ne!(alice.player.color, bob.player.color);

        assert_eq!(view.domain.value, [38.0, 62.0]);
        assert_eq!(view.reference_lines, vec![45.0]);
    }

    #[test]
    fn test_individual_view_single_instant_uses_hour_span() {
        let view = service().individual_view(&names(&["Bob"]));
        let t = timestamp::epoch_ms("2025.04.04 23:42:11");
        assert_eq!(view.domain.time, [t - 72_000.0, t + 72_000.0]);
    }

    #[test]
    fn test_individual_view_without_players() {
        let view = service().individual_view(&[]);
        assert!(view.series.is_empty());
        assert_eq!(view.domain, ChartDomain::DEFAULT);
    }

    #[test]
    fn test_aggregate_view_includes_player_counts() {
        let view = service().aggregate_view(&names(&["Alice", "Bob"]), AggregationParams::default());
        assert!(!view.is_empty());
        assert_eq!(view.counter.len(), 2);
        assert_eq!(view.counter_max, Some(3));
    }

    #[test]
    fn test_aggregate_view_without_player_counts() {
        let log = parse_log("2025.04.04 23:42:10 [MWG_FPS] Alice FPS: 40", "MWG_");
        let view = DashboardService::new(Arc::new(log))
            .aggregate_view(&names(&["Alice"]), AggregationParams::default());
        assert!(view.counter.is_empty());
        assert_eq!(view.counter_max, None);
    }

    #[test]
    fn test_player_stats() {
        let service = service();
        let stats = service.player_stats("Bob").unwrap();
        assert_eq!(stats.min_fps, 60.0);
        assert_eq!(stats.sample_count, 1);
        assert!(service.player_stats("Nobody").is_none());
    }
}
