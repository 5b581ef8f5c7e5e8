// Whole-document parsing - classify every line and merge the results
use crate::application::line_classifier::LineClassifier;
use crate::domain::log_event::{Event, ParsedLog};

/// Default base prefix for the world's logging subsystem.
pub const DEFAULT_PREFIX: &str = "MWG_";

/// Parse a complete log document.
///
/// Lines that do not carry one of the two tags derived from `base_prefix`
/// are skipped; malformed lines are dropped without error.
pub fn parse_log(content: &str, base_prefix: &str) -> ParsedLog {
    let classifier = LineClassifier::new(base_prefix);

    let mut fps = Vec::new();
    let mut player_counts = Vec::new();
    let mut candidates = 0usize;
    let mut discarded = 0usize;

    for line in content.lines() {
        if !classifier.may_match(line) {
            continue;
        }
        candidates += 1;

        match classifier.classify(line) {
            Some(Event::Fps(sample)) => fps.push(sample),
            Some(Event::PlayerCount(sample)) => player_counts.push(sample),
            None => {
                discarded += 1;
                tracing::trace!("Discarding malformed line: {}", line);
            }
        }
    }

    tracing::debug!(
        "Parsed log with tag {}: {} candidate lines, {} fps samples, {} player count samples, {} discarded",
        classifier.fps_tag(),
        candidates,
        fps.len(),
        player_counts.len(),
        discarded
    );

    ParsedLog::from_samples(fps, player_counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::trend_fitter::fit_trend;
    use pretty_assertions::assert_eq;

    const SCENARIO_A: &str = "2025.04.04 23:42:13 Debug - [MWG_FPS] Alice FPS: 45\n2025.04.04 23:42:14 Debug - [MWG_FPS] Alice FPS: 50";

    #[test]
    fn test_scenario_single_player() {
        let log = parse_log(SCENARIO_A, DEFAULT_PREFIX);
        assert_eq!(log.players, vec!["Alice".to_string()]);
        assert_eq!(log.events.len(), 2);
        assert!(!log.has_player_count);

        let trend = fit_trend(&log.player_series("Alice")).unwrap();
        assert_eq!(trend.start().time, "2025.04.04 23:42:13");
        assert_eq!(trend.end().time, "2025.04.04 23:42:14");
        assert!((trend.start().value - 45.0).abs() < 1e-9);
        assert!((trend.end().value - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_scenario_foreign_tag() {
        let content = SCENARIO_A.replace("[MWG_FPS]", "[OTHER_FPS]");
        let log = parse_log(&content, DEFAULT_PREFIX);
        assert_eq!(log, ParsedLog::default());
    }

    #[test]
    fn test_scenario_mixed_events_sorted_by_time() {
        let content = [
            "2025.04.04 23:42:15 Debug - [MWG_FPS] Alice FPS: 40",
            "2025.04.04 23:42:12 Debug - [MWG_PlayerCount] 3",
            "2025.04.04 23:42:13 Debug - [MWG_FPS] Bob FPS: 60",
            "2025.04.04 23:42:14 Debug - [MWG_PlayerCount] 4",
        ]
        .join("\r\n");

        let log = parse_log(&content, DEFAULT_PREFIX);
        assert!(log.has_player_count);
        assert_eq!(log.players, vec!["Alice".to_string(), "Bob".to_string()]);

        let times: Vec<&str> = log.events.iter().map(Event::time).collect();
        assert_eq!(
            times,
            vec![
                "2025.04.04 23:42:12",
                "2025.04.04 23:42:13",
                "2025.04.04 23:42:14",
                "2025.04.04 23:42:15",
            ]
        );
    }

    #[test]
    fn test_events_sorted_by_value_not_text() {
        // Leading framework text differs, so verbatim ordering would be wrong
        let content = "B 2025.04.04 23:42:20 [MWG_FPS] Alice FPS: 40\nA 2025.04.04 23:42:10 [MWG_FPS] Alice FPS: 41";
        let log = parse_log(content, DEFAULT_PREFIX);
        let stamps: Vec<i64> = log.events.iter().map(Event::timestamp_ms).collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(log.events[0].time(), "2025.04.04 23:42:10");
    }

    #[test]
    fn test_noise_is_tolerated() {
        let content = "\n\ngarbage\n2025.04.04 23:42:13 [MWG_FPS] Alice FPS: abc\n[MWG_FPS] no timestamp\n2025.04.04 23:42:13 [MWG_FPS] Alice FPS: 30\n";
        let log = parse_log(content, DEFAULT_PREFIX);
        assert_eq!(log.events.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_log("", DEFAULT_PREFIX), ParsedLog::default());
    }

    #[test]
    fn test_custom_prefix() {
        let content = "2025.04.04 23:42:13 [ZZ_FPS] Alice FPS: 30\n2025.04.04 23:42:13 [MWG_FPS] Bob FPS: 30";
        let log = parse_log(content, "ZZ_");
        assert_eq!(log.players, vec!["Alice".to_string()]);
    }
}
