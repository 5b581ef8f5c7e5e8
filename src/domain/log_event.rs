// Parsed log domain models
use serde::Serialize;
use std::collections::HashSet;

use super::telemetry::TimeSeriesPoint;

/// One frame-rate report for one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FpsSample {
    /// Timestamp exactly as it appeared in the log.
    pub time: String,
    pub player: String,
    pub fps: u32,
    #[serde(skip)]
    pub timestamp_ms: i64,
}

impl FpsSample {
    pub fn new(time: String, player: String, fps: u32, timestamp_ms: i64) -> Self {
        Self {
            time,
            player,
            fps,
            timestamp_ms,
        }
    }
}

/// Concurrent player count reported by the instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerCountSample {
    pub time: String,
    pub count: u32,
    #[serde(skip)]
    pub timestamp_ms: i64,
}

impl PlayerCountSample {
    pub fn new(time: String, count: u32, timestamp_ms: i64) -> Self {
        Self {
            time,
            count,
            timestamp_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Event {
    Fps(FpsSample),
    PlayerCount(PlayerCountSample),
}

impl Event {
    pub fn time(&self) -> &str {
        match self {
            Event::Fps(sample) => &sample.time,
            Event::PlayerCount(sample) => &sample.time,
        }
    }

    pub fn timestamp_ms(&self) -> i64 {
        match self {
            Event::Fps(sample) => sample.timestamp_ms,
            Event::PlayerCount(sample) => sample.timestamp_ms,
        }
    }
}

/// Result of parsing one log document.
///
/// `events` is chronological and `players` lists every FPS reporter once,
/// in the order they first appeared.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedLog {
    pub events: Vec<Event>,
    pub players: Vec<String>,
    pub has_player_count: bool,
}

impl ParsedLog {
    /// Merge the two sample streams into one log.
    ///
    /// FPS samples go first, then a stable sort by timestamp, so equal
    /// instants keep their encounter order within each stream.
    pub fn from_samples(fps: Vec<FpsSample>, player_counts: Vec<PlayerCountSample>) -> Self {
        let mut seen = HashSet::new();
        let players: Vec<String> = fps
            .iter()
            .filter(|sample| seen.insert(sample.player.as_str()))
            .map(|sample| sample.player.clone())
            .collect();

        let has_player_count = !player_counts.is_empty();

        let mut events: Vec<Event> = fps
            .into_iter()
            .map(Event::Fps)
            .chain(player_counts.into_iter().map(Event::PlayerCount))
            .collect();
        events.sort_by_key(Event::timestamp_ms);

        Self {
            events,
            players,
            has_player_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn has_player(&self, player: &str) -> bool {
        self.players.iter().any(|p| p == player)
    }

    pub fn fps_samples(&self) -> impl Iterator<Item = &FpsSample> {
        self.events.iter().filter_map(|event| match event {
            Event::Fps(sample) => Some(sample),
            Event::PlayerCount(_) => None,
        })
    }

    pub fn player_count_samples(&self) -> Vec<PlayerCountSample> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::PlayerCount(sample) => Some(sample.clone()),
                Event::Fps(_) => None,
            })
            .collect()
    }

    /// FPS points for one player in time order. Unknown players yield an empty series.
    pub fn player_series(&self, player: &str) -> Vec<TimeSeriesPoint> {
        self.fps_samples()
            .filter(|sample| sample.player == player)
            .map(|sample| TimeSeriesPoint::new(sample.time.clone(), f64::from(sample.fps)))
            .collect()
    }
}
