// Line classifier - Extracts FPS and player-count samples from single log lines
//
// Supported shapes (anything may precede the timestamp):
//   2025.04.04 23:42:13 Debug      -  [MWG_FPS] ModerateWinGuy FPS: 45
//   2025.04.04 23:42:13 Debug      -  [MWG_PlayerCount] 12

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::log_event::{Event, FpsSample, PlayerCountSample};
use crate::domain::timestamp::{self, LOG_TIMESTAMP};

/// Text after the timestamp of an FPS line: first bracket group, player token, `FPS:`, integer.
static FPS_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\[]*\[([^\]]*)\]\s+(\S+)\s+FPS:\s*([0-9]+)").expect("fps pattern is valid")
});

/// Text after the timestamp of a player-count line: first bracket group, bare integer.
static PLAYER_COUNT_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\[]*\[([^\]]*)\]\s+([0-9]+)\s*$").expect("player count pattern is valid")
});

pub const FPS_SUFFIX: &str = "FPS";
pub const PLAYER_COUNT_SUFFIX: &str = "PlayerCount";

/// Matches lines against the two tags derived from a base prefix.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    fps_tag: String,
    player_count_tag: String,
}

impl LineClassifier {
    /// Brackets in `base_prefix` are ignored, so `"[MWG_]"` and `"MWG_"` are equivalent.
    pub fn new(base_prefix: &str) -> Self {
        let base = base_prefix.replace(['[', ']'], "");
        Self {
            fps_tag: format!("{base}{FPS_SUFFIX}"),
            player_count_tag: format!("{base}{PLAYER_COUNT_SUFFIX}"),
        }
    }

    pub fn fps_tag(&self) -> &str {
        &self.fps_tag
    }

    pub fn player_count_tag(&self) -> &str {
        &self.player_count_tag
    }

    /// Cheap substring check run before any regex work.
    pub fn may_match(&self, line: &str) -> bool {
        line.contains(&self.fps_tag) || line.contains(&self.player_count_tag)
    }

    /// Classify one line.
    ///
    /// # Returns
    ///
    /// `Some(event)` for a well-formed line carrying one of our tags,
    /// `None` for everything else (wrong tag, malformed numbers, impossible dates).
    pub fn classify(&self, line: &str) -> Option<Event> {
        let caps = LOG_TIMESTAMP.captures(line)?;
        let whole = caps.get(0)?;
        let rest = &line[whole.end()..];

        if let Some(fields) = FPS_TAIL.captures(rest) {
            if &fields[1] != self.fps_tag {
                return None;
            }
            let at = timestamp::from_captures(&caps)?;
            let fps = fields[3].parse::<u32>().ok()?;

            return Some(Event::Fps(FpsSample::new(
                whole.as_str().trim().to_string(),
                fields[2].to_string(),
                fps,
                at.timestamp_millis(),
            )));
        }

        if let Some(fields) = PLAYER_COUNT_TAIL.captures(rest) {
            if &fields[1] != self.player_count_tag {
                return None;
            }
            let at = timestamp::from_captures(&caps)?;
            let count = fields[2].parse::<u32>().ok()?;

            return Some(Event::PlayerCount(PlayerCountSample::new(
                whole.as_str().trim().to_string(),
                count,
                at.timestamp_millis(),
            )));
        }

        None
    }
}
