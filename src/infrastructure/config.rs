use anyhow::Context;
use serde::Deserialize;

use crate::application::aggregator::{AggregationParams, DEFAULT_WINDOW_MS};
use crate::application::log_parser::DEFAULT_PREFIX;

/// Running-average window sizes offered to a UI.
pub const WINDOW_PRESETS_MS: [u64; 4] = [10_000, 30_000, 60_000, 120_000];

pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

const CONFIG_FILE: &str = "config/analyzer";
const ENV_PREFIX: &str = "FPS_ANALYZER";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Base log prefix; the FPS and PlayerCount tags are derived from it.
    pub prefix: String,
    pub window_ms: u64,
    pub smoothing_radius: usize,
    /// Quiet period before a burst of parameter changes triggers aggregation.
    pub debounce_ms: u64,
    /// Default tracing directive when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            window_ms: DEFAULT_WINDOW_MS,
            smoothing_radius: 0,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            log_filter: "info".to_string(),
        }
    }
}

impl AnalyzerConfig {
    pub fn aggregation_params(&self) -> AggregationParams {
        AggregationParams {
            window_ms: self.window_ms,
            smoothing_radius: self.smoothing_radius,
        }
    }

    fn validate(self) -> anyhow::Result<Self> {
        if self.window_ms == 0 {
            anyhow::bail!("window_ms must be greater than zero");
        }
        Ok(self)
    }
}

/// Load `config/analyzer.{toml,json,yaml}` (optional) overlaid with `FPS_ANALYZER_*` env vars.
pub fn load_analyzer_config() -> anyhow::Result<AnalyzerConfig> {
    load_analyzer_config_from(CONFIG_FILE)
}

pub fn load_analyzer_config_from(path: &str) -> anyhow::Result<AnalyzerConfig> {
    let defaults = AnalyzerConfig::default();
    let settings = config::Config::builder()
        .set_default("prefix", defaults.prefix)?
        .set_default("window_ms", defaults.window_ms)?
        .set_default("smoothing_radius", defaults.smoothing_radius as u64)?
        .set_default("debounce_ms", defaults.debounce_ms)?
        .set_default("log_filter", defaults.log_filter)?
        .add_source(config::File::with_name(path).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()
        .with_context(|| format!("Failed to load analyzer configuration from {}", path))?;

    let config: AnalyzerConfig = settings
        .try_deserialize()
        .context("Invalid analyzer configuration")?;
    config.validate()
}
