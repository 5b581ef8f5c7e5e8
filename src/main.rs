// Main entry point - Wiring for the command-line analyzer
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use fps_log_analyzer::application::session_service::{AnalysisSession, next_aggregate};
use fps_log_analyzer::infrastructure::config::{AnalyzerConfig, load_analyzer_config};
use fps_log_analyzer::infrastructure::file_source::FileLogSource;
use fps_log_analyzer::infrastructure::logging::init_tracing;
use fps_log_analyzer::presentation::report::AnalysisReport;

#[derive(Parser, Debug)]
#[command(
    name = "fps-log-analyzer",
    version,
    about = "Per-player FPS series and running averages from game-server debug logs"
)]
struct Cli {
    /// Log file to analyze
    log_file: PathBuf,
    /// Players to include (default: every player in the log)
    players: Vec<String>,
    /// Base log prefix, e.g. MWG_
    #[arg(long)]
    prefix: Option<String>,
    /// Running-average window in milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    window_ms: Option<u64>,
    /// Smoothing radius in aggregate points (0 disables smoothing)
    #[arg(long)]
    smoothing: Option<usize>,
}

impl Cli {
    fn apply_to(&self, config: &mut AnalyzerConfig) {
        if let Some(prefix) = &self.prefix {
            config.prefix = prefix.clone();
        }
        if let Some(window_ms) = self.window_ms {
            config.window_ms = window_ms;
        }
        if let Some(smoothing) = self.smoothing {
            config.smoothing_radius = smoothing;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = load_analyzer_config()?;
    cli.apply_to(&mut config);

    // Initialize tracing
    init_tracing(&config.log_filter);

    // Create session (application layer) over a file source (infrastructure layer)
    let (mut session, mut updates) = AnalysisSession::new(&config);
    let path = cli.log_file.display().to_string();
    let summary = session
        .load(Arc::new(FileLogSource::new(&cli.log_file)))
        .await
        .with_context(|| format!("Failed to load {}", path))?;

    if summary.players.is_empty() {
        tracing::warn!("No {}FPS lines found in {}", summary.prefix, path);
    }

    if cli.players.is_empty() {
        session.select_all_players()?;
    } else {
        session.select_players(cli.players)?;
    }

    // Render report (presentation layer)
    let aggregate = next_aggregate(&mut updates).await?;
    let report = AnalysisReport::from_session(&session, aggregate)?;
    println!("{}", report.render_json()?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_path_and_players() {
        let cli = Cli::try_parse_from(["fps-log-analyzer", "server.log", "Alice", "Bob"]).unwrap();
        assert_eq!(cli.log_file, PathBuf::from("server.log"));
        assert_eq!(cli.players, vec!["Alice".to_string(), "Bob".to_string()]);
        assert!(cli.prefix.is_none());
    }

    #[test]
    fn test_help_is_not_a_path() {
        let err = Cli::try_parse_from(["fps-log-analyzer", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);

        let err = Cli::try_parse_from(["fps-log-analyzer"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let cli = Cli::try_parse_from([
            "fps-log-analyzer",
            "server.log",
            "--prefix",
            "VRC_",
            "--window-ms",
            "60000",
            "--smoothing",
            "2",
        ])
        .unwrap();

        let mut config = AnalyzerConfig::default();
        cli.apply_to(&mut config);
        assert_eq!(config.prefix, "VRC_");
        assert_eq!(config.window_ms, 60_000);
        assert_eq!(config.smoothing_radius, 2);
        assert_eq!(config.debounce_ms, AnalyzerConfig::default().debounce_ms);
    }

    #[test]
    fn test_zero_window_is_rejected() {
        let err = Cli::try_parse_from(["fps-log-analyzer", "server.log", "--window-ms", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
