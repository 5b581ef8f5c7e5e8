// Session service - The boundary a UI drives: load a log, pick players, tune the window
use crate::application::aggregator::AggregationParams;
use crate::application::dashboard_service::DashboardService;
use crate::application::error::{LoadError, SessionError};
use crate::application::log_parser::parse_log;
use crate::application::log_source::LogSource;
use crate::domain::dashboard::{AggregateView, IndividualView};
use crate::domain::log_event::ParsedLog;
use crate::infrastructure::config::AnalyzerConfig;
use crate::infrastructure::debounce::debounced;
use futures::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const UPDATE_CHANNEL_SIZE: usize = 100;

/// Summary of a freshly loaded log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSummary {
    pub source: String,
    pub prefix: String,
    pub event_count: usize,
    pub players: Vec<String>,
    pub has_player_count: bool,
}

/// Messages pushed to the consumer of a session.
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    LogLoaded(LogSummary),
    LoadFailed(String),
    Aggregate(AggregateView),
}

#[derive(Debug)]
struct AggregateRequest {
    log: Arc<ParsedLog>,
    players: Vec<String>,
    params: AggregationParams,
}

struct PendingLoad {
    source: String,
    prefix: String,
    handle: JoinHandle<Result<ParsedLog, LoadError>>,
}

pub struct AnalysisSession {
    prefix: String,
    params: AggregationParams,
    log: Option<Arc<ParsedLog>>,
    source: Option<String>,
    selected: Vec<String>,
    pending: Option<PendingLoad>,
    requests: mpsc::UnboundedSender<AggregateRequest>,
    updates: mpsc::Sender<SessionUpdate>,
}

impl AnalysisSession {
    /// Create a session and the receiver its updates are delivered on.
    ///
    /// Must be called inside a tokio runtime: the debounced aggregation
    /// worker is spawned here and lives until the session is dropped.
    pub fn new(config: &AnalyzerConfig) -> (Self, mpsc::Receiver<SessionUpdate>) {
        let (updates, rx) = mpsc::channel(UPDATE_CHANNEL_SIZE);
        let (requests, request_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_aggregation_worker(
            request_rx,
            updates.clone(),
            Duration::from_millis(config.debounce_ms),
        ));

        let session = Self {
            prefix: config.prefix.clone(),
            params: config.aggregation_params(),
            log: None,
            source: None,
            selected: Vec::new(),
            pending: None,
            requests,
            updates,
        };

        (session, rx)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Takes effect on the next load.
    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    pub fn params(&self) -> AggregationParams {
        self.params
    }

    pub fn log(&self) -> Option<&ParsedLog> {
        self.log.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn selected_players(&self) -> &[String] {
        &self.selected
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Start reading and parsing `source` in the background.
    ///
    /// A load already in flight is aborted; its result is never applied.
    pub fn start_load(&mut self, source: Arc<dyn LogSource>) {
        if let Some(previous) = self.pending.take() {
            previous.handle.abort();
            tracing::info!("Superseding in-flight load of {}", previous.source);
        }

        let origin = source.describe();
        let prefix = self.prefix.clone();
        tracing::info!("Loading {} with prefix {}", origin, prefix);

        let task_prefix = prefix.clone();
        let handle = tokio::spawn(async move {
            let content = source.read_text().await?;
            Ok::<_, LoadError>(parse_log(&content, &task_prefix))
        });

        self.pending = Some(PendingLoad {
            source: origin,
            prefix,
            handle,
        });
    }

    /// Wait for the in-flight load and make its log current.
    ///
    /// On success the first player is auto-selected and an aggregation is
    /// scheduled. On failure the previous log (if any) stays current.
    pub async fn finish_load(&mut self) -> Result<LogSummary, SessionError> {
        let pending = self.pending.take().ok_or(SessionError::NoPendingLoad)?;
        let started = Instant::now();

        let outcome = match pending.handle.await {
            Ok(result) => result,
            Err(e) => Err(LoadError::TaskFailed(e.to_string())),
        };

        let parsed = match outcome {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Loading {} failed: {}", pending.source, e);
                self.notify(SessionUpdate::LoadFailed(e.to_string()));
                return Err(e.into());
            }
        };

        let summary = LogSummary {
            source: pending.source.clone(),
            prefix: pending.prefix,
            event_count: parsed.events.len(),
            players: parsed.players.clone(),
            has_player_count: parsed.has_player_count,
        };

        tracing::info!(
            "Loaded {}: {} events, {} players in {:?}",
            summary.source,
            summary.event_count,
            summary.players.len(),
            started.elapsed()
        );

        self.selected = parsed.players.first().cloned().into_iter().collect();
        self.log = Some(Arc::new(parsed));
        self.source = Some(pending.source);

        self.notify(SessionUpdate::LogLoaded(summary.clone()));
        self.schedule_aggregate();

        Ok(summary)
    }

    /// Convenience for `start_load` followed by `finish_load`.
    pub async fn load(&mut self, source: Arc<dyn LogSource>) -> Result<LogSummary, SessionError> {
        self.start_load(source);
        self.finish_load().await
    }

    /// Replace the player selection. Duplicates are dropped, order is kept.
    pub fn select_players(&mut self, players: Vec<String>) -> Result<(), SessionError> {
        let log = self.log.as_ref().ok_or(SessionError::NoLogLoaded)?;

        let mut selected: Vec<String> = Vec::with_capacity(players.len());
        for player in players {
            if !log.has_player(&player) {
                return Err(SessionError::UnknownPlayer(player));
            }
            if !selected.contains(&player) {
                selected.push(player);
            }
        }

        self.selected = selected;
        self.schedule_aggregate();
        Ok(())
    }

    pub fn select_all_players(&mut self) -> Result<(), SessionError> {
        let players = self.log.as_ref().ok_or(SessionError::NoLogLoaded)?.players.clone();
        self.select_players(players)
    }

    pub fn set_window_ms(&mut self, window_ms: u64) -> Result<(), SessionError> {
        if window_ms == 0 {
            return Err(SessionError::InvalidWindow);
        }
        self.params.window_ms = window_ms;
        self.schedule_aggregate();
        Ok(())
    }

    pub fn set_smoothing_radius(&mut self, radius: usize) {
        self.params.smoothing_radius = radius;
        self.schedule_aggregate();
    }

    /// Per-player chart for the current selection, computed immediately.
    pub fn individual_view(&self) -> Result<IndividualView, SessionError> {
        Ok(self.dashboard()?.individual_view(&self.selected))
    }

    /// Running-average chart for the current selection, bypassing the debounce gate.
    pub fn aggregate_view(&self) -> Result<AggregateView, SessionError> {
        Ok(self.dashboard()?.aggregate_view(&self.selected, self.params))
    }

    fn dashboard(&self) -> Result<DashboardService, SessionError> {
        let log = self.log.clone().ok_or(SessionError::NoLogLoaded)?;
        Ok(DashboardService::new(log))
    }

    fn schedule_aggregate(&self) {
        let Some(log) = self.log.clone() else {
            return;
        };

        let request = AggregateRequest {
            log,
            players: self.selected.clone(),
            params: self.params,
        };
        if self.requests.send(request).is_err() {
            tracing::warn!("Aggregation worker has stopped; request dropped");
        }
    }

    fn notify(&self, update: SessionUpdate) {
        if let Err(e) = self.updates.try_send(update) {
            tracing::warn!("Dropping session update: {}", e);
        }
    }
}

impl Drop for AnalysisSession {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }
}

/// Wait for the next aggregate update, skipping other messages.
pub async fn next_aggregate(
    updates: &mut mpsc::Receiver<SessionUpdate>,
) -> Result<AggregateView, SessionError> {
    while let Some(update) = updates.recv().await {
        match update {
            SessionUpdate::Aggregate(view) => return Ok(view),
            SessionUpdate::LogLoaded(summary) => {
                tracing::debug!("Skipping load notification for {}", summary.source);
            }
            SessionUpdate::LoadFailed(message) => {
                tracing::debug!("Skipping load failure notification: {}", message);
            }
        }
    }
    Err(SessionError::Closed)
}

async fn run_aggregation_worker(
    requests: mpsc::UnboundedReceiver<AggregateRequest>,
    updates: mpsc::Sender<SessionUpdate>,
    quiet: Duration,
) {
    let requests = debounced(requests, quiet);
    futures::pin_mut!(requests);

    while let Some(request) = requests.next().await {
        let started = Instant::now();
        let view = DashboardService::new(request.log).aggregate_view(&request.players, request.params);
        tracing::debug!(
            "Aggregated {} players into {} points in {:?}",
            request.players.len(),
            view.points.len(),
            started.elapsed()
        );

        if updates.send(SessionUpdate::Aggregate(view)).await.is_err() {
            tracing::debug!("Session update receiver dropped; stopping aggregation worker");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::file_source::MemoryLogSource;
    use async_trait::async_trait;

    const LOG: &str = "\
2025.04.04 23:42:10 Debug - [MWG_FPS] Alice FPS: 40
2025.04.04 23:42:11 Debug - [MWG_FPS] Bob FPS: 60
2025.04.04 23:42:12 Debug - [MWG_PlayerCount] 2
2025.04.04 23:42:13 Debug - [MWG_FPS] Alice FPS: 50
";

    struct SlowSource {
        delay: Duration,
        content: String,
    }

    #[async_trait]
    impl LogSource for SlowSource {
        fn describe(&self) -> String {
            "slow".to_string()
        }

        async fn read_text(&self) -> Result<String, LoadError> {
            tokio::time::sleep(self.delay).await;
            Ok(self.content.clone())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl LogSource for BrokenSource {
        fn describe(&self) -> String {
            "broken".to_string()
        }

        async fn read_text(&self) -> Result<String, LoadError> {
            Err(LoadError::Undecodable {
                origin: "broken".to_string(),
                offset: 0,
            })
        }
    }

    fn memory(content: &str) -> Arc<dyn LogSource> {
        Arc::new(MemoryLogSource::new("memory", content))
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_auto_selects_first_player() {
        let (mut session, mut updates) = AnalysisSession::new(&AnalyzerConfig::default());
        let summary = session.load(memory(LOG)).await.unwrap();

        assert_eq!(summary.players, vec!["Alice".to_string(), "Bob".to_string()]);
        assert_eq!(summary.event_count, 4);
        assert!(summary.has_player_count);
        assert_eq!(session.selected_players(), &["Alice".to_string()]);

        match updates.recv().await {
            Some(SessionUpdate::LogLoaded(loaded)) => assert_eq!(loaded, summary),
            other => panic!("Expected LogLoaded, got {:?}", other),
        }

        let view = next_aggregate(&mut updates).await.unwrap();
        assert!(view.points.iter().all(|p| p.contributing_players == vec!["Alice".to_string()]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_changes_produce_one_aggregate() {
        let (mut session, mut updates) = AnalysisSession::new(&AnalyzerConfig::default());
        session.load(memory(LOG)).await.unwrap();

        session.select_all_players().unwrap();
        session.set_window_ms(10_000).unwrap();
        session.set_smoothing_radius(1);

        let view = next_aggregate(&mut updates).await.unwrap();
        assert_eq!(view.window_ms, 10_000);
        assert_eq!(view.smoothing_radius, 1);
        assert!(view.points.iter().any(|p| p.contributing_player_count == 2));

        // Nothing else was queued behind the coalesced request
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(updates.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_load_supersedes_in_flight_load() {
        let (mut session, _updates) = AnalysisSession::new(&AnalyzerConfig::default());

        session.start_load(Arc::new(SlowSource {
            delay: Duration::from_secs(30),
            content: "2025.04.04 23:42:10 [MWG_FPS] Stale FPS: 1".to_string(),
        }));
        session.start_load(memory(LOG));

        let summary = session.finish_load().await.unwrap();
        assert_eq!(summary.source, "memory");
        assert!(!session.log().unwrap().has_player("Stale"));
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_log() {
        let (mut session, mut updates) = AnalysisSession::new(&AnalyzerConfig::default());
        session.load(memory(LOG)).await.unwrap();

        let err = session.load(Arc::new(BrokenSource)).await.unwrap_err();
        assert!(matches!(err, SessionError::Load(LoadError::Undecodable { .. })));
        assert!(session.log().unwrap().has_player("Alice"));

        let mut saw_failure = false;
        while let Ok(update) = updates.try_recv() {
            if let SessionUpdate::LoadFailed(message) = update {
                assert!(message.contains("broken"));
                saw_failure = true;
            }
        }
        assert!(saw_failure);
    }

    #[tokio::test]
    async fn test_selection_is_validated() {
        let (mut session, _updates) = AnalysisSession::new(&AnalyzerConfig::default());
        assert!(matches!(
            session.select_players(vec!["Alice".to_string()]),
            Err(SessionError::NoLogLoaded)
        ));

        session.load(memory(LOG)).await.unwrap();
        assert!(matches!(
            session.select_players(vec!["Carol".to_string()]),
            Err(SessionError::UnknownPlayer(name)) if name == "Carol"
        ));

        session
            .select_players(vec!["Bob".to_string(), "Bob".to_string(), "Alice".to_string()])
            .unwrap();
        assert_eq!(session.selected_players(), &["Bob".to_string(), "Alice".to_string()]);
        assert!(matches!(session.set_window_ms(0), Err(SessionError::InvalidWindow)));
    }

    #[tokio::test]
    async fn test_prefix_applies_to_next_load() {
        let (mut session, _updates) = AnalysisSession::new(&AnalyzerConfig::default());
        session.set_prefix("OTHER_");
        let summary = session.load(memory(LOG)).await.unwrap();

        assert_eq!(summary.prefix, "OTHER_");
        assert_eq!(summary.event_count, 0);
        assert!(session.selected_players().is_empty());

        let view = session.aggregate_view().unwrap();
        assert!(view.is_empty());
        assert_eq!(view.domain.value, [0.0, 60.0]);
    }

    #[tokio::test]
    async fn test_views_require_a_log() {
        let (session, _updates) = AnalysisSession::new(&AnalyzerConfig::default());
        assert!(matches!(session.individual_view(), Err(SessionError::NoLogLoaded)));
        assert!(matches!(session.aggregate_view(), Err(SessionError::NoLogLoaded)));
    }

    #[tokio::test]
    async fn test_finish_without_start() {
        let (mut session, _updates) = AnalysisSession::new(&AnalyzerConfig::default());
        assert!(matches!(session.finish_load().await, Err(SessionError::NoPendingLoad)));
    }
}
