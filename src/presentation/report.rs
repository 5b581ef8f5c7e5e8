// Report - Serializable snapshot of an analysis session
use crate::application::error::SessionError;
use crate::application::session_service::AnalysisSession;
use crate::domain::dashboard::{AggregateView, IndividualView};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub source: String,
    pub prefix: String,
    pub event_count: usize,
    pub players: Vec<String>,
    pub has_player_count: bool,
    pub selected_players: Vec<String>,
    pub individual: IndividualView,
    pub aggregate: AggregateView,
}

impl AnalysisReport {
    /// Snapshot the session's current log and selection.
    ///
    /// `aggregate` is normally the latest debounced update; the individual
    /// view is computed on the spot.
    pub fn from_session(
        session: &AnalysisSession,
        aggregate: AggregateView,
    ) -> Result<Self, SessionError> {
        let log = session.log().ok_or(SessionError::NoLogLoaded)?;

        Ok(Self {
            source: session.source().unwrap_or_default().to_string(),
            prefix: session.prefix().to_string(),
            event_count: log.events.len(),
            players: log.players.clone(),
            has_player_count: log.has_player_count,
            selected_players: session.selected_players().to_vec(),
            individual: session.individual_view()?,
            aggregate,
        })
    }

    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
