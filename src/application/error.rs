// Application errors - Load and session failures

use thiserror::Error;

/// Failures while turning a log source into text.
///
/// These are the only hard failures in the pipeline; malformed content
/// inside a readable log is tolerated line by line instead.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {origin}: {error}")]
    Io {
        origin: String,
        #[source]
        error: std::io::Error,
    },

    #[error("{origin} is not a text log (invalid UTF-8 at byte {offset})")]
    Undecodable { origin: String, offset: usize },

    #[error("Log load task did not complete: {0}")]
    TaskFailed(String),
}

/// Errors surfaced by an analysis session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No log has been loaded")]
    NoLogLoaded,

    #[error("No log load is in flight")]
    NoPendingLoad,

    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    #[error("Window size must be positive")]
    InvalidWindow,

    #[error("Session closed before an update arrived")]
    Closed,

    #[error(transparent)]
    Load(#[from] LoadError),
}
