use thiserror::Error;

/// Fatal session conditions. All of these park the scheduler in a terminal
/// error state; the core never retries on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("hand tracker unavailable: {0}")]
    TrackerUnavailable(String),

    #[error("combination suggestion failed: {0}")]
    SuggestionFailed(String),

    #[error("suggestion contained no valid punches: {0:?}")]
    EmptyCombination(String),
}
