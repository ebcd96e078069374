use std::fmt::{Display, Formatter};

/// Result type used by the playback crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced by track assignment and engine configuration.
///
/// Rejected operations (invalid rate, redundant play/pause, vetoed seeks) are
/// reported through boolean return values instead; only contract violations
/// reach this enum.
#[derive(Debug)]
pub enum EngineError {
    InvalidActionInterval {
        action_id: String,
        start: f64,
        end: f64,
    },
    DuplicateActionId {
        action_id: String,
    },
    UnknownTrack {
        track_id: String,
    },
    Preload {
        action_id: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidActionInterval {
                action_id,
                start,
                end,
            } => write!(
                f,
                "invalid interval for action {action_id}: start {start} must be less than end {end}"
            ),
            Self::DuplicateActionId { action_id } => {
                write!(f, "duplicate action id across tracks: {action_id}")
            }
            Self::UnknownTrack { track_id } => write!(f, "track not found: {track_id}"),
            Self::Preload { action_id, source } => {
                write!(f, "preload failed for action {action_id} ({source})")
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Preload { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
