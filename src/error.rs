//! Error types for the scoring pipeline.

use thiserror::Error;

use crate::tracker::{TrackId, TrackState};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Configuration rejected at load time.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// A frame arrived with a lower index or an earlier timestamp than its predecessor.
    #[error(
        "frame {frame_index} (t={timestamp:.3}s) delivered out of order after frame {previous_index} (t={previous_timestamp:.3}s)"
    )]
    OutOfOrderFrame {
        frame_index: u64,
        timestamp: f64,
        previous_index: u64,
        previous_timestamp: f64,
    },

    #[error("frame {frame_index} has invalid timestamp {timestamp}")]
    InvalidTimestamp { frame_index: u64, timestamp: f64 },

    #[error("track {track_id} cannot leave state {from:?}")]
    InvalidTransition { track_id: TrackId, from: TrackState },

    #[error("no active track with id {0}")]
    UnknownTrack(TrackId),

    #[error("detection source failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("unknown object class: {0}")]
    UnknownClass(String),
}
