//! Road-safety scoring for dashcam detection streams.
//!
//! Per-frame detections are associated into persistent tracks, risk events
//! are derived from the tracks and the raw detections, and the events are
//! aggregated into fixed-duration segments with a bounded score in `[0, 10]`.

pub mod config;
pub mod error;
pub mod integration;
pub mod scoring;
pub mod tracker;

pub use config::{Config, EventWeights};
pub use error::{Error, Result};
pub use integration::{DetectionBuilder, DetectionSource, FrameInput, SafetyPipeline};
pub use scoring::{Event, EventKind, Segment};
pub use tracker::{Detection, ObjectClass, Rect, Track, TrackId, TrackRegistry, TrackState};
