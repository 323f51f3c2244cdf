use serde::{Deserialize, Serialize};

use crate::tracker::Detection;

/// Everything the pipeline needs about one frame, resolved up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    pub frame_index: u64,
    /// Seconds of video time
    pub timestamp: f64,
    #[serde(default)]
    pub detections: Vec<Detection>,
    /// Supplied by an external lane heuristic
    #[serde(default)]
    pub lane_departure: bool,
}

impl FrameInput {
    pub fn new(frame_index: u64, timestamp: f64, detections: Vec<Detection>) -> Self {
        Self {
            frame_index,
            timestamp,
            detections,
            lane_departure: false,
        }
    }

    /// Frame at a constant frame rate.
    pub fn at_fps(frame_index: u64, fps: f64, detections: Vec<Detection>) -> Self {
        Self::new(frame_index, frame_index as f64 / fps, detections)
    }

    pub fn with_lane_departure(mut self, lane_departure: bool) -> Self {
        self.lane_departure = lane_departure;
        self
    }
}
