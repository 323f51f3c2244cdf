//! Detections produced by the upstream detector, one per object per frame.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::tracker::rect::Rect;

/// Object class of a detection, fixed on a track for its whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectClass {
    Person,
    Vehicle,
    Animal,
    Pothole,
}

impl ObjectClass {
    /// Map a COCO class id onto the classes this crate scores.
    pub fn from_coco_id(id: u32) -> Option<Self> {
        match id {
            0 | 1 => Some(Self::Person),
            2 | 3 | 5 | 7 => Some(Self::Vehicle),
            15..=23 => Some(Self::Animal),
            _ => None,
        }
    }

    /// Whether detections of this class are associated into tracks.
    /// Potholes are stationary and counted per frame instead.
    pub fn is_tracked(self) -> bool {
        match self {
            Self::Person | Self::Vehicle | Self::Animal => true,
            Self::Pothole => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Vehicle => "vehicle",
            Self::Animal => "animal",
            Self::Pothole => "pothole",
        }
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "person" | "pedestrian" | "bicycle" => Ok(Self::Person),
            "vehicle" | "car" | "bus" | "truck" | "motorcycle" => Ok(Self::Vehicle),
            "animal" | "dog" | "cat" | "cow" | "horse" | "sheep" => Ok(Self::Animal),
            "pothole" => Ok(Self::Pothole),
            other => Err(Error::UnknownClass(other.to_string())),
        }
    }
}

/// Detection input for the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class: ObjectClass,
    /// Bounding box in TLWH format
    pub bbox: Rect,
    /// Detection confidence score
    pub confidence: f32,
    #[serde(default)]
    pub frame_index: u64,
    /// Seconds of video time, derived from frame index and frame rate
    #[serde(default)]
    pub timestamp: f64,
}

impl Detection {
    pub fn new(class: ObjectClass, bbox: Rect, confidence: f32) -> Self {
        Self {
            class,
            bbox,
            confidence,
            frame_index: 0,
            timestamp: 0.0,
        }
    }

    /// Stamp the detection with the frame it was observed in.
    pub fn at_frame(mut self, frame_index: u64, timestamp: f64) -> Self {
        self.frame_index = frame_index;
        self.timestamp = timestamp;
        self
    }

    /// Positive-area box and a confidence in `[0, 1]`.
    pub fn is_well_formed(&self) -> bool {
        self.bbox.is_valid() && (0.0..=1.0).contains(&self.confidence)
    }
}
