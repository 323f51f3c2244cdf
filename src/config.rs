//! Run configuration: event weights, association and rule thresholds, windowing.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::scoring::EventKind;

/// Severity weight of each event kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventWeights {
    pub pedestrian_proximity: f64,
    pub pothole: f64,
    pub lane_departure: f64,
    pub dense_traffic: f64,
}

impl Default for EventWeights {
    fn default() -> Self {
        Self {
            pedestrian_proximity: 3.0,
            pothole: 2.0,
            lane_departure: 3.0,
            dense_traffic: 2.0,
        }
    }
}

impl EventWeights {
    pub fn weight(&self, kind: EventKind) -> f64 {
        match kind {
            EventKind::PedestrianProximity => self.pedestrian_proximity,
            EventKind::Pothole => self.pothole,
            EventKind::LaneDeparture => self.lane_departure,
            EventKind::DenseTraffic => self.dense_traffic,
        }
    }
}

/// Configuration for one pipeline run. Read-only once the run starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub weights: EventWeights,
    /// Minimum IoU between a predicted track box and a detection for them to match.
    pub iou_threshold: f32,
    /// Box height at or above which a pedestrian counts as close to the camera.
    pub proximity_threshold: f32,
    /// Dense traffic is flagged when confirmed vehicles exceed this count.
    pub density_threshold: u32,
    /// Segment length in seconds of video time.
    pub segment_duration: f64,
    /// Frames a lost track survives without a match.
    pub track_max_age: u32,
    /// Consecutive matches needed to confirm a tentative track.
    pub confirm_after: u32,
    /// Detections below this confidence never enter the tracker.
    pub min_confidence: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weights: EventWeights::default(),
            iou_threshold: 0.3,
            proximity_threshold: 0.25,
            density_threshold: 5,
            segment_duration: 5.0,
            track_max_age: 30,
            confirm_after: 2,
            min_confidence: 0.5,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject out-of-range values. Nothing is clamped.
    pub fn validate(&self) -> Result<()> {
        for kind in EventKind::ALL {
            let w = self.weights.weight(kind);
            if !w.is_finite() || w < 0.0 {
                return Err(invalid(format!("weight for {kind} must be >= 0, got {w}")));
            }
        }
        if !(self.iou_threshold > 0.0 && self.iou_threshold < 1.0) {
            return Err(invalid(format!(
                "iou_threshold must be in (0, 1), got {}",
                self.iou_threshold
            )));
        }
        if !(self.proximity_threshold.is_finite() && self.proximity_threshold > 0.0) {
            return Err(invalid(format!(
                "proximity_threshold must be positive, got {}",
                self.proximity_threshold
            )));
        }
        if !(self.segment_duration.is_finite() && self.segment_duration > 0.0) {
            return Err(invalid(format!(
                "segment_duration must be positive, got {}",
                self.segment_duration
            )));
        }
        if self.track_max_age == 0 {
            return Err(invalid("track_max_age must be at least 1".into()));
        }
        if self.confirm_after == 0 {
            return Err(invalid("confirm_after must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(invalid(format!(
                "min_confidence must be in [0, 1], got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> Error {
    Error::InvalidConfig(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = Config::from_yaml_str("iou_threshold: 0.5\nweights:\n  pothole: 4.0\n").unwrap();
        assert_eq!(config.iou_threshold, 0.5);
        assert_eq!(config.weights.pothole, 4.0);
        assert_eq!(config.weights.lane_departure, 3.0);
        assert_eq!(config.confirm_after, 2);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let err = Config::from_yaml_str("weights:\n  dense_traffic: -1.0\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let mut config = Config::default();
        config.proximity_threshold = -0.1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.segment_duration = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.iou_threshold = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_count_is_parse_error() {
        let err = Config::from_yaml_str("density_threshold: -3\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }
}
