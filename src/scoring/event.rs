//! Risk events attributed to a frame.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tracker::TrackId;

/// Kind of risk observation. The set is closed; every consumer matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PedestrianProximity,
    Pothole,
    LaneDeparture,
    DenseTraffic,
}

impl EventKind {
    /// Every kind, in the fixed order used for summation and reporting.
    pub const ALL: [EventKind; 4] = [
        EventKind::PedestrianProximity,
        EventKind::Pothole,
        EventKind::LaneDeparture,
        EventKind::DenseTraffic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PedestrianProximity => "pedestrian_proximity",
            Self::Pothole => "pothole",
            Self::LaneDeparture => "lane_departure",
            Self::DenseTraffic => "dense_traffic",
        }
    }

    /// Position in [`EventKind::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::PedestrianProximity => 0,
            Self::Pothole => 1,
            Self::LaneDeparture => 2,
            Self::DenseTraffic => 3,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frame a rule is evaluated for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStamp {
    pub frame_index: u64,
    pub timestamp: f64,
}

/// A weighted risk observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub weight: f64,
    pub frame_index: u64,
    pub timestamp: f64,
    /// Track that triggered the event, for track-based rules.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub track_id: Option<TrackId>,
}

impl Event {
    pub fn new(kind: EventKind, weight: f64, stamp: FrameStamp) -> Self {
        Self {
            kind,
            weight,
            frame_index: stamp.frame_index,
            timestamp: stamp.timestamp,
            track_id: None,
        }
    }

    pub fn with_track(mut self, track_id: TrackId) -> Self {
        self.track_id = Some(track_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_order_matches_index() {
        for (i, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_event_serializes_type_field() {
        let stamp = FrameStamp {
            frame_index: 3,
            timestamp: 0.1,
        };
        let json = serde_json::to_string(&Event::new(EventKind::Pothole, 2.0, stamp)).unwrap();
        assert!(json.contains(r#""type":"pothole""#));
        assert!(!json.contains("track_id"));
    }
}
