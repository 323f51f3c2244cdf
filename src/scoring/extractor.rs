//! Per-frame risk event extraction.

use std::collections::BTreeSet;

use crate::config::Config;
use crate::scoring::event::{Event, FrameStamp};
use crate::scoring::rules;
use crate::tracker::{Detection, ObjectClass, TrackId, TrackRegistry};

/// Derives a frame's events from the post-association registry and the raw detections.
///
/// Keeps the set of pedestrian tracks currently in proximity so a pedestrian
/// standing close to the camera is reported once per segment window, not on
/// every frame. The set is cleared whenever a new window starts.
#[derive(Debug, Clone)]
pub struct EventExtractor {
    config: Config,
    near: BTreeSet<TrackId>,
    window: Option<u64>,
}

impl EventExtractor {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            near: BTreeSet::new(),
            window: None,
        }
    }

    /// Events for one frame, in rule order: proximity (by track id),
    /// potholes (detection order), dense traffic, lane departure.
    pub fn extract(
        &mut self,
        registry: &TrackRegistry,
        detections: &[Detection],
        lane_departure: bool,
        stamp: FrameStamp,
    ) -> Vec<Event> {
        let config = &self.config;
        let mut events = Vec::new();

        let window = (stamp.timestamp / config.segment_duration).floor().max(0.0) as u64;
        if self.window != Some(window) {
            self.near.clear();
            self.window = Some(window);
        }

        for track in registry.confirmed() {
            if track.class != ObjectClass::Person {
                continue;
            }
            let was_near = self.near.contains(&track.track_id);
            events.extend(rules::pedestrian_proximity(track, was_near, config, stamp));
            if rules::is_near(track, config) {
                self.near.insert(track.track_id);
            } else {
                self.near.remove(&track.track_id);
            }
        }
        self.near.retain(|id| registry.get(*id).is_some());

        events.extend(detections.iter().filter_map(|d| rules::pothole(d, config, stamp)));

        let vehicles = registry
            .confirmed()
            .filter(|t| t.class == ObjectClass::Vehicle)
            .count();
        events.extend(rules::dense_traffic(vehicles, config, stamp));
        events.extend(rules::lane_departure(lane_departure, config, stamp));

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::EventKind;
    use crate::tracker::{Associator, Rect};

    fn stamp(frame: u64) -> FrameStamp {
        FrameStamp {
            frame_index: frame,
            timestamp: frame as f64 / 30.0,
        }
    }

    fn pedestrian(height: f32, frame: u64) -> Detection {
        Detection::new(ObjectClass::Person, Rect::new(0.2, 0.5, 0.1, height), 0.9)
            .at_frame(frame, frame as f64 / 30.0)
    }

    #[test]
    fn test_proximity_reported_once_per_approach() {
        let config = Config {
            confirm_after: 1,
            iou_threshold: 0.1,
            ..Config::default()
        };
        let associator = Associator::new(config.iou_threshold);
        let mut registry = TrackRegistry::new(config.confirm_after, config.track_max_age);
        let mut extractor = EventExtractor::new(config);

        let heights = [0.3, 0.3, 0.3, 0.2, 0.3];
        let mut kinds_per_frame = Vec::new();
        for (frame, &h) in heights.iter().enumerate() {
            let dets = vec![pedestrian(h, frame as u64)];
            associator.associate(&mut registry, &dets).unwrap();
            let events = extractor.extract(&registry, &dets, false, stamp(frame as u64));
            kinds_per_frame.push(events.len());
        }
        // Frame 0 is tentative, frame 1 enters proximity, frame 3 leaves, frame 4 re-enters.
        assert_eq!(kinds_per_frame, vec![0, 1, 0, 0, 1]);
    }

    #[test]
    fn test_proximity_rearmed_each_window() {
        let config = Config {
            confirm_after: 1,
            segment_duration: 1.0,
            ..Config::default()
        };
        let associator = Associator::new(config.iou_threshold);
        let mut registry = TrackRegistry::new(config.confirm_after, config.track_max_age);
        let mut extractor = EventExtractor::new(config);

        // 10 fps over two 1 s windows, pedestrian close the whole time.
        let mut fired = Vec::new();
        for frame in 0..20u64 {
            let dets = vec![pedestrian(0.3, frame)];
            associator.associate(&mut registry, &dets).unwrap();
            let stamp = FrameStamp {
                frame_index: frame,
                timestamp: frame as f64 / 10.0,
            };
            if !extractor.extract(&registry, &dets, false, stamp).is_empty() {
                fired.push(frame);
            }
        }
        assert_eq!(fired, vec![1, 10]);
    }

    #[test]
    fn test_simultaneous_rules_all_fire() {
        let config = Config {
            confirm_after: 1,
            density_threshold: 0,
            ..Config::default()
        };
        let associator = Associator::new(config.iou_threshold);
        let mut registry = TrackRegistry::new(config.confirm_after, config.track_max_age);
        let mut extractor = EventExtractor::new(config);

        let frame = |i: u64| {
            vec![
                pedestrian(0.3, i),
                Detection::new(ObjectClass::Vehicle, Rect::new(0.6, 0.5, 0.2, 0.1), 0.9).at_frame(i, 0.0),
                Detection::new(ObjectClass::Pothole, Rect::new(0.4, 0.9, 0.1, 0.05), 0.9).at_frame(i, 0.0),
            ]
        };

        let first = frame(0);
        associator.associate(&mut registry, &first).unwrap();
        extractor.extract(&registry, &first, false, stamp(0));

        let second = frame(1);
        associator.associate(&mut registry, &second).unwrap();
        let events = extractor.extract(&registry, &second, true, stamp(1));
        let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::PedestrianProximity,
                EventKind::Pothole,
                EventKind::DenseTraffic,
                EventKind::LaneDeparture,
            ]
        );
    }
}
