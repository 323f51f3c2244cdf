//! One pure function per risk rule. Each looks at a single piece of frame
//! state and yields at most one event.

use crate::config::Config;
use crate::scoring::event::{Event, EventKind, FrameStamp};
use crate::tracker::{Detection, ObjectClass, Track};

/// A pedestrian whose box is taller than `proximity_threshold` is close to the camera.
pub fn is_near(track: &Track, config: &Config) -> bool {
    track.class == ObjectClass::Person && track.bbox.height > config.proximity_threshold
}

/// Fires when a confirmed pedestrian track enters proximity. `was_near`
/// carries whether the same track was already close earlier in the current
/// segment window.
pub fn pedestrian_proximity(track: &Track, was_near: bool, config: &Config, stamp: FrameStamp) -> Option<Event> {
    if !track.is_confirmed() || was_near || !is_near(track, config) {
        return None;
    }
    let weight = config.weights.weight(EventKind::PedestrianProximity);
    Some(Event::new(EventKind::PedestrianProximity, weight, stamp).with_track(track.track_id))
}

/// Every pothole detection counts on its own.
pub fn pothole(detection: &Detection, config: &Config, stamp: FrameStamp) -> Option<Event> {
    match detection.class {
        ObjectClass::Pothole => Some(Event::new(
            EventKind::Pothole,
            config.weights.weight(EventKind::Pothole),
            stamp,
        )),
        ObjectClass::Person | ObjectClass::Vehicle | ObjectClass::Animal => None,
    }
}

/// One event per frame when confirmed vehicles exceed the density threshold.
pub fn dense_traffic(confirmed_vehicles: usize, config: &Config, stamp: FrameStamp) -> Option<Event> {
    (confirmed_vehicles > config.density_threshold as usize).then(|| {
        Event::new(
            EventKind::DenseTraffic,
            config.weights.weight(EventKind::DenseTraffic),
            stamp,
        )
    })
}

pub fn lane_departure(flag: bool, config: &Config, stamp: FrameStamp) -> Option<Event> {
    flag.then(|| {
        Event::new(
            EventKind::LaneDeparture,
            config.weights.weight(EventKind::LaneDeparture),
            stamp,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{Rect, TrackRegistry};

    const STAMP: FrameStamp = FrameStamp {
        frame_index: 0,
        timestamp: 0.0,
    };

    fn confirmed_pedestrian(height: f32) -> Track {
        let det = Detection::new(ObjectClass::Person, Rect::new(0.0, 0.0, 0.1, height), 0.9);
        let mut registry = TrackRegistry::new(1, 5);
        let id = registry.create(&det);
        registry.update(id, &det).unwrap();
        registry.get(id).unwrap().clone()
    }

    #[test]
    fn test_proximity_edge_triggered() {
        let config = Config::default();
        let track = confirmed_pedestrian(0.4);
        let event = pedestrian_proximity(&track, false, &config, STAMP).unwrap();
        assert_eq!(event.kind, EventKind::PedestrianProximity);
        assert_eq!(event.weight, 3.0);
        assert_eq!(event.track_id, Some(track.track_id));
        assert!(pedestrian_proximity(&track, true, &config, STAMP).is_none());
    }

    #[test]
    fn test_proximity_needs_height() {
        let config = Config::default();
        assert!(pedestrian_proximity(&confirmed_pedestrian(0.1), false, &config, STAMP).is_none());
    }

    #[test]
    fn test_proximity_threshold_is_exclusive() {
        let config = Config::default();
        let at_threshold = confirmed_pedestrian(config.proximity_threshold);
        assert!(!is_near(&at_threshold, &config));
        assert!(pedestrian_proximity(&at_threshold, false, &config, STAMP).is_none());
    }

    #[test]
    fn test_pothole_only_for_potholes() {
        let config = Config::default();
        let hole = Detection::new(ObjectClass::Pothole, Rect::new(0.0, 0.0, 1.0, 1.0), 0.8);
        let car = Detection::new(ObjectClass::Vehicle, Rect::new(0.0, 0.0, 1.0, 1.0), 0.8);
        assert!(pothole(&hole, &config, STAMP).is_some());
        assert!(pothole(&car, &config, STAMP).is_none());
    }

    #[test]
    fn test_dense_traffic_strictly_exceeds() {
        let config = Config::default();
        assert!(dense_traffic(5, &config, STAMP).is_none());
        assert!(dense_traffic(6, &config, STAMP).is_some());
    }

    #[test]
    fn test_lane_departure_follows_flag() {
        let config = Config::default();
        assert!(lane_departure(false, &config, STAMP).is_none());
        assert_eq!(lane_departure(true, &config, STAMP).unwrap().weight, 3.0);
    }
}
