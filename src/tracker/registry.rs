//! Owner of the live track set for one pipeline run.

use tracing::debug;

use crate::error::{Error, Result};
use crate::tracker::detection::Detection;
use crate::tracker::track::{Track, TrackId, TrackSnapshot};
use crate::tracker::track_state::TrackState;

/// Live tracks, kept in ascending id order.
///
/// Ids come from a counter owned by the registry, so two registries never
/// interfere and an id is never handed out twice within one run.
#[derive(Debug, Clone)]
pub struct TrackRegistry {
    tracks: Vec<Track>,
    next_id: TrackId,
    confirm_after: u32,
    max_age: u32,
}

impl TrackRegistry {
    pub fn new(confirm_after: u32, max_age: u32) -> Self {
        Self {
            tracks: Vec::new(),
            next_id: 1,
            confirm_after,
            max_age,
        }
    }

    /// Start a tentative track from an unmatched detection.
    pub fn create(&mut self, detection: &Detection) -> TrackId {
        let id = self.next_id;
        self.next_id += 1;
        self.tracks.push(Track::new(id, detection));
        debug!(track_id = id, class = %detection.class, frame = detection.frame_index, "track created");
        id
    }

    pub fn update(&mut self, id: TrackId, detection: &Detection) -> Result<()> {
        let confirm_after = self.confirm_after;
        let track = self.get_mut(id)?;
        let before = track.state;
        track.update(detection, confirm_after)?;
        if before != track.state {
            debug!(track_id = id, from = ?before, to = ?track.state, "track state changed");
        }
        Ok(())
    }

    /// Age a track that received no match this frame.
    pub fn expire(&mut self, id: TrackId) -> Result<()> {
        let max_age = self.max_age;
        let track = self.get_mut(id)?;
        let before = track.state;
        track.expire(max_age)?;
        if before != track.state {
            debug!(track_id = id, from = ?before, to = ?track.state, "track state changed");
        }
        Ok(())
    }

    /// Drop every deleted track, returning their ids.
    pub fn purge_deleted(&mut self) -> Vec<TrackId> {
        let mut purged = Vec::new();
        self.tracks.retain(|t| {
            if t.state == TrackState::Deleted {
                purged.push(t.track_id);
                false
            } else {
                true
            }
        });
        purged
    }

    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks
            .binary_search_by_key(&id, |t| t.track_id)
            .ok()
            .map(|idx| &self.tracks[idx])
    }

    fn get_mut(&mut self, id: TrackId) -> Result<&mut Track> {
        match self.tracks.binary_search_by_key(&id, |t| t.track_id) {
            Ok(idx) => Ok(&mut self.tracks[idx]),
            Err(_) => Err(Error::UnknownTrack(id)),
        }
    }

    /// All tracks not yet purged, ascending by id.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn confirmed(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(|t| t.is_confirmed())
    }

    pub fn snapshot(&self) -> Vec<TrackSnapshot> {
        self.tracks
            .iter()
            .filter(|t| t.state.is_active())
            .map(Track::snapshot)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{ObjectClass, Rect};

    fn car(frame: u64) -> Detection {
        Detection::new(ObjectClass::Vehicle, Rect::new(0.0, 0.0, 50.0, 30.0), 0.9)
            .at_frame(frame, frame as f64 / 30.0)
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut registry = TrackRegistry::new(2, 3);
        assert_eq!(registry.create(&car(0)), 1);
        assert_eq!(registry.create(&car(0)), 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_lifecycle_through_registry() {
        let mut registry = TrackRegistry::new(2, 1);
        let id = registry.create(&car(0));
        registry.update(id, &car(1)).unwrap();
        assert_eq!(registry.get(id).unwrap().state, TrackState::Tentative);
        registry.update(id, &car(2)).unwrap();
        assert_eq!(registry.get(id).unwrap().state, TrackState::Confirmed);

        registry.expire(id).unwrap();
        assert_eq!(registry.get(id).unwrap().state, TrackState::Lost);
        registry.expire(id).unwrap();
        assert_eq!(registry.get(id).unwrap().state, TrackState::Deleted);

        assert_eq!(registry.purge_deleted(), vec![id]);
        assert!(registry.is_empty());
        assert!(matches!(registry.update(id, &car(3)), Err(Error::UnknownTrack(_))));
    }

    #[test]
    fn test_ids_not_reused_after_purge() {
        let mut registry = TrackRegistry::new(2, 1);
        let first = registry.create(&car(0));
        registry.expire(first).unwrap();
        registry.purge_deleted();
        let second = registry.create(&car(1));
        assert!(second > first);
    }
}
