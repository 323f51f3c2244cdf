//! Single object track for multi-object tracking.

use nalgebra::Vector2;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::tracker::detection::{Detection, ObjectClass};
use crate::tracker::rect::Rect;
use crate::tracker::track_state::TrackState;

pub type TrackId = u64;

/// Persistent identity of one object across frames.
#[derive(Debug, Clone)]
pub struct Track {
    /// Unique track identifier, never reused within a run
    pub track_id: TrackId,
    /// Class of the detection that created the track
    pub class: ObjectClass,
    /// Current track state
    pub state: TrackState,
    /// Box of the last matched detection (TLWH)
    pub bbox: Rect,
    /// Per-frame displacement of the box center
    pub velocity: Vector2<f32>,
    /// Confidence of the last matched detection
    pub score: f32,
    /// Frames since creation
    pub age: u32,
    /// Consecutive successful matches
    pub hits: u32,
    /// Frames since the last match
    pub frames_since_update: u32,
    /// Frame index of the creating detection
    pub start_frame: u64,
    /// Frame index of the last match
    pub last_frame: u64,
}

impl Track {
    pub(crate) fn new(track_id: TrackId, detection: &Detection) -> Self {
        Self {
            track_id,
            class: detection.class,
            state: TrackState::Tentative,
            bbox: detection.bbox,
            velocity: Vector2::zeros(),
            score: detection.confidence,
            age: 0,
            hits: 0,
            frames_since_update: 0,
            start_frame: detection.frame_index,
            last_frame: detection.frame_index,
        }
    }

    /// Where the box is expected in the next frame.
    pub fn predicted_bbox(&self) -> Rect {
        self.bbox.translate(&self.velocity)
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == TrackState::Confirmed
    }

    /// Absorb a matched detection: refresh box and velocity, advance state.
    pub fn update(&mut self, detection: &Detection, confirm_after: u32) -> Result<()> {
        let hits = self.hits + 1;
        let next = self
            .state
            .on_match(hits, confirm_after)
            .ok_or(Error::InvalidTransition {
                track_id: self.track_id,
                from: self.state,
            })?;

        let elapsed = (self.frames_since_update + 1) as f32;
        let displacement = detection.bbox.center() - self.bbox.center();
        self.velocity = displacement / elapsed;

        self.bbox = detection.bbox;
        self.score = detection.confidence;
        self.last_frame = detection.frame_index;
        self.age += 1;
        self.hits = hits;
        self.frames_since_update = 0;
        self.state = next;
        Ok(())
    }

    /// Age the track by one frame without a match.
    pub fn expire(&mut self, max_age: u32) -> Result<()> {
        let misses = self.frames_since_update + 1;
        let next = self
            .state
            .on_miss(misses, max_age)
            .ok_or(Error::InvalidTransition {
                track_id: self.track_id,
                from: self.state,
            })?;

        self.age += 1;
        self.hits = 0;
        self.frames_since_update = misses;
        self.state = next;
        Ok(())
    }

    pub fn snapshot(&self) -> TrackSnapshot {
        TrackSnapshot {
            track_id: self.track_id,
            class: self.class,
            state: self.state,
            bbox: self.bbox,
        }
    }
}

/// Per-frame view of a track for overlay rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSnapshot {
    pub track_id: TrackId,
    pub class: ObjectClass,
    pub state: TrackState,
    pub bbox: Rect,
}
