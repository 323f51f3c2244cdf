//! SafetyPipeline: association, event extraction and segment scoring for one run.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::integration::{DetectionSource, FrameInput};
use crate::scoring::{Event, EventExtractor, EventKind, FrameStamp, Segment, SegmentAggregator, round_score};
use crate::tracker::{Associator, Detection, ObjectClass, TrackRegistry, TrackSnapshot};

/// Confirmed tracks per class in one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassCounts {
    pub person: usize,
    pub vehicle: usize,
    pub animal: usize,
}

/// What happened in one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSummary {
    pub frame_index: u64,
    pub timestamp: f64,
    pub confirmed: ClassCounts,
    pub potholes: usize,
    pub lane_departure: bool,
    pub events: Vec<Event>,
    /// Live tracks after association, for overlay rendering.
    pub tracks: Vec<TrackSnapshot>,
}

/// Result of a complete run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub segments: Vec<Segment>,
    /// Events per kind over the whole run.
    pub event_totals: BTreeMap<EventKind, u64>,
    /// Mean segment score, 0.0 for an empty run.
    pub average_score: f64,
    pub frames_processed: u64,
}

/// Drives one run: detections in, scored segments out.
///
/// Frames must be fed strictly in order. Track and open-segment state carry
/// from frame to frame, so a pipeline is single-use: start a new one for
/// each video.
pub struct SafetyPipeline {
    config: Config,
    registry: TrackRegistry,
    associator: Associator,
    extractor: EventExtractor,
    aggregator: SegmentAggregator,
    segments: Vec<Segment>,
    event_totals: [u64; 4],
    frames_processed: u64,
    last_frame: Option<(u64, f64)>,
}

impl SafetyPipeline {
    /// Create a pipeline. Fails if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry: TrackRegistry::new(config.confirm_after, config.track_max_age),
            associator: Associator::new(config.iou_threshold),
            extractor: EventExtractor::new(config.clone()),
            aggregator: SegmentAggregator::new(config.segment_duration, config.weights.clone()),
            config,
            segments: Vec::new(),
            event_totals: [0; 4],
            frames_processed: 0,
            last_frame: None,
        })
    }

    /// Process a single frame and return what it produced.
    pub fn process_frame(&mut self, frame: FrameInput) -> Result<FrameSummary> {
        self.check_order(&frame)?;

        let FrameInput {
            frame_index,
            timestamp,
            detections,
            lane_departure,
        } = frame;
        let stamp = FrameStamp {
            frame_index,
            timestamp,
        };

        let detections = self.admit_detections(detections, stamp);
        self.associator.associate(&mut self.registry, &detections)?;
        let events = self
            .extractor
            .extract(&self.registry, &detections, lane_departure, stamp);

        for event in &events {
            self.event_totals[event.kind.index()] += 1;
        }

        let mut confirmed = ClassCounts::default();
        for track in self.registry.confirmed() {
            match track.class {
                ObjectClass::Person => confirmed.person += 1,
                ObjectClass::Vehicle => confirmed.vehicle += 1,
                ObjectClass::Animal => confirmed.animal += 1,
                ObjectClass::Pothole => {}
            }
        }
        let potholes = detections
            .iter()
            .filter(|d| d.class == ObjectClass::Pothole)
            .count();

        let summary = FrameSummary {
            frame_index,
            timestamp,
            confirmed,
            potholes,
            lane_departure,
            events: events.clone(),
            tracks: self.registry.snapshot(),
        };

        self.segments
            .extend(self.aggregator.push_frame(timestamp, events));
        self.frames_processed += 1;
        self.last_frame = Some((frame_index, timestamp));

        Ok(summary)
    }

    /// Drain a detection source to its end.
    pub fn process_source<S>(&mut self, source: &mut S) -> Result<()>
    where
        S: DetectionSource,
        S::Error: std::error::Error + Send + Sync + 'static,
    {
        while let Some(frame) = source.next_frame().map_err(|e| Error::Source(Box::new(e)))? {
            self.process_frame(frame)?;
        }
        Ok(())
    }

    /// Close the trailing segment and produce the run report.
    pub fn finish(mut self) -> RunReport {
        self.segments.extend(self.aggregator.finish());

        let average_score = if self.segments.is_empty() {
            0.0
        } else {
            let total: f64 = self.segments.iter().map(|s| s.score).sum();
            round_score(total / self.segments.len() as f64)
        };

        RunReport {
            event_totals: EventKind::ALL
                .iter()
                .map(|&kind| (kind, self.event_totals[kind.index()]))
                .collect(),
            segments: self.segments,
            average_score,
            frames_processed: self.frames_processed,
        }
    }

    /// Segments closed so far.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn registry(&self) -> &TrackRegistry {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn check_order(&self, frame: &FrameInput) -> Result<()> {
        if !frame.timestamp.is_finite() || frame.timestamp < 0.0 {
            return Err(Error::InvalidTimestamp {
                frame_index: frame.frame_index,
                timestamp: frame.timestamp,
            });
        }
        if let Some((previous_index, previous_timestamp)) = self.last_frame {
            if frame.frame_index <= previous_index || frame.timestamp < previous_timestamp {
                return Err(Error::OutOfOrderFrame {
                    frame_index: frame.frame_index,
                    timestamp: frame.timestamp,
                    previous_index,
                    previous_timestamp,
                });
            }
        }
        Ok(())
    }

    /// Stamp detections with their frame and drop the ones that must not
    /// reach the tracker.
    fn admit_detections(&self, detections: Vec<Detection>, stamp: FrameStamp) -> Vec<Detection> {
        detections
            .into_iter()
            .map(|d| d.at_frame(stamp.frame_index, stamp.timestamp))
            .filter(|d| {
                if !d.is_well_formed() {
                    warn!(frame = stamp.frame_index, class = %d.class, bbox = ?d.bbox, confidence = d.confidence, "dropping malformed detection");
                    return false;
                }
                if d.confidence < self.config.min_confidence {
                    debug!(frame = stamp.frame_index, class = %d.class, confidence = d.confidence, "dropping low-confidence detection");
                    return false;
                }
                true
            })
            .collect()
    }
}
