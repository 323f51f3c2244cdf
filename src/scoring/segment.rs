//! Fixed-duration windows over video time.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EventWeights;
use crate::scoring::event::Event;
use crate::scoring::scorer;

/// A closed window `[start, end)` with its events and score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Zero-based window number; window `k` starts at `k * duration`.
    pub index: u64,
    pub start: f64,
    pub end: f64,
    pub events: Vec<Event>,
    /// Clamped to [0, 10], rounded to one decimal.
    pub score: f64,
}

impl Segment {
    fn close(index: u64, start: f64, end: f64, events: Vec<Event>, weights: &EventWeights) -> Self {
        let score = scorer::round_score(scorer::score(&events, weights));
        info!(index, start, end, events = events.len(), score, "segment closed");
        Self {
            index,
            start,
            end,
            events,
            score,
        }
    }
}

#[derive(Debug, Clone)]
struct OpenSegment {
    index: u64,
    events: Vec<Event>,
}

/// Buffers per-frame events into consecutive windows and scores each one as it closes.
///
/// Frames must arrive with non-decreasing timestamps; the pipeline checks
/// ordering before frames get here.
#[derive(Debug, Clone)]
pub struct SegmentAggregator {
    duration: f64,
    weights: EventWeights,
    open: Option<OpenSegment>,
    last_timestamp: Option<f64>,
    last_interval: f64,
}

impl SegmentAggregator {
    pub fn new(duration: f64, weights: EventWeights) -> Self {
        Self {
            duration,
            weights,
            open: None,
            last_timestamp: None,
            last_interval: 0.0,
        }
    }

    fn window_of(&self, timestamp: f64) -> u64 {
        (timestamp / self.duration).floor().max(0.0) as u64
    }

    fn window_start(&self, index: u64) -> f64 {
        index as f64 * self.duration
    }

    /// Add one frame's events. Returns the segments this frame closed, in
    /// order; windows skipped by a gap in timestamps come back empty.
    pub fn push_frame(&mut self, timestamp: f64, events: Vec<Event>) -> Vec<Segment> {
        // Keep the last positive interval; repeated timestamps carry no spacing.
        if let Some(last) = self.last_timestamp {
            if timestamp > last {
                self.last_interval = timestamp - last;
            }
        }
        self.last_timestamp = Some(timestamp);

        let window = self.window_of(timestamp);
        let mut closed = Vec::new();

        // The first segment always starts at 0, even if the video does not.
        let mut current = self.open.take().unwrap_or(OpenSegment {
            index: 0,
            events: Vec::new(),
        });

        while current.index < window {
            let start = self.window_start(current.index);
            let end = self.window_start(current.index + 1);
            closed.push(Segment::close(current.index, start, end, current.events, &self.weights));
            current = OpenSegment {
                index: current.index + 1,
                events: Vec::new(),
            };
        }

        current.events.extend(events);
        self.open = Some(current);
        closed
    }

    /// Close the trailing segment at end of stream. It may be shorter than
    /// the configured duration: it ends one frame interval after the last
    /// frame, using the last positive interval seen, or at the window
    /// boundary when no interval is known.
    pub fn finish(&mut self) -> Option<Segment> {
        let open = self.open.take()?;
        let start = self.window_start(open.index);
        let window_end = self.window_start(open.index + 1);
        let end = match self.last_timestamp {
            Some(last) if self.last_interval > 0.0 => (last + self.last_interval).min(window_end),
            _ => window_end,
        };
        Some(Segment::close(open.index, start, end, open.events, &self.weights))
    }

    /// Events buffered in the window that is still open.
    pub fn pending_events(&self) -> &[Event] {
        self.open.as_ref().map(|s| s.events.as_slice()).unwrap_or(&[])
    }
}
