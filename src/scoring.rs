//! Risk events, segment windows and scoring.

mod event;
mod extractor;
pub mod rules;
mod scorer;
mod segment;

pub use event::{Event, EventKind, FrameStamp};
pub use extractor::EventExtractor;
pub use scorer::{MAX_SCORE, event_counts, round_score, score};
pub use segment::{Segment, SegmentAggregator};
