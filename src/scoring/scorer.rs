//! Segment score: weighted event sum, clamped to [0, 10].

use crate::config::EventWeights;
use crate::scoring::event::{Event, EventKind};

pub const MAX_SCORE: f64 = 10.0;

/// Number of events of each kind, indexed by [`EventKind::index`].
pub fn event_counts(events: &[Event]) -> [u64; 4] {
    let mut counts = [0u64; 4];
    for event in events {
        counts[event.kind.index()] += 1;
    }
    counts
}

/// Score of an event list.
///
/// Events are tallied per kind and the weighted tallies are summed in the
/// fixed kind order, so any permutation of the same events gives the
/// bit-identical result. Kinds add up with no discount for co-occurrence.
pub fn score(events: &[Event], weights: &EventWeights) -> f64 {
    let counts = event_counts(events);
    let raw: f64 = EventKind::ALL
        .iter()
        .map(|&kind| counts[kind.index()] as f64 * weights.weight(kind))
        .sum();
    raw.min(MAX_SCORE)
}

/// One decimal place, for reporting.
pub fn round_score(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}
