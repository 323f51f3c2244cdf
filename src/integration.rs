//! Integration module connecting upstream detectors with the scoring core.
//!
//! Provides the per-frame input record, a detection builder, the
//! `DetectionSource` trait and the pipeline that drives one run.

mod builder;
mod detector;
mod frame;
mod pipeline;

pub use builder::DetectionBuilder;
pub use detector::DetectionSource;
pub use frame::FrameInput;
pub use pipeline::{ClassCounts, FrameSummary, RunReport, SafetyPipeline};
