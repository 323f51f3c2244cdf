//! Trait for upstream detection sources.

use crate::integration::FrameInput;

/// Trait for anything that yields per-frame detections in frame order.
///
/// Implement this trait to connect a detection model, a replayed log or a
/// network feed to the scoring pipeline.
///
/// # Example
///
/// ```ignore
/// use road_safety_rs::{DetectionSource, FrameInput};
///
/// struct Replay {
///     frames: std::vec::IntoIter<FrameInput>,
/// }
///
/// impl DetectionSource for Replay {
///     type Error = std::io::Error;
///
///     fn next_frame(&mut self) -> Result<Option<FrameInput>, Self::Error> {
///         Ok(self.frames.next())
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Next frame, or `None` at end of stream.
    fn next_frame(&mut self) -> Result<Option<FrameInput>, Self::Error>;
}

impl DetectionSource for std::vec::IntoIter<FrameInput> {
    type Error = std::convert::Infallible;

    fn next_frame(&mut self) -> Result<Option<FrameInput>, Self::Error> {
        Ok(self.next())
    }
}
