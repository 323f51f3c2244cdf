mod detection;
mod matching;
mod rect;
mod registry;
mod track;
mod track_state;

pub use detection::{Detection, ObjectClass};
pub use matching::{AssignmentResult, Association, Associator, gated_iou_distance, linear_assignment};
pub use rect::{Rect, iou_batch};
pub use registry::TrackRegistry;
pub use track::{Track, TrackId, TrackSnapshot};
pub use track_state::TrackState;
