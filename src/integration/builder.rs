//! Builder for creating Detection objects from various input formats.

use crate::tracker::{Detection, ObjectClass, Rect};

/// Builder for creating `Detection` objects from various input formats.
#[derive(Debug, Clone)]
pub struct DetectionBuilder {
    class: ObjectClass,
    bbox: Rect,
    confidence: f32,
    frame_index: u64,
    timestamp: f64,
}

impl DetectionBuilder {
    /// Create a new detection builder for the given class.
    pub fn new(class: ObjectClass) -> Self {
        Self {
            class,
            bbox: Rect::default(),
            confidence: 0.0,
            frame_index: 0,
            timestamp: 0.0,
        }
    }

    /// Start from a COCO class id. `None` for classes that are not scored.
    pub fn coco(class_id: u32) -> Option<Self> {
        ObjectClass::from_coco_id(class_id).map(Self::new)
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.bbox = Rect::from_tlbr(x1, y1, x2, y2);
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.bbox = Rect::new(cx - w / 2.0, cy - h / 2.0, w, h);
        self
    }

    /// Set bounding box in TLWH format (left, top, width, height).
    pub fn tlwh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.bbox = Rect::new(x, y, w, h);
        self
    }

    /// Set the confidence score.
    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set frame index and timestamp from a constant frame rate.
    pub fn frame(mut self, frame_index: u64, fps: f64) -> Self {
        self.frame_index = frame_index;
        self.timestamp = frame_index as f64 / fps;
        self
    }

    /// Build the final `Detection`.
    pub fn build(self) -> Detection {
        Detection::new(self.class, self.bbox, self.confidence).at_frame(self.frame_index, self.timestamp)
    }
}
