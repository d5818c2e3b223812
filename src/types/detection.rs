//! Per-frame detector output

use serde::{Deserialize, Serialize};

/// Axis-aligned box in pixel coordinates: (x1, y1) top-left, (x2, y2) bottom-right
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// Integer pixel centre of a box
pub type Centroid = (i32, i32);

impl BBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Midpoint truncated toward zero
    pub fn centroid(&self) -> Centroid {
        (
            ((self.x1 + self.x2) / 2.0) as i32,
            ((self.y1 + self.y2) / 2.0) as i32,
        )
    }

    /// True unless one box lies entirely left, right, above or below the
    /// other after growing `other` by `pad` on every side
    pub fn overlaps_padded(&self, other: &BBox, pad: f32) -> bool {
        let apart = self.x2 < other.x1 - pad
            || self.x1 > other.x2 + pad
            || self.y2 < other.y1 - pad
            || self.y1 > other.y2 + pad;
        !apart
    }
}

/// One detector hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_label: String,
    pub bbox: BBox,
    /// Identity assigned by the detector's own tracker, if it has one
    pub persistent_id: Option<i64>,
}

impl Detection {
    pub fn new(class_label: impl Into<String>, bbox: BBox) -> Self {
        Self {
            class_label: class_label.into(),
            bbox,
            persistent_id: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.persistent_id = Some(id);
        self
    }
}
