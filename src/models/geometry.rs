/// Axis-aligned bounding box in normalized page coordinates.
///
/// Coordinates are fractions of the page width/height at detection time, so
/// a box stays valid across differently sized renders of the same logical
/// page. Invariant: `x1 <= x2` and `y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl NormalizedBox {
    /// Normalize pixel coordinates against the page dimensions.
    pub fn from_pixels(x1: f32, y1: f32, x2: f32, y2: f32, width: u32, height: u32) -> Self {
        NormalizedBox {
            x1: x1 / width as f32,
            y1: y1 / height as f32,
            x2: x2 / width as f32,
            y2: y2 / height as f32,
        }
    }

    /// Bounding rectangle of a detection quadrilateral, normalized.
    ///
    /// Detections may be skewed quadrilaterals in `[top-left, top-right,
    /// bottom-right, bottom-left]` order: the left edge is the minimum of the
    /// two left-corner xs, the top edge the minimum of the two top-corner ys,
    /// and so on.
    pub fn from_quad(quad: &[[f32; 2]; 4], width: u32, height: u32) -> Self {
        let x1 = quad[0][0].min(quad[3][0]);
        let y1 = quad[0][1].min(quad[1][1]);
        let x2 = quad[1][0].max(quad[2][0]);
        let y2 = quad[2][1].max(quad[3][1]);
        Self::from_pixels(x1, y1, x2, y2, width, height)
    }

    /// Denormalize against a target image size, which may differ from the
    /// size the box was detected at.
    pub fn to_pixels(&self, width: u32, height: u32) -> (i32, i32, i32, i32) {
        (
            (self.x1 * width as f32) as i32,
            (self.y1 * height as f32) as i32,
            (self.x2 * width as f32) as i32,
            (self.y2 * height as f32) as i32,
        )
    }
}
