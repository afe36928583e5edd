use crate::registry::TrackId;
use itertools::Itertools;
use nalgebra::Point2;

/// Axis-aligned bounding box with a top-left anchor, as reported by the
/// blob detector or refined by the point tracker.
#[derive(Clone, Debug, PartialEq)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Ordered sequence of refined boxes produced by the point-refinement
/// service. A valid trajectory has at least one element.
pub type Trajectory = Vec<BBox>;

impl BBox {
    pub fn anchor(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Per-track view handed out after each processed frame for drawing.
#[derive(Clone, Debug)]
pub struct OutputTrack {
    pub track_id: TrackId,
    pub bbox: BBox,
    pub history: Vec<BBox>,
}

impl OutputTrack {
    pub fn path(&self) -> Vec<Point2<f64>> {
        self.history.iter().map(BBox::anchor).collect()
    }

    /// Consecutive path points paired up, ready for polyline drawing.
    pub fn path_segments(&self) -> Vec<(Point2<f64>, Point2<f64>)> {
        self.history
            .iter()
            .map(BBox::anchor)
            .tuple_windows()
            .collect()
    }
}
