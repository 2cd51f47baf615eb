/*
This code is part of the viewfinder geospatial analysis library.
Authors: adapted from the WhiteboxTools geospatial analysis library.
License: MIT
*/

use super::{BoundingBox, Point2D};

/// A line segment defined by starting and ending points.
#[derive(Default, Copy, Clone, Debug)]
pub struct LineSegment {
    pub p1: Point2D,
    pub p2: Point2D,
}

impl PartialEq for LineSegment {
    fn eq(&self, other: &Self) -> bool {
        (self.p1.nearly_equals(&other.p1) && self.p2.nearly_equals(&other.p2))
            || (self.p1.nearly_equals(&other.p2) && self.p2.nearly_equals(&other.p1))
    }
}

impl LineSegment {
    pub fn new(p1: Point2D, p2: Point2D) -> LineSegment {
        LineSegment { p1, p2 }
    }

    pub fn get_bounding_box(&self) -> BoundingBox {
        BoundingBox::from_two_points(self.p1, self.p2)
    }

    /// Squared distance from `p` to the closest point on the segment (clamped projection).
    /// A degenerate (zero-length) segment collapses to distance-to-p1.
    pub fn dist_to_segment_squared(&self, p: Point2D) -> f64 {
        let l2 = self.p1.distance_squared(&self.p2);
        if l2 == 0.0 {
            return p.distance_squared(&self.p1);
        }
        let mut t = ((p.x - self.p1.x) * (self.p2.x - self.p1.x)
            + (p.y - self.p1.y) * (self.p2.y - self.p1.y))
            / l2;
        t = 0f64.max(1f64.min(t));
        p.distance_squared(&Point2D::new(
            self.p1.x + t * (self.p2.x - self.p1.x),
            self.p1.y + t * (self.p2.y - self.p1.y),
        ))
    }

    pub fn dist_to_segment(&self, p: Point2D) -> f64 {
        self.dist_to_segment_squared(p).sqrt()
    }

    /// The closest point on the segment to `p` (clamped projection).
    pub fn closest_point(&self, p: Point2D) -> Point2D {
        let l2 = self.p1.distance_squared(&self.p2);
        if l2 == 0.0 {
            return self.p1;
        }
        let mut t = ((p.x - self.p1.x) * (self.p2.x - self.p1.x)
            + (p.y - self.p1.y) * (self.p2.y - self.p1.y))
            / l2;
        t = 0f64.max(1f64.min(t));
        Point2D::new(
            self.p1.x + t * (self.p2.x - self.p1.x),
            self.p1.y + t * (self.p2.y - self.p1.y),
        )
    }
}
