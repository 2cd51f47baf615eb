mod bounding_box;
mod line_segment;
mod point2d;
mod polyline;

pub use self::bounding_box::BoundingBox;
pub use self::line_segment::LineSegment;
pub use self::point2d::Point2D;
pub use self::polyline::{MultiPolyline, Polyline};
