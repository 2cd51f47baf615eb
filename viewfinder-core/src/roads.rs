// Nearest-road proximity search and walk/drive time estimation.
//
// The segment-projection math reuses `LineSegment::closest_point` directly
// (adapted from the WhiteboxTools `dist_to_segment_squared` routine).

use viewfinder_common::structures::{MultiPolyline, Point2D};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadAccessPoint {
    pub x: f64,
    pub y: f64,
    pub distance_m: f64,
    pub walking_minutes: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrivabilityResult {
    pub access: RoadAccessPoint,
    pub walk_minutes: f64,
    pub drive_minutes: Option<f64>,
    pub drive_distance_km: Option<f64>,
}

/// Detour factor applied to straight-line distance when estimating driving time,
/// in lieu of an actual road-network routing graph.
pub const DRIVE_DETOUR_FACTOR: f64 = 1.35;

/// Finds the nearest point on any segment of `roads` to `point`, the planar distance
/// to it, and the implied walking time. Ties are broken by polyline-then-segment order
/// (the first polyline/segment encountered wins, since later candidates must strictly
/// improve on the running minimum to replace it).
pub fn nearest_access_point(roads: &MultiPolyline, point: Point2D, walking_speed_kmh: f64) -> Option<RoadAccessPoint> {
    let mut best: Option<(Point2D, f64)> = None;

    for polyline in roads.iter() {
        for seg_index in 0..polyline.num_segments() {
            let segment = polyline.segment(seg_index);
            let candidate_point = segment.closest_point(point);
            let dist_sq = point.distance_squared(&candidate_point);
            match &best {
                Some((_, best_dist_sq)) if dist_sq >= *best_dist_sq => {}
                _ => best = Some((candidate_point, dist_sq)),
            }
        }
    }

    best.map(|(access_point, dist_sq)| {
        let distance_m = dist_sq.sqrt();
        let walking_minutes = (distance_m / 1000.0) / walking_speed_kmh * 60.0;
        RoadAccessPoint { x: access_point.x, y: access_point.y, distance_m, walking_minutes }
    })
}

/// Straight-line drive time from `origin` to `road_point`, inflated by the fixed
/// detour factor. No road graph is consulted.
pub fn estimate_driving_time_minutes(origin: Point2D, road_point: Point2D, driving_speed_kmh: f64) -> f64 {
    let straight_line_m = origin.distance(&road_point);
    (straight_line_m / 1000.0 * DRIVE_DETOUR_FACTOR) / driving_speed_kmh * 60.0
}

/// Evaluates whether a candidate is reachable within the configured time budgets.
/// Returns `None` when the walk or (if bounded) drive time exceeds its limit.
pub fn evaluate_drivability(
    origin: Point2D,
    access: RoadAccessPoint,
    driving_speed_kmh: f64,
    max_walk_minutes: f64,
    max_drive_minutes: Option<f64>,
) -> Option<DrivabilityResult> {
    if access.walking_minutes > max_walk_minutes {
        return None;
    }

    let access_point = Point2D::new(access.x, access.y);
    let drive_minutes = estimate_driving_time_minutes(origin, access_point, driving_speed_kmh);

    if let Some(limit) = max_drive_minutes {
        if drive_minutes > limit {
            return None;
        }
    }

    Some(DrivabilityResult {
        access,
        walk_minutes: access.walking_minutes,
        drive_minutes: Some(drive_minutes),
        drive_distance_km: Some(drive_minutes / 60.0 * driving_speed_kmh),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewfinder_common::structures::Polyline;

    fn single_segment_network() -> MultiPolyline {
        let mut roads = MultiPolyline::new("EPSG:32610");
        roads.push(Polyline::new(&[Point2D::new(0.0, 0.0), Point2D::new(1000.0, 0.0)], 0));
        roads
    }

    #[test]
    fn nearest_access_point_projects_onto_segment() {
        let roads = single_segment_network();
        let access = nearest_access_point(&roads, Point2D::new(500.0, 300.0), 4.8).unwrap();
        assert!((access.x - 500.0).abs() < 1e-6);
        assert!((access.y - 0.0).abs() < 1e-6);
        assert!((access.distance_m - 300.0).abs() < 1e-6);
        assert!((access.walking_minutes - 3.75).abs() < 1e-3);
    }

    #[test]
    fn empty_network_has_no_access_point() {
        let roads = MultiPolyline::new("EPSG:32610");
        assert!(nearest_access_point(&roads, Point2D::new(0.0, 0.0), 4.8).is_none());
    }

    #[test]
    fn degenerate_segment_collapses_to_its_start() {
        let mut roads = MultiPolyline::new("EPSG:32610");
        roads.push(Polyline::new(&[Point2D::new(10.0, 10.0), Point2D::new(10.0, 10.0)], 0));
        let access = nearest_access_point(&roads, Point2D::new(20.0, 10.0), 4.8).unwrap();
        assert!((access.x - 10.0).abs() < 1e-6);
        assert!((access.y - 10.0).abs() < 1e-6);
    }

    #[test]
    fn additional_polyline_cannot_increase_minimum_distance() {
        let roads_one = single_segment_network();
        let point = Point2D::new(500.0, 300.0);
        let before = nearest_access_point(&roads_one, point, 4.8).unwrap();

        let mut roads_two = roads_one;
        roads_two.push(Polyline::new(&[Point2D::new(400.0, 250.0), Point2D::new(600.0, 250.0)], 1));
        let after = nearest_access_point(&roads_two, point, 4.8).unwrap();

        assert!(after.distance_m <= before.distance_m + 1e-9);
    }

    #[test]
    fn rejects_candidate_exceeding_walk_budget() {
        let access = RoadAccessPoint { x: 0.0, y: 0.0, distance_m: 5000.0, walking_minutes: 62.5 };
        let result = evaluate_drivability(Point2D::new(0.0, -5000.0), access, 60.0, 15.0, None);
        assert!(result.is_none());
    }

    #[test]
    fn rejects_candidate_exceeding_drive_budget() {
        let access = RoadAccessPoint { x: 0.0, y: 0.0, distance_m: 100.0, walking_minutes: 1.25 };
        let result = evaluate_drivability(Point2D::new(0.0, -500_000.0), access, 60.0, 15.0, Some(5.0));
        assert!(result.is_none());
    }

    #[test]
    fn accepts_candidate_within_budgets_and_reports_drive_distance() {
        let access = RoadAccessPoint { x: 1000.0, y: 0.0, distance_m: 300.0, walking_minutes: 3.75 };
        let result = evaluate_drivability(Point2D::new(1000.0, -1000.0), access, 60.0, 15.0, Some(30.0)).unwrap();
        assert!(result.drive_minutes.unwrap() > 0.0);
        assert!(result.drive_distance_km.unwrap() > 0.0);
    }
}
