// The final weighted linear-combination score used to rank accepted viewpoints.

use viewfinder_common::utils::miles_to_meters;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    pub max_distance_m: f64,
    pub actual_fov_deg: f64,
    pub walk_minutes: f64,
    pub elevation_m: f64,
    pub min_visibility_miles: f64,
    pub min_field_of_view_deg: f64,
    pub max_walk_minutes: f64,
}

/// `0.4*distance_score + 0.3*fov_score + 0.2*walk_penalty + 0.1*elevation_bonus`,
/// each term bounded so the total sits in `[0, 1+eps]`.
pub fn score(inputs: &ScoreInputs) -> f64 {
    let required_m = miles_to_meters(inputs.min_visibility_miles);
    let distance_score = (inputs.max_distance_m / (required_m * 1.5)).min(1.0);
    let fov_score = (inputs.actual_fov_deg / inputs.min_field_of_view_deg.max(1.0)).min(1.0);
    let walk_penalty = (1.0 - inputs.walk_minutes / inputs.max_walk_minutes).max(0.0);
    let elevation_bonus = (inputs.elevation_m / 500.0).tanh();

    0.4 * distance_score + 0.3 * fov_score + 0.2 * walk_penalty + 0.1 * elevation_bonus
}
