// Configuration structures for a viewfinder query. Backed by a JSON document; validated
// against the declared bounds on load rather than trusted blindly, mirroring the
// settings.json pattern used elsewhere in the stack.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ObserverConfig {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude_m: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    pub search_radius_km: f64,
    pub resolution_scale: f64,
    pub max_visibility_km: f64,
    pub cluster_grid_m: f64,
}

impl Default for TerrainConfig {
    fn default() -> TerrainConfig {
        TerrainConfig {
            search_radius_km: 30.0,
            resolution_scale: 1.0,
            max_visibility_km: 100.0,
            cluster_grid_m: 250.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct RoadConfig {
    pub walking_speed_kmh: f64,
    pub driving_speed_kmh: f64,
    pub max_walk_minutes: f64,
    pub max_drive_minutes: Option<f64>,
}

impl Default for RoadConfig {
    fn default() -> RoadConfig {
        RoadConfig {
            walking_speed_kmh: 4.8,
            driving_speed_kmh: 60.0,
            max_walk_minutes: 15.0,
            max_drive_minutes: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct VisibilityConfig {
    pub observer_eye_height_m: f64,
    pub obstruction_start_m: f64,
    pub obstruction_height_m: f64,
    pub min_visibility_miles: f64,
    pub min_field_of_view_deg: f64,
    pub azimuth_deg: f64,
    pub rays_full_circle: u32,
}

impl Default for VisibilityConfig {
    fn default() -> VisibilityConfig {
        VisibilityConfig {
            observer_eye_height_m: 1.8,
            obstruction_start_m: 10.0,
            obstruction_height_m: 15.0,
            min_visibility_miles: 3.0,
            min_field_of_view_deg: 30.0,
            azimuth_deg: 0.0,
            rays_full_circle: 72,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub results_limit: usize,
}

impl Default for OutputConfig {
    fn default() -> OutputConfig {
        OutputConfig { results_limit: 10 }
    }
}

/// Top-level configuration for a single viewfinder query. Validated on construction;
/// never mutated during pipeline execution.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct AppConfig {
    pub observer: ObserverConfig,
    #[serde(default)]
    pub terrain: TerrainConfig,
    #[serde(default)]
    pub roads: RoadConfig,
    #[serde(default)]
    pub visibility: VisibilityConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    pub fn from_json(contents: &str) -> CoreResult<AppConfig> {
        let config: AppConfig =
            serde_json::from_str(contents).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CoreResult<()> {
        let obs = &self.observer;
        if !(-90.0..=90.0).contains(&obs.latitude) {
            return Err(CoreError::InvalidLatitude(obs.latitude));
        }
        if !(-180.0..=180.0).contains(&obs.longitude) {
            return Err(CoreError::InvalidLongitude(obs.longitude));
        }
        check_min("observer.altitude_m", obs.altitude_m, 0.0)?;

        let t = &self.terrain;
        check_min("terrain.search_radius_km", t.search_radius_km, 1.0)?;
        check_range("terrain.resolution_scale", t.resolution_scale, 0.1, 4.0)?;
        check_min("terrain.max_visibility_km", t.max_visibility_km, 1.0)?;
        check_min("terrain.cluster_grid_m", t.cluster_grid_m, 50.0)?;

        let r = &self.roads;
        check_range("roads.walking_speed_kmh", r.walking_speed_kmh, 0.5, 10.0)?;
        check_range("roads.driving_speed_kmh", r.driving_speed_kmh, 5.0, 150.0)?;
        check_range("roads.max_walk_minutes", r.max_walk_minutes, 1.0, 180.0)?;
        if let Some(drive_max) = r.max_drive_minutes {
            check_range("roads.max_drive_minutes", drive_max, 1.0, 600.0)?;
        }

        let v = &self.visibility;
        check_range("visibility.observer_eye_height_m", v.observer_eye_height_m, 0.5, 3.0)?;
        check_min("visibility.obstruction_start_m", v.obstruction_start_m, 0.0)?;
        check_min("visibility.obstruction_height_m", v.obstruction_height_m, 0.0)?;
        check_min("visibility.min_visibility_miles", v.min_visibility_miles, 0.1)?;
        check_range("visibility.min_field_of_view_deg", v.min_field_of_view_deg, 1.0, 360.0)?;
        if !(0.0..360.0).contains(&v.azimuth_deg) {
            return Err(CoreError::OutOfRange {
                field: "visibility.azimuth_deg",
                value: v.azimuth_deg,
                min: 0.0,
                max: 360.0,
            });
        }
        if !(8..=720).contains(&v.rays_full_circle) {
            return Err(CoreError::OutOfRange {
                field: "visibility.rays_full_circle",
                value: v.rays_full_circle as f64,
                min: 8.0,
                max: 720.0,
            });
        }

        check_range("output.results_limit", self.output.results_limit as f64, 1.0, 100.0)?;

        Ok(())
    }
}

fn check_min(field: &'static str, value: f64, min: f64) -> CoreResult<()> {
    if value < min {
        return Err(CoreError::OutOfBounds { field, value, min });
    }
    Ok(())
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> CoreResult<()> {
    if value < min || value > max {
        return Err(CoreError::OutOfRange { field, value, min, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            observer: ObserverConfig { latitude: 45.0, longitude: -122.0, altitude_m: 0.0 },
            terrain: TerrainConfig::default(),
            roads: RoadConfig::default(),
            visibility: VisibilityConfig::default(),
            output: OutputConfig::default(),
        }
    }

    #[test]
    fn default_config_validates() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn rejects_latitude_out_of_range() {
        let mut cfg = base_config();
        cfg.observer.latitude = 95.0;
        assert!(matches!(cfg.validate(), Err(CoreError::InvalidLatitude(_))));
    }

    #[test]
    fn rejects_negative_altitude() {
        let mut cfg = base_config();
        cfg.observer.altitude_m = -5.0;
        assert!(matches!(cfg.validate(), Err(CoreError::OutOfBounds { field: "observer.altitude_m", .. })));
    }

    #[test]
    fn rejects_azimuth_of_exactly_360() {
        let mut cfg = base_config();
        cfg.visibility.azimuth_deg = 360.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = base_config();
        let json = serde_json::to_string(&cfg).unwrap();
        let parsed = AppConfig::from_json(&json).unwrap();
        assert_eq!(parsed, cfg);
    }
}
