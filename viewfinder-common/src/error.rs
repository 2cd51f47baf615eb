use thiserror::Error;

/// Errors surfaced at the core pipeline boundary.
///
/// `EmptyResult` is deliberately absent here: zero surviving candidates is a valid,
/// non-error outcome and is represented by an empty result list instead.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("observer latitude {0} is out of range [-90, 90]")]
    InvalidLatitude(f64),
    #[error("observer longitude {0} is out of range [-180, 180]")]
    InvalidLongitude(f64),
    #[error("{field} must be >= {min}, got {value}")]
    OutOfBounds { field: &'static str, value: f64, min: f64 },
    #[error("{field} must be in [{min}, {max}], got {value}")]
    OutOfRange { field: &'static str, value: f64, min: f64, max: f64 },
    #[error("observer coordinate ({lat}, {lon}) falls outside the supplied DEM extent")]
    ObserverOutsideGrid { lat: f64, lon: f64 },
    #[error("road network contains no polylines")]
    EmptyRoadNetwork,
    #[error("road network CRS {roads_crs} does not match terrain CRS {terrain_crs}")]
    CrsMismatch { terrain_crs: String, roads_crs: String },
    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
