// Unit conversions, azimuth arithmetic, and UTM projection helpers.
//
// The UTM forward/inverse formulas are adapted from the WhiteboxTools geospatial
// analysis library (itself derived from the well-known Java/JS conversion in
// https://stackoverflow.com/questions/176137/java-convert-lat-lon-to-utm).

use std::time::Instant;

pub const MILES_TO_METERS: f64 = 1609.344;
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

pub fn miles_to_meters(miles: f64) -> f64 {
    miles * MILES_TO_METERS
}

pub fn meters_to_miles(meters: f64) -> f64 {
    meters / MILES_TO_METERS
}

/// Returns a formatted string of elapsed time, e.g. `1min 34.852s`.
pub fn get_formatted_elapsed_time(instant: Instant) -> String {
    let dur = instant.elapsed();
    let minutes = dur.as_secs() / 60;
    let sub_sec = dur.as_secs() % 60;
    let sub_milli = dur.subsec_millis();
    if minutes > 0 {
        return format!("{}min {}.{}s", minutes, sub_sec, sub_milli);
    }
    format!("{}.{}s", sub_sec, sub_milli)
}

/// Unit vector for a compass azimuth (degrees clockwise from north), in a world
/// frame where x increases east and y increases north.
pub fn azimuth_unit_vector(azimuth_deg: f64) -> (f64, f64) {
    let radians = azimuth_deg.to_radians();
    (radians.sin(), radians.cos())
}

/// Returns the (start, end) azimuth bounds, in `[0, 360)`, of a sector centered on
/// `center_deg` spanning `span_deg`.
pub fn azimuth_range(center_deg: f64, span_deg: f64) -> (f64, f64) {
    let half = span_deg / 2.0;
    let start = (center_deg - half).rem_euclid(360.0);
    let end = (center_deg + half).rem_euclid(360.0);
    (start, end)
}

/// True iff `angle` lies on the (wrap-aware) arc from `start` to `end`, inclusive.
pub fn angle_in_sector(angle: f64, start: f64, end: f64) -> bool {
    if start <= end {
        angle >= start && angle <= end
    } else {
        angle >= start || angle <= end
    }
}

/// Great-circle distance in meters between two lat/lon points, via the haversine
/// formula on a spherical-earth approximation.
pub fn great_circle_distance_m(origin: (f64, f64), dest: (f64, f64)) -> f64 {
    let (lat1, lon1) = (origin.0.to_radians(), origin.1.to_radians());
    let (lat2, lon2) = (dest.0.to_radians(), dest.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_M * c
}

/// The UTM zone number (1..=60) and EPSG code for the WGS84 zone covering `(lat, lon)`.
pub fn utm_epsg_for_latlon(lat: f64, lon: f64) -> u32 {
    let zone = utm_zone_number(lon);
    if lat >= 0.0 {
        32600 + zone as u32
    } else {
        32700 + zone as u32
    }
}

pub fn utm_zone_number(lon: f64) -> i32 {
    (((lon + 180.0) / 6.0).floor() as i32) + 1
}

/// Projects a lat/lon pair to UTM easting/northing, returning `(easting, northing, zone, letter)`.
pub fn deg_to_utm(latitude: f64, longitude: f64) -> (f64, f64, isize, char) {
    let zone = (longitude / 6.0 + 31.0).floor();
    let letter = if latitude < -72.0 {
        'C'
    } else if latitude < -64.0 {
        'D'
    } else if latitude < -56.0 {
        'E'
    } else if latitude < -48.0 {
        'F'
    } else if latitude < -40.0 {
        'G'
    } else if latitude < -32.0 {
        'H'
    } else if latitude < -24.0 {
        'J'
    } else if latitude < -16.0 {
        'K'
    } else if latitude < -8.0 {
        'L'
    } else if latitude < 0.0 {
        'M'
    } else if latitude < 8.0 {
        'N'
    } else if latitude < 16.0 {
        'P'
    } else if latitude < 24.0 {
        'Q'
    } else if latitude < 32.0 {
        'R'
    } else if latitude < 40.0 {
        'S'
    } else if latitude < 48.0 {
        'T'
    } else if latitude < 56.0 {
        'U'
    } else if latitude < 64.0 {
        'V'
    } else if latitude < 72.0 {
        'W'
    } else {
        'X'
    };

    let lat = latitude.to_radians();
    let lon = longitude.to_radians();
    let val1 = (6.0 * zone - 183.0).to_radians();
    let val2 = (lon - val1).sin();
    let val3 = lat.cos();
    let val4 = (2.0 * lat).sin();
    let easting = 0.5
        * ((1.0 + val3 * val2) / (1.0 - val3 * val2)).ln()
        * 0.9996
        * 6399593.62
        / (1.0 + 0.0820944379 * 0.0820944379 * val3 * val3).sqrt()
        * (1.0
            + 0.0820944379 * 0.0820944379 / 2.0
                * (0.5 * ((1.0 + val3 * val2) / (1.0 - val3 * val2)).ln()).powi(2)
                * val3
                * val3
                / 3.0)
        + 500000.0;
    let mut northing = ((lat.tan() / (lon - val1).cos()).atan() - lat) * 0.9996 * 6399593.625
        / (1.0 + 0.006739496742 * val3 * val3).sqrt()
        * (1.0
            + 0.006739496742 / 2.0
                * (0.5 * ((1.0 + val3 * (lon - val1).sin()) / (1.0 - val3 * (lon - val1).sin())).ln())
                    .powi(2)
                * val3
                * val3)
        + 0.9996
            * 6399593.625
            * (lat - 0.005054622556 * (lat + val4 / 2.0)
                + 4.258201531e-05 * (3.0 * (lat + val4 / 2.0) + val4 * val3 * val3) / 4.0
                - 1.674057895e-07
                    * (5.0 * (3.0 * (lat + val4 / 2.0) + val4 * val3 * val3) / 4.0
                        + val4 * val3 * val3 * val3 * val3)
                    / 3.0);

    if letter < 'M' {
        northing += 10000000.0;
    }

    (easting, northing, zone as isize, letter)
}

/// WGS84 semi-major axis, in meters.
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
const WGS84_F: f64 = 1.0 / 298.257223563;
const UTM_K0: f64 = 0.9996;

/// Inverse of [`deg_to_utm`]: recovers `(latitude, longitude)` from a UTM
/// easting/northing, zone number, and hemisphere letter. Uses the standard
/// Snyder footpoint-latitude closed-form approximation rather than a pure
/// inverse of the forward formula above.
pub fn utm_to_deg(zone: isize, letter: char, easting: f64, northing: f64) -> (f64, f64) {
    let e2 = 2.0 * WGS84_F - WGS84_F * WGS84_F;
    let e4 = e2 * e2;
    let e6 = e2 * e4;
    let ep2 = e2 / (1.0 - e2);

    let north = if letter < 'N' { northing - 10_000_000.0 } else { northing };

    let m = north / UTM_K0;
    let mu = m / (WGS84_A * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));

    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());
    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let sin_phi1 = phi1.sin();
    let cos_phi1 = phi1.cos();
    let tan_phi1 = phi1.tan();

    let c1 = ep2 * cos_phi1 * cos_phi1;
    let t1 = tan_phi1 * tan_phi1;
    let n1 = WGS84_A / (1.0 - e2 * sin_phi1 * sin_phi1).sqrt();
    let r1 = WGS84_A * (1.0 - e2) / (1.0 - e2 * sin_phi1 * sin_phi1).powf(1.5);
    let d = (easting - 500_000.0) / (n1 * UTM_K0);

    let latitude_rad = phi1
        - (n1 * tan_phi1 / r1)
            * (d * d / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1) * d.powi(6) / 720.0);

    let central_meridian = (zone as f64) * 6.0 - 183.0;
    let longitude_rad = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
        + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d.powi(5) / 120.0)
        / cos_phi1;

    (latitude_rad.to_degrees(), central_meridian + longitude_rad.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miles_conversion_round_trips() {
        let meters = miles_to_meters(3.0);
        assert!((meters_to_miles(meters) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn zone_matches_known_examples() {
        assert_eq!(utm_zone_number(-122.0), 10);
        assert_eq!(utm_zone_number(2.0), 31);
        assert_eq!(utm_epsg_for_latlon(45.0, -122.0), 32610);
        assert_eq!(utm_epsg_for_latlon(-33.0, 151.0), 32756);
    }

    #[test]
    fn sector_wraps_around_north() {
        let (start, end) = azimuth_range(0.0, 90.0);
        assert!(angle_in_sector(350.0, start, end));
        assert!(angle_in_sector(10.0, start, end));
        assert!(!angle_in_sector(180.0, start, end));
    }

    #[test]
    fn utm_round_trip_agrees_within_a_meter() {
        let (lat, lon) = (45.5231, -122.6765);
        let (easting, northing, zone, letter) = deg_to_utm(lat, lon);
        let (lat2, lon2) = utm_to_deg(zone, letter, easting, northing);
        let (e2, n2, _, _) = deg_to_utm(lat2, lon2);
        assert!((easting - e2).abs() < 1.0);
        assert!((northing - n2).abs() < 1.0);
    }

    #[test]
    fn great_circle_distance_is_symmetric() {
        let a = (45.0, -122.0);
        let b = (46.0, -121.0);
        let d1 = great_circle_distance_m(a, b);
        let d2 = great_circle_distance_m(b, a);
        assert!((d1 - d2).abs() < 1e-6);
        assert!(d1 > 0.0);
    }
}
