//! Geocoordinate validation: global bounds plus the Cameroon bounding box.

use crate::error::{CoreError, CoreResult};

/// Southernmost latitude of the supported country.
pub const COUNTRY_LAT_MIN: f64 = 1.65;
/// Northernmost latitude of the supported country.
pub const COUNTRY_LAT_MAX: f64 = 13.05;
/// Westernmost longitude of the supported country.
pub const COUNTRY_LON_MIN: f64 = 8.38;
/// Easternmost longitude of the supported country.
pub const COUNTRY_LON_MAX: f64 = 16.19;

/// Validate a latitude/longitude pair.
///
/// Both values must be within global bounds and jointly inside the
/// Cameroon bounding box. Each failure mode has its own message.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> CoreResult<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(CoreError::Validation(
            "Invalid latitude. Must be between -90 and 90 degrees".to_string(),
        ));
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(CoreError::Validation(
            "Invalid longitude. Must be between -180 and 180 degrees".to_string(),
        ));
    }

    let in_country = (COUNTRY_LAT_MIN..=COUNTRY_LAT_MAX).contains(&latitude)
        && (COUNTRY_LON_MIN..=COUNTRY_LON_MAX).contains(&longitude);

    if !in_country {
        return Err(CoreError::Validation(
            "Coordinates must be within Cameroon".to_string(),
        ));
    }

    Ok(())
}
