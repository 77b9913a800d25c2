//! Location validation: `"City, Region"` against the fixed region set.

use crate::error::{CoreError, CoreResult};

/// The ten Cameroon regions a farmer location may reference.
pub const REGIONS: &[&str] = &[
    "Adamawa",
    "Centre",
    "East",
    "Far North",
    "Littoral",
    "North",
    "Northwest",
    "South",
    "Southwest",
    "West",
];

/// Minimum length of the city part, after trimming.
pub const MIN_CITY_LENGTH: usize = 2;

/// Validate a location string, returning the trimmed `(city, region)` pair.
///
/// The region is matched case-insensitively; the returned region is the
/// canonical spelling from [`REGIONS`].
pub fn validate_location(raw: &str) -> CoreResult<(String, String)> {
    if raw.trim().is_empty() {
        return Err(CoreError::Validation("Location is required".to_string()));
    }

    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() != 2 {
        return Err(CoreError::Validation(
            "Invalid location format. Use: City, Region (e.g., \"Yaoundé, Centre\")".to_string(),
        ));
    }

    let city = parts[0].trim();
    if city.chars().count() < MIN_CITY_LENGTH {
        return Err(CoreError::Validation(
            "Invalid location format. City name must be at least 2 characters".to_string(),
        ));
    }

    let region = parts[1].trim();
    let canonical = REGIONS
        .iter()
        .find(|r| r.eq_ignore_ascii_case(region))
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid Cameroon region. Valid regions: {}",
                REGIONS.join(", ")
            ))
        })?;

    Ok((city.to_string(), (*canonical).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_location_parses() {
        let (city, region) = validate_location("Yaoundé, Centre").unwrap();
        assert_eq!(city, "Yaoundé");
        assert_eq!(region, "Centre");
    }

    #[test]
    fn region_match_is_case_insensitive() {
        let (_, region) = validate_location("Douala, littoral").unwrap();
        assert_eq!(region, "Littoral");
    }

    #[test]
    fn missing_comma_is_rejected() {
        let err = validate_location("Yaoundé").unwrap_err();
        assert!(err.to_string().contains("City, Region"));
    }

    #[test]
    fn two_commas_are_rejected() {
        assert!(validate_location("Yaoundé, Centre, Cameroon").is_err());
    }

    #[test]
    fn unknown_region_lists_valid_set() {
        let err = validate_location("Yaoundé, Atlantis").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Valid regions"));
        for region in REGIONS {
            assert!(msg.contains(region), "message should list {region}");
        }
    }

    #[test]
    fn one_char_city_is_rejected() {
        assert!(validate_location("Y, Centre").is_err());
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = validate_location("").unwrap_err();
        assert!(err.to_string().contains("required"));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let (city, region) = validate_location("  Bamenda ,  Northwest ").unwrap();
        assert_eq!(city, "Bamenda");
        assert_eq!(region, "Northwest");
    }
}
