//! Closed status enums for farmers and projects.
//!
//! Statuses are stored as strings in the database but every comparison in
//! the codebase goes through these enums, so an unknown value is rejected
//! at the boundary instead of silently failing an equality check.

use serde::{Deserialize, Serialize};

/// Farmer account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FarmerStatus {
    Active,
    Inactive,
}

impl FarmerStatus {
    /// Return the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Parse a status string. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] = &["active", "inactive"];
}

impl std::fmt::Display for FarmerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Crop project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Completed,
    Planned,
    Planning,
    Harvesting,
}

impl ProjectStatus {
    /// Return the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Planned => "planned",
            Self::Planning => "planning",
            Self::Harvesting => "harvesting",
        }
    }

    /// Parse a status string. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "planned" => Some(Self::Planned),
            "planning" => Some(Self::Planning),
            "harvesting" => Some(Self::Harvesting),
            _ => None,
        }
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] =
        &["active", "completed", "planned", "planning", "harvesting"];
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        Self::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn farmer_status_round_trips() {
        for s in FarmerStatus::ALL {
            assert_eq!(FarmerStatus::parse(s).unwrap().as_str(), *s);
        }
    }

    #[test]
    fn farmer_status_rejects_unknown() {
        assert_eq!(FarmerStatus::parse("suspended"), None);
        assert_eq!(FarmerStatus::parse("Active"), None);
    }

    #[test]
    fn project_status_round_trips() {
        for s in ProjectStatus::ALL {
            assert_eq!(ProjectStatus::parse(s).unwrap().as_str(), *s);
        }
    }

    #[test]
    fn project_status_rejects_unknown() {
        assert_eq!(ProjectStatus::parse("abandoned"), None);
    }

    #[test]
    fn project_status_defaults_to_active() {
        assert_eq!(ProjectStatus::default(), ProjectStatus::Active);
    }
}
