//! # Path authoring files
//!
//! A path is authored as an ordered list of waypoints. Each waypoint gives the
//! speed to drive at while approaching it and, for interior waypoints, the
//! radius of the arc used to round the corner there.
//!
//! ```toml
//! reversed = false
//!
//! [[waypoints]]
//! x_in = 0.0
//! y_in = 0.0
//! speed_ips = 0.0
//!
//! [[waypoints]]
//! x_in = 100.0
//! y_in = 0.0
//! speed_ips = 60.0
//! radius_in = 30.0
//! marker = "corner"
//! ```

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A path authoring file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSpec {
    /// Drive the path backwards.
    #[serde(default)]
    pub reversed: bool,

    /// Speed at the start of the path in inches/second.
    #[serde(default)]
    pub start_speed_ips: f64,

    pub waypoints: Vec<WaypointSpec>,
}

/// A single waypoint in a path file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointSpec {
    pub x_in: f64,
    pub y_in: f64,

    /// Speed cap for the segment arriving at this waypoint.
    #[serde(default)]
    pub speed_ips: f64,

    /// Corner radius. Zero is only valid where the path goes straight on.
    #[serde(default)]
    pub radius_in: f64,

    /// Optional marker name reported when the waypoint is passed.
    #[serde(default)]
    pub marker: Option<String>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PathSpecError {
    #[error("Cannot read the path file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot parse the path file: {0}")]
    DeserialiseError(toml::de::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl PathSpec {
    /// Parse a path spec from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, PathSpecError> {
        toml::from_str(s).map_err(PathSpecError::DeserialiseError)
    }

    /// Load a path spec from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PathSpecError> {
        let s = std::fs::read_to_string(path).map_err(PathSpecError::FileLoadError)?;
        Self::from_toml_str(&s)
    }
}

impl WaypointSpec {
    pub fn new(x_in: f64, y_in: f64, speed_ips: f64, radius_in: f64) -> Self {
        Self {
            x_in,
            y_in,
            speed_ips,
            radius_in,
            marker: None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let spec = PathSpec::from_toml_str(
            r#"
            [[waypoints]]
            x_in = 0.0
            y_in = 0.0

            [[waypoints]]
            x_in = 100.0
            y_in = 0.0
            speed_ips = 60.0
            marker = "end"
            "#,
        )
        .unwrap();

        assert!(!spec.reversed);
        assert_eq!(spec.start_speed_ips, 0.0);
        assert_eq!(spec.waypoints.len(), 2);
        assert_eq!(spec.waypoints[0].radius_in, 0.0);
        assert_eq!(spec.waypoints[1].marker.as_deref(), Some("end"));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            PathSpec::from_toml_str("waypoints = 3"),
            Err(PathSpecError::DeserialiseError(_))
        ));
    }
}
