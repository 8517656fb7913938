//! # Per-tick inputs

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Field relative pose estimate from localisation.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseEstimate {
    pub x_in: f64,
    pub y_in: f64,

    /// Heading about the field Z+ axis, counter-clockwise positive.
    pub heading_rad: f64,
}

/// A vision target observation.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionTarget {
    /// Horizontal angular offset of the target from the camera axis, positive
    /// to the right.
    pub offset_deg: f64,

    /// Width of the target in the image in pixels.
    pub width_px: f64,

    /// True if the target is seen through the rear camera.
    pub over_back: bool,
}

/// Everything the drive unit reads at the start of a tick.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveInputs {
    /// Monotonic timestamp in seconds.
    pub timestamp_s: f64,

    pub pose: PoseEstimate,

    /// Current vision target, if one is visible.
    pub vision: Option<VisionTarget>,
}
