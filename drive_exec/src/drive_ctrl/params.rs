//! Drive control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for drive control, loaded from `drive_ctrl.toml`.
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    // ---- OPEN LOOP ----
    /// Voltage fractions smaller than this are sent as zero.
    pub open_loop_deadband: f64,

    // ---- TURN TO HEADING ----
    /// Heading error under which a turn is complete.
    ///
    /// Units: radians
    pub turn_tolerance_rad: f64,

    // ---- VISION STEERING ----
    /// Target offset giving a full differential between the sides.
    ///
    /// Units: degrees
    pub vision_offset_scale_deg: f64,

    /// Throttle used when the operator gives none and the target is far away.
    pub vision_drive_forward_fraction: f64,

    /// Gain on the target width when slowing down on approach.
    pub vision_width_gain: f64,

    /// Limit on the scaled target width.
    ///
    /// Units: pixels
    pub vision_width_limit_px: f64,

    /// Width of the camera image.
    ///
    /// Units: pixels
    pub vision_image_width_px: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            open_loop_deadband: 0.04,
            turn_tolerance_rad: 5f64.to_radians(),
            vision_offset_scale_deg: 20.0,
            vision_drive_forward_fraction: 0.3,
            vision_width_gain: 4.0,
            vision_width_limit_px: 260.0,
            vision_image_width_px: 320.0,
        }
    }
}
