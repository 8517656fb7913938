//! Vision steering

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;
use serde::Serialize;

use super::Params;
use drive_if::{DriveSignal, VisionTarget};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// State of vision steering.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct VisionState {
    /// Operator throttle in [-1, 1]. Zero lets the throttle be chosen from the
    /// size of the target.
    pub throttle: f64,

    /// Set once a target has been steered towards.
    acquired: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VisionState {
    pub fn new(throttle: f64) -> Self {
        Self {
            throttle,
            acquired: false,
        }
    }

    pub fn is_acquired(&self) -> bool {
        self.acquired
    }

    /// Voltage fractions steering towards the target.
    ///
    /// With no operator throttle the robot drives towards the target, slowing
    /// as the target grows in the image. The angular offset of the target is
    /// turned into a differential between the sides, but only while driving
    /// towards the camera that sees the target.
    pub fn steer(&mut self, target: &VisionTarget, params: &Params) -> DriveSignal {
        if !self.acquired {
            info!(
                "Vision target acquired at {:.2} deg ({} camera)",
                target.offset_deg,
                if target.over_back { "rear" } else { "front" }
            );
            self.acquired = true;
        }

        let throttle = if self.throttle == 0.0 {
            let width = (target.width_px * params.vision_width_gain)
                .min(params.vision_width_limit_px);
            let auto = (1.0 - width / params.vision_image_width_px)
                * params.vision_drive_forward_fraction;
            if target.over_back {
                -auto
            } else {
                auto
            }
        } else {
            self.throttle
        };

        let towards_target =
            (target.over_back && throttle <= 0.0) || (!target.over_back && throttle >= 0.0);

        let (left, right) = if towards_target {
            let offset = target.offset_deg / params.vision_offset_scale_deg;
            (1.0 + offset, 1.0 - offset)
        } else {
            (1.0, 1.0)
        };

        DriveSignal::new(throttle * left, throttle * right).normalised(1.0)
    }
}
