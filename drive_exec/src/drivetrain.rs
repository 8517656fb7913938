//! # Drivetrain
//!
//! A drivetrain is one drive unit shared between the control loop and any
//! number of other threads. Requests and ticks go through a mutex around the
//! drive controller, held only for the duration of one call. Each tick
//! publishes a new immutable telemetry snapshot which readers load without
//! taking the lock.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::Arc;

use arc_swap::ArcSwap;
use log::{info, warn};
use parking_lot::Mutex;

use crate::drive_ctrl::{DriveCtrl, OutputData, StatusReport};
use crate::path::{self, PathBuilder};
use crate::traj::{TrajError, Trajectory};
use drive_if::{DriveInputs, DriveMode, DriveRequest, DriveSignal, DriveTm};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct Drivetrain {
    name: String,
    ctrl: Mutex<DriveCtrl>,
    path_params: path::Params,
    tm: ArcSwap<DriveTm>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Drivetrain {
    pub fn new<S: Into<String>>(name: S, ctrl: DriveCtrl, path_params: path::Params) -> Self {
        Self {
            name: name.into(),
            ctrl: Mutex::new(ctrl),
            path_params,
            tm: ArcSwap::from_pointee(DriveTm::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle a request from the operator or autonomy.
    ///
    /// Returns whether the request was accepted. Paths are turned into
    /// trajectories before the controller is locked, so a bad path is
    /// reported as an error and leaves the unit untouched.
    pub fn handle_request(&self, request: DriveRequest) -> Result<bool, TrajError> {
        let accepted = match request {
            DriveRequest::FollowPath(spec) => {
                let traj = PathBuilder::from_spec(&spec).build_trajectory(&self.path_params)?;
                self.set_trajectory(traj)
            }
            DriveRequest::OpenLoop(signal) => self.ctrl.lock().set_open_loop(signal),
            DriveRequest::Velocity(velocity_ips) => self.ctrl.lock().set_velocity(velocity_ips),
            DriveRequest::TurnToHeading { heading_rad } => {
                self.ctrl.lock().set_turn_to_heading(heading_rad)
            }
            DriveRequest::VisionSteering { throttle } => {
                self.ctrl.lock().set_vision_steering(throttle)
            }
            DriveRequest::OverrideTrajectory => {
                self.ctrl.lock().override_trajectory();
                true
            }
            DriveRequest::Cancel => {
                self.ctrl.lock().cancel();
                true
            }
        };

        if !accepted {
            warn!("{}: request rejected in {}", self.name, self.mode());
        }

        Ok(accepted)
    }

    /// Start following a prebuilt trajectory.
    pub fn set_trajectory(&self, traj: Arc<Trajectory>) -> bool {
        self.ctrl.lock().set_trajectory(traj)
    }

    /// Return to open loop with a neutral output.
    pub fn stop(&self) {
        info!("{}: stopping", self.name);
        self.ctrl.lock().set_open_loop(DriveSignal::NEUTRAL);
    }

    pub fn mode(&self) -> DriveMode {
        self.ctrl.lock().mode()
    }

    pub fn is_done_with_trajectory(&self) -> bool {
        self.ctrl.lock().is_done_with_trajectory()
    }

    /// Run the drive controller once and publish the telemetry snapshot.
    pub fn tick(&self, inputs: &DriveInputs) -> (OutputData, StatusReport) {
        let mut ctrl = self.ctrl.lock();

        let (output, report) = match ctrl.proc(inputs) {
            Ok(r) => r,
            Err(e) => match e {},
        };

        let tm = DriveTm {
            timestamp_s: inputs.timestamp_s,
            mode: output.mode,
            mode_changed: output.previous_mode.is_some(),
            follower: report.follower,
            error: output.error,
            setpoint: output.setpoint,
            cmd: output.cmd,
            markers_passed: ctrl.follower().markers_passed().to_vec(),
        };
        drop(ctrl);

        self.tm.store(Arc::new(tm));

        (output, report)
    }

    /// The snapshot published by the last tick.
    pub fn telemetry(&self) -> Arc<DriveTm> {
        self.tm.load_full()
    }
}
