//! Trajectory follower state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::Arc;

use log::{info, trace, warn};
use serde::Serialize;

use super::{Params, Ramsete};
use crate::geom::{Pose2d, Twist2d};
use crate::kinematics::{DriveKinematics, MotorModel};
use crate::traj::{TimedState, Trajectory, TrajectoryIterator};
use drive_if::{DriveCommand, DriveDemand, DriveSignal, FollowerState, SetpointTm, TrackingError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Closed loop trajectory follower.
#[derive(Debug)]
pub struct TrajFollower {
    params: Params,
    kinematics: DriveKinematics,
    motor: MotorModel,
    controller: Ramsete,

    state: FollowerState,

    /// Cursor over the active trajectory
    iter: Option<TrajectoryIterator>,

    /// Time of the first update on the active trajectory
    start_time_s: Option<f64>,

    /// Time of the previous update, used to integrate the error
    last_update_s: Option<f64>,

    /// True if the trajectory was abandoned rather than completed
    overridden: bool,

    last_setpoint: Option<TimedState>,
    last_error: Option<Pose2d>,
    report: StatusReport,

    /// Index of the next marker to pass
    next_marker: usize,
    markers_passed: Vec<String>,
}

/// Output of a follower update.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowerOutput {
    pub cmd: DriveCommand,

    /// The setpoint sampled this tick, if following.
    pub setpoint: Option<TimedState>,

    /// The setpoint pose in the robot frame, if following.
    pub error: Option<Pose2d>,

    /// The chassis velocity correction applied on top of the setpoint.
    pub correction: Twist2d,
}

/// The status report containing error statistics and limit flags.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    /// Longitudinal error to the setpoint, positive when the setpoint is ahead
    pub long_error_in: f64,

    /// Lateral error to the setpoint, positive when the setpoint is to the left
    pub lat_error_in: f64,

    /// Heading error to the setpoint
    pub head_error_rad: f64,

    /// Largest absolute lateral error on the active trajectory
    pub max_abs_lat_error_in: f64,

    /// Largest absolute heading error on the active trajectory
    pub max_abs_head_error_rad: f64,

    /// Integral of the absolute lateral error over time
    ///
    /// Units: inch seconds
    pub integral_abs_lat_error_in_s: f64,

    /// If true the limit on the lateral error has been exceeded
    pub lat_error_limit_exceeded: bool,

    /// If true the limit on the heading error has been exceeded
    pub head_error_limit_exceeded: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajFollower {
    pub fn new(params: Params, kinematics: DriveKinematics, motor: MotorModel) -> Self {
        let controller = Ramsete::from_params(&params);
        Self {
            params,
            kinematics,
            motor,
            controller,
            state: FollowerState::Idle,
            iter: None,
            start_time_s: None,
            last_update_s: None,
            overridden: false,
            last_setpoint: None,
            last_error: None,
            report: StatusReport::default(),
            next_marker: 0,
            markers_passed: Vec::new(),
        }
    }

    /// Replace the active trajectory and begin following it.
    ///
    /// All error state from any previous trajectory is discarded. The
    /// trajectory's clock starts on the next call to `update`.
    pub fn set_trajectory(&mut self, traj: Arc<Trajectory>) {
        info!(
            "Following new trajectory: {:.3} in over {:.3} s",
            traj.total_distance(),
            traj.duration()
        );

        self.iter = Some(traj.iter());
        self.reset();
        self.state = FollowerState::Following;
    }

    /// Abandon the active trajectory and hold a brake command from now on.
    pub fn override_trajectory(&mut self) {
        if !self.overridden {
            warn!("Trajectory overridden");
        }
        self.overridden = true;
        if self.state == FollowerState::Following {
            self.state = FollowerState::Done;
        }
    }

    /// Discard the trajectory and return to idle.
    pub fn clear(&mut self) {
        self.iter = None;
        self.reset();
        self.state = FollowerState::Idle;
    }

    pub fn state(&self) -> FollowerState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == FollowerState::Done
    }

    pub fn is_overridden(&self) -> bool {
        self.overridden
    }

    pub fn trajectory(&self) -> Option<&Arc<Trajectory>> {
        self.iter.as_ref().map(|it| it.trajectory())
    }

    /// Time along the active trajectory.
    pub fn progress(&self) -> f64 {
        self.iter.as_ref().map(|it| it.progress()).unwrap_or(0.0)
    }

    pub fn last_setpoint(&self) -> Option<&TimedState> {
        self.last_setpoint.as_ref()
    }

    /// The setpoint pose in the robot frame at the last update.
    pub fn last_error(&self) -> Option<&Pose2d> {
        self.last_error.as_ref()
    }

    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    pub fn markers_passed(&self) -> &[String] {
        &self.markers_passed
    }

    pub fn kinematics(&self) -> &DriveKinematics {
        &self.kinematics
    }

    /// Run one tick of trajectory following.
    ///
    /// `now_s` is a monotonic time in seconds and `pose` the current field
    /// relative pose estimate.
    pub fn update(&mut self, now_s: f64, pose: &Pose2d) -> FollowerOutput {
        match self.state {
            FollowerState::Idle => FollowerOutput::hold(DriveCommand::new(DriveDemand::velocity(
                DriveSignal::NEUTRAL,
                DriveSignal::NEUTRAL,
            ))),
            FollowerState::Done => self.output_done(),
            FollowerState::Following => self.output_following(now_s, pose),
        }
    }

    /// Output once the trajectory has finished. A completed trajectory holds
    /// zero velocity, an abandoned one brakes.
    fn output_done(&self) -> FollowerOutput {
        if self.overridden {
            FollowerOutput::hold(DriveCommand::brake())
        } else {
            FollowerOutput::hold(DriveCommand::new(DriveDemand::velocity(
                DriveSignal::NEUTRAL,
                DriveSignal::NEUTRAL,
            )))
        }
    }

    fn output_following(&mut self, now_s: f64, pose: &Pose2d) -> FollowerOutput {
        // ---- SETPOINT ----

        let start_s = *self.start_time_s.get_or_insert(now_s);
        let progress_s = (now_s - start_s).max(0.0);

        let (setpoint, at_end, traj) = match self.iter.as_mut() {
            Some(iter) => {
                let traj_start_s = iter.trajectory().start_time();
                let setpoint = iter.advance_to(traj_start_s + progress_s);
                (setpoint, iter.is_done(), Arc::clone(iter.trajectory()))
            }
            None => {
                warn!("Following without a trajectory, returning to idle");
                self.clear();
                return self.update(now_s, pose);
            }
        };

        // ---- ERROR ----

        let error = pose.inverse().transform_by(&setpoint.state.pose);
        let long_err_in = error.translation.x();
        let lat_err_in = error.translation.y();
        let head_err_rad = error.rotation.radians();

        let dt_s = self
            .last_update_s
            .map(|t| (now_s - t).max(0.0))
            .unwrap_or(0.0);
        self.last_update_s = Some(now_s);

        self.report.long_error_in = long_err_in;
        self.report.lat_error_in = lat_err_in;
        self.report.head_error_rad = head_err_rad;
        self.report.max_abs_lat_error_in = self.report.max_abs_lat_error_in.max(lat_err_in.abs());
        self.report.max_abs_head_error_rad =
            self.report.max_abs_head_error_rad.max(head_err_rad.abs());
        self.report.integral_abs_lat_error_in_s += lat_err_in.abs() * dt_s;

        if lat_err_in.abs() > self.params.lat_error_limit_in {
            self.report.lat_error_limit_exceeded = true;
        }
        if head_err_rad.abs() > self.params.head_error_limit_rad {
            self.report.head_error_limit_exceeded = true;
        }

        self.last_setpoint = Some(setpoint);
        self.last_error = Some(error);

        self.update_markers(&traj, setpoint.state.distance);

        // Stop as close to the path as possible if the errors are too large
        if self.report.lat_error_limit_exceeded || self.report.head_error_limit_exceeded {
            warn!(
                "Trajectory error limit exceeded (lateral {:.3} in, heading {:.3} rad), aborting",
                lat_err_in, head_err_rad
            );
            self.overridden = true;
            self.state = FollowerState::Done;
            return FollowerOutput {
                cmd: DriveCommand::brake(),
                setpoint: Some(setpoint),
                error: Some(error),
                correction: Twist2d::identity(),
            };
        }

        // ---- COMMAND ----

        let v_d = setpoint.velocity;
        let w_d = v_d * setpoint.state.curvature;
        let corrected = self.controller.calculate(&error, v_d, w_d);
        let correction = Twist2d::new(corrected.dx - v_d, 0.0, corrected.dtheta - w_d);

        let wheel_vel_ips = self.kinematics.inverse(&corrected);
        let ff = self.motor.feedforward(
            &self.kinematics.inverse(&Twist2d::new(v_d, 0.0, w_d)),
            &self.kinematics.inverse(&Twist2d::new(
                setpoint.acceleration,
                0.0,
                setpoint.acceleration * setpoint.state.curvature,
            )),
        );

        trace!(
            "Follow t={:.3} v={:.3} err=({:.3}, {:.3}, {:.3}) cmd=({:.3}, {:.3})",
            setpoint.t,
            v_d,
            long_err_in,
            lat_err_in,
            head_err_rad,
            wheel_vel_ips.left,
            wheel_vel_ips.right
        );

        // ---- COMPLETION ----

        if at_end && error.translation.norm() < self.params.done_tolerance_in {
            info!(
                "Trajectory complete after {:.3} s (final error {:.3} in)",
                progress_s,
                error.translation.norm()
            );
            self.state = FollowerState::Done;
        }

        FollowerOutput {
            cmd: DriveCommand::new(DriveDemand::velocity(wheel_vel_ips, ff)),
            setpoint: Some(setpoint),
            error: Some(error),
            correction,
        }
    }

    fn update_markers(&mut self, traj: &Trajectory, distance_in: f64) {
        while let Some(marker) = traj.markers().get(self.next_marker) {
            if distance_in + crate::geom::GEOM_EPSILON < marker.distance_in {
                break;
            }
            info!("Passed marker \"{}\"", marker.name);
            self.markers_passed.push(marker.name.clone());
            self.next_marker += 1;
        }
    }

    /// Clear all per-trajectory state.
    fn reset(&mut self) {
        self.start_time_s = None;
        self.last_update_s = None;
        self.overridden = false;
        self.last_setpoint = None;
        self.last_error = None;
        self.report = StatusReport::default();
        self.next_marker = 0;
        self.markers_passed.clear();
    }
}

impl FollowerOutput {
    fn hold(cmd: DriveCommand) -> Self {
        Self {
            cmd,
            setpoint: None,
            error: None,
            correction: Twist2d::identity(),
        }
    }

    /// Telemetry view of the error.
    pub fn tracking_error(&self) -> Option<TrackingError> {
        self.error.map(|e| TrackingError {
            x_in: e.translation.x(),
            y_in: e.translation.y(),
            theta_rad: e.rotation.radians(),
        })
    }

    /// Telemetry view of the setpoint.
    pub fn setpoint_tm(&self) -> Option<SetpointTm> {
        self.setpoint.map(|s| SetpointTm {
            t_s: s.t,
            x_in: s.state.pose.translation.x(),
            y_in: s.state.pose.translation.y(),
            heading_rad: s.state.pose.heading(),
            curvature: s.state.curvature,
            distance_in: s.state.distance,
            velocity_ips: s.velocity,
            accel_ips2: s.acceleration,
        })
    }
}
