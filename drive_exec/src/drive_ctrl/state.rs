//! Drive control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::convert::Infallible;
use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;

use super::{transitions::transition_allowed, Params, TurnState, VisionState};
use crate::geom::{Pose2d, Rotation2d};
use crate::kinematics::{self, DriveKinematics, MotorModel};
use crate::traj::Trajectory;
use crate::traj_ctrl::{self, TrajFollower};
use drive_if::{
    DriveCommand, DriveDemand, DriveInputs, DriveMode, DriveSignal, FollowerState, SetpointTm,
    TrackingError,
};
use util::{
    maths::{deadband, limit},
    module::State,
    params,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state
#[derive(Debug)]
pub struct DriveCtrl {
    params: Params,
    kinematics: DriveKinematics,
    follower: TrajFollower,

    /// The active mode and its data
    mode: ModeState,

    /// The mode before the first transition since the last tick, if any
    changed_from: Option<DriveMode>,

    /// Set when a setpoint of the wrong control law was given this tick
    law_mismatch: bool,

    report: StatusReport,
}

/// Parameters needed to initialise drive control.
#[derive(Debug, Clone, Default)]
pub struct InitData {
    pub drive_ctrl: Params,
    pub kinematics: kinematics::Params,
    pub traj_ctrl: traj_ctrl::Params,
}

/// Output of one drive control tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputData {
    /// The command for the actuator driver.
    pub cmd: DriveCommand,

    /// The mode at the end of the tick.
    pub mode: DriveMode,

    /// The mode the unit was in before the transition(s) reported this tick.
    /// Only set on the first tick after a transition.
    pub previous_mode: Option<DriveMode>,

    pub error: Option<TrackingError>,
    pub setpoint: Option<SetpointTm>,
}

/// Status report for drive control processing.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub follower: FollowerState,

    /// Trajectory following statistics, valid while following.
    pub traj: traj_ctrl::StatusReport,

    /// True if a setpoint of the wrong control law was given and a neutral
    /// command sent instead.
    pub law_mismatch: bool,

    /// True if the turn to heading completed this tick.
    pub turn_complete: bool,

    /// True if vision steering lost its target this tick.
    pub vision_target_lost: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The active drive mode together with the data it runs on.
#[derive(Debug, Clone, PartialEq)]
pub enum ModeState {
    OpenLoop { signal: DriveSignal },
    VelocitySetpoint { velocity_ips: DriveSignal },
    TrajectoryFollowing,
    TurnToHeading(TurnState),
    VisionSteering(VisionState),
}

/// Errors that can occur while initialising drive control.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(#[from] params::LoadError),

    #[error("Invalid parameter {name}: {value}")]
    InvalidParam { name: &'static str, value: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl InitData {
    /// Load all parameter files from `$DRIVE_SW_ROOT/params`.
    pub fn load() -> Result<Self, InitError> {
        Ok(Self {
            drive_ctrl: params::load("drive_ctrl.toml")?,
            kinematics: params::load("kinematics.toml")?,
            traj_ctrl: params::load("traj_ctrl.toml")?,
        })
    }

    fn validate(&self) -> Result<(), InitError> {
        let positive = [
            ("track_width_in", self.kinematics.track_width_in),
            ("scrub_factor", self.kinematics.scrub_factor),
            ("nominal_voltage_v", self.kinematics.nominal_voltage_v),
            ("vision_offset_scale_deg", self.drive_ctrl.vision_offset_scale_deg),
            ("vision_image_width_px", self.drive_ctrl.vision_image_width_px),
        ];

        for (name, value) in positive.iter() {
            if !(*value > 0.0) {
                return Err(InitError::InvalidParam {
                    name: *name,
                    value: *value,
                });
            }
        }

        Ok(())
    }
}

impl ModeState {
    pub fn mode(&self) -> DriveMode {
        match self {
            ModeState::OpenLoop { .. } => DriveMode::OpenLoop,
            ModeState::VelocitySetpoint { .. } => DriveMode::VelocitySetpoint,
            ModeState::TrajectoryFollowing => DriveMode::TrajectoryFollowing,
            ModeState::TurnToHeading(_) => DriveMode::TurnToHeading,
            ModeState::VisionSteering(_) => DriveMode::VisionSteering,
        }
    }
}

impl Default for ModeState {
    fn default() -> Self {
        ModeState::OpenLoop {
            signal: DriveSignal::NEUTRAL,
        }
    }
}

impl Default for OutputData {
    fn default() -> Self {
        Self {
            cmd: DriveCommand::neutral(),
            mode: DriveMode::default(),
            previous_mode: None,
            error: None,
            setpoint: None,
        }
    }
}

impl Default for DriveCtrl {
    fn default() -> Self {
        let init = InitData::default();
        Self::from_init(&init)
    }
}

impl State for DriveCtrl {
    type InitData = InitData;
    type InitError = InitError;

    type InputData = DriveInputs;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = Infallible;

    /// Initialise drive control from its parameters.
    ///
    /// Any active mode is abandoned and the unit starts in open loop with a
    /// neutral output.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        init_data.validate()?;
        *self = Self::from_init(&init_data);
        Ok(())
    }

    /// Process drive control.
    ///
    /// Runs the active mode's `mode_xyz` function to get the command, then
    /// checks the command's control law against the mode's before returning
    /// it. Processing never fails.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.report = StatusReport::default();
        let mut output = OutputData::default();

        let cmd = if self.law_mismatch {
            self.report.law_mismatch = true;
            DriveCommand::neutral()
        } else {
            match self.mode.mode() {
                DriveMode::OpenLoop => self.mode_open_loop(),
                DriveMode::VelocitySetpoint => self.mode_velocity(),
                DriveMode::TrajectoryFollowing => self.mode_traj_following(input_data, &mut output),
                DriveMode::TurnToHeading => self.mode_turn_to_heading(input_data),
                DriveMode::VisionSteering => self.mode_vision_steering(input_data),
            }
        };
        self.law_mismatch = false;

        let mode = self.mode.mode();
        output.cmd = if cmd.control_law() == mode.control_law() || self.report.law_mismatch {
            cmd
        } else {
            warn!(
                "{} produced a {:?} command, sending neutral",
                mode,
                cmd.control_law()
            );
            self.report.law_mismatch = true;
            DriveCommand::neutral()
        };

        output.mode = mode;
        output.previous_mode = self.changed_from.take();
        self.report.follower = self.follower.state();

        Ok((output, self.report))
    }
}

impl DriveCtrl {
    /// Create drive control from its parameters.
    pub fn new(init_data: InitData) -> Result<Self, InitError> {
        init_data.validate()?;
        Ok(Self::from_init(&init_data))
    }

    fn from_init(init: &InitData) -> Self {
        let kinematics = DriveKinematics::from_params(&init.kinematics);
        Self {
            params: init.drive_ctrl.clone(),
            kinematics,
            follower: TrajFollower::new(
                init.traj_ctrl.clone(),
                kinematics,
                MotorModel::from_params(&init.kinematics),
            ),
            mode: ModeState::default(),
            changed_from: None,
            law_mismatch: false,
            report: StatusReport::default(),
        }
    }

    pub fn mode(&self) -> DriveMode {
        self.mode.mode()
    }

    pub fn mode_state(&self) -> &ModeState {
        &self.mode
    }

    pub fn follower(&self) -> &TrajFollower {
        &self.follower
    }

    pub fn kinematics(&self) -> &DriveKinematics {
        &self.kinematics
    }

    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    /// True if a transition has been made that the next tick will report.
    pub fn is_mode_change_pending(&self) -> bool {
        self.changed_from.is_some()
    }

    // ---- REQUESTS ----

    /// Drive open loop with voltage fractions.
    pub fn set_open_loop(&mut self, signal: DriveSignal) -> bool {
        match &mut self.mode {
            ModeState::OpenLoop { signal: s } => {
                *s = signal;
                true
            }
            _ => self.request_mode(ModeState::OpenLoop { signal }),
        }
    }

    /// Drive with wheel velocities.
    pub fn set_velocity(&mut self, velocity_ips: DriveSignal) -> bool {
        match &mut self.mode {
            ModeState::VelocitySetpoint { velocity_ips: v } => {
                *v = velocity_ips;
                true
            }
            _ => self.request_mode(ModeState::VelocitySetpoint { velocity_ips }),
        }
    }

    /// Start following a trajectory, replacing any active one.
    pub fn set_trajectory(&mut self, traj: Arc<Trajectory>) -> bool {
        if self.mode.mode() != DriveMode::TrajectoryFollowing
            && !self.request_mode(ModeState::TrajectoryFollowing)
        {
            return false;
        }
        self.follower.set_trajectory(traj);
        true
    }

    /// Turn on the spot to a field heading.
    pub fn set_turn_to_heading(&mut self, heading_rad: f64) -> bool {
        match &mut self.mode {
            ModeState::TurnToHeading(turn) => {
                info!("Turn retargeted to {:.3} rad", heading_rad);
                turn.retarget(heading_rad);
                true
            }
            _ => self.request_mode(ModeState::TurnToHeading(TurnState::new(heading_rad))),
        }
    }

    /// Steer towards the vision target with an operator throttle.
    pub fn set_vision_steering(&mut self, throttle: f64) -> bool {
        match &mut self.mode {
            ModeState::VisionSteering(v) => {
                v.throttle = throttle;
                true
            }
            _ => self.request_mode(ModeState::VisionSteering(VisionState::new(throttle))),
        }
    }

    /// Abandon the active trajectory and brake.
    pub fn override_trajectory(&mut self) {
        self.follower.override_trajectory();
    }

    /// Return to open loop with a neutral output.
    pub fn cancel(&mut self) {
        self.request_mode(ModeState::default());
    }

    /// Update the operator setpoint of the active mode.
    ///
    /// A demand whose control law doesn't match the mode's is rejected and a
    /// neutral command is sent on the next tick. Modes that generate their
    /// own setpoints ignore the demand.
    pub fn update_setpoint(&mut self, demand: DriveDemand) {
        let mode = self.mode.mode();
        if demand.control_law() != mode.control_law() {
            warn!(
                "Setpoint with control law {:?} given in {} (expects {:?}), sending neutral",
                demand.control_law(),
                mode,
                mode.control_law()
            );
            self.law_mismatch = true;
            return;
        }

        match (&mut self.mode, demand) {
            (ModeState::OpenLoop { signal }, DriveDemand::Voltage { left, right }) => {
                *signal = DriveSignal::new(left, right)
            }
            (
                ModeState::VelocitySetpoint { velocity_ips },
                DriveDemand::Velocity {
                    left_ips,
                    right_ips,
                    ..
                },
            ) => *velocity_ips = DriveSignal::new(left_ips, right_ips),
            // The left side carries the operator throttle
            (ModeState::VisionSteering(v), DriveDemand::Voltage { left, .. }) => v.throttle = left,
            _ => warn!("{} generates its own setpoints, ignoring {:?}", mode, demand),
        }
    }

    /// True unless a trajectory is being actively followed.
    pub fn is_done_with_trajectory(&self) -> bool {
        self.mode.mode() != DriveMode::TrajectoryFollowing
            || self.follower.is_done()
            || self.follower.is_overridden()
    }

    /// True unless a turn to heading is in progress.
    pub fn is_done_with_turn(&self) -> bool {
        match &self.mode {
            ModeState::TurnToHeading(turn) => turn.is_on_target(),
            _ => true,
        }
    }

    // ---- TRANSITIONS ----

    /// Move into a new mode if the transition table allows it.
    fn request_mode(&mut self, target: ModeState) -> bool {
        let from = self.mode.mode();
        let to = target.mode();

        if !transition_allowed(from, to, self.follower.is_done()) {
            warn!("Invalid drive mode transition {} -> {}, staying in {}", from, to, from);
            return false;
        }

        info!("Drive mode changed from {} to {}", from, to);

        self.on_mode_exit(from);
        self.mode = target;
        self.on_mode_enter(to);

        if self.changed_from.is_none() {
            self.changed_from = Some(from);
        }

        true
    }

    fn on_mode_exit(&mut self, mode: DriveMode) {
        if mode == DriveMode::TrajectoryFollowing {
            self.follower.clear();
        }
    }

    fn on_mode_enter(&mut self, mode: DriveMode) {
        // Turn and vision state is created fresh with the mode
        if mode == DriveMode::TrajectoryFollowing {
            self.follower.clear();
        }
        self.law_mismatch = false;
    }

    // ---- MODES ----

    /// Mode open loop.
    ///
    /// The operator's voltage fractions are deadbanded and limited to
    /// [-1, 1].
    fn mode_open_loop(&mut self) -> DriveCommand {
        let db = self.params.open_loop_deadband;
        let signal = match &self.mode {
            ModeState::OpenLoop { signal } => *signal,
            _ => DriveSignal::NEUTRAL,
        };

        DriveCommand::new(DriveDemand::voltage(DriveSignal::new(
            limit(deadband(signal.left, db), -1.0, 1.0),
            limit(deadband(signal.right, db), -1.0, 1.0),
        )))
    }

    /// Mode velocity setpoint.
    fn mode_velocity(&mut self) -> DriveCommand {
        let velocity_ips = match &self.mode {
            ModeState::VelocitySetpoint { velocity_ips } => *velocity_ips,
            _ => DriveSignal::NEUTRAL,
        };

        DriveCommand::new(DriveDemand::velocity(velocity_ips, DriveSignal::NEUTRAL))
    }

    /// Mode trajectory following.
    ///
    /// The follower produces the command. Once the trajectory is done the
    /// follower holds it stopped (or braked if it was overridden) until
    /// another mode is requested.
    fn mode_traj_following(&mut self, input: &DriveInputs, output: &mut OutputData) -> DriveCommand {
        let out = self
            .follower
            .update(input.timestamp_s, &Pose2d::from(input.pose));

        output.error = out.tracking_error();
        output.setpoint = out.setpoint_tm();
        self.report.traj = *self.follower.report();

        out.cmd
    }

    /// Mode turn to heading.
    ///
    /// Holds a relative wheel position demand until on target, then returns
    /// to open loop.
    fn mode_turn_to_heading(&mut self, input: &DriveInputs) -> DriveCommand {
        let heading = Rotation2d::from_radians(input.pose.heading_rad);
        let tolerance_rad = self.params.turn_tolerance_rad;
        let kinematics = self.kinematics;

        let travel = match &mut self.mode {
            ModeState::TurnToHeading(turn) => turn.update(&heading, &kinematics, tolerance_rad),
            _ => None,
        };

        match travel {
            Some(travel_in) => DriveCommand::new(DriveDemand::position(travel_in)),
            None => {
                info!("Turn to heading complete at {:.3} rad", heading.radians());
                self.report.turn_complete = true;
                self.request_mode(ModeState::default());
                DriveCommand::neutral()
            }
        }
    }

    /// Mode vision steering.
    ///
    /// Steers towards the target while it's visible, and drops back to open
    /// loop if it's lost.
    fn mode_vision_steering(&mut self, input: &DriveInputs) -> DriveCommand {
        let params = &self.params;
        let signal = match (&mut self.mode, &input.vision) {
            (ModeState::VisionSteering(v), Some(target)) => Some(v.steer(target, params)),
            _ => None,
        };

        match signal {
            Some(s) => DriveCommand::new(DriveDemand::voltage(s)),
            None => {
                warn!("Vision target lost, returning to open loop");
                self.report.vision_target_lost = true;
                self.request_mode(ModeState::default());
                DriveCommand::neutral()
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::{self, PathBuilder, Waypoint};
    use approx::assert_relative_eq;
    use drive_if::{ControlLaw, PoseEstimate, VisionTarget};
    use std::f64::consts::PI;

    fn straight(length_in: f64) -> Arc<Trajectory> {
        PathBuilder::new()
            .waypoint(Waypoint::new(0.0, 0.0, 0.0, 0.0))
            .waypoint(Waypoint::new(length_in, 0.0, 0.0, 0.0))
            .build_trajectory(&path::Params {
                max_vel_ips: 10.0,
                max_accel_ips2: 5.0,
                max_centripetal_accel_ips2: 100.0,
                max_dx_in: 2.0,
            })
            .unwrap()
    }

    fn inputs(t: f64, x_in: f64, y_in: f64, heading_rad: f64) -> DriveInputs {
        DriveInputs {
            timestamp_s: t,
            pose: PoseEstimate {
                x_in,
                y_in,
                heading_rad,
            },
            vision: None,
        }
    }

    fn tick(ctrl: &mut DriveCtrl, input: &DriveInputs) -> OutputData {
        match ctrl.proc(input) {
            Ok((out, _)) => out,
            Err(e) => match e {},
        }
    }

    #[test]
    fn test_open_loop() {
        let mut ctrl = DriveCtrl::default();
        assert_eq!(ctrl.mode(), DriveMode::OpenLoop);

        assert!(ctrl.set_open_loop(DriveSignal::new(0.03, 1.5)));
        let out = tick(&mut ctrl, &inputs(0.0, 0.0, 0.0, 0.0));

        assert_eq!(out.cmd, DriveCommand::new(DriveDemand::Voltage { left: 0.0, right: 1.0 }));
        assert_eq!(out.previous_mode, None);
    }

    #[test]
    fn test_mode_changed_consumed_once() {
        let mut ctrl = DriveCtrl::default();

        assert!(ctrl.set_velocity(DriveSignal::new(10.0, 12.0)));
        assert!(ctrl.is_mode_change_pending());

        let out = tick(&mut ctrl, &inputs(0.0, 0.0, 0.0, 0.0));
        assert_eq!(out.mode, DriveMode::VelocitySetpoint);
        assert_eq!(out.previous_mode, Some(DriveMode::OpenLoop));
        assert_eq!(out.cmd.control_law(), ControlLaw::Velocity);

        let out = tick(&mut ctrl, &inputs(0.01, 0.0, 0.0, 0.0));
        assert_eq!(out.previous_mode, None);

        // Updating the setpoint of the same mode isn't a transition
        assert!(ctrl.set_velocity(DriveSignal::new(1.0, 1.0)));
        let out = tick(&mut ctrl, &inputs(0.02, 0.0, 0.0, 0.0));
        assert_eq!(out.previous_mode, None);
        assert_eq!(
            out.cmd,
            DriveCommand::new(DriveDemand::velocity(
                DriveSignal::new(1.0, 1.0),
                DriveSignal::NEUTRAL
            ))
        );
    }

    #[test]
    fn test_invalid_transitions_keep_mode() {
        let mut ctrl = DriveCtrl::default();

        assert!(ctrl.set_turn_to_heading(1.0));
        assert!(!ctrl.set_velocity(DriveSignal::new(1.0, 1.0)));
        assert!(!ctrl.set_vision_steering(0.5));
        assert_eq!(ctrl.mode(), DriveMode::TurnToHeading);

        // Following can't be interrupted by a turn until done
        assert!(ctrl.set_trajectory(straight(100.0)));
        assert!(!ctrl.set_turn_to_heading(1.0));
        assert_eq!(ctrl.mode(), DriveMode::TrajectoryFollowing);
        assert!(!ctrl.is_done_with_trajectory());

        ctrl.override_trajectory();
        assert!(ctrl.is_done_with_trajectory());
        assert!(ctrl.set_turn_to_heading(1.0));
    }

    #[test]
    fn test_law_mismatch() {
        let mut ctrl = DriveCtrl::default();
        ctrl.set_open_loop(DriveSignal::new(0.5, 0.5));

        ctrl.update_setpoint(DriveDemand::position(DriveSignal::new(1.0, 1.0)));
        let (out, report) = ctrl.proc(&inputs(0.0, 0.0, 0.0, 0.0)).unwrap();
        assert_eq!(out.cmd, DriveCommand::neutral());
        assert!(report.law_mismatch);
        assert_eq!(ctrl.mode(), DriveMode::OpenLoop);

        // Only for that tick
        let (out, report) = ctrl.proc(&inputs(0.01, 0.0, 0.0, 0.0)).unwrap();
        assert_eq!(out.cmd, DriveCommand::new(DriveDemand::Voltage { left: 0.5, right: 0.5 }));
        assert!(!report.law_mismatch);

        ctrl.update_setpoint(DriveDemand::Voltage { left: 0.2, right: -0.2 });
        let out = tick(&mut ctrl, &inputs(0.02, 0.0, 0.0, 0.0));
        assert_eq!(out.cmd, DriveCommand::new(DriveDemand::Voltage { left: 0.2, right: -0.2 }));
    }

    #[test]
    fn test_follow_trajectory() {
        let mut ctrl = DriveCtrl::default();
        let traj = straight(100.0);
        assert!(ctrl.set_trajectory(Arc::clone(&traj)));

        let dt = 1.0 / 64.0;
        let mut k = 0;
        loop {
            let t = k as f64 * dt;
            let pose = traj.sample(t).state.pose;
            let (out, report) = ctrl
                .proc(&inputs(t, pose.translation.x(), pose.translation.y(), pose.heading()))
                .unwrap();

            assert_eq!(out.mode, DriveMode::TrajectoryFollowing);
            assert_eq!(out.cmd.control_law(), ControlLaw::Velocity);
            assert_eq!(out.previous_mode.is_some(), k == 0);
            assert!(out.setpoint.is_some());

            if report.follower == FollowerState::Done {
                break;
            }
            assert!(t < traj.end_time() + dt);
            k += 1;
        }

        assert!(ctrl.is_done_with_trajectory());
    }

    #[test]
    fn test_set_trajectory_resets_stale_error() {
        let mut ctrl = DriveCtrl::default();
        let traj = straight(100.0);

        // Follow badly for a while to build up error
        ctrl.set_trajectory(Arc::clone(&traj));
        tick(&mut ctrl, &inputs(0.0, 0.0, -5.0, 0.3));
        tick(&mut ctrl, &inputs(1.0, 0.0, -5.0, 0.3));
        assert!(ctrl.follower().last_error().is_some());
        assert!(ctrl.follower().report().max_abs_lat_error_in > 4.0);
        assert!(ctrl.follower().report().integral_abs_lat_error_in_s > 0.0);
        assert_eq!(ctrl.mode(), DriveMode::TrajectoryFollowing);
        assert_eq!(ctrl.follower().state(), FollowerState::Following);

        // Replace the trajectory without leaving the mode
        let replacement = straight(50.0);
        assert!(ctrl.set_trajectory(Arc::clone(&replacement)));
        assert_eq!(ctrl.mode(), DriveMode::TrajectoryFollowing);
        assert_eq!(ctrl.follower().state(), FollowerState::Following);
        assert!(ctrl.follower().last_error().is_none());
        assert!(ctrl.follower().last_setpoint().is_none());
        assert!(ctrl.follower().markers_passed().is_empty());
        assert_eq!(*ctrl.follower().report(), traj_ctrl::StatusReport::default());
        assert!(Arc::ptr_eq(ctrl.follower().trajectory().unwrap(), &replacement));

        let (out, report) = ctrl.proc(&inputs(10.0, 0.0, 0.0, 0.0)).unwrap();
        let error = out.error.unwrap();
        assert_relative_eq!(error.x_in, 0.0, epsilon = 1e-12);
        assert_relative_eq!(error.y_in, 0.0, epsilon = 1e-12);
        assert_relative_eq!(error.theta_rad, 0.0, epsilon = 1e-12);
        assert_relative_eq!(report.traj.integral_abs_lat_error_in_s, 0.0);
        assert_relative_eq!(report.traj.max_abs_lat_error_in, 0.0);
        assert_eq!(out.previous_mode, None);
        assert_eq!(out.setpoint.unwrap().t_s, 0.0);
    }

    #[test]
    fn test_turn_to_heading() {
        let mut ctrl = DriveCtrl::default();
        assert!(ctrl.set_turn_to_heading(PI / 2.0));
        assert!(!ctrl.is_done_with_turn());

        let out = tick(&mut ctrl, &inputs(0.0, 0.0, 0.0, 0.0));
        assert_eq!(out.cmd.control_law(), ControlLaw::Position);
        match out.cmd.demand {
            DriveDemand::Position { left_in, right_in } => {
                assert!(left_in < 0.0);
                assert_relative_eq!(left_in, -right_in);
            }
            d => panic!("Unexpected demand {:?}", d),
        }

        // On target, drops back to open loop
        let (out, report) = ctrl.proc(&inputs(1.0, 0.0, 0.0, PI / 2.0 - 0.01)).unwrap();
        assert!(report.turn_complete);
        assert_eq!(out.mode, DriveMode::OpenLoop);
        assert_eq!(out.previous_mode, Some(DriveMode::TurnToHeading));
        assert_eq!(out.cmd, DriveCommand::neutral());
        assert!(ctrl.is_done_with_turn());

        let out = tick(&mut ctrl, &inputs(1.01, 0.0, 0.0, PI / 2.0));
        assert_eq!(out.previous_mode, None);
    }

    #[test]
    fn test_vision_steering() {
        let mut ctrl = DriveCtrl::default();
        assert!(ctrl.set_vision_steering(0.0));

        let mut input = inputs(0.0, 0.0, 0.0, 0.0);
        input.vision = Some(VisionTarget {
            offset_deg: 0.0,
            width_px: 10.0,
            over_back: false,
        });
        let out = tick(&mut ctrl, &input);
        assert_eq!(out.mode, DriveMode::VisionSteering);
        assert_eq!(out.cmd.control_law(), ControlLaw::Voltage);

        // The operator throttle comes in on the left side
        ctrl.update_setpoint(DriveDemand::Voltage { left: 0.5, right: 0.0 });
        let out = tick(&mut ctrl, &input);
        assert_eq!(out.cmd, DriveCommand::new(DriveDemand::Voltage { left: 0.5, right: 0.5 }));

        // Lose the target
        input.vision = None;
        let (out, report) = ctrl.proc(&input).unwrap();
        assert!(report.vision_target_lost);
        assert_eq!(out.mode, DriveMode::OpenLoop);
        assert_eq!(out.cmd, DriveCommand::neutral());
    }

    #[test]
    fn test_init() {
        let mut ctrl = DriveCtrl::default();
        ctrl.set_velocity(DriveSignal::new(1.0, 1.0));

        let mut init = InitData::default();
        init.kinematics.track_width_in = 0.0;
        assert!(matches!(
            ctrl.init(init),
            Err(InitError::InvalidParam {
                name: "track_width_in",
                ..
            })
        ));
        assert_eq!(ctrl.mode(), DriveMode::VelocitySetpoint);

        assert!(ctrl.init(InitData::default()).is_ok());
        assert_eq!(ctrl.mode(), DriveMode::OpenLoop);
    }
}
