//! # Simulated drive base
//!
//! An ideal differential drive used by the executable and the closed loop
//! tests. Wheels reach their demanded velocity instantly, voltage demands
//! scale the free speed and position demands are driven at free speed. The
//! pose is integrated along constant curvature arcs so the only tracking
//! error seen by the controllers comes from the starting pose.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;

use crate::drive_base::{DriveBase, DriveBaseError};
use crate::geom::Pose2d;
use crate::kinematics::DriveKinematics;
use drive_if::{
    DriveCommand, DriveDemand, DriveInputs, DriveMode, DriveSignal, PoseEstimate, VisionTarget,
};
use util::maths::limit;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SimDriveBase {
    kinematics: DriveKinematics,

    pose: Pose2d,
    time_s: f64,
    period_s: f64,

    /// Wheel speed at a voltage fraction of 1.0
    free_speed_ips: f64,

    /// Total distance travelled by each wheel
    wheel_pos_in: DriveSignal,

    /// Wheel positions when the current position demand was first issued
    position_origin_in: Option<(DriveSignal, DriveSignal)>,

    vision: Option<VisionTarget>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimDriveBase {
    pub fn new(kinematics: DriveKinematics, period_s: f64, free_speed_ips: f64) -> Self {
        Self {
            kinematics,
            pose: Pose2d::identity(),
            time_s: 0.0,
            period_s,
            free_speed_ips,
            wheel_pos_in: DriveSignal::NEUTRAL,
            position_origin_in: None,
            vision: None,
        }
    }

    /// Start the simulation from the given pose.
    pub fn with_pose(mut self, pose: Pose2d) -> Self {
        self.pose = pose;
        self
    }

    pub fn pose(&self) -> &Pose2d {
        &self.pose
    }

    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    pub fn wheel_positions(&self) -> DriveSignal {
        self.wheel_pos_in
    }

    /// Set the target reported by the simulated camera.
    pub fn set_vision(&mut self, target: Option<VisionTarget>) {
        self.vision = target;
    }

    /// Wheel velocities for this period.
    fn wheel_velocities(&mut self, cmd: &DriveCommand) -> DriveSignal {
        if cmd.brake {
            self.position_origin_in = None;
            return DriveSignal::NEUTRAL;
        }

        match cmd.demand {
            DriveDemand::Voltage { left, right } => {
                self.position_origin_in = None;
                DriveSignal::new(left * self.free_speed_ips, right * self.free_speed_ips)
            }
            DriveDemand::Velocity {
                left_ips,
                right_ips,
                ..
            } => {
                self.position_origin_in = None;
                DriveSignal::new(
                    limit(left_ips, -self.free_speed_ips, self.free_speed_ips),
                    limit(right_ips, -self.free_speed_ips, self.free_speed_ips),
                )
            }
            DriveDemand::Position { left_in, right_in } => {
                let travel = DriveSignal::new(left_in, right_in);
                let origin = match self.position_origin_in {
                    Some((origin, t)) if t == travel => origin,
                    _ => {
                        debug!("New position demand {:?} from {:?}", travel, self.wheel_pos_in);
                        self.position_origin_in = Some((self.wheel_pos_in, travel));
                        self.wheel_pos_in
                    }
                };

                let max_step = self.free_speed_ips * self.period_s;
                let step = |origin: f64, travel: f64, pos: f64| {
                    limit(origin + travel - pos, -max_step, max_step) / self.period_s
                };

                DriveSignal::new(
                    step(origin.left, travel.left, self.wheel_pos_in.left),
                    step(origin.right, travel.right, self.wheel_pos_in.right),
                )
            }
        }
    }
}

impl DriveBase for SimDriveBase {
    fn name(&self) -> &str {
        "sim"
    }

    fn read_inputs(&mut self) -> Result<DriveInputs, DriveBaseError> {
        Ok(DriveInputs {
            timestamp_s: self.time_s,
            pose: PoseEstimate {
                x_in: self.pose.translation.x(),
                y_in: self.pose.translation.y(),
                heading_rad: self.pose.heading(),
            },
            vision: self.vision,
        })
    }

    fn write_outputs(&mut self, cmd: &DriveCommand) -> Result<(), DriveBaseError> {
        if !self.period_s.is_finite() || self.period_s <= 0.0 {
            return Err(DriveBaseError::CommandRejected(format!(
                "invalid simulation period {} s",
                self.period_s
            )));
        }

        let vel = self.wheel_velocities(cmd);
        let delta = DriveSignal::new(vel.left * self.period_s, vel.right * self.period_s);

        self.wheel_pos_in = DriveSignal::new(
            self.wheel_pos_in.left + delta.left,
            self.wheel_pos_in.right + delta.right,
        );

        let twist = self.kinematics.forward(&delta);
        self.pose = self.pose.transform_by(&Pose2d::exp(&twist));
        self.time_s += self.period_s;

        Ok(())
    }

    fn on_mode_enter(&mut self, mode: DriveMode) {
        debug!("Sim entering {}", mode);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn sim() -> SimDriveBase {
        SimDriveBase::new(DriveKinematics::new(20.0, 1.0), 0.01, 100.0)
    }

    #[test]
    fn test_straight_and_spin() {
        let mut s = sim();

        for _ in 0..100 {
            s.write_outputs(&DriveCommand::new(DriveDemand::velocity(
                DriveSignal::new(10.0, 10.0),
                DriveSignal::NEUTRAL,
            )))
            .unwrap();
        }
        assert_relative_eq!(s.time_s(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(s.pose().translation.x(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(s.pose().translation.y(), 0.0, epsilon = 1e-9);

        // Half a turn on the spot, counter-clockwise
        let arc = PI * 10.0;
        for _ in 0..100 {
            s.write_outputs(&DriveCommand::new(DriveDemand::velocity(
                DriveSignal::new(-arc, arc),
                DriveSignal::NEUTRAL,
            )))
            .unwrap();
        }
        assert_relative_eq!(s.pose().rotation.radians().abs(), PI, epsilon = 1e-6);
        assert_relative_eq!(s.pose().translation.x(), 10.0, epsilon = 1e-6);

        let inputs = s.read_inputs().unwrap();
        assert_relative_eq!(inputs.timestamp_s, 2.0, epsilon = 1e-9);
        assert_relative_eq!(inputs.pose.x_in, 10.0, epsilon = 1e-6);
    }

    #[test]
    fn test_voltage_and_brake() {
        let mut s = sim();

        s.write_outputs(&DriveCommand::new(DriveDemand::voltage(DriveSignal::new(0.5, 0.5))))
            .unwrap();
        assert_relative_eq!(s.pose().translation.x(), 0.5, epsilon = 1e-9);

        s.write_outputs(&DriveCommand::brake()).unwrap();
        assert_relative_eq!(s.pose().translation.x(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_position_demand() {
        let mut s = sim();
        s.write_outputs(&DriveCommand::new(DriveDemand::voltage(DriveSignal::new(1.0, 1.0))))
            .unwrap();

        // Travel is relative to where the wheels were when the demand started
        let cmd = DriveCommand::new(DriveDemand::position(DriveSignal::new(5.0, -5.0)));
        for _ in 0..20 {
            s.write_outputs(&cmd).unwrap();
        }
        let wheels = s.wheel_positions();
        assert_relative_eq!(wheels.left, 6.0, epsilon = 1e-9);
        assert_relative_eq!(wheels.right, -4.0, epsilon = 1e-9);

        // Holding the same demand doesn't move the wheels further
        s.write_outputs(&cmd).unwrap();
        assert_relative_eq!(s.wheel_positions().left, 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_closed_loop_follow() {
        use crate::drive_ctrl::DriveCtrl;
        use crate::drivetrain::Drivetrain;
        use crate::path::{Params, PathBuilder, Waypoint};
        use crate::scheduler::Scheduler;
        use std::sync::Arc;

        let traj = PathBuilder::new()
            .waypoint(Waypoint::new(0.0, 0.0, 0.0, 0.0))
            .waypoint(Waypoint::new(48.0, 0.0, 60.0, 0.0).with_marker("end"))
            .build_trajectory(&Params::default())
            .unwrap();

        let ctrl = DriveCtrl::default();
        let kinematics = *ctrl.kinematics();
        let dt = Arc::new(Drivetrain::new("test", ctrl, Params::default()));
        assert!(dt.set_trajectory(Arc::clone(&traj)));

        // Start an inch to the left of the path
        let sim = SimDriveBase::new(kinematics, 0.01, 150.0)
            .with_pose(Pose2d::from_xy_heading(0.0, 1.0, 0.0));
        let mut s = Scheduler::new();
        s.add(Box::new(sim), Arc::clone(&dt));

        let max_ticks = ((traj.duration() + 1.0) / 0.01) as usize;
        let mut ticks = 0;
        while !dt.is_done_with_trajectory() && ticks < max_ticks {
            s.tick();
            ticks += 1;
        }

        let tm = dt.telemetry();
        assert!(dt.is_done_with_trajectory());
        assert_eq!(tm.follower, drive_if::FollowerState::Done);
        assert_eq!(tm.markers_passed, vec!["end".to_string()]);
        assert!(tm.timestamp_s >= traj.duration() - 0.01);

        let err = tm.error.unwrap();
        assert!(err.x_in.hypot(err.y_in) < 2.0);
    }

    #[test]
    fn test_closed_loop_corner() {
        use crate::drive_ctrl::DriveCtrl;
        use crate::drivetrain::Drivetrain;
        use crate::path::{Params, PathBuilder, Waypoint};
        use std::sync::Arc;

        let traj = PathBuilder::new()
            .waypoint(Waypoint::new(0.0, 0.0, 0.0, 0.0))
            .waypoint(Waypoint::new(100.0, 0.0, 60.0, 30.0).with_marker("corner"))
            .waypoint(Waypoint::new(100.0, 100.0, 60.0, 0.0).with_marker("end"))
            .build_trajectory(&Params::default())
            .unwrap();

        let ctrl = DriveCtrl::default();
        let kinematics = *ctrl.kinematics();
        let dt = Drivetrain::new("test", ctrl, Params::default());
        assert!(dt.set_trajectory(Arc::clone(&traj)));

        let mut s = SimDriveBase::new(kinematics, 0.01, 150.0);

        let max_ticks = ((traj.duration() + 1.0) / 0.01) as usize;
        let mut ticks = 0;
        while !dt.is_done_with_trajectory() && ticks < max_ticks {
            let inputs = s.read_inputs().unwrap();
            let (output, report) = dt.tick(&inputs);

            assert!(!report.traj.lat_error_limit_exceeded);
            assert!(!report.traj.head_error_limit_exceeded);
            assert!(!output.cmd.brake);

            s.write_outputs(&output.cmd).unwrap();
            ticks += 1;
        }

        let tm = dt.telemetry();
        assert!(dt.is_done_with_trajectory());
        assert_eq!(tm.follower, drive_if::FollowerState::Done);
        assert!(!tm.cmd.brake);
        assert_eq!(
            tm.markers_passed,
            vec!["corner".to_string(), "end".to_string()]
        );

        assert_relative_eq!(s.pose().translation.x(), 100.0, epsilon = 1.0);
        assert_relative_eq!(s.pose().translation.y(), 100.0, epsilon = 1.0);
        assert_relative_eq!(s.pose().heading(), PI / 2.0, epsilon = 0.05);
    }

    #[test]
    fn test_bad_period() {
        let mut s = SimDriveBase::new(DriveKinematics::new(20.0, 1.0), 0.0, 100.0);
        assert!(s.write_outputs(&DriveCommand::neutral()).is_err());
    }
}
