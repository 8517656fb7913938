//! Drive executable entry point.
//!
//! # Architecture
//!
//! The executable drives a simulated drive base along an authored path:
//!
//!     - Load parameters and the path file
//!     - Generate the trajectory and archive it in the session
//!     - Main loop:
//!         - Drive base input acquisition
//!         - Drive control processing
//!         - Drive base output
//!         - Telemetry logging
//!
//! The path file is given as the only argument, relative to the
//! `$DRIVE_SW_ROOT/params` directory. If no argument is given the straight
//! line path is driven.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

// Internal
use drive_if::{DriveMode, DriveRequest, PathSpec};
use drive_lib::{
    drive_ctrl::{DriveCtrl, InitData},
    drivetrain::Drivetrain,
    kinematics::DriveKinematics,
    path::{self, PathBuilder},
    scheduler::Scheduler,
    sim::SimDriveBase,
};
use util::{
    host,
    logger::{logger_init, parse_level, LevelFilter},
    session::{self, Session},
    time::seconds_to_std,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.01;

/// Number of cycles between progress reports.
const REPORT_EVERY_N_CYCLES: u64 = 50;

/// Time allowed beyond the trajectory duration before it is overridden.
const TIMEOUT_MARGIN_S: f64 = 2.0;

/// Wheel speed of the simulated drive base at full voltage.
const SIM_FREE_SPEED_IPS: f64 = 150.0;

/// Environment variable used to override the log level.
const LOG_LEVEL_ENV_VAR: &str = "DRIVE_LOG_LEVEL";

/// Path driven when no path file is given.
const DEFAULT_PATH: &str = "paths/straight.toml";

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("drive_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Initialise logger, the level can be overridden from the environment
    let log_level = match env::var(LOG_LEVEL_ENV_VAR) {
        Ok(name) => parse_level(&name).wrap_err("Invalid log level")?,
        Err(_) => LevelFilter::Debug,
    };
    logger_init(log_level, &[("drive_lib::sim", LevelFilter::Info)], &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Drive Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let init_data = InitData::load().wrap_err("Could not load drive params")?;
    let path_params: path::Params =
        util::params::load("path_gen.toml").wrap_err("Could not load path generation params")?;

    info!("Exec parameters loaded");

    // ---- LOAD PATH ----

    let args: Vec<String> = env::args().collect();
    debug!("CLI arguments: {:?}", args);

    let path_file = match args.len() {
        1 => DEFAULT_PATH.to_string(),
        2 => args[1].clone(),
        n => {
            return Err(eyre!(
                "Expected either zero or one argument, found {}",
                n - 1
            ))
        }
    };

    let mut path_file_path = host::get_drive_sw_root()
        .wrap_err("The software root environment variable (DRIVE_SW_ROOT) is not set")?;
    path_file_path.push("params");
    path_file_path.push(&path_file);

    info!("Loading path from {:?}", path_file_path);

    let spec = PathSpec::load(&path_file_path).wrap_err("Failed to load the path file")?;

    // ---- GENERATE TRAJECTORY ----

    let gen_start = Instant::now();
    let traj = PathBuilder::from_spec(&spec)
        .build_trajectory(&path_params)
        .wrap_err("Failed to generate the trajectory")?;

    info!(
        "Trajectory generated in {:.3} ms: {} states, {:.2} in over {:.2} s\n",
        gen_start.elapsed().as_secs_f64() * 1000.0,
        traj.len(),
        traj.total_distance(),
        traj.duration()
    );

    session.save("trajectory.json", (*traj).clone());

    // ---- INITIALISE DRIVE ----

    info!("Initialising drive...");

    let kinematics = DriveKinematics::from_params(&init_data.kinematics);
    let ctrl = DriveCtrl::new(init_data).wrap_err("Failed to initialise DriveCtrl")?;
    let drivetrain = Arc::new(Drivetrain::new("drive", ctrl, path_params));

    let sim = SimDriveBase::new(kinematics, CYCLE_PERIOD_S, SIM_FREE_SPEED_IPS)
        .with_pose(traj.first().state.pose);

    let mut scheduler = Scheduler::new();
    scheduler.add(Box::new(sim), Arc::clone(&drivetrain));

    if !drivetrain.set_trajectory(Arc::clone(&traj)) {
        return Err(eyre!("The drivetrain refused the trajectory"));
    }

    info!("Drive initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let timeout_s = traj.duration() + TIMEOUT_MARGIN_S;
    let mut num_cycles: u64 = 0;
    let mut overridden = false;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        scheduler.tick();
        num_cycles += 1;

        let tm = drivetrain.telemetry();

        if tm.mode_changed {
            info!("Drive mode is now {}", tm.mode);
        }

        if num_cycles % REPORT_EVERY_N_CYCLES == 0 {
            match (&tm.setpoint, &tm.error) {
                (Some(sp), Some(err)) => info!(
                    "t = {:.2} s, setpoint ({:.1}, {:.1}) at {:.1} in/s, error ({:.2}, {:.2}, {:.3})",
                    tm.timestamp_s,
                    sp.x_in,
                    sp.y_in,
                    sp.velocity_ips,
                    err.x_in,
                    err.y_in,
                    err.theta_rad
                ),
                _ => info!("t = {:.2} s, {} ({:?})", tm.timestamp_s, tm.mode, tm.follower),
            }
        }

        if drivetrain.is_done_with_trajectory() {
            info!(
                "Trajectory complete at t = {:.2} s, markers passed: {:?}",
                tm.timestamp_s, tm.markers_passed
            );
            session::save_with_timestamp("final_tm.json", (*tm).clone());
            break;
        }

        if tm.timestamp_s > timeout_s && !overridden {
            warn!("Trajectory timed out after {:.2} s, overriding", tm.timestamp_s);
            drivetrain.handle_request(DriveRequest::OverrideTrajectory)?;
            overridden = true;
        }

        // ---- CYCLE MANAGEMENT ----

        // Get the elapsed time
        let cycle_dur = Instant::now() - cycle_start_instant;

        // Sleep for the rest of the cycle
        match seconds_to_std(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
            ),
        }
    }

    drivetrain.stop();
    scheduler.tick();

    if drivetrain.mode() != DriveMode::OpenLoop {
        warn!("Drive did not return to open loop");
    }

    info!("End of execution");

    session.exit();

    Ok(())
}
