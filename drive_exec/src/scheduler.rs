//! # Scheduler
//!
//! Ticks every registered drive unit in order: read the drive base inputs,
//! run the drivetrain, notify the drive base of mode changes and write the
//! command out. Drive base I/O errors never stop the loop.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::Arc;

use log::{error, warn};

use crate::drive_base::DriveBase;
use crate::drivetrain::Drivetrain;
use drive_if::DriveCommand;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of consecutive I/O errors from a drive base after which they are
/// logged as errors rather than warnings.
const MAX_CONSEC_IO_ERRORS: u64 = 5;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct Scheduler {
    units: Vec<Unit>,
}

struct Unit {
    base: Box<dyn DriveBase>,
    drivetrain: Arc<Drivetrain>,
    num_consec_errors: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a drive base with the drivetrain that controls it.
    pub fn add(&mut self, base: Box<dyn DriveBase>, drivetrain: Arc<Drivetrain>) {
        self.units.push(Unit {
            base,
            drivetrain,
            num_consec_errors: 0,
        });
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Tick every unit once.
    pub fn tick(&mut self) {
        for unit in self.units.iter_mut() {
            unit.tick();
        }
    }
}

impl Unit {
    fn tick(&mut self) {
        let inputs = match self.base.read_inputs() {
            Ok(i) => i,
            Err(e) => {
                self.io_error("reading inputs", &e);
                if let Err(e) = self.base.write_outputs(&DriveCommand::neutral()) {
                    self.io_error("writing neutral command", &e);
                }
                return;
            }
        };

        let (output, _) = self.drivetrain.tick(&inputs);

        if let Some(previous) = output.previous_mode {
            self.base.on_mode_exit(previous);
            self.base.on_mode_enter(output.mode);
        }

        match self.base.write_outputs(&output.cmd) {
            Ok(()) => self.num_consec_errors = 0,
            Err(e) => self.io_error("writing command", &e),
        }
    }

    fn io_error(&mut self, action: &str, e: &dyn std::error::Error) {
        self.num_consec_errors += 1;
        if self.num_consec_errors >= MAX_CONSEC_IO_ERRORS {
            error!(
                "{}: error {} ({} in a row): {}",
                self.base.name(),
                action,
                self.num_consec_errors,
                e
            );
        } else {
            warn!("{}: error {}: {}", self.base.name(), action, e);
        }
    }
}
