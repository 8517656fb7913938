//! Two pass constrained motion profile generation
//!
//! The path is treated as a one dimensional distance axis, split into
//! intervals at the supplied path states. Constraints are evaluated once per
//! interval, at the state governing the start of the interval.
//!
//! A forward pass finds the fastest velocity reachable at each interval
//! boundary from the start state, and a backward pass the fastest velocity
//! from which the goal velocity can still be reached. The boundary velocity is
//! the minimum of the two. Each interval is then filled with an exact
//! accelerate/cruise/decelerate trapezoid so that every knot of the profile is
//! a constant acceleration phase and times follow directly from `dv/a` or
//! `ds/v`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{trace, warn};
use serde::{Deserialize, Serialize};

use super::{MotionProfile, MotionState, TimingConstraint, PROFILE_EPSILON};
use crate::geom::PathState;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The position and velocity a profile must end at.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileGoal {
    pub pos: f64,
    pub end_vel: f64,
}

/// Ways in which a requested profile could not be met. Each is logged once
/// per generation.
#[derive(Debug, Default)]
struct Infeasibility {
    start_vel_clamped: Option<(f64, f64)>,
    end_vel_unreachable: Option<(f64, f64)>,
    invalid_accel_bounds: bool,
    unbounded: bool,
    stalled_at: Option<f64>,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Generate a motion profile from `start` to `goal` under the constraints.
///
/// `states` are the path states along the profile, sorted by distance. They
/// may be empty, in which case the constraints are evaluated once at the
/// identity state.
///
/// Infeasible requests never fail. The start velocity is clamped to what the
/// constraints allow, and if an interval can't be crossed at all the profile
/// stops at the start of that interval. Each clamp is logged as a warning.
pub fn generate_profile<C>(
    constraints: &C,
    goal: &ProfileGoal,
    start: &MotionState,
    states: &[PathState],
) -> MotionProfile
where
    C: TimingConstraint + ?Sized,
{
    let mut infeasible = Infeasibility::default();

    // Reversing motion is not modelled here, that's done by flipping the
    // trajectory once it's built
    let start_vel = zero_small(start.vel.max(0.0));
    let end_vel = zero_small(goal.end_vel.max(0.0));

    if goal.pos < start.pos + PROFILE_EPSILON {
        if goal.pos < start.pos - PROFILE_EPSILON {
            warn!(
                "Profile goal ({:.3}) is behind the start ({:.3}), holding position",
                goal.pos, start.pos
            );
        }
        return MotionProfile::from_knots(vec![MotionState::new(
            start.t,
            start.pos,
            start_vel.min(end_vel),
            0.0,
        )]);
    }

    // ---- GRID ----

    let mut bounds = vec![start.pos];
    for s in states {
        if s.distance > bounds[bounds.len() - 1] + PROFILE_EPSILON
            && s.distance < goal.pos - PROFILE_EPSILON
        {
            bounds.push(s.distance);
        }
    }
    bounds.push(goal.pos);

    let num_nodes = bounds.len();
    let num_intervals = num_nodes - 1;

    let interval_states: Vec<PathState> = bounds[..num_intervals]
        .iter()
        .map(|d| state_at_or_before(states, *d))
        .collect();

    let caps: Vec<f64> = interval_states
        .iter()
        .map(|s| sanitise_velocity(constraints.max_velocity(s)))
        .collect();

    // A boundary is limited by both intervals it touches
    let node_caps: Vec<f64> = (0..num_nodes)
        .map(|j| {
            let before = if j > 0 { caps[j - 1] } else { std::f64::INFINITY };
            let after = if j < num_intervals { caps[j] } else { std::f64::INFINITY };
            before.min(after)
        })
        .collect();

    // ---- FORWARD PASS ----

    let mut accels = vec![0.0; num_intervals];
    let mut v_fwd = vec![0.0; num_nodes];
    v_fwd[0] = start_vel.min(node_caps[0]);

    for j in 0..num_intervals {
        let ds = bounds[j + 1] - bounds[j];
        let b = constraints.accel_bounds(&interval_states[j], v_fwd[j]);
        if !b.is_valid() {
            infeasible.invalid_accel_bounds = true;
        }
        accels[j] = b.max.max(0.0);

        let reachable = (v_fwd[j] * v_fwd[j] + 2.0 * accels[j] * ds).sqrt();
        v_fwd[j + 1] = reachable.min(node_caps[j + 1]);
    }

    // ---- BACKWARD PASS ----

    let mut decels = vec![0.0; num_intervals];
    let mut v_bwd = vec![0.0; num_nodes];
    v_bwd[num_nodes - 1] = end_vel.min(node_caps[num_nodes - 1]);

    for j in (0..num_intervals).rev() {
        let ds = bounds[j + 1] - bounds[j];
        let b = constraints.accel_bounds(&interval_states[j], v_bwd[j + 1]);
        decels[j] = (-b.min).max(0.0);

        let reachable = (v_bwd[j + 1] * v_bwd[j + 1] + 2.0 * decels[j] * ds).sqrt();
        v_bwd[j] = reachable.min(node_caps[j]);
    }

    // ---- MERGE ----

    let vels: Vec<f64> = v_fwd
        .iter()
        .zip(v_bwd.iter())
        .map(|(f, b)| {
            let v = f.min(*b);
            if v.is_finite() {
                zero_small(v)
            } else {
                infeasible.unbounded = true;
                0.0
            }
        })
        .collect();

    if start_vel > vels[0] + PROFILE_EPSILON {
        infeasible.start_vel_clamped = Some((start_vel, vels[0]));
    }
    if end_vel > vels[num_nodes - 1] + PROFILE_EPSILON {
        infeasible.end_vel_unreachable = Some((end_vel, vels[num_nodes - 1]));
    }

    // ---- KNOTS ----

    let mut knots: Vec<MotionState> = Vec::with_capacity(num_intervals * 3 + 1);
    let mut t = start.t;

    for j in 0..num_intervals {
        let s0 = bounds[j];
        let s1 = bounds[j + 1];
        let ds = s1 - s0;
        let va = vels[j];
        let vb = vels[j + 1];
        let a = accels[j];
        let d = decels[j];

        let vp = peak_velocity(ds, va, vb, a, d, caps[j]);
        if vp < PROFILE_EPSILON {
            infeasible.stalled_at = Some(s0);
            break;
        }

        let s_acc = if vp > va + PROFILE_EPSILON && a.is_finite() {
            (vp * vp - va * va) / (2.0 * a)
        } else {
            0.0
        };
        let s_dec = if vp > vb + PROFILE_EPSILON && d.is_finite() {
            (vp * vp - vb * vb) / (2.0 * d)
        } else {
            0.0
        };
        let s_cruise = (ds - s_acc - s_dec).max(0.0);

        if s_acc > PROFILE_EPSILON {
            push_knot(&mut knots, MotionState::new(t, s0, va, a));
            t += (vp - va) / a;
        }
        if s_cruise > PROFILE_EPSILON {
            push_knot(&mut knots, MotionState::new(t, s0 + s_acc, vp, 0.0));
            t += s_cruise / vp;
        }
        if s_dec > PROFILE_EPSILON {
            push_knot(&mut knots, MotionState::new(t, s1 - s_dec, vp, -d));
            t += (vp - vb) / d;
        }
    }

    let final_knot = match infeasible.stalled_at {
        Some(pos) => MotionState::new(t, pos, 0.0, 0.0),
        None => MotionState::new(t, goal.pos, vels[num_nodes - 1], 0.0),
    };
    match knots.last_mut() {
        Some(last) if (last.pos - final_knot.pos).abs() < PROFILE_EPSILON => *last = final_knot,
        _ => knots.push(final_knot),
    }

    report(&infeasible);

    trace!(
        "Generated profile over [{:.3}, {:.3}] with {} knots lasting {:.3} s",
        start.pos,
        goal.pos,
        knots.len(),
        t - start.t
    );

    MotionProfile::from_knots(knots)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// The path state governing the interval starting at `distance`.
fn state_at_or_before(states: &[PathState], distance: f64) -> PathState {
    let idx = states.partition_point(|s| s.distance <= distance + PROFILE_EPSILON);
    if idx == 0 {
        states.first().copied().unwrap_or_default()
    } else {
        states[idx - 1]
    }
}

/// Highest velocity reachable inside an interval, given its boundary
/// velocities, acceleration limits and velocity ceiling.
fn peak_velocity(ds: f64, va: f64, vb: f64, accel: f64, decel: f64, cap: f64) -> f64 {
    let peak = if accel < PROFILE_EPSILON {
        // Can't speed up, the forward pass guarantees vb <= va
        va
    } else if decel < PROFILE_EPSILON {
        // Can't slow down, the backward pass guarantees va <= vb
        vb
    } else {
        let inv_a = 1.0 / accel;
        let inv_d = 1.0 / decel;
        let denom = inv_a + inv_d;
        if denom < PROFILE_EPSILON * PROFILE_EPSILON {
            std::f64::INFINITY
        } else {
            ((2.0 * ds + va * va * inv_a + vb * vb * inv_d) / denom).sqrt()
        }
    };

    let peak = peak.min(cap).max(va).max(vb);
    if peak.is_finite() {
        peak
    } else {
        va.max(vb)
    }
}

/// Append a knot, dropping it if it only continues the previous phase and
/// replacing the previous knot if that phase had no length.
fn push_knot(knots: &mut Vec<MotionState>, knot: MotionState) {
    if let Some(last) = knots.last_mut() {
        if (knot.pos - last.pos).abs() < PROFILE_EPSILON {
            *last = MotionState { t: last.t, ..knot };
            return;
        }
        if (knot.acc - last.acc).abs() < PROFILE_EPSILON
            && (last.extrapolate(knot.t).vel - knot.vel).abs() < PROFILE_EPSILON
        {
            return;
        }
    }
    knots.push(knot);
}

fn sanitise_velocity(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.max(0.0)
    }
}

fn zero_small(v: f64) -> f64 {
    if v.abs() < PROFILE_EPSILON {
        0.0
    } else {
        v
    }
}

fn report(infeasible: &Infeasibility) {
    if let Some((requested, allowed)) = infeasible.start_vel_clamped {
        warn!(
            "Profile start velocity {:.3} is infeasible, clamped to {:.3}",
            requested, allowed
        );
    }
    if let Some((requested, reached)) = infeasible.end_vel_unreachable {
        warn!(
            "Profile end velocity {:.3} is unreachable, ending at {:.3}",
            requested, reached
        );
    }
    if infeasible.invalid_accel_bounds {
        warn!("Profile constraints gave an empty acceleration range, using the closest bounds");
    }
    if infeasible.unbounded {
        warn!("Profile constraints don't bound velocity, affected points held at zero");
    }
    if let Some(pos) = infeasible.stalled_at {
        warn!(
            "Profile can't move past {:.3} under the constraints, truncating there",
            pos
        );
    }
}
