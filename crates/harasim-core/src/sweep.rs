//! Sweeps branching out from one previously generated test run
//!
//! The FTTI list probes fault durations; the acceptance list probes fault
//! severity. Both pin the driver reaction to a moderate braking response.

use crate::error::{Result, ScenarioError};
use crate::hazard::HazardRecord;
use crate::reaction::{Reaction, ReactionSet};

/// Severity factors applied to the fault magnitudes in the acceptance list
pub const ACCEPTANCE_LEVELS: [f64; 5] = [0.2, 0.4, 0.6, 0.8, 1.0];

/// Braking demand (%) applied in every sweep run
pub const SWEEP_BRAKING: f64 = 20.0;

const TORQUE_SLOW: [f64; 5] = [100.0, 200.0, 300.0, 400.0, 500.0];
const TORQUE_FAST: [f64; 5] = [75.0, 150.0, 225.0, 300.0, 375.0];
const STEERING_FAST: [f64; 5] = [5.0, 10.0, 15.0, 20.0, 25.0];
const STEERING_SLOW: [f64; 5] = [10.0, 20.0, 30.0, 40.0, 50.0];
const BRAKING_IMMEDIATE: [f64; 5] = [0.0, 5.0, 10.0, 15.0, 20.0];

/// Fault durations (ms) per hazard code, checked in order
const FTTI_TABLE: &[(&str, [f64; 5])] = &[
    ("[TQ1]", TORQUE_SLOW),
    ("[TQ2]", TORQUE_SLOW),
    ("[TQ3]", TORQUE_FAST),
    ("[TQ4]", TORQUE_FAST),
    ("[TQ5]", TORQUE_FAST),
    ("[TQ6]", TORQUE_FAST),
    ("[SUS1]", STEERING_FAST),
    ("[SUS2]", STEERING_SLOW),
    ("[SUS3]", STEERING_FAST),
    ("[RAS1]", STEERING_FAST),
    ("[RAS3]", STEERING_SLOW),
    ("[BS1]", TORQUE_FAST),
    ("[BS2]", BRAKING_IMMEDIATE),
];

/// Fault durations to sweep for the hazard of `record`
pub fn ftti_values(record: &HazardRecord) -> Result<&'static [f64]> {
    let tag = record.hazard_tag().unwrap_or_default();
    FTTI_TABLE
        .iter()
        .find(|(code, _)| tag.contains(code))
        .map(|(_, values)| values.as_slice())
        .ok_or_else(|| ScenarioError::UnrecognizedHazardCode {
            hazard: record.identifier.clone(),
            tag,
        })
}

/// Reaction set of one FTTI probe run
pub fn ftti_reactions(fault_tolerant_time: f64) -> ReactionSet {
    ReactionSet::new(vec![
        Reaction::VerySlowSteering(0.0),
        Reaction::SlowSteering(0.0),
        Reaction::Braking(SWEEP_BRAKING),
        Reaction::FaultTolerantTime(fault_tolerant_time),
    ])
}

/// Reaction set of one acceptance probe run
pub fn acceptance_reactions() -> ReactionSet {
    ReactionSet::braking_only(SWEEP_BRAKING)
}
