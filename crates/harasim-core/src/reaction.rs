//! Expected driver reactions
//!
//! For every (speed, fault) pair the synthesizer decides which reaction
//! combinations are plausible. Each combination becomes its own test run.

use crate::error::Result;
use crate::fault::Fault;
use crate::hazard::HazardRecord;
use crate::scenario::Scenario;
use harasim_config::Config;
use serde::{Deserialize, Serialize};

/// Braking demand (%) when a torque fault already decelerates the vehicle
pub const NEGATIVE_TORQUE_BRAKING: f64 = 5.0;

/// Overall torque error (Nm) above which the strong braking reaction applies
pub const HIGH_TORQUE_THRESHOLD: f64 = 100.0;

/// One driver reaction or probe parameter of a test run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Reaction {
    /// Steering rate limit (deg/s) of a very slow correction
    VerySlowSteering(f64),
    /// Steering rate limit (deg/s) of a slow correction
    SlowSteering(f64),
    /// Braking demand (%)
    Braking(f64),
    /// Fault duration (ms) for the FTTI sweep
    FaultTolerantTime(f64),
}

/// Reactions applied together in one test run, in write order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactionSet(pub Vec<Reaction>);

impl ReactionSet {
    pub fn new(reactions: Vec<Reaction>) -> Self {
        Self(reactions)
    }

    /// Baseline run without any driver reaction, used for severity rating
    pub fn no_reaction() -> Self {
        Self::braking_only(0.0)
    }

    pub fn braking_only(braking: f64) -> Self {
        Self(vec![
            Reaction::VerySlowSteering(0.0),
            Reaction::SlowSteering(0.0),
            Reaction::Braking(braking),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reaction> {
        self.0.iter()
    }

    pub fn braking(&self) -> Option<f64> {
        self.iter().find_map(|r| match r {
            Reaction::Braking(v) => Some(*v),
            _ => None,
        })
    }

    pub fn very_slow_steering(&self) -> Option<f64> {
        self.iter().find_map(|r| match r {
            Reaction::VerySlowSteering(v) => Some(*v),
            _ => None,
        })
    }

    pub fn slow_steering(&self) -> Option<f64> {
        self.iter().find_map(|r| match r {
            Reaction::SlowSteering(v) => Some(*v),
            _ => None,
        })
    }

    pub fn fault_tolerant_time(&self) -> Option<f64> {
        self.iter().find_map(|r| match r {
            Reaction::FaultTolerantTime(v) => Some(*v),
            _ => None,
        })
    }
}

/// Braking demand the driver is expected to apply against `fault`
///
/// Stronger unintended acceleration calls for stronger braking. On low
/// friction surfaces braking is capped; mu-split friction is not compared.
pub fn braking_magnitude(
    fault: &Fault,
    scenario: &Scenario,
    record: &HazardRecord,
    config: &Config,
) -> Result<f64> {
    let mut braking = match fault {
        Fault::Torque(torque) => {
            let overall = torque.overall_torque();
            if overall > HIGH_TORQUE_THRESHOLD || record.has_code("TQ4") {
                config.float("Reaction", "braking_torque_fault_high")?
            } else if overall < 0.0 {
                NEGATIVE_TORQUE_BRAKING
            } else {
                config.float("Reaction", "braking_torque_fault_low")?
            }
        }
        _ => config.float("Reaction", "braking_normal")?,
    };

    if let Some(mu) = scenario.road_friction.coefficient() {
        if mu <= config.float("Road_friction", "icy")? {
            braking = braking.min(config.float("Reaction", "braking_low_friction")?);
        }
    }

    Ok(braking)
}

/// Reaction sets for one fault in its scenario, in test-run order
///
/// 1. no reaction
/// 2. braking only
/// 3. braking with very slow steering, then braking with slow steering,
///    unless the road is straight with high friction and the fault keeps
///    the vehicle stable
pub fn reactions_for(
    fault: &Fault,
    scenario: &Scenario,
    record: &HazardRecord,
    config: &Config,
) -> Result<Vec<ReactionSet>> {
    let mut sets = vec![ReactionSet::no_reaction()];

    let braking = braking_magnitude(fault, scenario, record, config)?;
    sets.push(ReactionSet::braking_only(braking));

    let friction_limit = config.float("Road_friction", "gravel")?;
    let low_friction = scenario
        .road_friction
        .coefficient()
        .is_some_and(|mu| mu < friction_limit);

    if scenario.road_radius.is_curve() || low_friction || fault.loses_stability() {
        sets.push(ReactionSet::new(vec![
            Reaction::Braking(braking),
            Reaction::VerySlowSteering(config.float("Reaction", "very_slow_steering")?),
        ]));
        sets.push(ReactionSet::new(vec![
            Reaction::Braking(braking),
            Reaction::SlowSteering(config.float("Reaction", "slow_steering")?),
        ]));
    }

    Ok(sets)
}
