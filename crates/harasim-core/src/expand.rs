//! Test matrix expansion
//!
//! Drives speeds x faults x reaction sets for every relevant hazardous
//! event and hands the resulting rows to a [`RowSink`]. Every expansion
//! step advances the test-run counter, whether or not a row is written, so
//! the FTTI and acceptance lists can find a test run of the scenario list
//! by its ordinal and branch out from it.

use crate::error::{Result, ScenarioError};
use crate::fault::Fault;
use crate::hazard::HazardRecord;
use crate::reaction::{reactions_for, ReactionSet};
use crate::scenario::{Radius, RoadFriction, Scenario};
use crate::sweep;
use harasim_config::Config;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Output list generated by a run, fixed for the whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListMode {
    /// Every test run of the matrix
    Scenario,
    /// Fault-tolerant-time sweep around one referenced test run
    Ftti,
    /// Fault severity sweep around one referenced test run
    Acceptance,
}

impl ListMode {
    /// Key of the output path in the `Scenario_List` section
    pub fn output_key(&self) -> &'static str {
        match self {
            ListMode::Scenario => "path",
            ListMode::Ftti => "ftti_path",
            ListMode::Acceptance => "acceptance_path",
        }
    }

    /// Whether rows are only written for the referenced test run
    pub fn is_sweep(&self) -> bool {
        !matches!(self, ListMode::Scenario)
    }
}

impl FromStr for ListMode {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "scenario_list" => Ok(ListMode::Scenario),
            "ftti_list" => Ok(ListMode::Ftti),
            "acceptance_list" => Ok(ListMode::Acceptance),
            _ => Err(ScenarioError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for ListMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListMode::Scenario => write!(f, "Scenario_List"),
            ListMode::Ftti => write!(f, "FTTI_List"),
            ListMode::Acceptance => write!(f, "Acceptance_List"),
        }
    }
}

/// One test run as handed to the sink
///
/// The lateral acceleration and friction exploitation cells are derived by
/// the sink from this row's own cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    pub hazard_id: String,
    /// 1-based position of the row in the written list
    pub test_run_id: u64,
    pub road_radius: Radius,
    pub road_friction: RoadFriction,
    pub road_gradient: f64,
    pub vehicle_speed: f64,
    pub acceleration: Option<f64>,
    pub fault: Fault,
    pub reactions: ReactionSet,
}

impl OutputRow {
    /// Zero-padded test run id as written to the list
    pub fn test_run_label(&self) -> String {
        format!("{:05}", self.test_run_id)
    }
}

/// Append-only destination for expanded rows
pub trait RowSink {
    fn append(&mut self, row: OutputRow);
}

impl RowSink for Vec<OutputRow> {
    fn append(&mut self, row: OutputRow) {
        self.push(row);
    }
}

/// Sequencer owning the test-run counter and the output sink
pub struct MatrixExpander<'a, S: RowSink> {
    config: &'a Config,
    mode: ListMode,
    sink: S,
    test_runs: u64,
    rows_written: u64,
}

/// Per-step context shared by every row of one (speed, fault) pair
struct Step<'r> {
    record: &'r HazardRecord,
    scenario: &'r Scenario,
    vehicle_speed: f64,
    road_radius: Radius,
}

impl<'a, S: RowSink> MatrixExpander<'a, S> {
    pub fn new(config: &'a Config, mode: ListMode, sink: S) -> Self {
        Self {
            config,
            mode,
            sink,
            test_runs: 0,
            rows_written: 0,
        }
    }

    pub fn mode(&self) -> ListMode {
        self.mode
    }

    /// Test runs enumerated so far, written or not
    pub fn test_runs(&self) -> u64 {
        self.test_runs
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Expand every record in source order; stops at the first error
    pub fn run<'r>(&mut self, records: impl IntoIterator<Item = &'r HazardRecord>) -> Result<u64> {
        let mut written = 0;
        for record in records {
            written += self.process(record)?;
        }
        info!(
            "{}: {} test run(s) enumerated, {} row(s) written",
            self.mode, self.test_runs, self.rows_written
        );
        Ok(written)
    }

    /// Expand one hazardous event, returning the number of rows written
    ///
    /// Records not marked relevant produce nothing and do not advance the
    /// test-run counter.
    pub fn process(&mut self, record: &HazardRecord) -> Result<u64> {
        if !record.relevant {
            return Ok(0);
        }

        let scenario = Scenario::classify(record, self.config)?;
        info!(
            "Hazardous event {}: {} speed(s) x {} fault(s)",
            record.identifier,
            scenario.vehicle_speeds.len(),
            scenario.faults.len()
        );

        let before = self.rows_written;
        for (i, &vehicle_speed) in scenario.vehicle_speeds.iter().enumerate() {
            let road_radius = scenario.road_radius.at(i).ok_or_else(|| {
                ScenarioError::RadiusCountMismatch {
                    hazard: record.identifier.clone(),
                    radii: scenario.road_radius.radii().len(),
                    speeds: scenario.vehicle_speeds.len(),
                }
            })?;
            let step = Step {
                record,
                scenario: &scenario,
                vehicle_speed,
                road_radius,
            };
            for fault in &scenario.faults {
                for reactions in reactions_for(fault, &scenario, record, self.config)? {
                    self.emit(&step, fault, reactions)?;
                }
            }
        }
        Ok(self.rows_written - before)
    }

    fn emit(&mut self, step: &Step<'_>, fault: &Fault, reactions: ReactionSet) -> Result<()> {
        self.test_runs += 1;

        match self.mode {
            ListMode::Scenario => self.write_row(step, fault.clone(), reactions),
            ListMode::Ftti => {
                if step.record.target_test_run()? != self.test_runs {
                    return Ok(());
                }
                for &ftti in sweep::ftti_values(step.record)? {
                    self.write_row(step, fault.clone(), sweep::ftti_reactions(ftti));
                }
            }
            ListMode::Acceptance => {
                if step.record.target_test_run()? != self.test_runs {
                    return Ok(());
                }
                for level in sweep::ACCEPTANCE_LEVELS {
                    self.write_row(step, fault.scaled(level), sweep::acceptance_reactions());
                }
            }
        }
        Ok(())
    }

    fn write_row(&mut self, step: &Step<'_>, fault: Fault, reactions: ReactionSet) {
        self.rows_written += 1;
        debug!("Writing test run #{:05}", self.rows_written);

        self.sink.append(OutputRow {
            hazard_id: step.record.identifier.clone(),
            test_run_id: self.rows_written,
            road_radius: step.road_radius,
            road_friction: step.scenario.road_friction.clone(),
            road_gradient: step.scenario.road_gradient,
            vehicle_speed: step.vehicle_speed,
            acceleration: step.scenario.acceleration,
            fault,
            reactions,
        });
    }
}
