//! # harasim core
//!
//! Turns qualitative HARA hazard records into quantitative vehicle test
//! scenarios and expands each scenario into a matrix of test runs:
//! candidate speeds x induced faults x expected driver reactions.
//!
//! Components, leaf first:
//! - [`scenario`]: categorical-to-numeric classification of one record
//! - [`fault`]: hazard-code to fault catalog
//! - [`reaction`]: expected-reaction synthesis for a fault in context
//! - [`sweep`]: FTTI and acceptance sweeps keyed to one test run
//! - [`expand`]: the sequencer that drives the cross product into a sink

pub mod error;
pub mod expand;
pub mod fault;
pub mod hazard;
pub mod reaction;
pub mod scenario;
pub mod sweep;

pub use error::{Result, ScenarioError};
pub use expand::{ListMode, MatrixExpander, OutputRow, RowSink};
pub use fault::{BrakingFault, Fault, RideHeightFault, SteeringFault, TorqueFault};
pub use hazard::HazardRecord;
pub use reaction::{Reaction, ReactionSet};
pub use scenario::{Radius, RoadFriction, RoadRadius, Scenario};
