//! Tabular input and output for harasim
//!
//! The HARA and the scenario list are exchanged as CSV exports of their
//! spreadsheets. [`HaraSheet`] yields hazard records; [`ScenarioSheet`] is
//! the [`harasim_core::RowSink`] that lays test runs out on the scenario
//! template.

pub mod csv;
pub mod error;
pub mod sink;
pub mod source;

pub use error::{Result, SheetError};
pub use sink::{output_path, ScenarioSheet, TemplateColumns, SWEEP_HIDDEN_COLUMNS};
pub use source::{HaraColumns, HaraSheet};
