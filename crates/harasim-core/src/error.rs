//! Errors raised while deriving and expanding scenarios
//!
//! Every variant is fatal for the run in progress: the first bad record
//! aborts the whole expansion.

use harasim_config::ConfigError;
use thiserror::Error;

/// Result type for scenario operations
pub type Result<T> = std::result::Result<T, ScenarioError>;

#[derive(Error, Debug)]
pub enum ScenarioError {
    /// Missing or mistyped configuration entry
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A categorical field matched none of its keyword patterns
    #[error(
        "{field} '{value}' not recognized in hazardous event {hazard} (expected one of: {expected})"
    )]
    Unrecognized {
        hazard: String,
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    /// A curve radius list does not line up with the speed list
    #[error(
        "Invalid curve radius specification for hazardous event {hazard}: \
         {radii} radius values configured for {speeds} speeds"
    )]
    RadiusCountMismatch {
        hazard: String,
        radii: usize,
        speeds: usize,
    },

    /// Road radius cannot be turned into a wheel angle
    #[error("Road radius {radius} m is not valid for a {wheelbase} m wheelbase in hazardous event {hazard}")]
    InvalidRadius {
        hazard: String,
        radius: f64,
        wheelbase: f64,
    },

    /// Hazard tag carries no code the fault catalog or the FTTI table knows
    #[error("Hazard could not be recognized in hazardous event {hazard}: {tag}")]
    UnrecognizedHazardCode { hazard: String, tag: String },

    /// Hazard code is recognized but has no fault model
    #[error("Hazard code {code} in hazardous event {hazard} has no fault model (park brake faults are not supported)")]
    UnsupportedFault { hazard: String, code: String },

    /// Sweep mode needs a target test run in the comment field
    #[error("Hazardous event {hazard} has no comment; a target test run id is required in this mode")]
    MissingCrossReference { hazard: String },

    /// Comment field is not a test run id
    #[error("Comment '{comment}' of hazardous event {hazard} is not a test run id")]
    InvalidCrossReference { hazard: String, comment: String },

    /// Output mode selector is not one of the three list modes
    #[error("Mode '{0}' is not valid. Either use mode 'Scenario_List', 'FTTI_List' or 'Acceptance_List'")]
    InvalidMode(String),
}
