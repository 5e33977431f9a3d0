//! Hazardous events as read from the HARA sheet

use crate::error::{Result, ScenarioError};
use serde::{Deserialize, Serialize};

/// One line of the HARA
///
/// Categorical fields are free text ("uphill", "medium", "icy road", ...);
/// absent cells are empty strings. Only `hazard` and `comment` are
/// meaningfully optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardRecord {
    pub identifier: String,
    pub location: String,
    pub slope: String,
    pub route: String,
    pub road_condition: String,
    pub engaged_gear: String,
    pub vehicle_speed: String,
    pub brake_pedal: String,
    pub maneuver: String,
    /// Free text carrying bracketed codes such as `[TQ3]`
    pub hazard: Option<String>,
    pub relevant: bool,
    /// Target test run ordinal in the FTTI and acceptance modes
    pub comment: Option<String>,
}

impl HazardRecord {
    /// Upper-cased hazard tag, if any
    pub fn hazard_tag(&self) -> Option<String> {
        self.hazard.as_deref().map(str::to_uppercase)
    }

    /// Whether the hazard tag carries `[code]`
    pub fn has_code(&self, code: &str) -> bool {
        self.hazard_tag()
            .is_some_and(|tag| tag.contains(&format!("[{}]", code.to_uppercase())))
    }

    /// Test run ordinal referenced by the comment field
    ///
    /// Spreadsheet exports may render integers as `7.0`; whole floats are
    /// accepted.
    pub fn target_test_run(&self) -> Result<u64> {
        let comment = self
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ScenarioError::MissingCrossReference {
                hazard: self.identifier.clone(),
            })?;

        if let Ok(id) = comment.parse::<u64>() {
            return Ok(id);
        }
        match comment.parse::<f64>() {
            Ok(v) if v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => Ok(v as u64),
            _ => Err(ScenarioError::InvalidCrossReference {
                hazard: self.identifier.clone(),
                comment: comment.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hazard: Option<&str>, comment: Option<&str>) -> HazardRecord {
        HazardRecord {
            identifier: "HE-01".to_string(),
            hazard: hazard.map(str::to_string),
            comment: comment.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_has_code_is_case_insensitive() {
        let r = record(Some("Unintended acceleration [tq1]"), None);
        assert!(r.has_code("TQ1"));
        assert!(!r.has_code("TQ2"));
        assert!(!record(None, None).has_code("TQ1"));
    }

    #[test]
    fn test_target_test_run() {
        assert_eq!(record(None, Some(" 7 ")).target_test_run().unwrap(), 7);
        assert_eq!(record(None, Some("12.0")).target_test_run().unwrap(), 12);
        assert!(matches!(
            record(None, None).target_test_run(),
            Err(ScenarioError::MissingCrossReference { .. })
        ));
        assert!(matches!(
            record(None, Some("see row 7")).target_test_run(),
            Err(ScenarioError::InvalidCrossReference { .. })
        ));
        assert!(matches!(
            record(None, Some("7.5")).target_test_run(),
            Err(ScenarioError::InvalidCrossReference { .. })
        ));
    }
}
