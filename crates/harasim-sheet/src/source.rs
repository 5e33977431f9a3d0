//! HARA sheet reader

use crate::csv;
use crate::error::{Result, SheetError};
use harasim_config::Config;
use harasim_core::HazardRecord;
use std::path::{Path, PathBuf};
use tracing::info;

const SECTION: &str = "Hara_Sheet";

/// 1-based column of each hazard record field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HaraColumns {
    pub id: usize,
    pub location: usize,
    pub slope: usize,
    pub route: usize,
    pub road_condition: usize,
    pub engaged_gear: usize,
    pub vehicle_speed: usize,
    pub brake_pedal: usize,
    pub maneuver: usize,
    pub hazard: usize,
    pub relevance: usize,
    pub comment: usize,
}

impl HaraColumns {
    pub fn from_config(config: &Config) -> Result<Self> {
        let idx = |key: &str| config.index(SECTION, key);
        Ok(Self {
            id: idx("idx_id")?,
            location: idx("idx_location")?,
            slope: idx("idx_slope")?,
            route: idx("idx_route")?,
            road_condition: idx("idx_road_condition")?,
            engaged_gear: idx("idx_engaged_gear")?,
            vehicle_speed: idx("idx_vehicle_speed")?,
            brake_pedal: idx("idx_brake_pedal")?,
            maneuver: idx("idx_maneuver")?,
            hazard: idx("idx_hazard")?,
            relevance: idx("idx_relevance")?,
            comment: idx("idx_comment")?,
        })
    }
}

/// Hazard records loaded from a CSV export of the HARA
#[derive(Debug, Clone)]
pub struct HaraSheet {
    path: PathBuf,
    rows: Vec<Vec<String>>,
    header_size: usize,
    columns: HaraColumns,
}

impl HaraSheet {
    /// Load the sheet named by `Hara_Sheet.path`
    pub fn open(config: &Config) -> Result<Self> {
        let path = PathBuf::from(config.entry(SECTION, "path")?);
        let text = read_sheet(&path)?;
        let sheet = Self::from_csv(&path, &text, config)?;
        info!("Loaded HARA sheet {}", path.display());
        Ok(sheet)
    }

    /// Build a sheet from CSV text; `path` is only used in messages
    pub fn from_csv(path: impl Into<PathBuf>, text: &str, config: &Config) -> Result<Self> {
        let path = path.into();
        let rows = csv::parse(text).map_err(|e| SheetError::Malformed {
            path: path.clone(),
            line: e.line,
            message: e.message,
        })?;
        Ok(Self {
            path,
            rows,
            header_size: config.count(SECTION, "header_size")?,
            columns: HaraColumns::from_config(config)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records in sheet order, up to the first row without an identifier
    ///
    /// Each call starts again from the first data row.
    pub fn records(&self) -> impl Iterator<Item = HazardRecord> + '_ {
        self.rows
            .iter()
            .skip(self.header_size)
            .map_while(move |row| self.record(row))
    }

    fn record(&self, row: &[String]) -> Option<HazardRecord> {
        let cell = |index: usize| row.get(index - 1).map(|c| c.trim()).unwrap_or("");
        let optional = |index: usize| Some(cell(index)).filter(|c| !c.is_empty()).map(str::to_string);
        let c = &self.columns;

        let identifier = cell(c.id);
        if identifier.is_empty() {
            return None;
        }

        Some(HazardRecord {
            identifier: identifier.to_string(),
            location: cell(c.location).to_string(),
            slope: cell(c.slope).to_string(),
            route: cell(c.route).to_string(),
            road_condition: cell(c.road_condition).to_string(),
            engaged_gear: cell(c.engaged_gear).to_string(),
            vehicle_speed: cell(c.vehicle_speed).to_string(),
            brake_pedal: cell(c.brake_pedal).to_string(),
            maneuver: cell(c.maneuver).to_string(),
            hazard: optional(c.hazard),
            relevant: cell(c.relevance).eq_ignore_ascii_case("x"),
            comment: optional(c.comment),
        })
    }
}

pub(crate) fn read_sheet(path: &Path) -> Result<String> {
    if !path.exists() {
        let shown = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        return Err(SheetError::NotFound(shown));
    }
    std::fs::read_to_string(path).map_err(|e| SheetError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
