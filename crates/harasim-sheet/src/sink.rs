//! Scenario list writer
//!
//! Rows are placed into the columns of a scenario template: the template's
//! header rows are copied verbatim and every test run becomes one row
//! below them. The list is kept in memory until [`ScenarioSheet::save`].

use crate::csv::{self, column_index, column_letters};
use crate::error::{Result, SheetError};
use crate::source::read_sheet;
use harasim_config::Config;
use harasim_core::{Fault, ListMode, OutputRow, Reaction, RowSink};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SECTION: &str = "Scenario_Template";

/// Auxiliary columns hidden in the FTTI and acceptance lists
///
/// Columns AA, AB and AI stay visible in every mode.
pub const SWEEP_HIDDEN_COLUMNS: &[&str] = &["Z", "AC", "AD", "AE", "AF", "AG", "AH"];

/// 1-based column of every value written per test run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateColumns {
    pub hara_id: usize,
    pub test_run_id: usize,
    pub constant_road_radius: usize,
    pub road_friction_coefficient: usize,
    pub road_gradient: usize,
    pub lateral_acceleration: usize,
    pub friction_coefficient_exploitation: usize,
    pub desired_vehicle_speed: usize,
    pub acceleration: usize,
    pub steering_front_angle: usize,
    pub steering_front_slew_rate: usize,
    pub steering_rear_angle: usize,
    pub steering_rear_slew_rate: usize,
    pub torque_front_axle: usize,
    pub torque_rear_axle: usize,
    pub torque_slew_rate: usize,
    pub ride_height_front_left: usize,
    pub ride_height_front_right: usize,
    pub ride_height_rear_left: usize,
    pub ride_height_rear_right: usize,
    pub ride_height_slew_rate: usize,
    pub unintended_braking_torque: usize,
    pub very_slow_steering: usize,
    pub slow_steering: usize,
    pub braking: usize,
    pub ftti: usize,
}

impl TemplateColumns {
    pub fn from_config(config: &Config) -> Result<Self> {
        let idx = |key: &str| config.index(SECTION, key);
        Ok(Self {
            hara_id: idx("idx_hara_id")?,
            test_run_id: idx("idx_test_run_id")?,
            constant_road_radius: idx("idx_constant_road_radius")?,
            road_friction_coefficient: idx("idx_road_friction_coefficient")?,
            road_gradient: idx("idx_road_gradient")?,
            lateral_acceleration: idx("idx_lateral_acceleration")?,
            friction_coefficient_exploitation: idx("idx_friction_coefficient_exploitation")?,
            desired_vehicle_speed: idx("idx_desired_vehicle_speed")?,
            acceleration: idx("idx_acceleration")?,
            steering_front_angle: idx("idx_steering_front_angle")?,
            steering_front_slew_rate: idx("idx_steering_front_slew_rate")?,
            steering_rear_angle: idx("idx_steering_rear_angle")?,
            steering_rear_slew_rate: idx("idx_steering_rear_slew_rate")?,
            torque_front_axle: idx("idx_torque_front_axle")?,
            torque_rear_axle: idx("idx_torque_rear_axle")?,
            torque_slew_rate: idx("idx_torque_slew_rate")?,
            ride_height_front_left: idx("idx_ride_height_front_left")?,
            ride_height_front_right: idx("idx_ride_height_front_right")?,
            ride_height_rear_left: idx("idx_ride_height_rear_left")?,
            ride_height_rear_right: idx("idx_ride_height_rear_right")?,
            ride_height_slew_rate: idx("idx_ride_height_slew_rate")?,
            unintended_braking_torque: idx("idx_unintended_braking_torque")?,
            very_slow_steering: idx("idx_very_slow_steering")?,
            slow_steering: idx("idx_slow_steering")?,
            braking: idx("idx_braking")?,
            ftti: idx("idx_ftti")?,
        })
    }

    fn max(&self) -> usize {
        [
            self.hara_id,
            self.test_run_id,
            self.constant_road_radius,
            self.road_friction_coefficient,
            self.road_gradient,
            self.lateral_acceleration,
            self.friction_coefficient_exploitation,
            self.desired_vehicle_speed,
            self.acceleration,
            self.steering_front_angle,
            self.steering_front_slew_rate,
            self.steering_rear_angle,
            self.steering_rear_slew_rate,
            self.torque_front_axle,
            self.torque_rear_axle,
            self.torque_slew_rate,
            self.ride_height_front_left,
            self.ride_height_front_right,
            self.ride_height_rear_left,
            self.ride_height_rear_right,
            self.ride_height_slew_rate,
            self.unintended_braking_torque,
            self.very_slow_steering,
            self.slow_steering,
            self.braking,
            self.ftti,
        ]
        .into_iter()
        .max()
        .unwrap_or(1)
    }
}

/// Output path of `mode` as configured in `Scenario_List`
pub fn output_path(config: &Config, mode: ListMode) -> Result<PathBuf> {
    Ok(PathBuf::from(config.entry("Scenario_List", mode.output_key())?))
}

/// Scenario list under construction
#[derive(Debug, Clone)]
pub struct ScenarioSheet {
    mode: ListMode,
    header: Vec<Vec<String>>,
    rows: Vec<Vec<String>>,
    columns: TemplateColumns,
    width: usize,
}

impl ScenarioSheet {
    /// Start a list from the template named by `Scenario_Template.path`
    pub fn open(config: &Config, mode: ListMode) -> Result<Self> {
        let path = PathBuf::from(config.entry(SECTION, "path")?);
        let text = read_sheet(&path)?;
        Self::from_template(&path, &text, config, mode)
    }

    /// Start a list from template CSV text; `path` is only used in messages
    pub fn from_template(path: &Path, text: &str, config: &Config, mode: ListMode) -> Result<Self> {
        let header_size = config.count(SECTION, "header_size")?;
        let mut template = csv::parse(text).map_err(|e| SheetError::Malformed {
            path: path.to_path_buf(),
            line: e.line,
            message: e.message,
        })?;
        if template.len() < header_size {
            return Err(SheetError::ShortTemplate {
                path: path.to_path_buf(),
                rows: template.len(),
                header_size,
            });
        }
        template.truncate(header_size);

        let columns = TemplateColumns::from_config(config)?;
        let width = template
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(columns.max()))
            .max()
            .unwrap_or(0);

        Ok(Self {
            mode,
            header: template,
            rows: Vec::new(),
            columns,
            width,
        })
    }

    pub fn mode(&self) -> ListMode {
        self.mode
    }

    /// Data rows written so far, without the header
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn header_size(&self) -> usize {
        self.header.len()
    }

    /// 1-based indices of the columns hidden in this list
    pub fn hidden_columns(&self) -> Vec<usize> {
        if !self.mode.is_sweep() {
            return Vec::new();
        }
        SWEEP_HIDDEN_COLUMNS
            .iter()
            .filter_map(|letters| column_index(letters))
            .collect()
    }

    /// Letters of the hidden columns, for the log and for consumers that
    /// can apply column visibility
    pub fn hidden_column_letters(&self) -> Vec<String> {
        self.hidden_columns().into_iter().map(column_letters).collect()
    }

    /// Render the list as CSV
    ///
    /// CSV carries no column visibility, so hidden columns keep their
    /// contents.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for row in self.header.iter().chain(&self.rows) {
            let cells: Vec<&str> = (1..=self.width)
                .map(|col| row.get(col - 1).map(String::as_str).unwrap_or(""))
                .collect();
            csv::write_record(&mut out, &cells);
        }
        out
    }

    /// Write the list to `path`, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        info!("Saving {} test run(s) to {}", self.rows.len(), path.display());
        let hidden = self.hidden_column_letters();
        if !hidden.is_empty() {
            info!("{}: columns {} are hidden", self.mode, hidden.join(", "));
        }
        let io_error = |e: std::io::Error| SheetError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        std::fs::write(path, self.to_csv()).map_err(io_error)
    }

    fn place(cells: &mut [String], index: usize, value: impl ToString) {
        cells[index - 1] = value.to_string();
    }

    fn place_fault(&self, cells: &mut [String], fault: &Fault) {
        let c = &self.columns;
        match fault {
            Fault::Torque(t) => {
                if let Some(front) = t.front {
                    Self::place(cells, c.torque_front_axle, front);
                }
                if let Some(rear) = t.rear {
                    Self::place(cells, c.torque_rear_axle, rear);
                }
                Self::place(cells, c.torque_slew_rate, t.slew_rate);
            }
            Fault::Steering(s) => {
                Self::place(cells, c.steering_front_angle, s.additional_angle);
                Self::place(cells, c.steering_front_slew_rate, s.slew_rate);
            }
            Fault::RearSteering(s) => {
                Self::place(cells, c.steering_rear_angle, s.additional_angle);
                Self::place(cells, c.steering_rear_slew_rate, s.slew_rate);
            }
            Fault::RideHeight(r) => {
                Self::place(cells, c.ride_height_front_left, r.front_left);
                Self::place(cells, c.ride_height_front_right, r.front_right);
                Self::place(cells, c.ride_height_rear_left, r.rear_left);
                Self::place(cells, c.ride_height_rear_right, r.rear_right);
                Self::place(cells, c.ride_height_slew_rate, r.slew_rate);
            }
            Fault::Braking(b) => {
                Self::place(cells, c.unintended_braking_torque, b.unintended_braking_torque);
            }
        }
    }
}

impl RowSink for ScenarioSheet {
    fn append(&mut self, row: OutputRow) {
        let c = &self.columns;
        let line = self.header.len() + self.rows.len() + 1;
        let radius = column_letters(c.constant_road_radius);
        let speed = column_letters(c.desired_vehicle_speed);
        let friction = column_letters(c.road_friction_coefficient);
        let lateral = column_letters(c.lateral_acceleration);

        let mut cells = vec![String::new(); self.width];
        Self::place(&mut cells, c.hara_id, &row.hazard_id);
        Self::place(&mut cells, c.test_run_id, row.test_run_label());
        Self::place(&mut cells, c.constant_road_radius, row.road_radius);
        Self::place(&mut cells, c.road_friction_coefficient, &row.road_friction);
        Self::place(&mut cells, c.road_gradient, row.road_gradient);
        Self::place(
            &mut cells,
            c.lateral_acceleration,
            format!(
                "=IF(ISNUMBER({radius}{line}), ({speed}{line}/3.6)^2/{radius}{line}, \"-\")"
            ),
        );
        Self::place(
            &mut cells,
            c.friction_coefficient_exploitation,
            format!(
                "=IF(ISNUMBER({radius}{line}), {lateral}{line}/{friction}{line}*100/9.81, \"-\")"
            ),
        );
        Self::place(&mut cells, c.desired_vehicle_speed, row.vehicle_speed);
        if let Some(acceleration) = row.acceleration {
            Self::place(&mut cells, c.acceleration, acceleration);
        }

        self.place_fault(&mut cells, &row.fault);

        for reaction in row.reactions.iter() {
            match *reaction {
                Reaction::VerySlowSteering(v) => Self::place(&mut cells, c.very_slow_steering, v),
                Reaction::SlowSteering(v) => Self::place(&mut cells, c.slow_steering, v),
                Reaction::Braking(v) => Self::place(&mut cells, c.braking, v),
                Reaction::FaultTolerantTime(v) => Self::place(&mut cells, c.ftti, v),
            }
        }

        debug!("Placed test run {} on sheet row {}", row.test_run_label(), line);
        self.rows.push(cells);
    }
}
