//! Scenario derivation
//!
//! Converts the categorical fields of a hazardous event into numeric
//! scenario parameters. Each field is matched by lower-cased substring
//! against an ordered keyword list; the first match wins.

use crate::error::{Result, ScenarioError};
use crate::fault::{self, Fault};
use crate::hazard::HazardRecord;
use harasim_config::Config;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Speeds on icy or snowy roads are capped at this value (km/h)
pub const ICY_SPEED_LIMIT: f64 = 80.0;

/// Road geometry for a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoadRadius {
    /// Straight road; the radius does not depend on the speed
    Straight,
    /// Curve radii in meters, one per candidate speed
    Curve(Vec<f64>),
}

impl RoadRadius {
    pub fn is_curve(&self) -> bool {
        matches!(self, RoadRadius::Curve(_))
    }

    /// Configured curve radii; empty on a straight road
    pub fn radii(&self) -> &[f64] {
        match self {
            RoadRadius::Straight => &[],
            RoadRadius::Curve(radii) => radii,
        }
    }

    /// Radius paired with the `index`-th candidate speed, `None` past the
    /// end of a curve radius list
    pub fn at(&self, index: usize) -> Option<Radius> {
        match self {
            RoadRadius::Straight => Some(Radius::Straight),
            RoadRadius::Curve(radii) => radii.get(index).copied().map(Radius::Meters),
        }
    }
}

/// Road radius of a single test run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Radius {
    Straight,
    Meters(f64),
}

impl fmt::Display for Radius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Radius::Straight => write!(f, "straight"),
            Radius::Meters(r) => write!(f, "{}", r),
        }
    }
}

/// Road friction coefficient
///
/// Mu-split surfaces have no single coefficient. The configured text is
/// carried through to the output as is and every numeric comparison
/// against it is skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoadFriction {
    Coefficient(f64),
    SplitMu(String),
}

impl RoadFriction {
    /// The coefficient, when the friction is comparable
    pub fn coefficient(&self) -> Option<f64> {
        match self {
            RoadFriction::Coefficient(mu) => Some(*mu),
            RoadFriction::SplitMu(_) => None,
        }
    }
}

impl fmt::Display for RoadFriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoadFriction::Coefficient(mu) => write!(f, "{}", mu),
            RoadFriction::SplitMu(text) => write!(f, "{}", text),
        }
    }
}

/// Speed class of a hazardous event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedClass {
    Standstill,
    VeryLow,
    Low,
    Medium,
    High,
}

impl SpeedClass {
    pub fn classify(text: &str) -> Option<Self> {
        if text == "-" || text.contains("any") || text.contains("stand") {
            Some(SpeedClass::Standstill)
        } else if text.contains("very low") {
            Some(SpeedClass::VeryLow)
        } else if text.contains("low") {
            Some(SpeedClass::Low)
        } else if text.contains("medium") {
            Some(SpeedClass::Medium)
        } else if text.contains("high") {
            Some(SpeedClass::High)
        } else {
            None
        }
    }

    fn speed_key(self) -> &'static str {
        match self {
            SpeedClass::Standstill => "standstill",
            SpeedClass::VeryLow => "very_low",
            SpeedClass::Low => "low",
            SpeedClass::Medium => "medium",
            SpeedClass::High => "high",
        }
    }

    fn curve_key(self) -> &'static str {
        match self {
            SpeedClass::Standstill | SpeedClass::VeryLow | SpeedClass::Low => "curve_low_speed",
            SpeedClass::Medium => "curve_medium_speed",
            SpeedClass::High => "curve_high_speed",
        }
    }
}

/// Quantitative test scenario derived from one relevant hazardous event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Signed road gradient
    pub road_gradient: f64,
    /// Candidate speeds in km/h, in configuration order
    pub vehicle_speeds: Vec<f64>,
    pub road_radius: RoadRadius,
    pub road_friction: RoadFriction,
    /// Driver acceleration demand; absent when every candidate speed is zero
    pub acceleration: Option<f64>,
    pub faults: Vec<Fault>,
}

impl Scenario {
    /// Classify a hazardous event into a scenario
    pub fn classify(record: &HazardRecord, config: &Config) -> Result<Self> {
        let slope = record.slope.to_lowercase();
        let route = record.route.to_lowercase();
        let road_condition = record.road_condition.to_lowercase();
        let vehicle_speed = record.vehicle_speed.to_lowercase();
        let brake_pedal = record.brake_pedal.to_lowercase();
        let maneuver = record.maneuver.to_lowercase();

        let road_gradient = road_gradient(record, &slope, config)?;

        let speed_class = SpeedClass::classify(&vehicle_speed).ok_or_else(|| {
            unrecognized(record, "Speed", &vehicle_speed, "-, any, standstill, very low, low, medium, high")
        })?;
        // Reverse gear is not modelled: speeds stay positive for every gear.
        let mut vehicle_speeds = config.float_list("Speed", speed_class.speed_key())?;

        let road_radius = road_radius(record, &route, speed_class, vehicle_speeds.len(), config)?;
        let road_friction = road_friction(record, &road_condition, &mut vehicle_speeds, config)?;
        let acceleration = acceleration(&vehicle_speeds, &brake_pedal, &maneuver, config)?;
        let faults = fault::faults_for_hazard(record, &road_radius, config)?;

        debug!(
            "Classified {}: gradient {}, {} speed(s), {} fault(s)",
            record.identifier,
            road_gradient,
            vehicle_speeds.len(),
            faults.len()
        );

        Ok(Self {
            road_gradient,
            vehicle_speeds,
            road_radius,
            road_friction,
            acceleration,
            faults,
        })
    }
}

fn unrecognized(
    record: &HazardRecord,
    field: &'static str,
    value: &str,
    expected: &'static str,
) -> ScenarioError {
    ScenarioError::Unrecognized {
        hazard: record.identifier.clone(),
        field,
        value: value.to_string(),
        expected,
    }
}

fn road_gradient(record: &HazardRecord, slope: &str, config: &Config) -> Result<f64> {
    let key = if slope == "-" || slope.contains("flat") || slope.contains("any") {
        "flat"
    } else if slope.contains("slight") {
        "slight_slope"
    } else if slope.contains("down") {
        "downhill"
    } else if slope.contains("up") {
        "uphill"
    } else {
        return Err(unrecognized(record, "Slope", slope, "-, any, flat, slight, downhill, uphill"));
    };
    Ok(config.float("Slope", key)?)
}

fn road_radius(
    record: &HazardRecord,
    route: &str,
    speed_class: SpeedClass,
    speed_count: usize,
    config: &Config,
) -> Result<RoadRadius> {
    if route == "-" || route.contains("any") || route.contains("straight") {
        return Ok(RoadRadius::Straight);
    }
    if !route.contains("curve") {
        return Err(unrecognized(record, "Route", route, "-, any, straight, curve"));
    }

    let radii = config.float_list("Radius", speed_class.curve_key())?;
    if radii.len() != speed_count {
        return Err(ScenarioError::RadiusCountMismatch {
            hazard: record.identifier.clone(),
            radii: radii.len(),
            speeds: speed_count,
        });
    }
    Ok(RoadRadius::Curve(radii))
}

fn road_friction(
    record: &HazardRecord,
    road_condition: &str,
    vehicle_speeds: &mut [f64],
    config: &Config,
) -> Result<RoadFriction> {
    let key = if road_condition == "-" || road_condition.contains("any") || road_condition.contains("dry") {
        "dry"
    } else if road_condition.contains("wet") {
        "wet"
    } else if road_condition.contains("icy") || road_condition.contains("snow") {
        for speed in vehicle_speeds.iter_mut() {
            *speed = speed.min(ICY_SPEED_LIMIT);
        }
        "icy"
    } else if road_condition.contains("gravel") {
        "gravel"
    } else if road_condition.contains("mu-split") {
        let marker = config.entry("Road_friction", "mu-split")?;
        return Ok(RoadFriction::SplitMu(marker.to_string()));
    } else {
        return Err(unrecognized(
            record,
            "Road condition",
            road_condition,
            "-, any, dry, wet, icy, snow, gravel, mu-split",
        ));
    };
    Ok(RoadFriction::Coefficient(config.float("Road_friction", key)?))
}

fn acceleration(
    vehicle_speeds: &[f64],
    brake_pedal: &str,
    maneuver: &str,
    config: &Config,
) -> Result<Option<f64>> {
    if vehicle_speeds.iter().all(|v| *v == 0.0) {
        return Ok(None);
    }
    let value = if brake_pedal.contains("pressed") {
        config.float("Driver", "brake_pressed")?
    } else if maneuver.contains("overtaking") {
        config.float("Driver", "overtaking")?
    } else {
        0.0
    };
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use harasim_config::ConfigError;

    fn config() -> Config {
        harasim_config::from_str(
            r#"
            [Slope]
            flat = 0
            slight_slope = 5
            downhill = -12
            uphill = 12

            [Speed]
            standstill = [0]
            very_low = [5, 10]
            low = [20, 30]
            medium = [60, 90]
            high = [120, 150]

            [Radius]
            curve_low_speed = [30, 50]
            curve_medium_speed = [150, 300]
            curve_high_speed = [500]

            [Road_friction]
            dry = 1.0
            wet = 0.7
            icy = 0.2
            gravel = 0.6
            mu-split = "1.0/0.2"

            [Driver]
            brake_pressed = -3.0
            overtaking = 2.5

            [Hazard_TQ]
            TQ3 = 150
            slew_rate = 1000
            "#,
        )
        .unwrap()
    }

    fn record() -> HazardRecord {
        HazardRecord {
            identifier: "HE-7".to_string(),
            slope: "-".to_string(),
            route: "straight".to_string(),
            road_condition: "dry".to_string(),
            engaged_gear: "D".to_string(),
            vehicle_speed: "medium".to_string(),
            brake_pedal: "released".to_string(),
            maneuver: "cruising".to_string(),
            hazard: Some("[TQ3]".to_string()),
            relevant: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_slope_priority() {
        let config = config();
        let mut r = record();
        for (slope, expected) in [
            ("-", 0.0),
            ("Any", 0.0),
            ("slight downhill", 5.0),
            ("Downhill", -12.0),
            ("steep up", 12.0),
        ] {
            r.slope = slope.to_string();
            assert_eq!(Scenario::classify(&r, &config).unwrap().road_gradient, expected);
        }

        r.slope = "sideways".to_string();
        assert!(matches!(
            Scenario::classify(&r, &config),
            Err(ScenarioError::Unrecognized { field: "Slope", .. })
        ));
    }

    #[test]
    fn test_speed_classes() {
        assert_eq!(SpeedClass::classify("-"), Some(SpeedClass::Standstill));
        assert_eq!(SpeedClass::classify("any"), Some(SpeedClass::Standstill));
        assert_eq!(SpeedClass::classify("standstill"), Some(SpeedClass::Standstill));
        assert_eq!(SpeedClass::classify("very low"), Some(SpeedClass::VeryLow));
        assert_eq!(SpeedClass::classify("low"), Some(SpeedClass::Low));
        assert_eq!(SpeedClass::classify("medium"), Some(SpeedClass::Medium));
        assert_eq!(SpeedClass::classify("high"), Some(SpeedClass::High));
        assert_eq!(SpeedClass::classify("ludicrous"), None);
    }

    #[test]
    fn test_reverse_gear_keeps_positive_speeds() {
        let mut r = record();
        r.engaged_gear = "R".to_string();
        let scenario = Scenario::classify(&r, &config()).unwrap();
        assert_eq!(scenario.vehicle_speeds, vec![60.0, 90.0]);
    }

    #[test]
    fn test_curve_radius_follows_speed_class() {
        let config = config();
        let mut r = record();
        r.route = "curve".to_string();
        r.vehicle_speed = "very low".to_string();
        let scenario = Scenario::classify(&r, &config).unwrap();
        assert_eq!(scenario.road_radius, RoadRadius::Curve(vec![30.0, 50.0]));
        assert_eq!(scenario.road_radius.at(1), Some(Radius::Meters(50.0)));
        assert_eq!(scenario.road_radius.at(2), None);
        assert_eq!(RoadRadius::Straight.at(7), Some(Radius::Straight));

        r.vehicle_speed = "medium".to_string();
        let scenario = Scenario::classify(&r, &config).unwrap();
        assert_eq!(scenario.road_radius, RoadRadius::Curve(vec![150.0, 300.0]));
    }

    #[test]
    fn test_curve_radius_count_must_match_speeds() {
        let mut r = record();
        r.route = "curve".to_string();
        r.vehicle_speed = "high".to_string();
        assert!(matches!(
            Scenario::classify(&r, &config()),
            Err(ScenarioError::RadiusCountMismatch { radii: 1, speeds: 2, .. })
        ));
    }

    #[test]
    fn test_unknown_route() {
        let mut r = record();
        r.route = "roundabout".to_string();
        assert!(matches!(
            Scenario::classify(&r, &config()),
            Err(ScenarioError::Unrecognized { field: "Route", .. })
        ));
    }

    #[test]
    fn test_icy_road_clamps_speeds() {
        let mut r = record();
        r.vehicle_speed = "high".to_string();
        r.road_condition = "Snow covered".to_string();
        let scenario = Scenario::classify(&r, &config()).unwrap();
        assert_eq!(scenario.vehicle_speeds, vec![80.0, 80.0]);
        assert_eq!(scenario.road_friction, RoadFriction::Coefficient(0.2));
        assert!(scenario.vehicle_speeds.iter().all(|v| *v <= ICY_SPEED_LIMIT));
    }

    #[test]
    fn test_mu_split_is_opaque() {
        let mut r = record();
        r.road_condition = "mu-split".to_string();
        let scenario = Scenario::classify(&r, &config()).unwrap();
        assert_eq!(
            scenario.road_friction,
            RoadFriction::SplitMu("1.0/0.2".to_string())
        );
        assert_eq!(scenario.road_friction.coefficient(), None);
        assert_eq!(scenario.road_friction.to_string(), "1.0/0.2");
    }

    #[test]
    fn test_unknown_road_condition() {
        let mut r = record();
        r.road_condition = "lava".to_string();
        assert!(matches!(
            Scenario::classify(&r, &config()),
            Err(ScenarioError::Unrecognized { field: "Road condition", .. })
        ));
    }

    #[test]
    fn test_acceleration() {
        let config = config();
        let mut r = record();
        assert_eq!(Scenario::classify(&r, &config).unwrap().acceleration, Some(0.0));

        r.brake_pedal = "Pressed".to_string();
        r.maneuver = "overtaking".to_string();
        assert_eq!(Scenario::classify(&r, &config).unwrap().acceleration, Some(-3.0));

        r.brake_pedal = "-".to_string();
        assert_eq!(Scenario::classify(&r, &config).unwrap().acceleration, Some(2.5));

        r.vehicle_speed = "standstill".to_string();
        assert_eq!(Scenario::classify(&r, &config).unwrap().acceleration, None);
    }

    #[test]
    fn test_unparseable_config_entry() {
        let mut config = config();
        config.set("Slope", "flat", "level");
        assert!(matches!(
            Scenario::classify(&record(), &config),
            Err(ScenarioError::Config(ConfigError::InvalidType { .. }))
        ));
    }

    #[test]
    fn test_standstill_straight_dry_tq3() {
        let mut r = record();
        r.vehicle_speed = "standstill".to_string();
        let scenario = Scenario::classify(&r, &config()).unwrap();
        assert_eq!(scenario.vehicle_speeds, vec![0.0]);
        assert_eq!(scenario.road_radius, RoadRadius::Straight);
        assert_eq!(scenario.faults.len(), 1);
        let Fault::Torque(torque) = &scenario.faults[0] else {
            panic!("expected a torque fault");
        };
        assert_eq!(torque.front, Some(150.0));
        assert_eq!(torque.front, torque.rear);
    }
}
