//! Fault models and the hazard-code fault catalog
//!
//! A hazard tag carries a bracketed code (`[TQ3]`, `[SUS1]`, ...). The
//! catalog maps the first matching code to one or more faults whose
//! magnitudes come from the `Hazard_*` configuration sections.

use crate::error::{Result, ScenarioError};
use crate::hazard::HazardRecord;
use crate::scenario::RoadRadius;
use harasim_config::Config;
use serde::{Deserialize, Serialize};

/// Torque sign for the driving direction.
///
/// Reserved for reverse-gear scenarios. The vehicle model only drives
/// forward, so this stays +1 for every engaged gear.
pub const DIRECTION: f64 = 1.0;

/// Radius used for wheel-angle geometry on a straight road (m)
pub const STRAIGHT_ROAD_EQUIVALENT_RADIUS: f64 = 100.0;

/// Rear axle steering angle relative to the front wheel angle
pub const REAR_TO_FRONT_ANGLE_RATIO: f64 = 0.1;

/// E-motor torque malfunction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorqueFault {
    /// Front axle torque error (Nm); `None` when the front motor is healthy
    pub front: Option<f64>,
    /// Rear axle torque error (Nm); `None` when the rear motor is healthy
    pub rear: Option<f64>,
    pub slew_rate: f64,
}

impl TorqueFault {
    /// Sum of the axle errors, absent axles counting as zero
    pub fn overall_torque(&self) -> f64 {
        self.front.unwrap_or(0.0) + self.rear.unwrap_or(0.0)
    }

    /// Whether the torque distribution can destabilize the vehicle
    ///
    /// True for a negative rear error, or for front and rear errors of
    /// opposite sign.
    pub fn loses_stability(&self) -> bool {
        if self.rear.is_some_and(|rear| rear < 0.0) {
            return true;
        }
        match (self.front, self.rear) {
            (Some(front), Some(rear)) => {
                (front < 0.0 && rear > 0.0) || (front > 0.0 && rear < 0.0)
            }
            _ => false,
        }
    }
}

/// Unintended steering angle on the front or rear axle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteeringFault {
    /// Additional unintended wheel angle (deg)
    pub additional_angle: f64,
    pub slew_rate: f64,
}

/// Ride height malfunction, per wheel offsets in meters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideHeightFault {
    pub front_left: f64,
    pub front_right: f64,
    pub rear_left: f64,
    pub rear_right: f64,
    pub slew_rate: f64,
}

impl RideHeightFault {
    /// Same offset on all four wheels
    pub fn all_wheels(offset: f64, slew_rate: f64) -> Self {
        Self {
            front_left: offset,
            front_right: offset,
            rear_left: offset,
            rear_right: offset,
            slew_rate,
        }
    }
}

/// Hydraulic brake malfunction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrakingFault {
    pub unintended_braking_torque: f64,
}

/// A single injected malfunction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Fault {
    Torque(TorqueFault),
    Steering(SteeringFault),
    RearSteering(SteeringFault),
    RideHeight(RideHeightFault),
    Braking(BrakingFault),
}

impl Fault {
    /// Copy of this fault with every magnitude multiplied by `level`
    ///
    /// Slew rates describe the onset and are kept as they are.
    pub fn scaled(&self, level: f64) -> Fault {
        match self {
            Fault::Torque(t) => Fault::Torque(TorqueFault {
                front: t.front.map(|v| v * level),
                rear: t.rear.map(|v| v * level),
                slew_rate: t.slew_rate,
            }),
            Fault::Steering(s) => Fault::Steering(SteeringFault {
                additional_angle: s.additional_angle * level,
                slew_rate: s.slew_rate,
            }),
            Fault::RearSteering(s) => Fault::RearSteering(SteeringFault {
                additional_angle: s.additional_angle * level,
                slew_rate: s.slew_rate,
            }),
            Fault::RideHeight(r) => Fault::RideHeight(RideHeightFault {
                front_left: r.front_left * level,
                front_right: r.front_right * level,
                rear_left: r.rear_left * level,
                rear_right: r.rear_right * level,
                slew_rate: r.slew_rate,
            }),
            Fault::Braking(b) => Fault::Braking(BrakingFault {
                unintended_braking_torque: b.unintended_braking_torque * level,
            }),
        }
    }

    /// Stability check; only torque faults can report it
    pub fn loses_stability(&self) -> bool {
        matches!(self, Fault::Torque(t) if t.loses_stability())
    }
}

/// Axle sign pattern of one torque fault: `None` leaves the axle healthy
type AxleSigns = (Option<f64>, Option<f64>);

const BOTH_AXLES: &[AxleSigns] = &[(Some(1.0), Some(1.0))];
const BOTH_AXLES_NEGATIVE: &[AxleSigns] = &[(Some(-1.0), Some(-1.0))];
const EACH_AXLE: &[AxleSigns] = &[(Some(1.0), Some(1.0)), (Some(1.0), None), (None, Some(1.0))];
const SIGN_PERMUTATIONS: &[AxleSigns] = &[
    (Some(-1.0), None),
    (None, Some(-1.0)),
    (Some(-1.0), Some(-1.0)),
    (Some(1.0), Some(-1.0)),
    (Some(-1.0), Some(1.0)),
];

/// How a catalog code produces its faults
#[derive(Debug, Clone, Copy)]
enum FaultModel {
    /// Torque faults with fixed signs
    Torque(&'static [AxleSigns]),
    /// Torque faults additionally signed by [`DIRECTION`]
    DirectionalTorque(&'static [AxleSigns]),
    /// Front steering to the physical steering limit
    SteeringToLimit,
    /// Front steering reduced by `SUS2` percent of the driver input
    SteeringReduced,
    /// Front steering mirrored against the driver input
    SteeringOpposite,
    RearSteeringToLimit,
    RearSteeringOpposite,
    Braking,
    /// Park brake codes have no fault model yet
    ParkBrake,
    RideHeightAllWheels,
    /// Diagonal ride height offsets: (+,-,-,+) and (+,-,+,-)
    RideHeightCross,
}

/// Catalog in priority order; the first code found in the tag wins
const CATALOG: &[(&str, FaultModel)] = &[
    ("[TQ1]", FaultModel::Torque(BOTH_AXLES)),
    ("[TQ2]", FaultModel::Torque(EACH_AXLE)),
    ("[TQ3]", FaultModel::DirectionalTorque(BOTH_AXLES)),
    ("[TQ4]", FaultModel::DirectionalTorque(BOTH_AXLES_NEGATIVE)),
    ("[TQ5]", FaultModel::DirectionalTorque(BOTH_AXLES_NEGATIVE)),
    ("[TQ6]", FaultModel::DirectionalTorque(SIGN_PERMUTATIONS)),
    ("[TQ7]", FaultModel::Torque(BOTH_AXLES)),
    ("[TQ8]", FaultModel::Torque(BOTH_AXLES)),
    ("[SUS1]", FaultModel::SteeringToLimit),
    ("[SUS2]", FaultModel::SteeringReduced),
    ("[SUS3]", FaultModel::SteeringOpposite),
    ("[RAS1]", FaultModel::RearSteeringToLimit),
    ("[RAS3]", FaultModel::RearSteeringOpposite),
    ("[BS1]", FaultModel::Braking),
    ("[PB", FaultModel::ParkBrake),
    ("[RHA1]", FaultModel::RideHeightAllWheels),
    ("[RHA2]", FaultModel::RideHeightAllWheels),
    ("[RHA3]", FaultModel::RideHeightCross),
];

/// Faults for the hazard tag of `record`, in catalog order
///
/// Returns an empty list when the record carries no hazard tag. A tag
/// without any catalog code is an error.
pub fn faults_for_hazard(
    record: &HazardRecord,
    road_radius: &RoadRadius,
    config: &Config,
) -> Result<Vec<Fault>> {
    let Some(tag) = record.hazard_tag() else {
        return Ok(Vec::new());
    };

    let (code, model) = CATALOG
        .iter()
        .find(|(code, _)| tag.contains(code))
        .ok_or_else(|| ScenarioError::UnrecognizedHazardCode {
            hazard: record.identifier.clone(),
            tag: tag.clone(),
        })?;
    let key = code.trim_start_matches('[').trim_end_matches(']');

    let faults = match *model {
        FaultModel::Torque(signs) => torque_faults(key, signs, 1.0, config)?,
        FaultModel::DirectionalTorque(signs) => torque_faults(key, signs, DIRECTION, config)?,
        FaultModel::SteeringToLimit => {
            let limit = config.float("Vehicle", "front_steering_limit")?;
            let angle = front_wheel_angle(record, road_radius, config)?;
            vec![steering(limit - angle, config)?]
        }
        FaultModel::SteeringReduced => {
            let reduction = config.float("Hazard_SUS", "SUS2")?;
            let angle = front_wheel_angle(record, road_radius, config)?;
            vec![steering(-reduction / 100.0 * angle, config)?]
        }
        FaultModel::SteeringOpposite => {
            let angle = front_wheel_angle(record, road_radius, config)?;
            vec![steering(-2.0 * angle, config)?]
        }
        FaultModel::RearSteeringToLimit => {
            let limit = config.float("Vehicle", "rear_steering_limit")?;
            let angle =
                front_wheel_angle(record, road_radius, config)? * REAR_TO_FRONT_ANGLE_RATIO;
            vec![rear_steering(limit - angle, config)?]
        }
        FaultModel::RearSteeringOpposite => {
            let angle =
                front_wheel_angle(record, road_radius, config)? * REAR_TO_FRONT_ANGLE_RATIO;
            vec![rear_steering(-2.0 * angle, config)?]
        }
        FaultModel::Braking => vec![Fault::Braking(BrakingFault {
            unintended_braking_torque: config.float("Hazard_BS", key)?,
        })],
        FaultModel::ParkBrake => {
            return Err(ScenarioError::UnsupportedFault {
                hazard: record.identifier.clone(),
                code: tag,
            })
        }
        FaultModel::RideHeightAllWheels => {
            let offset = config.float("Hazard_RHA", key)?;
            let slew_rate = config.float("Hazard_RHA", "slew_rate")?;
            vec![Fault::RideHeight(RideHeightFault::all_wheels(offset, slew_rate))]
        }
        FaultModel::RideHeightCross => {
            let h = config.float("Hazard_RHA", key)?;
            let slew_rate = config.float("Hazard_RHA", "slew_rate")?;
            vec![
                Fault::RideHeight(RideHeightFault {
                    front_left: h,
                    front_right: -h,
                    rear_left: -h,
                    rear_right: h,
                    slew_rate,
                }),
                Fault::RideHeight(RideHeightFault {
                    front_left: h,
                    front_right: -h,
                    rear_left: h,
                    rear_right: -h,
                    slew_rate,
                }),
            ]
        }
    };

    Ok(faults)
}

fn torque_faults(
    key: &str,
    signs: &[AxleSigns],
    direction: f64,
    config: &Config,
) -> Result<Vec<Fault>> {
    let magnitude = config.float("Hazard_TQ", key)?;
    let slew_rate = config.float("Hazard_TQ", "slew_rate")?;
    Ok(signs
        .iter()
        .map(|(front, rear)| {
            Fault::Torque(TorqueFault {
                front: front.map(|sign| sign * direction * magnitude),
                rear: rear.map(|sign| sign * direction * magnitude),
                slew_rate,
            })
        })
        .collect())
}

fn steering(additional_angle: f64, config: &Config) -> Result<Fault> {
    Ok(Fault::Steering(SteeringFault {
        additional_angle,
        slew_rate: config.float("Hazard_SUS", "slew_rate")?,
    }))
}

fn rear_steering(additional_angle: f64, config: &Config) -> Result<Fault> {
    Ok(Fault::RearSteering(SteeringFault {
        additional_angle,
        slew_rate: config.float("Hazard_RAS", "slew_rate")?,
    }))
}

/// Front wheel angle (deg) needed to follow the scenario's road
///
/// Curves use the radius paired with the first candidate speed.
fn front_wheel_angle(
    record: &HazardRecord,
    road_radius: &RoadRadius,
    config: &Config,
) -> Result<f64> {
    let wheelbase = config.float("Vehicle", "wheelbase")?;
    let radius = match road_radius {
        RoadRadius::Straight => STRAIGHT_ROAD_EQUIVALENT_RADIUS,
        RoadRadius::Curve(radii) => radii.first().copied().unwrap_or(0.0),
    };
    wheel_angle(radius, wheelbase).ok_or_else(|| ScenarioError::InvalidRadius {
        hazard: record.identifier.clone(),
        radius,
        wheelbase,
    })
}

/// Ackermann wheel angle in degrees; `None` when the radius is shorter than the wheelbase
pub fn wheel_angle(radius: f64, wheelbase: f64) -> Option<f64> {
    let ratio = wheelbase / radius;
    if !ratio.is_finite() || ratio.abs() > 1.0 {
        return None;
    }
    Some(ratio.asin().to_degrees())
}
