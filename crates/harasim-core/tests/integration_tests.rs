//! End-to-end expansion over a realistic configuration

use harasim_config::Config;
use harasim_core::{
    Fault, HazardRecord, ListMode, MatrixExpander, OutputRow, Radius, ReactionSet, RoadFriction,
    Scenario, ScenarioError,
};

const CONFIG: &str = r#"
[Slope]
flat = 0
slight_slope = 5
downhill = -12
uphill = 12

[Speed]
standstill = [0]
very_low = [5, 10]
low = [20, 30, 40]
medium = [60, 90]
high = [120, 150, 180]

[Radius]
curve_low_speed = [15, 30, 50]
curve_medium_speed = [150, 300]
curve_high_speed = [500, 800, 1200]

[Road_friction]
dry = 1.0
wet = 0.7
gravel = 0.6
icy = 0.2
mu-split = "1.0/0.2"

[Driver]
brake_pressed = -3.0
overtaking = 2.5

[Vehicle]
wheelbase = 3.0
front_steering_limit = 40.0
rear_steering_limit = 5.0

[Hazard_TQ]
TQ1 = 200
TQ2 = 80
TQ3 = 150
TQ4 = 150
TQ5 = 60
TQ6 = 120
slew_rate = 1000

[Hazard_SUS]
SUS2 = 50
slew_rate = 100

[Hazard_RAS]
slew_rate = 20

[Hazard_BS]
BS1 = 2500

[Hazard_RHA]
RHA1 = 0.05
slew_rate = 0.1

[Reaction]
braking_normal = 40
braking_torque_fault_high = 80
braking_torque_fault_low = 30
braking_low_friction = 15
very_slow_steering = 5
slow_steering = 20
"#;

fn config() -> Config {
    harasim_config::from_str(CONFIG).unwrap()
}

fn record(id: &str, fields: [&str; 5], hazard: &str, relevant: bool) -> HazardRecord {
    let [slope, route, road_condition, vehicle_speed, maneuver] = fields;
    HazardRecord {
        identifier: id.to_string(),
        location: "Highway".to_string(),
        slope: slope.to_string(),
        route: route.to_string(),
        road_condition: road_condition.to_string(),
        engaged_gear: "D".to_string(),
        vehicle_speed: vehicle_speed.to_string(),
        brake_pedal: "-".to_string(),
        maneuver: maneuver.to_string(),
        hazard: Some(hazard.to_string()),
        relevant,
        comment: None,
    }
}

fn hara() -> Vec<HazardRecord> {
    vec![
        record("HE-01", ["-", "straight", "dry", "medium", "-"], "[TQ1]", true),
        record("HE-02", ["uphill", "curve", "wet", "low", "-"], "[TQ2]", true),
        record("HE-03", ["-", "-", "icy", "high", "overtaking"], "[TQ6]", true),
        record("HE-04", ["down", "straight", "dry", "high", "-"], "[TQ1]", false),
        record("HE-05", ["flat", "curve", "mu-split", "medium", "-"], "[SUS2]", true),
        record("HE-06", ["-", "straight", "gravel", "very low", "-"], "[BS1]", true),
        record("HE-07", ["-", "any", "dry", "standstill", "-"], "[RHA1]", true),
    ]
}

fn run(mode: ListMode, records: &[HazardRecord]) -> (Vec<OutputRow>, u64) {
    let config = config();
    let mut expander = MatrixExpander::new(&config, mode, Vec::new());
    expander.run(records).unwrap();
    let test_runs = expander.test_runs();
    (expander.into_sink(), test_runs)
}

#[test]
fn test_scenario_list_ids_are_contiguous() {
    let (rows, test_runs) = run(ListMode::Scenario, &hara());
    assert_eq!(rows.len() as u64, test_runs);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.test_run_id, i as u64 + 1);
    }
    assert_eq!(rows[0].test_run_label(), "00001");
}

#[test]
fn test_irrelevant_records_never_emit() {
    let (rows, _) = run(ListMode::Scenario, &hara());
    assert!(rows.iter().all(|r| r.hazard_id != "HE-04"));
}

#[test]
fn test_icy_speeds_are_capped() {
    let (rows, _) = run(ListMode::Scenario, &hara());
    let icy: Vec<&OutputRow> = rows.iter().filter(|r| r.hazard_id == "HE-03").collect();
    assert!(!icy.is_empty());
    assert!(icy.iter().all(|r| r.vehicle_speed <= 80.0));
    assert!(icy.iter().all(|r| r.road_friction == RoadFriction::Coefficient(0.2)));
    // overtaking on a moving vehicle
    assert!(icy.iter().all(|r| r.acceleration == Some(2.5)));
}

#[test]
fn test_curve_rows_carry_the_aligned_radius() {
    let (rows, _) = run(ListMode::Scenario, &hara());
    for row in rows.iter().filter(|r| r.hazard_id == "HE-02") {
        let expected = match row.vehicle_speed as u32 {
            20 => 15.0,
            30 => 30.0,
            40 => 50.0,
            other => panic!("unexpected speed {}", other),
        };
        assert_eq!(row.road_radius, Radius::Meters(expected));
    }
}

#[test]
fn test_radius_list_mismatch_fails() {
    let mut config = config();
    config.set("Radius", "curve_medium_speed", "[150]");
    let record = record("HE-09", ["-", "curve", "dry", "medium", "-"], "[TQ1]", true);
    assert!(matches!(
        Scenario::classify(&record, &config),
        Err(ScenarioError::RadiusCountMismatch {
            radii: 1,
            speeds: 2,
            ..
        })
    ));
}

#[test]
fn test_high_torque_braking_only_uses_high_value() {
    let (rows, _) = run(ListMode::Scenario, &hara());
    let he01: Vec<&OutputRow> = rows.iter().filter(|r| r.hazard_id == "HE-01").collect();
    // 2 speeds x (no reaction, braking only)
    assert_eq!(he01.len(), 4);
    assert_eq!(he01[1].reactions, ReactionSet::braking_only(80.0));
    assert_eq!(he01[3].reactions, ReactionSet::braking_only(80.0));
}

#[test]
fn test_opposed_torque_always_gets_steering_sets() {
    let (rows, _) = run(ListMode::Scenario, &hara());
    let opposed: Vec<&OutputRow> = rows
        .iter()
        .filter(|r| {
            matches!(&r.fault, Fault::Torque(t)
                if t.front.is_some_and(|f| f > 0.0) && t.rear.is_some_and(|r| r < 0.0))
        })
        .collect();
    assert!(!opposed.is_empty());
    let with_steering = opposed
        .iter()
        .filter(|r| {
            r.reactions.very_slow_steering() == Some(5.0)
                || r.reactions.slow_steering() == Some(20.0)
        })
        .count();
    // icy road caps all three high speeds at 80; one row per speed and correction
    assert_eq!(with_steering, 3 * 2);
}

#[test]
fn test_mu_split_rows_keep_marker() {
    let (rows, _) = run(ListMode::Scenario, &hara());
    let split: Vec<&OutputRow> = rows.iter().filter(|r| r.hazard_id == "HE-05").collect();
    // curve: 2 speeds x 1 fault x 4 reaction sets
    assert_eq!(split.len(), 8);
    assert!(split
        .iter()
        .all(|r| r.road_friction == RoadFriction::SplitMu("1.0/0.2".to_string())));
    // braking is not capped against the marker
    assert_eq!(split[1].reactions.braking(), Some(40.0));
}

#[test]
fn test_scenario_list_is_deterministic() {
    let (first, _) = run(ListMode::Scenario, &hara());
    let (second, _) = run(ListMode::Scenario, &hara());
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_sweeps_branch_from_the_referenced_test_run() {
    let (scenario_rows, _) = run(ListMode::Scenario, &hara());
    let reference = scenario_rows
        .iter()
        .find(|r| r.hazard_id == "HE-01" && r.vehicle_speed == 90.0)
        .unwrap()
        .clone();

    let mut records = hara();
    for r in &mut records {
        r.comment = Some(reference.test_run_id.to_string());
    }

    let (ftti_rows, _) = run(ListMode::Ftti, &records);
    assert_eq!(ftti_rows.len(), 5);
    for (i, row) in ftti_rows.iter().enumerate() {
        assert_eq!(row.hazard_id, reference.hazard_id);
        assert_eq!(row.vehicle_speed, reference.vehicle_speed);
        assert_eq!(row.fault, reference.fault);
        assert_eq!(row.test_run_id, i as u64 + 1);
    }

    let (acceptance_rows, _) = run(ListMode::Acceptance, &records);
    assert_eq!(acceptance_rows.len(), 5);
    assert_eq!(acceptance_rows[4].fault, reference.fault);
    assert_eq!(acceptance_rows[0].fault, reference.fault.scaled(0.2));
}

#[test]
fn test_first_error_aborts_the_run() {
    let config = config();
    let mut records = hara();
    records[1].route = "roundabout".to_string();
    let mut expander = MatrixExpander::new(&config, ListMode::Scenario, Vec::new());
    let err = expander.run(&records).unwrap_err();
    assert!(err.to_string().contains("HE-02"));
    assert!(err.to_string().contains("roundabout"));
    // rows of the records before the failure are already in the sink
    assert!(expander.sink().iter().all(|r| r.hazard_id == "HE-01"));
    assert_eq!(expander.sink().len(), 4);
}
