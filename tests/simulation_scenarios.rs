//! End-to-end scenarios for the enclosure simulation
//!
//! These drive the public API only: configuration in, series out.

use std::thread;
use std::time::Duration;

use enclosure_thermal_sim::config::Config;
use enclosure_thermal_sim::simulation::{self, ReferenceCurve, SimulationEngine};
use enclosure_thermal_sim::{
    AccumulationMode, PidParameters, SimulationConfig, SimulationError, ThermalParameters,
};
use rstest::rstest;
use tokio_util::sync::CancellationToken;

fn proportional_only() -> PidParameters {
    PidParameters::new(1.0, 0.0, 0.0, 18.0)
}

#[test]
fn test_idle_actuator_at_ambient_holds_temperature() {
    let config = SimulationConfig::new(1.0, 2.0, 20.0);
    let thermal = ThermalParameters::default()
        .with_ambient(20.0)
        .with_max_actuator_energy(0.0);

    let result = simulation::run(&config, &proportional_only(), &thermal).unwrap();

    assert_eq!(result.time.as_slice(), &[0.0, 1.0, 2.0]);
    assert!(result.temperature.iter().all(|&t| t == 20.0));
    assert!(result.output.iter().all(|&u| u == 2.0));
    assert_eq!(result.temperature.len(), 4);
    assert_eq!(result.output.len(), 4);
}

#[test]
fn test_strong_actuator_approaches_setpoint_from_above() {
    let config = SimulationConfig::new(1.0, 10.0, 20.0);
    let thermal = ThermalParameters::default()
        .with_ambient(20.0)
        .with_max_actuator_energy(50_000_000.0);

    let result = simulation::run(&config, &proportional_only(), &thermal).unwrap();
    let temperature = result.temperature.as_slice();
    let output = result.output.as_slice();

    assert!(temperature[1] < temperature[0]);
    for pair in temperature.windows(2) {
        assert!(pair[1] <= pair[0], "temperature rose: {pair:?}");
    }
    for &t in temperature {
        assert!(t >= 18.0, "overshot setpoint: {t}");
    }
    for &u in output {
        assert!((0.0..=100.0).contains(&u));
    }
}

#[rstest]
#[case(AccumulationMode::FullHistory)]
#[case(AccumulationMode::Running)]
fn test_output_stays_within_actuator_range(#[case] accumulation: AccumulationMode) {
    let config = SimulationConfig::new(0.1, 50.0, 20.3).with_accumulation(accumulation);

    for pid in [PidParameters::gentle(), PidParameters::high_gain()] {
        let result = simulation::run(&config, &pid, &ThermalParameters::default()).unwrap();
        assert_eq!(result.temperature.len(), result.time.len() + 1);
        assert_eq!(result.output.len(), result.time.len() + 1);
        assert!(result.output.iter().all(|u| (0.0..=100.0).contains(u)));
    }
}

#[test]
fn test_high_gain_full_length_run_settles_near_setpoint() {
    let config = SimulationConfig::default().with_accumulation(AccumulationMode::Running);
    let result = simulation::run(
        &config,
        &PidParameters::high_gain(),
        &ThermalParameters::default(),
    )
    .unwrap();

    assert_eq!(result.time.len(), 50_001);
    assert_eq!(result.temperature.len(), 50_002);

    let final_temperature = result.temperature.last().unwrap();
    assert!(
        (final_temperature - 18.0).abs() < 0.25,
        "final temperature {final_temperature}"
    );
    assert!(result.temperature.min().unwrap() > 17.5);
    assert_eq!(result.output.first(), Some(100.0));
}

#[test]
fn test_reference_curve_supplies_initial_condition() {
    let result = SimulationEngine::new(
        SimulationConfig::new(0.1, 2.0, 0.0),
        PidParameters::gentle(),
        ThermalParameters::default(),
    )
    .with_initial_condition(Box::new(ReferenceCurve::default()))
    .run()
    .unwrap();

    assert_eq!(result.temperature.first(), Some(20.3));
    let reference = result.reference.unwrap();
    assert_eq!(reference.len(), result.time.len());
    assert!(reference.iter().all(|v| (19.7..=20.3).contains(v)));
}

#[test]
fn test_cancellation_from_another_thread() {
    let token = CancellationToken::new();
    let engine = SimulationEngine::new(
        SimulationConfig::default(),
        PidParameters::gentle(),
        ThermalParameters::default(),
    )
    .with_cancellation(token.clone());

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        token.cancel();
    });

    let outcome = engine.run();
    canceller.join().unwrap();

    assert!(matches!(outcome, Err(SimulationError::Cancelled { .. })));
}

#[test]
fn test_invalid_run_reports_error_without_series() {
    let config = SimulationConfig::new(0.1, -1.0, 20.3);
    let outcome = simulation::run(&config, &PidParameters::gentle(), &ThermalParameters::default());
    assert!(matches!(
        outcome,
        Err(SimulationError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_config_file_drives_engine() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sim.toml");
    std::fs::write(
        &path,
        r#"
        [simulation]
        sample_time = 1.0
        run_duration = 2.0
        starting_temperature_c = 20.0

        [pid]
        preset = "custom"
        kp = 1.0
        ki = 0.0
        kd = 0.0

        [thermal]
        max_actuator_energy_per_step = 0.0
        "#,
    )
    .unwrap();

    let cfg = Config::load_from(&path).unwrap();
    let result = cfg.engine().run().unwrap();

    assert_eq!(result.temperature.as_slice(), &[20.0; 4]);
    assert_eq!(result.output.as_slice(), &[2.0; 4]);
}
