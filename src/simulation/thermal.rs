//! # Enclosure Thermal Model
//!
//! Lumped single-node energy balance, advanced with one explicit Euler step
//! per sample:
//!
//! ΔT = ((Q_actuator + Q_external) / 1000) / (c_p * m)
//! T[n+1] = T[n] - ΔT
//!
//! Where:
//! - Q_actuator = E_max * (u / 100) * dt, energy removed by the cooler (J)
//! - Q_external = k * A * (T[n] - T_ambient), ambient exchange (J)
//! - c_p * m = heat capacity of the enclosure contents (kJ/K)
//!
//! Q_external is positive when the enclosure is warmer than ambient and is
//! counted on the same side as the actuator energy. A negative total (ambient
//! warmer than the enclosure, cooler idle) heats the enclosure.

use serde::{Deserialize, Serialize};

use crate::domain::{SimulationError, ThermalParameters};

/// Converts J to the kJ units of the specific heat capacity
const ENERGY_UNIT_SCALE: f64 = 1000.0;

/// Intermediate quantities of one thermal step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyBalance {
    /// Ambient exchange this step (J)
    pub external_energy: f64,
    /// Energy removed by the actuator this step (J)
    pub actuator_energy: f64,
    /// Combined energy in heat-capacity units (kJ)
    pub total_energy: f64,
    /// Temperature drop this step (°C)
    pub temperature_change: f64,
    /// Temperature at the next sample (°C)
    pub next_temperature_c: f64,
}

/// Evaluate the energy balance of one step
pub fn energy_balance(
    current_temperature_c: f64,
    actuator_output_percent: f64,
    params: &ThermalParameters,
    sample_time: f64,
) -> EnergyBalance {
    let external_energy = params.conductivity
        * params.surface_area_m2
        * (current_temperature_c - params.ambient_temperature_c);

    let actuator_energy =
        params.max_actuator_energy_per_step * (actuator_output_percent / 100.0) * sample_time;

    let total_energy = (actuator_energy + external_energy) / ENERGY_UNIT_SCALE;
    let temperature_change = total_energy / params.heat_capacity();

    EnergyBalance {
        external_energy,
        actuator_energy,
        total_energy,
        temperature_change,
        next_temperature_c: current_temperature_c - temperature_change,
    }
}

/// Temperature at the next sample
pub fn step(
    current_temperature_c: f64,
    actuator_output_percent: f64,
    params: &ThermalParameters,
    sample_time: f64,
) -> f64 {
    energy_balance(
        current_temperature_c,
        actuator_output_percent,
        params,
        sample_time,
    )
    .next_temperature_c
}

/// Thermal model bound to validated parameters and a sample time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalModel {
    params: ThermalParameters,
    sample_time: f64,
}

impl ThermalModel {
    pub fn new(params: ThermalParameters, sample_time: f64) -> Result<Self, SimulationError> {
        params.check()?;
        if !(sample_time.is_finite() && sample_time > 0.0) {
            return Err(SimulationError::invalid(format!(
                "sample_time must be positive and finite, got {sample_time}"
            )));
        }
        Ok(Self {
            params,
            sample_time,
        })
    }

    pub fn energy_balance(&self, current_temperature_c: f64, output_percent: f64) -> EnergyBalance {
        energy_balance(
            current_temperature_c,
            output_percent,
            &self.params,
            self.sample_time,
        )
    }

    pub fn step(&self, current_temperature_c: f64, output_percent: f64) -> f64 {
        step(
            current_temperature_c,
            output_percent,
            &self.params,
            self.sample_time,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_thermal_equilibrium_is_fixed_point() {
        let params = ThermalParameters::default();
        let next = step(params.ambient_temperature_c, 0.0, &params, 0.1);
        assert_eq!(next, params.ambient_temperature_c);
    }

    #[test]
    fn test_thermal_full_output_cools() {
        let params = ThermalParameters::default();
        let balance = energy_balance(20.0, 100.0, &params, 0.1);

        // 7740 J/min for 0.1 min
        assert!((balance.actuator_energy - 774.0).abs() < 1e-9);
        assert_eq!(balance.external_energy, 0.0);
        assert!((balance.total_energy - 0.774).abs() < 1e-12);
        assert!((balance.temperature_change - 0.774 / 866.88).abs() < 1e-12);
        assert!(balance.next_temperature_c < 20.0);
    }

    #[test]
    fn test_thermal_external_energy_sign() {
        let params = ThermalParameters::default();

        let warm = energy_balance(25.0, 0.0, &params, 0.1);
        assert!((warm.external_energy - 0.03 * 1.4136 * 5.0).abs() < 1e-12);
        assert!(warm.next_temperature_c < 25.0);

        let cold = energy_balance(15.0, 0.0, &params, 0.1);
        assert!(cold.external_energy < 0.0);
        assert!(cold.next_temperature_c > 15.0);
    }

    #[test]
    fn test_thermal_model_rejects_invalid_parameters() {
        let params = ThermalParameters {
            specific_heat_capacity: 0.0,
            ..Default::default()
        };
        assert!(ThermalModel::new(params, 0.1).is_err());
        assert!(ThermalModel::new(ThermalParameters::default(), 0.0).is_err());
    }

    #[test]
    fn test_thermal_model_matches_free_function() {
        let params = ThermalParameters::default();
        let model = ThermalModel::new(params, 0.1).unwrap();
        assert_eq!(model.step(21.5, 37.0), step(21.5, 37.0, &params, 0.1));
    }

    proptest! {
        #[test]
        fn prop_more_output_means_colder(
            current in -20.0f64..60.0,
            low in 0.0f64..50.0,
            extra in 0.1f64..50.0,
        ) {
            let params = ThermalParameters::default();
            let a = step(current, low, &params, 0.1);
            let b = step(current, low + extra, &params, 0.1);
            prop_assert!(b < a);
        }
    }
}
