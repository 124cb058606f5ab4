/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
use fracture_tensor::Compliance4;

use crate::errors::ConfigError;

/// Whether bulk strain relaxation, fracture-tip strain relaxation, neither,
/// or both are active for a gridblock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrainRelaxationCase {
    None,
    Uniform,
    FractureOnly,
}

/// Barton-Bandis joint-aperture parameters, used to convert
/// stress-shadow-cleared fracture geometry into a mechanical
/// (stress-dependent) aperture rather than a purely geometric one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BartonBandisParams {
    pub jrc: f64,
    pub ucs_ratio: f64,
    pub initial_normal_stiffness: f64,
    pub max_closure_m: f64,
    pub initial_normal_stress_pa: f64,
}

impl BartonBandisParams {
    pub fn new(
        jrc: f64,
        ucs_ratio: f64,
        initial_normal_stiffness: f64,
        max_closure_m: f64,
        initial_normal_stress_pa: f64,
    ) -> Result<Self, ConfigError> {
        if jrc < 0.0 {
            return Err(ConfigError::NegativeValue { field: "jrc" });
        }
        if initial_normal_stiffness <= 0.0 {
            return Err(ConfigError::InvalidRange { field: "initial_normal_stiffness" });
        }
        if max_closure_m <= 0.0 {
            return Err(ConfigError::InvalidRange { field: "max_closure_m" });
        }
        Ok(Self {
            jrc,
            ucs_ratio,
            initial_normal_stiffness,
            max_closure_m,
            initial_normal_stress_pa,
        })
    }

    /// Hyperbolic Barton-Bandis closure under an effective normal stress
    /// increment above the initial state: `dV = (sigma_n' * V_m) / (K_ni *
    /// V_m + sigma_n')`, the standard BB closure law, clamped so closure
    /// never exceeds `max_closure_m`.
    pub fn closure_under_normal_stress(&self, effective_normal_stress_pa: f64) -> f64 {
        let delta_sigma = (effective_normal_stress_pa - self.initial_normal_stress_pa).max(0.0);
        if delta_sigma <= 0.0 {
            return 0.0;
        }
        let denom = self.initial_normal_stiffness * self.max_closure_m + delta_sigma;
        (delta_sigma * self.max_closure_m / denom).min(self.max_closure_m)
    }
}

/// Mechanical, fracture-toughness and aperture properties of one gridblock.
/// `E`/`nu`/`biot` drive the isotropic compliance; `g_c`
/// derives fracture toughness; `b` (subcritical index) derives the
/// propagation exponent `beta` and feeds the micro/macro propagation
/// constants `alpha_uf`/`alpha_mf`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MechanicalProperties {
    pub young_modulus_pa: f64,
    pub poisson_ratio: f64,
    pub biot_coefficient: f64,
    pub crack_surface_energy: f64,
    pub friction_coefficient: f64,
    pub subcritical_index: f64,
    pub critical_propagation_rate: f64,
    pub strain_relaxation_case: StrainRelaxationCase,
    pub bulk_relaxation_time_s: f64,
    pub fracture_relaxation_time_s: f64,
    layer_thickness_m: f64,
}

impl MechanicalProperties {
    pub fn new(
        young_modulus_pa: f64,
        poisson_ratio: f64,
        biot_coefficient: f64,
        crack_surface_energy: f64,
        friction_coefficient: f64,
        subcritical_index: f64,
        critical_propagation_rate: f64,
        layer_thickness_m: f64,
    ) -> Result<Self, ConfigError> {
        if young_modulus_pa <= 0.0 {
            return Err(ConfigError::InvalidRange { field: "young_modulus_pa" });
        }
        if !(-1.0..1.0).contains(&poisson_ratio) {
            return Err(ConfigError::InvalidRange { field: "poisson_ratio" });
        }
        if crack_surface_energy <= 0.0 {
            return Err(ConfigError::InvalidRange { field: "crack_surface_energy" });
        }
        if subcritical_index <= 0.0 {
            return Err(ConfigError::InvalidRange { field: "subcritical_index" });
        }
        if layer_thickness_m <= 0.0 {
            return Err(ConfigError::InvalidRange { field: "layer_thickness_m" });
        }
        Ok(Self {
            young_modulus_pa,
            poisson_ratio,
            biot_coefficient,
            crack_surface_energy,
            friction_coefficient,
            subcritical_index,
            critical_propagation_rate,
            strain_relaxation_case: StrainRelaxationCase::None,
            bulk_relaxation_time_s: 0.0,
            fracture_relaxation_time_s: 0.0,
            layer_thickness_m,
        })
    }

    pub fn with_strain_relaxation(
        mut self,
        case: StrainRelaxationCase,
        bulk_relaxation_time_s: f64,
        fracture_relaxation_time_s: f64,
    ) -> Self {
        self.strain_relaxation_case = case;
        self.bulk_relaxation_time_s = bulk_relaxation_time_s;
        self.fracture_relaxation_time_s = fracture_relaxation_time_s;
        self
    }

    pub fn isotropic_compliance(&self) -> Compliance4 {
        Compliance4::isotropic(self.young_modulus_pa, self.poisson_ratio)
    }

    /// `K_c = sqrt(G_c * E / (1 - nu^2))` (plane-strain fracture toughness).
    pub fn fracture_toughness(&self) -> f64 {
        (self.crack_surface_energy * self.young_modulus_pa
            / (1.0 - self.poisson_ratio * self.poisson_ratio))
            .sqrt()
    }

    /// `beta = 2 / (2 - b)`, the propagation-rate exponent. The `b = 2` case
    /// is special: beta is undefined (division by zero), and the
    /// exponential-growth regime is handled by callers via
    /// [`MechanicalProperties::is_critical_subcritical_index`].
    pub fn beta(&self) -> Option<f64> {
        if self.is_critical_subcritical_index() {
            None
        } else {
            Some(2.0 / (2.0 - self.subcritical_index))
        }
    }

    pub fn is_critical_subcritical_index(&self) -> bool {
        (self.subcritical_index - 2.0).abs() < 1e-12
    }

    /// Microfracture propagation constant
    /// `alpha_uF = A * (2 / (sqrt(pi) * K_c))^b`.
    pub fn alpha_uf(&self) -> f64 {
        let k_c = self.fracture_toughness();
        self.critical_propagation_rate
            * (2.0 / (std::f64::consts::PI.sqrt() * k_c)).powf(self.subcritical_index)
    }

    /// Macrofracture propagation constant
    /// `alpha_MF = A * (sqrt(2h) / (sqrt(pi) * K_c))^b`, where `h` is the
    /// layer thickness supplied at construction.
    pub fn alpha_mf(&self) -> f64 {
        let k_c = self.fracture_toughness();
        self.critical_propagation_rate
            * ((2.0 * self.layer_thickness_m).sqrt() / (std::f64::consts::PI.sqrt() * k_c))
                .powf(self.subcritical_index)
    }

    pub fn layer_thickness_m(&self) -> f64 {
        self.layer_thickness_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props() -> MechanicalProperties {
        MechanicalProperties::new(1.0e10, 0.25, 1.0, 1000.0, 0.5, 3.0, 2000.0, 100.0).unwrap()
    }

    #[test]
    fn test_rejects_non_positive_young_modulus() {
        assert_eq!(
            MechanicalProperties::new(0.0, 0.25, 1.0, 1000.0, 0.5, 3.0, 2000.0, 100.0).unwrap_err(),
            ConfigError::InvalidRange { field: "young_modulus_pa" }
        );
    }

    #[test]
    fn test_fracture_toughness_matches_closed_form() {
        let p = props();
        let expected = (1000.0 * 1.0e10 / (1.0 - 0.25 * 0.25)).sqrt();
        assert!((p.fracture_toughness() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_beta_formula_for_noncritical_b() {
        let p = props();
        assert!((p.beta().unwrap() - (2.0 / (2.0 - 3.0))).abs() < 1e-12);
    }

    #[test]
    fn test_beta_is_none_at_b_equals_two() {
        let p = MechanicalProperties::new(1.0e10, 0.25, 1.0, 1000.0, 0.5, 2.0, 2000.0, 100.0).unwrap();
        assert!(p.beta().is_none());
        assert!(p.is_critical_subcritical_index());
    }

    #[test]
    fn test_alpha_constants_are_positive() {
        let p = props();
        assert!(p.alpha_uf() > 0.0);
        assert!(p.alpha_mf() > 0.0);
        // thicker layers propagate macrofractures faster for fixed driving
        // stress, all else equal, since alpha_MF grows with sqrt(h).
        let thicker = MechanicalProperties::new(1.0e10, 0.25, 1.0, 1000.0, 0.5, 3.0, 2000.0, 400.0).unwrap();
        assert!(thicker.alpha_mf() > p.alpha_mf());
    }

    #[test]
    fn test_barton_bandis_closure_saturates_at_max() {
        let bb = BartonBandisParams::new(10.0, 0.5, 1.0e9, 1.0e-4, 0.0).unwrap();
        let closure_small = bb.closure_under_normal_stress(1.0e5);
        let closure_large = bb.closure_under_normal_stress(1.0e12);
        assert!(closure_small < closure_large);
        assert!(closure_large <= bb.max_closure_m);
    }

    #[test]
    fn test_barton_bandis_no_closure_below_initial_stress() {
        let bb = BartonBandisParams::new(10.0, 0.5, 1.0e9, 1.0e-4, 1.0e6).unwrap();
        assert_eq!(bb.closure_under_normal_stress(0.0), 0.0);
    }
}
