/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
use crate::errors::ConfigError;
use crate::fracture_calc::FractureCalculationData;
use crate::macrofracture_data::MacrofractureData;
use crate::mech::{BartonBandisParams, MechanicalProperties};

/// The implicit-population life cycle of one dip set:
/// `NotActivated -> Growing -> ResidualActivity`, or `Growing ->
/// Deactivated` directly. Transition guards are evaluated once per timestep
/// in [`FractureDipSet::advance_timestep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FractureEvolutionStage {
    NotActivated,
    Growing,
    ResidualActivity,
    Deactivated,
}

/// Aperture-model parameters: a dynamic
/// (stress-independent, geometric) power-law aperture plus an optional
/// Barton-Bandis mechanical closure correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApertureParams {
    pub dynamic_aperture_coefficient: f64,
    pub dynamic_aperture_exponent: f64,
    pub barton_bandis: Option<BartonBandisParams>,
}

impl ApertureParams {
    pub fn new(dynamic_aperture_coefficient: f64, dynamic_aperture_exponent: f64) -> Result<Self, ConfigError> {
        if dynamic_aperture_coefficient <= 0.0 {
            return Err(ConfigError::InvalidRange { field: "dynamic_aperture_coefficient" });
        }
        Ok(Self {
            dynamic_aperture_coefficient,
            dynamic_aperture_exponent,
            barton_bandis: None,
        })
    }

    pub fn with_barton_bandis(mut self, bb: BartonBandisParams) -> Self {
        self.barton_bandis = Some(bb);
        self
    }

    /// Geometric dynamic aperture for a macrofracture of the given
    /// half-length: `a = c * (2L)^n`, the standard power-law form relating
    /// aperture to fracture length.
    pub fn dynamic_aperture(&self, half_length_m: f64) -> f64 {
        self.dynamic_aperture_coefficient * (2.0 * half_length_m).powf(self.dynamic_aperture_exponent)
    }

    /// Combines the geometric aperture with Barton-Bandis mechanical closure
    /// under the given effective normal stress, when a closure model is
    /// configured; otherwise returns the geometric aperture unmodified.
    pub fn aperture_under_stress(&self, half_length_m: f64, effective_normal_stress_pa: f64) -> f64 {
        let geometric = self.dynamic_aperture(half_length_m);
        match &self.barton_bandis {
            Some(bb) => (geometric - bb.closure_under_normal_stress(effective_normal_stress_pa)).max(0.0),
            None => geometric,
        }
    }
}

/// One dip-set population sharing a dip direction and angle:
/// the time-indexed history of [`FractureCalculationData`], the current
/// [`MacrofractureData`] distribution, the evolution stage, and aperture
/// parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FractureDipSet {
    dip_rad: f64,
    aperture: ApertureParams,
    stage: FractureEvolutionStage,
    history: Vec<FractureCalculationData>,
    macrofracture_data: MacrofractureData,
    activation_threshold_pa: f64,
    min_clear_zone_volume: f64,
    termination_ratio_cum_a_mfp33: f64,
    termination_ratio_active_total_mfp30: f64,
}

/// Inputs the gridblock supplies to [`FractureDipSet::advance_timestep`]
/// each step: the mechanical driving-stress components and the
/// cross-set coupling terms from every other dip set in the block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrivingStressInput {
    pub driving_stress_const_pa: f64,
    pub driving_stress_rate_pa_per_s: f64,
    pub effective_normal_stress_pa: f64,
    pub psi_other: f64,
    pub chi_other: f64,
    /// The inverse-stress-shadow-volume contribution projected from every
    /// other active dip set in the block, used to derive this set's own
    /// clear-zone volume before its own nucleation/propagation shrinks it
    /// further this step.
    pub other_sets_exclusion_pa32: f64,
}

impl FractureDipSet {
    pub fn new(dip_rad: f64, aperture: ApertureParams) -> Result<Self, ConfigError> {
        if !(0.0..=std::f64::consts::PI).contains(&dip_rad) {
            return Err(ConfigError::InvalidRange { field: "dip_rad" });
        }
        Ok(Self {
            dip_rad,
            aperture,
            stage: FractureEvolutionStage::NotActivated,
            history: Vec::new(),
            macrofracture_data: MacrofractureData::new(),
            activation_threshold_pa: 0.0,
            min_clear_zone_volume: 0.01,
            termination_ratio_cum_a_mfp33: 1.0e-3,
            termination_ratio_active_total_mfp30: 1.0e-3,
        })
    }

    pub fn with_termination_criteria(
        mut self,
        activation_threshold_pa: f64,
        min_clear_zone_volume: f64,
        termination_ratio_cum_a_mfp33: f64,
        termination_ratio_active_total_mfp30: f64,
    ) -> Self {
        self.activation_threshold_pa = activation_threshold_pa;
        self.min_clear_zone_volume = min_clear_zone_volume.clamp(0.0, 1.0);
        self.termination_ratio_cum_a_mfp33 = termination_ratio_cum_a_mfp33;
        self.termination_ratio_active_total_mfp30 = termination_ratio_active_total_mfp30;
        self
    }

    pub fn dip_rad(&self) -> f64 {
        self.dip_rad
    }
    pub fn stage(&self) -> FractureEvolutionStage {
        self.stage
    }
    pub fn history(&self) -> &[FractureCalculationData] {
        &self.history
    }
    pub fn macrofracture_data(&self) -> &MacrofractureData {
        &self.macrofracture_data
    }
    pub fn aperture(&self) -> &ApertureParams {
        &self.aperture
    }

    pub fn latest(&self) -> Option<&FractureCalculationData> {
        self.history.last()
    }

    fn is_finished_growing(&self) -> bool {
        matches!(self.stage, FractureEvolutionStage::ResidualActivity | FractureEvolutionStage::Deactivated)
    }

    /// Advances this dip set by one timestep of `dt_s` seconds, given the
    /// block's mechanical properties and this step's driving-stress/coupling
    /// inputs: pulls the current stress/strain (via `input`), solves for the
    /// `u`/`v` driving
    /// stress components (passed in pre-solved by the gridblock, which owns
    /// the tensor algebra), integrates micro/macrofracture density across the
    /// step, evaluates stress-shadow widths, updates `theta`/`theta_prime`,
    /// and updates the deactivation probabilities — then evaluates the stage
    /// transition guards.
    pub fn advance_timestep(&mut self, mech: &MechanicalProperties, input: DrivingStressInput, dt_s: f64) -> &FractureCalculationData {
        let m_index = self.history.len();
        let start_time = self.history.last().map(|d| d.end_time_s()).unwrap_or(0.0);
        let mut data = FractureCalculationData::new(self.history.last(), m_index, start_time, dt_s);

        if self.is_finished_growing() {
            data.set_dynamic_data(input.driving_stress_const_pa, input.driving_stress_rate_pa_per_s, input.effective_normal_stress_pa, 0.0, mech.is_critical_subcritical_index() || mech.subcritical_index < 2.0);
            data.integrate_gamma();
            data.set_propagation_rate(0.0);
            data.set_density_increment(0.0, 0.0, 0.0, 0.0, 0.0);
            data.set_stress_shadow(data.theta(), data.theta_prime(), input.psi_other, input.chi_other);
            data.set_deactivation_probabilities(1.0, 1.0);
            data.deactivate();
            self.history.push(data);
            return self.history.last().unwrap();
        }

        let sigma_d = input.driving_stress_const_pa.max(0.0);
        if matches!(self.stage, FractureEvolutionStage::NotActivated) && sigma_d > self.activation_threshold_pa {
            self.stage = FractureEvolutionStage::Growing;
        }

        let gamma = if matches!(self.stage, FractureEvolutionStage::Growing) {
            mech.alpha_mf() * sigma_d.powf(mech.subcritical_index)
        } else {
            0.0
        };
        data.set_dynamic_data(
            input.driving_stress_const_pa,
            input.driving_stress_rate_pa_per_s,
            input.effective_normal_stress_pa,
            gamma,
            mech.subcritical_index < 2.0,
        );
        data.integrate_gamma();
        data.set_propagation_rate(gamma);

        let d_a_mfp33 = gamma * dt_s;
        let h = mech.layer_thickness_m();
        let d_a_mfp32 = d_a_mfp33 / h;
        let prior_half_length = self.history.last().map(|d| d.half_length_m()).unwrap_or(1.0).max(1.0);
        let d_a_mfp30 = d_a_mfp32 / (2.0 * prior_half_length);
        data.set_density_increment(d_a_mfp30, 0.0, 0.0, d_a_mfp32, d_a_mfp33);

        let cum_p32 = data.cum_a_mfp32();
        let shadow_decay_constant = 4.0;
        let theta = (-shadow_decay_constant * cum_p32).exp();
        let own_exclusion = 1.0 - theta;
        let clear_zone = (1.0 - own_exclusion - input.other_sets_exclusion_pa32.min(1.0)).max(0.0);
        data.set_stress_shadow(theta, clear_zone.min(theta), input.psi_other, input.chi_other);

        let exclusion_rate = shadow_decay_constant * d_a_mfp32;
        let phi_ii = (-exclusion_rate).exp();
        let intersection_rate = 0.5 * shadow_decay_constant * d_a_mfp32 * input.chi_other.max(0.0);
        let phi_ij = (-intersection_rate).exp();
        data.set_deactivation_probabilities(phi_ii, phi_ij);

        if data.phi_ii() * data.phi_ij() < 1.0e-6 {
            self.stage = FractureEvolutionStage::ResidualActivity;
        } else if data.theta_prime() < self.min_clear_zone_volume {
            self.stage = FractureEvolutionStage::Deactivated;
        } else if data.cum_a_mfp33() > 0.0 && data.end_time_s() > 0.0 {
            // Historic-aMFP33 termination ratio: compare this step's
            // instantaneous growth rate against the growth rate averaged over
            // the set's whole history. A set whose current contribution has
            // fallen well below its historic average has effectively stopped
            // growing.
            let instantaneous_rate = d_a_mfp33 / dt_s.max(f64::MIN_POSITIVE);
            let historic_rate = data.cum_a_mfp33() / data.end_time_s();
            if historic_rate > 0.0 && instantaneous_rate / historic_rate < self.termination_ratio_cum_a_mfp33 {
                self.stage = FractureEvolutionStage::Deactivated;
            } else {
                let total = data.total_mfp30();
                if total > 0.0 && data.cum_a_mfp30() / total < self.termination_ratio_active_total_mfp30 {
                    self.stage = FractureEvolutionStage::Deactivated;
                }
            }
        } else {
            let total = data.total_mfp30();
            if total > 0.0 && data.cum_a_mfp30() / total < self.termination_ratio_active_total_mfp30 {
                self.stage = FractureEvolutionStage::Deactivated;
            }
        }

        self.macrofracture_data.add_bin(
            data.half_length_m().max(self.macrofracture_data.total().upper_half_length_m),
            d_a_mfp30,
            0.0,
            0.0,
            d_a_mfp32,
            0.0,
            0.0,
        );

        self.history.push(data);
        self.history.last().unwrap()
    }
}
