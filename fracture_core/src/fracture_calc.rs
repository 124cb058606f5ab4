/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */

/// One dip set's complete state snapshot for a single completed timestep
/// — the central per-timestep record the implicit calculator
/// produces and the explicit propagator consumes. Setters must be called in
/// the canonical order documented on each method: every setter that advances
/// a cumulative quantity caches the previous-step cumulative value before
/// writing the new instantaneous value, then derives `Cum_X_M = Cum_X_{M-1}
/// + delta X_M` (or, for `Cum_Phi`, the multiplicative survival update) so
/// the invariant always holds after the setter returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractureCalculationData {
    m_index: usize,
    start_time_s: f64,
    duration_s: f64,
    end_time_s: f64,

    driving_stress_const_pa: f64,
    driving_stress_rate_pa_per_s: f64,
    effective_normal_stress_pa: f64,

    gamma: f64,
    gamma_duration: f64,
    mean_propagation_rate_m_per_s: f64,
    half_length_m: f64,

    phi_ii: f64,
    phi_ij: f64,
    f_ii: f64,
    f_m: f64,

    theta: f64,
    theta_prime: f64,
    psi_other: f64,
    chi_other: f64,

    cum_a_mfp30: f64,
    cum_s_ii_mfp30: f64,
    cum_s_ij_mfp30: f64,
    cum_a_mfp32: f64,
    cum_a_mfp33: f64,
    cum_phi: f64,
    cum_gamma: f64,

    cum_a_mfp30_prev: f64,
    cum_s_ii_mfp30_prev: f64,
    cum_s_ij_mfp30_prev: f64,
    cum_a_mfp32_prev: f64,
    cum_a_mfp33_prev: f64,
    cum_phi_prev: f64,
    cum_gamma_prev: f64,
}

impl FractureCalculationData {
    /// Starts timestep `m_index`, carrying forward every cumulative quantity
    /// from `prev` (or zero/one, for the first timestep: `Cum_Phi` starts at
    /// 1 since it is a product of survival probabilities).
    pub fn new(prev: Option<&FractureCalculationData>, m_index: usize, start_time_s: f64, duration_s: f64) -> Self {
        let (cum_a30, cum_sii30, cum_sij30, cum_a32, cum_a33, cum_phi, cum_gamma) = match prev {
            Some(p) => (
                p.cum_a_mfp30,
                p.cum_s_ii_mfp30,
                p.cum_s_ij_mfp30,
                p.cum_a_mfp32,
                p.cum_a_mfp33,
                p.cum_phi,
                p.cum_gamma,
            ),
            None => (0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0),
        };
        Self {
            m_index,
            start_time_s,
            duration_s,
            end_time_s: start_time_s + duration_s,
            driving_stress_const_pa: 0.0,
            driving_stress_rate_pa_per_s: 0.0,
            effective_normal_stress_pa: 0.0,
            gamma: 0.0,
            gamma_duration: 0.0,
            mean_propagation_rate_m_per_s: 0.0,
            half_length_m: 0.0,
            phi_ii: 1.0,
            phi_ij: 1.0,
            f_ii: 0.0,
            f_m: 0.0,
            theta: prev.map(|p| p.theta).unwrap_or(1.0),
            theta_prime: prev.map(|p| p.theta_prime).unwrap_or(1.0),
            psi_other: 0.0,
            chi_other: 0.0,
            cum_a_mfp30: cum_a30,
            cum_s_ii_mfp30: cum_sii30,
            cum_s_ij_mfp30: cum_sij30,
            cum_a_mfp32: cum_a32,
            cum_a_mfp33: cum_a33,
            cum_phi,
            cum_gamma,
            cum_a_mfp30_prev: cum_a30,
            cum_s_ii_mfp30_prev: cum_sii30,
            cum_s_ij_mfp30_prev: cum_sij30,
            cum_a_mfp32_prev: cum_a32,
            cum_a_mfp33_prev: cum_a33,
            cum_phi_prev: cum_phi,
            cum_gamma_prev: cum_gamma,
        }
    }

    pub fn m_index(&self) -> usize {
        self.m_index
    }
    pub fn start_time_s(&self) -> f64 {
        self.start_time_s
    }
    pub fn duration_s(&self) -> f64 {
        self.duration_s
    }
    pub fn end_time_s(&self) -> f64 {
        self.end_time_s
    }

    /// `SetDynamicData(dt, sigma, gamma, v)`: records the driving-stress
    /// constant (`u`) and rate (`v`) components, the effective normal
    /// stress, and the propagation-rate coefficient `gamma_{1/beta}`. Does
    /// **not** touch any `Cum_*` field — reading `cum_gamma_prev()`
    /// immediately afterwards returns exactly what it returned before the
    /// call, for any inputs.
    ///
    /// `gamma_duration = gamma * dt`, signed by the subcritical-index class:
    /// negative when `b < 2`, positive when `b >= 2`. `is_b_below_two`
    /// selects the sign.
    pub fn set_dynamic_data(
        &mut self,
        driving_stress_const_pa: f64,
        driving_stress_rate_pa_per_s: f64,
        effective_normal_stress_pa: f64,
        gamma: f64,
        is_b_below_two: bool,
    ) {
        self.driving_stress_const_pa = driving_stress_const_pa;
        self.driving_stress_rate_pa_per_s = driving_stress_rate_pa_per_s;
        self.effective_normal_stress_pa = effective_normal_stress_pa;
        self.gamma = gamma;
        let magnitude = (gamma * self.duration_s).abs();
        self.gamma_duration = if is_b_below_two { -magnitude } else { magnitude };
    }

    pub fn cum_gamma_prev(&self) -> f64 {
        self.cum_gamma_prev
    }

    pub fn gamma_duration(&self) -> f64 {
        self.gamma_duration
    }

    /// Integrates `gamma` across the step into the cumulative weighted
    /// propagation measure: `Cum_Gamma_M = Cum_Gamma_{M-1} + gamma * dt`.
    /// Call after [`Self::set_dynamic_data`].
    pub fn integrate_gamma(&mut self) {
        self.cum_gamma = self.cum_gamma_prev + self.gamma * self.duration_s;
    }

    /// `halfLength_M = meanPropagationRate * dt`.
    pub fn set_propagation_rate(&mut self, mean_propagation_rate_m_per_s: f64) {
        self.mean_propagation_rate_m_per_s = mean_propagation_rate_m_per_s.max(0.0);
        self.half_length_m = self.mean_propagation_rate_m_per_s * self.duration_s;
    }

    /// Records this step's incremental macrofracture densities (active /
    /// static-stress-shadow / static-intersection P30, active P32, active
    /// P33) and derives the new cumulative values as
    /// `Cum_X_M = Cum_X_{M-1} + delta X_M`, clamped non-negative so a clearly
    /// erroneous negative increment from upstream cannot violate the
    /// monotone-non-decreasing invariant — geometric impossibilities are
    /// clamped silently.
    pub fn set_density_increment(
        &mut self,
        d_a_mfp30: f64,
        d_s_ii_mfp30: f64,
        d_s_ij_mfp30: f64,
        d_a_mfp32: f64,
        d_a_mfp33: f64,
    ) {
        self.cum_a_mfp30 = self.cum_a_mfp30_prev + d_a_mfp30.max(0.0);
        self.cum_s_ii_mfp30 = self.cum_s_ii_mfp30_prev + d_s_ii_mfp30.max(0.0);
        self.cum_s_ij_mfp30 = self.cum_s_ij_mfp30_prev + d_s_ij_mfp30.max(0.0);
        self.cum_a_mfp32 = self.cum_a_mfp32_prev + d_a_mfp32.max(0.0);
        self.cum_a_mfp33 = self.cum_a_mfp33_prev + d_a_mfp33.max(0.0);
    }

    /// Total macrofracture volumetric count density
    /// `MFP30 = aMFP30 + sII_MFP30 + sIJ_MFP30`.
    pub fn total_mfp30(&self) -> f64 {
        self.cum_a_mfp30 + self.cum_s_ii_mfp30 + self.cum_s_ij_mfp30
    }

    pub fn cum_a_mfp30(&self) -> f64 {
        self.cum_a_mfp30
    }
    pub fn cum_s_ii_mfp30(&self) -> f64 {
        self.cum_s_ii_mfp30
    }
    pub fn cum_s_ij_mfp30(&self) -> f64 {
        self.cum_s_ij_mfp30
    }
    pub fn cum_a_mfp32(&self) -> f64 {
        self.cum_a_mfp32
    }
    pub fn cum_a_mfp33(&self) -> f64 {
        self.cum_a_mfp33
    }

    /// Stress-shadow geometry: `theta` (inverse stress-shadow volume) and
    /// `theta_prime` (clear-zone volume), plus the cross-set terms
    /// `psi_other`/`chi_other` satisfying `theta_allFS = max(theta -
    /// psi_other, 0)` (exposed via [`Self::theta_all_fracture_sets`]).
    /// `theta`/`theta_prime` are clamped to `[0, 1]`, `theta_prime` is
    /// additionally capped at `theta`, and both are capped at their
    /// previous-step value so they can only shrink across time, enforcing
    /// the monotonicity invariant at the setter boundary.
    pub fn set_stress_shadow(&mut self, theta: f64, theta_prime: f64, psi_other: f64, chi_other: f64) {
        let theta = theta.clamp(0.0, 1.0).min(self.theta);
        let theta_prime = theta_prime.clamp(0.0, theta).min(self.theta_prime);
        self.theta = theta;
        self.theta_prime = theta_prime;
        self.psi_other = psi_other.max(0.0);
        self.chi_other = chi_other.max(0.0);
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }
    pub fn theta_prime(&self) -> f64 {
        self.theta_prime
    }
    pub fn psi_other(&self) -> f64 {
        self.psi_other
    }
    pub fn chi_other(&self) -> f64 {
        self.chi_other
    }

    pub fn theta_all_fracture_sets(&self) -> f64 {
        (self.theta - self.psi_other).max(0.0)
    }

    /// Deactivation probabilities: `Phi_II` (stress-shadow) and `Phi_IJ`
    /// (intersection), each clamped to `[0, 1]`. Derives the instantaneous
    /// stress-shadow deactivation rate `F_II = -ln(Phi_II) / dt` and the mean
    /// deactivation rate `F_M = (1 - Phi_II * Phi_IJ) / dt`, then updates
    /// `Cum_Phi_M = Cum_Phi_{M-1} * Phi_II * Phi_IJ`, the multiplicative
    /// cumulative-survival update, which is monotone non-increasing for any
    /// `Phi_II, Phi_IJ` in `[0, 1]`.
    pub fn set_deactivation_probabilities(&mut self, phi_ii: f64, phi_ij: f64) {
        let phi_ii = phi_ii.clamp(0.0, 1.0);
        let phi_ij = phi_ij.clamp(0.0, 1.0);
        self.phi_ii = phi_ii;
        self.phi_ij = phi_ij;
        self.f_ii = if phi_ii > 0.0 && self.duration_s > 0.0 {
            -phi_ii.ln() / self.duration_s
        } else {
            f64::INFINITY
        };
        self.f_m = if self.duration_s > 0.0 {
            (1.0 - phi_ii * phi_ij) / self.duration_s
        } else {
            0.0
        };
        self.cum_phi = self.cum_phi_prev * phi_ii * phi_ij;
    }

    pub fn phi_ii(&self) -> f64 {
        self.phi_ii
    }
    pub fn phi_ij(&self) -> f64 {
        self.phi_ij
    }
    pub fn f_ii(&self) -> f64 {
        self.f_ii
    }
    pub fn f_m(&self) -> f64 {
        self.f_m
    }
    pub fn cum_phi(&self) -> f64 {
        self.cum_phi
    }
    pub fn cum_gamma(&self) -> f64 {
        self.cum_gamma
    }
    pub fn mean_propagation_rate_m_per_s(&self) -> f64 {
        self.mean_propagation_rate_m_per_s
    }
    pub fn half_length_m(&self) -> f64 {
        self.half_length_m
    }
    pub fn driving_stress_const_pa(&self) -> f64 {
        self.driving_stress_const_pa
    }
    pub fn driving_stress_rate_pa_per_s(&self) -> f64 {
        self.driving_stress_rate_pa_per_s
    }
    pub fn effective_normal_stress_pa(&self) -> f64 {
        self.effective_normal_stress_pa
    }

    /// `SetEvolutionStage(Deactivated)`: forces propagation rate and gamma to
    /// zero and resets both deactivation probabilities to 1 (a deactivated
    /// set no longer propagates or deactivates further), while preserving
    /// `Cum_Phi` exactly — multiplying by 1 is a no-op on the product.
    pub fn deactivate(&mut self) {
        self.mean_propagation_rate_m_per_s = 0.0;
        self.half_length_m = 0.0;
        self.gamma = 0.0;
        self.gamma_duration = 0.0;
        self.phi_ii = 1.0;
        self.phi_ij = 1.0;
        self.f_ii = 0.0;
        self.f_m = 0.0;
        // cum_phi unchanged: cum_phi_prev * 1 * 1 == cum_phi_prev == cum_phi.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_first_step_cum_phi_starts_at_one() {
        let d = FractureCalculationData::new(None, 0, 0.0, 100.0);
        assert_eq!(d.cum_phi(), 1.0);
        assert_eq!(d.end_time_s(), 100.0);
    }

    #[test]
    fn test_end_time_equals_start_plus_duration() {
        let d0 = FractureCalculationData::new(None, 0, 0.0, 100.0);
        let d1 = FractureCalculationData::new(Some(&d0), 1, d0.end_time_s(), 50.0);
        assert_eq!(d1.start_time_s(), 100.0);
        assert_eq!(d1.end_time_s(), 150.0);
    }

    #[test]
    fn test_set_dynamic_data_does_not_touch_cum_gamma() {
        let d0 = FractureCalculationData::new(None, 0, 0.0, 10.0);
        let mut d1 = FractureCalculationData::new(Some(&d0), 1, 10.0, 10.0);
        let before = d1.cum_gamma_prev();
        d1.set_dynamic_data(1.0e6, 0.0, 2.0e6, 3.0, true);
        assert_eq!(d1.cum_gamma_prev(), before);
        d1.set_dynamic_data(9.0e9, -1.0, -2.0, 0.0, false);
        assert_eq!(d1.cum_gamma_prev(), before);
    }

    #[test]
    fn test_gamma_duration_sign_matches_b_class() {
        let mut below_two = FractureCalculationData::new(None, 0, 0.0, 10.0);
        below_two.set_dynamic_data(0.0, 0.0, 0.0, 5.0, true);
        assert!(below_two.gamma_duration() < 0.0);

        let mut above_two = FractureCalculationData::new(None, 0, 0.0, 10.0);
        above_two.set_dynamic_data(0.0, 0.0, 0.0, 5.0, false);
        assert!(above_two.gamma_duration() > 0.0);
    }

    #[test]
    fn test_density_increment_accumulates_and_total_matches_sum() {
        let d0 = FractureCalculationData::new(None, 0, 0.0, 10.0);
        let mut d1 = FractureCalculationData::new(Some(&d0), 1, 10.0, 10.0);
        d1.set_density_increment(1.0, 0.2, 0.1, 0.01, 0.001);
        assert_eq!(d1.total_mfp30(), d1.cum_a_mfp30() + d1.cum_s_ii_mfp30() + d1.cum_s_ij_mfp30());
        assert!((d1.total_mfp30() - 1.3).abs() < 1e-12);

        let mut d2 = FractureCalculationData::new(Some(&d1), 2, 20.0, 10.0);
        d2.set_density_increment(0.5, 0.0, 0.0, 0.0, 0.0);
        assert!(d2.total_mfp30() >= d1.total_mfp30());
    }

    #[test]
    fn test_negative_increment_clamped_preserves_monotonicity() {
        let d0 = FractureCalculationData::new(None, 0, 0.0, 10.0);
        let mut d1 = FractureCalculationData::new(Some(&d0), 1, 10.0, 10.0);
        d1.set_density_increment(-5.0, 0.0, 0.0, 0.0, 0.0);
        assert!(d1.total_mfp30() >= d0.total_mfp30());
    }

    #[test]
    fn test_stress_shadow_clamped_and_monotone() {
        let d0 = FractureCalculationData::new(None, 0, 0.0, 10.0);
        let mut d1 = FractureCalculationData::new(Some(&d0), 1, 10.0, 10.0);
        d1.set_stress_shadow(1.5, 2.0, 0.0, 0.0);
        assert!(d1.theta() <= 1.0);
        assert!(d1.theta_prime() <= d1.theta());

        let mut d2 = FractureCalculationData::new(Some(&d1), 2, 20.0, 10.0);
        d2.set_stress_shadow(0.9, 0.9, 0.0, 0.0);
        assert!(d2.theta() <= d1.theta());
        let mut d3 = FractureCalculationData::new(Some(&d2), 3, 30.0, 10.0);
        d3.set_stress_shadow(0.99, 0.99, 0.0, 0.0);
        // monotone non-increasing even though the raw input increased
        assert!(d3.theta() <= d2.theta());
    }

    #[test]
    fn test_deactivation_probabilities_shrink_cum_phi() {
        let d0 = FractureCalculationData::new(None, 0, 0.0, 10.0);
        let mut d1 = FractureCalculationData::new(Some(&d0), 1, 10.0, 10.0);
        d1.set_deactivation_probabilities(0.9, 0.8);
        assert!((d1.cum_phi() - 0.72).abs() < 1e-12);
        assert!(d1.cum_phi() <= d0.cum_phi());
        assert!((0.0..=1.0).contains(&(d1.phi_ii() * d1.phi_ij())));
    }

    #[test]
    fn test_deactivate_zeroes_propagation_but_preserves_cum_phi() {
        let d0 = FractureCalculationData::new(None, 0, 0.0, 10.0);
        let mut d1 = FractureCalculationData::new(Some(&d0), 1, 10.0, 10.0);
        d1.set_deactivation_probabilities(0.5, 0.5);
        let cum_phi_before = d1.cum_phi();
        d1.set_propagation_rate(3.0);
        d1.deactivate();
        assert_eq!(d1.mean_propagation_rate_m_per_s(), 0.0);
        assert_eq!(d1.half_length_m(), 0.0);
        assert_eq!(d1.cum_phi(), cum_phi_before);
    }

    #[test]
    fn test_copy_equals_self() {
        let d0 = FractureCalculationData::new(None, 0, 0.0, 10.0);
        let mut d1 = FractureCalculationData::new(Some(&d0), 1, 10.0, 10.0);
        d1.set_dynamic_data(1.0, 2.0, 3.0, 4.0, true);
        let copy = d1;
        assert_eq!(copy, d1);
    }

    #[test]
    fn test_propagation_rate_drives_half_length() {
        let d0 = FractureCalculationData::new(None, 0, 0.0, 10.0);
        let mut d1 = FractureCalculationData::new(Some(&d0), 1, 10.0, 5.0);
        d1.set_propagation_rate(2.0);
        assert!((d1.half_length_m() - 10.0).abs() < 1e-12);
    }
}
