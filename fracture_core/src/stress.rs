/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
use fracture_tensor::{partial_invert_fixed_zz_isotropic, SymTensor2};

use crate::mech::MechanicalProperties;

/// How elastic strain is partitioned between host rock and fractures within
/// a gridblock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StressDistributionCase {
    EvenlyDistributed,
    StressShadow,
    DuctileBoundary,
}

/// Per-gridblock stress/strain tensors, rates, and the elastic-strain
/// partition across host rock and fractures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressStrainState {
    pub total_strain: SymTensor2,
    pub elastic_strain: SymTensor2,
    pub effective_stress: SymTensor2,
    pub strain_rate: SymTensor2,
    pub stress_rate: SymTensor2,
    pub distribution_case: StressDistributionCase,
}

impl StressStrainState {
    pub fn new() -> Self {
        Self {
            total_strain: SymTensor2::zero(),
            elastic_strain: SymTensor2::zero(),
            effective_stress: SymTensor2::zero(),
            strain_rate: SymTensor2::zero(),
            stress_rate: SymTensor2::zero(),
            distribution_case: StressDistributionCase::EvenlyDistributed,
        }
    }

    /// `SetInitial(sigma_v, P_f, initialRelaxation)`: resets elastic strain
    /// to lithostatic compaction (vertical effective stress `sigma_v -
    /// biot*P_f`, zero horizontal strain) plus a compaction-relaxation term
    /// scaled by `initial_relaxation in [0, 1]` that partially relaxes the
    /// horizontal effective stress built up by the vertical load towards
    /// isotropic (simulating long-term viscous equilibration before the
    /// deformation episodes begin).
    pub fn set_initial(
        &mut self,
        mech: &MechanicalProperties,
        vertical_stress_pa: f64,
        pore_pressure_pa: f64,
        initial_relaxation: f64,
    ) {
        let initial_relaxation = initial_relaxation.clamp(0.0, 1.0);
        let sigma_zz_eff = vertical_stress_pa - mech.biot_coefficient * pore_pressure_pa;
        let (strain, stress) =
            partial_invert_fixed_zz_isotropic(mech.young_modulus_pa, mech.poisson_ratio, 0.0, 0.0, sigma_zz_eff);

        // Unrelaxed horizontal stress is the K0 value from the partial
        // inversion; full relaxation drives it toward the isotropic mean.
        let mean = (stress.xx + stress.yy + sigma_zz_eff) / 3.0;
        let relaxed_xx = stress.xx + initial_relaxation * (mean - stress.xx);
        let relaxed_yy = stress.yy + initial_relaxation * (mean - stress.yy);

        self.effective_stress = SymTensor2::new(relaxed_xx, relaxed_yy, sigma_zz_eff, 0.0, 0.0, 0.0);
        self.elastic_strain = strain;
        self.total_strain = strain;
        self.strain_rate = SymTensor2::zero();
        self.stress_rate = SymTensor2::zero();
    }

    /// `Update(dt)`: advances total strain and effective stress by their
    /// current rates over one timestep of `dt` seconds.
    pub fn update(&mut self, dt_s: f64) {
        self.total_strain = self.total_strain + self.strain_rate.scale(dt_s);
        self.effective_stress = self.effective_stress + self.stress_rate.scale(dt_s);
    }

    /// `RecalculateEffectiveStress(S_bulk)`: partial-inversion holding
    /// `sigma_zz_eff = sigma_v - biot*P_f` fixed, solving for the in-plane
    /// stresses consistent with the current total horizontal strain. Uses
    /// the isotropic fast path since `fracture_core` only carries the
    /// isotropic compliance case for the host bulk (anisotropic compliance
    /// contributions enter only through the dip-set stress-shadow coupling,
    /// not this recalculation).
    pub fn recalculate_effective_stress(&mut self, mech: &MechanicalProperties, vertical_stress_pa: f64, pore_pressure_pa: f64) {
        let sigma_zz_eff = vertical_stress_pa - mech.biot_coefficient * pore_pressure_pa;
        let (strain, stress) = partial_invert_fixed_zz_isotropic(
            mech.young_modulus_pa,
            mech.poisson_ratio,
            self.total_strain.xx,
            self.total_strain.yy,
            sigma_zz_eff,
        );
        self.effective_stress = stress;
        self.elastic_strain = strain;
    }

    /// Splits the current elastic strain into a host-rock share and a
    /// fracture share according to `distribution_case`. `EvenlyDistributed`
    /// sends it all to the host (fractures carry no separate compliance
    /// share); `StressShadow` splits by the ratio `s_f / s_beff` of
    /// fracture-normal compliance to bulk-effective compliance; a
    /// `DuctileBoundary` block sends all elastic strain to the host since its
    /// boundary accommodates deformation plastically rather than through
    /// discrete fractures.
    pub fn elastic_strain_partition(&self, fracture_compliance_ratio_sf_sbeff: f64) -> (SymTensor2, SymTensor2) {
        match self.distribution_case {
            StressDistributionCase::EvenlyDistributed | StressDistributionCase::DuctileBoundary => {
                (self.elastic_strain, SymTensor2::zero())
            }
            StressDistributionCase::StressShadow => {
                let ratio = fracture_compliance_ratio_sf_sbeff.clamp(0.0, 1.0);
                (self.elastic_strain.scale(1.0 - ratio), self.elastic_strain.scale(ratio))
            }
        }
    }
}

impl Default for StressStrainState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mech() -> MechanicalProperties {
        MechanicalProperties::new(1.0e10, 0.25, 1.0, 1000.0, 0.5, 3.0, 2000.0, 100.0).unwrap()
    }

    #[test]
    fn test_set_initial_holds_vertical_effective_stress() {
        let mut s = StressStrainState::new();
        s.set_initial(&mech(), 4.0e7, 1.0e7, 0.0);
        assert!((s.effective_stress.zz - 3.0e7).abs() < 1e-6);
    }

    #[test]
    fn test_full_relaxation_makes_horizontal_stress_isotropic() {
        let mut s = StressStrainState::new();
        s.set_initial(&mech(), 4.0e7, 1.0e7, 1.0);
        assert!((s.effective_stress.xx - s.effective_stress.yy).abs() < 1e-3);
        let mean = (s.effective_stress.xx + s.effective_stress.yy + s.effective_stress.zz) / 3.0;
        assert!((s.effective_stress.xx - mean).abs() < 1.0);
    }

    #[test]
    fn test_update_integrates_rates() {
        let mut s = StressStrainState::new();
        s.strain_rate = SymTensor2::new(1.0e-14, 0.0, 0.0, 0.0, 0.0, 0.0);
        s.stress_rate = SymTensor2::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        s.update(100.0);
        assert!((s.total_strain.xx - 1.0e-12).abs() < 1e-20);
        assert!((s.effective_stress.xx - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_recalculate_effective_stress_matches_partial_invert() {
        let mut s = StressStrainState::new();
        s.total_strain = SymTensor2::new(1.0e-4, -2.0e-4, 0.0, 0.0, 0.0, 0.0);
        s.recalculate_effective_stress(&mech(), 4.0e7, 1.0e7);
        let (_, expected) =
            partial_invert_fixed_zz_isotropic(1.0e10, 0.25, 1.0e-4, -2.0e-4, 3.0e7);
        assert!((s.effective_stress.xx - expected.xx).abs() < 1e-3);
        assert_eq!(s.effective_stress.zz, 3.0e7);
    }

    #[test]
    fn test_evenly_distributed_partition_sends_all_to_host() {
        let mut s = StressStrainState::new();
        s.elastic_strain = SymTensor2::isotropic(1.0e-4);
        let (host, fractures) = s.elastic_strain_partition(0.9);
        assert_eq!(host, s.elastic_strain);
        assert_eq!(fractures, SymTensor2::zero());
    }

    #[test]
    fn test_stress_shadow_partition_splits_by_ratio() {
        let mut s = StressStrainState::new();
        s.distribution_case = StressDistributionCase::StressShadow;
        s.elastic_strain = SymTensor2::isotropic(1.0e-4);
        let (host, fractures) = s.elastic_strain_partition(0.3);
        assert!((host.xx - 0.7e-4).abs() < 1e-12);
        assert!((fractures.xx - 0.3e-4).abs() < 1e-12);
    }
}
