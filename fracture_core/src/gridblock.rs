/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
use std::cell::Cell;
use std::rc::Rc;

use fracture_tensor::SymTensor2;
use serde::{Deserialize, Serialize};

use crate::control::{DeformationEpisode, PropagationControl};
use crate::dipset::DrivingStressInput;
use crate::errors::CalculationError;
use crate::fracture_set::FractureSet;
use crate::localdfn::LocalDfn;
use crate::mech::MechanicalProperties;
use crate::stress::StressStrainState;

/// A point in 3D space, `z` positive-down — the ASCII export convention,
/// carried through the whole geometry model so cornerpoints need no sign
/// flip at the export boundary.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z_down: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z_down: f64) -> Self {
        Self { x, y, z_down }
    }
}

/// A gridblock's eight cornerpoints (four top, four bottom) shared with up to
/// two neighbours per edge: cornerpoints on shared boundaries are aliased to
/// the same owned point. `Rc<Cell<Point3>>` gives interior mutability
/// through a shared handle: editing one block's corner via its `Rc` clone
/// propagates to whichever neighbour shares it, the same way
/// `fracture_grid::Grid`'s `RefCell`-wrapped storage lets a shared grid
/// handle mutate through `&self` — `Cell` suffices here since `Point3` is
/// `Copy`.
pub type SharedCorner = Rc<Cell<Point3>>;

fn fresh_corner(p: Point3) -> SharedCorner {
    Rc::new(Cell::new(p))
}

/// One 2D-areal gridblock: mechanical properties, stress/strain
/// state, an ordered list of fracture sets, a local explicit DFN, the
/// per-block propagation control, and the eight cornerpoints.
#[derive(Debug, Clone)]
pub struct Gridblock {
    pub row: usize,
    pub col: usize,
    stress_strain: StressStrainState,
    mech: MechanicalProperties,
    fracture_sets: Vec<FractureSet>,
    local_dfn: LocalDfn,
    control: PropagationControl,
    top_corners: [SharedCorner; 4],
    bottom_corners: [SharedCorner; 4],
    vertical_stress_pa: f64,
    pore_pressure_pa: f64,
    cumulative_uplift_m: f64,
    mid_layer_depth_m: f64,
    current_episode: usize,
    current_time_s: f64,
    timestep_end_times_s: Vec<f64>,
    dfn_thickness_cutoff_activated: bool,
    iteration_cap_reached: bool,
}

/// `I`-strike, `J`-strike-normal, `K`-vertical block dimensions used to seed
/// the nucleation volume and the local-DFN IJK frame bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockDimensions {
    pub length_i_m: f64,
    pub length_j_m: f64,
}

impl Gridblock {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        row: usize,
        col: usize,
        mech: MechanicalProperties,
        control: PropagationControl,
        vertical_stress_pa: f64,
        pore_pressure_pa: f64,
        initial_stress_relaxation: f64,
        mid_layer_depth_m: f64,
        dims: BlockDimensions,
        top_corners: [Point3; 4],
        bottom_corners: [Point3; 4],
    ) -> Self {
        let mut stress_strain = StressStrainState::new();
        stress_strain.set_initial(&mech, vertical_stress_pa, pore_pressure_pa, initial_stress_relaxation);
        Self {
            row,
            col,
            stress_strain,
            mech,
            fracture_sets: Vec::new(),
            local_dfn: LocalDfn::new(dims.length_i_m, dims.length_j_m, mech.layer_thickness_m()),
            control,
            top_corners: top_corners.map(fresh_corner),
            bottom_corners: bottom_corners.map(fresh_corner),
            vertical_stress_pa,
            pore_pressure_pa,
            cumulative_uplift_m: 0.0,
            mid_layer_depth_m,
            current_episode: 0,
            current_time_s: 0.0,
            timestep_end_times_s: Vec::new(),
            dfn_thickness_cutoff_activated: false,
            iteration_cap_reached: false,
        }
    }

    pub fn push_fracture_set(&mut self, set: FractureSet) {
        self.fracture_sets.push(set);
    }

    pub fn fracture_sets(&self) -> &[FractureSet] {
        &self.fracture_sets
    }
    pub fn fracture_sets_mut(&mut self) -> &mut [FractureSet] {
        &mut self.fracture_sets
    }
    pub fn stress_strain(&self) -> &StressStrainState {
        &self.stress_strain
    }
    pub fn mech(&self) -> &MechanicalProperties {
        &self.mech
    }
    pub fn control(&self) -> &PropagationControl {
        &self.control
    }
    pub fn local_dfn(&self) -> &LocalDfn {
        &self.local_dfn
    }
    pub fn local_dfn_mut(&mut self) -> &mut LocalDfn {
        &mut self.local_dfn
    }
    pub fn current_time_s(&self) -> f64 {
        self.current_time_s
    }
    pub fn timestep_end_times_s(&self) -> &[f64] {
        &self.timestep_end_times_s
    }
    pub fn dfn_thickness_cutoff_activated(&self) -> bool {
        self.dfn_thickness_cutoff_activated
    }
    pub fn iteration_cap_reached(&self) -> bool {
        self.iteration_cap_reached
    }

    pub fn top_corner(&self, i: usize) -> Point3 {
        self.top_corners[i].get()
    }
    pub fn bottom_corner(&self, i: usize) -> Point3 {
        self.bottom_corners[i].get()
    }

    /// Shares this block's corner `i` (top if `top`, else bottom) with a
    /// neighbour's corner `j`, aliasing the two handles so a later edit
    /// through either propagates to both.
    pub fn alias_corner_with(&mut self, top: bool, i: usize, other: &mut Gridblock, j: usize) {
        if top {
            other.top_corners[j] = Rc::clone(&self.top_corners[i]);
        } else {
            other.bottom_corners[j] = Rc::clone(&self.bottom_corners[i]);
        }
    }

    /// Clones out the shared handle for corner `i`, for callers (such as
    /// `FractureGrid`) that cannot hold two blocks mutably at once and must
    /// instead read one block's handle and write it into another's.
    pub fn corner_rc(&self, top: bool, i: usize) -> SharedCorner {
        if top {
            Rc::clone(&self.top_corners[i])
        } else {
            Rc::clone(&self.bottom_corners[i])
        }
    }

    /// Overwrites corner `i` with an already-shared handle, completing the
    /// two-step aliasing `FractureGrid::alias_shared_edge` performs across
    /// the grid's single-cell-at-a-time interior mutability.
    pub fn set_corner_rc(&mut self, top: bool, i: usize, corner: SharedCorner) {
        if top {
            self.top_corners[i] = corner;
        } else {
            self.bottom_corners[i] = corner;
        }
    }

    /// Raised once by the grid when this block's thickness falls below
    /// `MinimumLayerThickness`: the block's explicit DFN is
    /// skipped from then on, but its implicit state keeps updating.
    pub fn mark_dfn_thickness_cutoff(&mut self) {
        self.dfn_thickness_cutoff_activated = true;
    }

    /// Mean vertical distance between top and bottom cornerpoints, adjusted
    /// by the vertical elastic strain accrued so far — thickness shrinks
    /// under compaction (`strain.zz < 0`) and grows under net extension.
    pub fn thickness_at_deformation(&self) -> f64 {
        let nominal: f64 = (0..4)
            .map(|i| self.bottom_corners[i].get().z_down - self.top_corners[i].get().z_down)
            .sum::<f64>()
            / 4.0;
        (nominal * (1.0 + self.stress_strain.total_strain.zz)).max(0.0)
    }

    /// Mid-layer depth at the current point in the deformation history:
    /// the construction-time mid-layer depth, reduced by cumulative uplift.
    pub fn depth_at_deformation(&self) -> f64 {
        (self.mid_layer_depth_m - self.cumulative_uplift_m).max(0.0)
    }

    /// Resolves a stress tensor's normal component onto a plane of the given
    /// strike azimuth and dip: `sigma_nn = n^T Sigma n`, the standard stress
    /// transformation used throughout fracture mechanics to project the
    /// regional stress state onto a candidate fracture plane.
    fn resolve_normal_stress(stress: &SymTensor2, strike_azimuth_rad: f64, dip_rad: f64) -> f64 {
        let strike_normal_azimuth = strike_azimuth_rad + std::f64::consts::FRAC_PI_2;
        let horizontal = dip_rad.sin();
        let n = [
            horizontal * strike_normal_azimuth.cos(),
            horizontal * strike_normal_azimuth.sin(),
            dip_rad.cos(),
        ];
        n[0] * n[0] * stress.xx
            + n[1] * n[1] * stress.yy
            + n[2] * n[2] * stress.zz
            + 2.0 * n[0] * n[1] * stress.xy
            + 2.0 * n[1] * n[2] * stress.yz
            + 2.0 * n[2] * n[0] * stress.zx
    }

    /// Driving stress on a dip set: the deviation of the mean effective
    /// stress from the stress resolved normal to the fracture plane — a
    /// fracture is driven open when its normal stress falls below the mean
    /// (local extension), matching the conventional driving-stress
    /// definition used by the implicit calculator. Solves for the constant
    /// (`u`) and rate (`v`) components of driving stress.
    fn driving_stress_components(&self, strike_azimuth_rad: f64, dip_rad: f64) -> (f64, f64, f64) {
        let sigma = self.stress_strain.effective_stress;
        let mean = sigma.trace() / 3.0;
        let sigma_nn = Self::resolve_normal_stress(&sigma, strike_azimuth_rad, dip_rad);
        let driving_const = (mean - sigma_nn).max(0.0);

        let rate = self.stress_strain.stress_rate;
        let mean_rate = rate.trace() / 3.0;
        let sigma_nn_rate = Self::resolve_normal_stress(&rate, strike_azimuth_rad, dip_rad);
        let driving_rate = mean_rate - sigma_nn_rate;

        (driving_const, driving_rate, sigma_nn)
    }

    /// Applies one deformation episode's rates to the stress/strain state's
    /// strain-rate and stress-rate tensors, selecting the horizontal strain
    /// components from the episode's min/max rate envelope and azimuth, with
    /// overpressure reducing effective vertical stress and stress-arching
    /// partitioning uplift-driven unloading between horizontal axes.
    fn apply_episode_rates(&mut self, episode: &DeformationEpisode) {
        let az = episode.min_strain_azimuth_rad;
        let (cos2, sin2) = (az.cos() * az.cos(), az.sin() * az.sin());
        let eps_xx = episode.min_horizontal_strain_rate_per_s * cos2 + episode.max_horizontal_strain_rate_per_s * sin2;
        let eps_yy = episode.min_horizontal_strain_rate_per_s * sin2 + episode.max_horizontal_strain_rate_per_s * cos2;
        self.stress_strain.strain_rate = SymTensor2::new(eps_xx, eps_yy, 0.0, 0.0, 0.0, 0.0);

        let arching = episode.stress_arching_factor;
        let uplift_unload_rate = -arching * self.mech.young_modulus_pa * 1.0e-11 * episode.uplift_rate_m_per_s;
        let overpressure_effect = -self.mech.biot_coefficient * episode.overpressure_rate_pa_per_s;
        self.stress_strain.stress_rate =
            SymTensor2::new(overpressure_effect + uplift_unload_rate, overpressure_effect + uplift_unload_rate, 0.0, 0.0, 0.0, 0.0);
    }

    /// Cross-set coupling: each set's effective stress is
    /// modified by the stress-shadow volumes of every other active set in
    /// the block. Returns the per-set `(psi_other, chi_other,
    /// other_sets_exclusion_pa32)` triple in fracture-set declaration order.
    /// The isotropic method (used when the spread of P32 across sets is
    /// below `anisotropy_cutoff`) treats overlaps by inclusion/exclusion —
    /// each set simply sees the sum of the others' exclusion fractions,
    /// capped at 1. The anisotropic method additionally perturbs a
    /// secondary set's exclusion by the primary (highest-P32) set's
    /// orientation difference, since a primary set's stress shadow
    /// preferentially suppresses sets it is near-parallel to.
    fn cross_set_coupling(&self) -> Vec<(f64, f64, f64)> {
        let p32: Vec<f64> = self
            .fracture_sets
            .iter()
            .flat_map(|fs| fs.dip_sets())
            .map(|ds| ds.latest().map(|d| d.cum_a_mfp32()).unwrap_or(0.0))
            .collect();
        let max_p32 = p32.iter().cloned().fold(0.0_f64, f64::max);
        let min_p32 = p32.iter().cloned().fold(f64::INFINITY, f64::min).min(max_p32);
        let anisotropic = max_p32 > 0.0 && (max_p32 - min_p32) / max_p32 > self.control.anisotropy_cutoff;

        let azimuths: Vec<f64> = self
            .fracture_sets
            .iter()
            .flat_map(|fs| std::iter::repeat(fs.strike_azimuth_rad()).take(fs.dip_sets().len()))
            .collect();
        let thetas: Vec<f64> = self
            .fracture_sets
            .iter()
            .flat_map(|fs| fs.dip_sets())
            .map(|ds| ds.latest().map(|d| d.theta()).unwrap_or(1.0))
            .collect();

        let n = thetas.len();
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let mut exclusion_sum = 0.0;
            let mut psi = 0.0;
            let mut chi = 0.0;
            for j in 0..n {
                if i == j {
                    continue;
                }
                let own_exclusion_j = 1.0 - thetas[j];
                let weight = if anisotropic {
                    let d_az = (azimuths[i] - azimuths[j]).abs();
                    let parallelism = d_az.cos().abs();
                    own_exclusion_j * parallelism
                } else {
                    own_exclusion_j
                };
                exclusion_sum += weight;
                psi += weight * 0.5;
                chi += weight * 0.25;
            }
            out.push((psi.min(1.0), chi.min(1.0), exclusion_sum.min(1.0)));
        }
        out
    }

    /// Advances every dip set of this block by one implicit timestep of
    /// `dt_s` seconds: pulls driving stress per set, applies
    /// cross-set coupling, then advances stress/strain by `dt_s`. Driving
    /// stress and cross-set coupling are both resolved against `&self`
    /// before the mutable walk over `fracture_sets`, since they need the
    /// whole block's state (other sets' orientations and latest stage) that
    /// a `&mut` borrow of one set would otherwise shadow.
    fn advance_one_timestep(&mut self, dt_s: f64) {
        let driving: Vec<(f64, f64, f64)> = self
            .fracture_sets
            .iter()
            .flat_map(|fs| fs.dip_sets().iter().map(move |ds| (fs.strike_azimuth_rad(), ds.dip_rad())))
            .map(|(strike, dip)| self.driving_stress_components(strike, dip))
            .collect();
        let coupling = self.cross_set_coupling();
        let mech = self.mech;

        let mut idx = 0;
        for set in self.fracture_sets.iter_mut() {
            for slot in 0..set.dip_sets().len() {
                let (driving_const, driving_rate, sigma_nn) = driving[idx];
                let (psi_other, chi_other, exclusion) = coupling[idx];
                idx += 1;
                let this_dip_set = &mut set.dip_sets_mut()[slot];
                this_dip_set.advance_timestep(
                    &mech,
                    DrivingStressInput {
                        driving_stress_const_pa: driving_const,
                        driving_stress_rate_pa_per_s: driving_rate,
                        effective_normal_stress_pa: sigma_nn,
                        psi_other,
                        chi_other,
                        other_sets_exclusion_pa32: exclusion,
                    },
                    dt_s,
                );
            }
        }
        self.stress_strain.update(dt_s);
        self.stress_strain.recalculate_effective_stress(&self.mech, self.vertical_stress_pa, self.pore_pressure_pa);
        self.current_time_s += dt_s;
        self.timestep_end_times_s.push(self.current_time_s);
    }

    /// Picks a timestep size obeying both accuracy caps:
    /// `dt <= maxTimestepDuration`, and (approximately, since the exact
    /// increase is only known after advancing) `dt` small enough that the
    /// active set's current propagation rate cannot exceed
    /// `max_TS_MFP33_increase` this step.
    fn choose_timestep(&self, remaining_s: f64) -> f64 {
        let mut dt = self.control.max_timestep_duration_s.min(remaining_s.max(0.0));
        for set in &self.fracture_sets {
            for ds in set.dip_sets() {
                if let Some(latest) = ds.latest() {
                    let gamma = latest.mean_propagation_rate_m_per_s();
                    if gamma > 0.0 {
                        let h = self.mech.layer_thickness_m();
                        let max_dt_for_set = self.control.max_ts_mfp33_increase * h / gamma.max(1e-300);
                        dt = dt.min(max_dt_for_set.max(1.0));
                    }
                }
            }
        }
        dt.max(1.0)
    }

    fn all_sets_deactivated(&self) -> bool {
        !self.fracture_sets.is_empty()
            && self
                .fracture_sets
                .iter()
                .flat_map(|fs| fs.dip_sets())
                .all(|ds| matches!(ds.stage(), crate::dipset::FractureEvolutionStage::Deactivated))
    }

    /// Runs one deformation episode to completion: loops timesteps until
    /// either the episode's fixed duration elapses, every dip set
    /// deactivates (relevant for auto-terminating episodes — a clean
    /// numerical termination, not an error), or `max_timesteps` is reached
    /// (iteration-cap: a warning, not fatal).
    pub fn run_episode(&mut self, episode: &DeformationEpisode) -> Result<(), CalculationError> {
        if self.fracture_sets.is_empty() {
            return Err(CalculationError::NoActiveFractureSet);
        }
        self.apply_episode_rates(episode);

        let start_time = self.current_time_s;
        let mut steps = 0usize;
        loop {
            if episode.duration_s >= 0.0 && self.current_time_s - start_time >= episode.duration_s {
                break;
            }
            if self.all_sets_deactivated() {
                break;
            }
            if steps >= self.control.max_timesteps as usize {
                self.iteration_cap_reached = true;
                log::warn!(
                    "gridblock ({}, {}) reached max_timesteps={} during episode {}",
                    self.row,
                    self.col,
                    self.control.max_timesteps,
                    self.current_episode
                );
                break;
            }
            let remaining = if episode.duration_s >= 0.0 {
                episode.duration_s - (self.current_time_s - start_time)
            } else {
                self.control.max_timestep_duration_s
            };
            let dt = self.choose_timestep(remaining);
            self.advance_one_timestep(dt);
            steps += 1;
        }
        self.current_episode += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::PropagationControl;
    use crate::dipset::{ApertureParams, FractureDipSet};
    use crate::fracture_set::FractureSet;
    use crate::time::TimeUnit;

    fn mech() -> MechanicalProperties {
        MechanicalProperties::new(1.0e10, 0.25, 1.0, 1000.0, 0.5, 3.0, 2000.0, 100.0).unwrap()
    }

    fn control() -> PropagationControl {
        PropagationControl::new(1.0e-3, 1.0e-3, 1.0e-3, 0.01, 200, 1.0e12, TimeUnit::Second).unwrap()
    }

    fn dims() -> BlockDimensions {
        BlockDimensions { length_i_m: 1000.0, length_j_m: 1000.0 }
    }

    fn square_corners(z_top: f64, z_bot: f64) -> ([Point3; 4], [Point3; 4]) {
        let top = [
            Point3::new(0.0, 0.0, z_top),
            Point3::new(1000.0, 0.0, z_top),
            Point3::new(0.0, 1000.0, z_top),
            Point3::new(1000.0, 1000.0, z_top),
        ];
        let bot = [
            Point3::new(0.0, 0.0, z_bot),
            Point3::new(1000.0, 0.0, z_bot),
            Point3::new(0.0, 1000.0, z_bot),
            Point3::new(1000.0, 1000.0, z_bot),
        ];
        (top, bot)
    }

    fn block_with_two_sets() -> Gridblock {
        let (top, bot) = square_corners(1950.0, 2050.0);
        let mut gb = Gridblock::new(0, 0, mech(), control(), 4.0e7, 1.0e7, 0.0, 2000.0, dims(), top, bot);
        let aperture = ApertureParams::new(1.0e-5, 0.5).unwrap();
        let mut set0 = FractureSet::new(0.0, [
            crate::fracture_set::PillarCentrepoint::new(0.0, 0.0, 0.0),
            crate::fracture_set::PillarCentrepoint::new(1000.0, 0.0, 0.0),
            crate::fracture_set::PillarCentrepoint::new(0.0, 1000.0, 0.0),
            crate::fracture_set::PillarCentrepoint::new(1000.0, 1000.0, 0.0),
        ])
        .unwrap();
        set0.push_dip_set(
            FractureDipSet::new(std::f64::consts::FRAC_PI_2, aperture)
                .unwrap()
                .with_termination_criteria(1.0e5, 0.01, 1.0e-4, 1.0e-4),
        );
        gb.push_fracture_set(set0);

        let mut set1 = FractureSet::new(std::f64::consts::FRAC_PI_2, [
            crate::fracture_set::PillarCentrepoint::new(0.0, 0.0, 0.0),
            crate::fracture_set::PillarCentrepoint::new(1000.0, 0.0, 0.0),
            crate::fracture_set::PillarCentrepoint::new(0.0, 1000.0, 0.0),
            crate::fracture_set::PillarCentrepoint::new(1000.0, 1000.0, 0.0),
        ])
        .unwrap();
        set1.push_dip_set(
            FractureDipSet::new(std::f64::consts::FRAC_PI_2, aperture)
                .unwrap()
                .with_termination_criteria(1.0e5, 0.01, 1.0e-4, 1.0e-4),
        );
        gb.push_fracture_set(set1);
        gb
    }

    #[test]
    fn test_thickness_at_deformation_matches_corner_spacing() {
        let gb = block_with_two_sets();
        assert!((gb.thickness_at_deformation() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_depth_at_deformation_starts_at_mid_layer_depth() {
        let gb = block_with_two_sets();
        assert!((gb.depth_at_deformation() - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_alias_corner_shares_edits_across_blocks() {
        let (top, bot) = square_corners(1950.0, 2050.0);
        let mut a = Gridblock::new(0, 0, mech(), control(), 4.0e7, 1.0e7, 0.0, 2000.0, dims(), top, bot);
        let (top2, bot2) = square_corners(1950.0, 2050.0);
        let mut b = Gridblock::new(0, 1, mech(), control(), 4.0e7, 1.0e7, 0.0, 2000.0, dims(), top2, bot2);
        a.alias_corner_with(true, 1, &mut b, 0);
        let moved = Point3::new(999.0, 0.0, 1900.0);
        a.top_corners[1].set(moved);
        assert_eq!(b.top_corner(0), moved);
    }

    #[test]
    fn test_run_episode_rejects_block_with_no_sets() {
        let (top, bot) = square_corners(1950.0, 2050.0);
        let mut gb = Gridblock::new(0, 0, mech(), control(), 4.0e7, 1.0e7, 0.0, 2000.0, dims(), top, bot);
        let ep = DeformationEpisode::new(-1.0e-14, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0e6, TimeUnit::Second, TimeUnit::Year)
            .unwrap();
        assert!(gb.run_episode(&ep).is_err());
    }

    #[test]
    fn test_run_episode_advances_time_and_publishes_timesteps() {
        let mut gb = block_with_two_sets();
        let ep = DeformationEpisode::new(-1.0e-13, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0e6, TimeUnit::Second, TimeUnit::Second)
            .unwrap();
        gb.run_episode(&ep).unwrap();
        assert!(!gb.timestep_end_times_s().is_empty());
        assert!((gb.current_time_s() - 1.0e6).abs() < 1.0);
    }

    #[test]
    fn test_run_episode_honours_max_timesteps_cap() {
        let mut ctrl = control();
        ctrl.max_timesteps = 2;
        ctrl.max_timestep_duration_s = 1.0;
        let (top, bot) = square_corners(1950.0, 2050.0);
        let mut gb = Gridblock::new(0, 0, mech(), ctrl, 4.0e7, 1.0e7, 0.0, 2000.0, dims(), top, bot);
        let aperture = ApertureParams::new(1.0e-5, 0.5).unwrap();
        let mut set0 = FractureSet::new(0.0, [
            crate::fracture_set::PillarCentrepoint::new(0.0, 0.0, 0.0),
            crate::fracture_set::PillarCentrepoint::new(1000.0, 0.0, 0.0),
            crate::fracture_set::PillarCentrepoint::new(0.0, 1000.0, 0.0),
            crate::fracture_set::PillarCentrepoint::new(1000.0, 1000.0, 0.0),
        ])
        .unwrap();
        set0.push_dip_set(FractureDipSet::new(std::f64::consts::FRAC_PI_2, aperture).unwrap());
        gb.push_fracture_set(set0);

        let ep = DeformationEpisode::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1000.0, TimeUnit::Second, TimeUnit::Second)
            .unwrap();
        gb.run_episode(&ep).unwrap();
        assert!(gb.iteration_cap_reached());
        assert_eq!(gb.timestep_end_times_s().len(), 2);
    }
}
