/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::stress::StressDistributionCase;
use crate::time::TimeUnit;

/// How neighbouring-gridblock segments are searched for interaction tests
/// during explicit propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NeighbourSearchMode {
    None,
    All,
    Automatic,
}

/// Output file format for DFN export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFileType {
    Ascii,
    Fab,
}

/// How intermediate DFN growth-stage snapshots are spaced through a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IntermediateOutputPolicy {
    SpecifiedTime(Vec<f64>),
    EqualTime(u32),
    EqualArea(u32),
}

/// One applied-deformation episode: horizontal strain-rate
/// envelope, overpressure/temperature/uplift rates, stress-arching, and
/// duration. All rate fields are stored already converted to SI
/// (per-second) units by the constructor; the caller's original `TimeUnit`
/// is not retained — everything downstream works in SI and never mixes
/// units internally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeformationEpisode {
    pub min_horizontal_strain_rate_per_s: f64,
    pub max_horizontal_strain_rate_per_s: f64,
    pub min_strain_azimuth_rad: f64,
    pub overpressure_rate_pa_per_s: f64,
    pub temperature_change_rate_k_per_s: f64,
    pub uplift_rate_m_per_s: f64,
    pub stress_arching_factor: f64,
    /// Duration in seconds; negative means "auto-terminate on fracture
    /// inactivity" rather than a fixed stop time.
    pub duration_s: f64,
}

impl DeformationEpisode {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        min_horizontal_strain_rate: f64,
        max_horizontal_strain_rate: f64,
        min_strain_azimuth_rad: f64,
        overpressure_rate: f64,
        temperature_change_rate: f64,
        uplift_rate: f64,
        stress_arching_factor: f64,
        duration: f64,
        rate_unit: TimeUnit,
        duration_unit: TimeUnit,
    ) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&stress_arching_factor) {
            return Err(ConfigError::InvalidRange { field: "stress_arching_factor" });
        }
        let azimuth = wrap_to_half_circle(min_strain_azimuth_rad);
        Ok(Self {
            min_horizontal_strain_rate_per_s: rate_unit.rate_to_per_second(min_horizontal_strain_rate),
            max_horizontal_strain_rate_per_s: rate_unit.rate_to_per_second(max_horizontal_strain_rate),
            min_strain_azimuth_rad: azimuth,
            overpressure_rate_pa_per_s: rate_unit.rate_to_per_second(overpressure_rate),
            temperature_change_rate_k_per_s: rate_unit.rate_to_per_second(temperature_change_rate),
            uplift_rate_m_per_s: rate_unit.rate_to_per_second(uplift_rate),
            stress_arching_factor,
            duration_s: duration_unit.duration_to_seconds(duration),
        })
    }

    pub fn auto_terminates(&self) -> bool {
        self.duration_s < 0.0
    }
}

/// Wraps an azimuth (radians) into `[0, pi)`, since strike and
/// minimum-strain azimuths are axes, not directed vectors.
pub fn wrap_to_half_circle(azimuth_rad: f64) -> f64 {
    let pi = std::f64::consts::PI;
    let wrapped = azimuth_rad.rem_euclid(pi);
    if wrapped < 0.0 {
        wrapped + pi
    } else {
        wrapped
    }
}

/// Per-block propagation configuration: calculation-detail
/// toggles, stress-distribution case, accuracy caps, termination ratios,
/// clear-zone minimum, aperture control, and the ordered deformation
/// episodes to apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationControl {
    pub full_population_distribution: bool,
    pub index_point_count: u32,
    pub stress_distribution_case: StressDistributionCase,
    pub max_ts_mfp33_increase: f64,
    pub termination_ratio_active_total_mfp30: f64,
    pub termination_ratio_cum_a_mfp33: f64,
    pub min_clear_zone_volume: f64,
    pub microfracture_bin_count: u32,
    pub anisotropy_cutoff: f64,
    pub max_timesteps: u32,
    pub max_timestep_duration_s: f64,
    pub episodes: Vec<DeformationEpisode>,
}

impl PropagationControl {
    pub fn new(
        max_ts_mfp33_increase: f64,
        termination_ratio_active_total_mfp30: f64,
        termination_ratio_cum_a_mfp33: f64,
        min_clear_zone_volume: f64,
        max_timesteps: u32,
        max_timestep_duration: f64,
        duration_unit: TimeUnit,
    ) -> Result<Self, ConfigError> {
        if max_ts_mfp33_increase <= 0.0 {
            return Err(ConfigError::InvalidRange { field: "max_ts_mfp33_increase" });
        }
        if !(0.0..=1.0).contains(&min_clear_zone_volume) {
            return Err(ConfigError::InvalidRange { field: "min_clear_zone_volume" });
        }
        if max_timesteps == 0 {
            return Err(ConfigError::InvalidRange { field: "max_timesteps" });
        }
        if max_timestep_duration <= 0.0 {
            return Err(ConfigError::InvalidRange { field: "max_timestep_duration" });
        }
        Ok(Self {
            full_population_distribution: true,
            index_point_count: 20,
            stress_distribution_case: StressDistributionCase::EvenlyDistributed,
            max_ts_mfp33_increase,
            termination_ratio_active_total_mfp30,
            termination_ratio_cum_a_mfp33,
            min_clear_zone_volume,
            microfracture_bin_count: 10,
            anisotropy_cutoff: 0.5,
            max_timesteps,
            max_timestep_duration_s: duration_unit.duration_to_seconds(max_timestep_duration),
            episodes: Vec::new(),
        })
    }

    pub fn with_episodes(mut self, episodes: Vec<DeformationEpisode>) -> Self {
        self.episodes = episodes;
        self
    }
}

/// Top-level DFN-generation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DfnGenerationControl {
    pub generate_explicit_dfn: bool,
    pub microfracture_dfn_minimum_radius_m: f64,
    pub macrofracture_dfn_minimum_length_m: f64,
    pub max_no_fractures: i64,
    pub minimum_layer_thickness_m: f64,
    pub max_consistency_angle_rad: f64,
    pub crop_to_grid: bool,
    pub link_fractures_in_stress_shadow: bool,
    pub number_of_uf_points: u32,
    pub number_of_intermediate_outputs: u32,
    pub intermediate_output_policy: IntermediateOutputPolicy,
    pub probabilistic_fracture_nucleation_limit: f64,
    pub search_neighbouring_gridblocks: NeighbourSearchMode,
    pub propagate_fractures_in_nucleation_order: bool,
    pub write_dfn_files: bool,
    pub output_file_type: OutputFileType,
    pub output_centrepoints: bool,
    pub folder_path: String,
    pub default_fracture_permeability: f64,
    pub default_fracture_compressibility: f64,
}

impl DfnGenerationControl {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        generate_explicit_dfn: bool,
        macrofracture_dfn_minimum_length_m: f64,
        max_no_fractures: i64,
        minimum_layer_thickness_m: f64,
        max_consistency_angle_rad: f64,
        intermediate_output_policy: IntermediateOutputPolicy,
    ) -> Result<Self, ConfigError> {
        if generate_explicit_dfn && max_no_fractures == 0 {
            return Err(ConfigError::MaxFracturesZeroWithExplicitDfn);
        }
        if minimum_layer_thickness_m < 0.0 {
            return Err(ConfigError::NegativeValue { field: "minimum_layer_thickness_m" });
        }
        if let IntermediateOutputPolicy::SpecifiedTime(times) = &intermediate_output_policy {
            if times.is_empty() {
                return Err(ConfigError::EmptyIntermediateOutputTimes);
            }
            if !times.windows(2).all(|w| w[0] < w[1]) {
                return Err(ConfigError::UnsortedIntermediateOutputTimes);
            }
        }
        Ok(Self {
            generate_explicit_dfn,
            microfracture_dfn_minimum_radius_m: 0.0,
            macrofracture_dfn_minimum_length_m,
            max_no_fractures,
            minimum_layer_thickness_m,
            max_consistency_angle_rad,
            crop_to_grid: true,
            link_fractures_in_stress_shadow: false,
            number_of_uf_points: 0,
            number_of_intermediate_outputs: 0,
            intermediate_output_policy,
            probabilistic_fracture_nucleation_limit: 1.0,
            search_neighbouring_gridblocks: NeighbourSearchMode::Automatic,
            propagate_fractures_in_nucleation_order: true,
            write_dfn_files: false,
            output_file_type: OutputFileType::Ascii,
            output_centrepoints: false,
            folder_path: String::new(),
            default_fracture_permeability: 0.0,
            default_fracture_compressibility: 0.0,
        })
    }

    /// Validates the narrower, compound case of negative (auto-terminating)
    /// episode duration combined with an explicit-DFN request and
    /// `maxNoFractures == 0` — this needs the episode list, so it is a
    /// separate check rather than folded into `new` (which does not see
    /// episodes).
    pub fn validate_against_episodes(&self, episodes: &[DeformationEpisode]) -> Result<(), ConfigError> {
        if self.generate_explicit_dfn && self.max_no_fractures == 0 && episodes.iter().any(|e| e.auto_terminates()) {
            return Err(ConfigError::NegativeDurationWithExplicitDfn);
        }
        Ok(())
    }

    pub fn dfn_disabled(&self) -> bool {
        self.macrofracture_dfn_minimum_length_m < 0.0
    }

    pub fn unlimited_fractures(&self) -> bool {
        self.max_no_fractures < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deformation_episode_converts_ma_to_seconds() {
        let ep = DeformationEpisode::new(-1.0e-14, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5, 1.0, TimeUnit::Second, TimeUnit::Ma)
            .unwrap();
        assert!((ep.duration_s - TimeUnit::Ma.duration_to_seconds(1.0)).abs() < 1.0);
    }

    #[test]
    fn test_deformation_episode_wraps_azimuth() {
        let ep = DeformationEpisode::new(
            0.0,
            0.0,
            std::f64::consts::PI + 0.1,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
            TimeUnit::Second,
            TimeUnit::Second,
        )
        .unwrap();
        assert!((ep.min_strain_azimuth_rad - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_deformation_episode_rejects_bad_arching_factor() {
        assert!(DeformationEpisode::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.5, 1.0, TimeUnit::Second, TimeUnit::Second)
            .is_err());
    }

    #[test]
    fn test_negative_duration_means_auto_terminate() {
        let ep =
            DeformationEpisode::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -1.0, TimeUnit::Second, TimeUnit::Second)
                .unwrap();
        assert!(ep.auto_terminates());
    }

    #[test]
    fn test_wrap_to_half_circle() {
        assert!((wrap_to_half_circle(0.0) - 0.0).abs() < 1e-12);
        let pi = std::f64::consts::PI;
        assert!((wrap_to_half_circle(pi + 0.2) - 0.2).abs() < 1e-12);
        assert!((wrap_to_half_circle(-0.2) - (pi - 0.2)).abs() < 1e-9);
    }

    #[test]
    fn test_dfn_control_rejects_zero_max_fractures_with_explicit_dfn() {
        let err =
            DfnGenerationControl::new(true, 1.0, 0, 1.0, 0.2, IntermediateOutputPolicy::EqualTime(1)).unwrap_err();
        assert_eq!(err, ConfigError::MaxFracturesZeroWithExplicitDfn);
    }

    #[test]
    fn test_dfn_control_allows_zero_max_fractures_without_explicit_dfn() {
        assert!(DfnGenerationControl::new(false, 1.0, 0, 1.0, 0.2, IntermediateOutputPolicy::EqualTime(1)).is_ok());
    }

    #[test]
    fn test_dfn_control_rejects_empty_specified_times() {
        let err = DfnGenerationControl::new(
            true,
            1.0,
            -1,
            1.0,
            0.2,
            IntermediateOutputPolicy::SpecifiedTime(vec![]),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::EmptyIntermediateOutputTimes);
    }

    #[test]
    fn test_dfn_control_rejects_unsorted_specified_times() {
        let err = DfnGenerationControl::new(
            true,
            1.0,
            -1,
            1.0,
            0.2,
            IntermediateOutputPolicy::SpecifiedTime(vec![2.0, 1.0]),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::UnsortedIntermediateOutputTimes);
    }

    #[test]
    fn test_dfn_control_negative_length_disables_dfn() {
        let ctrl = DfnGenerationControl::new(false, -1.0, -1, 1.0, 0.2, IntermediateOutputPolicy::EqualTime(1)).unwrap();
        assert!(ctrl.dfn_disabled());
    }

    #[test]
    fn test_validate_against_episodes_catches_compound_error() {
        // the constructor itself already rejects max_no_fractures == 0 with
        // explicit DFN, so build with an allowed combination and drive the
        // compound check directly instead.
        let ctrl = DfnGenerationControl::new(true, 1.0, -1, 1.0, 0.2, IntermediateOutputPolicy::EqualTime(1)).unwrap();
        let auto_term_episode =
            DeformationEpisode::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -1.0, TimeUnit::Second, TimeUnit::Second)
                .unwrap();
        let mut ctrl_zero = ctrl.clone();
        ctrl_zero.max_no_fractures = 0;
        assert_eq!(
            ctrl_zero.validate_against_episodes(&[auto_term_episode]).unwrap_err(),
            ConfigError::NegativeDurationWithExplicitDfn
        );
    }

    #[test]
    fn test_propagation_control_rejects_bad_accuracy_cap() {
        assert!(PropagationControl::new(0.0, 1e-3, 1e-3, 0.01, 100, 1.0, TimeUnit::Year).is_err());
    }

    #[test]
    fn test_propagation_control_converts_max_timestep_duration() {
        let ctrl = PropagationControl::new(0.01, 1e-3, 1e-3, 0.01, 100, 1.0, TimeUnit::Year).unwrap();
        assert!((ctrl.max_timestep_duration_s - TimeUnit::Year.duration_to_seconds(1.0)).abs() < 1.0);
    }
}
