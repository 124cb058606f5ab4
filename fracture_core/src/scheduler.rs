/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
use std::collections::VecDeque;

use fracture_grid::PointIndex;
use fracture_rand::Rng;
use serde::{Deserialize, Serialize};

use crate::control::{DeformationEpisode, DfnGenerationControl, IntermediateOutputPolicy, NeighbourSearchMode};
use crate::errors::{CalculationError, PropagationError};
use crate::globaldfn::{self, MacrofractureXyz, MicrofractureXyz};
use crate::grid::FractureGrid;
use crate::localdfn::{IjkPoint, PropagationDirection, SegmentState};
use crate::progress::ProgressReporter;

/// A snapshot of the whole-grid DFN at one point in global time. The final
/// entry the scheduler always appends is the completed run's DFN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DfnSnapshot {
    pub time_s: f64,
    pub macrofractures: Vec<MacrofractureXyz>,
    pub microfractures: Vec<MicrofractureXyz>,
}

const EQUAL_AREA_PROBES_PER_EPISODE: u32 = 10;

/// Picks the points at which an intermediate snapshot is taken. `SpecifiedTime`
/// and `EqualTime` both resolve to a fixed list of global times known ahead of
/// the run; `EqualArea` instead resolves to a list of per-block timestep-count
/// thresholds, since "N snapshots evenly spaced across the ordered list of
/// per-block timesteps" is a count, not a time, and the count a run will
/// ultimately reach is not known until the blocks have actually stepped that
/// far.
enum SnapshotSchedule {
    Time(VecDeque<f64>),
    Area(VecDeque<u32>),
}

impl SnapshotSchedule {
    fn new(policy: &IntermediateOutputPolicy, total_duration_s: f64, total_timestep_budget: u32) -> Self {
        match policy {
            IntermediateOutputPolicy::SpecifiedTime(times) => SnapshotSchedule::Time(times.clone().into()),
            IntermediateOutputPolicy::EqualTime(n) => {
                SnapshotSchedule::Time(Self::equally_spaced_times(*n, total_duration_s).into())
            }
            IntermediateOutputPolicy::EqualArea(n) => {
                SnapshotSchedule::Area(Self::equally_spaced_counts(*n, total_timestep_budget).into())
            }
        }
    }

    /// `n` times subdividing `[0, total_duration_s]` into `n + 1` equal
    /// spans, so the scheduled times are `total/(n+1), 2*total/(n+1), ...,
    /// n*total/(n+1)` — the final span ends at `total_duration_s` itself,
    /// which the caller always snapshots unconditionally.
    fn equally_spaced_times(n: u32, total_duration_s: f64) -> Vec<f64> {
        if n == 0 || total_duration_s <= 0.0 {
            return Vec::new();
        }
        let interval = total_duration_s / (n as f64 + 1.0);
        (1..=n).map(|k| interval * (k as f64)).collect()
    }

    /// Mirrors `equally_spaced_times`, but over a timestep-count budget
    /// rather than a duration.
    fn equally_spaced_counts(n: u32, total_timestep_budget: u32) -> Vec<u32> {
        if n == 0 || total_timestep_budget == 0 {
            return Vec::new();
        }
        let interval = total_timestep_budget as f64 / (n as f64 + 1.0);
        (1..=n).map(|k| (interval * k as f64).round() as u32).collect()
    }

    /// Boundaries within `(elapsed_s, episode_end_s]` at which the schedule
    /// should be re-checked for a due snapshot. For a time-based schedule
    /// this is exactly the scheduled times that fall inside the episode
    /// (allowing a single long episode to be split into the sub-spans those
    /// times define); for an area-based schedule the real timestep count is
    /// only known once the grid has actually advanced that far, so a fixed
    /// number of evenly timed probes is used instead.
    fn probe_boundaries(&self, elapsed_s: f64, episode_end_s: f64) -> Vec<f64> {
        let mut boundaries = match self {
            SnapshotSchedule::Time(remaining) => {
                remaining.iter().copied().filter(|t| *t > elapsed_s && *t < episode_end_s).collect()
            }
            SnapshotSchedule::Area(_) => {
                let span = episode_end_s - elapsed_s;
                if span <= 0.0 {
                    Vec::new()
                } else {
                    (1..EQUAL_AREA_PROBES_PER_EPISODE)
                        .map(|k| elapsed_s + span * (k as f64) / (EQUAL_AREA_PROBES_PER_EPISODE as f64))
                        .collect()
                }
            }
        };
        boundaries.push(episode_end_s);
        boundaries.sort_by(|a, b| a.partial_cmp(b).unwrap());
        boundaries
    }

    /// Returns how many snapshots are due at this boundary: for a time-based
    /// schedule, every scheduled time at or before `elapsed_s`; for an
    /// area-based schedule, every threshold at or below the cumulative
    /// per-block timestep count observed so far.
    fn due_count(&mut self, elapsed_s: f64, timesteps_so_far: usize) -> usize {
        match self {
            SnapshotSchedule::Time(remaining) => {
                let mut n = 0;
                while matches!(remaining.front(), Some(t) if *t <= elapsed_s) {
                    remaining.pop_front();
                    n += 1;
                }
                n
            }
            SnapshotSchedule::Area(remaining) => {
                let mut n = 0;
                while matches!(remaining.front(), Some(t) if timesteps_so_far as u32 >= *t) {
                    remaining.pop_front();
                    n += 1;
                }
                n
            }
        }
    }
}

/// Drives the whole grid through an ordered sequence of deformation
/// episodes: advances every present
/// block's implicit calculator, grows each block's explicit local DFN from
/// the freshly computed driving stress, propagates tips that cross into a
/// neighbouring block, applies the grid-wide thickness cutoff, and stages
/// intermediate DFN snapshots per the configured output policy.
pub struct GlobalScheduler {
    dfn_control: DfnGenerationControl,
}

impl GlobalScheduler {
    pub fn new(dfn_control: DfnGenerationControl) -> Self {
        Self { dfn_control }
    }

    pub fn dfn_control(&self) -> &DfnGenerationControl {
        &self.dfn_control
    }

    /// Runs every episode in order. Per-block calculation errors are
    /// localized: a block that fails an episode is logged and
    /// left at its last consistent state, the rest of the grid continues.
    /// A fixed-duration episode is internally subdivided at every point the
    /// snapshot schedule needs to inspect, so an intermediate snapshot
    /// always reflects the DFN's actual growth stage at that global time
    /// rather than the end state of whichever episode happens to contain it.
    /// Returns the staged snapshots plus a final snapshot of the completed
    /// run, or the first hard error if the reporter requests an abort.
    pub fn run<R: Rng + ?Sized>(
        &self,
        grid: &FractureGrid,
        episodes: &[DeformationEpisode],
        rng: &mut R,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<Vec<DfnSnapshot>, CalculationError> {
        reporter.set_number_of_elements(episodes.len() as u64);
        let total_duration_s: f64 = episodes.iter().map(|e| e.duration_s.max(0.0)).sum();
        // An episode is probed in `EQUAL_AREA_PROBES_PER_EPISODE` chunks
        // regardless of its duration, and each chunk records at least one
        // per-block timestep even when its span is far shorter than the
        // block's own timestep cap — so this many timesteps per episode is
        // the realistic scale to divide an `EqualArea` run's budget over,
        // not the (rarely approached) `max_timesteps` safety cap.
        let total_timestep_budget = (episodes.len() as u32).saturating_mul(EQUAL_AREA_PROBES_PER_EPISODE);
        let mut schedule =
            SnapshotSchedule::new(&self.dfn_control.intermediate_output_policy, total_duration_s, total_timestep_budget);

        let mut snapshots = Vec::new();
        let mut elapsed_s = 0.0;

        for (episode_index, episode) in episodes.iter().enumerate() {
            if reporter.abort_calculation() {
                log::warn!("scheduler aborted by progress reporter after {episode_index} episode(s)");
                break;
            }

            if episode.auto_terminates() {
                elapsed_s =
                    self.run_chunk(grid, episode_index, episode, elapsed_s, &mut schedule, &mut snapshots, rng)?;
            } else {
                let episode_end_s = elapsed_s + episode.duration_s.max(0.0);
                for boundary_s in schedule.probe_boundaries(elapsed_s, episode_end_s) {
                    let chunk = DeformationEpisode { duration_s: (boundary_s - elapsed_s).max(0.0), ..*episode };
                    elapsed_s =
                        self.run_chunk(grid, episode_index, &chunk, elapsed_s, &mut schedule, &mut snapshots, rng)?;
                }
            }

            reporter.update_progress((episode_index + 1) as u64);
        }

        snapshots.push(self.take_snapshot(grid, elapsed_s));
        Ok(snapshots)
    }

    /// Runs one (possibly sub-episode) chunk on every block, grows the
    /// explicit DFN for it, advances the grid-wide thickness cutoff, and
    /// stages any snapshot the schedule now considers due. Returns the new
    /// elapsed time.
    fn run_chunk<R: Rng + ?Sized>(
        &self,
        grid: &FractureGrid,
        episode_index: usize,
        chunk: &DeformationEpisode,
        chunk_start_s: f64,
        schedule: &mut SnapshotSchedule,
        snapshots: &mut Vec<DfnSnapshot>,
        rng: &mut R,
    ) -> Result<f64, CalculationError> {
        let failures = grid.run_episode_on_all_blocks(chunk);
        for (p, result) in &failures {
            if let Err(e) = result {
                log::warn!("episode {episode_index} did not complete at block ({}, {}): {e}", p.row, p.col);
            }
        }

        if self.dfn_control.generate_explicit_dfn && !self.dfn_control.dfn_disabled() {
            self.grow_explicit_dfn(grid, episode_index, chunk, chunk_start_s, rng)?;
            self.propagate_exits_across_boundaries(grid);
        }

        let elapsed_s = chunk_start_s + chunk.duration_s.max(0.0);
        grid.apply_thickness_cutoff(self.dfn_control.minimum_layer_thickness_m);

        let timesteps_so_far = grid.collect_tagged_end_times().len();
        let due = schedule.due_count(elapsed_s, timesteps_so_far);
        for _ in 0..due {
            snapshots.push(self.take_snapshot(grid, elapsed_s));
        }

        Ok(elapsed_s)
    }

    /// Nucleates, advances, and tests interactions for every present
    /// block's local DFN, one pass per dip set. Skips blocks
    /// already past the thickness cutoff — their explicit DFN is frozen.
    fn grow_explicit_dfn<R: Rng + ?Sized>(
        &self,
        grid: &FractureGrid,
        episode_index: usize,
        episode: &DeformationEpisode,
        elapsed_before_s: f64,
        rng: &mut R,
    ) -> Result<(), CalculationError> {
        let weighted_nucleation_time_s = if episode.auto_terminates() {
            elapsed_before_s
        } else {
            elapsed_before_s + episode.duration_s.max(0.0) / 2.0
        };
        let mut half_widths: Vec<(PointIndex, f64)> = Vec::new();
        for p in grid.points() {
            let cutoff = grid.with_block(p, |gb| gb.dfn_thickness_cutoff_activated()).unwrap_or(true);
            if cutoff {
                continue;
            }

            let set_count = grid.with_block(p, |gb| gb.fracture_sets().len()).unwrap_or(0);
            let mut order: Vec<(usize, usize, f64)> = Vec::new();
            for set_index in 0..set_count {
                let dip_count = grid.with_block(p, |gb| gb.fracture_sets()[set_index].dip_sets().len()).unwrap_or(0);
                for dip_set_index in 0..dip_count {
                    let driving = grid
                        .with_block(p, |gb| {
                            gb.fracture_sets()[set_index].dip_sets()[dip_set_index].latest().map(|d| d.driving_stress_const_pa())
                        })
                        .flatten()
                        .unwrap_or(0.0);
                    order.push((set_index, dip_set_index, driving));
                }
            }
            // `propagateFracturesInNucleationOrder` true means strict
            // weighted-nucleation-time order across sets rather than
            // set-by-set declaration order. Within one global timestep every
            // dip set shares the same weighted nucleation time (the step
            // midpoint), so the tie-break that actually removes the
            // inter-set length bias is processing the highest-driving-stress
            // (fastest-nucleating) set first, so a slower set's later draws
            // are rejected by the faster set's already-placed stress
            // shadows rather than the reverse.
            if self.dfn_control.propagate_fractures_in_nucleation_order {
                order.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
            }

            let mut max_half_width = 0.0_f64;
            for (set_index, dip_set_index, _) in order {
                let Some(Some(latest)) =
                    grid.with_block(p, |gb| gb.fracture_sets()[set_index].dip_sets()[dip_set_index].latest().copied())
                else {
                    continue;
                };
                if latest.mean_propagation_rate_m_per_s() <= 0.0 {
                    continue;
                }

                let (alpha_uf, subcritical_index, volume_m3) = grid
                    .with_block(p, |gb| (gb.mech().alpha_uf(), gb.mech().subcritical_index, gb.local_dfn().block_volume_m3()))
                    .unwrap();
                let expected = crate::localdfn::LocalDfn::expected_nucleation_count(
                    alpha_uf,
                    latest.driving_stress_const_pa(),
                    subcritical_index,
                    episode.duration_s.max(0.0),
                    volume_m3,
                );
                let mut count = crate::localdfn::LocalDfn::sample_nucleation_count(
                    expected,
                    self.dfn_control.probabilistic_fracture_nucleation_limit,
                    rng,
                )?;

                if !self.dfn_control.unlimited_fractures() {
                    let placed = grid.with_block(p, |gb| gb.local_dfn().segments().len() as i64 / 2).unwrap_or(0);
                    let budget = (self.dfn_control.max_no_fractures - placed).max(0);
                    count = count.min(budget as u32);
                }

                // Stress-shadow half-width: wider as a set clears more
                // of its own exclusion volume (lower theta_prime),
                // since a near-exhausted clear zone means existing
                // fractures already dominate the block.
                let half_width = grid.with_block(p, |gb| gb.mech().layer_thickness_m()).unwrap_or(1.0)
                    * (1.0 - latest.theta_prime()).max(0.05);
                max_half_width = max_half_width.max(half_width);

                grid.with_block_mut(p, |gb| {
                    gb.local_dfn_mut().nucleate(
                        set_index,
                        dip_set_index,
                        count,
                        episode_index,
                        weighted_nucleation_time_s,
                        half_width,
                        self.dfn_control.link_fractures_in_stress_shadow,
                        rng,
                    )
                });

                grid.with_block_mut(p, |gb| {
                    gb.local_dfn_mut().advance_tips(
                        episode.duration_s.max(0.0),
                        latest.mean_propagation_rate_m_per_s(),
                        self.dfn_control.crop_to_grid,
                    )
                });
            }

            grid.with_block_mut(p, |gb| gb.local_dfn_mut().check_interactions(max_half_width.max(1.0)));
            half_widths.push((p, max_half_width.max(1.0)));
        }

        self.check_cross_boundary_interactions(grid, &half_widths);
        Ok(())
    }

    /// Tests active segments near a shared column boundary between two
    /// horizontally-adjacent blocks against each other, deactivating tips
    /// that would otherwise only be caught once one of them actually exits
    /// the block. `NeighbourSearchMode::All` always
    /// runs the test; `Automatic` only runs it when the larger of the two
    /// blocks' stress-shadow half-widths is a non-negligible fraction of the
    /// block's strike extent, i.e. the shadow could plausibly reach across
    /// the boundary at all.
    fn check_cross_boundary_interactions(&self, grid: &FractureGrid, half_widths: &[(PointIndex, f64)]) {
        if matches!(self.dfn_control.search_neighbouring_gridblocks, NeighbourSearchMode::None) {
            return;
        }
        const AUTOMATIC_RATIO_THRESHOLD: f64 = 0.05;
        for &(p, half_width) in half_widths {
            let Some(right) = p.col.checked_add(1) else { continue };
            let q = PointIndex::new(p.row, right);
            if !grid.is_present(q) {
                continue;
            }
            let q_half_width = half_widths.iter().find(|(pt, _)| *pt == q).map(|(_, w)| *w).unwrap_or(half_width);
            let band = half_width.max(q_half_width);

            if matches!(self.dfn_control.search_neighbouring_gridblocks, NeighbourSearchMode::Automatic) {
                let length_i = grid.with_block(p, |gb| gb.local_dfn().length_i_m()).unwrap_or(f64::INFINITY);
                if length_i <= 0.0 || band / length_i < AUTOMATIC_RATIO_THRESHOLD {
                    continue;
                }
            }

            let left_edge = grid.with_block(p, |gb| gb.local_dfn().near_edge_segments(false, band)).unwrap_or_default();
            let right_edge = grid.with_block(q, |gb| gb.local_dfn().near_edge_segments(true, band)).unwrap_or_default();

            for (li, ls) in &left_edge {
                for (rj, rs) in &right_edge {
                    let dj = (ls.propagating_node.j - rs.propagating_node.j).abs();
                    let same_set = ls.set_index == rs.set_index && ls.dip_set_index == rs.dip_set_index;
                    if same_set {
                        if dj < band {
                            grid.with_block_mut(p, |gb| gb.local_dfn_mut().deactivate_at(*li, SegmentState::DeactivatedByStressShadow));
                            grid.with_block_mut(q, |gb| gb.local_dfn_mut().deactivate_at(*rj, SegmentState::DeactivatedByStressShadow));
                        }
                    } else if dj < 1e-6 {
                        grid.with_block_mut(p, |gb| gb.local_dfn_mut().deactivate_at(*li, SegmentState::DeactivatedByIntersection));
                        grid.with_block_mut(q, |gb| gb.local_dfn_mut().deactivate_at(*rj, SegmentState::DeactivatedByIntersection));
                    }
                }
            }
        }
    }

    /// Carries tips that exited a block's strike extent into the
    /// neighbouring block along the grid's column axis (the local I/strike
    /// axis is taken to run along grid columns; J/strike-normal along grid
    /// rows). A neighbour whose fracture sets have no strike within
    /// `maxConsistencyAngle` of the exiting segment's set, or whose
    /// position is absent (pinched out) or off the grid edge, terminates
    /// the tip there instead.
    fn propagate_exits_across_boundaries(&self, grid: &FractureGrid) {
        for p in grid.points() {
            let Some(exited) = grid.with_block(p, |gb| {
                gb.local_dfn().segments().iter().filter(|s| s.state() == SegmentState::ExitedBlock).copied().collect::<Vec<_>>()
            }) else {
                continue;
            };

            for seg in exited {
                let target_col = match seg.direction {
                    PropagationDirection::IPlus => p.col.checked_add(1),
                    PropagationDirection::IMinus => p.col.checked_sub(1),
                };
                let Some(col) = target_col else {
                    log::warn!("gridblock ({}, {}) fracture exited the grid's outer edge; terminated", p.row, p.col);
                    continue;
                };
                let neighbour = PointIndex::new(p.row, col);
                if !grid.is_present(neighbour) {
                    log::warn!("{}", PropagationError::BlockAbsent { row: neighbour.row, col: neighbour.col });
                    continue;
                }

                let Some(Some(source_azimuth)) =
                    grid.with_block(p, |gb| gb.fracture_sets().get(seg.set_index).map(|fs| fs.strike_azimuth_rad()))
                else {
                    continue;
                };

                let matched_set = grid
                    .with_block(neighbour, |gb| {
                        gb.fracture_sets()
                            .iter()
                            .enumerate()
                            .map(|(idx, fs)| (idx, (fs.strike_azimuth_rad() - source_azimuth).abs()))
                            .filter(|(_, diff)| *diff <= self.dfn_control.max_consistency_angle_rad)
                            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
                            .map(|(idx, _)| idx)
                    })
                    .flatten();

                match matched_set {
                    Some(target_set_index) => {
                        let entry_i = match seg.direction {
                            PropagationDirection::IPlus => 0.0,
                            PropagationDirection::IMinus => {
                                grid.with_block(neighbour, |gb| gb.local_dfn().length_i_m()).unwrap_or(0.0)
                            }
                        };
                        let dip_set_index = grid
                            .with_block(neighbour, |gb| {
                                gb.fracture_sets()
                                    .get(target_set_index)
                                    .map(|fs| seg.dip_set_index.min(fs.dip_sets().len().saturating_sub(1)))
                            })
                            .flatten()
                            .unwrap_or(0);

                        grid.with_block_mut(neighbour, |gb| {
                            gb.local_dfn_mut().continue_from_boundary(
                                target_set_index,
                                dip_set_index,
                                seg.direction,
                                IjkPoint::new(entry_i, seg.propagating_node.j, seg.propagating_node.k),
                                seg.nucleation_timestep,
                                seg.weighted_nucleation_time_s,
                                (p.row, p.col, seg.id),
                            )
                        });
                    }
                    None => {
                        log::warn!(
                            "{}",
                            PropagationError::NoMatchingSetAcrossBoundary { strike_diff_rad: format!("{source_azimuth:.6}") }
                        );
                    }
                }
            }
        }
    }

    /// Assembles, culls, and stages one snapshot of the whole grid's DFN.
    fn take_snapshot(&self, grid: &FractureGrid, time_s: f64) -> DfnSnapshot {
        let mut macrofractures = globaldfn::assemble_macrofractures(grid);
        globaldfn::cull_macrofracture_snapshot(
            &mut macrofractures,
            self.dfn_control.macrofracture_dfn_minimum_length_m.max(0.0),
            self.dfn_control.max_no_fractures,
        );
        let mut microfractures = globaldfn::assemble_microfractures(grid, self.dfn_control.number_of_uf_points);
        globaldfn::cull_microfracture_snapshot(&mut microfractures, self.dfn_control.microfracture_dfn_minimum_radius_m.max(0.0));
        DfnSnapshot { time_s, macrofractures, microfractures }
    }
}
