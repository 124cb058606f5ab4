/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
use std::cell::Cell;

use fracture_grid::{Grid, PointIndex};

use crate::control::DeformationEpisode;
use crate::errors::{CalculationError, PropagationError};
use crate::gridblock::Gridblock;

/// The 2D lattice of gridblocks, with 4-neighbour
/// connectivity, cornerpoint aliasing across shared edges, and the
/// grid-wide `DFNThicknessCutoffActivated` flag. Blocks may
/// be absent (pinched out); present blocks are independent implicit
/// calculators until explicitly linked via `alias_shared_edge` or driven
/// together by a scheduler.
#[derive(Debug)]
pub struct FractureGrid {
    grid: Grid<Gridblock>,
    thickness_cutoff_activated: Cell<bool>,
}

impl FractureGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { grid: Grid::new(rows, cols), thickness_cutoff_activated: Cell::new(false) }
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn place_block(&self, p: PointIndex, block: Gridblock) {
        self.grid.set(p, Some(block));
    }

    pub fn pinch_out(&self, p: PointIndex) {
        self.grid.set(p, None);
    }

    pub fn is_present(&self, p: PointIndex) -> bool {
        self.grid.is_present(p)
    }

    pub fn with_block<R>(&self, p: PointIndex, f: impl FnOnce(&Gridblock) -> R) -> Option<R> {
        self.grid.with(p, f)
    }

    pub fn with_block_mut<R>(&self, p: PointIndex, f: impl FnOnce(&mut Gridblock) -> R) -> Option<R> {
        self.grid.with_mut(p, f)
    }

    pub fn present_neighbours(&self, p: PointIndex) -> Vec<PointIndex> {
        self.grid.present_neighbours(p)
    }

    pub fn points(&self) -> Vec<PointIndex> {
        self.grid.points()
    }

    pub fn thickness_cutoff_activated(&self) -> bool {
        self.thickness_cutoff_activated.get()
    }

    /// Aliases the shared-edge cornerpoints of two already-placed,
    /// 4-neighbour-adjacent blocks. `a` and `b` must be
    /// orthogonally adjacent grid positions; which one is "first" does not
    /// matter, `a`'s corners become the shared handles. Corner indices
    /// follow `Gridblock`'s own 0=NW,1=NE,2=SW,3=SE convention.
    ///
    /// The grid's storage only allows one block to be borrowed at a time
    /// (one `RefCell` per lattice, not per cell), so this reads `a`'s handle
    /// and writes it into `b` rather than borrowing both blocks
    /// simultaneously.
    pub fn alias_shared_edge(&self, a: PointIndex, b: PointIndex) -> Result<(), PropagationError> {
        if !self.is_present(a) {
            return Err(PropagationError::BlockAbsent { row: a.row, col: a.col });
        }
        if !self.is_present(b) {
            return Err(PropagationError::BlockAbsent { row: b.row, col: b.col });
        }

        let pairs: [(usize, usize); 2] = if a.row == b.row && a.col + 1 == b.col {
            [(1, 0), (3, 2)] // a west of b: a's E corners <-> b's W corners
        } else if a.row == b.row && b.col + 1 == a.col {
            [(0, 1), (2, 3)] // a east of b
        } else if a.col == b.col && a.row + 1 == b.row {
            [(2, 0), (3, 1)] // a north of b: a's S corners <-> b's N corners
        } else if a.col == b.col && b.row + 1 == a.row {
            [(0, 2), (1, 3)] // a south of b
        } else {
            return Err(PropagationError::NoMatchingSetAcrossBoundary {
                strike_diff_rad: "blocks are not 4-neighbours".to_string(),
            });
        };

        for (ia, ib) in pairs {
            for top in [true, false] {
                let corner = self
                    .with_block(a, |gb| gb.corner_rc(top, ia))
                    .ok_or(PropagationError::BlockAbsent { row: a.row, col: a.col })?;
                self.with_block_mut(b, |gb| gb.set_corner_rc(top, ib, corner))
                    .ok_or(PropagationError::BlockAbsent { row: b.row, col: b.col })?;
            }
        }
        Ok(())
    }

    /// Aliases every present pair of 4-neighbours across the whole grid.
    /// Convenience for assembling a freshly placed grid in one call;
    /// idempotent, since re-aliasing an already-shared corner is a no-op.
    pub fn alias_all_shared_edges(&self) -> Result<(), PropagationError> {
        for p in self.points() {
            for n in self.present_neighbours(p) {
                if n.row > p.row || (n.row == p.row && n.col > p.col) {
                    self.alias_shared_edge(p, n)?;
                }
            }
        }
        Ok(())
    }

    /// Applies the thickness cutoff: any present block whose current
    /// deformed thickness falls below `minimum_layer_thickness_m` has its
    /// explicit-DFN generation permanently disabled (the implicit
    /// calculator keeps running). Returns the points newly marked this
    /// call. Raises the grid-wide flag the first time any block trips it.
    pub fn apply_thickness_cutoff(&self, minimum_layer_thickness_m: f64) -> Vec<PointIndex> {
        let mut newly_marked = Vec::new();
        for p in self.points() {
            let already = self.with_block(p, |gb| gb.dfn_thickness_cutoff_activated()).unwrap_or(true);
            if already {
                continue;
            }
            let below = self
                .with_block(p, |gb| gb.thickness_at_deformation() < minimum_layer_thickness_m)
                .unwrap_or(false);
            if below {
                self.with_block_mut(p, |gb| gb.mark_dfn_thickness_cutoff());
                self.thickness_cutoff_activated.set(true);
                newly_marked.push(p);
            }
        }
        newly_marked
    }

    /// Runs one deformation episode on every present block independently.
    /// A single block's failure is collected rather than propagated — no
    /// block's failure aborts the grid run; callers inspect the returned
    /// map for blocks that did not complete the episode.
    pub fn run_episode_on_all_blocks(
        &self,
        episode: &DeformationEpisode,
    ) -> Vec<(PointIndex, Result<(), CalculationError>)> {
        let mut results = Vec::new();
        for p in self.points() {
            let outcome = self.with_block_mut(p, |gb| gb.run_episode(episode));
            if let Some(result) = outcome {
                if let Err(ref e) = result {
                    log::warn!("gridblock ({}, {}) failed episode: {e}", p.row, p.col);
                }
                results.push((p, result));
            }
        }
        results
    }

    /// Collects every present block's recorded timestep end-times, tagged
    /// by the block that produced them, as raw material for the global
    /// scheduler's merge-and-order pass.
    pub fn collect_tagged_end_times(&self) -> Vec<(PointIndex, f64)> {
        let mut tagged = Vec::new();
        for p in self.points() {
            if let Some(times) = self.with_block(p, |gb| gb.timestep_end_times_s().to_vec()) {
                tagged.extend(times.into_iter().map(|t| (p, t)));
            }
        }
        tagged
    }
}
