/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
use std::error::Error;
use std::fmt;

/// Per-segment propagation failures: block errors are localized, and no
/// block's failure aborts the grid run.
/// `FractureGrid::run_episode_on_all_blocks` catches these at the block
/// boundary and leaves the affected block at its last-consistent state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropagationError {
    UnknownDipSet { block_row: usize, block_col: usize, set_index: usize },
    NoMatchingSetAcrossBoundary { strike_diff_rad: String },
    BlockAbsent { row: usize, col: usize },
}

impl Error for PropagationError {}

impl fmt::Display for PropagationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropagationError::UnknownDipSet { block_row, block_col, set_index } => write!(
                f,
                "block ({block_row}, {block_col}) has no dip set at index {set_index}"
            ),
            PropagationError::NoMatchingSetAcrossBoundary { strike_diff_rad } => write!(
                f,
                "no fracture set in the neighbouring block matches within MaxConsistencyAngle \
                 (strike difference {strike_diff_rad} rad); segment terminated at the boundary"
            ),
            PropagationError::BlockAbsent { row, col } => {
                write!(f, "gridblock ({row}, {col}) is pinched out (absent)")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = PropagationError::BlockAbsent { row: 1, col: 0 };
        assert_eq!(e.to_string(), "gridblock (1, 0) is pinched out (absent)");
    }
}
