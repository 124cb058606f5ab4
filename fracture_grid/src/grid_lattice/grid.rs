// SPDX-License-Identifier: MIT
// Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.

use std::cell::RefCell;
use std::fmt::Debug;

use crate::prelude::{PointIndex, Storage, VecStorage2D};

/// A 2D lattice of optional cells with interior mutability: `RefCell`-wrapped
/// storage behind a shared handle, sized at runtime with nullable cells.
#[derive(Debug)]
pub struct Grid<T> {
    storage: RefCell<VecStorage2D<T>>,
}

impl<T> Grid<T> {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            storage: RefCell::new(VecStorage2D::new(rows, cols)),
        }
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.storage.borrow().rows()
    }

    #[inline(always)]
    pub fn cols(&self) -> usize {
        self.storage.borrow().cols()
    }

    /// Places (or pinches out, with `None`) a cell at `p`.
    pub fn set(&self, p: PointIndex, value: Option<T>) {
        self.storage.borrow_mut().set(p, value);
    }

    /// Runs `f` against the cell at `p`, if present.
    pub fn with<R>(&self, p: PointIndex, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.storage.borrow().get(p).map(f)
    }

    /// Runs `f` against the cell at `p` with mutable access, if present.
    pub fn with_mut<R>(&self, p: PointIndex, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.storage.borrow_mut().get_mut(p).map(f)
    }

    pub fn is_present(&self, p: PointIndex) -> bool {
        self.storage.borrow().get(p).is_some()
    }

    /// The N/E/S/W neighbours of `p` that are both in-bounds and present.
    pub fn present_neighbours(&self, p: PointIndex) -> Vec<PointIndex> {
        p.neighbours(self.rows(), self.cols())
            .into_iter()
            .flatten()
            .filter(|n| self.is_present(*n))
            .collect()
    }

    pub fn points(&self) -> Vec<PointIndex> {
        let (rows, cols) = (self.rows(), self.cols());
        let mut pts = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                pts.push(PointIndex::new(row, col));
            }
        }
        pts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Block(i32);

    #[test]
    fn test_new_grid_all_vacant() {
        let grid: Grid<Block> = Grid::new(2, 2);
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 2);
        assert!(!grid.is_present(PointIndex::new(0, 0)));
    }

    #[test]
    fn test_set_and_with() {
        let grid: Grid<Block> = Grid::new(2, 2);
        grid.set(PointIndex::new(0, 0), Some(Block(7)));
        let doubled = grid.with(PointIndex::new(0, 0), |b| b.0 * 2);
        assert_eq!(doubled, Some(14));
    }

    #[test]
    fn test_with_mut_mutates_in_place() {
        let grid: Grid<Block> = Grid::new(1, 1);
        grid.set(PointIndex::new(0, 0), Some(Block(1)));
        grid.with_mut(PointIndex::new(0, 0), |b| b.0 += 1);
        assert_eq!(grid.with(PointIndex::new(0, 0), |b| b.0), Some(2));
    }

    #[test]
    fn test_present_neighbours_skips_pinched_out() {
        let grid: Grid<Block> = Grid::new(2, 2);
        grid.set(PointIndex::new(0, 0), Some(Block(0)));
        grid.set(PointIndex::new(0, 1), Some(Block(1)));
        grid.set(PointIndex::new(1, 0), None); // pinched out
        grid.set(PointIndex::new(1, 1), Some(Block(3)));

        let neighbours = grid.present_neighbours(PointIndex::new(0, 0));
        assert_eq!(neighbours, vec![PointIndex::new(0, 1)]);
    }

    #[test]
    fn test_points_enumerates_row_major() {
        let grid: Grid<Block> = Grid::new(2, 2);
        let pts = grid.points();
        assert_eq!(
            pts,
            vec![
                PointIndex::new(0, 0),
                PointIndex::new(0, 1),
                PointIndex::new(1, 0),
                PointIndex::new(1, 1),
            ]
        );
    }
}
