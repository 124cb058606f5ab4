// SPDX-License-Identifier: MIT
// Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.

#![forbid(unsafe_code)]

pub mod grid_lattice;
pub mod prelude;

pub use crate::grid_lattice::grid::Grid;
pub use crate::grid_lattice::point::PointIndex;
pub use crate::grid_lattice::storage::Storage;
pub use crate::grid_lattice::storage_vec_2d::VecStorage2D;
