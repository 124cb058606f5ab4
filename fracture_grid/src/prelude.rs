// Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.

pub use crate::grid_lattice::grid::Grid;
pub use crate::grid_lattice::point::PointIndex;
pub use crate::grid_lattice::storage::Storage;
pub use crate::grid_lattice::storage_vec_2d::VecStorage2D;
