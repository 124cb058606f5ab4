/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
#![forbid(unsafe_code)]

//! Geomechanical natural-fracture-network simulator core: per-gridblock
//! implicit fracture calculation, explicit discrete-fracture-network (DFN)
//! propagation, and a global timestep scheduler tying both together across
//! a 2D grid of gridblocks.

pub mod control;
pub mod dipset;
pub mod errors;
pub mod fracture_calc;
pub mod fracture_set;
pub mod globaldfn;
pub mod grid;
pub mod gridblock;
pub mod io;
pub mod localdfn;
pub mod macrofracture_data;
pub mod mech;
pub mod progress;
pub mod scheduler;
pub mod stress;
pub mod time;

pub mod prelude {
    pub use crate::control::{
        DeformationEpisode, DfnGenerationControl, IntermediateOutputPolicy, NeighbourSearchMode, OutputFileType,
        PropagationControl,
    };
    pub use crate::dipset::{ApertureParams, DrivingStressInput, FractureDipSet, FractureEvolutionStage};
    pub use crate::errors::{CalculationError, ConfigError, IoError, PropagationError};
    pub use crate::fracture_calc::FractureCalculationData;
    pub use crate::fracture_set::{FractureSet, PillarCentrepoint};
    pub use crate::globaldfn::{MacrofractureXyz, MicrofractureXyz};
    pub use crate::grid::FractureGrid;
    pub use crate::gridblock::{BlockDimensions, Gridblock, Point3};
    pub use crate::localdfn::{IjkPoint, LocalDfn, MacrofractureSegment, Microfracture, PropagationDirection, SegmentState};
    pub use crate::macrofracture_data::{MacrofractureData, MacrofractureLengthBin};
    pub use crate::mech::{BartonBandisParams, MechanicalProperties, StrainRelaxationCase};
    pub use crate::progress::{CountingProgressReporter, NoOpProgressReporter, ProgressReporter};
    pub use crate::scheduler::{DfnSnapshot, GlobalScheduler};
    pub use crate::stress::{StressDistributionCase, StressStrainState};
    pub use crate::time::TimeUnit;
}
