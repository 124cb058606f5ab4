/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
use crate::dipset::FractureDipSet;
use crate::errors::ConfigError;

/// A corner pillar centrepoint in the gridblock's local IJK frame (I =
/// strike, J = strike-normal, K = vertical).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PillarCentrepoint {
    pub i: f64,
    pub j: f64,
    pub k: f64,
}

impl PillarCentrepoint {
    pub fn new(i: f64, j: f64, k: f64) -> Self {
        Self { i, j, k }
    }
}

/// One azimuth family of dip sets: a strike azimuth in
/// `[0, pi)` radians and the (usually vertical + conjugate-dip) dip sets
/// sharing it, plus the four corner pillar centrepoints used to transform
/// local IJK geometry into the block's corner-pillar grid.
#[derive(Debug, Clone, PartialEq)]
pub struct FractureSet {
    strike_azimuth_rad: f64,
    dip_sets: Vec<FractureDipSet>,
    corner_pillars: [PillarCentrepoint; 4],
}

impl FractureSet {
    pub fn new(strike_azimuth_rad: f64, corner_pillars: [PillarCentrepoint; 4]) -> Result<Self, ConfigError> {
        if !(0.0..std::f64::consts::PI).contains(&strike_azimuth_rad) {
            return Err(ConfigError::InvalidAzimuth { field: "strike_azimuth_rad" });
        }
        Ok(Self {
            strike_azimuth_rad,
            dip_sets: Vec::new(),
            corner_pillars,
        })
    }

    pub fn strike_azimuth_rad(&self) -> f64 {
        self.strike_azimuth_rad
    }

    pub fn corner_pillars(&self) -> &[PillarCentrepoint; 4] {
        &self.corner_pillars
    }

    pub fn push_dip_set(&mut self, dip_set: FractureDipSet) {
        self.dip_sets.push(dip_set);
    }

    pub fn dip_sets(&self) -> &[FractureDipSet] {
        &self.dip_sets
    }

    pub fn dip_sets_mut(&mut self) -> &mut [FractureDipSet] {
        &mut self.dip_sets
    }

    /// Strike-normal azimuth, used when projecting stress onto the
    /// fracture-normal direction for the driving-stress solve.
    pub fn strike_normal_azimuth_rad(&self) -> f64 {
        self.strike_azimuth_rad + std::f64::consts::FRAC_PI_2
    }
}
