/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
use crate::core::Rng;
use crate::errors::{BernoulliDistributionError, UniformDistributionError};

pub trait Distribution<T> {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T;
}

/// A Bernoulli(p) coin flip, used below `probabilisticFractureNucleationLimit`
/// to decide whether a sub-expected-count nucleation fires this timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bernoulli {
    p: f64,
}

impl Bernoulli {
    pub fn new(p: f64) -> Result<Self, BernoulliDistributionError> {
        if !(0.0..=1.0).contains(&p) || p.is_nan() {
            return Err(BernoulliDistributionError::InvalidProbability);
        }
        Ok(Self { p })
    }

    pub fn from_ratio(numerator: u32, denominator: u32) -> Result<Self, BernoulliDistributionError> {
        if denominator == 0 || numerator > denominator {
            return Err(BernoulliDistributionError::InvalidProbability);
        }
        Ok(Self {
            p: numerator as f64 / denominator as f64,
        })
    }

    pub fn p(&self) -> f64 {
        self.p
    }
}

impl Distribution<bool> for Bernoulli {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.random_f64() < self.p
    }
}

/// A continuous uniform distribution over `[low, high)` (or `[low, high]` via
/// `new_inclusive`), used to draw nucleation points uniformly within a
/// gridblock's IJK frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniform {
    low: f64,
    high: f64,
}

impl Uniform {
    pub fn new(low: f64, high: f64) -> Result<Self, UniformDistributionError> {
        if !(low < high) {
            return Err(UniformDistributionError::InvalidRange);
        }
        Ok(Self { low, high })
    }

    pub fn new_inclusive(low: f64, high: f64) -> Result<Self, UniformDistributionError> {
        if !(low <= high) {
            return Err(UniformDistributionError::InvalidRange);
        }
        Ok(Self { low, high })
    }
}

impl Distribution<f64> for Uniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.low + rng.random_f64() * (self.high - self.low)
    }
}
