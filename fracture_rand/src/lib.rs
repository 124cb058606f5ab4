/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
#![forbid(unsafe_code)]

pub mod core;
pub mod dist;
pub mod errors;
pub mod prelude;

pub use crate::core::{Rng, RngCore, Xoshiro256};
pub use crate::dist::{Bernoulli, Distribution, Uniform};
pub use crate::errors::{BernoulliDistributionError, UniformDistributionError};
