/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
pub use crate::core::{Rng, RngCore, Xoshiro256};
pub use crate::dist::{Bernoulli, Distribution, Uniform};
pub use crate::errors::{BernoulliDistributionError, UniformDistributionError};
