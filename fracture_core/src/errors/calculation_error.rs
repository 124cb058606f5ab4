/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
use std::error::Error;
use std::fmt;

use fracture_tensor::TensorError;

/// Calculation-time failures that are not configuration errors. Most "error
/// kinds" at this layer are *not* fatal (iteration-cap, thickness-cutoff,
/// numerical-termination are all clean, reportable outcomes carried as
/// fields on result types, not `Err` variants) — this enum exists for the
/// remaining genuinely-exceptional cases: a singular tensor inversion, or a
/// dip set whose driving-stress solve cannot proceed.
#[derive(Debug, Clone, PartialEq)]
pub enum CalculationError {
    Tensor(TensorError),
    NoActiveFractureSet,
    RandomSourceExhausted(String),
}

impl Error for CalculationError {}

impl fmt::Display for CalculationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalculationError::Tensor(e) => write!(f, "tensor operation failed: {e}"),
            CalculationError::NoActiveFractureSet => {
                write!(f, "no fracture set available to receive the applied deformation")
            }
            CalculationError::RandomSourceExhausted(msg) => {
                write!(f, "random source error: {msg}")
            }
        }
    }
}

impl From<TensorError> for CalculationError {
    fn from(err: TensorError) -> Self {
        CalculationError::Tensor(err)
    }
}
