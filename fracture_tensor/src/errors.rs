/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    ShapeMismatch,
    SingularMatrix,
    IndexOutOfBounds,
}

impl Error for TensorError {}

impl fmt::Display for TensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TensorError::ShapeMismatch => write!(f, "tensor data length does not match shape"),
            TensorError::SingularMatrix => write!(f, "matrix is singular and cannot be inverted"),
            TensorError::IndexOutOfBounds => write!(f, "tensor index out of bounds"),
        }
    }
}
