/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
use crate::errors::TensorError;

/// A generic, row-major, N-dimensional tensor: owned data plus a shape and the
/// strides derived from it. `new` validates `data.len() ==
/// shape.iter().product()`; no einsum/SVD machinery is carried here since
/// everything the fracture calculator needs is expressed directly against
/// `SymTensor2`/`Compliance4` below.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T> {
    data: Vec<T>,
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl<T> Tensor<T> {
    pub fn new(data: Vec<T>, shape: Vec<usize>) -> Result<Self, TensorError> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(TensorError::ShapeMismatch);
        }
        let strides = Self::strides_for(&shape);
        Ok(Self {
            data,
            shape,
            strides,
        })
    }

    fn strides_for(shape: &[usize]) -> Vec<usize> {
        let mut strides = vec![1usize; shape.len()];
        for i in (0..shape.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * shape[i + 1];
        }
        strides
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn flat_index(&self, idx: &[usize]) -> Option<usize> {
        if idx.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0;
        for (i, &ix) in idx.iter().enumerate() {
            if ix >= self.shape[i] {
                return None;
            }
            flat += ix * self.strides[i];
        }
        Some(flat)
    }

    pub fn get(&self, idx: &[usize]) -> Result<&T, TensorError> {
        self.flat_index(idx)
            .map(|flat| &self.data[flat])
            .ok_or(TensorError::IndexOutOfBounds)
    }

    pub fn get_mut(&mut self, idx: &[usize]) -> Result<&mut T, TensorError> {
        let flat = self.flat_index(idx).ok_or(TensorError::IndexOutOfBounds)?;
        Ok(&mut self.data[flat])
    }
}
