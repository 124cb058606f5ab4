/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
#![forbid(unsafe_code)]

pub mod compliance4;
pub mod errors;
pub mod partial_invert;
pub mod sym_tensor2;
pub mod tensor;

pub mod prelude;

pub use crate::compliance4::Compliance4;
pub use crate::errors::TensorError;
pub use crate::partial_invert::{partial_invert_fixed_zz, partial_invert_fixed_zz_isotropic};
pub use crate::sym_tensor2::SymTensor2;
pub use crate::tensor::Tensor;
