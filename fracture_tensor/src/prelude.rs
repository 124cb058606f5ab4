/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
pub use crate::compliance4::Compliance4;
pub use crate::errors::TensorError;
pub use crate::partial_invert::{partial_invert_fixed_zz, partial_invert_fixed_zz_isotropic};
pub use crate::sym_tensor2::SymTensor2;
pub use crate::tensor::Tensor;
