/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
use crate::compliance4::Compliance4;
use crate::errors::TensorError;
use crate::sym_tensor2::SymTensor2;

/// Solves for the vertical strain and the in-plane stresses given the
/// horizontal strains and a fixed vertical (effective) stress — the
/// plane-strain-like enforcement that keeps the vertical stress lithostatic
/// while the horizontal strain rates drive deformation. Shear components are
/// assumed zero for this subproblem; dip-set shear response is handled
/// separately.
///
/// Returns `(strain, stress)` with `stress.zz == sigma_zz_fixed` exactly.
pub fn partial_invert_fixed_zz(
    compliance: &Compliance4,
    eps_xx: f64,
    eps_yy: f64,
    sigma_zz_fixed: f64,
) -> Result<(SymTensor2, SymTensor2), TensorError> {
    let stiffness = compliance.invert()?;
    let c = stiffness.matrix();

    let eps_zz = (sigma_zz_fixed - c[2][0] * eps_xx - c[2][1] * eps_yy) / c[2][2];
    let sigma_xx = c[0][0] * eps_xx + c[0][1] * eps_yy + c[0][2] * eps_zz;
    let sigma_yy = c[1][0] * eps_xx + c[1][1] * eps_yy + c[1][2] * eps_zz;

    let strain = SymTensor2::new(eps_xx, eps_yy, eps_zz, 0.0, 0.0, 0.0);
    let stress = SymTensor2::new(sigma_xx, sigma_yy, sigma_zz_fixed, 0.0, 0.0, 0.0);
    Ok((strain, stress))
}

/// Closed-form fast path of [`partial_invert_fixed_zz`] for isotropic
/// compliance, avoiding the general 6x6 inversion. Uses the standard Lamé
/// stiffness coefficients directly.
pub fn partial_invert_fixed_zz_isotropic(
    young_modulus: f64,
    poisson_ratio: f64,
    eps_xx: f64,
    eps_yy: f64,
    sigma_zz_fixed: f64,
) -> (SymTensor2, SymTensor2) {
    let e = young_modulus;
    let nu = poisson_ratio;
    let denom = (1.0 + nu) * (1.0 - 2.0 * nu);
    let c_diag = e * (1.0 - nu) / denom;
    let c_off = e * nu / denom;

    let eps_zz = (sigma_zz_fixed - c_off * (eps_xx + eps_yy)) / c_diag;
    let sigma_xx = c_diag * eps_xx + c_off * eps_yy + c_off * eps_zz;
    let sigma_yy = c_off * eps_xx + c_diag * eps_yy + c_off * eps_zz;

    let strain = SymTensor2::new(eps_xx, eps_yy, eps_zz, 0.0, 0.0, 0.0);
    let stress = SymTensor2::new(sigma_xx, sigma_yy, sigma_zz_fixed, 0.0, 0.0, 0.0);
    (strain, stress)
}
