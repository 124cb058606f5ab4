/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
use crate::errors::TensorError;
use crate::sym_tensor2::SymTensor2;

/// A symmetric 4th-order compliance tensor in 6x6 Voigt-notation form
/// (the 21 independent components of a general anisotropic compliance).
/// Voigt index order is `(xx, yy, zz, yz, zx, xy)`, matching
/// `SymTensor2::to_voigt`. Off-diagonal shear rows/columns carry the
/// engineering-shear-strain convention (factor of 2 folded into the matrix),
/// as is standard for Voigt compliance matrices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compliance4 {
    m: [[f64; 6]; 6],
}

impl Compliance4 {
    pub fn zero() -> Self {
        Self { m: [[0.0; 6]; 6] }
    }

    /// Builds the isotropic compliance matrix `S(E, nu)`.
    pub fn isotropic(young_modulus: f64, poisson_ratio: f64) -> Self {
        let e = young_modulus;
        let nu = poisson_ratio;
        let mut m = [[0.0; 6]; 6];
        for i in 0..3 {
            for j in 0..3 {
                m[i][j] = if i == j { 1.0 / e } else { -nu / e };
            }
        }
        let shear = 2.0 * (1.0 + nu) / e;
        for i in 3..6 {
            m[i][i] = shear;
        }
        Self { m }
    }

    pub fn matrix(&self) -> &[[f64; 6]; 6] {
        &self.m
    }

    /// Adds a per-fracture-set compliance contribution proportional to the
    /// dip-set's P32 (fracture area per unit volume) and its orientation, per
    /// the linear-slip model (Schoenberg): a highly compliant fracture set
    /// adds excess normal and shear compliance along its own normal direction,
    /// scaled by P32 and an empirical normal-stiffness weight `z_n`.
    pub fn add_fracture_set_contribution(&mut self, strike_azimuth_rad: f64, dip_rad: f64, p32: f64, z_n: f64) {
        let n = fracture_normal(strike_azimuth_rad, dip_rad);
        // Voigt-ordered outer product n_i n_j n_k n_l collapsed onto the 6
        // independent strain components, scaled by P32 * z_n.
        let nn = [
            n[0] * n[0],
            n[1] * n[1],
            n[2] * n[2],
            n[1] * n[2],
            n[2] * n[0],
            n[0] * n[1],
        ];
        let scale = p32 * z_n;
        for i in 0..6 {
            for j in 0..6 {
                self.m[i][j] += scale * nn[i] * nn[j];
            }
        }
    }

    /// Applies this compliance to a stress state, returning the resulting
    /// strain: `strain = S : stress`.
    pub fn apply_to_stress(&self, stress: SymTensor2) -> SymTensor2 {
        let sv = stress.to_voigt();
        let mut ev = [0.0; 6];
        for i in 0..6 {
            for j in 0..6 {
                ev[i] += self.m[i][j] * sv[j];
            }
        }
        // ev[3..6] come out as engineering shear strain; halve to recover the
        // tensor shear strain SymTensor2 expects.
        ev[3] /= 2.0;
        ev[4] /= 2.0;
        ev[5] /= 2.0;
        SymTensor2::from_voigt(ev)
    }

    /// Inverts the compliance to obtain the stiffness matrix (also returned
    /// as a `Compliance4` for convenient matrix access, even though the
    /// result is strictly a stiffness, not a compliance).
    pub fn invert(&self) -> Result<Compliance4, TensorError> {
        let inv = invert_6x6(&self.m)?;
        Ok(Compliance4 { m: inv })
    }
}

fn fracture_normal(strike_azimuth_rad: f64, dip_rad: f64) -> [f64; 3] {
    // Strike direction lies in the horizontal plane at `strike_azimuth_rad`;
    // the fracture plane's normal is perpendicular to strike, tilted by the
    // dip angle away from vertical.
    let strike_normal_azimuth = strike_azimuth_rad + std::f64::consts::FRAC_PI_2;
    let horizontal = dip_rad.sin();
    [
        horizontal * strike_normal_azimuth.cos(),
        horizontal * strike_normal_azimuth.sin(),
        dip_rad.cos(),
    ]
}

/// Gaussian elimination with partial pivoting, specialised to 6x6 since that
/// is the only size this crate ever inverts.
fn invert_6x6(matrix: &[[f64; 6]; 6]) -> Result<[[f64; 6]; 6], TensorError> {
    const N: usize = 6;
    let mut a = *matrix;
    let mut inv = [[0.0; N]; N];
    for i in 0..N {
        inv[i][i] = 1.0;
    }

    for col in 0..N {
        let mut pivot_row = col;
        let mut pivot_val = a[col][col].abs();
        for row in (col + 1)..N {
            if a[row][col].abs() > pivot_val {
                pivot_val = a[row][col].abs();
                pivot_row = row;
            }
        }
        if pivot_val < 1e-14 {
            return Err(TensorError::SingularMatrix);
        }
        if pivot_row != col {
            a.swap(col, pivot_row);
            inv.swap(col, pivot_row);
        }

        let pivot = a[col][col];
        for j in 0..N {
            a[col][j] /= pivot;
            inv[col][j] /= pivot;
        }

        for row in 0..N {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..N {
                a[row][j] -= factor * a[col][j];
                inv[row][j] -= factor * inv[col][j];
            }
        }
    }

    Ok(inv)
}
