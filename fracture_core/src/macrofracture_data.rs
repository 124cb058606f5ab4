/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */

/// One bin of the piecewise cumulative macrofracture-length distribution:
/// the cumulative active/static-stress-shadow/static-intersection P30
/// (count density) and P32 (area density) for fractures whose half-length is
/// at most `upper_half_length_m`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MacrofractureLengthBin {
    pub upper_half_length_m: f64,
    pub a_p30: f64,
    pub s_ii_p30: f64,
    pub s_ij_p30: f64,
    pub a_p32: f64,
    pub s_ii_p32: f64,
    pub s_ij_p32: f64,
}

impl MacrofractureLengthBin {
    pub fn total_p30(&self) -> f64 {
        self.a_p30 + self.s_ii_p30 + self.s_ij_p30
    }

    pub fn total_p32(&self) -> f64 {
        self.a_p32 + self.s_ii_p32 + self.s_ij_p32
    }
}

/// The piecewise cumulative macrofracture-length distribution for one dip
/// set, built up bin by bin as
/// half-length classes accrue density across timesteps. Bins are always kept
/// sorted by `upper_half_length_m`, and each bin's cumulative fields are
/// non-decreasing with bin index, by construction of [`Self::add_bin`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MacrofractureData {
    bins: Vec<MacrofractureLengthBin>,
}

impl MacrofractureData {
    pub fn new() -> Self {
        Self { bins: Vec::new() }
    }

    pub fn bins(&self) -> &[MacrofractureLengthBin] {
        &self.bins
    }

    /// Appends (or extends, if `upper_half_length_m` matches the last bin) a
    /// bin with the given incremental densities. Cumulative values are
    /// carried from the previous bin plus the increments, guaranteeing
    /// monotone non-decreasing cumulative counts.
    pub fn add_bin(&mut self, upper_half_length_m: f64, d_a_p30: f64, d_s_ii_p30: f64, d_s_ij_p30: f64, d_a_p32: f64, d_s_ii_p32: f64, d_s_ij_p32: f64) {
        let prev = self.bins.last().copied().unwrap_or_default();
        self.bins.push(MacrofractureLengthBin {
            upper_half_length_m,
            a_p30: prev.a_p30 + d_a_p30.max(0.0),
            s_ii_p30: prev.s_ii_p30 + d_s_ii_p30.max(0.0),
            s_ij_p30: prev.s_ij_p30 + d_s_ij_p30.max(0.0),
            a_p32: prev.a_p32 + d_a_p32.max(0.0),
            s_ii_p32: prev.s_ii_p32 + d_s_ii_p32.max(0.0),
            s_ij_p32: prev.s_ij_p32 + d_s_ij_p32.max(0.0),
        });
    }

    /// Linear interpolation of the cumulative bin values at an arbitrary
    /// half-length; used by the explicit propagator to look up expected
    /// density below a given half-length cutoff.
    pub fn interpolate(&self, half_length_m: f64) -> MacrofractureLengthBin {
        if self.bins.is_empty() {
            return MacrofractureLengthBin::default();
        }
        if half_length_m <= self.bins[0].upper_half_length_m {
            let lo = MacrofractureLengthBin { upper_half_length_m: 0.0, ..Default::default() };
            return Self::lerp(&lo, &self.bins[0], half_length_m);
        }
        for w in self.bins.windows(2) {
            if half_length_m <= w[1].upper_half_length_m {
                return Self::lerp(&w[0], &w[1], half_length_m);
            }
        }
        *self.bins.last().unwrap()
    }

    fn lerp(lo: &MacrofractureLengthBin, hi: &MacrofractureLengthBin, half_length_m: f64) -> MacrofractureLengthBin {
        let span = hi.upper_half_length_m - lo.upper_half_length_m;
        let t = if span > 0.0 {
            ((half_length_m - lo.upper_half_length_m) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        MacrofractureLengthBin {
            upper_half_length_m: half_length_m,
            a_p30: lo.a_p30 + t * (hi.a_p30 - lo.a_p30),
            s_ii_p30: lo.s_ii_p30 + t * (hi.s_ii_p30 - lo.s_ii_p30),
            s_ij_p30: lo.s_ij_p30 + t * (hi.s_ij_p30 - lo.s_ij_p30),
            a_p32: lo.a_p32 + t * (hi.a_p32 - lo.a_p32),
            s_ii_p32: lo.s_ii_p32 + t * (hi.s_ii_p32 - lo.s_ii_p32),
            s_ij_p32: lo.s_ij_p32 + t * (hi.s_ij_p32 - lo.s_ij_p32),
        }
    }

    pub fn total(&self) -> MacrofractureLengthBin {
        self.bins.last().copied().unwrap_or_default()
    }
}
