/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
//! The two contractual DFN export formats: tab-separated ASCII
//! and the FAB tessellated-fracture format. Both writers target an arbitrary
//! `impl std::io::Write` sink — neither opens a file itself, so a caller can
//! write to a `File`, a `Vec<u8>`, or anything else that implements `Write`.

use std::io::Write;

use crate::errors::IoError;
use crate::globaldfn::MacrofractureXyz;

/// Writes the ASCII export: one tab-separated header row per fracture,
/// followed by a `Start Points` / `End Points` block each holding a single
/// `X \t Y \t Z` line. `Z` is carried positive-down throughout, per
/// [`crate::gridblock::Point3`]'s own convention, so no sign flip is needed at
/// this boundary.
pub fn write_ascii<W: Write>(writer: &mut W, macrofractures: &[MacrofractureXyz]) -> Result<(), IoError> {
    for frac in macrofractures {
        writeln!(
            writer,
            "{}\t{}\t{}\t{:.6}\t{:.6e}",
            frac.global_id, frac.set_index, frac.dip_set_index, frac.length_m(), frac.aperture_m
        )?;
        writeln!(writer, "Start Points")?;
        writeln!(writer, "{:.6}\t{:.6}\t{:.6}\t", frac.start.x, frac.start.y, frac.start.z_down)?;
        writeln!(writer, "End Points")?;
        writeln!(writer, "{:.6}\t{:.6}\t{:.6}\t", frac.end.x, frac.end.y, frac.end.z_down)?;
    }
    Ok(())
}

fn quad_normal(nodes: &[[f64; 3]; 4]) -> [f64; 3] {
    let u = [nodes[1][0] - nodes[0][0], nodes[1][1] - nodes[0][1], nodes[1][2] - nodes[0][2]];
    let v = [nodes[3][0] - nodes[0][0], nodes[3][1] - nodes[0][1], nodes[3][2] - nodes[0][2]];
    let n = [u[1] * v[2] - u[2] * v[1], u[2] * v[0] - u[0] * v[2], u[0] * v[1] - u[1] * v[0]];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len < 1e-300 {
        [0.0, 0.0, 1.0]
    } else {
        [n[0] / len, n[1] / len, n[2] / len]
    }
}

/// Tessellates one macrofracture into the four corners FAB expects
/// (start/end at the top and bottom of the layer), since the explicit model
/// tracks only a single mid-layer node per tip (nucleation sits at `k =
/// layerThickness/2`): `layer_thickness_m` recovers the fracture's full
/// vertical extent, which spans the whole layer thickness.
fn fracture_quad(frac: &MacrofractureXyz, layer_thickness_m: f64) -> [[f64; 3]; 4] {
    let half = layer_thickness_m.max(0.0) / 2.0;
    [
        [frac.start.x, frac.start.y, frac.start.z_down - half],
        [frac.end.x, frac.end.y, frac.end.z_down - half],
        [frac.end.x, frac.end.y, frac.end.z_down + half],
        [frac.start.x, frac.start.y, frac.start.z_down + half],
    ]
}

/// Writes the FAB export: `BEGIN FORMAT`/`BEGIN PROPERTIES`
/// (three `Real*4` properties: Permeability, Compressibility, Aperture)
/// /`BEGIN SETS` (one set) /`BEGIN FRACTURE` listing every fracture as a
/// summary line (`No_Fractures No_Nodes`), one header line per fracture (id,
/// node count, set, three properties), four indexed `node X Y Z` lines, and
/// a terminating unit normal-vector line, then empty `TESSFRACTURE` and
/// `ROCKBLOCK` sections.
pub fn write_fab<W: Write>(
    writer: &mut W,
    macrofractures: &[MacrofractureXyz],
    layer_thickness_m: f64,
    default_permeability: f64,
    default_compressibility: f64,
) -> Result<(), IoError> {
    if macrofractures.is_empty() {
        return Err(IoError::EmptyFractureSet);
    }

    writeln!(writer, "BEGIN FORMAT")?;
    writeln!(writer, "Format: FAB")?;
    writeln!(writer, "END FORMAT")?;

    writeln!(writer, "BEGIN PROPERTIES")?;
    writeln!(writer, "Name=\"Permeability\" Type=\"Real*4\"")?;
    writeln!(writer, "Name=\"Compressibility\" Type=\"Real*4\"")?;
    writeln!(writer, "Name=\"Aperture\" Type=\"Real*4\"")?;
    writeln!(writer, "END PROPERTIES")?;

    writeln!(writer, "BEGIN SETS")?;
    writeln!(writer, "Set")?;
    writeln!(writer, "END SETS")?;

    const NODES_PER_FRACTURE: usize = 4;
    let no_fractures = macrofractures.len();
    let no_nodes = no_fractures * NODES_PER_FRACTURE;

    writeln!(writer, "BEGIN FRACTURE")?;
    writeln!(writer, "{no_fractures} {no_nodes}")?;
    for frac in macrofractures {
        writeln!(
            writer,
            "{} {} {} {:.6e} {:.6e} {:.6e}",
            frac.global_id,
            NODES_PER_FRACTURE,
            frac.set_index + 1,
            default_permeability,
            default_compressibility,
            frac.aperture_m
        )?;
        let quad = fracture_quad(frac, layer_thickness_m);
        for (idx, node) in quad.iter().enumerate() {
            writeln!(writer, "{} {:.6} {:.6} {:.6}", idx + 1, node[0], node[1], node[2])?;
        }
        let normal = quad_normal(&quad);
        writeln!(writer, "{:.6} {:.6} {:.6}", normal[0], normal[1], normal[2])?;
    }
    writeln!(writer, "END FRACTURE")?;

    writeln!(writer, "BEGIN TESSFRACTURE")?;
    writeln!(writer, "END TESSFRACTURE")?;

    writeln!(writer, "BEGIN ROCKBLOCK")?;
    writeln!(writer, "END ROCKBLOCK")?;

    Ok(())
}
