/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::grid::FractureGrid;
use crate::gridblock::{Gridblock, Point3};
use crate::localdfn::{IjkPoint, MacrofractureSegment, PropagationDirection, SegmentState};

/// One fully reassembled macrofracture in world (XYZ) space, joining a
/// block's `IPlus`/`IMinus` half-segments nucleated at the same point back
/// into the single fracture they represent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacrofractureXyz {
    pub global_id: u64,
    pub block_row: usize,
    pub block_col: usize,
    pub set_index: usize,
    pub dip_set_index: usize,
    pub start: Point3,
    pub end: Point3,
    pub half_length_m: f64,
    pub aperture_m: f64,
    pub nucleation_timestep: usize,
    pub weighted_nucleation_time_s: f64,
    pub state: SegmentState,
}

impl MacrofractureXyz {
    pub fn length_m(&self) -> f64 {
        2.0 * self.half_length_m
    }
}

/// One microfracture in world space: a centrepoint and radius, plus an
/// optional regular-polygon approximation of its penny shape (a point count
/// of 0 emits centrepoint+radius only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicrofractureXyz {
    pub global_id: u64,
    pub block_row: usize,
    pub block_col: usize,
    pub centrepoint: Point3,
    pub radius_m: f64,
    pub polygon: Vec<Point3>,
}

/// Bilinearly interpolates a local IJK point into world space across a
/// block's four top/bottom cornerpoints: `u = i/length_i`, `v = j/length_j`
/// select the areal position (clamped to the block's extent — segments
/// cropped at the boundary land exactly on an edge), `k` selects the depth
/// between the top and bottom corner surfaces.
fn ijk_to_xyz(gb: &Gridblock, p: IjkPoint, length_i_m: f64, length_j_m: f64, layer_thickness_m: f64) -> Point3 {
    let u = (p.i / length_i_m.max(f64::MIN_POSITIVE)).clamp(0.0, 1.0);
    let v = (p.j / length_j_m.max(f64::MIN_POSITIVE)).clamp(0.0, 1.0);
    let w = (p.k / layer_thickness_m.max(f64::MIN_POSITIVE)).clamp(0.0, 1.0);

    // corner order is NW(0) NE(1) SW(2) SE(3); u runs NW->NE/SW->SE, v runs
    // NW->SW/NE->SE.
    let bilerp = |c: [Point3; 4]| -> Point3 {
        let top = lerp(c[0], c[1], u);
        let bot = lerp(c[2], c[3], u);
        lerp(top, bot, v)
    };
    let top_corners = [gb.top_corner(0), gb.top_corner(1), gb.top_corner(2), gb.top_corner(3)];
    let bottom_corners = [gb.bottom_corner(0), gb.bottom_corner(1), gb.bottom_corner(2), gb.bottom_corner(3)];
    let at_top = bilerp(top_corners);
    let at_bottom = bilerp(bottom_corners);
    lerp(at_top, at_bottom, w)
}

fn lerp(a: Point3, b: Point3, t: f64) -> Point3 {
    Point3 { x: a.x + (b.x - a.x) * t, y: a.y + (b.y - a.y) * t, z_down: a.z_down + (b.z_down - a.z_down) * t }
}

/// Groups a block's `IPlus`/`IMinus` half-segments that share a nucleation
/// point back into pairs, keyed on everything fixed at nucleation time:
/// set, dip set, timestep, and the shared non-propagating node (its bit
/// pattern, since the two halves are copies of the exact same `f64`s).
fn pair_key(s: &MacrofractureSegment) -> (usize, usize, usize, u64, u64, u64) {
    (
        s.set_index,
        s.dip_set_index,
        s.nucleation_timestep,
        s.non_propagating_node.i.to_bits(),
        s.non_propagating_node.j.to_bits(),
        s.non_propagating_node.k.to_bits(),
    )
}

fn find(parent: &mut [usize], x: usize) -> usize {
    if parent[x] != x {
        parent[x] = find(parent, parent[x]);
    }
    parent[x]
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        parent[ra] = rb;
    }
}

/// Reassembles every present block's local segment pairs into world-space
/// macrofractures and assigns global ids in stable nucleation-time order,
/// ties broken by block then set. A lone half (its partner already pruned
/// by an earlier trimming pass) is emitted as a single-sided fracture
/// rather than dropped. Halves that continue a segment across a grid
/// boundary (`MacrofractureSegment::continuation_source`) are chained back
/// to the block they exited before global ids are handed out, so a
/// fracture spanning two blocks keeps a single id instead of acquiring one
/// per block.
pub fn assemble_macrofractures(grid: &FractureGrid) -> Vec<MacrofractureXyz> {
    let mut unordered: Vec<MacrofractureXyz> = Vec::new();
    // per-entry (same index as `unordered`): the local segment ids it was
    // built from, and the cross-block continuation source it carries, if any.
    let mut link_info: Vec<(Vec<u64>, Option<(usize, usize, u64)>)> = Vec::new();

    for p in grid.points() {
        let dims_and_segments = grid.with_block(p, |gb| {
            let dfn = gb.local_dfn();
            (dfn.length_i_m(), dfn.length_j_m(), gb.mech().layer_thickness_m(), dfn.segments().to_vec())
        });
        let Some((length_i_m, length_j_m, layer_thickness_m, segments)) = dims_and_segments else { continue };

        let mut by_key: HashMap<(usize, usize, usize, u64, u64, u64), Vec<&MacrofractureSegment>> = HashMap::new();
        for seg in &segments {
            by_key.entry(pair_key(seg)).or_default().push(seg);
        }

        grid.with_block(p, |gb| {
            for segs in by_key.values() {
                let plus = segs.iter().find(|s| s.direction == PropagationDirection::IPlus);
                let minus = segs.iter().find(|s| s.direction == PropagationDirection::IMinus);
                let (start, end, half_length_m, representative) = match (plus, minus) {
                    (Some(pl), Some(mi)) => (
                        ijk_to_xyz(gb, mi.propagating_node, length_i_m, length_j_m, layer_thickness_m),
                        ijk_to_xyz(gb, pl.propagating_node, length_i_m, length_j_m, layer_thickness_m),
                        (pl.half_length_m() + mi.half_length_m()) / 2.0,
                        *pl,
                    ),
                    (Some(pl), None) => (
                        ijk_to_xyz(gb, pl.non_propagating_node, length_i_m, length_j_m, layer_thickness_m),
                        ijk_to_xyz(gb, pl.propagating_node, length_i_m, length_j_m, layer_thickness_m),
                        pl.half_length_m(),
                        *pl,
                    ),
                    (None, Some(mi)) => (
                        ijk_to_xyz(gb, mi.propagating_node, length_i_m, length_j_m, layer_thickness_m),
                        ijk_to_xyz(gb, mi.non_propagating_node, length_i_m, length_j_m, layer_thickness_m),
                        mi.half_length_m(),
                        *mi,
                    ),
                    (None, None) => continue,
                };

                let aperture_m = gb
                    .fracture_sets()
                    .get(representative.set_index)
                    .and_then(|fs| fs.dip_sets().get(representative.dip_set_index))
                    .map(|ds| ds.aperture().dynamic_aperture(half_length_m))
                    .unwrap_or(0.0);

                let segment_ids: Vec<u64> = [plus.map(|s| s.id), minus.map(|s| s.id)].into_iter().flatten().collect();
                let continuation_source =
                    plus.and_then(|s| s.continuation_source).or_else(|| minus.and_then(|s| s.continuation_source));
                link_info.push((segment_ids, continuation_source));

                unordered.push(MacrofractureXyz {
                    global_id: 0,
                    block_row: p.row,
                    block_col: p.col,
                    set_index: representative.set_index,
                    dip_set_index: representative.dip_set_index,
                    start,
                    end,
                    half_length_m,
                    aperture_m,
                    nucleation_timestep: representative.nucleation_timestep,
                    weighted_nucleation_time_s: representative.weighted_nucleation_time_s,
                    state: representative.state(),
                });
            }
        });
    }

    // chain cross-block continuations together before handing out global
    // ids, so both halves of a boundary-spanning fracture land in one group.
    let mut id_to_index: HashMap<(usize, usize, u64), usize> = HashMap::new();
    for (idx, (ids, _)) in link_info.iter().enumerate() {
        for &id in ids {
            id_to_index.insert((unordered[idx].block_row, unordered[idx].block_col, id), idx);
        }
    }
    let mut parent: Vec<usize> = (0..unordered.len()).collect();
    for (idx, (_, continuation_source)) in link_info.iter().enumerate() {
        if let Some(origin) = continuation_source {
            if let Some(&origin_idx) = id_to_index.get(origin) {
                union(&mut parent, idx, origin_idx);
            }
        }
    }

    let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
    for idx in 0..unordered.len() {
        let root = find(&mut parent, idx);
        groups.entry(root).or_default().push(idx);
    }
    let mut group_order: Vec<(usize, f64, usize, usize, usize, usize)> = groups
        .into_iter()
        .map(|(root, members)| {
            let earliest = members
                .iter()
                .min_by(|&&a, &&b| {
                    unordered[a]
                        .weighted_nucleation_time_s
                        .partial_cmp(&unordered[b].weighted_nucleation_time_s)
                        .unwrap()
                        .then(unordered[a].block_row.cmp(&unordered[b].block_row))
                        .then(unordered[a].block_col.cmp(&unordered[b].block_col))
                        .then(unordered[a].set_index.cmp(&unordered[b].set_index))
                        .then(unordered[a].dip_set_index.cmp(&unordered[b].dip_set_index))
                })
                .copied()
                .unwrap();
            let f = &unordered[earliest];
            (root, f.weighted_nucleation_time_s, f.block_row, f.block_col, f.set_index, f.dip_set_index)
        })
        .collect();
    group_order.sort_by(|a, b| {
        a.1.partial_cmp(&b.1).unwrap().then(a.2.cmp(&b.2)).then(a.3.cmp(&b.3)).then(a.4.cmp(&b.4)).then(a.5.cmp(&b.5))
    });
    let root_to_gid: HashMap<usize, u64> =
        group_order.into_iter().enumerate().map(|(gid, (root, ..))| (root, (gid as u64) + 1)).collect();
    for idx in 0..unordered.len() {
        let root = find(&mut parent, idx);
        unordered[idx].global_id = root_to_gid[&root];
    }

    unordered.sort_by(|a, b| {
        a.global_id.cmp(&b.global_id).then(a.block_row.cmp(&b.block_row)).then(a.block_col.cmp(&b.block_col))
    });
    unordered
}

/// Generates the `n`-vertex regular polygon approximating a penny-shaped
/// microfracture, traced in the fracture's own local horizontal plane.
/// `n < 3` yields an empty polygon — the caller falls back to
/// centrepoint+radius output.
pub fn emit_regular_polygon(centre: Point3, radius_m: f64, n: u32) -> Vec<Point3> {
    if n < 3 {
        return Vec::new();
    }
    (0..n)
        .map(|k| {
            let theta = 2.0 * std::f64::consts::PI * (k as f64) / (n as f64);
            Point3 { x: centre.x + radius_m * theta.cos(), y: centre.y + radius_m * theta.sin(), z_down: centre.z_down }
        })
        .collect()
}

/// Reassembles every present block's microfractures into world space,
/// assigning global ids in nucleation order the same way macrofractures
/// are.
pub fn assemble_microfractures(grid: &FractureGrid, number_of_uf_points: u32) -> Vec<MicrofractureXyz> {
    let mut unordered = Vec::new();
    for p in grid.points() {
        let data = grid.with_block(p, |gb| {
            let dfn = gb.local_dfn();
            (dfn.length_i_m(), dfn.length_j_m(), gb.mech().layer_thickness_m(), dfn.microfractures().to_vec())
        });
        let Some((length_i_m, length_j_m, layer_thickness_m, microfractures)) = data else { continue };
        grid.with_block(p, |gb| {
            for uf in &microfractures {
                let centre = ijk_to_xyz(gb, uf.centrepoint, length_i_m, length_j_m, layer_thickness_m);
                unordered.push(MicrofractureXyz {
                    global_id: 0,
                    block_row: p.row,
                    block_col: p.col,
                    centrepoint: centre,
                    radius_m: uf.radius_m,
                    polygon: emit_regular_polygon(centre, uf.radius_m, number_of_uf_points),
                });
            }
        });
    }
    unordered.sort_by_key(|m| (m.block_row, m.block_col));
    for (idx, uf) in unordered.iter_mut().enumerate() {
        uf.global_id = (idx as u64) + 1;
    }
    unordered
}

/// Drops macrofractures shorter than `min_length_m` and, if `max_no_fractures`
/// is non-negative and still exceeded, trims the shortest surplus. Operates
/// on an already-extracted snapshot, never on the grid's live working DFN —
/// an intermediate output is a read-only cut of history, not a destructive
/// edit. Returns the number of fractures dropped.
pub fn cull_macrofracture_snapshot(fractures: &mut Vec<MacrofractureXyz>, min_length_m: f64, max_no_fractures: i64) -> usize {
    let before = fractures.len();
    fractures.retain(|f| f.length_m() >= min_length_m);
    if max_no_fractures >= 0 && fractures.len() as i64 > max_no_fractures {
        fractures.sort_by(|a, b| b.length_m().partial_cmp(&a.length_m()).unwrap());
        fractures.truncate(max_no_fractures as usize);
        fractures.sort_by_key(|f| f.global_id);
    }
    before - fractures.len()
}

/// Drops microfractures smaller than `min_radius_m`. Same
/// read-only-snapshot contract as [`cull_macrofracture_snapshot`].
pub fn cull_microfracture_snapshot(fractures: &mut Vec<MicrofractureXyz>, min_radius_m: f64) -> usize {
    let before = fractures.len();
    fractures.retain(|f| f.radius_m >= min_radius_m);
    before - fractures.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::PropagationControl;
    use crate::gridblock::BlockDimensions;
    use crate::mech::MechanicalProperties;
    use crate::time::TimeUnit;
    use fracture_grid::PointIndex;
    use fracture_rand::Xoshiro256;

    fn mech() -> MechanicalProperties {
        MechanicalProperties::new(3.0e10, 0.25, 0.8, 1.0, 0.6, 3.0, 1e-4, 50.0).unwrap()
    }

    fn control() -> PropagationControl {
        PropagationControl::new(0.05, 1e-3, 1e-3, 0.01, 50, 1.0, TimeUnit::Year).unwrap()
    }

    fn corners(z: f64) -> [Point3; 4] {
        [
            Point3 { x: 0.0, y: 0.0, z_down: z },
            Point3 { x: 1000.0, y: 0.0, z_down: z },
            Point3 { x: 0.0, y: 1000.0, z_down: z },
            Point3 { x: 1000.0, y: 1000.0, z_down: z },
        ]
    }

    fn block(row: usize, col: usize) -> Gridblock {
        Gridblock::new(
            row,
            col,
            mech(),
            control(),
            5.0e7,
            2.0e7,
            0.5,
            1025.0,
            BlockDimensions { length_i_m: 1000.0, length_j_m: 1000.0 },
            corners(1000.0),
            corners(1050.0),
        )
    }

    #[test]
    fn test_ijk_to_xyz_centre_of_block_is_centroid() {
        let gb = block(0, 0);
        let centre = ijk_to_xyz(&gb, IjkPoint::new(500.0, 500.0, 25.0), 1000.0, 1000.0, 50.0);
        assert!((centre.x - 500.0).abs() < 1e-9);
        assert!((centre.y - 500.0).abs() < 1e-9);
        assert!((centre.z_down - 1025.0).abs() < 1e-9);
    }

    #[test]
    fn test_assemble_macrofractures_pairs_segments_and_assigns_ascending_ids() {
        let grid = FractureGrid::new(1, 1);
        grid.place_block(PointIndex::new(0, 0), block(0, 0));
        grid.with_block_mut(PointIndex::new(0, 0), |gb| {
            let mut rng = Xoshiro256::from_seed(3);
            gb.local_dfn_mut().nucleate(0, 0, 2, 0, 10.0, 1.0, false, &mut rng).unwrap();
            gb.local_dfn_mut().advance_tips(1.0e6, 1.0e-6, true);
        });

        let assembled = assemble_macrofractures(&grid);
        assert_eq!(assembled.len(), 2);
        assert_eq!(assembled[0].global_id, 1);
        assert_eq!(assembled[1].global_id, 2);
        for frac in &assembled {
            assert!(frac.length_m() > 0.0);
        }
    }

    #[test]
    fn test_emit_regular_polygon_respects_point_count() {
        let centre = Point3 { x: 0.0, y: 0.0, z_down: 1000.0 };
        assert!(emit_regular_polygon(centre, 1.0, 0).is_empty());
        assert!(emit_regular_polygon(centre, 1.0, 2).is_empty());
        let hexagon = emit_regular_polygon(centre, 1.0, 6);
        assert_eq!(hexagon.len(), 6);
        for v in &hexagon {
            let r = ((v.x - centre.x).powi(2) + (v.y - centre.y).powi(2)).sqrt();
            assert!((r - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_cull_macrofracture_snapshot_drops_short_fractures() {
        let mut fractures = vec![
            MacrofractureXyz {
                global_id: 1,
                block_row: 0,
                block_col: 0,
                set_index: 0,
                dip_set_index: 0,
                start: Point3::default(),
                end: Point3 { x: 1.0, y: 0.0, z_down: 0.0 },
                half_length_m: 0.5,
                aperture_m: 1e-4,
                nucleation_timestep: 0,
                weighted_nucleation_time_s: 0.0,
                state: SegmentState::Active,
            },
            MacrofractureXyz {
                global_id: 2,
                block_row: 0,
                block_col: 0,
                set_index: 0,
                dip_set_index: 0,
                start: Point3::default(),
                end: Point3 { x: 100.0, y: 0.0, z_down: 0.0 },
                half_length_m: 50.0,
                aperture_m: 1e-4,
                nucleation_timestep: 0,
                weighted_nucleation_time_s: 0.0,
                state: SegmentState::Active,
            },
        ];
        let dropped = cull_macrofracture_snapshot(&mut fractures, 10.0, -1);
        assert_eq!(dropped, 1);
        assert_eq!(fractures.len(), 1);
        assert_eq!(fractures[0].global_id, 2);
    }

    #[test]
    fn test_cull_macrofracture_snapshot_trims_surplus_by_length() {
        let make = |id: u64, half_length: f64| MacrofractureXyz {
            global_id: id,
            block_row: 0,
            block_col: 0,
            set_index: 0,
            dip_set_index: 0,
            start: Point3::default(),
            end: Point3 { x: 2.0 * half_length, y: 0.0, z_down: 0.0 },
            half_length_m: half_length,
            aperture_m: 1e-4,
            nucleation_timestep: 0,
            weighted_nucleation_time_s: 0.0,
            state: SegmentState::Active,
        };
        let mut fractures = vec![make(1, 10.0), make(2, 20.0), make(3, 5.0)];
        cull_macrofracture_snapshot(&mut fractures, 0.0, 2);
        assert_eq!(fractures.len(), 2);
        let ids: Vec<u64> = fractures.iter().map(|f| f.global_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_cull_microfracture_snapshot_drops_small_radii() {
        let mut ufs = vec![
            MicrofractureXyz { global_id: 1, block_row: 0, block_col: 0, centrepoint: Point3::default(), radius_m: 0.01, polygon: vec![] },
            MicrofractureXyz { global_id: 2, block_row: 0, block_col: 0, centrepoint: Point3::default(), radius_m: 1.0, polygon: vec![] },
        ];
        let dropped = cull_microfracture_snapshot(&mut ufs, 0.1);
        assert_eq!(dropped, 1);
        assert_eq!(ufs.len(), 1);
    }
}
