//! NavMesh extraction: quad-sample the walkable surface at a coarse
//! resolution into a shared vertex/index buffer a game engine's navigation
//! system can consume directly, skipping blocked, water, and visual-only
//! cells and any quad whose corners span too large a height difference to
//! be a single walkable surface.
//!
//! No direct teacher analogue (the teacher exports heightmaps and masks,
//! never a mesh); grounded on the shared-vertex deduplication idiom common
//! to terrain mesh builders in `other_examples/` (key each vertex by its
//! integer grid position in a `HashMap` so adjacent quads reuse vertices
//! instead of duplicating them).

use std::collections::HashMap;

use crate::grid::{CellFlags, Grid};

/// Default sampling interval in cells, per the specification's "typically 8".
pub const DEFAULT_RESOLUTION: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Default)]
pub struct NavMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

fn is_walkable(grid: &Grid, x: usize, y: usize) -> bool {
    let f = grid.flags_at(x, y);
    f.has(CellFlags::PLAYABLE) && !f.has(CellFlags::BLOCKED) && !f.has(CellFlags::VISUAL_ONLY)
}

/// Builds a quad mesh by sampling a cell every `resolution` cells along each
/// axis. A sampled quad is emitted only if all four corners are walkable
/// and their height spread is within `step_height * 2`; each corner vertex
/// is looked up (and inserted on first use) in a `(x, y)` keyed map, so a
/// corner shared by up to four quads is emitted exactly once.
pub fn build(grid: &Grid, cell_size: f32, resolution: usize, step_height: f32) -> NavMesh {
    let step = resolution.max(1);
    let mut vertex_index: HashMap<(usize, usize), u32> = HashMap::new();
    let mut mesh = NavMesh::default();

    let mut vertex_for = |x: usize, y: usize, mesh: &mut NavMesh| -> u32 {
        *vertex_index.entry((x, y)).or_insert_with(|| {
            let idx = mesh.vertices.len() as u32;
            mesh.vertices.push(Vertex {
                x: x as f32 * cell_size,
                y: y as f32 * cell_size,
                z: grid.height_at(x.min(grid.cols - 1), y.min(grid.rows - 1)),
            });
            idx
        })
    };

    let max_spread = step_height * 2.0;
    let mut y = 0;
    while y + step < grid.rows {
        let mut x = 0;
        while x + step < grid.cols {
            let corners = [(x, y), (x + step, y), (x + step, y + step), (x, y + step)];
            if corners.iter().all(|&(cx, cy)| is_walkable(grid, cx, cy)) {
                let heights: Vec<f32> = corners.iter().map(|&(cx, cy)| grid.height_at(cx, cy)).collect();
                let spread = heights.iter().cloned().fold(f32::MIN, f32::max)
                    - heights.iter().cloned().fold(f32::MAX, f32::min);

                if spread <= max_spread {
                    let v = corners.map(|(cx, cy)| vertex_for(cx, cy, &mut mesh));
                    // Two triangles per quad, wound consistently
                    // (counter-clockwise looking down the -z axis).
                    mesh.indices.extend_from_slice(&[v[0], v[1], v[2], v[0], v[2], v[3]]);
                }
            }
            x += step;
        }
        y += step;
    }

    mesh
}

impl NavMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
