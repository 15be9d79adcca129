//! Road network planning: connect POIs with a loop-augmented minimum
//! spanning tree, route each edge with terrain-aware A*, simplify and
//! rasterize the result onto the grid, then grade ramps across any level
//! transition the route crosses.

pub mod astar;
pub mod dilate;
pub mod graph;
pub mod ramps;
pub mod simplify;

use crate::config::RoadsConfig;
use crate::error::GenError;
use crate::grid::Grid;
use crate::poi::Poi;

#[derive(Debug, Clone)]
pub struct RoadSegment {
    pub id: u32,
    pub from_poi: usize,
    pub to_poi: usize,
    pub spine: Vec<(usize, usize)>,
}

/// Runs the full road-planning pipeline and bakes the result into `grid`:
/// ROAD flags, road_id tags, and RAMP strips across level transitions.
/// Returns the planned segments for export/project serialization.
///
/// MST edges are load-bearing for POI connectivity (the specification's
/// road planner is the sole stage allowed to raise `GenerationFailure`), so
/// a missing path on one of them aborts the whole run; loop-augmenting
/// extra edges are best-effort shortcuts and are simply dropped if A* can't
/// route them.
pub fn plan_and_apply(
    grid: &mut Grid,
    pois: &[Poi],
    cfg: &RoadsConfig,
    max_step: f32,
) -> Result<Vec<RoadSegment>, GenError> {
    if pois.len() < 2 {
        return Ok(Vec::new());
    }

    let candidates = graph::candidate_edges(pois, cfg.level_penalty);
    let mst = graph::kruskal_mst(&candidates, pois.len());
    let extra = graph::add_loop_edges(&candidates, &mst, cfg.max_extra_edges_fraction);

    let mut segments = Vec::new();
    let mut next_id = 0u32;

    // Rasterized in ascending MST weight order (mst is already sorted that
    // way out of `kruskal_mst`) so the reuse discount in `astar::step_cost`
    // is applied deterministically: shorter edges claim shared cells first.
    for (edge, required) in mst.iter().map(|e| (e, true)).chain(extra.iter().map(|e| (e, false))) {
        let start = (pois[edge.from].x, pois[edge.from].y);
        let goal = (pois[edge.to].x, pois[edge.to].y);

        let raw_path = match astar::find_path(grid, cfg, start, goal) {
            Some(path) => path,
            None if required => {
                return Err(GenError::generation(
                    "roads:astar",
                    format!("no path found between POI {} and POI {}", edge.from, edge.to),
                ));
            }
            None => continue,
        };

        let simplified = simplify::douglas_peucker(&raw_path, cfg.simplify_tolerance);
        let spine = simplify::rasterize_polyline(&simplified);

        let id = next_id;
        next_id += 1;

        dilate::dilate(grid, &spine, cfg.road_width, id);
        dilate::smooth_band(grid, &spine, cfg.smoothing_band);

        for strip in ramps::find_transitions(grid, &spine, &cfg.ramps) {
            ramps::realize(grid, &strip, max_step, cfg.ramps.curve);
        }

        segments.push(RoadSegment { id, from_poi: edge.from, to_poi: edge.to, spine });
    }

    Ok(segments)
}

/// Breadth-first reachability pass over `PLAYABLE` cells, 4-connected,
/// seeded from every POI. Cells left unvisited are demoted to scenery
/// (`PLAYABLE = false`) per invariant I5 and the road planner's
/// post-condition: a patch of land the road network never reaches is
/// background, not walkable space.
pub fn refine_playable_reachability(grid: &mut Grid, pois: &[Poi]) {
    use std::collections::VecDeque;
    use crate::grid::CellFlags;

    let mut visited = vec![false; grid.flags.len()];
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();

    for poi in pois {
        let i = grid.idx(poi.x, poi.y);
        if grid.flags[i].has(CellFlags::PLAYABLE) && !visited[i] {
            visited[i] = true;
            queue.push_back((poi.x, poi.y));
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        for (nx, ny) in grid.neighbors4(x, y) {
            let i = grid.idx(nx, ny);
            if !visited[i] && grid.flags[i].has(CellFlags::PLAYABLE) {
                visited[i] = true;
                queue.push_back((nx, ny));
            }
        }
    }

    for i in 0..grid.flags.len() {
        if grid.flags[i].has(CellFlags::PLAYABLE) && !visited[i] {
            grid.flags[i].clear(CellFlags::PLAYABLE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellFlags;
    use crate::poi::PoiKind;

    fn poi(x: usize, y: usize) -> Poi {
        Poi { id: 0, x, y, level_id: 0, kind: PoiKind::Settlement }
    }

    #[test]
    fn plans_roads_connecting_every_poi() {
        let mut g = Grid::new(32, 32);
        let pois = vec![poi(2, 2), poi(29, 2), poi(29, 29), poi(2, 29)];
        let cfg = RoadsConfig::default();
        let segments = plan_and_apply(&mut g, &pois, &cfg, 3.0).unwrap();
        assert_eq!(segments.len(), pois.len() - 1);
        for seg in &segments {
            let (sx, sy) = seg.spine[0];
            assert!(g.flags_at(sx, sy).has(CellFlags::ROAD));
        }
    }

    #[test]
    fn fewer_than_two_pois_produces_no_roads() {
        let mut g = Grid::new(10, 10);
        let pois = vec![poi(5, 5)];
        let cfg = RoadsConfig::default();
        assert!(plan_and_apply(&mut g, &pois, &cfg, 3.0).unwrap().is_empty());
    }

    #[test]
    fn unreachable_poi_raises_generation_failure() {
        let mut g = Grid::new(12, 12);
        for y in 0..12 {
            g.flags_at_mut(6, y).set(CellFlags::BLOCKED);
        }
        let pois = vec![poi(2, 6), poi(10, 6)];
        let cfg = RoadsConfig::default();
        let result = plan_and_apply(&mut g, &pois, &cfg, 3.0);
        assert!(matches!(result, Err(crate::error::GenError::GenerationFailure { .. })));
    }

    #[test]
    fn reachability_pass_demotes_isolated_playable_pockets() {
        let mut g = Grid::new(10, 1);
        for f in g.flags.iter_mut() {
            f.set(CellFlags::PLAYABLE);
        }
        // A single cell island of playable land, disconnected from the POI
        // at x=0 by a non-playable gap at x=5.
        g.flags_at_mut(5, 0).assign(CellFlags::PLAYABLE, false);
        let pois = vec![poi(0, 0)];

        refine_playable_reachability(&mut g, &pois);

        assert!(g.flags_at(4, 0).has(CellFlags::PLAYABLE));
        assert!(!g.flags_at(6, 0).has(CellFlags::PLAYABLE));
    }
}
