//! Path post-processing: Douglas-Peucker simplification to cut the A*
//! staircase down to a handful of control points, then Bresenham
//! rasterization to turn those control points back into a cell path for
//! rendering onto the grid.
//!
//! Bresenham is taken essentially verbatim from the teacher's
//! `structures::generation::roads::bresenham_line`; Douglas-Peucker has no
//! analogue in the teacher and is grounded on the standard recursive
//! furthest-point formulation.

/// Recursively keeps only the points that deviate from the straight line
/// between the current segment's endpoints by more than `tolerance`.
pub fn douglas_peucker(points: &[(usize, usize)], tolerance: f32) -> Vec<(usize, usize)> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let (first, last) = (points[0], points[points.len() - 1]);
    let mut max_dist = 0.0f32;
    let mut max_index = 0;

    for (i, &p) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = perpendicular_distance(p, first, last);
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }

    if max_dist > tolerance {
        let mut left = douglas_peucker(&points[..=max_index], tolerance);
        let right = douglas_peucker(&points[max_index..], tolerance);
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

fn perpendicular_distance(p: (usize, usize), a: (usize, usize), b: (usize, usize)) -> f32 {
    let (px, py) = (p.0 as f32, p.1 as f32);
    let (ax, ay) = (a.0 as f32, a.1 as f32);
    let (bx, by) = (b.0 as f32, b.1 as f32);

    let dx = bx - ax;
    let dy = by - ay;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-6 {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }

    ((dy * px - dx * py + bx * ay - by * ax) / len).abs()
}

/// Standard integer Bresenham line between two cells, inclusive of both
/// endpoints.
pub fn bresenham_line(from: (usize, usize), to: (usize, usize)) -> Vec<(usize, usize)> {
    let (mut x0, mut y0) = (from.0 as i64, from.1 as i64);
    let (x1, y1) = (to.0 as i64, to.1 as i64);

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut points = Vec::new();
    loop {
        points.push((x0 as usize, y0 as usize));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }

    points
}

/// Rasterizes a simplified control-point polyline back into a dense cell
/// path by running Bresenham between consecutive control points.
pub fn rasterize_polyline(control_points: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for window in control_points.windows(2) {
        let mut segment = bresenham_line(window[0], window[1]);
        if !out.is_empty() {
            segment.remove(0);
        }
        out.append(&mut segment);
    }
    if out.is_empty() {
        out.extend_from_slice(control_points);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn douglas_peucker_collapses_a_straight_line() {
        let points: Vec<_> = (0..20).map(|i| (i, i)).collect();
        let simplified = douglas_peucker(&points, 0.5);
        assert_eq!(simplified.len(), 2);
    }

    #[test]
    fn douglas_peucker_keeps_a_sharp_corner() {
        let mut points: Vec<(usize, usize)> = (0..10).map(|i| (i, 0)).collect();
        points.extend((0..10).map(|i| (9, i)));
        let simplified = douglas_peucker(&points, 0.5);
        assert!(simplified.len() >= 3);
    }

    #[test]
    fn bresenham_covers_a_diagonal() {
        let line = bresenham_line((0, 0), (4, 4));
        assert_eq!(line.first(), Some(&(0, 0)));
        assert_eq!(line.last(), Some(&(4, 4)));
        assert_eq!(line.len(), 5);
    }

    #[test]
    fn rasterize_polyline_has_no_gaps() {
        let control = vec![(0, 0), (5, 0), (5, 5)];
        let path = rasterize_polyline(&control);
        for window in path.windows(2) {
            let dx = (window[0].0 as i64 - window[1].0 as i64).abs();
            let dy = (window[0].1 as i64 - window[1].1 as i64).abs();
            assert!(dx <= 1 && dy <= 1);
        }
    }
}
