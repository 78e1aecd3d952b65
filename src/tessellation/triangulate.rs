use tracing::trace;

use crate::math::distance_2d::point_to_segment_dist;
use crate::math::intersect_2d::lines_cross;
use crate::math::polygon_2d::{in_cone, is_reflex, turn, winding};
use crate::math::{Point2, TOLERANCE};

/// Triangulates a simple polygon by recursive ear clipping.
///
/// Triangles are fanned from the first corner of the working list. When the
/// next fan triangle `(first, list[i], list[i + 1])` is not an ear, the scan
/// looks further ahead for a corner `list[j]` that closes a valid triangle
/// `(first, list[i], list[j])`; the pocket `list[i..=j]` is cut off along the
/// diagonal `list[i] -> list[j]` and triangulated recursively before the fan
/// continues. Triangles share the polygon's winding.
///
/// A simple polygon of `n` corners, including one with straight (collinear)
/// corners, yields `n - 2` non-degenerate triangles. If the fan from the first
/// corner comes up short, the fan is retried from each other corner in turn.
/// If no corner gives a complete fan (self-intersecting or degenerate input)
/// the longest partial fan is returned.
#[must_use]
pub fn triangulate(points: &[Point2]) -> Vec<[u32; 3]> {
    if points.len() < 3 {
        return Vec::new();
    }
    let clipper = EarClipper {
        points,
        winding: winding(points),
    };
    let corners: Vec<usize> = (0..points.len()).collect();
    clipper.clip(&corners)
}

struct EarClipper<'a> {
    points: &'a [Point2],
    winding: f64,
}

impl EarClipper<'_> {
    fn clip(&self, list: &[usize]) -> Vec<[u32; 3]> {
        let expected = list.len() - 2;
        let mut best = Vec::new();
        for start in 0..list.len() {
            let mut rotated = list.to_vec();
            rotated.rotate_left(start);
            let triangles = self.fan(rotated);
            if triangles.len() == expected {
                return triangles;
            }
            trace!(start, emitted = triangles.len(), expected, "incomplete fan");
            if triangles.len() > best.len() {
                best = triangles;
            }
        }
        best
    }

    fn fan(&self, mut list: Vec<usize>) -> Vec<[u32; 3]> {
        let mut triangles = Vec::with_capacity(list.len().saturating_sub(2));
        if list.len() < 3 {
            return triangles;
        }
        let first = list[0];
        let mut i = 1;
        while i + 1 < list.len() {
            // Polygon still to be covered: `first` followed by `list[i..]`.
            let current: Vec<usize> = std::iter::once(first).chain(list[i..].iter().copied()).collect();
            let Some(q) = (2..current.len()).find(|&q| self.is_valid_triangle(&current, q)) else {
                trace!(first, corner = list[i], "no valid ear, dropping triangle");
                i += 1;
                continue;
            };

            let j = i + q - 1;
            if j > i + 1 {
                triangles.extend(self.fan(list[i..=j].to_vec()));
                list.drain(i + 1..j);
            }
            triangles.push([index(first), index(list[i]), index(list[i + 1])]);
            i += 1;
        }
        triangles
    }

    /// Tests triangle `(current[0], current[1], current[q])`.
    fn is_valid_triangle(&self, current: &[usize], q: usize) -> bool {
        let len = current.len();
        let p = |k: usize| &self.points[current[k]];
        if is_reflex(p(0), p(1), p(q), self.winding) || is_sliver(p(0), p(1), p(q)) {
            return false;
        }
        (q == len - 1 || self.is_diagonal(current, 0, q)) && (q == 2 || self.is_diagonal(current, 1, q))
    }

    /// Tests whether `current[a] -> current[b]` runs inside the polygon
    /// without crossing or touching its boundary.
    fn is_diagonal(&self, current: &[usize], a: usize, b: usize) -> bool {
        let len = current.len();
        let p = |k: usize| &self.points[current[k % len]];
        let in_cone_at = |x: usize, y: usize| in_cone(p(x + len - 1), p(x), p(x + 1), p(y), self.winding);
        if !in_cone_at(a, b) || !in_cone_at(b, a) {
            return false;
        }

        let (from, to) = (current[a], current[b]);
        let (start, end) = (&self.points[from], &self.points[to]);
        // A corner lying on the diagonal splits it into two boundary contacts.
        let reach = TOLERANCE * (end - start).norm();
        if current
            .iter()
            .any(|&k| k != from && k != to && point_to_segment_dist(&self.points[k], start, end) <= reach)
        {
            return false;
        }

        (0..len).all(|k| {
            let (c, d) = (current[k], current[(k + 1) % len]);
            c == from
                || c == to
                || d == from
                || d == to
                || !lines_cross(start, end, &self.points[c], &self.points[d])
        })
    }
}

/// Returns `true` if triangle `abc` has (near) zero area relative to its size.
fn is_sliver(a: &Point2, b: &Point2, c: &Point2) -> bool {
    let scale = (b - a)
        .norm_squared()
        .max((c - b).norm_squared())
        .max((a - c).norm_squared());
    turn(a, b, c).abs() <= TOLERANCE * scale
}

#[allow(clippy::cast_possible_truncation)]
fn index(i: usize) -> u32 {
    i as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::polygon_2d::signed_area;

    fn p(x: f64, z: f64) -> Point2 {
        Point2::new(x, z)
    }

    fn covered_area(points: &[Point2], triangles: &[[u32; 3]]) -> f64 {
        triangles
            .iter()
            .map(|t| signed_area(&[points[t[0] as usize], points[t[1] as usize], points[t[2] as usize]]))
            .sum()
    }

    fn assert_covers(points: &[Point2]) {
        let triangles = triangulate(points);
        assert_eq!(triangles.len(), points.len() - 2);
        for t in &triangles {
            let area = signed_area(&[points[t[0] as usize], points[t[1] as usize], points[t[2] as usize]]);
            assert!(area.abs() > 1e-9, "degenerate triangle {t:?}");
            assert!(area * signed_area(points) > 0.0, "flipped triangle {t:?}");
        }
        assert!((covered_area(points, &triangles) - signed_area(points)).abs() < 1e-9);
    }

    #[test]
    fn triangle_is_returned_as_is() {
        assert_eq!(triangulate(&[p(0.0, 0.0), p(0.0, 1.0), p(1.0, 0.0)]), vec![[0, 1, 2]]);
    }

    #[test]
    fn convex_square_fans_from_first_corner() {
        let square = [p(0.0, 0.0), p(0.0, 4.0), p(4.0, 4.0), p(4.0, 0.0)];
        assert_eq!(triangulate(&square), vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn l_shape_is_covered() {
        assert_covers(&[p(0.0, 0.0), p(0.0, 4.0), p(2.0, 4.0), p(2.0, 2.0), p(4.0, 2.0), p(4.0, 0.0)]);
    }

    #[test]
    fn reflex_corner_after_first_forces_a_pocket() {
        // Clockwise U-shape opening towards +z; the fan from (0,0) must cut
        // around the notch.
        assert_covers(&[
            p(0.0, 0.0),
            p(0.0, 6.0),
            p(2.0, 6.0),
            p(2.0, 2.0),
            p(4.0, 2.0),
            p(4.0, 6.0),
            p(6.0, 6.0),
            p(6.0, 0.0),
        ]);
    }

    #[test]
    fn comb_is_covered() {
        assert_covers(&[
            p(0.0, 0.0),
            p(0.0, 5.0),
            p(1.0, 5.0),
            p(1.0, 1.0),
            p(2.0, 1.0),
            p(2.0, 5.0),
            p(3.0, 5.0),
            p(3.0, 1.0),
            p(4.0, 1.0),
            p(4.0, 5.0),
            p(5.0, 5.0),
            p(5.0, 0.0),
        ]);
    }

    #[test]
    fn counter_clockwise_input_is_supported() {
        assert_covers(&[p(0.0, 0.0), p(4.0, 0.0), p(4.0, 2.0), p(2.0, 2.0), p(2.0, 4.0), p(0.0, 4.0)]);
    }

    #[test]
    fn straight_corner_on_a_wall_is_covered() {
        // Square with an extra corner halfway along its right wall, as left
        // behind by inserting a vertex into that wall.
        let points = [p(0.0, 0.0), p(0.0, 4.0), p(4.0, 4.0), p(4.0, 2.0), p(4.0, 0.0)];
        assert_covers(&points);
        for start in 1..points.len() {
            let mut rotated = points.to_vec();
            rotated.rotate_left(start);
            assert_covers(&rotated);
        }
    }

    #[test]
    fn corner_lying_on_a_candidate_diagonal_is_not_skipped() {
        // (0.875, -1.25) sits halfway along a straight wall, and (0, -0.25)
        // lies on the segment from the first corner to it.
        assert_covers(&[
            p(-1.75, 1.75),
            p(0.75, 1.75),
            p(0.25, 0.0),
            p(0.875, -1.25),
            p(1.5, -2.5),
            p(0.0, -0.25),
            p(-0.5, -0.25),
        ]);
    }

    #[test]
    fn inexact_midpoints_do_not_produce_slivers() {
        let mid = |a: Point2, b: Point2| p((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        let corners = [p(0.1, 0.2), p(0.3, 3.9), p(3.7, 3.3), p(4.1, 0.3)];
        let points = [
            corners[0],
            corners[1],
            mid(corners[1], corners[2]),
            corners[2],
            corners[3],
            mid(corners[3], corners[0]),
        ];
        for start in 0..points.len() {
            let mut rotated = points.to_vec();
            rotated.rotate_left(start);
            assert_covers(&rotated);
        }
    }

    #[test]
    fn too_few_points_yield_nothing() {
        assert!(triangulate(&[p(0.0, 0.0), p(1.0, 0.0)]).is_empty());
    }
}
