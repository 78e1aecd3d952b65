use super::{cross_2d, Point2};

/// Computes the signed area of a closed polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise. Rooms are wound
/// clockwise, so a well-formed room boundary has a negative area.
#[must_use]
pub fn signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Returns `1.0` for counter-clockwise polygons and `-1.0` otherwise.
///
/// Degenerate (zero-area) input falls back to the clockwise room convention.
#[must_use]
pub fn winding(points: &[Point2]) -> f64 {
    if signed_area(points) > 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Turn at `b` when walking `a → b → c`: `cross(b - a, c - b)`.
#[must_use]
pub fn turn(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    cross_2d(&(b - a), &(c - b))
}

/// Returns `true` if `b` is reflex (or collinear) when walking `a → b → c`
/// along a polygon with the given winding.
///
/// For the clockwise room convention this is `cross(b - a, c - b) >= 0`.
#[must_use]
pub fn is_reflex(a: &Point2, b: &Point2, c: &Point2, winding: f64) -> bool {
    turn(a, b, c) * winding <= 0.0
}

/// Twice the signed area of triangle `abc`, normalised so that a left turn
/// relative to the polygon winding is positive.
fn oriented_area2(a: &Point2, b: &Point2, c: &Point2, winding: f64) -> f64 {
    cross_2d(&(b - a), &(c - a)) * winding
}

/// Returns `true` if the segment `apex → target` starts inside the interior
/// cone of the polygon at `apex`, whose neighbours are `prev` and `next`.
#[must_use]
pub fn in_cone(prev: &Point2, apex: &Point2, next: &Point2, target: &Point2, winding: f64) -> bool {
    if oriented_area2(apex, next, prev, winding) >= 0.0 {
        oriented_area2(apex, target, prev, winding) > 0.0
            && oriented_area2(target, apex, next, winding) > 0.0
    } else {
        !(oriented_area2(apex, target, next, winding) >= 0.0
            && oriented_area2(target, apex, prev, winding) >= 0.0)
    }
}

/// Even-odd point-in-polygon test.
#[must_use]
pub fn contains_point(polygon: &[Point2], p: &Point2) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = &polygon[i];
        let b = &polygon[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::TOLERANCE;

    fn p(x: f64, z: f64) -> Point2 {
        Point2::new(x, z)
    }

    fn clockwise_square() -> Vec<Point2> {
        vec![p(0.0, 0.0), p(0.0, 4.0), p(4.0, 4.0), p(4.0, 0.0)]
    }

    #[test]
    fn clockwise_square_has_negative_area() {
        let area = signed_area(&clockwise_square());
        assert!((area + 16.0).abs() < TOLERANCE);
        assert!((winding(&clockwise_square()) + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_degenerate() {
        assert!(signed_area(&[p(0.0, 0.0), p(1.0, 0.0)]).abs() < TOLERANCE);
        assert!(signed_area(&[]).abs() < TOLERANCE);
    }

    #[test]
    fn convex_corner_of_clockwise_loop_is_not_reflex() {
        let pts = clockwise_square();
        assert!(!is_reflex(&pts[0], &pts[1], &pts[2], -1.0));
    }

    #[test]
    fn collinear_corner_counts_as_reflex() {
        assert!(is_reflex(&p(0.0, 0.0), &p(0.0, 1.0), &p(0.0, 2.0), -1.0));
    }

    #[test]
    fn notch_corner_is_reflex() {
        // Clockwise L-shape, the inner corner at (2, 2) is reflex.
        let l = [
            p(0.0, 0.0),
            p(0.0, 4.0),
            p(2.0, 4.0),
            p(2.0, 2.0),
            p(4.0, 2.0),
            p(4.0, 0.0),
        ];
        assert!(is_reflex(&l[2], &l[3], &l[4], winding(&l)));
        assert!(!is_reflex(&l[1], &l[2], &l[3], winding(&l)));
    }

    #[test]
    fn cone_accepts_interior_diagonal() {
        let sq = clockwise_square();
        assert!(in_cone(&sq[3], &sq[0], &sq[1], &sq[2], -1.0));
    }

    #[test]
    fn cone_rejects_exterior_direction() {
        let sq = clockwise_square();
        assert!(!in_cone(&sq[3], &sq[0], &sq[1], &p(-2.0, -2.0), -1.0));
    }

    #[test]
    fn cone_at_reflex_apex() {
        let l = [
            p(0.0, 0.0),
            p(0.0, 4.0),
            p(2.0, 4.0),
            p(2.0, 2.0),
            p(4.0, 2.0),
            p(4.0, 0.0),
        ];
        let w = winding(&l);
        // From the notch, (0, 0) is reachable through the interior.
        assert!(in_cone(&l[2], &l[3], &l[4], &l[0], w));
        // (4, 4) lies in the notch, outside the room.
        assert!(!in_cone(&l[2], &l[3], &l[4], &p(4.0, 4.0), w));
    }

    #[test]
    fn contains_point_inside_and_outside() {
        let sq = clockwise_square();
        assert!(contains_point(&sq, &p(2.0, 2.0)));
        assert!(!contains_point(&sq, &p(5.0, 2.0)));
        assert!(!contains_point(&sq[..2], &p(0.0, 1.0)));
    }
}
