use super::Point2;

/// Closest point on segment `a → b` to `p`.
///
/// Returns the clamped segment parameter in `[0, 1]` and the closest point.
#[must_use]
pub fn closest_on_segment(p: &Point2, a: &Point2, b: &Point2) -> (f64, Point2) {
    let d = b - a;
    let len_sq = d.norm_squared();

    if len_sq < 1e-20 {
        // Degenerate segment (zero length).
        return (0.0, *a);
    }

    // Project point onto the infinite line, clamp to [0, 1].
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    (t, a + d * t)
}

/// Returns the minimum distance from `p` to the segment `a → b`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let (_, closest) = closest_on_segment(p, a, b);
    (p - closest).norm()
}
