use super::{cross_2d, Point2};

/// Returns `true` if segments `p0 → p1` and `q0 → q1` properly cross.
///
/// Parametric intersection with strict interior parameters: touching at an
/// endpoint is not a crossing, and near-parallel pairs whose denominator is
/// within `f64::EPSILON` of zero are treated as non-crossing.
#[must_use]
pub fn lines_cross(p0: &Point2, p1: &Point2, q0: &Point2, q1: &Point2) -> bool {
    let d1 = p1 - p0;
    let d2 = q1 - q0;
    let denom = cross_2d(&d1, &d2);
    if denom.abs() <= f64::EPSILON {
        return false;
    }
    let diff = q0 - p0;
    let t = cross_2d(&diff, &d2) / denom;
    let u = cross_2d(&diff, &d1) / denom;
    t > 0.0 && t < 1.0 && u > 0.0 && u < 1.0
}
