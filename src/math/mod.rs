pub mod distance_2d;
pub mod intersect_2d;
pub mod polygon_2d;

/// Horizontal point in level-local space.
///
/// `x` is the level's x axis and `y` holds the level's z axis; the vertical
/// axis is never stored in a `Point2`.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type (y up).
pub type Point3 = nalgebra::Point3<f64>;

/// Horizontal vector type, same axis convention as [`Point2`].
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type (y up).
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Horizontal distance under which two vertices are considered coincident.
pub const MERGE_EPSILON: f64 = 1.0 / 256.0;

/// Drops the vertical component of a 3D point.
#[must_use]
pub fn horizontal(p: &Point3) -> Point2 {
    Point2::new(p.x, p.z)
}

/// Places a horizontal point at height `y`.
#[must_use]
pub fn lift(p: &Point2, y: f64) -> Point3 {
    Point3::new(p.x, y, p.y)
}

/// 2D cross product (z component of the 3D cross product).
#[must_use]
pub fn cross_2d(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}
