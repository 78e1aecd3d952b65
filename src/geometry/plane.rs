use crate::error::{GeometryError, Result};
use crate::math::{Point2, Point3, Vector3, TOLERANCE};

/// A floor or ceiling plane in level-local space.
///
/// Defined by a point on the plane and a unit normal. The normal always has a
/// positive vertical component, so the plane can be evaluated as a height
/// field over the horizontal (x, z) plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    point: Point3,
    normal: Vector3,
}

impl Plane {
    /// Creates a plane from a point and a normal vector.
    ///
    /// The normal is normalised and flipped to point upward.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal is zero-length or horizontal (a vertical
    /// plane cannot bound a floor or ceiling).
    pub fn new(point: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let mut normal = normal / len;
        if normal.y.abs() < TOLERANCE {
            return Err(GeometryError::Degenerate(
                "vertical plane cannot bound a floor or ceiling".into(),
            )
            .into());
        }
        if normal.y < 0.0 {
            normal = -normal;
        }
        Ok(Self { point, normal })
    }

    /// Creates a horizontal plane at height `y`.
    #[must_use]
    pub fn horizontal(y: f64) -> Self {
        Self {
            point: Point3::new(0.0, y, 0.0),
            normal: Vector3::y(),
        }
    }

    /// Returns the reference point of the plane.
    #[must_use]
    pub fn point(&self) -> &Point3 {
        &self.point
    }

    /// Returns the upward unit normal of the plane.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Height of the plane above the horizontal position `(x, z)`.
    #[must_use]
    pub fn height_at(&self, x: f64, z: f64) -> f64 {
        let n = &self.normal;
        self.point.y - (n.x * (x - self.point.x) + n.z * (z - self.point.z)) / n.y
    }

    /// Projects a horizontal point vertically onto the plane.
    #[must_use]
    pub fn project(&self, p: &Point2) -> Point3 {
        Point3::new(p.x, self.height_at(p.x, p.y), p.y)
    }

    /// Translates the plane by `offset`.
    pub fn translate(&mut self, offset: &Vector3) {
        self.point += offset;
    }
}
