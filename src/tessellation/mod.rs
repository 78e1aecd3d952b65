mod cdt;
mod room_mesh;
mod triangulate;

pub use room_mesh::BuildRoomMesh;
pub use triangulate::triangulate;

use serde::Deserialize;

use crate::error::Result;
use crate::math::{Point2, Point3, Vector3};

/// Algorithm used to triangulate floor and ceiling caps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriangulationMode {
    /// Recursive ear clipping over the boundary corners.
    #[default]
    EarClip,
    /// Constrained Delaunay triangulation of the boundary loop.
    ConstrainedDelaunay,
}

/// Parameters controlling room tessellation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TessellationParams {
    /// Cap triangulation algorithm.
    pub mode: TriangulationMode,
}

impl TessellationParams {
    /// Sets the cap triangulation algorithm.
    #[must_use]
    pub fn with_mode(mut self, mode: TriangulationMode) -> Self {
        self.mode = mode;
        self
    }
}

/// A triangle mesh approximation of a room shell.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals.
    pub normals: Vec<Vector3>,
    /// UV coordinates.
    pub uvs: Vec<Point2>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Triangulates a simple polygon with the given algorithm.
///
/// Triangles index into `points` and share the polygon's winding.
///
/// # Errors
///
/// Returns an error if the constrained Delaunay backend rejects a point.
pub fn triangulate_with(points: &[Point2], mode: TriangulationMode) -> Result<Vec<[u32; 3]>> {
    match mode {
        TriangulationMode::EarClip => Ok(triangulate(points)),
        TriangulationMode::ConstrainedDelaunay => cdt::triangulate_cdt(points),
    }
}
