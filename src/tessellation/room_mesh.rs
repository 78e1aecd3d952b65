use crate::error::Result;
use crate::geometry::Plane;
use crate::math::polygon_2d::winding;
use crate::math::{lift, Point2, Vector3, TOLERANCE};
use crate::topology::{FloorCeilingId, RoomId, TopologyStore};

use super::{triangulate_with, TessellationParams, TriangleMesh};

/// Builds the render mesh of one room.
///
/// The room is a closed shell with outward normals:
///
/// - a wall without back face becomes one quad from floor to ceiling,
///   skipped when the floor is not below the ceiling at either end;
/// - a wall shared with another room only fills the steps between the two
///   rooms, from this floor up to the neighbour's floor and from the
///   neighbour's ceiling up to this ceiling;
/// - floor and ceiling caps are triangulated from the boundary and
///   projected onto their (possibly sloped) planes.
///
/// Walls are only built when the room has both a floor and a ceiling.
pub struct BuildRoomMesh {
    room: RoomId,
    params: TessellationParams,
}

impl BuildRoomMesh {
    /// Creates a new `BuildRoomMesh` operation with default parameters.
    #[must_use]
    pub fn new(room: RoomId) -> Self {
        Self {
            room,
            params: TessellationParams::default(),
        }
    }

    /// Sets the tessellation parameters.
    #[must_use]
    pub fn with_params(mut self, params: TessellationParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the room's loop is broken or references a missing
    /// entity, or if cap triangulation fails.
    pub fn execute(&self, store: &TopologyStore) -> Result<TriangleMesh> {
        let room = store.room(self.room)?;
        let edges = store.room_loop(self.room)?;
        let polygon = store.room_polygon(self.room)?;
        let floor = plane_of(store, room.floor)?;
        let ceiling = plane_of(store, room.ceiling)?;
        let sign = winding(&polygon);
        let n = polygon.len();

        let mut mesh = TriangleMesh::default();

        if let (Some(floor), Some(ceiling)) = (floor, ceiling) {
            for (k, &edge) in edges.iter().enumerate() {
                let a = polygon[k];
                let b = polygon[(k + 1) % n];
                let along = b - a;
                let length = along.norm();
                if length <= TOLERANCE {
                    continue;
                }
                let outward = Vector3::new(-along.y, 0.0, along.x) * (-sign / length);
                let wall = Wall { a, b, outward };

                let f = wall.heights(&floor);
                let c = wall.heights(&ceiling);
                match store.half_edge(edge)?.back_face {
                    None => {
                        if f.0 < c.0 || f.1 < c.1 {
                            wall.push(&mut mesh, f, c);
                        }
                    }
                    Some(back) => {
                        let neighbour = store.room(store.half_edge(back)?.room)?;
                        if let Some(other_floor) = plane_of(store, neighbour.floor)? {
                            let g = wall.heights(&other_floor);
                            if g.0 > f.0 || g.1 > f.1 {
                                wall.push(&mut mesh, f, g);
                            }
                        }
                        if let Some(other_ceiling) = plane_of(store, neighbour.ceiling)? {
                            let h = wall.heights(&other_ceiling);
                            if c.0 > h.0 || c.1 > h.1 {
                                wall.push(&mut mesh, h, c);
                            }
                        }
                    }
                }
            }
        }

        if floor.is_some() || ceiling.is_some() {
            let triangles = triangulate_with(&polygon, self.params.mode)?;
            if let Some(floor) = floor {
                push_cap(&mut mesh, &polygon, &triangles, &floor, -*floor.normal());
            }
            if let Some(ceiling) = ceiling {
                push_cap(&mut mesh, &polygon, &triangles, &ceiling, *ceiling.normal());
            }
        }

        Ok(mesh)
    }
}

fn plane_of(store: &TopologyStore, surface: Option<FloorCeilingId>) -> Result<Option<Plane>> {
    surface
        .map(|id| Ok(store.floor_ceiling(id)?.plane))
        .transpose()
}

/// One straight wall segment with its outward normal.
struct Wall {
    a: Point2,
    b: Point2,
    outward: Vector3,
}

impl Wall {
    fn heights(&self, plane: &Plane) -> (f64, f64) {
        (plane.height_at(self.a.x, self.a.y), plane.height_at(self.b.x, self.b.y))
    }

    /// Emits the quad between the `lo` and `hi` heights at both ends.
    fn push(&self, mesh: &mut TriangleMesh, lo: (f64, f64), hi: (f64, f64)) {
        let base = next_index(mesh);
        let length = (self.b - self.a).norm();
        let corners = [
            (lift(&self.a, lo.0), Point2::new(0.0, lo.0)),
            (lift(&self.b, lo.1), Point2::new(length, lo.1)),
            (lift(&self.b, hi.1), Point2::new(length, hi.1)),
            (lift(&self.a, hi.0), Point2::new(0.0, hi.0)),
        ];
        for (position, uv) in corners {
            mesh.vertices.push(position);
            mesh.normals.push(self.outward);
            mesh.uvs.push(uv);
        }
        push_oriented(mesh, [base, base + 1, base + 2], &self.outward);
        push_oriented(mesh, [base, base + 2, base + 3], &self.outward);
    }
}

fn push_cap(
    mesh: &mut TriangleMesh,
    polygon: &[Point2],
    triangles: &[[u32; 3]],
    plane: &Plane,
    normal: Vector3,
) {
    let base = next_index(mesh);
    for p in polygon {
        mesh.vertices.push(plane.project(p));
        mesh.normals.push(normal);
        mesh.uvs.push(*p);
    }
    for t in triangles {
        push_oriented(mesh, t.map(|i| base + i), &normal);
    }
}

/// Appends a triangle wound so its face normal agrees with `desired`.
/// Zero-area triangles are dropped.
fn push_oriented(mesh: &mut TriangleMesh, triangle: [u32; 3], desired: &Vector3) {
    let [a, b, c] = triangle.map(|i| mesh.vertices[i as usize]);
    let face_normal = (b - a).cross(&(c - a));
    if face_normal.norm() <= TOLERANCE {
        return;
    }
    if face_normal.dot(desired) < 0.0 {
        mesh.indices.push([triangle[0], triangle[2], triangle[1]]);
    } else {
        mesh.indices.push(triangle);
    }
}

#[allow(clippy::cast_possible_truncation)]
fn next_index(mesh: &TriangleMesh) -> u32 {
    mesh.vertices.len() as u32
}
