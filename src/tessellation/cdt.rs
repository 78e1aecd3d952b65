use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use spade::handles::{FixedFaceHandle, FixedVertexHandle, InnerTag};
use spade::{ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation};

use crate::error::{Result, TessellationError};
use crate::math::polygon_2d::{signed_area, winding};
use crate::math::Point2;

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Triangulates a room outline with a constrained Delaunay triangulation.
///
/// Every wall is a constraint edge. Triangles index into `points` and share
/// the outline's winding. Repeated corners collapse onto their first
/// occurrence.
pub(crate) fn triangulate_cdt(points: &[Point2]) -> Result<Vec<[u32; 3]>> {
    if points.len() < 3 {
        return Err(TessellationError::Failed("room outline needs at least 3 corners".into()).into());
    }

    let mut cdt = Cdt::new();
    let mut corners = Vec::with_capacity(points.len());
    let mut corner_index: HashMap<FixedVertexHandle, u32> = HashMap::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        let handle = cdt
            .insert(SpadePoint2::new(p.x, p.y))
            .map_err(|e: InsertionError| TessellationError::Failed(format!("CDT insert: {e}")))?;
        let i = u32::try_from(i).map_err(|_| TessellationError::Failed("too many corners".into()))?;
        corner_index.entry(handle).or_insert(i);
        corners.push(handle);
    }
    for (k, &from) in corners.iter().enumerate() {
        let to = corners[(k + 1) % corners.len()];
        if from != to {
            cdt.add_constraint(from, to);
        }
    }

    let inside = faces_inside_walls(&cdt);
    let sign = winding(points);
    let mut triangles = Vec::with_capacity(inside.len());
    for face in cdt.inner_faces() {
        if !inside.contains(&face.fix()) {
            continue;
        }
        let mut triangle = [0u32; 3];
        for (slot, vertex) in face.vertices().iter().enumerate() {
            triangle[slot] = *corner_index.get(&vertex.fix()).ok_or_else(|| {
                TessellationError::Failed("triangulation introduced a new corner".into())
            })?;
        }
        if signed_area(&triangle.map(|i| points[i as usize])) * sign < 0.0 {
            triangle.swap(1, 2);
        }
        triangles.push(triangle);
    }

    Ok(triangles)
}

/// Walks the triangulation inwards from its hull. Stepping over a wall
/// toggles between outside and inside the room.
fn faces_inside_walls(cdt: &Cdt) -> HashSet<FixedFaceHandle<InnerTag>> {
    let mut stack = Vec::new();
    for edge in cdt.directed_edges() {
        if edge.face().as_inner().is_some() {
            continue;
        }
        if let Some(face) = edge.rev().face().as_inner() {
            stack.push((face.fix(), cdt.is_constraint_edge(edge.as_undirected().fix())));
        }
    }

    let mut seen: HashMap<FixedFaceHandle<InnerTag>, bool> = HashMap::new();
    while let Some((face, inside)) = stack.pop() {
        match seen.entry(face) {
            Entry::Occupied(_) => continue,
            Entry::Vacant(slot) => {
                slot.insert(inside);
            }
        }
        for edge in cdt.face(face).adjacent_edges() {
            if let Some(next) = edge.rev().face().as_inner() {
                if !seen.contains_key(&next.fix()) {
                    let wall = cdt.is_constraint_edge(edge.as_undirected().fix());
                    stack.push((next.fix(), inside != wall));
                }
            }
        }
    }

    seen.into_iter()
        .filter_map(|(face, inside)| inside.then_some(face))
        .collect()
}
