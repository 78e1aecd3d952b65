use std::collections::HashMap;

use crate::error::Result;
use crate::geometry::Plane;
use crate::math::Point2;
use crate::topology::{HalfEdgeId, LevelId, RoomId, TopologyStore, VertexId};

/// Recomputes the derived vertical spans of every half-edge and vertex in a
/// level.
///
/// A half-edge spans from the lowest floor height to the highest ceiling
/// height at its two endpoints, so sloped planes widen the span. A vertex
/// spans the union of its incident walls at its own position. Missing floors
/// and ceilings leave the span unbounded on that side; a vertex without any
/// incident half-edge gets an empty span.
pub struct UpdateVerticalExtents {
    level: LevelId,
}

impl UpdateVerticalExtents {
    /// Creates a new `UpdateVerticalExtents` pass.
    #[must_use]
    pub fn new(level: LevelId) -> Self {
        Self { level }
    }

    /// Executes the pass.
    ///
    /// # Errors
    ///
    /// Returns an error if a half-edge references a missing entity.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<()> {
        let edges: Vec<(HalfEdgeId, RoomId, VertexId)> = store
            .half_edges_in(self.level)
            .map(|(id, he)| (id, he.room, he.vertex))
            .collect();

        let mut edge_spans = Vec::with_capacity(edges.len());
        let mut vertex_spans: HashMap<VertexId, (f64, f64)> = HashMap::new();

        for (id, room_id, from) in edges {
            let to = store.end_vertex(id)?;
            let room = store.room(room_id)?;
            let floor = match room.floor {
                Some(f) => Some(store.floor_ceiling(f)?.plane),
                None => None,
            };
            let ceiling = match room.ceiling {
                Some(c) => Some(store.floor_ceiling(c)?.plane),
                None => None,
            };

            let (f0, c0) = span_at(&store.vertex(from)?.position, floor, ceiling);
            let (f1, c1) = span_at(&store.vertex(to)?.position, floor, ceiling);
            edge_spans.push((id, f0.min(f1), c0.max(c1)));

            for (v, lo, hi) in [(from, f0, c0), (to, f1, c1)] {
                let span = vertex_spans
                    .entry(v)
                    .or_insert((f64::INFINITY, f64::NEG_INFINITY));
                span.0 = span.0.min(lo);
                span.1 = span.1.max(hi);
            }
        }

        for (id, min_y, max_y) in edge_spans {
            let he = store.half_edge_mut(id)?;
            he.min_y = min_y;
            he.max_y = max_y;
        }

        let vertex_ids: Vec<VertexId> = store.vertices_in(self.level).map(|(id, _)| id).collect();
        for id in vertex_ids {
            let (min_y, max_y) = vertex_spans
                .get(&id)
                .copied()
                .unwrap_or((f64::INFINITY, f64::NEG_INFINITY));
            let vertex = store.vertex_mut(id)?;
            vertex.min_y = min_y;
            vertex.max_y = max_y;
        }

        Ok(())
    }
}

/// Floor and ceiling heights above a horizontal position.
fn span_at(p: &Point2, floor: Option<Plane>, ceiling: Option<Plane>) -> (f64, f64) {
    let lo = floor.map_or(f64::NEG_INFINITY, |plane| plane.height_at(p.x, p.y));
    let hi = ceiling.map_or(f64::INFINITY, |plane| plane.height_at(p.x, p.y));
    (lo, hi)
}
