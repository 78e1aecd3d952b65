use crate::error::Result;
use crate::math::Vector2;
use crate::topology::{FloorCeilingId, LevelId, TopologyStore, VertexId};

/// Consumes every pending [`Move`](crate::topology::Move) in a level.
///
/// Vertices move horizontally; the vertical component of their offset is
/// ignored. Floor/ceiling planes are translated in full. Everything that
/// moved is marked dirty for the propagation pass.
pub struct ApplyMoves {
    level: LevelId,
}

impl ApplyMoves {
    /// Creates a new `ApplyMoves` pass.
    #[must_use]
    pub fn new(level: LevelId) -> Self {
        Self { level }
    }

    /// Executes the pass, returning how many entities moved.
    ///
    /// # Errors
    ///
    /// Returns an error if an entity disappears while the pass runs.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<usize> {
        let vertices: Vec<VertexId> = store
            .vertices_in(self.level)
            .filter(|(_, v)| v.pending_move.is_some())
            .map(|(id, _)| id)
            .collect();
        let surfaces: Vec<FloorCeilingId> = store
            .floor_ceilings_in(self.level)
            .filter(|(_, fc)| fc.pending_move.is_some())
            .map(|(id, _)| id)
            .collect();

        for &id in &vertices {
            let vertex = store.vertex_mut(id)?;
            if let Some(pending) = vertex.pending_move.take() {
                vertex.position += Vector2::new(pending.offset.x, pending.offset.z);
                vertex.dirty = true;
            }
        }
        for &id in &surfaces {
            let surface = store.floor_ceiling_mut(id)?;
            if let Some(pending) = surface.pending_move.take() {
                surface.plane.translate(&pending.offset);
                surface.dirty = true;
            }
        }

        Ok(vertices.len() + surfaces.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Plane;
    use crate::math::{Point2, Vector3};
    use crate::topology::{EntityRef, FloorCeilingData, LevelData, VertexData};

    #[test]
    fn moves_are_consumed_once() {
        let mut store = TopologyStore::new();
        let level = store.add_level(LevelData::new());
        let v = store.add_vertex(VertexData::new(level, Point2::new(1.0, 1.0)));
        store.vertex_mut(v).unwrap().dirty = false;
        let fc = store.add_floor_ceiling(FloorCeilingData::new(level, Plane::horizontal(3.0)));

        store.queue_move(EntityRef::Vertex(v), Vector3::new(1.0, 5.0, -1.0)).unwrap();
        store.queue_move(EntityRef::FloorCeiling(fc), Vector3::new(0.0, 0.5, 0.0)).unwrap();

        assert_eq!(ApplyMoves::new(level).execute(&mut store).unwrap(), 2);
        let vertex = store.vertex(v).unwrap();
        assert_eq!(vertex.position, Point2::new(2.0, 0.0));
        assert!(vertex.dirty);
        assert!(vertex.pending_move.is_none());
        let surface = store.floor_ceiling(fc).unwrap();
        assert!((surface.plane.height_at(0.0, 0.0) - 3.5).abs() < 1e-12);
        assert!(surface.dirty);

        assert_eq!(ApplyMoves::new(level).execute(&mut store).unwrap(), 0);
    }
}
