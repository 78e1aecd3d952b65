use crate::error::{Result, TopologyError};
use crate::math::Point2;
use crate::topology::{HalfEdgeData, HalfEdgeId, TopologyStore, VertexData, VertexId};

/// Where the inserted vertex comes from.
#[derive(Debug, Clone, Copy)]
pub enum VertexSource {
    /// Reuse a vertex that already exists in the level.
    Existing(VertexId),
    /// Create a new vertex at the given horizontal position.
    At(Point2),
}

/// Half-edges and vertex produced by [`InsertVertex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertedVertex {
    /// The vertex now splitting the wall.
    pub vertex: VertexId,
    /// New half-edge leaving the vertex on the split edge's loop.
    pub edge: HalfEdgeId,
    /// New half-edge leaving the vertex on the back face's loop, if any.
    pub back_face: Option<HalfEdgeId>,
}

/// Splits a wall half-edge in two at a vertex.
///
/// For a half-edge `E: a -> b` the result is `E: a -> v` followed by a new
/// `E': v -> b`. If `E` has a back face `B: b -> a`, the adjoining loop is
/// split the same way into `B: b -> v` and `B': v -> a`, and the four
/// half-edges are re-paired across the wall: `E` with `B'` and `E'` with `B`.
pub struct InsertVertex {
    edge: HalfEdgeId,
    source: VertexSource,
}

impl InsertVertex {
    /// Creates a new `InsertVertex` operation.
    #[must_use]
    pub fn new(edge: HalfEdgeId, source: VertexSource) -> Self {
        Self { edge, source }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the half-edge or an existing vertex is missing,
    /// or if the vertex belongs to another level.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<InsertedVertex> {
        let edge = store.half_edge(self.edge)?.clone();

        let vertex = match self.source {
            VertexSource::Existing(id) => {
                if store.vertex(id)?.level != edge.level {
                    return Err(TopologyError::LevelMismatch.into());
                }
                id
            }
            VertexSource::At(position) => store.add_vertex(VertexData::new(edge.level, position)),
        };

        let split = split_after(store, self.edge, vertex)?;
        store.mark_room_dirty(edge.room);

        let back_split = match edge.back_face {
            Some(back) => {
                let back_room = store.half_edge(back)?.room;
                let back_split = split_after(store, back, vertex)?;
                store.pair_back_faces(self.edge, back_split)?;
                store.pair_back_faces(split, back)?;
                store.mark_room_dirty(back_room);
                Some(back_split)
            }
            None => None,
        };

        store.vertex_mut(vertex)?.dirty = true;

        Ok(InsertedVertex {
            vertex,
            edge: split,
            back_face: back_split,
        })
    }
}

/// Inserts a half-edge with origin `vertex` right after `edge` in its loop.
fn split_after(
    store: &mut TopologyStore,
    edge: HalfEdgeId,
    vertex: VertexId,
) -> Result<HalfEdgeId> {
    let data = store.half_edge(edge)?;
    let mut inserted = HalfEdgeData::new(data.level, data.room, vertex).with_next(data.next);
    inserted.min_y = data.min_y;
    inserted.max_y = data.max_y;
    let inserted = store.add_half_edge(inserted);
    store.half_edge_mut(edge)?.next = inserted;
    Ok(inserted)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::RoomTopoError;
    use crate::operations::creation::MakeRoom;
    use crate::topology::{LevelData, LevelId, RoomId, ValidateLevel};

    fn room(store: &mut TopologyStore, level: LevelId) -> RoomId {
        MakeRoom::new(
            level,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(0.0, 4.0),
                Point2::new(4.0, 4.0),
                Point2::new(4.0, 0.0),
            ],
        )
        .execute(store)
        .unwrap()
    }

    #[test]
    fn one_sided_wall_gains_a_corner() {
        let mut store = TopologyStore::new();
        let level = store.add_level(LevelData::new());
        let room = room(&mut store, level);
        let first = store.room_loop(room).unwrap()[0];

        let inserted = InsertVertex::new(first, VertexSource::At(Point2::new(0.0, 1.0)))
            .execute(&mut store)
            .unwrap();

        assert_eq!(store.loop_len(first).unwrap(), 5);
        assert_eq!(store.half_edge(first).unwrap().next, inserted.edge);
        assert_eq!(store.end_vertex(first).unwrap(), inserted.vertex);
        assert!(inserted.back_face.is_none());
        assert!(store.room(room).unwrap().dirty);
        assert!(ValidateLevel::new(level).execute(&store).is_valid());
    }

    #[test]
    fn vertex_from_another_level_is_rejected() {
        let mut store = TopologyStore::new();
        let level = store.add_level(LevelData::new());
        let other = store.add_level(LevelData::new());
        let room = room(&mut store, level);
        let foreign = store.add_vertex(VertexData::new(other, Point2::new(0.0, 1.0)));
        let first = store.room_loop(room).unwrap()[0];

        let result = InsertVertex::new(first, VertexSource::Existing(foreign)).execute(&mut store);
        assert!(matches!(
            result,
            Err(RoomTopoError::Topology(TopologyError::LevelMismatch))
        ));
        assert_eq!(store.loop_len(first).unwrap(), 4);
    }
}
