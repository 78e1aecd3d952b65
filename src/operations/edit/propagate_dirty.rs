use std::collections::HashSet;

use crate::error::Result;
use crate::topology::{FloorCeilingId, LevelId, RoomId, TopologyStore, VertexId};

/// Turns dirty vertices and floor/ceilings into dirty rooms.
///
/// A dirty vertex dirties every room with a half-edge starting or ending at
/// it, plus the rooms across those walls, since their step strips share the
/// wall. A dirty surface dirties the rooms above and below it. The vertex
/// and surface flags are cleared afterwards.
pub struct PropagateDirty {
    level: LevelId,
}

impl PropagateDirty {
    /// Creates a new `PropagateDirty` pass.
    #[must_use]
    pub fn new(level: LevelId) -> Self {
        Self { level }
    }

    /// Executes the pass, returning how many rooms were marked dirty.
    ///
    /// # Errors
    ///
    /// Returns an error if a half-edge references a missing entity.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<usize> {
        let dirty_vertices: HashSet<VertexId> = store
            .vertices_in(self.level)
            .filter(|(_, v)| v.dirty)
            .map(|(id, _)| id)
            .collect();
        let dirty_surfaces: Vec<FloorCeilingId> = store
            .floor_ceilings_in(self.level)
            .filter(|(_, fc)| fc.dirty)
            .map(|(id, _)| id)
            .collect();

        let mut rooms: HashSet<RoomId> = HashSet::new();
        if !dirty_vertices.is_empty() {
            for (id, he) in store.half_edges_in(self.level) {
                let touched = dirty_vertices.contains(&he.vertex)
                    || dirty_vertices.contains(&store.end_vertex(id)?);
                if !touched {
                    continue;
                }
                rooms.insert(he.room);
                if let Some(back) = he.back_face {
                    rooms.insert(store.half_edge(back)?.room);
                }
            }
        }
        for &id in &dirty_surfaces {
            let surface = store.floor_ceiling(id)?;
            rooms.extend(surface.above);
            rooms.extend(surface.below);
        }

        for &room in &rooms {
            store.mark_room_dirty(room);
        }
        for id in dirty_vertices {
            store.vertex_mut(id)?.dirty = false;
        }
        for id in dirty_surfaces {
            store.floor_ceiling_mut(id)?.dirty = false;
        }

        Ok(rooms.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use crate::operations::creation::{ExtrudeWall, MakeRoom};
    use crate::topology::LevelData;

    fn clear_flags(store: &mut TopologyStore, level: LevelId) {
        let rooms: Vec<_> = store.rooms_in(level).map(|(id, _)| id).collect();
        for room in rooms {
            store.room_mut(room).unwrap().dirty = false;
        }
        PropagateDirty::new(level).execute(store).unwrap();
        let rooms: Vec<_> = store.rooms_in(level).map(|(id, _)| id).collect();
        for room in rooms {
            store.room_mut(room).unwrap().dirty = false;
        }
    }

    #[test]
    fn moved_corner_dirties_rooms_across_the_wall() {
        let mut store = TopologyStore::new();
        let level = store.add_level(LevelData::new());
        let a = MakeRoom::new(
            level,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(0.0, 4.0),
                Point2::new(4.0, 4.0),
                Point2::new(4.0, 0.0),
            ],
        )
        .execute(&mut store)
        .unwrap();
        let a_edges = store.room_loop(a).unwrap();
        let b = ExtrudeWall::new(a_edges[2], 2.0).execute(&mut store).unwrap();
        clear_flags(&mut store, level);

        // Corner (0,0) only touches room A.
        let corner = store.half_edge(a_edges[0]).unwrap().vertex;
        store.vertex_mut(corner).unwrap().dirty = true;
        assert_eq!(PropagateDirty::new(level).execute(&mut store).unwrap(), 1);
        assert!(store.room(a).unwrap().dirty);
        assert!(!store.room(b).unwrap().dirty);
        assert!(!store.vertex(corner).unwrap().dirty);
        clear_flags(&mut store, level);

        // Corner (4,4) lies on the shared wall.
        let shared = store.half_edge(a_edges[2]).unwrap().vertex;
        store.vertex_mut(shared).unwrap().dirty = true;
        assert_eq!(PropagateDirty::new(level).execute(&mut store).unwrap(), 2);
        assert!(store.room(b).unwrap().dirty);
    }

    #[test]
    fn dirty_surface_dirties_its_room() {
        let mut store = TopologyStore::new();
        let level = store.add_level(LevelData::new());
        let room = MakeRoom::new(
            level,
            vec![Point2::new(0.0, 0.0), Point2::new(0.0, 2.0), Point2::new(2.0, 0.0)],
        )
        .execute(&mut store)
        .unwrap();
        clear_flags(&mut store, level);

        let ceiling = store.room(room).unwrap().ceiling.unwrap();
        store.floor_ceiling_mut(ceiling).unwrap().dirty = true;
        PropagateDirty::new(level).execute(&mut store).unwrap();
        assert!(store.room(room).unwrap().dirty);
        assert!(!store.floor_ceiling(ceiling).unwrap().dirty);
    }
}
