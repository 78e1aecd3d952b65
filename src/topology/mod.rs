pub mod commands;
pub mod floor_ceiling;
pub mod half_edge;
pub mod level;
pub mod markers;
pub mod room;
pub mod validate;
pub mod vertex;
pub mod walk;

pub use commands::{CommandBuffer, EntityRef};
pub use floor_ceiling::{FloorCeilingData, FloorCeilingId};
pub use half_edge::{HalfEdgeData, HalfEdgeId};
pub use level::{LevelData, LevelId};
pub use markers::{Markers, Move};
pub use room::{RoomData, RoomId};
pub use validate::{TopologyIssue, ValidateLevel, ValidationReport};
pub use vertex::{VertexData, VertexId};
pub use walk::{LoopStep, LoopWalk};

use crate::error::TopologyError;
use crate::math::{Point2, Vector3};
use slotmap::SlotMap;

/// Central arena that owns all topological entities of every level.
///
/// Entities reference each other via typed IDs (generational indices),
/// avoiding self-referential structures and tolerating structural mutation.
/// Each record carries the level it belongs to; the `*_in` iterators are the
/// level-partitioned queries and skip virtual (preview-only) entities.
#[derive(Debug, Default)]
pub struct TopologyStore {
    levels: SlotMap<LevelId, LevelData>,
    vertices: SlotMap<VertexId, VertexData>,
    half_edges: SlotMap<HalfEdgeId, HalfEdgeData>,
    rooms: SlotMap<RoomId, RoomData>,
    floor_ceilings: SlotMap<FloorCeilingId, FloorCeilingData>,
}

impl TopologyStore {
    /// Creates a new, empty topology store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Level operations ---

    /// Inserts a level and returns its ID.
    pub fn add_level(&mut self, data: LevelData) -> LevelId {
        self.levels.insert(data)
    }

    /// Returns a reference to the level data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn level(&self, id: LevelId) -> Result<&LevelData, TopologyError> {
        self.levels
            .get(id)
            .ok_or(TopologyError::EntityNotFound("level"))
    }

    /// Returns a mutable reference to the level data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn level_mut(&mut self, id: LevelId) -> Result<&mut LevelData, TopologyError> {
        self.levels
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("level"))
    }

    /// Iterates over all levels.
    pub fn levels(&self) -> impl Iterator<Item = (LevelId, &LevelData)> {
        self.levels.iter()
    }

    /// Removes a level together with every entity that belongs to it.
    pub fn remove_level(&mut self, id: LevelId) -> Option<LevelData> {
        self.vertices.retain(|_, v| v.level != id);
        self.half_edges.retain(|_, h| h.level != id);
        self.rooms.retain(|_, r| r.level != id);
        self.floor_ceilings.retain(|_, f| f.level != id);
        self.levels.remove(id)
    }

    /// Flags a level so the next frame runs the merge pass on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the level is not found.
    pub fn request_merge(&mut self, id: LevelId) -> Result<(), TopologyError> {
        self.level_mut(id)?.pending_merge = true;
        Ok(())
    }

    // --- Vertex operations ---

    /// Inserts a vertex and returns its ID.
    pub fn add_vertex(&mut self, data: VertexData) -> VertexId {
        self.vertices.insert(data)
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, TopologyError> {
        self.vertices
            .get(id)
            .ok_or(TopologyError::EntityNotFound("vertex"))
    }

    /// Returns a mutable reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex_mut(&mut self, id: VertexId) -> Result<&mut VertexData, TopologyError> {
        self.vertices
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("vertex"))
    }

    /// Removes a vertex, returning its data if it existed.
    pub fn remove_vertex(&mut self, id: VertexId) -> Option<VertexData> {
        self.vertices.remove(id)
    }

    /// Iterates over the non-virtual vertices of a level.
    pub fn vertices_in(&self, level: LevelId) -> impl Iterator<Item = (VertexId, &VertexData)> {
        self.vertices
            .iter()
            .filter(move |(_, v)| v.level == level && !v.markers.is_virtual)
    }

    // --- Half-edge operations ---

    /// Inserts a half-edge and returns its ID.
    pub fn add_half_edge(&mut self, data: HalfEdgeData) -> HalfEdgeId {
        self.half_edges.insert(data)
    }

    /// Returns a reference to the half-edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn half_edge(&self, id: HalfEdgeId) -> Result<&HalfEdgeData, TopologyError> {
        self.half_edges
            .get(id)
            .ok_or(TopologyError::EntityNotFound("half-edge"))
    }

    /// Returns a mutable reference to the half-edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn half_edge_mut(&mut self, id: HalfEdgeId) -> Result<&mut HalfEdgeData, TopologyError> {
        self.half_edges
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("half-edge"))
    }

    /// Removes a half-edge, returning its data if it existed.
    pub fn remove_half_edge(&mut self, id: HalfEdgeId) -> Option<HalfEdgeData> {
        self.half_edges.remove(id)
    }

    /// Iterates over the non-virtual half-edges of a level.
    pub fn half_edges_in(
        &self,
        level: LevelId,
    ) -> impl Iterator<Item = (HalfEdgeId, &HalfEdgeData)> {
        self.half_edges
            .iter()
            .filter(move |(_, h)| h.level == level && !h.markers.is_virtual)
    }

    /// Total number of half-edges across all levels.
    #[must_use]
    pub fn half_edge_total(&self) -> usize {
        self.half_edges.len()
    }

    /// Returns the origin of the half-edge following `id`, i.e. the vertex
    /// `id` runs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the half-edge or its successor is missing.
    pub fn end_vertex(&self, id: HalfEdgeId) -> Result<VertexId, TopologyError> {
        let next = self.half_edge(id)?.next;
        Ok(self.half_edge(next)?.vertex)
    }

    /// Wires `next` links so the given half-edges form one closed loop in order.
    ///
    /// # Errors
    ///
    /// Returns an error if any half-edge is missing.
    pub fn link_loop(&mut self, edges: &[HalfEdgeId]) -> Result<(), TopologyError> {
        for (i, &edge) in edges.iter().enumerate() {
            let next = edges[(i + 1) % edges.len()];
            self.half_edge_mut(edge)?.next = next;
        }
        Ok(())
    }

    /// Pairs two half-edges as each other's back face.
    ///
    /// # Errors
    ///
    /// Returns an error if either half-edge is missing.
    pub fn pair_back_faces(&mut self, a: HalfEdgeId, b: HalfEdgeId) -> Result<(), TopologyError> {
        self.half_edge(b)?;
        self.half_edge_mut(a)?.back_face = Some(b);
        self.half_edge_mut(b)?.back_face = Some(a);
        Ok(())
    }

    /// Lazily walks the loop starting at `start`.
    #[must_use]
    pub fn walk(&self, start: HalfEdgeId) -> LoopWalk<'_> {
        LoopWalk::new(self, start)
    }

    /// Counts the half-edges in the loop through `start`.
    ///
    /// # Errors
    ///
    /// Returns an error if a link is dangling or the chain never returns to
    /// `start`.
    pub fn loop_len(&self, start: HalfEdgeId) -> Result<usize, TopologyError> {
        let limit = self.half_edges.len();
        let mut current = start;
        for steps in 1..=limit {
            current = self.half_edge(current)?.next;
            if current == start {
                return Ok(steps);
            }
        }
        Err(TopologyError::LoopNotClosed(limit))
    }

    // --- Room operations ---

    /// Inserts a room and returns its ID.
    pub fn add_room(&mut self, data: RoomData) -> RoomId {
        self.rooms.insert(data)
    }

    /// Returns a reference to the room data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn room(&self, id: RoomId) -> Result<&RoomData, TopologyError> {
        self.rooms
            .get(id)
            .ok_or(TopologyError::EntityNotFound("room"))
    }

    /// Returns a mutable reference to the room data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn room_mut(&mut self, id: RoomId) -> Result<&mut RoomData, TopologyError> {
        self.rooms
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("room"))
    }

    /// Removes a room, returning its data if it existed.
    pub fn remove_room(&mut self, id: RoomId) -> Option<RoomData> {
        self.rooms.remove(id)
    }

    /// Iterates over the non-virtual rooms of a level.
    pub fn rooms_in(&self, level: LevelId) -> impl Iterator<Item = (RoomId, &RoomData)> {
        self.rooms
            .iter()
            .filter(move |(_, r)| r.level == level && !r.markers.is_virtual)
    }

    /// Marks a room's render geometry stale. Missing rooms are ignored.
    pub fn mark_room_dirty(&mut self, id: RoomId) {
        if let Some(room) = self.rooms.get_mut(id) {
            room.dirty = true;
        }
    }

    /// Gives `to` its own copies of the floor and ceiling planes of `from`.
    ///
    /// The copies are not shared with any other room.
    ///
    /// # Errors
    ///
    /// Returns an error if either room or one of the surfaces is missing.
    pub fn copy_surfaces(&mut self, from: RoomId, to: RoomId) -> Result<(), TopologyError> {
        let (floor, ceiling) = {
            let source = self.room(from)?;
            (source.floor, source.ceiling)
        };
        let level = self.room(to)?.level;
        if let Some(id) = floor {
            let plane = self.floor_ceiling(id)?.plane;
            let copy = self.add_floor_ceiling(FloorCeilingData::new(level, plane).with_above(to));
            self.room_mut(to)?.floor = Some(copy);
        }
        if let Some(id) = ceiling {
            let plane = self.floor_ceiling(id)?.plane;
            let copy = self.add_floor_ceiling(FloorCeilingData::new(level, plane).with_below(to));
            self.room_mut(to)?.ceiling = Some(copy);
        }
        Ok(())
    }

    /// Collects every half-edge whose owning room is `room`, in store order.
    #[must_use]
    pub fn room_half_edges(&self, room: RoomId) -> Vec<HalfEdgeId> {
        self.half_edges
            .iter()
            .filter(|(_, h)| h.room == room && !h.markers.is_virtual)
            .map(|(id, _)| id)
            .collect()
    }

    /// Returns the boundary loop of a room in `next` order.
    ///
    /// # Errors
    ///
    /// Returns an error if the room has no half-edges or its loop is broken.
    pub fn room_loop(&self, room: RoomId) -> Result<Vec<HalfEdgeId>, TopologyError> {
        let start = self
            .half_edges
            .iter()
            .find(|(_, h)| h.room == room && !h.markers.is_virtual)
            .map(|(id, _)| id)
            .ok_or(TopologyError::EmptyRoom)?;
        let len = self.loop_len(start)?;
        Ok(self.walk(start).take(len).map(|step| step.edge).collect())
    }

    /// Returns the horizontal boundary polygon of a room in loop order.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop or one of its vertices is missing.
    pub fn room_polygon(&self, room: RoomId) -> Result<Vec<Point2>, TopologyError> {
        let edges = self.room_loop(room)?;
        edges
            .iter()
            .map(|&edge| Ok(self.vertex(self.half_edge(edge)?.vertex)?.position))
            .collect()
    }

    // --- Floor/ceiling operations ---

    /// Inserts a floor/ceiling surface and returns its ID.
    pub fn add_floor_ceiling(&mut self, data: FloorCeilingData) -> FloorCeilingId {
        self.floor_ceilings.insert(data)
    }

    /// Returns a reference to the surface data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn floor_ceiling(&self, id: FloorCeilingId) -> Result<&FloorCeilingData, TopologyError> {
        self.floor_ceilings
            .get(id)
            .ok_or(TopologyError::EntityNotFound("floor/ceiling"))
    }

    /// Returns a mutable reference to the surface data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn floor_ceiling_mut(
        &mut self,
        id: FloorCeilingId,
    ) -> Result<&mut FloorCeilingData, TopologyError> {
        self.floor_ceilings
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("floor/ceiling"))
    }

    /// Removes a surface, returning its data if it existed.
    pub fn remove_floor_ceiling(&mut self, id: FloorCeilingId) -> Option<FloorCeilingData> {
        self.floor_ceilings.remove(id)
    }

    /// Iterates over the non-virtual floor/ceiling surfaces of a level.
    pub fn floor_ceilings_in(
        &self,
        level: LevelId,
    ) -> impl Iterator<Item = (FloorCeilingId, &FloorCeilingData)> {
        self.floor_ceilings
            .iter()
            .filter(move |(_, f)| f.level == level && !f.markers.is_virtual)
    }

    // --- Markers and transient state ---

    /// Returns the marker flags of any entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn markers(&self, entity: EntityRef) -> Result<&Markers, TopologyError> {
        Ok(match entity {
            EntityRef::Vertex(id) => &self.vertex(id)?.markers,
            EntityRef::HalfEdge(id) => &self.half_edge(id)?.markers,
            EntityRef::Room(id) => &self.room(id)?.markers,
            EntityRef::FloorCeiling(id) => &self.floor_ceiling(id)?.markers,
        })
    }

    /// Returns the mutable marker flags of any entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn markers_mut(&mut self, entity: EntityRef) -> Result<&mut Markers, TopologyError> {
        Ok(match entity {
            EntityRef::Vertex(id) => &mut self.vertex_mut(id)?.markers,
            EntityRef::HalfEdge(id) => &mut self.half_edge_mut(id)?.markers,
            EntityRef::Room(id) => &mut self.room_mut(id)?.markers,
            EntityRef::FloorCeiling(id) => &mut self.floor_ceiling_mut(id)?.markers,
        })
    }

    /// Queues a one-frame offset on a vertex or floor/ceiling.
    ///
    /// Offsets queued repeatedly before the move pass accumulate.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is missing or cannot be moved.
    pub fn queue_move(&mut self, entity: EntityRef, offset: Vector3) -> Result<(), TopologyError> {
        let slot = match entity {
            EntityRef::Vertex(id) => &mut self.vertex_mut(id)?.pending_move,
            EntityRef::FloorCeiling(id) => &mut self.floor_ceiling_mut(id)?.pending_move,
            EntityRef::HalfEdge(_) | EntityRef::Room(_) => {
                return Err(TopologyError::InvalidTopology(
                    "only vertices and floor/ceilings can be moved".into(),
                ))
            }
        };
        match slot {
            Some(pending) => pending.accumulate(&offset),
            None => *slot = Some(Move::new(offset)),
        }
        Ok(())
    }

    /// Returns `true` if the entity still exists.
    #[must_use]
    pub fn contains(&self, entity: EntityRef) -> bool {
        match entity {
            EntityRef::Vertex(id) => self.vertices.contains_key(id),
            EntityRef::HalfEdge(id) => self.half_edges.contains_key(id),
            EntityRef::Room(id) => self.rooms.contains_key(id),
            EntityRef::FloorCeiling(id) => self.floor_ceilings.contains_key(id),
        }
    }

    /// Removes any entity. Returns `true` if it existed.
    pub fn despawn(&mut self, entity: EntityRef) -> bool {
        match entity {
            EntityRef::Vertex(id) => self.remove_vertex(id).is_some(),
            EntityRef::HalfEdge(id) => self.remove_half_edge(id).is_some(),
            EntityRef::Room(id) => self.remove_room(id).is_some(),
            EntityRef::FloorCeiling(id) => self.remove_floor_ceiling(id).is_some(),
        }
    }
}
