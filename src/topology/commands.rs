use std::collections::HashSet;

use super::floor_ceiling::FloorCeilingId;
use super::half_edge::HalfEdgeId;
use super::room::RoomId;
use super::vertex::VertexId;
use super::TopologyStore;

/// A reference to any entity kind held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityRef {
    Vertex(VertexId),
    HalfEdge(HalfEdgeId),
    Room(RoomId),
    FloorCeiling(FloorCeilingId),
}

impl From<VertexId> for EntityRef {
    fn from(id: VertexId) -> Self {
        Self::Vertex(id)
    }
}

impl From<HalfEdgeId> for EntityRef {
    fn from(id: HalfEdgeId) -> Self {
        Self::HalfEdge(id)
    }
}

impl From<RoomId> for EntityRef {
    fn from(id: RoomId) -> Self {
        Self::Room(id)
    }
}

impl From<FloorCeilingId> for EntityRef {
    fn from(id: FloorCeilingId) -> Self {
        Self::FloorCeiling(id)
    }
}

/// Deferred structural changes issued during a pass.
///
/// Destroyed entities stay readable in the store until [`apply`] runs at the
/// pass boundary; passes consult [`is_destroyed`] to skip them.
///
/// [`apply`]: CommandBuffer::apply
/// [`is_destroyed`]: CommandBuffer::is_destroyed
#[derive(Debug, Default)]
pub struct CommandBuffer {
    order: Vec<EntityRef>,
    destroyed: HashSet<EntityRef>,
}

impl CommandBuffer {
    /// Creates an empty command buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an entity for destruction. Queuing twice is a no-op.
    pub fn destroy(&mut self, entity: impl Into<EntityRef>) {
        let entity = entity.into();
        if self.destroyed.insert(entity) {
            self.order.push(entity);
        }
    }

    /// Returns `true` if the entity is queued for destruction.
    #[must_use]
    pub fn is_destroyed(&self, entity: impl Into<EntityRef>) -> bool {
        self.destroyed.contains(&entity.into())
    }

    /// Number of queued commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Applies every queued destruction, returning how many entities existed
    /// and were removed.
    pub fn apply(self, store: &mut TopologyStore) -> usize {
        self.order
            .into_iter()
            .filter(|&entity| store.despawn(entity))
            .count()
    }
}
