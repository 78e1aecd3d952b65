use uuid::Uuid;

use super::level::LevelId;
use super::markers::Markers;
use super::room::RoomId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a half-edge in the topology store.
    pub struct HalfEdgeId;
}

/// Data associated with a half-edge.
///
/// A half-edge runs from its origin `vertex` to the origin of `next`, along
/// the boundary of its `room`. Following `next` always returns to the
/// starting half-edge.
#[derive(Debug, Clone)]
pub struct HalfEdgeData {
    /// Persistent identifier.
    pub guid: Uuid,
    /// Owning level.
    pub level: LevelId,
    /// Room whose boundary this half-edge belongs to.
    pub room: RoomId,
    /// Origin vertex.
    pub vertex: VertexId,
    /// Next half-edge around the same room.
    pub next: HalfEdgeId,
    /// Opposite half-edge of the adjoining room along the same wall.
    ///
    /// Symmetric: if `a.back_face == Some(b)` then `b.back_face == Some(a)`.
    pub back_face: Option<HalfEdgeId>,
    /// Lowest floor height at either endpoint (derived).
    pub min_y: f64,
    /// Highest ceiling height at either endpoint (derived).
    pub max_y: f64,
    /// Presence flags.
    pub markers: Markers,
}

impl HalfEdgeData {
    /// Creates an unlinked half-edge.
    ///
    /// `next` starts as the null key and must be wired before the half-edge
    /// is walked.
    #[must_use]
    pub fn new(level: LevelId, room: RoomId, vertex: VertexId) -> Self {
        Self {
            guid: Uuid::new_v4(),
            level,
            room,
            vertex,
            next: HalfEdgeId::default(),
            back_face: None,
            min_y: f64::NEG_INFINITY,
            max_y: f64::INFINITY,
            markers: Markers::default(),
        }
    }

    /// Sets the `next` link.
    #[must_use]
    pub fn with_next(mut self, next: HalfEdgeId) -> Self {
        self.next = next;
        self
    }
}
