use uuid::Uuid;

use crate::math::Point2;

use super::level::LevelId;
use super::markers::{Markers, Move};

slotmap::new_key_type! {
    /// Unique identifier for a vertex in the topology store.
    pub struct VertexId;
}

/// Data associated with a topological vertex.
///
/// Vertices carry no adjacency; the half-edges that reference them do.
#[derive(Debug, Clone)]
pub struct VertexData {
    /// Persistent identifier.
    pub guid: Uuid,
    /// Owning level.
    pub level: LevelId,
    /// Horizontal position, `(x, z)`.
    pub position: Point2,
    /// Lowest floor height among incident half-edges (derived).
    pub min_y: f64,
    /// Highest ceiling height among incident half-edges (derived).
    pub max_y: f64,
    /// Presence flags.
    pub markers: Markers,
    /// Offset queued for the next move pass.
    pub pending_move: Option<Move>,
    /// Position changed since the last dirty propagation.
    pub dirty: bool,
}

impl VertexData {
    /// Creates a new vertex at the given horizontal position.
    ///
    /// The vertical extent starts empty until the extents are derived.
    #[must_use]
    pub fn new(level: LevelId, position: Point2) -> Self {
        Self {
            guid: Uuid::new_v4(),
            level,
            position,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
            markers: Markers::default(),
            pending_move: None,
            dirty: true,
        }
    }

    /// Returns `true` if both vertical ranges intersect.
    #[must_use]
    pub fn vertical_overlap(&self, other: &Self) -> bool {
        self.min_y <= other.max_y && other.min_y <= self.max_y
    }

    /// Squared horizontal distance to another vertex.
    #[must_use]
    pub fn distance_squared(&self, other: &Self) -> f64 {
        (self.position - other.position).norm_squared()
    }
}
