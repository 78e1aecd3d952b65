use uuid::Uuid;

use crate::geometry::Plane;

use super::level::LevelId;
use super::markers::{Markers, Move};
use super::room::RoomId;

slotmap::new_key_type! {
    /// Unique identifier for a floor/ceiling surface in the topology store.
    pub struct FloorCeilingId;
}

/// A horizontal (or sloped) surface separating two vertically stacked rooms.
///
/// The same surface is the floor of the room `above` and the ceiling of the
/// room `below`; either side may be absent when the surface faces outside.
#[derive(Debug, Clone)]
pub struct FloorCeilingData {
    /// Persistent identifier.
    pub guid: Uuid,
    /// Owning level.
    pub level: LevelId,
    /// Geometric plane.
    pub plane: Plane,
    /// Room whose floor this surface is.
    pub above: Option<RoomId>,
    /// Room whose ceiling this surface is.
    pub below: Option<RoomId>,
    /// Presence flags.
    pub markers: Markers,
    /// Offset queued for the next move pass.
    pub pending_move: Option<Move>,
    /// Plane changed since the last dirty propagation.
    pub dirty: bool,
}

impl FloorCeilingData {
    /// Creates a surface with no adjoining rooms.
    #[must_use]
    pub fn new(level: LevelId, plane: Plane) -> Self {
        Self {
            guid: Uuid::new_v4(),
            level,
            plane,
            above: None,
            below: None,
            markers: Markers::default(),
            pending_move: None,
            dirty: false,
        }
    }

    /// Sets the room standing on this surface.
    #[must_use]
    pub fn with_above(mut self, room: RoomId) -> Self {
        self.above = Some(room);
        self
    }

    /// Sets the room covered by this surface.
    #[must_use]
    pub fn with_below(mut self, room: RoomId) -> Self {
        self.below = Some(room);
        self
    }
}
