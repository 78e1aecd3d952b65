use uuid::Uuid;

use super::floor_ceiling::FloorCeilingId;
use super::level::LevelId;
use super::markers::Markers;

slotmap::new_key_type! {
    /// Unique identifier for a room in the topology store.
    pub struct RoomId;
}

/// Data associated with a room.
///
/// The boundary is the loop of half-edges whose `room` is this room. Floor
/// and ceiling are optional: an open-air courtyard has no ceiling.
#[derive(Debug, Clone)]
pub struct RoomData {
    /// Persistent identifier.
    pub guid: Uuid,
    /// Owning level.
    pub level: LevelId,
    /// Surface this room stands on.
    pub floor: Option<FloorCeilingId>,
    /// Surface covering this room.
    pub ceiling: Option<FloorCeilingId>,
    /// Presence flags.
    pub markers: Markers,
    /// Render geometry is stale.
    pub dirty: bool,
}

impl RoomData {
    /// Creates a room without floor or ceiling.
    #[must_use]
    pub fn new(level: LevelId) -> Self {
        Self {
            guid: Uuid::new_v4(),
            level,
            floor: None,
            ceiling: None,
            markers: Markers::default(),
            dirty: true,
        }
    }
}
