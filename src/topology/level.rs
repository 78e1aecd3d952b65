use uuid::Uuid;

slotmap::new_key_type! {
    /// Unique identifier for a level in the topology store.
    pub struct LevelId;
}

/// Data associated with a level.
///
/// Every other entity belongs to exactly one level; levels never share
/// entities and are processed independently.
#[derive(Debug, Clone)]
pub struct LevelData {
    /// Persistent identifier.
    pub guid: Uuid,
    /// Save counter, incremented every time the level is written.
    pub revision: u64,
    /// Set when a drag has finished and the merge pass should run.
    pub pending_merge: bool,
}

impl LevelData {
    /// Creates a new level at revision 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            guid: Uuid::new_v4(),
            revision: 0,
            pending_merge: false,
        }
    }
}

impl Default for LevelData {
    fn default() -> Self {
        Self::new()
    }
}
