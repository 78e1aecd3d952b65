use crate::math::Vector3;

/// Presence-only flags driving selection, preview and visibility state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Markers {
    /// Picked by the user; selected vertices count as "moved" when merging.
    pub selected: bool,
    /// Under the pointer.
    pub hovered: bool,
    /// Preview-only entity (e.g. a hover widget on a wall). Excluded from
    /// level queries, merges, validation and persistence.
    pub is_virtual: bool,
    /// Not rendered.
    pub hidden: bool,
}

/// Transient one-frame offset queued on a vertex or floor-ceiling.
///
/// Consumed by the move pass. Vertices only use the horizontal components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Move {
    /// Accumulated offset in level-local space.
    pub offset: Vector3,
}

impl Move {
    /// Creates a new move with the given offset.
    #[must_use]
    pub fn new(offset: Vector3) -> Self {
        Self { offset }
    }

    /// Adds another offset queued during the same frame.
    pub fn accumulate(&mut self, offset: &Vector3) {
        self.offset += offset;
    }
}
