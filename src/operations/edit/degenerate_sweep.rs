use tracing::debug;

use crate::error::Result;
use crate::topology::{LevelId, RoomId, TopologyStore};

use super::collapse::Removals;
use super::{MergeParams, OverlapRule};

/// Counts of entities removed by [`SweepDegenerateEdges`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Zero-length half-edges removed.
    pub removed_half_edges: usize,
    /// Rooms whose loop dropped below three half-edges.
    pub removed_rooms: usize,
    /// Vertices no longer referenced by any half-edge.
    pub removed_vertices: usize,
}

impl SweepReport {
    /// Returns `true` if the sweep changed nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Removes zero-length walls left behind by a raw drag.
///
/// Consecutive corners of a loop closer than the merge epsilon collapse into
/// one, comparing horizontal distance only. Rooms whose loop falls below
/// three half-edges are removed together with their orphaned vertices and
/// surfaces.
pub struct SweepDegenerateEdges {
    level: LevelId,
    params: MergeParams,
}

impl SweepDegenerateEdges {
    /// Creates a new `SweepDegenerateEdges` pass with default parameters.
    #[must_use]
    pub fn new(level: LevelId) -> Self {
        Self {
            level,
            params: MergeParams::default(),
        }
    }

    /// Sets the coincidence parameters.
    #[must_use]
    pub fn with_params(mut self, params: MergeParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the sweep.
    ///
    /// # Errors
    ///
    /// Returns an error if a room's loop is broken or references a missing
    /// entity.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SweepReport> {
        let rooms: Vec<RoomId> = store.rooms_in(self.level).map(|(id, _)| id).collect();
        let mut removals = Removals::new(self.level);
        for room in rooms {
            removals.collapse_room(store, room, OverlapRule::Horizontal, self.params.epsilon)?;
        }
        removals.remove_unreferenced(store);

        let report = SweepReport {
            removed_half_edges: removals.half_edges,
            removed_rooms: removals.rooms,
            removed_vertices: removals.vertices,
        };
        removals.apply(store);

        if !report.is_noop() {
            debug!(level = ?self.level, ?report, "swept degenerate half-edges");
        }
        Ok(report)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use crate::operations::creation::MakeRoom;
    use crate::topology::{LevelData, ValidateLevel};

    #[test]
    fn triangle_with_two_coinciding_corners_disappears() {
        let mut store = TopologyStore::new();
        let level = store.add_level(LevelData::new());
        MakeRoom::new(
            level,
            vec![Point2::new(0.0, 0.0), Point2::new(0.0, 2.0), Point2::new(0.0, 2.001)],
        )
        .execute(&mut store)
        .unwrap();

        let report = SweepDegenerateEdges::new(level).execute(&mut store).unwrap();
        assert_eq!(report.removed_rooms, 1);
        assert_eq!(report.removed_half_edges, 3);
        assert_eq!(report.removed_vertices, 3);
        assert_eq!(store.rooms_in(level).count(), 0);
        assert_eq!(store.floor_ceilings_in(level).count(), 0);
    }

    #[test]
    fn clean_level_is_untouched() {
        let mut store = TopologyStore::new();
        let level = store.add_level(LevelData::new());
        MakeRoom::new(
            level,
            vec![Point2::new(0.0, 0.0), Point2::new(0.0, 2.0), Point2::new(2.0, 0.0)],
        )
        .execute(&mut store)
        .unwrap();
        let report = SweepDegenerateEdges::new(level).execute(&mut store).unwrap();
        assert!(report.is_noop());
        assert!(ValidateLevel::new(level).execute(&store).is_valid());
    }
}
