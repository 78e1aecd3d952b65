//! Topology validation for room boundaries.
//!
//! Checks invariants that must hold after every completed pass:
//! - every room's half-edges form exactly one closed loop of length ≥ 3
//! - back faces are paired symmetrically
//! - every vertex is referenced by at least one half-edge
//! - floor/ceiling links agree with the rooms that use them

use std::collections::HashSet;

use thiserror::Error;

use super::{FloorCeilingId, HalfEdgeId, LevelId, RoomId, TopologyStore, VertexId};

/// A single invariant violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyIssue {
    #[error("room {0:?} has no half-edges")]
    EmptyRoom(RoomId),

    #[error("loop of room {0:?} does not close")]
    OpenLoop(RoomId),

    #[error("room {room:?} loop has only {len} half-edges")]
    ShortLoop { room: RoomId, len: usize },

    #[error("room {room:?} has {unreached} half-edges outside its loop")]
    DetachedHalfEdges { room: RoomId, unreached: usize },

    #[error("half-edge {0:?} continues into another room")]
    ForeignNext(HalfEdgeId),

    #[error("half-edge {0:?} references a missing entity")]
    DanglingReference(HalfEdgeId),

    #[error("back face of half-edge {0:?} does not point back")]
    AsymmetricBackFace(HalfEdgeId),

    #[error("vertex {0:?} is not referenced by any half-edge")]
    OrphanVertex(VertexId),

    #[error("room {0:?} disagrees with its floor/ceiling links")]
    SurfaceMismatch(RoomId),

    #[error("floor/ceiling {0:?} references a missing room")]
    DanglingSurface(FloorCeilingId),
}

/// Result of validating a level.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Every violation found, in discovery order.
    pub issues: Vec<TopologyIssue>,
}

impl ValidationReport {
    /// Returns `true` if no invariant is violated.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Validates the topological consistency of one level.
pub struct ValidateLevel {
    level: LevelId,
}

impl ValidateLevel {
    /// Creates a new `ValidateLevel` query.
    #[must_use]
    pub fn new(level: LevelId) -> Self {
        Self { level }
    }

    /// Executes the validation.
    #[must_use]
    pub fn execute(&self, store: &TopologyStore) -> ValidationReport {
        let mut issues = Vec::new();

        for (id, he) in store.half_edges_in(self.level) {
            let next_room = store.half_edge(he.next).map(|n| n.room);
            if store.vertex(he.vertex).is_err() || store.room(he.room).is_err() || next_room.is_err()
            {
                issues.push(TopologyIssue::DanglingReference(id));
                continue;
            }
            if next_room.ok() != Some(he.room) {
                issues.push(TopologyIssue::ForeignNext(id));
            }
            if let Some(back) = he.back_face {
                let symmetric = store
                    .half_edge(back)
                    .is_ok_and(|b| b.back_face == Some(id));
                if !symmetric {
                    issues.push(TopologyIssue::AsymmetricBackFace(id));
                }
            }
        }

        for (room_id, room) in store.rooms_in(self.level) {
            let members = store.room_half_edges(room_id);
            let Some(&start) = members.first() else {
                issues.push(TopologyIssue::EmptyRoom(room_id));
                continue;
            };
            match store.loop_len(start) {
                Ok(len) if len < 3 => {
                    issues.push(TopologyIssue::ShortLoop { room: room_id, len });
                }
                Ok(len) if len < members.len() => {
                    issues.push(TopologyIssue::DetachedHalfEdges {
                        room: room_id,
                        unreached: members.len() - len,
                    });
                }
                Ok(_) => {}
                Err(_) => issues.push(TopologyIssue::OpenLoop(room_id)),
            }

            let floor_ok = room.floor.is_none_or(|f| {
                store
                    .floor_ceiling(f)
                    .is_ok_and(|fc| fc.above == Some(room_id))
            });
            let ceiling_ok = room.ceiling.is_none_or(|c| {
                store
                    .floor_ceiling(c)
                    .is_ok_and(|fc| fc.below == Some(room_id))
            });
            if !floor_ok || !ceiling_ok {
                issues.push(TopologyIssue::SurfaceMismatch(room_id));
            }
        }

        for (id, fc) in store.floor_ceilings_in(self.level) {
            let dangling = [fc.above, fc.below]
                .into_iter()
                .flatten()
                .any(|room| store.room(room).is_err());
            if dangling {
                issues.push(TopologyIssue::DanglingSurface(id));
            }
        }

        let referenced: HashSet<VertexId> = store
            .half_edges_in(self.level)
            .map(|(_, he)| he.vertex)
            .collect();
        for (id, _) in store.vertices_in(self.level) {
            if !referenced.contains(&id) {
                issues.push(TopologyIssue::OrphanVertex(id));
            }
        }

        ValidationReport { issues }
    }
}
