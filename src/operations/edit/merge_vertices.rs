use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::math::MERGE_EPSILON;
use crate::operations::query::UpdateVerticalExtents;
use crate::topology::{HalfEdgeId, LevelId, RoomId, TopologyStore, VertexId};

use super::backface_pairing::{pair_candidates, CandidateGroups, PairingCandidate};
use super::collapse::{overlaps, Removals};
use super::room_split::split_pinched_rooms;
use super::OverlapRule;

/// Parameters controlling when two vertices count as coincident.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MergeParams {
    /// Horizontal distance under which vertices coincide.
    pub epsilon: f64,
}

impl Default for MergeParams {
    fn default() -> Self {
        Self {
            epsilon: MERGE_EPSILON,
        }
    }
}

impl MergeParams {
    /// Sets the coincidence distance.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }
}

/// Counts of changes made by [`MergeVertices`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Static vertices replaced by a moved vertex.
    pub merged_vertices: usize,
    /// Back-face pairs created across newly coinciding walls.
    pub paired_backfaces: usize,
    /// Half-edges removed as degenerate or as part of a pinched-off sliver.
    pub removed_half_edges: usize,
    /// Rooms removed because their loop collapsed.
    pub removed_rooms: usize,
    /// Rooms created by splitting a pinched loop.
    pub split_rooms: usize,
    /// Vertices removed because nothing references them anymore.
    pub removed_vertices: usize,
}

impl MergeReport {
    /// Returns `true` if the merge changed nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Welds vertices that a drag has made coincident and repairs the topology.
///
/// Selected vertices are the moved set, all others are static. Each static
/// vertex lying on a moved vertex (within epsilon, with intersecting vertical
/// spans) is replaced by the first such moved vertex in store order. The pass
/// then:
///
/// 1. rewrites half-edge origins to the replacements;
/// 2. pairs walls that now run between the same two vertices in opposite
///    directions, when the pairing is unambiguous;
/// 3. collapses zero-length walls, removing rooms that fall below three;
/// 4. splits loops pinched at a vertex into separate rooms;
/// 5. removes vertices that nothing references.
///
/// Clears the level's pending-merge flag. Running it again without further
/// moves changes nothing.
pub struct MergeVertices {
    level: LevelId,
    params: MergeParams,
}

impl MergeVertices {
    /// Creates a new `MergeVertices` pass with default parameters.
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

    /// Executes the merge.
    ///
    /// # Errors
    ///
    /// Returns an error if the level is missing or a loop references a
    /// destroyed entity.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<MergeReport> {
        store.level(self.level)?;
        UpdateVerticalExtents::new(self.level).execute(store)?;

        let mut removals = Removals::new(self.level);
        let mut report = MergeReport::default();

        let replacements = self.detect(store, &mut removals)?;
        report.merged_vertices = replacements.len();

        if !replacements.is_empty() {
            let groups = self.repair_references(store, &replacements)?;
            report.paired_backfaces = pair_candidates(store, &groups)?;
        }

        let rooms: Vec<RoomId> = store.rooms_in(self.level).map(|(id, _)| id).collect();
        for room in rooms {
            removals.collapse_room(store, room, OverlapRule::Full, self.params.epsilon)?;
        }

        report.split_rooms = split_pinched_rooms(store, &mut removals, self.level)?;

        let all_vertices: Vec<VertexId> = store.vertices_in(self.level).map(|(id, _)| id).collect();
        removals.add_candidates(all_vertices);
        removals.remove_unreferenced(store);

        report.removed_half_edges = removals.half_edges;
        report.removed_rooms = removals.rooms;
        report.removed_vertices = removals.vertices;
        removals.apply(store);

        store.level_mut(self.level)?.pending_merge = false;
        if !report.is_noop() {
            debug!(level = ?self.level, ?report, "merged vertices");
        }
        Ok(report)
    }

    /// Finds static vertices lying on moved ones. First match wins.
    fn detect(
        &self,
        store: &mut TopologyStore,
        removals: &mut Removals,
    ) -> Result<HashMap<VertexId, VertexId>> {
        let (moved, fixed): (Vec<_>, Vec<_>) = store
            .vertices_in(self.level)
            .map(|(id, v)| (id, v.markers.selected))
            .partition(|&(_, selected)| selected);

        let mut replacements = HashMap::new();
        for &(static_id, _) in &fixed {
            for &(moved_id, _) in &moved {
                if overlaps(store, static_id, moved_id, OverlapRule::Full, self.params.epsilon)? {
                    replacements.insert(static_id, moved_id);
                    removals.replace_vertex(static_id);
                    store.vertex_mut(moved_id)?.dirty = true;
                    break;
                }
            }
        }
        Ok(replacements)
    }

    /// Points half-edges at the replacement vertices and collects the walls
    /// that may need a new back face.
    ///
    /// Candidates are keyed by their vertices after replacement, so walls
    /// that now run between the same vertices meet in opposite groups.
    fn repair_references(
        &self,
        store: &mut TopologyStore,
        replacements: &HashMap<VertexId, VertexId>,
    ) -> Result<CandidateGroups> {
        let edges: Vec<(HalfEdgeId, VertexId)> = store
            .half_edges_in(self.level)
            .map(|(id, he)| (id, he.vertex))
            .collect();
        for &(edge, origin) in &edges {
            if let Some(&target) = replacements.get(&origin) {
                store.half_edge_mut(edge)?.vertex = target;
            }
        }

        let targets: HashSet<VertexId> = replacements.values().copied().collect();
        let mut groups = CandidateGroups::new();
        for &(edge, _) in &edges {
            let he = store.half_edge(edge)?;
            if he.back_face.is_some() {
                continue;
            }
            let from = he.vertex;
            let to = store.end_vertex(edge)?;
            if from == to || !(targets.contains(&from) || targets.contains(&to)) {
                continue;
            }
            groups.entry((from, to)).or_default().push(PairingCandidate {
                edge,
                min_y: he.min_y,
                max_y: he.max_y,
            });
        }
        Ok(groups)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use crate::operations::creation::MakeRoom;
    use crate::topology::{LevelData, ValidateLevel};

    fn square(store: &mut TopologyStore, level: LevelId, x0: f64) -> RoomId {
        MakeRoom::new(
            level,
            vec![
                Point2::new(x0, 0.0),
                Point2::new(x0, 4.0),
                Point2::new(x0 + 4.0, 4.0),
                Point2::new(x0 + 4.0, 0.0),
            ],
        )
        .execute(store)
        .unwrap()
    }

    fn select_and_move(store: &mut TopologyStore, vertex: VertexId, to: Point2) {
        let v = store.vertex_mut(vertex).unwrap();
        v.position = to;
        v.markers.selected = true;
    }

    #[test]
    fn adjacent_rooms_become_paired_when_walls_meet() {
        let mut store = TopologyStore::new();
        let level = store.add_level(LevelData::new());
        let a = square(&mut store, level, 0.0);
        let b = square(&mut store, level, 4.0);
        let a_edges = store.room_loop(a).unwrap();
        let b_edges = store.room_loop(b).unwrap();

        // Weld A's right wall (4,4)->(4,0) onto B's left wall (4,0)->(4,4) by
        // selecting A's corners and nudging them inside epsilon.
        let a_top = store.half_edge(a_edges[2]).unwrap().vertex;
        let a_bottom = store.half_edge(a_edges[3]).unwrap().vertex;
        select_and_move(&mut store, a_top, Point2::new(4.001, 4.0));
        select_and_move(&mut store, a_bottom, Point2::new(4.001, 0.0));

        let report = MergeVertices::new(level).execute(&mut store).unwrap();
        assert_eq!(report.merged_vertices, 2);
        assert_eq!(report.paired_backfaces, 1);
        assert_eq!(report.split_rooms, 0);
        assert_eq!(store.vertices_in(level).count(), 6);
        assert_eq!(store.half_edge(a_edges[2]).unwrap().back_face, Some(b_edges[0]));
        assert!(ValidateLevel::new(level).execute(&store).is_valid());
        assert!(!store.level(level).unwrap().pending_merge);

        let again = MergeVertices::new(level).execute(&mut store).unwrap();
        assert!(again.is_noop());
    }

    #[test]
    fn vertices_outside_epsilon_stay_apart() {
        let mut store = TopologyStore::new();
        let level = store.add_level(LevelData::new());
        let a = square(&mut store, level, 0.0);
        square(&mut store, level, 4.1);
        let corner = store.half_edge(store.room_loop(a).unwrap()[2]).unwrap().vertex;
        store.vertex_mut(corner).unwrap().markers.selected = true;

        let report = MergeVertices::new(level).execute(&mut store).unwrap();
        assert!(report.is_noop());
        assert_eq!(store.vertices_in(level).count(), 8);
    }

    #[test]
    fn wider_epsilon_merges_farther_vertices() {
        let mut store = TopologyStore::new();
        let level = store.add_level(LevelData::new());
        let a = square(&mut store, level, 0.0);
        square(&mut store, level, 4.1);
        let a_edges = store.room_loop(a).unwrap();
        for &i in &[2, 3] {
            let v = store.half_edge(a_edges[i]).unwrap().vertex;
            store.vertex_mut(v).unwrap().markers.selected = true;
        }

        let report = MergeVertices::new(level)
            .with_params(MergeParams::default().with_epsilon(0.2))
            .execute(&mut store)
            .unwrap();
        assert_eq!(report.merged_vertices, 2);
        assert_eq!(report.paired_backfaces, 1);
    }

    #[test]
    fn corner_dragged_onto_its_neighbour_leaves_a_triangle() {
        let mut store = TopologyStore::new();
        let level = store.add_level(LevelData::new());
        let room = square(&mut store, level, 0.0);
        let edges = store.room_loop(room).unwrap();
        let corner = store.half_edge(edges[1]).unwrap().vertex;
        select_and_move(&mut store, corner, Point2::new(0.0, 0.0));

        let report = MergeVertices::new(level).execute(&mut store).unwrap();
        assert_eq!(report.merged_vertices, 1);
        assert_eq!(report.removed_half_edges, 1);
        assert_eq!(report.split_rooms, 0);
        assert!(store.half_edge(edges[0]).is_err());
        assert_eq!(store.room_loop(room).unwrap().len(), 3);
        assert_eq!(store.vertices_in(level).count(), 3);
        assert!(ValidateLevel::new(level).execute(&store).is_valid());
    }

    #[test]
    fn merge_stays_inside_its_level() {
        let mut store = TopologyStore::new();
        let ground = store.add_level(LevelData::new());
        let upper = store.add_level(LevelData::new());

        // Both levels hold the same pair of rooms with A's right wall nudged
        // onto B's left wall and selected, so either level would weld.
        let mut right_corners = Vec::new();
        for level in [ground, upper] {
            let a = square(&mut store, level, 0.0);
            square(&mut store, level, 4.0);
            let edges = store.room_loop(a).unwrap();
            for (edge, z) in [(edges[2], 4.0), (edges[3], 0.0)] {
                let corner = store.half_edge(edge).unwrap().vertex;
                select_and_move(&mut store, corner, Point2::new(4.001, z));
                right_corners.push(corner);
            }
        }

        let snapshot = |store: &TopologyStore| {
            let vertices: Vec<(VertexId, Point2)> =
                store.vertices_in(upper).map(|(id, v)| (id, v.position)).collect();
            let half_edges: Vec<_> = store
                .half_edges_in(upper)
                .map(|(id, h)| (id, h.room, h.vertex, h.next, h.back_face))
                .collect();
            let rooms: Vec<RoomId> = store.rooms_in(upper).map(|(id, _)| id).collect();
            (vertices, half_edges, rooms)
        };
        let before = snapshot(&store);

        let report = MergeVertices::new(ground).execute(&mut store).unwrap();
        assert_eq!(report.merged_vertices, 2);
        assert_eq!(report.paired_backfaces, 1);
        assert_eq!(store.vertices_in(ground).count(), 6);
        assert!(store
            .half_edges_in(ground)
            .all(|(_, h)| store.vertex(h.vertex).unwrap().level == ground));

        assert_eq!(snapshot(&store), before);
        assert_eq!(store.vertices_in(upper).count(), 8);
        assert!(right_corners[2..].iter().all(|&v| store.vertex(v).is_ok()));
        assert!(store.half_edges_in(upper).all(|(_, h)| h.back_face.is_none()));
        assert!(ValidateLevel::new(ground).execute(&store).is_valid());
        assert!(ValidateLevel::new(upper).execute(&store).is_valid());
    }
}
