use super::half_edge::HalfEdgeId;
use super::vertex::VertexId;
use super::TopologyStore;

/// One step of a loop walk: a half-edge and the vertices it connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopStep {
    /// The half-edge being traversed.
    pub edge: HalfEdgeId,
    /// Its origin vertex.
    pub from: VertexId,
    /// The origin of its successor.
    pub to: VertexId,
}

/// Lazy, restartable traversal of a `next` chain.
///
/// Stops when the walk arrives back at the starting half-edge, so a closed
/// loop of `n` half-edges yields exactly `n` steps. A chain that never closes
/// is cut off after as many steps as there are half-edges in the store.
#[derive(Debug, Clone)]
pub struct LoopWalk<'a> {
    store: &'a TopologyStore,
    start: HalfEdgeId,
    current: Option<HalfEdgeId>,
    remaining: usize,
}

impl<'a> LoopWalk<'a> {
    pub(crate) fn new(store: &'a TopologyStore, start: HalfEdgeId) -> Self {
        Self {
            store,
            start,
            current: Some(start),
            remaining: store.half_edge_total(),
        }
    }

    /// The half-edge the walk started from.
    #[must_use]
    pub fn start(&self) -> HalfEdgeId {
        self.start
    }
}

impl Iterator for LoopWalk<'_> {
    type Item = LoopStep;

    fn next(&mut self) -> Option<LoopStep> {
        let current = self.current.take()?;
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let he = self.store.half_edge(current).ok()?;
        let to = self.store.half_edge(he.next).ok()?.vertex;
        if he.next != self.start {
            self.current = Some(he.next);
        }
        Some(LoopStep {
            edge: current,
            from: he.vertex,
            to,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::math::Point2;
    use crate::topology::{HalfEdgeData, LevelData, RoomData, TopologyStore, VertexData};

    #[test]
    fn walk_yields_each_edge_once_from_any_start() {
        let mut store = TopologyStore::new();
        let level = store.add_level(LevelData::new());
        let room = store.add_room(RoomData::new(level));
        let verts: Vec<_> = [(0.0, 0.0), (0.0, 1.0), (1.0, 0.0)]
            .iter()
            .map(|&(x, z)| store.add_vertex(VertexData::new(level, Point2::new(x, z))))
            .collect();
        let edges: Vec<_> = verts
            .iter()
            .map(|&v| store.add_half_edge(HalfEdgeData::new(level, room, v)))
            .collect();
        store.link_loop(&edges).unwrap();

        let steps: Vec<_> = store.walk(edges[1]).collect();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].edge, edges[1]);
        assert_eq!(steps[0].from, verts[1]);
        assert_eq!(steps[0].to, verts[2]);
        assert_eq!(steps[2].to, verts[1]);

        // Restartable: a fresh walk from another edge sees the same loop.
        let again: Vec<_> = store.walk(edges[2]).map(|s| s.edge).collect();
        assert_eq!(again, vec![edges[2], edges[0], edges[1]]);
    }

    #[test]
    fn open_chain_terminates() {
        let mut store = TopologyStore::new();
        let level = store.add_level(LevelData::new());
        let room = store.add_room(RoomData::new(level));
        let v = store.add_vertex(VertexData::new(level, Point2::origin()));
        let a = store.add_half_edge(HalfEdgeData::new(level, room, v));
        let b = store.add_half_edge(HalfEdgeData::new(level, room, v));
        // a -> b -> b: never returns to a.
        store.half_edge_mut(a).unwrap().next = b;
        store.half_edge_mut(b).unwrap().next = b;
        assert_eq!(store.walk(a).count(), 2);
    }
}
