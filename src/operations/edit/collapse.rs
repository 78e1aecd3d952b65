//! Deferred removal of half-edges, rooms and vertices shared by the sweep
//! and merge passes.

use std::collections::{BTreeSet, HashSet};

use tracing::warn;

use crate::error::{Result, TopologyError};
use crate::topology::{
    CommandBuffer, EntityRef, HalfEdgeId, LevelId, RoomId, TopologyStore, VertexId,
};

use super::OverlapRule;

/// Returns `true` if two vertices coincide under the given rule.
///
/// A vertex always overlaps itself.
pub(crate) fn overlaps(
    store: &TopologyStore,
    a: VertexId,
    b: VertexId,
    rule: OverlapRule,
    epsilon: f64,
) -> Result<bool> {
    if a == b {
        return Ok(true);
    }
    let va = store.vertex(a)?;
    let vb = store.vertex(b)?;
    let close = va.distance_squared(vb) <= epsilon * epsilon;
    Ok(match rule {
        OverlapRule::Horizontal => close,
        OverlapRule::Full => close && va.vertical_overlap(vb),
    })
}

/// Destruction queued during one pass, with per-kind counts.
///
/// Detaching keeps the surviving topology consistent immediately: back-face
/// partners are unlinked and surfaces released, while the entities
/// themselves stay in the store until [`Removals::apply`].
#[derive(Debug)]
pub(crate) struct Removals {
    level: LevelId,
    commands: CommandBuffer,
    candidates: BTreeSet<VertexId>,
    pub half_edges: usize,
    pub rooms: usize,
    pub vertices: usize,
}

impl Removals {
    pub fn new(level: LevelId) -> Self {
        Self {
            level,
            commands: CommandBuffer::new(),
            candidates: BTreeSet::new(),
            half_edges: 0,
            rooms: 0,
            vertices: 0,
        }
    }

    pub fn is_destroyed(&self, entity: impl Into<EntityRef>) -> bool {
        self.commands.is_destroyed(entity)
    }

    /// Returns a room's loop, starting from a half-edge that is not queued.
    ///
    /// Queued half-edges stay in the store until [`Removals::apply`] but are
    /// no longer part of any loop.
    pub fn live_loop(&self, store: &TopologyStore, room: RoomId) -> Result<Vec<HalfEdgeId>> {
        let start = store
            .room_half_edges(room)
            .into_iter()
            .find(|&edge| !self.commands.is_destroyed(edge))
            .ok_or(TopologyError::EmptyRoom)?;
        let len = store.loop_len(start)?;
        Ok(store.walk(start).take(len).map(|step| step.edge).collect())
    }

    /// Queues a vertex that was replaced by another one.
    pub fn replace_vertex(&mut self, vertex: VertexId) {
        self.commands.destroy(vertex);
    }

    /// Detaches a half-edge from its back face and queues it.
    ///
    /// Its origin becomes a candidate for orphan removal.
    pub fn half_edge(&mut self, store: &mut TopologyStore, edge: HalfEdgeId) -> Result<()> {
        if self.commands.is_destroyed(edge) {
            return Ok(());
        }
        let (origin, back_face) = {
            let he = store.half_edge(edge)?;
            (he.vertex, he.back_face)
        };
        if let Some(back) = back_face {
            let partner = store.half_edge_mut(back)?;
            if partner.back_face == Some(edge) {
                partner.back_face = None;
            } else {
                warn!(
                    ?edge,
                    ?back,
                    partner_back_face = ?partner.back_face,
                    "back face does not point back, clearing stale pointer"
                );
            }
            store.half_edge_mut(edge)?.back_face = None;
        }
        self.commands.destroy(edge);
        self.candidates.insert(origin);
        self.half_edges += 1;
        Ok(())
    }

    /// Queues a room with all of its half-edges.
    ///
    /// The room is unlinked from its floor and ceiling; a surface left with
    /// no room on either side is queued as well.
    pub fn room(&mut self, store: &mut TopologyStore, room: RoomId) -> Result<()> {
        if self.commands.is_destroyed(room) {
            return Ok(());
        }
        for edge in store.room_half_edges(room) {
            self.half_edge(store, edge)?;
        }

        let (floor, ceiling) = {
            let data = store.room(room)?;
            (data.floor, data.ceiling)
        };
        if let Some(id) = floor {
            let surface = store.floor_ceiling_mut(id)?;
            if surface.above == Some(room) {
                surface.above = None;
            }
            if surface.above.is_none() && surface.below.is_none() {
                self.commands.destroy(id);
            }
        }
        if let Some(id) = ceiling {
            let surface = store.floor_ceiling_mut(id)?;
            if surface.below == Some(room) {
                surface.below = None;
            }
            if surface.above.is_none() && surface.below.is_none() {
                self.commands.destroy(id);
            }
        }

        self.commands.destroy(room);
        self.rooms += 1;
        Ok(())
    }

    /// Collapses runs of consecutive coinciding corners in a room's loop.
    ///
    /// Within a run only the half-edge leaving the run survives, so the
    /// remaining wall keeps its back face. A loop left with fewer than three
    /// half-edges takes the whole room with it. Returns `true` if anything
    /// changed.
    pub fn collapse_room(
        &mut self,
        store: &mut TopologyStore,
        room: RoomId,
        rule: OverlapRule,
        epsilon: f64,
    ) -> Result<bool> {
        if self.commands.is_destroyed(room) {
            return Ok(false);
        }
        let edges = self.live_loop(store, room)?;
        let origins = edges
            .iter()
            .map(|&e| Ok(store.half_edge(e)?.vertex))
            .collect::<Result<Vec<VertexId>>>()?;
        let n = edges.len();

        // Begin at a corner that does not continue a run from its predecessor.
        let mut start = None;
        for i in 0..n {
            if !overlaps(store, origins[(i + n - 1) % n], origins[i], rule, epsilon)? {
                start = Some(i);
                break;
            }
        }
        let Some(start) = start else {
            self.room(store, room)?;
            return Ok(true);
        };

        let mut kept = Vec::with_capacity(n);
        let mut k = 0;
        while k < n {
            let anchor = origins[(start + k) % n];
            let mut end = k;
            while end + 1 < n
                && overlaps(store, anchor, origins[(start + end + 1) % n], rule, epsilon)?
            {
                end += 1;
            }
            for r in k..end {
                self.half_edge(store, edges[(start + r) % n])?;
            }
            kept.push(edges[(start + end) % n]);
            k = end + 1;
        }

        if kept.len() == n {
            return Ok(false);
        }
        if kept.len() < 3 {
            self.room(store, room)?;
        } else {
            store.link_loop(&kept)?;
            store.mark_room_dirty(room);
        }
        Ok(true)
    }

    /// Adds vertices to check in the next orphan sweep.
    pub fn add_candidates(&mut self, vertices: impl IntoIterator<Item = VertexId>) {
        self.candidates.extend(vertices);
    }

    /// Queues every orphan candidate that no surviving half-edge of the
    /// level references.
    pub fn remove_unreferenced(&mut self, store: &TopologyStore) {
        let referenced: HashSet<VertexId> = store
            .half_edges_in(self.level)
            .filter(|(id, _)| !self.commands.is_destroyed(*id))
            .map(|(_, he)| he.vertex)
            .collect();
        for vertex in std::mem::take(&mut self.candidates) {
            if !referenced.contains(&vertex) && !self.commands.is_destroyed(vertex) {
                self.commands.destroy(vertex);
                self.vertices += 1;
            }
        }
    }

    /// Flushes the queued destruction into the store.
    pub fn apply(self, store: &mut TopologyStore) -> usize {
        self.commands.apply(store)
    }
}
