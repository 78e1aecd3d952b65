use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;
use crate::topology::{HalfEdgeId, LevelId, RoomData, RoomId, TopologyStore, VertexId};

use super::collapse::Removals;

/// Splits every loop that passes through the same vertex twice.
///
/// A merge can pinch a room's boundary so that one loop visits a vertex at
/// positions `i < k`. The loop is cut there into `inner = edges[i..k]` and
/// `outer = edges[k..] + edges[..i]`, each closed on its own:
///
/// - both shorter than three: the room is removed;
/// - one side shorter than three: that side is removed, the room keeps the
///   other;
/// - both at least three: a new room with copied floor and ceiling takes the
///   smaller side (the inner side on a tie).
///
/// Both results are checked again, since a loop may be pinched more than
/// once. Returns the number of new rooms.
pub(crate) fn split_pinched_rooms(
    store: &mut TopologyStore,
    removals: &mut Removals,
    level: LevelId,
) -> Result<usize> {
    let mut work: Vec<(RoomId, Vec<HalfEdgeId>)> = Vec::new();
    let rooms: Vec<RoomId> = store.rooms_in(level).map(|(id, _)| id).collect();
    for room in rooms {
        if !removals.is_destroyed(room) {
            work.push((room, removals.live_loop(store, room)?));
        }
    }

    let mut created = 0;
    while let Some((room, edges)) = work.pop() {
        let Some((i, k)) = first_repeat(store, &edges)? else {
            continue;
        };
        let inner: Vec<HalfEdgeId> = edges[i..k].to_vec();
        let outer: Vec<HalfEdgeId> = edges[k..].iter().chain(&edges[..i]).copied().collect();

        match (outer.len() < 3, inner.len() < 3) {
            (true, true) => removals.room(store, room)?,
            (true, false) => {
                for &edge in &outer {
                    removals.half_edge(store, edge)?;
                }
                store.link_loop(&inner)?;
                store.mark_room_dirty(room);
                work.push((room, inner));
            }
            (false, true) => {
                for &edge in &inner {
                    removals.half_edge(store, edge)?;
                }
                store.link_loop(&outer)?;
                store.mark_room_dirty(room);
                work.push((room, outer));
            }
            (false, false) => {
                store.link_loop(&inner)?;
                store.link_loop(&outer)?;

                let new_room = store.add_room(RoomData::new(level));
                store.copy_surfaces(room, new_room)?;
                let (moved, kept) = if outer.len() < inner.len() {
                    (outer, inner)
                } else {
                    (inner, outer)
                };
                for &edge in &moved {
                    store.half_edge_mut(edge)?.room = new_room;
                }
                store.mark_room_dirty(room);
                debug!(?room, ?new_room, kept = kept.len(), moved = moved.len(), "split room");

                created += 1;
                work.push((room, kept));
                work.push((new_room, moved));
            }
        }
    }

    Ok(created)
}

/// Positions `i < k` of the first vertex visited twice, scanning by `k`.
fn first_repeat(store: &TopologyStore, edges: &[HalfEdgeId]) -> Result<Option<(usize, usize)>> {
    let mut seen: HashMap<VertexId, usize> = HashMap::with_capacity(edges.len());
    for (k, &edge) in edges.iter().enumerate() {
        let origin = store.half_edge(edge)?.vertex;
        if let Some(&i) = seen.get(&origin) {
            return Ok(Some((i, k)));
        }
        seen.insert(origin, k);
    }
    Ok(None)
}
