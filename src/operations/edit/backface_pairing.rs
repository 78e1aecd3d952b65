use std::collections::BTreeMap;

use crate::error::Result;
use crate::topology::{HalfEdgeId, TopologyStore, VertexId};

/// A half-edge that lost or never had a back face after a merge.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PairingCandidate {
    pub edge: HalfEdgeId,
    pub min_y: f64,
    pub max_y: f64,
}

/// Candidates grouped by the `(origin, end)` vertices of their half-edge.
pub(crate) type CandidateGroups = BTreeMap<(VertexId, VertexId), Vec<PairingCandidate>>;

/// Pairs candidates of `(a, b)` with candidates of `(b, a)`.
///
/// Both groups are sorted by `min_y` and swept into runs of overlapping
/// vertical spans. A run is committed only if it holds exactly one
/// candidate from each side; anything more crowded is ambiguous and stays
/// unpaired. Returns the number of pairs made.
pub(crate) fn pair_candidates(store: &mut TopologyStore, groups: &CandidateGroups) -> Result<usize> {
    let mut paired = 0;

    for (&(a, b), forward) in groups {
        if a >= b {
            continue;
        }
        let Some(backward) = groups.get(&(b, a)) else {
            continue;
        };

        let mut merged: Vec<(bool, PairingCandidate)> = forward
            .iter()
            .map(|&c| (true, c))
            .chain(backward.iter().map(|&c| (false, c)))
            .collect();
        merged.sort_by(|x, y| x.1.min_y.total_cmp(&y.1.min_y));

        let mut i = 0;
        while i < merged.len() {
            let mut run_max = merged[i].1.max_y;
            let mut end = i + 1;
            while end < merged.len() && merged[end].1.min_y < run_max {
                run_max = run_max.max(merged[end].1.max_y);
                end += 1;
            }

            if let [(side_x, x), (side_y, y)] = &merged[i..end] {
                if side_x != side_y {
                    store.pair_back_faces(x.edge, y.edge)?;
                    for edge in [x.edge, y.edge] {
                        let room = store.half_edge(edge)?.room;
                        store.mark_room_dirty(room);
                    }
                    paired += 1;
                }
            }
            i = end;
        }
    }

    Ok(paired)
}
