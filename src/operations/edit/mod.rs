mod apply_moves;
mod backface_pairing;
mod collapse;
mod degenerate_sweep;
mod merge_vertices;
mod propagate_dirty;
mod room_split;

pub use apply_moves::ApplyMoves;
pub use degenerate_sweep::{SweepDegenerateEdges, SweepReport};
pub use merge_vertices::{MergeParams, MergeReport, MergeVertices};
pub use propagate_dirty::PropagateDirty;

/// Decides whether two vertices coincide for collapse and merge purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OverlapRule {
    /// Horizontal distance only.
    Horizontal,
    /// Horizontal distance and intersecting vertical spans.
    Full,
}
