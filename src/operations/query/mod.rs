mod closest;
mod vertical_extent;

pub use closest::{
    ClosestFloorCeiling, ClosestFloorCeilingResult, ClosestHalfEdge, ClosestHalfEdgeResult,
    ClosestVertex, ClosestVertexResult,
};
pub use vertical_extent::UpdateVerticalExtents;
