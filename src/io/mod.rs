//! Level persistence.
//!
//! Levels are stored as JSON documents keyed by entity guid. Version 2 is the
//! current layout; version 1 documents are upgraded on load.

mod format;
mod load;
mod save;

pub use format::{
    FloorCeilingRecord, HalfEdgeRecord, LevelFile, LevelHeader, PlaneRecord, RoomRecord,
    VertexRecord, XyzRecord, FORMAT_VERSION,
};
pub use load::LoadLevel;
pub use save::SaveLevel;
