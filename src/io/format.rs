use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Format version written by [`SaveLevel`](super::SaveLevel).
pub const FORMAT_VERSION: u64 = 2;

/// Top-level structure of a persisted level (format version 2).
///
/// Entities are keyed by guid; cross references are guid strings, `null`
/// meaning "no entity".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelFile {
    pub format_version: u64,
    pub level: LevelHeader,
    #[serde(default)]
    pub rooms: BTreeMap<Uuid, RoomRecord>,
    #[serde(default)]
    pub floor_ceilings: BTreeMap<Uuid, FloorCeilingRecord>,
    #[serde(default)]
    pub half_edges: BTreeMap<Uuid, HalfEdgeRecord>,
    #[serde(default)]
    pub vertices: BTreeMap<Uuid, VertexRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelHeader {
    pub guid: Uuid,
    #[serde(default)]
    pub revision: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    #[serde(default)]
    pub floor: Option<Uuid>,
    #[serde(default)]
    pub ceiling: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloorCeilingRecord {
    pub plane: PlaneRecord,
    #[serde(default)]
    pub above: Option<Uuid>,
    #[serde(default)]
    pub below: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneRecord {
    pub point: XyzRecord,
    pub normal: XyzRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XyzRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HalfEdgeRecord {
    pub room: Uuid,
    pub vertex: Uuid,
    pub next: Uuid,
    #[serde(default)]
    pub back_face: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexRecord {
    pub x: f64,
    pub z: f64,
}

// ---------------------------------------------------------------------------
// Format version 1
// ---------------------------------------------------------------------------

/// Version 1 layout: rooms carry flat heights instead of floor-ceiling
/// references.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LegacyLevelFile {
    pub level: LevelHeader,
    #[serde(default)]
    pub rooms: BTreeMap<Uuid, LegacyRoomRecord>,
    #[serde(default)]
    pub half_edges: BTreeMap<Uuid, HalfEdgeRecord>,
    #[serde(default)]
    pub vertices: BTreeMap<Uuid, VertexRecord>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LegacyRoomRecord {
    #[serde(default)]
    pub floor_height: Option<f64>,
    #[serde(default)]
    pub ceiling_height: Option<f64>,
}

impl LegacyLevelFile {
    /// Rewrites the level in the current layout, giving every room a
    /// horizontal floor and ceiling at its stored heights.
    pub(crate) fn upgrade(self) -> LevelFile {
        let mut rooms = BTreeMap::new();
        let mut floor_ceilings = BTreeMap::new();

        for (room, legacy) in self.rooms {
            let mut surface = |height: Option<f64>, above: Option<Uuid>, below: Option<Uuid>| {
                height.map(|y| {
                    let guid = Uuid::new_v4();
                    floor_ceilings.insert(
                        guid,
                        FloorCeilingRecord {
                            plane: PlaneRecord::horizontal(y),
                            above,
                            below,
                        },
                    );
                    guid
                })
            };
            let floor = surface(legacy.floor_height, Some(room), None);
            let ceiling = surface(legacy.ceiling_height, None, Some(room));
            rooms.insert(room, RoomRecord { floor, ceiling });
        }

        LevelFile {
            format_version: FORMAT_VERSION,
            level: self.level,
            rooms,
            floor_ceilings,
            half_edges: self.half_edges,
            vertices: self.vertices,
        }
    }
}

impl PlaneRecord {
    fn horizontal(y: f64) -> Self {
        Self {
            point: XyzRecord { x: 0.0, y, z: 0.0 },
            normal: XyzRecord {
                x: 0.0,
                y: 1.0,
                z: 0.0,
            },
        }
    }
}
