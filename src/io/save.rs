use std::collections::BTreeMap;

use tracing::info;
use uuid::Uuid;

use crate::error::{FormatError, Result};
use crate::topology::{FloorCeilingId, HalfEdgeId, LevelId, RoomId, TopologyStore};

use super::format::{
    FloorCeilingRecord, HalfEdgeRecord, LevelFile, LevelHeader, PlaneRecord, RoomRecord,
    VertexRecord, XyzRecord, FORMAT_VERSION,
};

/// Serializes a level to JSON in the current format version.
///
/// Every save bumps the level's revision before writing it. Virtual
/// (preview-only) entities are not persisted.
pub struct SaveLevel {
    level: LevelId,
}

impl SaveLevel {
    /// Creates a new `SaveLevel` operation.
    #[must_use]
    pub fn new(level: LevelId) -> Self {
        Self { level }
    }

    /// Executes the save and returns the pretty-printed document.
    ///
    /// # Errors
    ///
    /// Returns an error if the level is missing, an entity references a
    /// missing entity, or serialization fails.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<String> {
        store.level_mut(self.level)?.revision += 1;
        let file = self.snapshot(store)?;
        let json = serde_json::to_string_pretty(&file).map_err(FormatError::from)?;
        info!(
            guid = %file.level.guid,
            revision = file.level.revision,
            rooms = file.rooms.len(),
            "saved level"
        );
        Ok(json)
    }

    /// Builds the persisted form of the level without touching its revision.
    ///
    /// # Errors
    ///
    /// Returns an error if the level is missing or an entity references a
    /// missing entity.
    pub fn snapshot(&self, store: &TopologyStore) -> Result<LevelFile> {
        let level = store.level(self.level)?;

        let room_guid = |id: RoomId| store.room(id).map(|r| r.guid);
        let surface_guid = |id: FloorCeilingId| store.floor_ceiling(id).map(|f| f.guid);
        let edge_guid = |id: HalfEdgeId| store.half_edge(id).map(|h| h.guid);

        let mut rooms = BTreeMap::new();
        for (_, room) in store.rooms_in(self.level) {
            rooms.insert(
                room.guid,
                RoomRecord {
                    floor: room.floor.map(surface_guid).transpose()?,
                    ceiling: room.ceiling.map(surface_guid).transpose()?,
                },
            );
        }

        let mut floor_ceilings = BTreeMap::new();
        for (_, fc) in store.floor_ceilings_in(self.level) {
            let (point, normal) = (fc.plane.point(), fc.plane.normal());
            floor_ceilings.insert(
                fc.guid,
                FloorCeilingRecord {
                    plane: PlaneRecord {
                        point: XyzRecord {
                            x: point.x,
                            y: point.y,
                            z: point.z,
                        },
                        normal: XyzRecord {
                            x: normal.x,
                            y: normal.y,
                            z: normal.z,
                        },
                    },
                    above: fc.above.map(room_guid).transpose()?,
                    below: fc.below.map(room_guid).transpose()?,
                },
            );
        }

        let mut half_edges = BTreeMap::new();
        for (_, he) in store.half_edges_in(self.level) {
            half_edges.insert(
                he.guid,
                HalfEdgeRecord {
                    room: room_guid(he.room)?,
                    vertex: store.vertex(he.vertex)?.guid,
                    next: edge_guid(he.next)?,
                    back_face: he.back_face.map(edge_guid).transpose()?,
                },
            );
        }

        let vertices: BTreeMap<Uuid, VertexRecord> = store
            .vertices_in(self.level)
            .map(|(_, v)| {
                (
                    v.guid,
                    VertexRecord {
                        x: v.position.x,
                        z: v.position.y,
                    },
                )
            })
            .collect();

        Ok(LevelFile {
            format_version: FORMAT_VERSION,
            level: LevelHeader {
                guid: level.guid,
                revision: level.revision,
            },
            rooms,
            floor_ceilings,
            half_edges,
            vertices,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::io::LoadLevel;
    use crate::math::Point2;
    use crate::operations::creation::{MakeRoom, MakeTemplateLevel};
    use crate::topology::{LevelData, VertexData};

    #[test]
    fn every_save_bumps_the_revision() {
        let mut store = TopologyStore::new();
        let level = MakeTemplateLevel::new().execute(&mut store).unwrap();

        SaveLevel::new(level).execute(&mut store).unwrap();
        let json = SaveLevel::new(level).execute(&mut store).unwrap();
        assert_eq!(store.level(level).unwrap().revision, 2);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["formatVersion"], 2);
        assert_eq!(value["level"]["revision"], 2);
    }

    #[test]
    fn template_has_the_expected_records() {
        let mut store = TopologyStore::new();
        let level = MakeTemplateLevel::new().execute(&mut store).unwrap();
        let file = SaveLevel::new(level).snapshot(&store).unwrap();

        assert_eq!(file.rooms.len(), 1);
        assert_eq!(file.floor_ceilings.len(), 2);
        assert_eq!(file.half_edges.len(), 4);
        assert_eq!(file.vertices.len(), 4);
        assert!(file.half_edges.values().all(|h| h.back_face.is_none()));
    }

    #[test]
    fn virtual_entities_are_skipped() {
        let mut store = TopologyStore::new();
        let level = store.add_level(LevelData::new());
        MakeRoom::new(
            level,
            vec![Point2::new(0.0, 0.0), Point2::new(0.0, 1.0), Point2::new(1.0, 0.0)],
        )
        .execute(&mut store)
        .unwrap();
        let mut preview = VertexData::new(level, Point2::new(5.0, 5.0));
        preview.markers.is_virtual = true;
        store.add_vertex(preview);

        let file = SaveLevel::new(level).snapshot(&store).unwrap();
        assert_eq!(file.vertices.len(), 3);
    }

    #[test]
    fn shared_walls_survive_a_round_trip() {
        let mut store = TopologyStore::new();
        let level = store.add_level(LevelData::new());
        let a = MakeRoom::new(
            level,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(0.0, 4.0),
                Point2::new(4.0, 4.0),
                Point2::new(4.0, 0.0),
            ],
        )
        .execute(&mut store)
        .unwrap();
        let a_edges = store.room_loop(a).unwrap();
        let top = store.half_edge(a_edges[2]).unwrap().vertex;
        let bottom = store.half_edge(a_edges[3]).unwrap().vertex;
        let far_top = store.add_vertex(VertexData::new(level, Point2::new(8.0, 4.0)));
        let far_bottom = store.add_vertex(VertexData::new(level, Point2::new(8.0, 0.0)));
        MakeRoom::from_vertices(level, vec![bottom, top, far_top, far_bottom])
            .execute(&mut store)
            .unwrap();

        let saved = SaveLevel::new(level).snapshot(&store).unwrap();
        assert_eq!(
            saved.half_edges.values().filter(|h| h.back_face.is_some()).count(),
            2
        );

        let json = serde_json::to_string(&saved).unwrap();
        let mut reloaded = TopologyStore::new();
        let copy = LoadLevel::new(&json).execute(&mut reloaded).unwrap();
        assert_eq!(SaveLevel::new(copy).snapshot(&reloaded).unwrap(), saved);
    }
}
