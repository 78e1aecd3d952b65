use std::collections::{HashMap, HashSet};

use tracing::info;
use uuid::Uuid;

use crate::error::{FormatError, Result};
use crate::geometry::Plane;
use crate::math::{Point2, Point3, Vector3};
use crate::operations::query::UpdateVerticalExtents;
use crate::topology::{
    FloorCeilingData, FloorCeilingId, HalfEdgeData, HalfEdgeId, LevelData, LevelId, RoomData,
    RoomId, TopologyStore, ValidateLevel, VertexData, VertexId,
};

use super::format::{LegacyLevelFile, LevelFile, XyzRecord, FORMAT_VERSION};

/// Loads a persisted level into the store.
///
/// Accepts format versions 1 and 2; a file without `formatVersion` is read as
/// version 1. Guid references are resolved to store ids, `null` or missing
/// references meaning "no entity". Any unresolvable reference, unknown
/// version or invalid topology fails the whole load and leaves the store as it
/// was.
pub struct LoadLevel<'a> {
    json: &'a str,
}

impl<'a> LoadLevel<'a> {
    /// Creates a new `LoadLevel` operation over a JSON document.
    #[must_use]
    pub fn new(json: &'a str) -> Self {
        Self { json }
    }

    /// Executes the load and returns the new level.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if the document is malformed, has an unknown
    /// version, references a guid it does not define, reuses a guid, or
    /// describes topology that fails validation.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<LevelId> {
        let file = parse(self.json)?;
        if store.levels().any(|(_, l)| l.guid == file.level.guid) {
            return Err(FormatError::DuplicateGuid(file.level.guid).into());
        }

        let level = store.add_level(LevelData {
            guid: file.level.guid,
            revision: file.level.revision,
            pending_merge: false,
        });
        if let Err(err) = build(store, level, &file) {
            store.remove_level(level);
            return Err(err);
        }

        let report = ValidateLevel::new(level).execute(store);
        if !report.is_valid() {
            store.remove_level(level);
            let issues: Vec<String> = report.issues.iter().map(ToString::to_string).collect();
            return Err(FormatError::InvalidLevel(issues.join("; ")).into());
        }

        info!(
            guid = %file.level.guid,
            revision = file.level.revision,
            rooms = file.rooms.len(),
            "loaded level"
        );
        Ok(level)
    }
}

/// Reads the version header and decodes the matching layout.
fn parse(json: &str) -> Result<LevelFile> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(FormatError::from)?;
    let version = match value.get("formatVersion") {
        None | Some(serde_json::Value::Null) => 1,
        Some(v) => v.as_u64().ok_or(FormatError::UnsupportedVersion(0))?,
    };
    let file = match version {
        1 => serde_json::from_value::<LegacyLevelFile>(value)
            .map_err(FormatError::from)?
            .upgrade(),
        FORMAT_VERSION => serde_json::from_value::<LevelFile>(value).map_err(FormatError::from)?,
        other => return Err(FormatError::UnsupportedVersion(other).into()),
    };
    Ok(file)
}

/// Guid to id tables filled while the entities are created.
#[derive(Default)]
struct Resolver {
    seen: HashSet<Uuid>,
    vertices: HashMap<Uuid, VertexId>,
    rooms: HashMap<Uuid, RoomId>,
    floor_ceilings: HashMap<Uuid, FloorCeilingId>,
    half_edges: HashMap<Uuid, HalfEdgeId>,
}

impl Resolver {
    fn claim(&mut self, guid: Uuid) -> Result<()> {
        if self.seen.insert(guid) {
            Ok(())
        } else {
            Err(FormatError::DuplicateGuid(guid).into())
        }
    }

    fn lookup<T: Copy>(map: &HashMap<Uuid, T>, kind: &'static str, guid: Uuid) -> Result<T> {
        map.get(&guid)
            .copied()
            .ok_or_else(|| FormatError::UnresolvedReference { kind, guid }.into())
    }

    fn optional<T: Copy>(
        map: &HashMap<Uuid, T>,
        kind: &'static str,
        guid: Option<Uuid>,
    ) -> Result<Option<T>> {
        guid.map(|g| Self::lookup(map, kind, g)).transpose()
    }
}

/// Creates every entity of `file` in `level`, then wires the references.
fn build(store: &mut TopologyStore, level: LevelId, file: &LevelFile) -> Result<()> {
    let mut ids = Resolver::default();

    for (&guid, record) in &file.vertices {
        ids.claim(guid)?;
        let mut data = VertexData::new(level, Point2::new(record.x, record.z));
        data.guid = guid;
        ids.vertices.insert(guid, store.add_vertex(data));
    }

    for &guid in file.rooms.keys() {
        ids.claim(guid)?;
        let mut data = RoomData::new(level);
        data.guid = guid;
        ids.rooms.insert(guid, store.add_room(data));
    }

    for (&guid, record) in &file.floor_ceilings {
        ids.claim(guid)?;
        let plane = Plane::new(point(record.plane.point), vector(record.plane.normal))?;
        let mut data = FloorCeilingData::new(level, plane);
        data.guid = guid;
        data.above = Resolver::optional(&ids.rooms, "room", record.above)?;
        data.below = Resolver::optional(&ids.rooms, "room", record.below)?;
        ids.floor_ceilings.insert(guid, store.add_floor_ceiling(data));
    }

    for (&guid, record) in &file.rooms {
        let room = Resolver::lookup(&ids.rooms, "room", guid)?;
        let floor = Resolver::optional(&ids.floor_ceilings, "floor/ceiling", record.floor)?;
        let ceiling = Resolver::optional(&ids.floor_ceilings, "floor/ceiling", record.ceiling)?;
        let data = store.room_mut(room)?;
        data.floor = floor;
        data.ceiling = ceiling;
    }

    for (&guid, record) in &file.half_edges {
        ids.claim(guid)?;
        let room = Resolver::lookup(&ids.rooms, "room", record.room)?;
        let vertex = Resolver::lookup(&ids.vertices, "vertex", record.vertex)?;
        let mut data = HalfEdgeData::new(level, room, vertex);
        data.guid = guid;
        ids.half_edges.insert(guid, store.add_half_edge(data));
    }

    for (&guid, record) in &file.half_edges {
        let edge = Resolver::lookup(&ids.half_edges, "half-edge", guid)?;
        let next = Resolver::lookup(&ids.half_edges, "half-edge", record.next)?;
        let back_face = Resolver::optional(&ids.half_edges, "half-edge", record.back_face)?;
        let data = store.half_edge_mut(edge)?;
        data.next = next;
        data.back_face = back_face;
    }

    UpdateVerticalExtents::new(level).execute(store)
}

fn point(r: XyzRecord) -> Point3 {
    Point3::new(r.x, r.y, r.z)
}

fn vector(r: XyzRecord) -> Vector3 {
    Vector3::new(r.x, r.y, r.z)
}
