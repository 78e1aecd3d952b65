//! Per-frame orchestration of the editing passes.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::EditorConfig;
use crate::error::Result;
use crate::io::LoadLevel;
use crate::operations::creation::MakeTemplateLevel;
use crate::operations::edit::{ApplyMoves, MergeVertices, PropagateDirty, SweepDegenerateEdges};
use crate::operations::query::UpdateVerticalExtents;
use crate::tessellation::{BuildRoomMesh, TriangleMesh};
use crate::topology::{LevelId, RoomId, TopologyStore};

/// What one call to [`FramePipeline::update`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Vertices and floor/ceilings whose pending move was applied.
    pub applied_moves: usize,
    /// Levels whose pending merge ran this frame.
    pub merged_levels: usize,
    /// Rooms whose mesh was rebuilt.
    pub meshed_rooms: usize,
    /// Cached meshes dropped because their room no longer exists.
    pub evicted_meshes: usize,
}

/// Runs the editing passes in their fixed order and caches room meshes.
///
/// Each frame, per level: pending moves are applied; if a merge was
/// requested the degenerate-edge sweep and the vertex merge run; dirty flags
/// propagate from vertices and surfaces to rooms; finally vertical extents are
/// refreshed and every dirty room is re-meshed.
#[derive(Debug, Default)]
pub struct FramePipeline {
    config: EditorConfig,
    meshes: HashMap<RoomId, TriangleMesh>,
}

impl FramePipeline {
    /// Creates a pipeline with the given configuration.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            meshes: HashMap::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Returns the cached mesh of a room, if it has been built.
    #[must_use]
    pub fn mesh(&self, room: RoomId) -> Option<&TriangleMesh> {
        self.meshes.get(&room)
    }

    /// Iterates over every cached room mesh.
    pub fn meshes(&self) -> impl Iterator<Item = (RoomId, &TriangleMesh)> {
        self.meshes.iter().map(|(&id, mesh)| (id, mesh))
    }

    /// Loads a saved level, falling back to the template level if the
    /// document is absent or cannot be loaded.
    ///
    /// # Errors
    ///
    /// Returns an error only if the template level cannot be created.
    pub fn load_or_template(
        &self,
        store: &mut TopologyStore,
        json: Option<&str>,
    ) -> Result<LevelId> {
        if let Some(json) = json {
            match LoadLevel::new(json).execute(store) {
                Ok(level) => return Ok(level),
                Err(err) => warn!(%err, "level failed to load, using template"),
            }
        }
        MakeTemplateLevel::new()
            .with_params(self.config.template)
            .execute(store)
    }

    /// Runs one frame over every level in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if a pass meets a missing entity or a broken loop.
    pub fn update(&mut self, store: &mut TopologyStore) -> Result<FrameReport> {
        let mut report = FrameReport::default();
        let levels: Vec<LevelId> = store.levels().map(|(id, _)| id).collect();

        for level in levels {
            report.applied_moves += ApplyMoves::new(level).execute(store)?;

            if store.level(level)?.pending_merge {
                SweepDegenerateEdges::new(level)
                    .with_params(self.config.merge)
                    .execute(store)?;
                MergeVertices::new(level)
                    .with_params(self.config.merge)
                    .execute(store)?;
                report.merged_levels += 1;
            }

            PropagateDirty::new(level).execute(store)?;
            report.meshed_rooms += self.remesh_dirty(store, level)?;
        }

        let cached = self.meshes.len();
        self.meshes.retain(|&room, _| store.room(room).is_ok());
        report.evicted_meshes = cached - self.meshes.len();

        if report != FrameReport::default() {
            debug!(?report, "frame updated");
        }
        Ok(report)
    }

    fn remesh_dirty(&mut self, store: &mut TopologyStore, level: LevelId) -> Result<usize> {
        let dirty: Vec<RoomId> = store
            .rooms_in(level)
            .filter(|(_, room)| room.dirty)
            .map(|(id, _)| id)
            .collect();
        if dirty.is_empty() {
            return Ok(0);
        }

        UpdateVerticalExtents::new(level).execute(store)?;
        for &room in &dirty {
            let mesh = BuildRoomMesh::new(room)
                .with_params(self.config.tessellation)
                .execute(store)?;
            self.meshes.insert(room, mesh);
            store.room_mut(room)?.dirty = false;
        }
        Ok(dirty.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vector3;
    use crate::topology::{EntityRef, LevelData};

    fn template(pipeline: &FramePipeline, store: &mut TopologyStore) -> (LevelId, RoomId) {
        let level = pipeline.load_or_template(store, None).unwrap();
        let room = store.rooms_in(level).next().unwrap().0;
        (level, room)
    }

    #[test]
    fn first_frame_meshes_new_rooms_then_settles() {
        let mut store = TopologyStore::new();
        let mut pipeline = FramePipeline::default();
        let (_, room) = template(&pipeline, &mut store);

        let first = pipeline.update(&mut store).unwrap();
        assert_eq!(first.meshed_rooms, 1);
        assert_eq!(pipeline.mesh(room).unwrap().triangle_count(), 12);

        let second = pipeline.update(&mut store).unwrap();
        assert_eq!(second, FrameReport::default());
    }

    #[test]
    fn moving_a_vertex_remeshes_its_room() {
        let mut store = TopologyStore::new();
        let mut pipeline = FramePipeline::default();
        let (_, room) = template(&pipeline, &mut store);
        pipeline.update(&mut store).unwrap();

        let corner = store.half_edge(store.room_loop(room).unwrap()[0]).unwrap().vertex;
        store
            .queue_move(EntityRef::from(corner), Vector3::new(-1.0, 5.0, 0.0))
            .unwrap();

        let report = pipeline.update(&mut store).unwrap();
        assert_eq!(report.applied_moves, 1);
        assert_eq!(report.meshed_rooms, 1);
        assert!((store.vertex(corner).unwrap().position.x + 1.0).abs() < 1e-12);
    }

    #[test]
    fn merge_runs_only_when_requested() {
        let mut store = TopologyStore::new();
        let mut pipeline = FramePipeline::default();
        let (level, _) = template(&pipeline, &mut store);

        assert_eq!(pipeline.update(&mut store).unwrap().merged_levels, 0);
        store.request_merge(level).unwrap();
        assert_eq!(pipeline.update(&mut store).unwrap().merged_levels, 1);
        assert!(!store.level(level).unwrap().pending_merge);
    }

    #[test]
    fn meshes_of_removed_rooms_are_evicted() {
        let mut store = TopologyStore::new();
        let mut pipeline = FramePipeline::default();
        let (level, room) = template(&pipeline, &mut store);
        pipeline.update(&mut store).unwrap();

        store.remove_level(level);
        let report = pipeline.update(&mut store).unwrap();
        assert_eq!(report.evicted_meshes, 1);
        assert!(pipeline.mesh(room).is_none());
    }

    #[test]
    fn unreadable_document_falls_back_to_template() {
        let mut store = TopologyStore::new();
        let pipeline = FramePipeline::default();
        let level = pipeline.load_or_template(&mut store, Some("[]")).unwrap();
        assert_eq!(store.rooms_in(level).count(), 1);
        assert_eq!(store.levels().count(), 1);
    }

    #[test]
    fn empty_level_is_a_quiet_frame() {
        let mut store = TopologyStore::new();
        store.add_level(LevelData::new());
        let mut pipeline = FramePipeline::default();
        assert_eq!(pipeline.update(&mut store).unwrap(), FrameReport::default());
    }
}
