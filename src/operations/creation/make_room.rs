use std::collections::{HashMap, HashSet};

use crate::error::{OperationError, Result, TopologyError};
use crate::geometry::Plane;
use crate::math::Point2;
use crate::topology::{
    FloorCeilingData, HalfEdgeData, HalfEdgeId, LevelId, RoomData, RoomId, TopologyStore,
    VertexData, VertexId,
};

const DEFAULT_FLOOR_HEIGHT: f64 = 0.0;
const DEFAULT_CEILING_HEIGHT: f64 = 3.0;

enum Corners {
    Points(Vec<Point2>),
    Vertices(Vec<VertexId>),
}

/// Creates a room bounded by a closed loop of corners.
///
/// Corners are given in loop order, clockwise when seen from above. Every
/// new half-edge `a -> b` is paired with an unpaired half-edge `b -> a` of
/// another room in the same level, so rooms built on shared vertices come
/// out joined along their common walls.
pub struct MakeRoom {
    level: LevelId,
    corners: Corners,
    floor_height: Option<f64>,
    ceiling_height: Option<f64>,
}

impl MakeRoom {
    /// Creates a room with a new vertex at each point.
    #[must_use]
    pub fn new(level: LevelId, points: Vec<Point2>) -> Self {
        Self {
            level,
            corners: Corners::Points(points),
            floor_height: Some(DEFAULT_FLOOR_HEIGHT),
            ceiling_height: Some(DEFAULT_CEILING_HEIGHT),
        }
    }

    /// Creates a room on existing vertices of the level.
    #[must_use]
    pub fn from_vertices(level: LevelId, vertices: Vec<VertexId>) -> Self {
        Self {
            level,
            corners: Corners::Vertices(vertices),
            floor_height: Some(DEFAULT_FLOOR_HEIGHT),
            ceiling_height: Some(DEFAULT_CEILING_HEIGHT),
        }
    }

    /// Sets the floor height, or `None` for a room without floor.
    #[must_use]
    pub fn with_floor_height(mut self, height: Option<f64>) -> Self {
        self.floor_height = height;
        self
    }

    /// Sets the ceiling height, or `None` for an open-air room.
    #[must_use]
    pub fn with_ceiling_height(mut self, height: Option<f64>) -> Self {
        self.ceiling_height = height;
        self
    }

    /// Executes the operation, creating the room in the topology store.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than three distinct corners are given, the
    /// level is missing, or an existing vertex belongs to another level.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<RoomId> {
        store.level(self.level)?;

        let vertices = match &self.corners {
            Corners::Points(points) => {
                check_corner_count(points.len())?;
                points
                    .iter()
                    .map(|&p| store.add_vertex(VertexData::new(self.level, p)))
                    .collect::<Vec<_>>()
            }
            Corners::Vertices(ids) => {
                check_corner_count(ids.len())?;
                for &id in ids {
                    if store.vertex(id)?.level != self.level {
                        return Err(TopologyError::LevelMismatch.into());
                    }
                }
                if ids.iter().collect::<HashSet<_>>().len() != ids.len() {
                    return Err(OperationError::InvalidInput(
                        "room corners must be distinct vertices".into(),
                    )
                    .into());
                }
                ids.clone()
            }
        };

        // Open walls of the other rooms, keyed by (origin, end).
        let mut open_walls: HashMap<(VertexId, VertexId), HalfEdgeId> = HashMap::new();
        for (id, he) in store.half_edges_in(self.level) {
            if he.back_face.is_none() {
                open_walls
                    .entry((he.vertex, store.end_vertex(id)?))
                    .or_insert(id);
            }
        }

        let room = store.add_room(RoomData::new(self.level));
        let edges: Vec<HalfEdgeId> = vertices
            .iter()
            .map(|&v| store.add_half_edge(HalfEdgeData::new(self.level, room, v)))
            .collect();
        store.link_loop(&edges)?;

        if let Some(height) = self.floor_height {
            let floor = store.add_floor_ceiling(
                FloorCeilingData::new(self.level, Plane::horizontal(height)).with_above(room),
            );
            store.room_mut(room)?.floor = Some(floor);
        }
        if let Some(height) = self.ceiling_height {
            let ceiling = store.add_floor_ceiling(
                FloorCeilingData::new(self.level, Plane::horizontal(height)).with_below(room),
            );
            store.room_mut(room)?.ceiling = Some(ceiling);
        }

        for (i, &edge) in edges.iter().enumerate() {
            let from = vertices[i];
            let to = vertices[(i + 1) % vertices.len()];
            if let Some(opposite) = open_walls.remove(&(to, from)) {
                store.pair_back_faces(edge, opposite)?;
                let neighbour = store.half_edge(opposite)?.room;
                store.mark_room_dirty(neighbour);
            }
        }

        Ok(room)
    }
}

fn check_corner_count(count: usize) -> Result<()> {
    if count < 3 {
        return Err(OperationError::InvalidInput(format!(
            "a room needs at least 3 corners, got {count}"
        ))
        .into());
    }
    Ok(())
}
