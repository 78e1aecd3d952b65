use crate::error::Result;
use crate::math::distance_2d::closest_on_segment;
use crate::math::polygon_2d::contains_point;
use crate::math::{horizontal, Point2, Point3};
use crate::topology::{FloorCeilingId, HalfEdgeId, LevelId, TopologyStore, VertexId};

/// Result of a closest vertex query.
#[derive(Debug, Clone, Copy)]
pub struct ClosestVertexResult {
    /// The closest vertex.
    pub vertex: VertexId,
    /// Horizontal distance from the query point.
    pub distance: f64,
}

/// Finds the vertex horizontally closest to a point.
pub struct ClosestVertex {
    level: LevelId,
    point: Point2,
    max_distance: f64,
}

impl ClosestVertex {
    /// Creates a new `ClosestVertex` query with no distance limit.
    #[must_use]
    pub fn new(level: LevelId, point: Point2) -> Self {
        Self {
            level,
            point,
            max_distance: f64::INFINITY,
        }
    }

    /// Ignores vertices farther than `max_distance`.
    #[must_use]
    pub fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Executes the query.
    #[must_use]
    pub fn execute(&self, store: &TopologyStore) -> Option<ClosestVertexResult> {
        store
            .vertices_in(self.level)
            .map(|(id, v)| ClosestVertexResult {
                vertex: id,
                distance: (v.position - self.point).norm(),
            })
            .filter(|r| r.distance <= self.max_distance)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

/// Result of a closest half-edge query.
#[derive(Debug, Clone, Copy)]
pub struct ClosestHalfEdgeResult {
    /// The closest wall half-edge.
    pub edge: HalfEdgeId,
    /// Position along the half-edge, `0` at its origin and `1` at its end.
    pub parameter: f64,
    /// The closest horizontal point on the wall.
    pub point: Point2,
    /// Horizontal distance from the query point.
    pub distance: f64,
}

/// Finds the wall closest to a point.
///
/// Only walls whose vertical span contains the query height are considered,
/// so a point inside an upper storey never snaps to the storey below.
pub struct ClosestHalfEdge {
    level: LevelId,
    point: Point3,
    max_distance: f64,
}

impl ClosestHalfEdge {
    /// Creates a new `ClosestHalfEdge` query with no distance limit.
    #[must_use]
    pub fn new(level: LevelId, point: Point3) -> Self {
        Self {
            level,
            point,
            max_distance: f64::INFINITY,
        }
    }

    /// Ignores walls farther than `max_distance`.
    #[must_use]
    pub fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Executes the query.
    ///
    /// Relies on the cached vertical spans; run
    /// [`UpdateVerticalExtents`](super::UpdateVerticalExtents) after edits.
    ///
    /// # Errors
    ///
    /// Returns an error if a half-edge references a missing entity.
    pub fn execute(&self, store: &TopologyStore) -> Result<Option<ClosestHalfEdgeResult>> {
        let query = horizontal(&self.point);
        let mut best: Option<ClosestHalfEdgeResult> = None;

        for (id, he) in store.half_edges_in(self.level) {
            if self.point.y < he.min_y || self.point.y > he.max_y {
                continue;
            }
            let a = store.vertex(he.vertex)?.position;
            let b = store.vertex(store.end_vertex(id)?)?.position;
            let (parameter, point) = closest_on_segment(&query, &a, &b);
            let distance = (query - point).norm();
            if distance > self.max_distance {
                continue;
            }
            if best.is_none_or(|current| distance < current.distance) {
                best = Some(ClosestHalfEdgeResult {
                    edge: id,
                    parameter,
                    point,
                    distance,
                });
            }
        }

        Ok(best)
    }
}

/// Result of a closest floor/ceiling query.
#[derive(Debug, Clone, Copy)]
pub struct ClosestFloorCeilingResult {
    /// The closest surface.
    pub floor_ceiling: FloorCeilingId,
    /// Vertical distance from the query point to the plane.
    pub distance: f64,
}

/// Finds the floor or ceiling directly above or below a point.
///
/// A surface is a candidate only if one of the rooms it bounds contains the
/// query's horizontal position.
pub struct ClosestFloorCeiling {
    level: LevelId,
    point: Point3,
    max_distance: f64,
}

impl ClosestFloorCeiling {
    /// Creates a new `ClosestFloorCeiling` query with no distance limit.
    #[must_use]
    pub fn new(level: LevelId, point: Point3) -> Self {
        Self {
            level,
            point,
            max_distance: f64::INFINITY,
        }
    }

    /// Ignores surfaces farther than `max_distance`.
    #[must_use]
    pub fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if a bounded room's loop is broken.
    pub fn execute(&self, store: &TopologyStore) -> Result<Option<ClosestFloorCeilingResult>> {
        let query = horizontal(&self.point);
        let mut best: Option<ClosestFloorCeilingResult> = None;

        for (id, fc) in store.floor_ceilings_in(self.level) {
            let distance = (self.point.y - fc.plane.height_at(query.x, query.y)).abs();
            if distance > self.max_distance
                || best.is_some_and(|current| distance >= current.distance)
            {
                continue;
            }
            let mut covers = false;
            for room in [fc.above, fc.below].into_iter().flatten() {
                if contains_point(&store.room_polygon(room)?, &query) {
                    covers = true;
                    break;
                }
            }
            if covers {
                best = Some(ClosestFloorCeilingResult {
                    floor_ceiling: id,
                    distance,
                });
            }
        }

        Ok(best)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::MakeRoom;
    use crate::operations::query::UpdateVerticalExtents;
    use crate::topology::{LevelData, RoomId};
    use approx::assert_abs_diff_eq;

    fn square(store: &mut TopologyStore) -> (LevelId, RoomId) {
        let level = store.add_level(LevelData::new());
        let room = MakeRoom::new(
            level,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(0.0, 4.0),
                Point2::new(4.0, 4.0),
                Point2::new(4.0, 0.0),
            ],
        )
        .execute(store)
        .unwrap();
        UpdateVerticalExtents::new(level).execute(store).unwrap();
        (level, room)
    }

    #[test]
    fn closest_vertex_respects_limit() {
        let mut store = TopologyStore::new();
        let (level, _) = square(&mut store);
        let hit = ClosestVertex::new(level, Point2::new(3.9, 4.2)).execute(&store).unwrap();
        assert_eq!(store.vertex(hit.vertex).unwrap().position, Point2::new(4.0, 4.0));

        let miss = ClosestVertex::new(level, Point2::new(2.0, 2.0))
            .with_max_distance(0.5)
            .execute(&store);
        assert!(miss.is_none());
    }

    #[test]
    fn closest_wall_reports_parameter() {
        let mut store = TopologyStore::new();
        let (level, room) = square(&mut store);
        let hit = ClosestHalfEdge::new(level, Point3::new(-0.5, 1.5, 1.0))
            .execute(&store)
            .unwrap()
            .unwrap();
        // First wall runs (0,0) -> (0,4).
        assert_eq!(hit.edge, store.room_loop(room).unwrap()[0]);
        assert_abs_diff_eq!(hit.parameter, 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(hit.distance, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn walls_outside_vertical_span_are_ignored() {
        let mut store = TopologyStore::new();
        let (level, _) = square(&mut store);
        let hit = ClosestHalfEdge::new(level, Point3::new(-0.5, 10.0, 1.0))
            .execute(&store)
            .unwrap();
        assert!(hit.is_none());
    }

    #[test]
    fn closest_surface_picks_nearest_plane() {
        let mut store = TopologyStore::new();
        let (level, room) = square(&mut store);
        let near_ceiling = ClosestFloorCeiling::new(level, Point3::new(2.0, 2.5, 2.0))
            .execute(&store)
            .unwrap()
            .unwrap();
        assert_eq!(Some(near_ceiling.floor_ceiling), store.room(room).unwrap().ceiling);
        assert_abs_diff_eq!(near_ceiling.distance, 0.5, epsilon = 1e-12);

        let outside = ClosestFloorCeiling::new(level, Point3::new(9.0, 2.5, 2.0))
            .execute(&store)
            .unwrap();
        assert!(outside.is_none());
    }
}
