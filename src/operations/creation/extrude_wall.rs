use crate::error::{OperationError, Result};
use crate::math::polygon_2d::winding;
use crate::math::Vector2;
use crate::topology::{HalfEdgeData, HalfEdgeId, RoomData, RoomId, TopologyStore, VertexData};

/// Pushes a one-sided wall outward into a new adjoining room.
///
/// For a wall `a -> b` the new room is bounded by `b -> a -> a' -> b'`,
/// where `a'` and `b'` are `a` and `b` moved `distance` along the wall's
/// outward normal. Its first half-edge becomes the back face of the wall,
/// and it gets its own copies of the source room's floor and ceiling planes.
pub struct ExtrudeWall {
    edge: HalfEdgeId,
    distance: f64,
}

impl ExtrudeWall {
    /// Creates a new `ExtrudeWall` operation.
    #[must_use]
    pub fn new(edge: HalfEdgeId, distance: f64) -> Self {
        Self { edge, distance }
    }

    /// Executes the operation, returning the new room.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall already has a back face, the distance is
    /// not a positive finite number, or the wall has zero length.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<RoomId> {
        if !(self.distance.is_finite() && self.distance > 0.0) {
            return Err(OperationError::InvalidInput(format!(
                "extrusion distance must be positive, got {}",
                self.distance
            ))
            .into());
        }

        let wall = store.half_edge(self.edge)?.clone();
        if wall.back_face.is_some() {
            return Err(OperationError::InvalidInput(
                "only walls without a back face can be extruded".into(),
            )
            .into());
        }

        let a_id = wall.vertex;
        let b_id = store.end_vertex(self.edge)?;
        let a = store.vertex(a_id)?.position;
        let b = store.vertex(b_id)?.position;
        let along = b - a;
        let length = along.norm();
        if length <= f64::EPSILON {
            return Err(OperationError::InvalidInput("cannot extrude a zero-length wall".into()).into());
        }

        // Outward lies to the left of travel on a clockwise loop.
        let sign = winding(&store.room_polygon(wall.room)?);
        let outward = Vector2::new(along.y, -along.x) * (sign / length);
        let offset = outward * self.distance;

        let level = wall.level;
        let a_out = store.add_vertex(VertexData::new(level, a + offset));
        let b_out = store.add_vertex(VertexData::new(level, b + offset));

        let room = store.add_room(RoomData::new(level));
        let edges: Vec<HalfEdgeId> = [b_id, a_id, a_out, b_out]
            .into_iter()
            .map(|v| store.add_half_edge(HalfEdgeData::new(level, room, v)))
            .collect();
        store.link_loop(&edges)?;
        store.pair_back_faces(self.edge, edges[0])?;

        store.copy_surfaces(wall.room, room)?;

        store.mark_room_dirty(wall.room);
        Ok(room)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::polygon_2d::signed_area;
    use crate::math::Point2;
    use crate::operations::creation::MakeRoom;
    use crate::topology::{LevelData, ValidateLevel};

    fn square(store: &mut TopologyStore) -> (crate::topology::LevelId, RoomId) {
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
        (level, room)
    }

    #[test]
    fn extruded_room_lies_outside_and_shares_the_wall() {
        let mut store = TopologyStore::new();
        let (level, room) = square(&mut store);
        // (4,4) -> (4,0), outward is +x.
        let wall = store.room_loop(room).unwrap()[2];

        let new_room = ExtrudeWall::new(wall, 2.0).execute(&mut store).unwrap();

        let back = store.half_edge(wall).unwrap().back_face.unwrap();
        assert_eq!(store.half_edge(back).unwrap().room, new_room);
        let polygon = store.room_polygon(new_room).unwrap();
        assert!(polygon.iter().all(|p| p.x >= 4.0 - 1e-12));
        assert!(polygon.iter().any(|p| (p.x - 6.0).abs() < 1e-12));
        assert!((signed_area(&polygon) + 8.0).abs() < 1e-12);

        let floor = store.room(new_room).unwrap().floor.unwrap();
        assert_ne!(Some(floor), store.room(room).unwrap().floor);
        assert_eq!(store.floor_ceiling(floor).unwrap().above, Some(new_room));
        assert!(ValidateLevel::new(level).execute(&store).is_valid());
    }

    #[test]
    fn shared_wall_cannot_be_extruded_again() {
        let mut store = TopologyStore::new();
        let (_, room) = square(&mut store);
        let wall = store.room_loop(room).unwrap()[2];
        ExtrudeWall::new(wall, 1.0).execute(&mut store).unwrap();
        assert!(ExtrudeWall::new(wall, 1.0).execute(&mut store).is_err());
    }

    #[test]
    fn non_positive_distance_is_rejected() {
        let mut store = TopologyStore::new();
        let (_, room) = square(&mut store);
        let wall = store.room_loop(room).unwrap()[0];
        assert!(ExtrudeWall::new(wall, 0.0).execute(&mut store).is_err());
        assert!(ExtrudeWall::new(wall, -1.0).execute(&mut store).is_err());
    }
}
