use serde::Deserialize;

use crate::error::{OperationError, Result};
use crate::math::Point2;
use crate::topology::{LevelData, LevelId, TopologyStore};

use super::MakeRoom;

/// Parameters of the starter level.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TemplateParams {
    /// Extent along x.
    pub width: f64,
    /// Extent along z.
    pub depth: f64,
    /// Floor height.
    pub floor_y: f64,
    /// Ceiling height.
    pub ceiling_y: f64,
}

impl Default for TemplateParams {
    fn default() -> Self {
        Self {
            width: 8.0,
            depth: 12.0,
            floor_y: 0.0,
            ceiling_y: 3.0,
        }
    }
}

impl TemplateParams {
    /// Sets the horizontal size of the room.
    #[must_use]
    pub fn with_size(mut self, width: f64, depth: f64) -> Self {
        self.width = width;
        self.depth = depth;
        self
    }

    /// Sets the floor and ceiling heights.
    #[must_use]
    pub fn with_heights(mut self, floor_y: f64, ceiling_y: f64) -> Self {
        self.floor_y = floor_y;
        self.ceiling_y = ceiling_y;
        self
    }
}

/// Creates a new level holding a single rectangular room.
///
/// This is the fallback layout when no saved level can be loaded.
#[derive(Default)]
pub struct MakeTemplateLevel {
    params: TemplateParams,
}

impl MakeTemplateLevel {
    /// Creates a new `MakeTemplateLevel` operation with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the template parameters.
    #[must_use]
    pub fn with_params(mut self, params: TemplateParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the operation, returning the new level.
    ///
    /// # Errors
    ///
    /// Returns an error if the size is not positive.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<LevelId> {
        let TemplateParams {
            width,
            depth,
            floor_y,
            ceiling_y,
        } = self.params;
        if width <= 0.0 || depth <= 0.0 {
            return Err(OperationError::InvalidInput(format!(
                "template size must be positive, got {width} x {depth}"
            ))
            .into());
        }

        let level = store.add_level(LevelData::new());
        let corners = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, depth),
            Point2::new(width, depth),
            Point2::new(width, 0.0),
        ];
        MakeRoom::new(level, corners)
            .with_floor_height(Some(floor_y))
            .with_ceiling_height(Some(ceiling_y))
            .execute(store)?;
        Ok(level)
    }
}
