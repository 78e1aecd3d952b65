//! Half-edge room topology for an architectural level editor.
//!
//! Rooms are closed loops of half-edges over shared vertices, bounded below
//! and above by floor/ceiling planes. Walls shared by two rooms carry a pair
//! of back-face half-edges. Editing passes move vertices, weld coincident
//! ones and repair the topology; room shells are tessellated into triangle
//! meshes for display.

pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod math;
pub mod operations;
pub mod pipeline;
pub mod tessellation;
pub mod topology;

pub use error::{Result, RoomTopoError};
