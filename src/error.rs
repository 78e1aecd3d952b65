use thiserror::Error;
use uuid::Uuid;

/// Top-level error type for the room topology kernel.
#[derive(Debug, Error)]
pub enum RoomTopoError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to the half-edge topology.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(&'static str),

    #[error("half-edge loop does not close after {0} steps")]
    LoopNotClosed(usize),

    #[error("room has no half-edges")]
    EmptyRoom,

    #[error("entities belong to different levels")]
    LevelMismatch,

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to editing operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors related to tessellation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("tessellation failed: {0}")]
    Failed(String),
}

/// Errors raised while reading or writing persisted levels.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("malformed level json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported level format version {0}")]
    UnsupportedVersion(u64),

    #[error("unresolved {kind} reference {guid}")]
    UnresolvedReference { kind: &'static str, guid: Uuid },

    #[error("duplicate guid {0}")]
    DuplicateGuid(Uuid),

    #[error("loaded level failed validation: {0}")]
    InvalidLevel(String),
}

/// Convenience type alias for results using [`RoomTopoError`].
pub type Result<T> = std::result::Result<T, RoomTopoError>;
