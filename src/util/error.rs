//! Error types for the roadscape library.

use thiserror::Error;

use crate::scene::NodeId;

/// Main error type for terrain, mesh and scene operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration value out of range or inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Primitive parameters that would produce degenerate geometry
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// A mesh must bind between 1 and 3 materials
    #[error("Mesh needs 1..={max} materials, got {count}")]
    MaterialCount { count: usize, max: usize },

    /// Vertex references a material slot the mesh does not bind
    #[error("Material index {index} out of range (materials: {count})")]
    MaterialIndexOutOfRange { index: u32, count: usize },

    /// Index buffer references a vertex that does not exist
    #[error("Vertex index {index} out of range (vertices: {count})")]
    IndexOutOfRange { index: u32, count: usize },

    /// Index buffer is not a triangle list
    #[error("Index count {0} is not a multiple of 3")]
    NotTriangleList(usize),

    /// Model text could not be parsed
    #[error("Malformed model at line {line}: {message}")]
    MalformedModel { line: usize, message: String },

    /// Elevation and material grids disagree, or grid too small
    #[error("Heightmap shape mismatch: expected {expected}, got {actual}")]
    HeightmapShape { expected: String, actual: String },

    /// Node id is stale or was never created in this graph
    #[error("Scene node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Nodes have exactly one owner; detach before re-parenting
    #[error("Scene node {0:?} already has a parent")]
    NodeHasParent(NodeId),

    /// Attaching would make a node its own ancestor
    #[error("Attaching {child:?} under {parent:?} would create a cycle")]
    CycleDetected { parent: NodeId, child: NodeId },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a malformed model error for a 1-based line number.
    pub fn model(line: usize, msg: impl Into<String>) -> Self {
        Self::MalformedModel { line, message: msg.into() }
    }
}

/// Result type alias for roadscape operations.
pub type Result<T> = std::result::Result<T, Error>;
