//! Spatial-subsystem error type.

use thiserror::Error;

use rr_core::NodeName;

/// Errors produced by `rr-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// A connection references a node with no coordinate entry.  Fatal at
    /// startup: the static tables are inconsistent.
    #[error("node {node} has no coordinate entry (referenced by {referenced_by})")]
    MissingCoordinate { node: NodeName, referenced_by: NodeName },

    #[error("table parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
