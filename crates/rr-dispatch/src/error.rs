use rr_core::{CoreError, IncidentId, NodeName};
use rr_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("spatial error: {0}")]
    Spatial(#[from] SpatialError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("incident {0} is not active")]
    UnknownIncident(IncidentId),

    #[error("node {0} is not in the routing graph")]
    UnknownNode(NodeName),

    #[error("no road graph: call .graph(..) or .tables(..) before .build()")]
    MissingGraph,

    #[error("malformed feed event: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("router state lock poisoned by a panicked writer")]
    Poisoned,
}

pub type DispatchResult<T> = Result<T, DispatchError>;
