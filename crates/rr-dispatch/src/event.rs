//! Feed events: the wire envelope around [`Incident`] payloads.
//!
//! ```json
//! {"event": "snapshot",  "data": [{"_id": "a1", "username": "juan", ...}]}
//! {"event": "sos-alert", "data": {"id": "a2", "username": "maria", ...}}
//! ```

use serde::{Deserialize, Serialize};

use crate::{DispatchResult, Incident};

/// One event from the incident feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum FeedEvent {
    /// Full list of active incidents; replaces the current set.
    Snapshot(Vec<Incident>),
    /// A new incident was raised.
    SosAlert(Incident),
    /// An incident's reported position changed.
    SosUpdated(Incident),
    /// The reporter withdrew the incident.
    SosCancelled(Incident),
    /// A responder closed the incident.
    SosResolved(Incident),
}

impl FeedEvent {
    /// Decode one JSON-encoded event.
    pub fn from_json(line: &str) -> DispatchResult<Self> {
        Ok(serde_json::from_str(line)?)
    }

    /// Wire name of this event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            FeedEvent::Snapshot(_) => "snapshot",
            FeedEvent::SosAlert(_) => "sos-alert",
            FeedEvent::SosUpdated(_) => "sos-updated",
            FeedEvent::SosCancelled(_) => "sos-cancelled",
            FeedEvent::SosResolved(_) => "sos-resolved",
        }
    }
}
